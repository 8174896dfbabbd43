//! Tests for Client
//!
//! These tests verify:
//! - Store/fetch round trips and store verb semantics
//! - Delete, counters, stats and flush_all through a live socket
//! - Multi-get absence handling and error escalation
//! - Classification of malformed replies
//! - Closed-client and timeout behaviour

#[path = "../common/mod.rs"]
mod common;

use std::time::Duration;

use common::{FakeOptions, FakeServer, ScriptedServer};
use memcachedb::config::{Config, GetTerminator};
use memcachedb::{Client, MemcacheError};

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_client() -> (FakeServer, Client) {
    let server = FakeServer::start();
    let client = Client::connect("127.0.0.1", server.port()).unwrap();
    (server, client)
}

fn scripted_client(replies: &[&[u8]]) -> Client {
    let server = ScriptedServer::start(replies.iter().map(|r| r.to_vec()).collect());
    Client::connect_tcp(&server.addr()).unwrap()
}

// =============================================================================
// Storage and Retrieval Tests
// =============================================================================

#[test]
fn test_set_get_round_trip() {
    let (_server, mut client) = setup_client();

    client.set("foo", b"bar", 1, 0).unwrap();
    let result = client.get("foo").unwrap();

    assert_eq!(result.value, b"bar");
    assert_eq!(result.flags, 1);
}

#[test]
fn test_binary_value_round_trip() {
    let (_server, mut client) = setup_client();
    let value: Vec<u8> = (0..=255u8).chain(b"\r\nEND\r\n".iter().copied()).collect();

    client.set("bin", &value, u32::MAX, 0).unwrap();
    let result = client.get("bin").unwrap();

    assert_eq!(result.value, value);
    assert_eq!(result.flags, u32::MAX);
}

#[test]
fn test_zero_length_value_round_trip() {
    let (_server, mut client) = setup_client();

    client.set("empty", b"", 9, 0).unwrap();
    let result = client.get("empty").unwrap();

    assert!(result.value.is_empty());
    assert_eq!(result.flags, 9);
}

#[test]
fn test_large_value_round_trip() {
    let (_server, mut client) = setup_client();
    let value: Vec<u8> = (0..512 * 1024u32).map(|i| (i % 253) as u8).collect();

    client.set("large", &value, 0, 0).unwrap();
    assert_eq!(client.get("large").unwrap().value, value);
}

#[test]
fn test_get_through_fragmented_replies() {
    let server = FakeServer::start_with(FakeOptions {
        chunk_size: Some(3),
        ..FakeOptions::default()
    });
    let mut client = Client::connect("127.0.0.1", server.port()).unwrap();

    client.set("frag", b"a value split across many segments", 4, 0).unwrap();
    let result = client.get("frag").unwrap();

    assert_eq!(result.value, b"a value split across many segments");
    assert_eq!(result.flags, 4);
}

#[test]
fn test_get_missing_key_is_not_found() {
    let (_server, mut client) = setup_client();

    let result = client.get("missing");
    assert!(matches!(result, Err(MemcacheError::NotFound)));
}

#[test]
fn test_add_fresh_and_existing_key() {
    let (_server, mut client) = setup_client();

    client.add("foo", b"bar", 1, 0).unwrap();
    assert_eq!(client.get("foo").unwrap().value, b"bar");

    match client.add("foo", b"other", 1, 0) {
        Err(MemcacheError::Write(status)) => assert_eq!(status, "NOT_STORED"),
        other => panic!("Expected write error, got {:?}", other),
    }
    assert_eq!(client.get("foo").unwrap().value, b"bar");
}

#[test]
fn test_replace() {
    let (_server, mut client) = setup_client();

    assert!(matches!(
        client.replace("foo", b"new value", 1, 0),
        Err(MemcacheError::Write(_))
    ));

    client.add("foo", b"bar", 1, 0).unwrap();
    client.replace("foo", b"new value", 1, 0).unwrap();
    assert_eq!(client.get("foo").unwrap().value, b"new value");
}

#[test]
fn test_append_and_prepend_concatenate() {
    let (_server, mut client) = setup_client();

    client.set("foo", b"bar", 1, 0).unwrap();
    client.append("foo", b"suffix", 1, 0).unwrap();
    assert_eq!(client.get("foo").unwrap().value, b"barsuffix");

    client.prepend("foo", b"pre", 1, 0).unwrap();
    assert_eq!(client.get("foo").unwrap().value, b"prebarsuffix");
}

#[test]
fn test_append_missing_key_is_write_error() {
    let (_server, mut client) = setup_client();

    assert!(matches!(
        client.append("nope", b"x", 0, 0),
        Err(MemcacheError::Write(_))
    ));
}

#[test]
fn test_get_terminator_omitted() {
    let server = FakeServer::start_with(FakeOptions {
        omit_get_end: true,
        ..FakeOptions::default()
    });
    let config = Config::builder()
        .port(server.port())
        .get_terminator(GetTerminator::Omitted)
        .build();
    let mut client = Client::open(config).unwrap();

    client.set("foo", b"bar", 2, 0).unwrap();
    assert_eq!(client.get("foo").unwrap().value, b"bar");

    // Next exchange starts cleanly
    client.set("baz", b"qux", 0, 0).unwrap();
    assert_eq!(client.get("baz").unwrap().value, b"qux");
}

// =============================================================================
// Delete Tests
// =============================================================================

#[test]
fn test_delete_then_get_is_not_found() {
    let (_server, mut client) = setup_client();

    client.add("foo", b"bar", 1, 0).unwrap();
    client.delete("foo").unwrap();

    let result = client.get("foo");
    assert!(matches!(result, Err(MemcacheError::NotFound)));
}

#[test]
fn test_delete_missing_key_is_delete_error() {
    let (_server, mut client) = setup_client();

    match client.delete("missing") {
        Err(MemcacheError::Delete(status)) => assert_eq!(status, "NOT_FOUND"),
        other => panic!("Expected delete error, got {:?}", other),
    }
}

// =============================================================================
// Counter Tests
// =============================================================================

#[test]
fn test_incr_decr() {
    let (_server, mut client) = setup_client();

    client.set("counter", b"1234", 0, 0).unwrap();
    assert_eq!(client.incr("counter", 9).unwrap(), 1243);
    assert_eq!(client.decr("counter", 9).unwrap(), 1234);
    assert_eq!(client.get("counter").unwrap().value, b"1234");
}

#[test]
fn test_counter_missing_key_is_not_found() {
    let (_server, mut client) = setup_client();

    assert!(client.incr("missing", 1).unwrap_err().is_not_found());
    assert!(client.decr("missing", 1).unwrap_err().is_not_found());
    assert!(client.get("missing").unwrap_err().is_not_found());
}

#[test]
fn test_counter_on_non_numeric_value_is_read_error() {
    let (_server, mut client) = setup_client();

    client.set("word", b"hello", 0, 0).unwrap();
    assert!(matches!(
        client.incr("word", 1),
        Err(MemcacheError::Read(_))
    ));
}

// =============================================================================
// Multi-get Tests
// =============================================================================

#[test]
fn test_get_multi_skips_missing_keys() {
    let (_server, mut client) = setup_client();

    client.set("a", b"1", 1, 0).unwrap();
    client.set("c", b"3", 3, 0).unwrap();

    let results = client.get_multi(["a", "b", "c", "d"]).unwrap();

    assert_eq!(results.len(), 2);
    assert_eq!(results["a"].value, b"1");
    assert_eq!(results["a"].flags, 1);
    assert_eq!(results["c"].value, b"3");
    assert!(!results.contains_key("b"));
    assert!(!results.contains_key("d"));
}

#[test]
fn test_get_multi_all_missing_is_empty() {
    let (_server, mut client) = setup_client();

    let keys = vec!["x".to_string(), "y".to_string()];
    assert!(client.get_multi(&keys).unwrap().is_empty());
}

#[test]
fn test_get_multi_aborts_on_protocol_error() {
    let mut client = scripted_client(&[
        b"VALUE a 0 1\r\n1\r\nEND\r\n",
        b"END\r\n",
        b"garbage\r\n",
        b"VALUE d 0 1\r\n4\r\nEND\r\n",
    ]);

    let result = client.get_multi(["a", "b", "c", "d"]);
    assert!(matches!(result, Err(MemcacheError::Read(_))));
    assert!(!client.is_connected());
}

// =============================================================================
// Server Command Tests
// =============================================================================

#[test]
fn test_stats() {
    let (_server, mut client) = setup_client();
    client.set("foo", b"bar", 0, 0).unwrap();

    let stats = client.stats().unwrap();

    assert_eq!(stats.pid(), Some(std::process::id() as u64));
    assert_eq!(stats.uptime(), Some(42));
    assert_eq!(stats.version(), Some("1.4.5-fake"));
    assert_eq!(stats.curr_items(), Some(1));
    assert_eq!(stats.get("rusage_user"), Some("0:250000"));
    assert_eq!(stats.get_f64("rusage_user"), Some(0.25));
}

#[test]
fn test_flush_all() {
    let (_server, mut client) = setup_client();

    client.set("a", b"1", 0, 0).unwrap();
    client.set("b", b"2", 0, 0).unwrap();
    client.flush_all().unwrap();

    assert!(client.get_multi(["a", "b"]).unwrap().is_empty());
}

// =============================================================================
// Malformed Reply Tests
// =============================================================================

#[test]
fn test_store_reply_status_is_carried() {
    let mut client = scripted_client(&[b"EXISTS\r\n", b"SERVER_ERROR out of memory\r\n"]);

    match client.set("k", b"v", 0, 0) {
        Err(MemcacheError::Write(status)) => assert_eq!(status, "EXISTS"),
        other => panic!("Expected write error, got {:?}", other),
    }
    match client.set("k", b"v", 0, 0) {
        Err(MemcacheError::Write(status)) => assert_eq!(status, "SERVER_ERROR out of memory"),
        other => panic!("Expected write error, got {:?}", other),
    }
}

#[test]
fn test_flush_all_rejection_is_flush_all_error() {
    let mut client = scripted_client(&[b"ERROR\r\n"]);
    assert!(matches!(
        client.flush_all(),
        Err(MemcacheError::FlushAll(_))
    ));
}

#[test]
fn test_get_missing_end_is_read_error() {
    let mut client = scripted_client(&[b"VALUE k 0 1\r\nv\r\nOK\r\n"]);
    assert!(matches!(client.get("k"), Err(MemcacheError::Read(_))));
}

#[test]
fn test_get_short_payload_is_read_error() {
    // Server hangs up after sending part of the data block
    let mut client = scripted_client(&[b"VALUE k 0 100\r\nonly a few bytes"]);
    assert!(matches!(client.get("k"), Err(MemcacheError::Read(_))));
}

#[test]
fn test_malformed_counter_reply_is_read_error() {
    let mut client = scripted_client(&[b"twelve\r\n"]);
    assert!(matches!(client.incr("k", 1), Err(MemcacheError::Read(_))));
}

#[test]
fn test_server_hangup_is_transport_error() {
    let mut client = scripted_client(&[]);
    assert!(matches!(
        client.get("k"),
        Err(MemcacheError::Transport(_))
    ));
}

// =============================================================================
// Failed Exchange Tests
// =============================================================================

#[test]
fn test_timed_out_exchange_closes_connection() {
    // The reply to `incr a` arrives after the client gave up on it
    let server = ScriptedServer::start_delayed(vec![
        (Duration::from_millis(200), b"100\r\n".to_vec()),
        (Duration::ZERO, b"7\r\n".to_vec()),
    ]);
    let mut client = Client::connect_tcp(&server.addr()).unwrap();
    client
        .set_read_timeout(Some(Duration::from_millis(50)))
        .unwrap();

    assert!(client.incr("a", 1).unwrap_err().is_timeout());
    assert!(!client.is_connected());

    // Give the late reply time to land; it must never be read as `incr b`'s
    std::thread::sleep(Duration::from_millis(250));
    assert!(matches!(client.incr("b", 1), Err(MemcacheError::Connection)));
    assert!(matches!(client.get("a"), Err(MemcacheError::Connection)));
}

#[test]
fn test_malformed_reply_closes_connection() {
    // Rest of the stats table is still unread when the bad line is hit
    let mut client = scripted_client(&[
        b"STAT pid 1\r\nbogus\r\nSTAT uptime 2\r\nEND\r\n",
        b"STORED\r\n",
    ]);

    assert!(matches!(client.stats(), Err(MemcacheError::Read(_))));
    assert!(!client.is_connected());
    assert!(matches!(
        client.set("k", b"v", 0, 0),
        Err(MemcacheError::Connection)
    ));
}

#[test]
fn test_short_payload_closes_connection() {
    let mut client = scripted_client(&[b"VALUE k 0 100\r\nonly a few bytes"]);

    assert!(matches!(client.get("k"), Err(MemcacheError::Read(_))));
    assert!(matches!(client.delete("k"), Err(MemcacheError::Connection)));
}

#[test]
fn test_server_reported_conditions_keep_connection() {
    let (_server, mut client) = setup_client();

    assert!(client.get("missing").unwrap_err().is_not_found());
    assert!(client.incr("missing", 1).unwrap_err().is_not_found());
    assert!(matches!(
        client.delete("missing"),
        Err(MemcacheError::Delete(_))
    ));

    client.set("foo", b"bar", 0, 0).unwrap();
    assert!(matches!(
        client.add("foo", b"baz", 0, 0),
        Err(MemcacheError::Write(_))
    ));

    assert!(client.is_connected());
    assert_eq!(client.get("foo").unwrap().value, b"bar");
}

#[test]
fn test_flush_all_rejection_keeps_connection() {
    let mut client = scripted_client(&[b"ERROR\r\n", b"OK\r\n"]);

    assert!(matches!(client.flush_all(), Err(MemcacheError::FlushAll(_))));
    assert!(client.is_connected());
    client.flush_all().unwrap();
}

// =============================================================================
// Connection Lifecycle Tests
// =============================================================================

#[test]
fn test_closed_client_fails_with_connection_error() {
    let (_server, mut client) = setup_client();

    assert!(client.is_connected());
    assert!(client.peer().is_some());
    client.close().unwrap();
    assert!(!client.is_connected());
    assert!(client.peer().is_none());

    assert!(matches!(client.get("k"), Err(MemcacheError::Connection)));
    assert!(matches!(client.set("k", b"v", 0, 0), Err(MemcacheError::Connection)));
    assert!(matches!(client.add("k", b"v", 0, 0), Err(MemcacheError::Connection)));
    assert!(matches!(client.delete("k"), Err(MemcacheError::Connection)));
    assert!(matches!(client.incr("k", 1), Err(MemcacheError::Connection)));
    assert!(matches!(client.decr("k", 1), Err(MemcacheError::Connection)));
    assert!(matches!(client.stats(), Err(MemcacheError::Connection)));
    assert!(matches!(client.flush_all(), Err(MemcacheError::Connection)));
    assert!(matches!(client.get_multi(["k"]), Err(MemcacheError::Connection)));
    assert!(matches!(
        client.set_read_timeout(Some(Duration::from_secs(1))),
        Err(MemcacheError::Connection)
    ));
    assert!(matches!(client.close(), Err(MemcacheError::Connection)));
}

#[test]
fn test_connect_refused_is_transport_error() {
    // Bind then drop to obtain a port nobody listens on
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };

    let result = Client::connect("127.0.0.1", port);
    assert!(matches!(result, Err(MemcacheError::Transport(_))));
}

#[test]
fn test_read_timeout_surfaces_as_transport_error() {
    let addr = common::start_silent();
    let mut client = Client::connect_tcp(&addr).unwrap();
    client
        .set_read_timeout(Some(Duration::from_millis(50)))
        .unwrap();

    let err = client.get("k").unwrap_err();
    assert!(matches!(err, MemcacheError::Transport(_)));
    assert!(err.is_timeout());
    assert!(!client.is_connected());
}

#[test]
fn test_configured_read_timeout() {
    let addr = common::start_silent();
    let port: u16 = addr.rsplit(':').next().unwrap().parse().unwrap();
    let config = Config::builder().port(port).read_timeout_ms(50).build();
    let mut client = Client::open(config).unwrap();

    assert!(client.stats().unwrap_err().is_timeout());
}

#[cfg(unix)]
#[test]
fn test_unix_socket_round_trip() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let path = temp_dir.path().join("memcached.sock");
    common::start_unix(&path);

    // Port 0 selects the Unix socket at `host`
    let mut client = Client::connect(path.to_str().unwrap(), 0).unwrap();
    client.set("foo", b"bar", 3, 0).unwrap();
    let result = client.get("foo").unwrap();
    assert_eq!(result.value, b"bar");
    assert_eq!(result.flags, 3);

    let mut second = Client::connect_unix(&path).unwrap();
    assert_eq!(second.get("foo").unwrap().value, b"bar");
}
