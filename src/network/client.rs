//! Client facade
//!
//! Sequences encode → write → flush → decode for each operation over one
//! persistent connection.

use std::collections::HashMap;
use std::io::BufReader;
use std::path::Path;
use std::time::Duration;

use crate::config::{Config, Endpoint, GetTerminator};
use crate::error::{MemcacheError, Result};
use crate::protocol::{
    read_counter_reply, read_delete_reply, read_flush_all_reply, read_stats_reply,
    read_store_reply, read_value, Command, CounterVerb, FetchResult, StatTable, StoreVerb,
};
use super::{Connection, Stream};

/// Blocking client for one memcache / memcachedb server
///
/// ## Concurrency
/// The protocol is strictly half-duplex: a full command is written, then its
/// full reply is read. Every operation takes `&mut self`, so a `Client` can
/// only be driven by one caller at a time. Wrap it in a
/// [`SharedClient`](super::SharedClient) to share one connection between
/// threads, or open one client per thread.
///
/// ## Failed exchanges
/// A `Transport` or `Read` error closes the connection; every later call
/// fails with `Connection`. Reconnect to continue.
pub struct Client {
    /// Open connection, None once closed
    conn: Option<Connection>,

    /// Whether `get` hits end with an `END` line
    get_terminator: GetTerminator,
}

impl Client {
    // =========================================================================
    // Construction
    // =========================================================================

    /// Connect using a config
    pub fn open(config: Config) -> Result<Self> {
        let conn = Connection::open(&config)?;
        Ok(Self {
            conn: Some(conn),
            get_terminator: config.get_terminator,
        })
    }

    /// Connect to `host:port`, or to the Unix socket at `host` when port is 0
    pub fn connect(host: &str, port: u16) -> Result<Self> {
        Self::open(Config::builder().host(host).port(port).build())
    }

    /// Connect over TCP to `addr` (`host:port`)
    pub fn connect_tcp(addr: &str) -> Result<Self> {
        Self::from_endpoint(&Endpoint::Tcp(addr.to_string()))
    }

    /// Connect to a Unix domain socket
    pub fn connect_unix(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_endpoint(&Endpoint::Unix(path.as_ref().to_path_buf()))
    }

    fn from_endpoint(endpoint: &Endpoint) -> Result<Self> {
        let stream = Stream::connect(endpoint)?;
        Self::from_stream(stream)
    }

    /// Wrap an already connected stream with default settings
    pub fn from_stream(stream: Stream) -> Result<Self> {
        Ok(Self {
            conn: Some(Connection::new(stream)?),
            get_terminator: GetTerminator::default(),
        })
    }

    /// Change the `get` terminator policy
    pub fn with_get_terminator(mut self, terminator: GetTerminator) -> Self {
        self.get_terminator = terminator;
        self
    }

    // =========================================================================
    // Connection Management
    // =========================================================================

    /// Close the connection
    ///
    /// Closing an already closed client fails with `Connection`.
    pub fn close(&mut self) -> Result<()> {
        self.conn.take().ok_or(MemcacheError::Connection)?.close()
    }

    /// Whether the client still holds an open connection
    pub fn is_connected(&self) -> bool {
        self.conn.is_some()
    }

    /// Peer address of the open connection
    pub fn peer(&self) -> Option<&str> {
        self.conn.as_ref().map(Connection::peer_addr)
    }

    /// Set the timeout for subsequent reads, None blocks indefinitely
    ///
    /// An expired timeout surfaces as a `Transport` error.
    pub fn set_read_timeout(&mut self, timeout: Option<Duration>) -> Result<()> {
        self.conn()?.set_read_timeout(timeout)
    }

    /// Set the timeout for subsequent writes, None blocks indefinitely
    pub fn set_write_timeout(&mut self, timeout: Option<Duration>) -> Result<()> {
        self.conn()?.set_write_timeout(timeout)
    }

    fn conn(&mut self) -> Result<&mut Connection> {
        self.conn.as_mut().ok_or(MemcacheError::Connection)
    }

    /// Send one command and decode its reply
    ///
    /// A transport or read error can leave part of a reply unread (or part of
    /// a command unsent), so the connection is dropped and later calls fail
    /// with `Connection` instead of decoding stale bytes. Server-reported
    /// conditions leave the stream at a reply boundary and keep it open.
    fn exchange<T>(
        &mut self,
        command: &Command,
        decode: impl FnOnce(&mut BufReader<Stream>) -> Result<T>,
    ) -> Result<T> {
        let conn = self.conn()?;
        let result = match conn.send(command) {
            Ok(()) => decode(conn.reader()),
            Err(e) => Err(e),
        };

        if let Err(MemcacheError::Transport(_) | MemcacheError::Read(_)) = &result {
            if let Some(conn) = self.conn.take() {
                tracing::debug!(
                    command = command.name(),
                    "Dropping connection to {} after failed exchange",
                    conn.peer_addr()
                );
                let _ = conn.close();
            }
        }

        result
    }

    // =========================================================================
    // Retrieval
    // =========================================================================

    /// Fetch a value and its flags
    ///
    /// A missing key is `NotFound`.
    pub fn get(&mut self, key: &str) -> Result<FetchResult> {
        let terminator = self.get_terminator;
        self.exchange(&Command::Get { key }, |reader| {
            read_value(reader, key, terminator)
        })
    }

    /// Fetch several keys with one `get` per key
    ///
    /// Missing keys are left out of the result. Any other error aborts the
    /// remaining keys and is returned.
    pub fn get_multi<I, K>(&mut self, keys: I) -> Result<HashMap<String, FetchResult>>
    where
        I: IntoIterator<Item = K>,
        K: AsRef<str>,
    {
        let mut results = HashMap::new();
        for key in keys {
            let key = key.as_ref();
            match self.get(key) {
                Ok(result) => {
                    results.insert(key.to_string(), result);
                }
                Err(MemcacheError::NotFound) => {}
                Err(e) => return Err(e),
            }
        }
        Ok(results)
    }

    // =========================================================================
    // Storage
    // =========================================================================

    /// Send a storage command
    ///
    /// A reply other than `STORED` is a `Write` error carrying the server's
    /// status text (`NOT_STORED`, `EXISTS`, ...).
    pub fn store(
        &mut self,
        verb: StoreVerb,
        key: &str,
        value: &[u8],
        flags: u32,
        exptime: i64,
    ) -> Result<()> {
        let command = Command::Store {
            verb,
            key,
            flags,
            exptime,
            value,
        };
        self.exchange(&command, read_store_reply)
    }

    /// Store this data
    pub fn set(&mut self, key: &str, value: &[u8], flags: u32, exptime: i64) -> Result<()> {
        self.store(StoreVerb::Set, key, value, flags, exptime)
    }

    /// Store this data, but only if the server doesn't already hold the key
    pub fn add(&mut self, key: &str, value: &[u8], flags: u32, exptime: i64) -> Result<()> {
        self.store(StoreVerb::Add, key, value, flags, exptime)
    }

    /// Store this data, but only if the server already holds the key
    pub fn replace(&mut self, key: &str, value: &[u8], flags: u32, exptime: i64) -> Result<()> {
        self.store(StoreVerb::Replace, key, value, flags, exptime)
    }

    /// Add this data after the existing data of the key
    pub fn append(&mut self, key: &str, value: &[u8], flags: u32, exptime: i64) -> Result<()> {
        self.store(StoreVerb::Append, key, value, flags, exptime)
    }

    /// Add this data before the existing data of the key
    pub fn prepend(&mut self, key: &str, value: &[u8], flags: u32, exptime: i64) -> Result<()> {
        self.store(StoreVerb::Prepend, key, value, flags, exptime)
    }

    /// Delete a key
    pub fn delete(&mut self, key: &str) -> Result<()> {
        self.exchange(&Command::Delete { key }, read_delete_reply)
    }

    // =========================================================================
    // Counters
    // =========================================================================

    /// Increment a counter and return its new value
    ///
    /// The stored data is treated as the decimal representation of a 64-bit
    /// unsigned integer. The key must exist; a missing key is `NotFound`.
    pub fn incr(&mut self, key: &str, delta: u64) -> Result<u64> {
        self.counter(CounterVerb::Incr, key, delta)
    }

    /// Decrement a counter and return its new value
    pub fn decr(&mut self, key: &str, delta: u64) -> Result<u64> {
        self.counter(CounterVerb::Decr, key, delta)
    }

    fn counter(&mut self, verb: CounterVerb, key: &str, delta: u64) -> Result<u64> {
        self.exchange(&Command::Counter { verb, key, delta }, read_counter_reply)
    }

    // =========================================================================
    // Server
    // =========================================================================

    /// Invalidate all items on the server
    pub fn flush_all(&mut self) -> Result<()> {
        self.exchange(&Command::FlushAll, read_flush_all_reply)
    }

    /// Fetch server statistics
    pub fn stats(&mut self) -> Result<StatTable> {
        self.exchange(&Command::Stats, read_stats_reply)
    }
}

impl Drop for Client {
    fn drop(&mut self) {
        if let Some(conn) = self.conn.take() {
            let _ = conn.close();
        }
    }
}
