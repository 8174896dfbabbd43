//! Protocol Module
//!
//! Encoder and decoder for the memcache / memcachedb text protocol.
//!
//! ## Request Format
//! Every command is an ASCII line terminated by CR LF. Storage commands are
//! followed by a data block of exactly `<bytes>` bytes and another CR LF.
//! ```text
//! get <key>\r\n
//! <set|add|replace|append|prepend> <key> <flags> <exptime> <bytes>\r\n
//! <data block>\r\n
//! delete <key>\r\n
//! <incr|decr> <key> <delta>\r\n
//! flush_all\r\n
//! stats\r\n
//! ```
//!
//! ## Response Shapes
//! ```text
//! get:        VALUE <key> <flags> <bytes>\r\n<data block>\r\nEND\r\n
//!             END\r\n                                  (miss)
//! store:      STORED\r\n | NOT_STORED\r\n | EXISTS\r\n | ...
//! delete:     DELETED\r\n | NOT_FOUND\r\n
//! incr/decr:  <value>\r\n | NOT_FOUND\r\n
//! flush_all:  OK\r\n
//! stats:      STAT <name> <value>\r\n ... END\r\n
//! ```
//!
//! Sentinels are compared byte-exact, CR LF included. Tokenized lines are
//! trimmed before splitting.

mod command;
mod response;
mod codec;

pub use command::{Command, CounterVerb, StoreVerb};
pub use response::{FetchResult, StatTable};
pub use codec::{
    encode_command, write_command,
    read_line, read_payload,
    read_value, read_store_reply, read_delete_reply, read_flush_all_reply,
    read_counter_reply, read_stats_reply,
    MAX_LINE_SIZE, MAX_VALUE_SIZE,
};

// =============================================================================
// Wire Constants
// =============================================================================

/// Line terminator
pub const CRLF: &[u8] = b"\r\n";

/// End of a `get` or `stats` response
pub const END: &[u8] = b"END\r\n";

/// Successful store
pub const STORED: &[u8] = b"STORED\r\n";

/// Successful delete
pub const DELETED: &[u8] = b"DELETED\r\n";

/// Successful flush_all
pub const OK: &[u8] = b"OK\r\n";

/// Missing key for incr/decr (and delete)
pub const NOT_FOUND: &[u8] = b"NOT_FOUND\r\n";

/// First token of a `get` value header
pub const VALUE_TOKEN: &str = "VALUE";

/// First token of each `stats` line
pub const STAT_TOKEN: &str = "STAT";
