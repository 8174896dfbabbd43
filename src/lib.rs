//! # memcachedb
//!
//! A blocking client for the memcache / memcachedb text protocol:
//! - `get`, `set`, `add`, `replace`, `append`, `prepend`, `delete`
//! - `incr` / `decr` counters
//! - `stats` and `flush_all`
//! - TCP or Unix domain socket transport with read/write timeouts
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Embedding Application                    │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                      Client Facade                           │
//! │          (one command/reply exchange per call)               │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │   Encoder   │          │   Decoder   │
//!   │  (frames)   │          │ (per shape) │
//!   └──────┬──────┘          └──────▲──────┘
//!          │                        │
//!          ▼                        │
//!   ┌─────────────────────────────────────┐
//!   │   Connection (BufWriter / BufReader) │
//!   │         TCP or Unix socket           │
//!   └─────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use memcachedb::Client;
//!
//! # fn main() -> memcachedb::Result<()> {
//! let mut client = Client::connect("127.0.0.1", 11211)?;
//! client.set("foo", b"bar", 0, 0)?;
//! let fetched = client.get("foo")?;
//! println!("{} {}", String::from_utf8_lossy(&fetched.value), fetched.flags);
//! # Ok(())
//! # }
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod protocol;
pub mod network;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{MemcacheError, Result};
pub use config::{Config, Endpoint, GetTerminator};
pub use network::{Client, SharedClient};
pub use protocol::{FetchResult, StatTable};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of the client
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
