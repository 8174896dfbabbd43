//! Error types for the memcachedb client
//!
//! A flat taxonomy: every failure an operation can report is one variant,
//! matched by kind rather than compared by identity.

use thiserror::Error;

/// Result type alias using MemcacheError
pub type Result<T> = std::result::Result<T, MemcacheError>;

/// Unified error type for client operations
#[derive(Debug, Error)]
pub enum MemcacheError {
    // -------------------------------------------------------------------------
    // Connection / Transport Errors
    // -------------------------------------------------------------------------
    /// Operation attempted on a closed client
    #[error("memcachedb: not connected")]
    Connection,

    /// Stream I/O failure or timeout, propagated verbatim
    #[error("memcachedb: transport error: {0}")]
    Transport(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Server-Reported Conditions
    // -------------------------------------------------------------------------
    /// The server reported that the key does not exist
    #[error("memcachedb: not found")]
    NotFound,

    /// Negative reply to a store command (`NOT_STORED`, `EXISTS`, ...)
    #[error("memcachedb: {0}")]
    Write(String),

    /// Anything other than `DELETED` in reply to `delete`
    #[error("memcachedb: delete error: {0}")]
    Delete(String),

    /// Anything other than `OK` in reply to `flush_all`
    #[error("memcachedb: flush_all error: {0}")]
    FlushAll(String),

    // -------------------------------------------------------------------------
    // Protocol Errors
    // -------------------------------------------------------------------------
    /// Reply did not match the grammar expected for the command
    #[error("memcachedb: read error: {0}")]
    Read(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("memcachedb: configuration error: {0}")]
    Config(String),
}

impl MemcacheError {
    /// True for the server-reported absence of a key
    pub fn is_not_found(&self) -> bool {
        matches!(self, MemcacheError::NotFound)
    }

    /// True if the underlying stream timed out
    ///
    /// Blocking sockets report an expired timeout as `WouldBlock` on Unix and
    /// `TimedOut` on Windows.
    pub fn is_timeout(&self) -> bool {
        match self {
            MemcacheError::Transport(e) => matches!(
                e.kind(),
                std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut
            ),
            _ => false,
        }
    }
}
