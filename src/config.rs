//! Configuration for the memcachedb client
//!
//! Centralized connection settings with sensible defaults.

use std::path::PathBuf;
use std::time::Duration;

/// Default memcached / memcachedb port
pub const DEFAULT_PORT: u16 = 11211;

/// Client configuration
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Endpoint Configuration
    // -------------------------------------------------------------------------
    /// Server host name, or the socket path when `port` is 0
    pub host: String,

    /// Server TCP port; 0 selects a Unix domain socket at `host`
    pub port: u16,

    // -------------------------------------------------------------------------
    // Socket Configuration
    // -------------------------------------------------------------------------
    /// Read timeout (milliseconds), 0 = block indefinitely
    pub read_timeout_ms: u64,

    /// Write timeout (milliseconds), 0 = block indefinitely
    pub write_timeout_ms: u64,

    /// Disable Nagle's algorithm on TCP connections
    pub tcp_nodelay: bool,

    // -------------------------------------------------------------------------
    // Protocol Configuration
    // -------------------------------------------------------------------------
    /// Whether a single-key `get` hit is followed by `END\r\n`
    pub get_terminator: GetTerminator,
}

/// Trailing line expected after a `get` hit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GetTerminator {
    /// `VALUE ...\r\n<data>\r\nEND\r\n` (memcached and memcachedb)
    #[default]
    End,

    /// `VALUE ...\r\n<data>\r\n` with no closing `END` line
    Omitted,
}

/// Where to connect, resolved from a Config
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    /// `host:port`
    Tcp(String),

    /// Filesystem path of a Unix domain socket
    Unix(PathBuf),
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            read_timeout_ms: 0,
            write_timeout_ms: 0,
            tcp_nodelay: true,
            get_terminator: GetTerminator::End,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Resolve the endpoint; port 0 means a Unix socket path
    pub fn endpoint(&self) -> Endpoint {
        if self.port == 0 {
            Endpoint::Unix(PathBuf::from(&self.host))
        } else {
            Endpoint::Tcp(format!("{}:{}", self.host, self.port))
        }
    }

    /// Read timeout as a Duration, None when disabled
    pub fn read_timeout(&self) -> Option<Duration> {
        millis(self.read_timeout_ms)
    }

    /// Write timeout as a Duration, None when disabled
    pub fn write_timeout(&self) -> Option<Duration> {
        millis(self.write_timeout_ms)
    }
}

fn millis(ms: u64) -> Option<Duration> {
    (ms > 0).then(|| Duration::from_millis(ms))
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the server host (or socket path when port is 0)
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.config.host = host.into();
        self
    }

    /// Set the server port
    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    /// Connect to a Unix domain socket at `path`
    pub fn unix_socket(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.host = path.into().to_string_lossy().into_owned();
        self.config.port = 0;
        self
    }

    /// Set the read timeout (in milliseconds)
    pub fn read_timeout_ms(mut self, ms: u64) -> Self {
        self.config.read_timeout_ms = ms;
        self
    }

    /// Set the write timeout (in milliseconds)
    pub fn write_timeout_ms(mut self, ms: u64) -> Self {
        self.config.write_timeout_ms = ms;
        self
    }

    /// Enable or disable TCP_NODELAY
    pub fn tcp_nodelay(mut self, enabled: bool) -> Self {
        self.config.tcp_nodelay = enabled;
        self
    }

    /// Set the `get` terminator policy
    pub fn get_terminator(mut self, terminator: GetTerminator) -> Self {
        self.config.get_terminator = terminator;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
