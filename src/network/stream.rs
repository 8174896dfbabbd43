//! Transport stream
//!
//! A TCP or Unix domain socket behind one `Read + Write` type.

use std::io::{self, Read, Write};
use std::net::{Shutdown, TcpStream};
#[cfg(unix)]
use std::os::unix::net::UnixStream;
use std::time::Duration;

use crate::config::Endpoint;
use crate::error::{MemcacheError, Result};

/// Connected socket to a server
#[derive(Debug)]
pub enum Stream {
    Tcp(TcpStream),

    #[cfg(unix)]
    Unix(UnixStream),
}

impl Stream {
    /// Connect to an endpoint
    pub fn connect(endpoint: &Endpoint) -> Result<Self> {
        match endpoint {
            Endpoint::Tcp(addr) => Ok(Stream::Tcp(TcpStream::connect(addr.as_str())?)),

            #[cfg(unix)]
            Endpoint::Unix(path) => Ok(Stream::Unix(UnixStream::connect(path)?)),

            #[cfg(not(unix))]
            Endpoint::Unix(path) => Err(MemcacheError::Config(format!(
                "Unix domain sockets are not supported on this platform: {}",
                path.display()
            ))),
        }
    }

    /// Clone the handle so reads and writes can be buffered separately
    pub fn try_clone(&self) -> Result<Self> {
        match self {
            Stream::Tcp(s) => Ok(Stream::Tcp(s.try_clone()?)),
            #[cfg(unix)]
            Stream::Unix(s) => Ok(Stream::Unix(s.try_clone()?)),
        }
    }

    /// Set TCP_NODELAY; a no-op for Unix sockets
    pub fn set_nodelay(&self, nodelay: bool) -> Result<()> {
        match self {
            Stream::Tcp(s) => s.set_nodelay(nodelay)?,
            #[cfg(unix)]
            Stream::Unix(_) => {}
        }
        Ok(())
    }

    pub fn set_read_timeout(&self, timeout: Option<Duration>) -> Result<()> {
        match self {
            Stream::Tcp(s) => s.set_read_timeout(timeout)?,
            #[cfg(unix)]
            Stream::Unix(s) => s.set_read_timeout(timeout)?,
        }
        Ok(())
    }

    pub fn set_write_timeout(&self, timeout: Option<Duration>) -> Result<()> {
        match self {
            Stream::Tcp(s) => s.set_write_timeout(timeout)?,
            #[cfg(unix)]
            Stream::Unix(s) => s.set_write_timeout(timeout)?,
        }
        Ok(())
    }

    /// Shut down both halves of the socket
    pub fn shutdown(&self) -> Result<()> {
        let result = match self {
            Stream::Tcp(s) => s.shutdown(Shutdown::Both),
            #[cfg(unix)]
            Stream::Unix(s) => s.shutdown(Shutdown::Both),
        };

        match result {
            // Peer already hung up
            Err(e) if e.kind() == io::ErrorKind::NotConnected => Ok(()),
            other => other.map_err(MemcacheError::from),
        }
    }

    /// Human-readable peer address for logging
    pub fn peer_description(&self) -> String {
        match self {
            Stream::Tcp(s) => s
                .peer_addr()
                .map(|a| a.to_string())
                .unwrap_or_else(|_| "unknown".to_string()),
            #[cfg(unix)]
            Stream::Unix(s) => s
                .peer_addr()
                .ok()
                .and_then(|a| a.as_pathname().map(|p| p.display().to_string()))
                .unwrap_or_else(|| "unix socket".to_string()),
        }
    }
}

impl Read for Stream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Stream::Tcp(s) => s.read(buf),
            #[cfg(unix)]
            Stream::Unix(s) => s.read(buf),
        }
    }
}

impl Write for Stream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Stream::Tcp(s) => s.write(buf),
            #[cfg(unix)]
            Stream::Unix(s) => s.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Stream::Tcp(s) => s.flush(),
            #[cfg(unix)]
            Stream::Unix(s) => s.flush(),
        }
    }
}
