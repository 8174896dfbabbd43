//! Connection
//!
//! One open socket to a server with buffered read and write halves.

use std::io::{BufReader, BufWriter};
use std::time::Duration;

use crate::config::Config;
use crate::error::Result;
use crate::protocol::{write_command, Command};
use super::Stream;

/// A single open connection
pub struct Connection {
    /// Socket reader (buffered so replies can be consumed line by line)
    reader: BufReader<Stream>,

    /// Socket writer (buffered so a command frame goes out in one flush)
    writer: BufWriter<Stream>,

    /// Peer address for logging
    peer_addr: String,
}

impl Connection {
    /// Open a connection as described by `config`
    ///
    /// Applies TCP_NODELAY and the configured timeouts before returning.
    pub fn open(config: &Config) -> Result<Self> {
        let stream = Stream::connect(&config.endpoint())?;
        stream.set_nodelay(config.tcp_nodelay)?;

        let connection = Self::new(stream)?;
        connection.set_read_timeout(config.read_timeout())?;
        connection.set_write_timeout(config.write_timeout())?;

        Ok(connection)
    }

    /// Wrap an already connected stream
    pub fn new(stream: Stream) -> Result<Self> {
        let peer_addr = stream.peer_description();

        // Clone stream for separate read/write handles
        let read_stream = stream.try_clone()?;
        let write_stream = stream;

        tracing::debug!("Connected to {}", peer_addr);

        Ok(Self {
            reader: BufReader::new(read_stream),
            writer: BufWriter::new(write_stream),
            peer_addr,
        })
    }

    /// Set the timeout for subsequent reads, None blocks indefinitely
    pub fn set_read_timeout(&self, timeout: Option<Duration>) -> Result<()> {
        self.reader.get_ref().set_read_timeout(timeout)
    }

    /// Set the timeout for subsequent writes, None blocks indefinitely
    pub fn set_write_timeout(&self, timeout: Option<Duration>) -> Result<()> {
        self.writer.get_ref().set_write_timeout(timeout)
    }

    /// Encode, write and flush a command
    pub fn send(&mut self, command: &Command) -> Result<()> {
        write_command(&mut self.writer, command)
    }

    /// Buffered reader positioned at the next reply
    pub fn reader(&mut self) -> &mut BufReader<Stream> {
        &mut self.reader
    }

    /// Shut the socket down
    pub fn close(self) -> Result<()> {
        tracing::debug!("Closing connection to {}", self.peer_addr);
        self.writer.get_ref().shutdown()
    }

    /// Get the peer address string
    pub fn peer_addr(&self) -> &str {
        &self.peer_addr
    }
}
