//! Protocol codec
//!
//! Encoding of commands and one decoder per response shape.
//!
//! Decoders take any `BufRead` positioned right after a command was sent and
//! consume exactly one reply. Line reads stop at the first `\n`; data blocks
//! are bounded by the length declared in their header, never by scanning for
//! line terminators.

use std::io::{self, BufRead, Read, Write};

use bytes::{BufMut, Bytes, BytesMut};

use crate::config::GetTerminator;
use crate::error::{MemcacheError, Result};
use super::{
    Command, FetchResult, StatTable,
    CRLF, DELETED, END, NOT_FOUND, OK, STAT_TOKEN, STORED, VALUE_TOKEN,
};

/// Largest data block a `VALUE` header may declare (128 MB)
pub const MAX_VALUE_SIZE: usize = 128 * 1024 * 1024;

/// Longest status, header or stats line accepted, terminator included (8 KB)
pub const MAX_LINE_SIZE: usize = 8 * 1024;

// =============================================================================
// Command Encoding
// =============================================================================

/// Encode a command into a single frame
///
/// Storage commands produce header line, data block and trailing CR LF in one
/// buffer so the whole frame goes out in a single `write_all`.
pub fn encode_command(command: &Command) -> Bytes {
    match *command {
        Command::Get { key } => simple_line(&["get", key]),
        Command::Store {
            verb,
            key,
            flags,
            exptime,
            value,
        } => {
            let header = format!(
                "{} {} {} {} {}\r\n",
                verb.as_str(),
                key,
                flags,
                exptime,
                value.len()
            );
            let mut frame = BytesMut::with_capacity(header.len() + value.len() + CRLF.len());
            frame.put_slice(header.as_bytes());
            frame.put_slice(value);
            frame.put_slice(CRLF);
            frame.freeze()
        }
        Command::Delete { key } => simple_line(&["delete", key]),
        Command::Counter { verb, key, delta } => {
            simple_line(&[verb.as_str(), key, delta.to_string().as_str()])
        }
        Command::FlushAll => simple_line(&["flush_all"]),
        Command::Stats => simple_line(&["stats"]),
    }
}

/// Join tokens with single spaces and terminate with CR LF
fn simple_line(tokens: &[&str]) -> Bytes {
    let len = tokens.iter().map(|t| t.len() + 1).sum::<usize>() + 1;
    let mut line = BytesMut::with_capacity(len);
    for (i, token) in tokens.iter().enumerate() {
        if i > 0 {
            line.put_u8(b' ');
        }
        line.put_slice(token.as_bytes());
    }
    line.put_slice(CRLF);
    line.freeze()
}

/// Write a command to a stream and flush it
pub fn write_command<W: Write>(writer: &mut W, command: &Command) -> Result<()> {
    let frame = encode_command(command);
    writer.write_all(&frame)?;
    writer.flush()?;
    tracing::trace!(command = command.name(), bytes = frame.len(), "Sent command");
    Ok(())
}

// =============================================================================
// Low-level Readers
// =============================================================================

/// Read one line, up to and including the first `\n`
///
/// A line longer than [`MAX_LINE_SIZE`] is a read error. End of stream
/// before a complete line is a transport error.
pub fn read_line<R: BufRead>(reader: &mut R) -> Result<Vec<u8>> {
    let mut line = Vec::new();
    reader
        .by_ref()
        .take(MAX_LINE_SIZE as u64 + 1)
        .read_until(b'\n', &mut line)?;

    if line.len() > MAX_LINE_SIZE {
        return Err(MemcacheError::Read(format!(
            "line too long: more than {} bytes",
            MAX_LINE_SIZE
        )));
    }

    if !line.ends_with(b"\n") {
        return Err(MemcacheError::Transport(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "connection closed before end of line",
        )));
    }

    tracing::trace!(line = %String::from_utf8_lossy(&line).trim_end(), "Received line");
    Ok(line)
}

/// Read exactly `len` bytes, accumulating partial reads
///
/// A stream that ends before `len` bytes arrive is a short read and reported
/// as a read error.
pub fn read_payload<R: Read>(reader: &mut R, len: usize) -> Result<Vec<u8>> {
    let mut value = vec![0u8; len];
    let mut filled = 0;

    while filled < len {
        match reader.read(&mut value[filled..]) {
            Ok(0) => {
                return Err(MemcacheError::Read(format!(
                    "short read: expected {} bytes, got {}",
                    len, filled
                )))
            }
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }

    Ok(value)
}

/// Server text of a line with surrounding whitespace removed
fn trimmed(line: &[u8]) -> String {
    String::from_utf8_lossy(line).trim().to_string()
}

// =============================================================================
// Response Decoders
// =============================================================================

/// Decode the reply to a storage command
///
/// Anything other than `STORED` becomes a write error carrying the server's
/// status text.
pub fn read_store_reply<R: BufRead>(reader: &mut R) -> Result<()> {
    let line = read_line(reader)?;
    if line == STORED {
        Ok(())
    } else {
        Err(MemcacheError::Write(trimmed(&line)))
    }
}

/// Decode the reply to `delete`
pub fn read_delete_reply<R: BufRead>(reader: &mut R) -> Result<()> {
    let line = read_line(reader)?;
    if line == DELETED {
        Ok(())
    } else {
        Err(MemcacheError::Delete(trimmed(&line)))
    }
}

/// Decode the reply to `flush_all`
pub fn read_flush_all_reply<R: BufRead>(reader: &mut R) -> Result<()> {
    let line = read_line(reader)?;
    if line == OK {
        Ok(())
    } else {
        Err(MemcacheError::FlushAll(trimmed(&line)))
    }
}

/// Decode the reply to a single-key `get`
///
/// Reads the `VALUE` header, exactly `<bytes>` bytes of data, the CR LF that
/// closes the data block and, under [`GetTerminator::End`], the final `END`
/// line.
pub fn read_value<R: BufRead>(
    reader: &mut R,
    key: &str,
    terminator: GetTerminator,
) -> Result<FetchResult> {
    let line = read_line(reader)?;
    if line == END {
        return Err(MemcacheError::NotFound);
    }

    let header = trimmed(&line);
    let tokens: Vec<&str> = header.split(' ').collect();
    if tokens.len() != 4 || tokens[0] != VALUE_TOKEN || tokens[1] != key {
        return Err(MemcacheError::Read(format!(
            "unexpected get reply: {:?}",
            header
        )));
    }

    let flags: u32 = tokens[2].parse().map_err(|_| {
        MemcacheError::Read(format!("invalid flags in get reply: {:?}", tokens[2]))
    })?;
    let len: usize = tokens[3].parse().map_err(|_| {
        MemcacheError::Read(format!("invalid length in get reply: {:?}", tokens[3]))
    })?;
    if len > MAX_VALUE_SIZE {
        return Err(MemcacheError::Read(format!(
            "value too large: {} bytes (max {})",
            len, MAX_VALUE_SIZE
        )));
    }

    let value = read_payload(reader, len)?;

    let line = read_line(reader)?;
    if line != CRLF {
        return Err(MemcacheError::Read(format!(
            "data block not terminated by CRLF: {:?}",
            String::from_utf8_lossy(&line)
        )));
    }

    if terminator == GetTerminator::End {
        let line = read_line(reader)?;
        if line != END {
            return Err(MemcacheError::Read(format!(
                "expected END after value, got {:?}",
                String::from_utf8_lossy(&line)
            )));
        }
    }

    Ok(FetchResult { value, flags })
}

/// Decode the reply to `incr` / `decr`
pub fn read_counter_reply<R: BufRead>(reader: &mut R) -> Result<u64> {
    let line = read_line(reader)?;
    if line == NOT_FOUND {
        return Err(MemcacheError::NotFound);
    }

    let text = trimmed(&line);
    text.parse()
        .map_err(|_| MemcacheError::Read(format!("malformed counter reply: {:?}", text)))
}

/// Decode the reply to `stats`
///
/// Accumulates `STAT <name> <value>` lines until `END`.
pub fn read_stats_reply<R: BufRead>(reader: &mut R) -> Result<StatTable> {
    let mut table = StatTable::new();

    loop {
        let line = read_line(reader)?;
        if line == END {
            return Ok(table);
        }

        let text = String::from_utf8_lossy(&line);
        let tokens: Vec<&str> = text.split_ascii_whitespace().collect();
        if tokens.len() != 3 || tokens[0] != STAT_TOKEN {
            return Err(MemcacheError::Read(format!(
                "unexpected stats line: {:?}",
                text.trim()
            )));
        }

        table.insert(tokens[1], tokens[2]);
    }
}
