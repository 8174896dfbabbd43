//! Command definitions
//!
//! Represents requests sent to the server. Commands borrow their key and
//! value so a frame can be encoded without copying caller data first.

/// Storage command verbs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreVerb {
    /// Store unconditionally
    Set,

    /// Store only if the key does not exist
    Add,

    /// Store only if the key already exists
    Replace,

    /// Append to existing data
    Append,

    /// Prepend to existing data
    Prepend,
}

impl StoreVerb {
    /// Wire name of the verb
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreVerb::Set => "set",
            StoreVerb::Add => "add",
            StoreVerb::Replace => "replace",
            StoreVerb::Append => "append",
            StoreVerb::Prepend => "prepend",
        }
    }
}

/// Counter command verbs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CounterVerb {
    Incr,
    Decr,
}

impl CounterVerb {
    /// Wire name of the verb
    pub fn as_str(&self) -> &'static str {
        match self {
            CounterVerb::Incr => "incr",
            CounterVerb::Decr => "decr",
        }
    }
}

/// A command to send
#[derive(Debug, Clone, Copy)]
pub enum Command<'a> {
    /// Fetch a single key
    Get { key: &'a str },

    /// Store a value under a key
    Store {
        verb: StoreVerb,
        key: &'a str,
        flags: u32,
        exptime: i64,
        value: &'a [u8],
    },

    /// Delete a key
    Delete { key: &'a str },

    /// Increment or decrement a counter
    Counter {
        verb: CounterVerb,
        key: &'a str,
        delta: u64,
    },

    /// Invalidate all items
    FlushAll,

    /// Fetch server statistics
    Stats,
}

impl Command<'_> {
    /// Wire name of the command
    pub fn name(&self) -> &'static str {
        match self {
            Command::Get { .. } => "get",
            Command::Store { verb, .. } => verb.as_str(),
            Command::Delete { .. } => "delete",
            Command::Counter { verb, .. } => verb.as_str(),
            Command::FlushAll => "flush_all",
            Command::Stats => "stats",
        }
    }

    /// Key the command targets, if any
    pub fn key(&self) -> Option<&str> {
        match self {
            Command::Get { key }
            | Command::Store { key, .. }
            | Command::Delete { key }
            | Command::Counter { key, .. } => Some(*key),
            Command::FlushAll | Command::Stats => None,
        }
    }
}
