//! Response definitions
//!
//! Typed results decoded from server replies.

use std::collections::BTreeMap;

/// A value fetched with `get`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResult {
    /// Raw value bytes, exactly as stored
    pub value: Vec<u8>,

    /// Opaque flags stored with the value
    pub flags: u32,
}

/// Statistics reported by `stats`
///
/// Values are kept in their raw string form. Use the typed accessors to
/// interpret numeric ones.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatTable {
    entries: BTreeMap<String, String>,
}

impl StatTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a stat, replacing any earlier value with the same name
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(name.into(), value.into());
    }

    /// Raw string value of a stat
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(String::as_str)
    }

    /// Stat parsed as an unsigned integer
    pub fn get_u64(&self, name: &str) -> Option<u64> {
        self.get(name)?.parse().ok()
    }

    /// Stat parsed as a signed integer
    pub fn get_i64(&self, name: &str) -> Option<i64> {
        self.get(name)?.parse().ok()
    }

    /// Stat parsed as a float
    ///
    /// `rusage_*` stats are reported as `seconds:microseconds` by some
    /// servers and `seconds.microseconds` by others; both forms are accepted.
    pub fn get_f64(&self, name: &str) -> Option<f64> {
        let raw = self.get(name)?;
        match raw.split_once(':') {
            Some((secs, micros)) => {
                let secs: u64 = secs.parse().ok()?;
                let micros: u64 = micros.parse().ok()?;
                Some(secs as f64 + micros as f64 / 1_000_000.0)
            }
            None => raw.parse().ok(),
        }
    }

    /// Number of stats in the table
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over `(name, raw value)` pairs in name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    // =========================================================================
    // Well-known stats
    // =========================================================================

    /// Process id of the server
    pub fn pid(&self) -> Option<u64> {
        self.get_u64("pid")
    }

    /// Seconds the server has been running
    pub fn uptime(&self) -> Option<u64> {
        self.get_u64("uptime")
    }

    /// Current UNIX time according to the server
    pub fn time(&self) -> Option<u64> {
        self.get_u64("time")
    }

    /// Server version string
    pub fn version(&self) -> Option<&str> {
        self.get("version")
    }

    /// Items currently stored
    pub fn curr_items(&self) -> Option<u64> {
        self.get_u64("curr_items")
    }

    /// Items stored since the server started
    pub fn total_items(&self) -> Option<u64> {
        self.get_u64("total_items")
    }

    /// Bytes currently used to store items
    pub fn bytes(&self) -> Option<u64> {
        self.get_u64("bytes")
    }

    pub fn curr_connections(&self) -> Option<u64> {
        self.get_u64("curr_connections")
    }

    pub fn total_connections(&self) -> Option<u64> {
        self.get_u64("total_connections")
    }

    /// Cumulative retrieval requests
    pub fn cmd_get(&self) -> Option<u64> {
        self.get_u64("cmd_get")
    }

    /// Cumulative storage requests
    pub fn cmd_set(&self) -> Option<u64> {
        self.get_u64("cmd_set")
    }

    pub fn get_hits(&self) -> Option<u64> {
        self.get_u64("get_hits")
    }

    pub fn get_misses(&self) -> Option<u64> {
        self.get_u64("get_misses")
    }

    /// Valid items removed to free memory
    pub fn evictions(&self) -> Option<u64> {
        self.get_u64("evictions")
    }

    /// Worker threads
    pub fn threads(&self) -> Option<u64> {
        self.get_u64("threads")
    }
}

impl<'a> IntoIterator for &'a StatTable {
    type Item = (&'a String, &'a String);
    type IntoIter = std::collections::btree_map::Iter<'a, String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
