//! Shared client
//!
//! Mutual exclusion around whole request/response cycles so one connection
//! can be used from several threads.

use std::collections::HashMap;

use parking_lot::{Mutex, MutexGuard};

use crate::error::Result;
use crate::protocol::{FetchResult, StatTable, StoreVerb};
use super::Client;

/// A `Client` behind a mutex
///
/// Every `Client` operation is forwarded. Each method holds the lock for one
/// full exchange, so commands and replies from different threads never
/// interleave on the wire. Use [`lock`] to run
/// several operations back to back without other threads in between.
///
/// [`lock`]: SharedClient::lock
pub struct SharedClient {
    inner: Mutex<Client>,
}

impl SharedClient {
    pub fn new(client: Client) -> Self {
        Self {
            inner: Mutex::new(client),
        }
    }

    /// Exclusive access until the guard is dropped
    pub fn lock(&self) -> MutexGuard<'_, Client> {
        self.inner.lock()
    }

    /// Run `f` with exclusive access to the client
    pub fn with<R>(&self, f: impl FnOnce(&mut Client) -> R) -> R {
        let mut client = self.inner.lock();
        f(&mut *client)
    }

    /// Unwrap the client
    pub fn into_inner(self) -> Client {
        self.inner.into_inner()
    }

    // =========================================================================
    // Forwarded operations, one lock per exchange
    // =========================================================================

    pub fn get(&self, key: &str) -> Result<FetchResult> {
        self.inner.lock().get(key)
    }

    /// Fetch several keys; the lock is held for the whole batch
    pub fn get_multi<I, K>(&self, keys: I) -> Result<HashMap<String, FetchResult>>
    where
        I: IntoIterator<Item = K>,
        K: AsRef<str>,
    {
        self.inner.lock().get_multi(keys)
    }

    pub fn store(
        &self,
        verb: StoreVerb,
        key: &str,
        value: &[u8],
        flags: u32,
        exptime: i64,
    ) -> Result<()> {
        self.inner.lock().store(verb, key, value, flags, exptime)
    }

    pub fn set(&self, key: &str, value: &[u8], flags: u32, exptime: i64) -> Result<()> {
        self.store(StoreVerb::Set, key, value, flags, exptime)
    }

    pub fn add(&self, key: &str, value: &[u8], flags: u32, exptime: i64) -> Result<()> {
        self.store(StoreVerb::Add, key, value, flags, exptime)
    }

    pub fn replace(&self, key: &str, value: &[u8], flags: u32, exptime: i64) -> Result<()> {
        self.store(StoreVerb::Replace, key, value, flags, exptime)
    }

    pub fn append(&self, key: &str, value: &[u8], flags: u32, exptime: i64) -> Result<()> {
        self.store(StoreVerb::Append, key, value, flags, exptime)
    }

    pub fn prepend(&self, key: &str, value: &[u8], flags: u32, exptime: i64) -> Result<()> {
        self.store(StoreVerb::Prepend, key, value, flags, exptime)
    }

    pub fn delete(&self, key: &str) -> Result<()> {
        self.inner.lock().delete(key)
    }

    pub fn incr(&self, key: &str, delta: u64) -> Result<u64> {
        self.inner.lock().incr(key, delta)
    }

    pub fn decr(&self, key: &str, delta: u64) -> Result<u64> {
        self.inner.lock().decr(key, delta)
    }

    pub fn flush_all(&self) -> Result<()> {
        self.inner.lock().flush_all()
    }

    pub fn stats(&self) -> Result<StatTable> {
        self.inner.lock().stats()
    }

    pub fn is_connected(&self) -> bool {
        self.inner.lock().is_connected()
    }

    /// Close the shared connection for every holder
    pub fn close(&self) -> Result<()> {
        self.inner.lock().close()
    }
}

impl From<Client> for SharedClient {
    fn from(client: Client) -> Self {
        Self::new(client)
    }
}
