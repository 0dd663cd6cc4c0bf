//! Expiring Key-Value Store
//!
//! This module implements the relay's only piece of real state: the latest
//! value published under each key, together with the time it was written.
//!
//! ## Design Decisions
//!
//! 1. **Sharded Locks**: Keys hash to one of 64 shards, each behind its own
//!    `RwLock`, so writers to different keys rarely contend.
//! 2. **Value and timestamp together**: an [`Entry`] holds both, so they are
//!    always replaced in one insert and can never disagree.
//! 3. **No lazy expiry**: reads never look at age. An entry stays readable
//!    until a sweep removes it.
//! 4. **Check-then-remove under one lock**: a sweep judges and removes entries
//!    while holding the shard's write lock, so a write that lands mid-sweep is
//!    judged by its own timestamp, never by the one it replaced.
//!
//! ## Concurrency Model
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       RelayStore                            │
//! │  ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌─────────┐           │
//! │  │ Shard 0 │ │ Shard 1 │ │ Shard 2 │ │ Shard N │           │
//! │  │ RwLock  │ │ RwLock  │ │ RwLock  │ │ RwLock  │           │
//! │  │ HashMap │ │ HashMap │ │ HashMap │ │ HashMap │           │
//! │  └─────────┘ └─────────┘ └─────────┘ └─────────┘           │
//! └─────────────────────────────────────────────────────────────┘
//!        ▲ store / get (HTTP handlers)      ▲ sweep (scheduler)
//! ```

use crate::storage::error::StoreError;
use crate::storage::validate::{check_key, check_token, check_value};
use bytes::Bytes;
use std::collections::HashMap;
use std::hash::{DefaultHasher, Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock};
use tracing::{debug, trace};

/// Number of shards for the store.
const NUM_SHARDS: usize = 64;

/// Entries older than this many seconds are removed by the next sweep.
pub const DEFAULT_MAX_AGE_SECS: u64 = 60;

/// A stored value and the time of its most recent write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// The value as last written
    pub value: Bytes,
    /// Seconds since the Unix epoch of the last successful write
    pub written_at: u64,
}

impl Entry {
    pub fn new(value: Bytes, written_at: u64) -> Self {
        Self { value, written_at }
    }

    /// Age of the entry at `now`. A write stamped later than `now` has age 0.
    #[inline]
    pub fn age(&self, now: u64) -> u64 {
        now.saturating_sub(self.written_at)
    }

    /// True once the entry is strictly older than `max_age`.
    #[inline]
    pub fn is_stale(&self, now: u64, max_age: u64) -> bool {
        self.age(now) > max_age
    }
}

/// Settings the store needs from the outside world.
///
/// # Example
///
/// ```
/// use progress_relay::storage::StoreConfig;
///
/// let config = StoreConfig::new("s3cret").with_max_age(120);
/// assert_eq!(config.max_age, 120);
/// ```
#[derive(Clone)]
pub struct StoreConfig {
    /// Shared secret every writer must present
    pub access_token: String,
    /// Eviction threshold in seconds
    pub max_age: u64,
}

impl StoreConfig {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            max_age: DEFAULT_MAX_AGE_SECS,
        }
    }

    pub fn with_max_age(mut self, max_age: u64) -> Self {
        self.max_age = max_age;
        self
    }
}

impl std::fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreConfig")
            .field("access_token", &"<redacted>")
            .field("max_age", &self.max_age)
            .finish()
    }
}

#[derive(Debug, Default)]
struct Shard {
    data: RwLock<HashMap<String, Entry>>,
}

/// The relay's shared key-value store.
///
/// Wrap it in an `Arc` and hand clones to the HTTP layer and the sweep
/// scheduler. All operations are thread-safe and none of them block on I/O.
///
/// # Example
///
/// ```
/// use progress_relay::storage::{RelayStore, StoreConfig, StoreError};
///
/// let store = RelayStore::new(StoreConfig::new("s3cret"));
///
/// store.store("job-42", "step 3 of 7", "s3cret", 1_000).unwrap();
/// assert_eq!(store.get("job-42").unwrap(), "step 3 of 7");
///
/// // Sixty-one seconds later the entry is swept away.
/// assert_eq!(store.sweep(1_061), 1);
/// assert_eq!(store.get("job-42"), Err(StoreError::NotFound));
/// ```
pub struct RelayStore {
    shards: Vec<Shard>,

    access_token: String,

    max_age: u64,

    /// Statistics: live keys
    key_count: AtomicU64,

    /// Statistics: successful writes
    write_count: AtomicU64,

    /// Statistics: read attempts, hits and misses alike
    read_count: AtomicU64,

    /// Statistics: writes refused by validation
    rejected_count: AtomicU64,

    /// Statistics: entries removed by sweeps
    evicted_count: AtomicU64,
}

impl std::fmt::Debug for RelayStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelayStore")
            .field("shards", &self.shards.len())
            .field("max_age", &self.max_age)
            .field("key_count", &self.key_count.load(Ordering::Relaxed))
            .finish()
    }
}

impl RelayStore {
    /// Creates an empty store.
    pub fn new(config: StoreConfig) -> Self {
        let shards = (0..NUM_SHARDS).map(|_| Shard::default()).collect();

        Self {
            shards,
            access_token: config.access_token,
            max_age: config.max_age,
            key_count: AtomicU64::new(0),
            write_count: AtomicU64::new(0),
            read_count: AtomicU64::new(0),
            rejected_count: AtomicU64::new(0),
            evicted_count: AtomicU64::new(0),
        }
    }

    #[inline]
    fn shard_index(&self, key: &str) -> usize {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        (hasher.finish() as usize) % NUM_SHARDS
    }

    #[inline]
    fn get_shard(&self, key: &str) -> &Shard {
        &self.shards[self.shard_index(key)]
    }

    /// Publishes `value` under `key`, stamped with `now`.
    ///
    /// Checks run in a fixed order and the first failure wins: token, key,
    /// value. A refused write leaves the store untouched. An accepted write
    /// replaces whatever was there; concurrent writers to one key race and
    /// the last to take the shard lock wins.
    pub fn store(&self, key: &str, value: &str, token: &str, now: u64) -> Result<(), StoreError> {
        if let Err(e) = Self::validate_write(key, value, token, &self.access_token) {
            self.rejected_count.fetch_add(1, Ordering::Relaxed);
            debug!(key_len = key.len(), value_len = value.len(), error = %e, "Write rejected");
            return Err(e);
        }

        let entry = Entry::new(Bytes::copy_from_slice(value.as_bytes()), now);

        let shard = self.get_shard(key);
        let mut data = shard.data.write().unwrap_or_else(PoisonError::into_inner);

        if data.insert(key.to_owned(), entry).is_none() {
            self.key_count.fetch_add(1, Ordering::Relaxed);
        }
        self.write_count.fetch_add(1, Ordering::Relaxed);

        trace!(key = key, written_at = now, "Stored value");
        Ok(())
    }

    fn validate_write(key: &str, value: &str, token: &str, secret: &str) -> Result<(), StoreError> {
        check_token(token, secret)?;
        check_key(key)?;
        check_value(value)?;
        Ok(())
    }

    /// Returns the latest value for `key`.
    ///
    /// Age is not consulted: a value stays readable until a sweep removes it.
    pub fn get(&self, key: &str) -> Result<Bytes, StoreError> {
        self.read_count.fetch_add(1, Ordering::Relaxed);
        check_key(key)?;

        let shard = self.get_shard(key);
        let data = shard.data.read().unwrap_or_else(PoisonError::into_inner);

        data.get(key)
            .map(|entry| entry.value.clone())
            .ok_or(StoreError::NotFound)
    }

    /// Returns a copy of the full entry for `key`, including its timestamp.
    pub fn get_entry(&self, key: &str) -> Option<Entry> {
        let shard = self.get_shard(key);
        let data = shard.data.read().unwrap_or_else(PoisonError::into_inner);
        data.get(key).cloned()
    }

    /// Removes every entry older than the eviction threshold at `now`.
    ///
    /// Each shard is judged and pruned under its own write lock, so an entry
    /// rewritten while the sweep is running is measured by its new timestamp.
    ///
    /// # Returns
    ///
    /// The number of entries removed.
    pub fn sweep(&self, now: u64) -> u64 {
        let max_age = self.max_age;
        let mut evicted = 0u64;

        for shard in &self.shards {
            let mut data = shard.data.write().unwrap_or_else(PoisonError::into_inner);
            let before = data.len();

            data.retain(|_, entry| !entry.is_stale(now, max_age));

            evicted += (before - data.len()) as u64;
        }

        if evicted > 0 {
            self.key_count.fetch_sub(evicted, Ordering::Relaxed);
            self.evicted_count.fetch_add(evicted, Ordering::Relaxed);
        }

        evicted
    }

    /// Eviction threshold in seconds.
    pub fn max_age(&self) -> u64 {
        self.max_age
    }

    /// Returns the number of live keys.
    pub fn len(&self) -> u64 {
        self.key_count.load(Ordering::Relaxed)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns a snapshot of the store's counters.
    pub fn stats(&self) -> StorageStats {
        StorageStats {
            keys: self.key_count.load(Ordering::Relaxed),
            writes: self.write_count.load(Ordering::Relaxed),
            reads: self.read_count.load(Ordering::Relaxed),
            rejected: self.rejected_count.load(Ordering::Relaxed),
            evicted: self.evicted_count.load(Ordering::Relaxed),
        }
    }
}

/// Store statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StorageStats {
    /// Number of keys currently stored
    pub keys: u64,
    /// Successful writes
    pub writes: u64,
    /// Read attempts
    pub reads: u64,
    /// Writes refused by validation
    pub rejected: u64,
    /// Entries removed by sweeps
    pub evicted: u64,
}
