//! Thread-Safe Storage Engine with Expiry Support
//!
//! This module implements the key-value store behind GET and SET.
//!
//! ## Design Decisions
//!
//! 1. **Sharded Locks**: Keys are spread over 64 shards, each behind its own lock.
//! 2. **Absolute Expiry**: Each value carries the epoch millisecond at which it
//!    stops being visible; `0` means it never expires.
//! 3. **Lazy Expiry**: Expired values are removed when a read finds them.
//!
//! ## Concurrency Model
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     StorageEngine                           │
//! │  ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌─────────┐           │
//! │  │ Shard 0 │ │ Shard 1 │ │ Shard 2 │ │ Shard N │           │
//! │  │ RwLock  │ │ RwLock  │ │ RwLock  │ │ RwLock  │           │
//! │  │ HashMap │ │ HashMap │ │ HashMap │ │ HashMap │           │
//! │  └─────────┘ └─────────┘ └─────────┘ └─────────┘           │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! A key always hashes to the same shard, so the overwrite in SET and the lazy
//! delete in GET for that key take the same write lock.

use bytes::Bytes;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::hash::{DefaultHasher, Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};

/// Number of shards for the storage engine.
const NUM_SHARDS: usize = 64;

/// Expiry sentinel: the value never expires.
pub const NO_EXPIRY: u64 = 0;

/// A stored payload and the time it stops being visible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredValue {
    /// The value bytes, returned as-is by GET
    pub payload: Bytes,
    /// Absolute epoch milliseconds of expiry, or [`NO_EXPIRY`]
    pub expiry_at_ms: u64,
}

impl StoredValue {
    /// Creates a value that never expires.
    pub fn new(payload: Bytes) -> Self {
        Self {
            payload,
            expiry_at_ms: NO_EXPIRY,
        }
    }

    /// Creates a value that expires `ttl_ms` after `now_ms`.
    ///
    /// The result always carries a real deadline, even for a zero TTL at
    /// epoch zero, so it can never collapse into the sentinel.
    pub fn with_ttl(payload: Bytes, ttl_ms: u64, now_ms: u64) -> Self {
        Self {
            payload,
            expiry_at_ms: now_ms.saturating_add(ttl_ms).max(1),
        }
    }

    /// Checks whether this value is logically absent at `now_ms`.
    #[inline]
    pub fn is_expired(&self, now_ms: u64) -> bool {
        self.expiry_at_ms != NO_EXPIRY && now_ms >= self.expiry_at_ms
    }
}

/// Shared key-value state used by the command handlers.
///
/// Implementations must keep the overwrite in `set` and the expiry removal in
/// `get` under the same exclusion for any given key.
pub trait Store: Send + Sync {
    /// Returns the payload for `key` if it is present and live at `now_ms`.
    ///
    /// An entry found expired is removed before returning `None`.
    fn get(&self, key: &[u8], now_ms: u64) -> Option<Bytes>;

    /// Stores `payload` under `key`, replacing any previous entry.
    ///
    /// With `ttl_ms`, the value expires at `now_ms + ttl_ms`.
    fn set(&self, key: Bytes, payload: Bytes, ttl_ms: Option<u64>, now_ms: u64);

    /// Number of entries physically held, including expired ones not yet
    /// removed.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A single shard containing a portion of the key-value pairs.
#[derive(Debug, Default)]
struct Shard {
    data: RwLock<HashMap<Bytes, StoredValue>>,
}

/// The sharded in-memory store.
///
/// Wrap it in an `Arc` and share it across every connection task.
///
/// # Example
///
/// ```
/// use respkv::storage::{StorageEngine, Store};
/// use bytes::Bytes;
///
/// let engine = StorageEngine::new();
///
/// engine.set(Bytes::from("name"), Bytes::from("Ariz"), None, 1_000);
/// assert_eq!(engine.get(b"name", 1_000), Some(Bytes::from("Ariz")));
///
/// engine.set(Bytes::from("session"), Bytes::from("abc123"), Some(100), 1_000);
/// assert_eq!(engine.get(b"session", 1_099), Some(Bytes::from("abc123")));
/// assert_eq!(engine.get(b"session", 1_100), None);
/// ```
pub struct StorageEngine {
    shards: Vec<Shard>,

    /// Statistics: total GET operations
    get_count: AtomicU64,

    /// Statistics: total SET operations
    set_count: AtomicU64,

    /// Statistics: number of entries removed by lazy expiry
    expired_count: AtomicU64,
}

impl std::fmt::Debug for StorageEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageEngine")
            .field("shards", &self.shards.len())
            .field("get_count", &self.get_count.load(Ordering::Relaxed))
            .field("set_count", &self.set_count.load(Ordering::Relaxed))
            .finish()
    }
}

impl Default for StorageEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl StorageEngine {
    /// Creates an empty storage engine.
    pub fn new() -> Self {
        let shards = (0..NUM_SHARDS).map(|_| Shard::default()).collect();

        Self {
            shards,
            get_count: AtomicU64::new(0),
            set_count: AtomicU64::new(0),
            expired_count: AtomicU64::new(0),
        }
    }

    /// Determines which shard a key belongs to.
    #[inline]
    fn shard_index(&self, key: &[u8]) -> usize {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        (hasher.finish() as usize) % NUM_SHARDS
    }

    #[inline]
    fn get_shard(&self, key: &[u8]) -> &Shard {
        &self.shards[self.shard_index(key)]
    }

    /// Returns database statistics.
    pub fn stats(&self) -> StorageStats {
        StorageStats {
            keys: self.len(),
            get_ops: self.get_count.load(Ordering::Relaxed),
            set_ops: self.set_count.load(Ordering::Relaxed),
            expired: self.expired_count.load(Ordering::Relaxed),
        }
    }
}

impl Store for StorageEngine {
    fn get(&self, key: &[u8], now_ms: u64) -> Option<Bytes> {
        self.get_count.fetch_add(1, Ordering::Relaxed);

        let shard = self.get_shard(key);

        // Fast path: shared lock for missing or live keys
        {
            let data = shard.data.read();
            match data.get(key) {
                None => return None,
                Some(entry) if !entry.is_expired(now_ms) => return Some(entry.payload.clone()),
                Some(_) => {}
            }
        }

        // Expired: take the write lock and re-check, a SET may have landed in between
        let mut data = shard.data.write();
        match data.get(key) {
            Some(entry) if entry.is_expired(now_ms) => {
                data.remove(key);
                self.expired_count.fetch_add(1, Ordering::Relaxed);
                None
            }
            Some(entry) => Some(entry.payload.clone()),
            None => None,
        }
    }

    fn set(&self, key: Bytes, payload: Bytes, ttl_ms: Option<u64>, now_ms: u64) {
        self.set_count.fetch_add(1, Ordering::Relaxed);

        let value = match ttl_ms {
            Some(ttl) => StoredValue::with_ttl(payload, ttl, now_ms),
            None => StoredValue::new(payload),
        };

        let shard = self.get_shard(&key);
        shard.data.write().insert(key, value);
    }

    fn len(&self) -> usize {
        self.shards.iter().map(|shard| shard.data.read().len()).sum()
    }
}

/// Database statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StorageStats {
    /// Number of entries currently held
    pub keys: usize,
    /// Total GET operations
    pub get_ops: u64,
    /// Total SET operations
    pub set_ops: u64,
    /// Total entries removed by lazy expiry
    pub expired: u64,
}
