//! Storage Engine Module
//!
//! The key-value store shared by every connection. Values carry an optional
//! absolute expiry in epoch milliseconds and disappear lazily: the read that
//! finds an expired value removes it.
//!
//! ## Example
//!
//! ```
//! use respkv::storage::{StorageEngine, Store};
//! use bytes::Bytes;
//! use std::sync::Arc;
//!
//! let engine: Arc<dyn Store> = Arc::new(StorageEngine::new());
//!
//! engine.set(Bytes::from("name"), Bytes::from("Ariz"), None, 0);
//! assert_eq!(engine.get(b"name", 0), Some(Bytes::from("Ariz")));
//! ```

pub mod engine;

// Re-export commonly used types
pub use engine::{StorageEngine, StorageStats, Store, StoredValue, NO_EXPIRY};
