//! # respkv - A Small RESP Key-Value Server
//!
//! respkv decodes RESP request frames, dispatches a handful of Redis-style
//! commands, and keeps string values in a sharded in-memory store with
//! optional millisecond expiry.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                             respkv                               │
//! │                                                                  │
//! │  ┌─────────────┐    ┌─────────────┐    ┌─────────────┐           │
//! │  │ TCP Server  │───>│ Connection  │───>│  Command    │           │
//! │  │ (Listener)  │    │  Handler    │    │  Handler    │           │
//! │  └─────────────┘    └──────┬──────┘    └──────┬──────┘           │
//! │                            │                  │                  │
//! │                            ▼                  ▼                  │
//! │                     ┌─────────────┐    ┌──────────────────────┐  │
//! │                     │    RESP     │    │    StorageEngine     │  │
//! │                     │   Parser    │    │  64 RwLock shards    │  │
//! │                     └─────────────┘    └──────────┬───────────┘  │
//! │                                                   │              │
//! │                                            ┌──────┴──────┐       │
//! │                                            │    Clock    │       │
//! │                                            └─────────────┘       │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```
//! use respkv::clock::ManualClock;
//! use respkv::commands::execute;
//! use respkv::storage::StorageEngine;
//!
//! let store = StorageEngine::new();
//! let clock = ManualClock::new(0);
//!
//! assert_eq!(execute(b"*1\r\n$4\r\nPING\r\n", &store, &clock), b"+PONG\r\n");
//! ```
//!
//! ## Supported Commands
//!
//! - `PING`
//! - `ECHO message`
//! - `GET key`
//! - `SET key value [PX milliseconds]`
//!
//! ## Module Overview
//!
//! - [`protocol`]: request frame decoder and reply encoding
//! - [`commands`]: command table, validation and execution
//! - [`storage`]: sharded store with lazy expiry
//! - [`clock`]: injectable millisecond time source
//! - [`connection`]: per-client read/execute/write loop
//! - [`config`]: command line and environment settings
//!
//! ## Expiry
//!
//! Keys are only expired lazily: a read that finds a stale entry removes it
//! and reports the key as missing. There is no background sweep.

pub mod clock;
pub mod commands;
pub mod config;
pub mod connection;
pub mod protocol;
pub mod storage;

// Re-export commonly used types for convenience
pub use clock::{Clock, ManualClock, SystemClock};
pub use commands::{execute, CommandError, CommandHandler};
pub use config::ServerConfig;
pub use connection::{handle_connection, ConnectionStats};
pub use protocol::{Frame, ProtocolError, RespParser, RespValue};
pub use storage::{StorageEngine, Store};

/// The default port respkv listens on (same as Redis)
pub const DEFAULT_PORT: u16 = 6379;

/// The default host respkv binds to
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Version of respkv
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
