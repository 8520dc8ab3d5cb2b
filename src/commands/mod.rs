//! Command Dispatch Module
//!
//! Receives request frames, resolves the command through a static table,
//! runs it against the store, and returns the reply.
//!
//! ## Architecture
//!
//! ```text
//! Raw request buffer
//!       │
//!       ▼
//! ┌─────────────────┐
//! │  RespParser     │  (protocol module)
//! └────────┬────────┘
//!          │ Frame
//!          ▼
//! ┌─────────────────┐
//! │ CommandHandler  │  (this module)
//! │                 │
//! │  - Lookup       │  registry::COMMAND_TABLE
//! │  - Validate     │  arity, SET options
//! │  - Execute      │
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │ Store + Clock   │
//! └─────────────────┘
//! ```
//!
//! ## Supported Commands
//!
//! - `PING`
//! - `ECHO message`
//! - `GET key`
//! - `SET key value [PX milliseconds]`

pub mod command;
pub mod error;
pub mod handler;
pub mod registry;

pub use command::{Command, DecodedCommand};
pub use error::CommandError;
pub use handler::{execute, CommandHandler};
pub use registry::{CommandKind, CommandSpec, COMMAND_TABLE};
