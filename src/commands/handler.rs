//! Command Handler
//!
//! Turns request frames into replies.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     CommandHandler                          │
//! │                                                             │
//! │  ┌─────────────┐    ┌─────────────┐    ┌─────────────┐     │
//! │  │   parse()   │───>│  lookup()   │───>│  execute()  │     │
//! │  └─────────────┘    └─────────────┘    └─────────────┘     │
//! │                                               │             │
//! │                                               ▼             │
//! │                                      Store + Clock          │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every failure along the way becomes an error reply; nothing here panics or
//! asks the caller to drop the client.

use super::command::{Command, DecodedCommand};
use super::error::CommandError;
use crate::clock::Clock;
use crate::protocol::{Frame, RespParser, RespValue};
use crate::storage::Store;
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// Executes requests against a shared store.
///
/// Cheap to clone: every connection gets its own handle to the same store
/// and clock.
#[derive(Clone)]
pub struct CommandHandler {
    storage: Arc<dyn Store>,
    clock: Arc<dyn Clock>,
    parser: RespParser,
}

impl std::fmt::Debug for CommandHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandHandler")
            .field("keys", &self.storage.len())
            .field("parser", &self.parser)
            .finish()
    }
}

impl CommandHandler {
    /// Creates a new command handler over the given store and clock.
    pub fn new(storage: Arc<dyn Store>, clock: Arc<dyn Clock>) -> Self {
        Self {
            storage,
            clock,
            parser: RespParser::new(),
        }
    }

    /// Replaces the frame decoder, e.g. to lower the bulk string limit.
    pub fn with_parser(mut self, parser: RespParser) -> Self {
        self.parser = parser;
        self
    }

    /// The decoder this handler uses for raw buffers.
    pub fn parser(&self) -> &RespParser {
        &self.parser
    }

    /// Decodes one request from `buf`, executes it, and returns the encoded reply.
    pub fn execute_bytes(&self, buf: &[u8]) -> Vec<u8> {
        execute_with(&self.parser, buf, self.storage.as_ref(), self.clock.as_ref())
    }

    /// Executes an already decoded frame.
    pub fn execute_frame(&self, frame: Frame) -> RespValue {
        dispatch(frame, self.storage.as_ref(), self.clock.as_ref())
    }
}

/// Decodes one request from `buffer`, runs it against `store`, and returns
/// the encoded reply.
///
/// # Example
///
/// ```
/// use respkv::commands::execute;
/// use respkv::clock::ManualClock;
/// use respkv::storage::StorageEngine;
///
/// let store = StorageEngine::new();
/// let clock = ManualClock::new(0);
///
/// let reply = execute(b"*3\r\n$3\r\nSET\r\n$3\r\nfoo\r\n$3\r\nbar\r\n", &store, &clock);
/// assert_eq!(reply, b"+OK\r\n");
///
/// let reply = execute(b"*2\r\n$3\r\nGET\r\n$3\r\nfoo\r\n", &store, &clock);
/// assert_eq!(reply, b"$3\r\nbar\r\n");
/// ```
pub fn execute(buffer: &[u8], store: &dyn Store, clock: &dyn Clock) -> Vec<u8> {
    execute_with(&RespParser::new(), buffer, store, clock)
}

fn execute_with(
    parser: &RespParser,
    buffer: &[u8],
    store: &dyn Store,
    clock: &dyn Clock,
) -> Vec<u8> {
    let reply = match parser.parse(buffer) {
        Ok(frame) => {
            if frame.consumed < buffer.len() {
                trace!(
                    consumed = frame.consumed,
                    ignored = buffer.len() - frame.consumed,
                    "Bytes after the first frame ignored"
                );
            }
            dispatch(frame, store, clock)
        }
        Err(e) => {
            warn!(error = %e, "Malformed request frame");
            CommandError::from(e).to_reply()
        }
    };

    reply.serialize()
}

/// Resolves a frame to a command and runs it.
fn dispatch(frame: Frame, store: &dyn Store, clock: &dyn Clock) -> RespValue {
    let decoded = match DecodedCommand::try_from(frame) {
        Ok(decoded) => decoded,
        Err(e) => return e.to_reply(),
    };

    debug!(
        command = %decoded.name,
        args = decoded.args.len(),
        "Dispatching command"
    );

    let name = decoded.name.clone();
    match Command::try_from(decoded).and_then(|command| run(command, store, clock)) {
        Ok(reply) => reply,
        Err(e) => {
            debug!(command = %name, error = %e, "Command rejected");
            e.to_reply()
        }
    }
}

fn run(command: Command, store: &dyn Store, clock: &dyn Clock) -> Result<RespValue, CommandError> {
    let reply = match command {
        Command::Ping => RespValue::pong(),
        Command::Echo { message } => RespValue::bulk_string(message),
        Command::Get { key } => match store.get(&key, clock.now_ms()) {
            Some(value) => RespValue::bulk_string(value),
            None => RespValue::null(),
        },
        Command::Set { key, value, ttl_ms } => {
            let now_ms = clock.now_ms();
            if let Some(ttl) = ttl_ms {
                if now_ms.checked_add(ttl).is_none() {
                    return Err(CommandError::InvalidExpireTime("SET"));
                }
            }
            store.set(key, value, ttl_ms, now_ms);
            RespValue::ok()
        }
    };

    Ok(reply)
}
