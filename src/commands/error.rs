//! Errors raised while turning a frame into a command.

use crate::protocol::{ProtocolError, RespValue};
use thiserror::Error;

/// A request that decoded but cannot be executed.
///
/// The `Display` text of each variant is the error reply sent to the client.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("ERR empty command")]
    EmptyCommand,

    #[error("ERR unknown command '{0}'")]
    UnknownCommand(String),

    #[error("ERR wrong number of arguments for '{0}' command")]
    WrongArity(&'static str),

    #[error("ERR invalid expire time in '{0}' command")]
    InvalidExpireTime(&'static str),

    #[error("ERR protocol error: {0}")]
    Protocol(#[from] ProtocolError),
}

impl CommandError {
    /// Renders the error as a single-line error reply.
    pub fn to_reply(&self) -> RespValue {
        RespValue::error(self.to_string().replace(['\r', '\n'], " "))
    }
}
