//! Decoded requests and their typed, validated form.

use super::error::CommandError;
use super::registry::{self, CommandKind, SET_WITH_TTL_LEN};
use crate::protocol::parser::parse_decimal;
use crate::protocol::Frame;
use bytes::Bytes;

/// A frame split into its command name and arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedCommand {
    /// Command name, ASCII-uppercased
    pub name: String,
    /// Arguments after the name, in wire order
    pub args: Vec<Bytes>,
    /// Element count from the frame header, name included
    pub declared_len: usize,
}

impl TryFrom<Frame> for DecodedCommand {
    type Error = CommandError;

    fn try_from(frame: Frame) -> Result<Self, Self::Error> {
        let mut tokens = frame.tokens.into_iter();
        let name = tokens.next().ok_or(CommandError::EmptyCommand)?;

        Ok(DecodedCommand {
            name: String::from_utf8_lossy(&name).to_ascii_uppercase(),
            args: tokens.collect(),
            declared_len: frame.declared_len,
        })
    }
}

/// A command whose arity and arguments have been checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Ping,
    Echo {
        message: Bytes,
    },
    Get {
        key: Bytes,
    },
    Set {
        key: Bytes,
        value: Bytes,
        ttl_ms: Option<u64>,
    },
}

impl TryFrom<DecodedCommand> for Command {
    type Error = CommandError;

    fn try_from(decoded: DecodedCommand) -> Result<Self, Self::Error> {
        let spec = registry::lookup(&decoded.name)
            .ok_or_else(|| CommandError::UnknownCommand(decoded.name.clone()))?;

        if !spec.accepts(decoded.args.len()) {
            return Err(CommandError::WrongArity(spec.name));
        }

        let mut args = decoded.args.into_iter();
        let mut next = || args.next().ok_or(CommandError::WrongArity(spec.name));

        let command = match spec.kind {
            CommandKind::Ping => Command::Ping,
            CommandKind::Echo => Command::Echo { message: next()? },
            CommandKind::Get => Command::Get { key: next()? },
            CommandKind::Set => {
                let key = next()?;
                let value = next()?;

                // The clause is positional: the option token's content is not read
                let ttl_ms = if decoded.declared_len >= SET_WITH_TTL_LEN {
                    let _option = next()?;
                    Some(parse_ttl(&next()?)?)
                } else {
                    None
                };

                Command::Set { key, value, ttl_ms }
            }
        };

        Ok(command)
    }
}

fn parse_ttl(field: &[u8]) -> Result<u64, CommandError> {
    let ttl = parse_decimal(field)?;
    u64::try_from(ttl).map_err(|_| CommandError::InvalidExpireTime("SET"))
}
