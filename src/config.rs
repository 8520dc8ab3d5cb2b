//! Server configuration.
//!
//! Every option can come from the command line or the environment; the
//! command line wins.

use clap::Parser;
use thiserror::Error;

use crate::protocol::parser::MAX_BULK_SIZE;
use crate::{DEFAULT_HOST, DEFAULT_PORT};

/// Default read buffer limit per connection (1 GB, same as Redis)
pub const DEFAULT_MAX_BUFFER_SIZE: usize = 1024 * 1024 * 1024;

/// Smallest accepted read buffer limit
pub const MIN_BUFFER_SIZE: usize = 1024;

/// Errors found while validating a configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("port must be non-zero")]
    ZeroPort,

    #[error("max buffer size {0} is below the minimum of {min} bytes", min = MIN_BUFFER_SIZE)]
    BufferTooSmall(usize),
}

/// Settings for the `respkv` server process.
#[derive(Debug, Clone, PartialEq, Eq, Parser)]
#[command(
    name = "respkv",
    version,
    about = "In-memory key-value server speaking the RESP protocol"
)]
pub struct ServerConfig {
    /// Host to bind to
    #[arg(short = 'H', long, env = "RESPKV_HOST", default_value = DEFAULT_HOST)]
    pub host: String,

    /// Port to listen on
    #[arg(short, long, env = "RESPKV_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Log filter used when RUST_LOG is not set (e.g. "info", "respkv=debug")
    #[arg(long, env = "RESPKV_LOG", default_value = "info")]
    pub log_level: String,

    /// Largest number of unparsed bytes buffered for one client
    #[arg(long, env = "RESPKV_MAX_BUFFER", default_value_t = DEFAULT_MAX_BUFFER_SIZE)]
    pub max_buffer_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            log_level: "info".to_string(),
            max_buffer_size: DEFAULT_MAX_BUFFER_SIZE,
        }
    }
}

impl ServerConfig {
    /// Returns the bind address as a string
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Largest bulk string the decoder accepts.
    ///
    /// A token longer than the read buffer limit could never arrive in full,
    /// so it is rejected as soon as its header is read.
    pub fn max_bulk_size(&self) -> usize {
        self.max_buffer_size.min(MAX_BULK_SIZE)
    }

    /// Rejects settings the server cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::ZeroPort);
        }
        if self.max_buffer_size < MIN_BUFFER_SIZE {
            return Err(ConfigError::BufferTooSmall(self.max_buffer_size));
        }
        Ok(())
    }
}
