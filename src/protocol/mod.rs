//! RESP Protocol Implementation
//!
//! This module covers the wire side of respkv: decoding request frames and
//! serializing replies.
//!
//! ## Modules
//!
//! - `types`: The `RespValue` enum and its wire serialization
//! - `parser`: Cursor-based decoder for request frames
//!
//! ## Example
//!
//! ```
//! use respkv::protocol::{parse_request, RespValue};
//! use bytes::Bytes;
//!
//! let frame = parse_request(b"*2\r\n$4\r\nECHO\r\n$5\r\nhello\r\n").unwrap();
//! assert_eq!(frame.tokens[1], "hello");
//!
//! let reply = RespValue::bulk_string(Bytes::from("hello"));
//! assert_eq!(reply.serialize(), b"$5\r\nhello\r\n");
//! ```

pub mod parser;
pub mod types;

// Re-export commonly used types for convenience
pub use parser::{parse_request, Frame, ProtocolError, ProtocolResult, RespParser};
pub use types::RespValue;
