//! Request Frame Decoder
//!
//! Requests arrive as a RESP array of bulk strings:
//!
//! ```text
//! *<N>\r\n
//! $<len1>\r\n<token1>\r\n
//! ...
//! $<lenN>\r\n<tokenN>\r\n
//! ```
//!
//! The decoder walks the buffer once with a cursor and never backtracks. It
//! expects a complete frame: a buffer that stops short of a declared segment
//! is reported as [`ProtocolError::Incomplete`] rather than returning a
//! partial token. Callers that read from a stream (the connection layer) treat
//! that variant as "read more bytes and try again".
//!
//! The decoded [`Frame`] keeps the element count declared in the header as its
//! own field, because command grammars (SET's optional `PX` clause) are keyed
//! on it.

use crate::protocol::types::{prefix, CRLF};
use bytes::Bytes;
use thiserror::Error;

/// Errors produced while decoding a request frame.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// The input buffer is empty
    #[error("empty input")]
    EmptyInput,

    /// The frame does not start with `*`
    #[error("expected array, got {0:#04x}")]
    ExpectedArray(u8),

    /// A token does not start with `$`
    #[error("expected bulk string, got {0:#04x}")]
    ExpectedBulkString(u8),

    /// A count, length or numeric argument is not a non-negative decimal
    #[error("invalid integer '{0}'")]
    InvalidInteger(String),

    /// The buffer ends before the declared frame does
    #[error("incomplete frame")]
    Incomplete,

    /// A bulk string payload is not followed by CRLF
    #[error("bulk string missing trailing CRLF")]
    MissingCrlf,

    /// A bulk string declares more bytes than allowed
    #[error("bulk string too large: {size} bytes (max: {max})")]
    MessageTooLarge { size: usize, max: usize },
}

/// Result type for decoding operations.
pub type ProtocolResult<T> = Result<T, ProtocolError>;

/// Maximum size for a single bulk string (512 MB, same as Redis)
pub const MAX_BULK_SIZE: usize = 512 * 1024 * 1024;

/// Upper bound on token slots reserved from a declared count before any token
/// has actually been read.
const PREALLOC_LIMIT: usize = 64;

/// One decoded request frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Element count declared by the `*<N>` header
    pub declared_len: usize,
    /// The bulk string tokens, in wire order
    pub tokens: Vec<Bytes>,
    /// Number of buffer bytes the frame occupied
    pub consumed: usize,
}

/// Decoder for request frames.
///
/// # Example
///
/// ```
/// use respkv::protocol::parser::RespParser;
///
/// let parser = RespParser::new();
/// let frame = parser.parse(b"*2\r\n$3\r\nGET\r\n$4\r\nname\r\n").unwrap();
///
/// assert_eq!(frame.declared_len, 2);
/// assert_eq!(frame.tokens[1], "name");
/// assert_eq!(frame.consumed, 23);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct RespParser {
    max_bulk_size: usize,
}

impl Default for RespParser {
    fn default() -> Self {
        Self::new()
    }
}

impl RespParser {
    /// Creates a parser with the default bulk string limit.
    pub fn new() -> Self {
        Self {
            max_bulk_size: MAX_BULK_SIZE,
        }
    }

    /// Creates a parser that rejects bulk strings longer than `max`.
    pub fn with_max_bulk_size(max: usize) -> Self {
        Self { max_bulk_size: max }
    }

    /// Decodes the frame at the start of `buf`.
    ///
    /// Bytes after the frame are left untouched; `Frame::consumed` says where
    /// the next frame would begin.
    pub fn parse(&self, buf: &[u8]) -> ProtocolResult<Frame> {
        let first = *buf.first().ok_or(ProtocolError::EmptyInput)?;
        if first != prefix::ARRAY {
            return Err(ProtocolError::ExpectedArray(first));
        }

        let (declared_len, mut cursor) = read_decimal(buf, 1)?;

        let mut tokens = Vec::with_capacity(declared_len.min(PREALLOC_LIMIT));
        for _ in 0..declared_len {
            let (token, next) = self.parse_bulk_string(buf, cursor)?;
            tokens.push(token);
            cursor = next;
        }

        Ok(Frame {
            declared_len,
            tokens,
            consumed: cursor,
        })
    }

    /// Parses `$<length>\r\n<data>\r\n` starting at `pos`.
    ///
    /// Returns the payload and the position just past its trailing CRLF.
    fn parse_bulk_string(&self, buf: &[u8], pos: usize) -> ProtocolResult<(Bytes, usize)> {
        let sigil = *buf.get(pos).ok_or(ProtocolError::Incomplete)?;
        if sigil != prefix::BULK_STRING {
            return Err(ProtocolError::ExpectedBulkString(sigil));
        }

        let (length, data_start) = read_decimal(buf, pos + 1)?;
        if length > self.max_bulk_size {
            return Err(ProtocolError::MessageTooLarge {
                size: length,
                max: self.max_bulk_size,
            });
        }

        let data_end = data_start.saturating_add(length);
        let token_end = data_end.saturating_add(CRLF.len());
        if buf.len() < token_end {
            return Err(ProtocolError::Incomplete);
        }

        if &buf[data_end..token_end] != CRLF {
            return Err(ProtocolError::MissingCrlf);
        }

        let data = Bytes::copy_from_slice(&buf[data_start..data_end]);
        Ok((data, token_end))
    }
}

/// Reads a CRLF-terminated decimal field starting at `pos`.
///
/// Returns the value and the position just past the CRLF. Running out of
/// buffer inside the field is `Incomplete`; any other non-digit is
/// `InvalidInteger`.
fn read_decimal(buf: &[u8], pos: usize) -> ProtocolResult<(usize, usize)> {
    let rest = buf.get(pos..).unwrap_or_default();
    let digits = rest.iter().take_while(|b| b.is_ascii_digit()).count();

    match &rest[digits..] {
        [] | [b'\r'] => return Err(ProtocolError::Incomplete),
        [b'\r', b'\n', ..] => {}
        _ => {
            let field_end = find_crlf(rest).unwrap_or(rest.len());
            return Err(invalid_integer(&rest[..field_end]));
        }
    }

    let value = parse_decimal(&rest[..digits])?;
    Ok((value, pos + digits + CRLF.len()))
}

/// Parses a run of ASCII digits into a `usize`.
///
/// Empty input, any non-digit (including a sign) and overflow are all
/// `InvalidInteger`.
pub fn parse_decimal(field: &[u8]) -> ProtocolResult<usize> {
    if field.is_empty() {
        return Err(invalid_integer(field));
    }

    field.iter().try_fold(0usize, |acc, &b| {
        if !b.is_ascii_digit() {
            return Err(invalid_integer(field));
        }
        acc.checked_mul(10)
            .and_then(|v| v.checked_add(usize::from(b - b'0')))
            .ok_or_else(|| invalid_integer(field))
    })
}

fn invalid_integer(field: &[u8]) -> ProtocolError {
    ProtocolError::InvalidInteger(String::from_utf8_lossy(field).into_owned())
}

/// Finds the position of CRLF in the buffer.
///
/// Returns the position of `\r` if found, or None if CRLF is not present.
#[inline]
fn find_crlf(buf: &[u8]) -> Option<usize> {
    buf.windows(CRLF.len()).position(|w| w == CRLF)
}

/// Decodes a single request frame with the default parser.
pub fn parse_request(buf: &[u8]) -> ProtocolResult<Frame> {
    RespParser::new().parse(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::types::RespValue;

    #[test]
    fn test_parse_get_command() {
        let input = b"*2\r\n$3\r\nGET\r\n$4\r\nname\r\n";
        let frame = parse_request(input).unwrap();

        assert_eq!(frame.declared_len, 2);
        assert_eq!(
            frame.tokens,
            vec![Bytes::from("GET"), Bytes::from("name")]
        );
        assert_eq!(frame.consumed, input.len());
    }

    #[test]
    fn test_parse_set_with_px() {
        let input = b"*5\r\n$3\r\nSET\r\n$1\r\nk\r\n$1\r\nv\r\n$2\r\nPX\r\n$3\r\n100\r\n";
        let frame = parse_request(input).unwrap();

        assert_eq!(frame.declared_len, 5);
        assert_eq!(frame.tokens[3], "PX");
        assert_eq!(frame.tokens[4], "100");
    }

    #[test]
    fn test_parse_empty_array() {
        let frame = parse_request(b"*0\r\n").unwrap();
        assert_eq!(frame.declared_len, 0);
        assert!(frame.tokens.is_empty());
        assert_eq!(frame.consumed, 4);
    }

    #[test]
    fn test_parse_empty_bulk_string() {
        let frame = parse_request(b"*2\r\n$4\r\nECHO\r\n$0\r\n\r\n").unwrap();
        assert_eq!(frame.tokens[1], Bytes::new());
    }

    #[test]
    fn test_payload_may_contain_crlf() {
        let input = b"*2\r\n$4\r\nECHO\r\n$6\r\na\r\nb\r\n\r\n";
        let frame = parse_request(input).unwrap();
        assert_eq!(frame.tokens[1], Bytes::from_static(b"a\r\nb\r\n"));
    }

    #[test]
    fn test_binary_safe_bulk_string() {
        let frame = parse_request(b"*1\r\n$5\r\nhel\x00o\r\n").unwrap();
        assert_eq!(frame.tokens[0], Bytes::from_static(b"hel\x00o"));
    }

    #[test]
    fn test_trailing_bytes_are_not_consumed() {
        let input = b"*1\r\n$4\r\nPING\r\n*1\r\n$4\r\nPING\r\n";
        let frame = parse_request(input).unwrap();
        assert_eq!(frame.consumed, 14);

        let second = parse_request(&input[frame.consumed..]).unwrap();
        assert_eq!(second.tokens[0], "PING");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(parse_request(b""), Err(ProtocolError::EmptyInput));
    }

    #[test]
    fn test_rejects_non_array_frame() {
        assert_eq!(
            parse_request(b"+PING\r\n"),
            Err(ProtocolError::ExpectedArray(b'+'))
        );
        assert_eq!(
            parse_request(b"PING\r\n"),
            Err(ProtocolError::ExpectedArray(b'P'))
        );
    }

    #[test]
    fn test_rejects_non_bulk_token() {
        assert_eq!(
            parse_request(b"*1\r\n:1\r\n"),
            Err(ProtocolError::ExpectedBulkString(b':'))
        );
    }

    #[test]
    fn test_rejects_non_numeric_count() {
        assert_eq!(
            parse_request(b"*x\r\n$4\r\nPING\r\n"),
            Err(ProtocolError::InvalidInteger("x".to_string()))
        );
        assert_eq!(
            parse_request(b"*-1\r\n"),
            Err(ProtocolError::InvalidInteger("-1".to_string()))
        );
        assert_eq!(
            parse_request(b"*\r\n"),
            Err(ProtocolError::InvalidInteger(String::new()))
        );
    }

    #[test]
    fn test_rejects_non_numeric_length() {
        assert_eq!(
            parse_request(b"*1\r\n$abc\r\nPING\r\n"),
            Err(ProtocolError::InvalidInteger("abc".to_string()))
        );
    }

    #[test]
    fn test_rejects_overflowing_length() {
        let result = parse_request(b"*1\r\n$99999999999999999999999\r\n");
        assert!(matches!(result, Err(ProtocolError::InvalidInteger(_))));
    }

    #[test]
    fn test_truncated_buffers_are_incomplete() {
        let full = b"*2\r\n$3\r\nGET\r\n$4\r\nname\r\n";
        for cut in 1..full.len() {
            assert_eq!(
                parse_request(&full[..cut]),
                Err(ProtocolError::Incomplete),
                "cut at {}",
                cut
            );
        }
    }

    #[test]
    fn test_declared_length_exceeds_buffer() {
        assert_eq!(
            parse_request(b"*1\r\n$10\r\nshort\r\n"),
            Err(ProtocolError::Incomplete)
        );
    }

    #[test]
    fn test_missing_trailing_crlf() {
        assert_eq!(
            parse_request(b"*1\r\n$2\r\nabcd\r\n"),
            Err(ProtocolError::MissingCrlf)
        );
    }

    #[test]
    fn test_bulk_size_limit() {
        let parser = RespParser::with_max_bulk_size(4);
        assert_eq!(
            parser.parse(b"*1\r\n$5\r\nhello\r\n"),
            Err(ProtocolError::MessageTooLarge { size: 5, max: 4 })
        );
        assert!(parser.parse(b"*1\r\n$4\r\nPING\r\n").is_ok());
    }

    #[test]
    fn test_parse_decimal() {
        assert_eq!(parse_decimal(b"0"), Ok(0));
        assert_eq!(parse_decimal(b"100"), Ok(100));
        assert!(parse_decimal(b"+1").is_err());
        assert!(parse_decimal(b"1.5").is_err());
        assert!(parse_decimal(b"").is_err());
    }

    #[test]
    fn test_encoded_command_decodes_to_same_tokens() {
        let payload = Bytes::from_static(b"line one\r\nline two\r\n\x00\xff");
        let request = RespValue::command([Bytes::from("ECHO"), payload.clone()]).serialize();

        let frame = parse_request(&request).unwrap();
        assert_eq!(frame.tokens, vec![Bytes::from("ECHO"), payload]);
        assert_eq!(frame.consumed, request.len());
    }
}
