//! Newline-delimited framing for tokio.
//!
//! Lines are terminated by `\n`; a preceding `\r` is tolerated and stripped.
//! Bytes that are not valid UTF-8 are replaced rather than rejected, so a
//! single bad byte never costs a client its connection.

use bytes::BytesMut;
use tokio_util::codec::{Decoder, Encoder};

use crate::error::{self, ProtocolError};

/// Default maximum line length in bytes, terminator included.
pub const DEFAULT_MAX_LINE_LEN: usize = 4096;

const LINE_ENDINGS: &[char] = &['\r', '\n'];

/// Line-based codec that yields one `String` per newline-terminated line.
#[derive(Debug, Clone)]
pub struct LineCodec {
    /// Index of next byte to check for newline
    next_index: usize,
    /// Maximum line length
    max_len: usize,
}

impl LineCodec {
    /// Create a codec with the default line limit.
    pub fn new() -> Self {
        Self::with_max_len(DEFAULT_MAX_LINE_LEN)
    }

    /// Create a codec with a custom line limit.
    pub fn with_max_len(max_len: usize) -> Self {
        Self {
            next_index: 0,
            max_len,
        }
    }

    /// The configured maximum line length.
    pub fn max_len(&self) -> usize {
        self.max_len
    }

    fn into_text(raw: &[u8]) -> String {
        String::from_utf8_lossy(raw)
            .trim_end_matches(LINE_ENDINGS)
            .to_string()
    }
}

impl Default for LineCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for LineCodec {
    type Item = String;
    type Error = ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> error::Result<Option<String>> {
        if let Some(offset) = src[self.next_index..].iter().position(|b| *b == b'\n') {
            let line = src.split_to(self.next_index + offset + 1);
            self.next_index = 0;

            if line.len() > self.max_len {
                return Err(ProtocolError::MessageTooLong {
                    actual: line.len(),
                    limit: self.max_len,
                });
            }

            Ok(Some(Self::into_text(&line)))
        } else {
            // No complete line yet - remember where we stopped
            self.next_index = src.len();

            if src.len() > self.max_len {
                return Err(ProtocolError::MessageTooLong {
                    actual: src.len(),
                    limit: self.max_len,
                });
            }

            Ok(None)
        }
    }

    /// A peer that closes mid-line still gets its last line delivered.
    fn decode_eof(&mut self, src: &mut BytesMut) -> error::Result<Option<String>> {
        match self.decode(src)? {
            Some(line) => Ok(Some(line)),
            None if src.is_empty() => Ok(None),
            None => {
                let tail = src.split_to(src.len());
                self.next_index = 0;
                Ok(Some(Self::into_text(&tail)))
            }
        }
    }
}

impl Encoder<String> for LineCodec {
    type Error = ProtocolError;

    fn encode(&mut self, msg: String, dst: &mut BytesMut) -> error::Result<()> {
        dst.reserve(msg.len() + 1);
        dst.extend_from_slice(msg.as_bytes());
        dst.extend_from_slice(b"\n");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_strips_terminators() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::from("<*><hi>\r\nSam\n");

        assert_eq!(codec.decode(&mut buf).unwrap(), Some("<*><hi>".to_string()));
        assert_eq!(codec.decode(&mut buf).unwrap(), Some("Sam".to_string()));
        assert!(buf.is_empty());
    }

    #[test]
    fn test_decode_partial_line() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::from("<*><hel");

        assert_eq!(codec.decode(&mut buf).unwrap(), None);

        buf.extend_from_slice(b"lo>\n");
        assert_eq!(
            codec.decode(&mut buf).unwrap(),
            Some("<*><hello>".to_string())
        );
    }

    #[test]
    fn test_decode_empty_line() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::from("\n");

        assert_eq!(codec.decode(&mut buf).unwrap(), Some(String::new()));
    }

    #[test]
    fn test_decode_invalid_utf8_is_replaced() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::from(&b"Sam\xff\n"[..]);

        assert_eq!(
            codec.decode(&mut buf).unwrap(),
            Some("Sam\u{fffd}".to_string())
        );
    }

    #[test]
    fn test_decode_too_long() {
        let mut codec = LineCodec::with_max_len(10);
        let mut buf = BytesMut::from("this is way too long\n");

        assert!(matches!(
            codec.decode(&mut buf),
            Err(ProtocolError::MessageTooLong { limit: 10, .. })
        ));
    }

    #[test]
    fn test_decode_unterminated_too_long() {
        let mut codec = LineCodec::with_max_len(8);
        let mut buf = BytesMut::from("no newline in sight");

        assert!(matches!(
            codec.decode(&mut buf),
            Err(ProtocolError::MessageTooLong { actual: 19, limit: 8 })
        ));
    }

    #[test]
    fn test_decode_eof_flushes_tail() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::from("<?><quit>");

        assert_eq!(
            codec.decode_eof(&mut buf).unwrap(),
            Some("<?><quit>".to_string())
        );
        assert_eq!(codec.decode_eof(&mut buf).unwrap(), None);
    }

    #[test]
    fn test_encode_appends_newline() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::new();

        codec.encode("*Sam: hi".to_string(), &mut buf).unwrap();
        assert_eq!(&buf[..], b"*Sam: hi\n");
    }
}
