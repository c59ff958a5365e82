//! Relay codec for tokio.
//!
//! Decodes client lines as raw text (the login phase needs the verbatim
//! line, the relay phase parses it) and encodes typed [`ServerLine`]s.

use bytes::BytesMut;
use tokio_util::codec::{Decoder, Encoder};

use crate::error;
use crate::line::LineCodec;
use crate::server::ServerLine;

/// Server-side codec: text lines in, [`ServerLine`]s out.
///
/// Wraps [`LineCodec`] and guarantees one outgoing line per message.
#[derive(Debug, Clone, Default)]
pub struct RelayCodec {
    inner: LineCodec,
}

impl RelayCodec {
    /// Create a codec with the default line limit.
    pub fn new() -> Self {
        Self {
            inner: LineCodec::new(),
        }
    }

    /// Create a codec with a custom line limit in bytes.
    pub fn with_max_len(max_len: usize) -> Self {
        Self {
            inner: LineCodec::with_max_len(max_len),
        }
    }

    /// Truncate outgoing text at its first embedded line break.
    ///
    /// Message bodies are relayed verbatim, so a body can never be allowed
    /// to smuggle a second line onto another client's stream.
    pub fn sanitize(mut data: String) -> String {
        if let Some(pos) = data.find(|c: char| c == '\r' || c == '\n') {
            data.truncate(pos);
        }
        data
    }
}

impl Decoder for RelayCodec {
    type Item = String;
    type Error = error::ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> error::Result<Option<String>> {
        self.inner.decode(src)
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> error::Result<Option<String>> {
        self.inner.decode_eof(src)
    }
}

impl Encoder<ServerLine> for RelayCodec {
    type Error = error::ProtocolError;

    fn encode(&mut self, line: ServerLine, dst: &mut BytesMut) -> error::Result<()> {
        self.inner.encode(Self::sanitize(line.to_string()), dst)
    }
}
