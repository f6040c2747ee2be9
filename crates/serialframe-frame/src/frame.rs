use std::borrow::Cow;

use bytes::Bytes;

/// The empty object. Never produced as a frame; doubles as the
/// "no frame found" sentinel for [`crate::scan_or_sentinel`].
pub const EMPTY_OBJECT: &str = "{}";

/// Doubled-empty object, rejected as noise like [`EMPTY_OBJECT`].
pub const DOUBLE_EMPTY_OBJECT: &str = "{{}}";

/// A balanced, non-empty `{...}` span recovered from a chunk.
///
/// The payload is opaque: it is not parsed or validated as JSON.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// The span bytes, outer braces included.
    pub payload: Bytes,
}

impl Frame {
    /// Create a new frame.
    pub fn new(payload: impl Into<Bytes>) -> Self {
        Self {
            payload: payload.into(),
        }
    }

    /// The raw span bytes.
    pub fn as_bytes(&self) -> &[u8] {
        self.payload.as_ref()
    }

    /// Span length in bytes.
    pub fn len(&self) -> usize {
        self.payload.len()
    }

    /// True for a zero-length payload (never produced by the scanner).
    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }

    /// Decode the span as text, replacing invalid UTF-8 sequences.
    pub fn to_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(self.payload.as_ref())
    }
}

impl From<Frame> for Bytes {
    fn from(frame: Frame) -> Self {
        frame.payload
    }
}
