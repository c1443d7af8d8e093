//! Payload Codec
//!
//! Decodes frame payloads according to their format tag. Format `0` is
//! UTF-8 JSON text; every other tag is unsupported on this channel and
//! reported, never guessed at.

use super::frame::{Frame, PayloadFormat};

/// Per-frame payload failures.
///
/// All kinds are recoverable: the frame is skipped and decoding
/// continues at the next frame boundary, which the framing layer has
/// already aligned.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// Non-JSON format tag.
    #[error("unsupported payload format: {0}")]
    UnsupportedFormat(u8),

    /// Payload declared JSON but is not valid UTF-8.
    #[error("payload is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),

    /// Payload declared JSON but failed to parse.
    #[error("payload is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl CodecError {
    /// Whether the failure is an unsupported format tag, as opposed to
    /// a malformed nominally-JSON payload.
    #[must_use]
    pub const fn is_unsupported_format(&self) -> bool {
        matches!(self, Self::UnsupportedFormat(_))
    }
}

/// JSON payload decoder.
#[derive(Debug, Default, Clone)]
pub struct PayloadCodec;

impl PayloadCodec {
    /// Create a new codec.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Decode a frame's payload into a JSON value.
    ///
    /// # Errors
    ///
    /// Returns an error if the format tag is not JSON or the payload
    /// bytes are not valid UTF-8 JSON.
    pub fn decode(&self, frame: &Frame) -> Result<serde_json::Value, CodecError> {
        match frame.payload_format {
            PayloadFormat::Json => {
                let text = std::str::from_utf8(&frame.payload)?;
                Ok(serde_json::from_str(text)?)
            }
            PayloadFormat::Unsupported(tag) => Err(CodecError::UnsupportedFormat(tag)),
        }
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::*;

    fn json_frame(payload: &'static [u8]) -> Frame {
        Frame {
            message_id: 1,
            reference_id: "MyTradeMessageEvent".to_string(),
            payload_format: PayloadFormat::Json,
            payload: Bytes::from_static(payload),
        }
    }

    #[test]
    fn decodes_json_payload() {
        let codec = PayloadCodec::new();
        let value = codec
            .decode(&json_frame(br#"[{"MessageId":12}]"#))
            .unwrap();
        assert_eq!(value[0]["MessageId"], 12);
    }

    #[test]
    fn rejects_unsupported_format() {
        let codec = PayloadCodec::new();
        let mut frame = json_frame(b"anything");
        frame.payload_format = PayloadFormat::Unsupported(7);

        let err = codec.decode(&frame).unwrap_err();
        assert!(err.is_unsupported_format());
        assert!(matches!(err, CodecError::UnsupportedFormat(7)));
    }

    #[test]
    fn rejects_invalid_utf8() {
        let codec = PayloadCodec::new();
        let err = codec.decode(&json_frame(b"\xFF\xFE")).unwrap_err();
        assert!(matches!(err, CodecError::InvalidUtf8(_)));
        assert!(!err.is_unsupported_format());
    }

    #[test]
    fn rejects_invalid_json() {
        let codec = PayloadCodec::new();
        let err = codec.decode(&json_frame(b"{not json")).unwrap_err();
        assert!(matches!(err, CodecError::Json(_)));
    }
}
