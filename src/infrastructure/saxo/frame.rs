//! Stream Message Frame
//!
//! The unit of meaning on the streaming wire: a self-describing record
//! carrying an envelope message id, a routing reference id, a payload
//! format tag, and the raw payload bytes.

use bytes::Bytes;

/// Maximum reference id length allowed by the wire format.
pub const MAX_REFERENCE_ID_LEN: usize = 50;

/// Payload encoding tag carried by each frame.
///
/// Only JSON (tag byte `0`) is handled on this channel; every other
/// tag is carried through so the cursor stays aligned, then skipped at
/// dispatch time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadFormat {
    /// UTF-8 JSON text.
    Json,
    /// Any non-zero format tag.
    Unsupported(u8),
}

impl PayloadFormat {
    /// Decode the wire tag byte.
    #[must_use]
    pub const fn from_byte(byte: u8) -> Self {
        match byte {
            0 => Self::Json,
            other => Self::Unsupported(other),
        }
    }

    /// The wire tag byte for this format.
    #[must_use]
    pub const fn as_byte(self) -> u8 {
        match self {
            Self::Json => 0,
            Self::Unsupported(byte) => byte,
        }
    }

    /// Whether the payload is UTF-8 JSON text.
    #[must_use]
    pub const fn is_json(self) -> bool {
        matches!(self, Self::Json)
    }
}

/// One self-contained record extracted from a streamed byte sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Envelope message id, monotonically increasing per stream. The
    /// decoder only decodes it; monotonicity is not validated.
    pub message_id: u64,
    /// Routing key, at most 50 single-byte characters. Not unique over
    /// time; handlers care about the latest value for a given key.
    pub reference_id: String,
    /// Payload encoding tag.
    pub payload_format: PayloadFormat,
    /// Raw payload bytes, exactly as long as the wire's payload size
    /// field declared.
    pub payload: Bytes,
}

impl Frame {
    /// Envelope overhead in bytes: message id (8) + reserved (2) +
    /// reference id size (1) + payload format (1) + payload size (4).
    pub const FIXED_OVERHEAD: usize = 16;

    /// Total encoded size of this frame on the wire.
    #[must_use]
    pub fn encoded_len(&self) -> usize {
        Self::FIXED_OVERHEAD + self.reference_id.chars().count() + self.payload.len()
    }

    /// Message id recomposed from its 32-bit halves in floating point,
    /// as `high * 2^32 + low`.
    ///
    /// This mirrors clients whose numeric type cannot represent every
    /// 64-bit magnitude: values above 2^53 lose precision here. Use
    /// [`Frame::message_id`](Frame) directly when exact correlation
    /// matters.
    #[must_use]
    pub fn message_id_lossy(&self) -> f64 {
        const TWO_PWR_32: f64 = 4_294_967_296.0;
        #[allow(clippy::cast_possible_truncation)]
        let low = self.message_id as u32;
        let high = (self.message_id >> 32) as u32;
        f64::from(high).mul_add(TWO_PWR_32, f64::from(low))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame_with_id(message_id: u64) -> Frame {
        Frame {
            message_id,
            reference_id: "MyTradeMessageEvent".to_string(),
            payload_format: PayloadFormat::Json,
            payload: Bytes::from_static(b"[]"),
        }
    }

    #[test]
    fn payload_format_round_trips_tag_byte() {
        assert_eq!(PayloadFormat::from_byte(0), PayloadFormat::Json);
        assert_eq!(PayloadFormat::from_byte(7), PayloadFormat::Unsupported(7));
        assert_eq!(PayloadFormat::Json.as_byte(), 0);
        assert_eq!(PayloadFormat::Unsupported(7).as_byte(), 7);
        assert!(PayloadFormat::Json.is_json());
        assert!(!PayloadFormat::Unsupported(1).is_json());
    }

    #[test]
    fn encoded_len_counts_envelope_and_payload() {
        let frame = frame_with_id(1);
        assert_eq!(frame.encoded_len(), 16 + 19 + 2);
    }

    #[test]
    fn lossy_id_is_exact_below_2_pow_53() {
        let frame = frame_with_id(1_234_567_890_123);
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let recomposed = frame.message_id_lossy() as u64;
        assert_eq!(recomposed, frame.message_id);
    }

    #[test]
    fn lossy_id_loses_precision_above_2_pow_53() {
        // 2^53 + 1 is the first unsigned integer f64 cannot represent.
        let frame = frame_with_id((1 << 53) + 1);
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let recomposed = frame.message_id_lossy() as u64;
        assert_ne!(recomposed, frame.message_id);
        // The exact path keeps the value intact.
        assert_eq!(frame.message_id, 9_007_199_254_740_993);
    }
}
