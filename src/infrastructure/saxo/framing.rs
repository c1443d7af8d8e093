//! Stream Frame Decoding
//!
//! Length-prefixed binary framing for the plain WebSocket streaming
//! channel. Wire layout, integers little-endian:
//!
//! | field             | size (bytes)      |
//! |-------------------|-------------------|
//! | message id        | 8                 |
//! | reserved          | 2                 |
//! | reference id size | 1                 |
//! | reference id      | reference id size |
//! | payload format    | 1                 |
//! | payload size      | 4                 |
//! | payload           | payload size      |
//!
//! The reference id is ASCII/Latin-1, one byte per character. The
//! cursor advances past the payload unconditionally, whether or not
//! the format tag is understood, so the next frame always starts at a
//! correct boundary.
//!
//! [`FrameDecoder`] keeps a residual buffer across deliveries: a frame
//! may arrive split over any number of transport messages and is
//! emitted once fully available. [`decode_frames`] is the strict
//! one-shot variant for transports that guarantee whole frames per
//! delivery.

use bytes::BytesMut;

use super::frame::{Frame, MAX_REFERENCE_ID_LEN, PayloadFormat};

/// Bytes before the reference id: message id (8) + reserved (2) +
/// reference id size (1).
const PREFIX_LEN: usize = 11;

/// Bytes between the reference id and the payload: format (1) +
/// payload size (4).
const PAYLOAD_HEADER_LEN: usize = 5;

/// Default cap on a single frame's declared payload size.
pub const DEFAULT_MAX_PAYLOAD_SIZE: usize = 16 * 1024 * 1024;

/// Structural framing failures.
///
/// Both kinds abort the current decode call without dispatching any
/// frame from it; the transport connection itself is the caller's
/// concern.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FramingError {
    /// The buffer ends inside a frame: a length field points past the
    /// end of the available bytes.
    #[error("truncated frame: {remaining} trailing byte(s) do not form a complete frame")]
    Truncated {
        /// Number of leftover bytes that form no complete frame.
        remaining: usize,
    },
    /// A payload size field exceeds the configured cap, which means a
    /// corrupt length prefix rather than a frame worth buffering.
    #[error("declared payload size {declared} exceeds maximum {max}")]
    PayloadTooLarge {
        /// Payload size declared on the wire.
        declared: usize,
        /// Configured cap.
        max: usize,
    },
}

/// Streaming frame decoder with cross-delivery reassembly.
///
/// Holds no resources beyond its residual byte buffer; one decoder
/// instance serves one ordered stream.
#[derive(Debug)]
pub struct FrameDecoder {
    buffer: BytesMut,
    max_payload_size: usize,
}

impl FrameDecoder {
    /// Create a decoder with the default payload size cap.
    #[must_use]
    pub fn new() -> Self {
        Self::with_max_payload_size(DEFAULT_MAX_PAYLOAD_SIZE)
    }

    /// Create a decoder with a custom payload size cap.
    #[must_use]
    pub fn with_max_payload_size(max_payload_size: usize) -> Self {
        Self {
            buffer: BytesMut::with_capacity(8 * 1024),
            max_payload_size,
        }
    }

    /// Append one transport delivery and extract every frame that is
    /// now complete, in input order.
    ///
    /// Incomplete trailing bytes stay buffered for the next delivery.
    ///
    /// # Errors
    ///
    /// Returns [`FramingError::PayloadTooLarge`] on a corrupt length
    /// prefix. Frames preceding the corrupt header in the same call are
    /// discarded; nothing from this call is dispatched.
    pub fn push(&mut self, data: &[u8]) -> Result<Vec<Frame>, FramingError> {
        self.buffer.extend_from_slice(data);

        let mut frames = Vec::new();
        while let Some(frame) = self.try_extract_one()? {
            frames.push(frame);
        }
        Ok(frames)
    }

    /// Assert the residual buffer is fully drained.
    ///
    /// Call when the stream ends; leftover bytes mean the final frame
    /// was cut off mid-transfer.
    ///
    /// # Errors
    ///
    /// Returns [`FramingError::Truncated`] with the number of leftover
    /// bytes, which are discarded.
    pub fn finish(&mut self) -> Result<(), FramingError> {
        if self.buffer.is_empty() {
            return Ok(());
        }
        let remaining = self.buffer.len();
        self.buffer.clear();
        Err(FramingError::Truncated { remaining })
    }

    /// Number of buffered bytes awaiting the rest of a frame.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    /// Whether no partial frame is buffered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Extract one frame if the buffer holds a complete one.
    fn try_extract_one(&mut self) -> Result<Option<Frame>, FramingError> {
        if self.buffer.len() < PREFIX_LEN {
            return Ok(None);
        }
        let reference_len = usize::from(self.buffer[PREFIX_LEN - 1]);

        let header_len = PREFIX_LEN + reference_len + PAYLOAD_HEADER_LEN;
        if self.buffer.len() < header_len {
            return Ok(None);
        }

        let size_offset = header_len - 4;
        let mut size_bytes = [0_u8; 4];
        size_bytes.copy_from_slice(&self.buffer[size_offset..header_len]);
        let payload_size = u32::from_le_bytes(size_bytes) as usize;
        if payload_size > self.max_payload_size {
            return Err(FramingError::PayloadTooLarge {
                declared: payload_size,
                max: self.max_payload_size,
            });
        }

        let total = header_len + payload_size;
        if self.buffer.len() < total {
            return Ok(None);
        }

        // Cursor invariant: exactly header + payload bytes consumed,
        // regardless of the format tag.
        let mut header = self.buffer.split_to(total);
        let payload = header.split_off(header_len).freeze();

        let mut id_bytes = [0_u8; 8];
        id_bytes.copy_from_slice(&header[..8]);
        let message_id = u64::from_le_bytes(id_bytes);

        // Bytes 8..10 are reserved for future use and skipped.

        // One byte per character: the reference id is ASCII/Latin-1,
        // never multibyte UTF-8.
        let reference_id: String = header[PREFIX_LEN..PREFIX_LEN + reference_len]
            .iter()
            .map(|&b| char::from(b))
            .collect();

        let payload_format = PayloadFormat::from_byte(header[PREFIX_LEN + reference_len]);

        Ok(Some(Frame {
            message_id,
            reference_id,
            payload_format,
            payload,
        }))
    }
}

impl Default for FrameDecoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Decode a buffer that must contain only whole frames.
///
/// This is the contract for transports that never split a frame across
/// deliveries: the entire buffer is drained and any trailing fragment
/// fails the whole call, yielding no frames.
///
/// # Errors
///
/// Returns [`FramingError::Truncated`] if the buffer ends inside a
/// frame, or [`FramingError::PayloadTooLarge`] on a corrupt length
/// prefix.
pub fn decode_frames(data: &[u8]) -> Result<Vec<Frame>, FramingError> {
    let mut decoder = FrameDecoder::new();
    let frames = decoder.push(data)?;
    decoder.finish()?;
    Ok(frames)
}

/// Encode a frame into its wire representation.
///
/// The inverse of the decoder, used for fixtures and loopback tests.
///
/// # Panics
///
/// Panics if the reference id exceeds 50 characters or contains
/// characters outside the Latin-1 range, or if the payload does not
/// fit a 32-bit length field.
#[must_use]
pub fn encode_frame(frame: &Frame) -> Vec<u8> {
    let reference_len = frame.reference_id.chars().count();
    assert!(
        reference_len <= MAX_REFERENCE_ID_LEN,
        "reference id exceeds {MAX_REFERENCE_ID_LEN} characters"
    );
    assert!(
        frame.payload.len() <= u32::MAX as usize,
        "payload does not fit a 32-bit length field"
    );

    let mut out = Vec::with_capacity(frame.encoded_len());
    out.extend_from_slice(&frame.message_id.to_le_bytes());
    out.extend_from_slice(&[0_u8; 2]);
    #[allow(clippy::cast_possible_truncation)]
    out.push(reference_len as u8);
    for ch in frame.reference_id.chars() {
        let code = u32::from(ch);
        assert!(code <= 0xFF, "reference id character outside Latin-1 range");
        #[allow(clippy::cast_possible_truncation)]
        out.push(code as u8);
    }
    out.push(frame.payload_format.as_byte());
    #[allow(clippy::cast_possible_truncation)]
    out.extend_from_slice(&(frame.payload.len() as u32).to_le_bytes());
    out.extend_from_slice(&frame.payload);
    out
}
