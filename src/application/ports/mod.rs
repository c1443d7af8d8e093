//! Port Interfaces
//!
//! Contracts the stream core exposes to its collaborators.
//!
//! ## Driver Ports (Inbound)
//!
//! - [`TradeStreamHandler`]: the dispatch targets invoked for each
//!   decoded frame — one call per successfully decoded JSON frame,
//!   none for frames whose payload could not be used.

use crate::infrastructure::saxo::codec::CodecError;
use crate::infrastructure::saxo::frame::Frame;
use crate::infrastructure::saxo::framing::FramingError;

/// Decode failure reported to [`TradeStreamHandler::on_decode_error`].
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// Structural corruption; the whole decode call was aborted and
    /// nothing from it was dispatched.
    #[error("framing error: {0}")]
    Framing(#[from] FramingError),

    /// Per-frame payload failure; the frame was skipped and decoding
    /// continued at the next frame boundary.
    #[error("payload error in frame {message_id} (reference {reference_id:?}): {source}")]
    Payload {
        /// Envelope message id of the skipped frame.
        message_id: u64,
        /// Routing key of the skipped frame.
        reference_id: String,
        /// What went wrong with the payload.
        #[source]
        source: CodecError,
    },
}

impl DecodeError {
    /// Build a payload error carrying the frame's context.
    #[must_use]
    pub fn payload(frame: &Frame, source: CodecError) -> Self {
        Self::Payload {
            message_id: frame.message_id,
            reference_id: frame.reference_id.clone(),
            source,
        }
    }

    /// Whether this error aborted the decode call, as opposed to
    /// skipping a single frame.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::Framing(_))
    }
}

/// Dispatch targets for decoded stream frames.
///
/// Implementations are invoked synchronously from the decode loop, in
/// frame order, and must not block.
pub trait TradeStreamHandler: Send + Sync {
    /// A trade message frame decoded; `payload` is the frame's JSON
    /// payload (an array of notifications) and `message_id` the frame
    /// envelope id.
    fn on_trade_message(&self, payload: &serde_json::Value, message_id: u64);

    /// A heartbeat frame decoded. Expected routine traffic.
    fn on_heartbeat(&self, payload: &serde_json::Value, message_id: u64);

    /// A well-formed JSON frame arrived for a reference id without a
    /// registered route. Expected for subscriptions this listener does
    /// not manage.
    fn on_unknown_reference(&self, reference_id: &str, message_id: u64);

    /// A frame (or a whole delivery) could not be decoded. See
    /// [`DecodeError::is_fatal`] for whether decoding continued.
    fn on_decode_error(&self, error: &DecodeError);
}

impl<T: TradeStreamHandler + ?Sized> TradeStreamHandler for std::sync::Arc<T> {
    fn on_trade_message(&self, payload: &serde_json::Value, message_id: u64) {
        (**self).on_trade_message(payload, message_id);
    }

    fn on_heartbeat(&self, payload: &serde_json::Value, message_id: u64) {
        (**self).on_heartbeat(payload, message_id);
    }

    fn on_unknown_reference(&self, reference_id: &str, message_id: u64) {
        (**self).on_unknown_reference(reference_id, message_id);
    }

    fn on_decode_error(&self, error: &DecodeError) {
        (**self).on_decode_error(error);
    }
}
