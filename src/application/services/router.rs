//! Frame Dispatch
//!
//! Takes decoded frames, decodes their JSON payload, and routes them
//! through the closed routing table to the handler port. Also owns the
//! last-seen bookkeeping for trade messages.

use std::sync::Arc;

use crate::application::ports::{DecodeError, TradeStreamHandler};
use crate::domain::{LastSeenMessageId, Route, RoutingTable};
use crate::infrastructure::saxo::codec::PayloadCodec;
use crate::infrastructure::saxo::frame::Frame;

/// Routes decoded frames to the handler port.
///
/// Dispatch is synchronous and in frame order. Each successfully
/// decoded JSON frame results in exactly one handler invocation; a
/// frame whose payload is unsupported or malformed results in a
/// decode-error report instead.
pub struct MessageRouter<H> {
    routes: RoutingTable,
    last_seen: Arc<LastSeenMessageId>,
    codec: PayloadCodec,
    handler: H,
}

impl<H: TradeStreamHandler> MessageRouter<H> {
    /// Create a router.
    ///
    /// `last_seen` is shared with whatever component services
    /// mark-as-read; the router only writes it.
    pub fn new(routes: RoutingTable, last_seen: Arc<LastSeenMessageId>, handler: H) -> Self {
        Self {
            routes,
            last_seen,
            codec: PayloadCodec::new(),
            handler,
        }
    }

    /// Decode one frame's payload and dispatch it.
    ///
    /// The framing layer has already advanced its cursor past this
    /// frame, so payload failures cost only this frame.
    pub fn route(&self, frame: &Frame) {
        let payload = match self.codec.decode(frame) {
            Ok(value) => value,
            Err(source) => {
                self.handler
                    .on_decode_error(&DecodeError::payload(frame, source));
                return;
            }
        };

        match self.routes.resolve(&frame.reference_id) {
            Route::TradeMessage => {
                self.record_last_seen(&payload, frame.message_id);
                self.handler.on_trade_message(&payload, frame.message_id);
            }
            Route::Heartbeat => self.handler.on_heartbeat(&payload, frame.message_id),
            Route::Unrecognized => self
                .handler
                .on_unknown_reference(&frame.reference_id, frame.message_id),
        }
    }

    /// Report an error that did not originate from a routable frame.
    pub fn report(&self, error: &DecodeError) {
        self.handler.on_decode_error(error);
    }

    /// The shared last-seen tracker.
    #[must_use]
    pub fn last_seen(&self) -> &Arc<LastSeenMessageId> {
        &self.last_seen
    }

    /// Track the payload-level `MessageId` of the first notification.
    fn record_last_seen(&self, payload: &serde_json::Value, frame_message_id: u64) {
        match payload
            .get(0)
            .and_then(|first| first.get("MessageId"))
            .and_then(serde_json::Value::as_u64)
        {
            Some(id) => self.last_seen.record(id),
            None => tracing::warn!(
                frame_message_id,
                "trade message payload carries no MessageId; last seen unchanged"
            ),
        }
    }
}
