//! Frame Stream Decoding Integration Tests
//!
//! Exercises the decoder and router together over synthetic wire
//! buffers: round-trips, multi-frame buffers, skip-and-resume on bad
//! payloads, truncation, routing selection, and delivery chunking.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::{Arc, Mutex};

use bytes::Bytes;
use proptest::prelude::*;
use saxo_stream_listener::{
    DecodeError, Frame, FrameDecoder, FramingError, LastSeenMessageId, MessageRouter,
    PayloadFormat, RoutingTable, TradeStreamHandler, decode_frames, encode_frame,
};

// =============================================================================
// Test Handler
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
enum Dispatched {
    Trade { message_id: u64, payload: String },
    Heartbeat { message_id: u64 },
    Unknown { message_id: u64, reference_id: String },
    Error { fatal: bool, message: String },
}

#[derive(Default)]
struct RecordingHandler {
    dispatched: Mutex<Vec<Dispatched>>,
}

impl RecordingHandler {
    fn take(&self) -> Vec<Dispatched> {
        self.dispatched.lock().unwrap().drain(..).collect()
    }
}

impl TradeStreamHandler for RecordingHandler {
    fn on_trade_message(&self, payload: &serde_json::Value, message_id: u64) {
        self.dispatched.lock().unwrap().push(Dispatched::Trade {
            message_id,
            payload: payload.to_string(),
        });
    }

    fn on_heartbeat(&self, _payload: &serde_json::Value, message_id: u64) {
        self.dispatched
            .lock()
            .unwrap()
            .push(Dispatched::Heartbeat { message_id });
    }

    fn on_unknown_reference(&self, reference_id: &str, message_id: u64) {
        self.dispatched.lock().unwrap().push(Dispatched::Unknown {
            message_id,
            reference_id: reference_id.to_string(),
        });
    }

    fn on_decode_error(&self, error: &DecodeError) {
        self.dispatched.lock().unwrap().push(Dispatched::Error {
            fatal: error.is_fatal(),
            message: error.to_string(),
        });
    }
}

// =============================================================================
// Fixtures
// =============================================================================

fn json_frame(message_id: u64, reference_id: &str, payload: &str) -> Frame {
    Frame {
        message_id,
        reference_id: reference_id.to_string(),
        payload_format: PayloadFormat::Json,
        payload: Bytes::copy_from_slice(payload.as_bytes()),
    }
}

fn setup() -> (
    MessageRouter<Arc<RecordingHandler>>,
    Arc<RecordingHandler>,
    Arc<LastSeenMessageId>,
) {
    let handler = Arc::new(RecordingHandler::default());
    let last_seen = Arc::new(LastSeenMessageId::new());
    let router = MessageRouter::new(
        RoutingTable::default(),
        Arc::clone(&last_seen),
        Arc::clone(&handler),
    );
    (router, handler, last_seen)
}

fn route_buffer(
    router: &MessageRouter<Arc<RecordingHandler>>,
    buffer: &[u8],
) -> Result<(), FramingError> {
    let frames = decode_frames(buffer)?;
    for frame in &frames {
        router.route(frame);
    }
    Ok(())
}

// =============================================================================
// Round-trip and Multi-frame
// =============================================================================

#[test]
fn round_trip_preserves_identity() {
    let payload = r#"[{"MessageId":1710587,"MessageHeader":"Order filled"}]"#;
    let original = json_frame(987_654_321, "MyTradeMessageEvent", payload);

    let decoded = decode_frames(&encode_frame(&original)).unwrap();
    assert_eq!(decoded, vec![original.clone()]);
    assert_eq!(decoded[0].message_id, 987_654_321);
    assert_eq!(decoded[0].reference_id, "MyTradeMessageEvent");

    // The routed payload is the same JSON value that went in.
    let (router, handler, _) = setup();
    router.route(&decoded[0]);
    let expected: serde_json::Value = serde_json::from_str(payload).unwrap();
    assert_eq!(
        handler.take(),
        vec![Dispatched::Trade {
            message_id: 987_654_321,
            payload: expected.to_string(),
        }]
    );
}

#[test]
fn n_concatenated_frames_yield_n_dispatches_in_order() {
    let (router, handler, _) = setup();

    let mut wire = Vec::new();
    for id in 1..=5_u64 {
        let frame = json_frame(id, "MyTradeMessageEvent", &format!(r#"[{{"MessageId":{id}}}]"#));
        wire.extend_from_slice(&encode_frame(&frame));
    }

    route_buffer(&router, &wire).unwrap();

    let dispatched = handler.take();
    assert_eq!(dispatched.len(), 5);
    for (index, call) in dispatched.iter().enumerate() {
        let expected_id = index as u64 + 1;
        assert!(matches!(call, Dispatched::Trade { message_id, .. } if *message_id == expected_id));
    }
}

// =============================================================================
// Skip-and-resume and Truncation
// =============================================================================

#[test]
fn unsupported_format_is_skipped_and_decoding_resumes() {
    let (router, handler, last_seen) = setup();

    let mut odd = json_frame(1, "MyTradeMessageEvent", "12345");
    odd.payload_format = PayloadFormat::Unsupported(7);
    assert_eq!(odd.payload.len(), 5);
    let good = json_frame(2, "MyTradeMessageEvent", r#"[{"MessageId":2}]"#);

    let mut wire = encode_frame(&odd);
    wire.extend_from_slice(&encode_frame(&good));

    route_buffer(&router, &wire).unwrap();

    let dispatched = handler.take();
    assert_eq!(dispatched.len(), 2);
    assert!(matches!(
        &dispatched[0],
        Dispatched::Error { fatal: false, message } if message.contains("unsupported payload format: 7")
    ));
    assert!(matches!(
        &dispatched[1],
        Dispatched::Trade { message_id: 2, .. }
    ));
    // Only the good frame touched last-seen.
    assert_eq!(last_seen.get(), Some(2));
}

#[test]
fn malformed_json_is_skipped_and_decoding_resumes() {
    let (router, handler, _) = setup();

    let bad = json_frame(1, "MyTradeMessageEvent", "{not json at all");
    let good = json_frame(2, "_heartbeat", "[]");

    let mut wire = encode_frame(&bad);
    wire.extend_from_slice(&encode_frame(&good));

    route_buffer(&router, &wire).unwrap();

    let dispatched = handler.take();
    assert_eq!(dispatched.len(), 2);
    assert!(matches!(&dispatched[0], Dispatched::Error { fatal: false, .. }));
    assert!(matches!(&dispatched[1], Dispatched::Heartbeat { message_id: 2 }));
}

#[test]
fn truncated_buffer_dispatches_nothing() {
    let (router, handler, last_seen) = setup();

    let frame = json_frame(1, "MyTradeMessageEvent", r#"[{"MessageId":1}]"#);
    let wire = encode_frame(&frame);

    // Declared payload size exceeds the remaining bytes.
    let err = route_buffer(&router, &wire[..wire.len() - 4]).unwrap_err();
    assert!(matches!(err, FramingError::Truncated { .. }));
    assert!(handler.take().is_empty());
    assert_eq!(last_seen.get(), None);
}

// =============================================================================
// Routing
// =============================================================================

#[test]
fn heartbeat_reference_invokes_only_heartbeat_handler() {
    let (router, handler, last_seen) = setup();

    let frame = json_frame(
        3,
        "_heartbeat",
        r#"[{"Heartbeats":[{"OriginatingReferenceId":"MyTradeMessageEvent","Reason":"NoNewData"}]}]"#,
    );
    router.route(&frame);

    assert_eq!(handler.take(), vec![Dispatched::Heartbeat { message_id: 3 }]);
    assert_eq!(last_seen.get(), None);
}

#[test]
fn trade_reference_invokes_only_trade_handler_and_updates_last_seen() {
    let (router, handler, last_seen) = setup();

    let frame = json_frame(4, "MyTradeMessageEvent", r#"[{"MessageId":777}]"#);
    router.route(&frame);

    let dispatched = handler.take();
    assert_eq!(dispatched.len(), 1);
    assert!(matches!(
        &dispatched[0],
        Dispatched::Trade { message_id: 4, .. }
    ));
    assert_eq!(last_seen.get(), Some(777));
}

#[test]
fn other_reference_invokes_only_unknown_handler() {
    let (router, handler, last_seen) = setup();

    let frame = json_frame(5, "SomePriceFeed", r#"{"Bid":1.1}"#);
    router.route(&frame);

    assert_eq!(
        handler.take(),
        vec![Dispatched::Unknown {
            message_id: 5,
            reference_id: "SomePriceFeed".to_string(),
        }]
    );
    assert_eq!(last_seen.get(), None);
}

// =============================================================================
// 64-bit Id Fidelity
// =============================================================================

#[test]
fn message_id_above_2_pow_53_decodes_exactly() {
    let id = (1_u64 << 53) + 1;
    let frame = json_frame(id, "MyTradeMessageEvent", "[]");

    let decoded = decode_frames(&encode_frame(&frame)).unwrap();
    assert_eq!(decoded[0].message_id, id);

    // The documented lossy fallback demonstrates why the exact path
    // matters: floating-point composition flattens this value.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let lossy = decoded[0].message_id_lossy() as u64;
    assert_ne!(lossy, id);
}

// =============================================================================
// Delivery Chunking
// =============================================================================

fn sample_stream() -> Vec<u8> {
    let mut wire = Vec::new();
    wire.extend_from_slice(&encode_frame(&json_frame(
        1,
        "MyTradeMessageEvent",
        r#"[{"MessageId":11}]"#,
    )));
    wire.extend_from_slice(&encode_frame(&json_frame(2, "_heartbeat", "[]")));
    let mut unsupported = json_frame(3, "Opaque", "123");
    unsupported.payload_format = PayloadFormat::Unsupported(9);
    wire.extend_from_slice(&encode_frame(&unsupported));
    wire.extend_from_slice(&encode_frame(&json_frame(
        4,
        "MyTradeMessageEvent",
        r#"[{"MessageId":44}]"#,
    )));
    wire
}

proptest! {
    /// However the transport slices the byte stream into deliveries,
    /// the decoded frame sequence is identical.
    #[test]
    fn chunking_never_changes_decoded_frames(
        raw_cuts in prop::collection::vec(any::<prop::sample::Index>(), 0..8)
    ) {
        let wire = sample_stream();
        let expected = decode_frames(&wire).unwrap();

        let mut cuts: Vec<usize> = raw_cuts.iter().map(|i| i.index(wire.len())).collect();
        cuts.sort_unstable();
        cuts.dedup();

        let mut decoder = FrameDecoder::new();
        let mut frames = Vec::new();
        let mut start = 0;
        for cut in cuts {
            frames.extend(decoder.push(&wire[start..cut]).unwrap());
            start = cut;
        }
        frames.extend(decoder.push(&wire[start..]).unwrap());
        decoder.finish().unwrap();

        prop_assert_eq!(frames, expected);
    }
}
