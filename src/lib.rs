#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::float_cmp,
        clippy::too_many_lines,
        clippy::match_same_arms,
        clippy::needless_pass_by_value,
        clippy::default_trait_access,
        clippy::items_after_statements
    )
)]

//! Saxo Stream Listener - Trade Message Push Channel Client
//!
//! Subscribes to the Saxo OpenAPI trade message push channel and
//! decodes the length-prefixed binary frames delivered over the plain
//! WebSocket streaming connection, dispatching each decoded message to
//! a typed handler selected by its routing reference id.
//!
//! # Layers (inside → outside)
//!
//! - **Domain**: Dispatch semantics with no wire knowledge
//!   - `routing`: Closed reference-id routing table
//!   - `last_seen`: Last seen trade message tracking for mark-as-read
//!
//! - **Application**: Use cases and port definitions
//!   - `ports`: The `TradeStreamHandler` dispatch targets
//!   - `services`: Payload decode and per-frame routing
//!
//! - **Infrastructure**: Adapters and external integrations
//!   - `saxo`: Binary framing, JSON codec, WebSocket listener, REST
//!     subscription client
//!   - `config`: Environment-driven configuration
//!   - `telemetry`: Tracing setup
//!
//! # Data Flow
//!
//! ```text
//! Streaming WS ──► FrameDecoder ──► MessageRouter ──► on_trade_message
//!  (binary)         (reassembly)     (by reference)   on_heartbeat
//!                                                     on_unknown_reference
//!                                                     on_decode_error
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

// =============================================================================
// Module Declarations
// =============================================================================

/// Domain layer - Dispatch semantics with no wire knowledge.
pub mod domain;

/// Application layer - Use cases and port definitions.
pub mod application;

/// Infrastructure layer - Adapters and external integrations.
pub mod infrastructure;

// =============================================================================
// Re-exports
// =============================================================================

// Domain types
pub use domain::{
    DEFAULT_TRADE_REFERENCE_ID, HEARTBEAT_REFERENCE_ID, LastSeenMessageId, Route, RoutingTable,
};

// Ports and services
pub use application::ports::{DecodeError, TradeStreamHandler};
pub use application::services::MessageRouter;

// Wire types and the frame decoder
pub use infrastructure::saxo::{
    CodecError, Frame, FrameDecoder, FramingError, PayloadCodec, PayloadFormat, decode_frames,
    encode_frame,
};

// Message schemas
pub use infrastructure::saxo::messages::{
    Heartbeat, HeartbeatEnvelope, HeartbeatReason, SubscriptionRequest, SubscriptionResponse,
    TradeMessageNotification,
};

// Transport and REST glue
pub use infrastructure::saxo::{
    StreamError, StreamListener, StreamListenerConfig, SubscriptionApiError, SubscriptionClient,
};

// Infrastructure config
pub use infrastructure::config::{AppConfig, ConfigError, Credentials, Environment};

// Telemetry
pub use infrastructure::telemetry::init as init_telemetry;
