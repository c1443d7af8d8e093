//! Trade Message Wire Types
//!
//! Serde types for the JSON payloads carried by stream frames and for
//! the subscription REST endpoints.
//!
//! # Payload Shapes
//!
//! Trade message frames carry an array of notification objects:
//!
//! ```json
//! [{"MessageId": 1710587, "DisplayType": "Default",
//!   "MessageHeader": "Order filled", "MessageBody": "...",
//!   "Date": "2024-01-15T10:00:00Z"}]
//! ```
//!
//! Heartbeat frames carry an array of envelopes naming the idle
//! subscriptions:
//!
//! ```json
//! [{"ReferenceId": "_heartbeat",
//!   "Heartbeats": [{"OriginatingReferenceId": "MyTradeMessageEvent",
//!                   "Reason": "NoNewData"}]}]
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// Stream Payloads
// =============================================================================

/// One trade message notification, an element of a trade message
/// frame's payload array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TradeMessageNotification {
    /// Payload-level message id, used by the mark-as-read endpoint.
    pub message_id: u64,

    /// When the message was produced.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<DateTime<Utc>>,

    /// Presentation hint for UIs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_type: Option<String>,

    /// Short headline.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_header: Option<String>,

    /// Full message text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_body: Option<String>,

    /// Whether the message may be dropped without acknowledgement.
    #[serde(default)]
    pub is_discardable: bool,
}

/// One element of a heartbeat frame's payload array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct HeartbeatEnvelope {
    /// Reference id of the envelope itself.
    #[serde(default)]
    pub reference_id: String,

    /// Heartbeats for each subscription with nothing new to send.
    #[serde(default)]
    pub heartbeats: Vec<Heartbeat>,
}

/// Heartbeat for a single idle subscription.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Heartbeat {
    /// The subscription this heartbeat speaks for.
    pub originating_reference_id: String,

    /// Why the server sent a heartbeat instead of data.
    pub reason: HeartbeatReason,
}

/// Server-stated reason for a heartbeat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HeartbeatReason {
    /// The subscription is healthy but idle.
    NoNewData,
    /// Delivery is paused; data will resume.
    SubscriptionTemporarilyDisabled,
    /// The subscription is gone and must be recreated.
    SubscriptionPermanentlyDisabled,
    /// Reason added after this client was written.
    #[serde(other)]
    Unknown,
}

// =============================================================================
// Subscription REST Messages
// =============================================================================

/// Body of the subscription create request.
///
/// # Wire Format (JSON)
/// ```json
/// {"ContextId": "MyApp1234", "ReferenceId": "MyTradeMessageEvent",
///  "Format": "application/json"}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SubscriptionRequest {
    /// Stream session the subscription binds to.
    pub context_id: String,

    /// Caller-chosen routing key echoed on every frame.
    pub reference_id: String,

    /// Requested payload format.
    pub format: String,
}

impl SubscriptionRequest {
    /// Create a JSON-format subscription request.
    #[must_use]
    pub fn json(context_id: String, reference_id: String) -> Self {
        Self {
            context_id,
            reference_id,
            format: "application/json".to_string(),
        }
    }
}

/// Subscription snapshot returned by the create endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SubscriptionResponse {
    /// Stream session the subscription binds to.
    #[serde(default)]
    pub context_id: String,

    /// Routing key of the created subscription.
    #[serde(default)]
    pub reference_id: String,

    /// Subscription state as reported by the server.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,

    /// Seconds of silence after which the server considers the
    /// subscription abandoned.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inactivity_timeout: Option<u32>,

    /// Payload format granted by the server.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}
