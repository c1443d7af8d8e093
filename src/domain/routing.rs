//! Frame Routing
//!
//! Maps a frame's reference id to a dispatch route. Reference ids are
//! caller-chosen subscription keys, except for the server-reserved
//! heartbeat id. The table is closed: an id without a registered route
//! resolves to [`Route::Unrecognized`], which is an expected outcome
//! for subscriptions this listener does not manage, not an error.

/// Reference id the gateway uses for heartbeat frames.
pub const HEARTBEAT_REFERENCE_ID: &str = "_heartbeat";

/// Default routing key for the trade message subscription.
pub const DEFAULT_TRADE_REFERENCE_ID: &str = "MyTradeMessageEvent";

/// Dispatch route resolved for a decoded frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Frame belongs to the trade message subscription.
    TradeMessage,
    /// Server heartbeat for one or more idle subscriptions.
    Heartbeat,
    /// Reference id with no registered route.
    Unrecognized,
}

/// Closed dispatch table keyed by reference id.
///
/// Matching is exact and case-sensitive; the trade routing key is the
/// one the caller chose when creating the subscription.
#[derive(Debug, Clone)]
pub struct RoutingTable {
    trade_reference_id: String,
}

impl RoutingTable {
    /// Create a table routing `trade_reference_id` to the trade handler.
    pub fn new(trade_reference_id: impl Into<String>) -> Self {
        Self {
            trade_reference_id: trade_reference_id.into(),
        }
    }

    /// Resolve a frame's reference id to its route.
    #[must_use]
    pub fn resolve(&self, reference_id: &str) -> Route {
        if reference_id == self.trade_reference_id {
            Route::TradeMessage
        } else if reference_id == HEARTBEAT_REFERENCE_ID {
            Route::Heartbeat
        } else {
            Route::Unrecognized
        }
    }

    /// The routing key registered for trade messages.
    #[must_use]
    pub fn trade_reference_id(&self) -> &str {
        &self.trade_reference_id
    }
}

impl Default for RoutingTable {
    fn default() -> Self {
        Self::new(DEFAULT_TRADE_REFERENCE_ID)
    }
}
