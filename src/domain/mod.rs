//! Core Dispatch Semantics
//!
//! Domain types for the trade message stream: the closed routing table
//! that maps a frame's reference id to a dispatch route, and the
//! last-seen trade message tracking read by the mark-as-read flow.

pub mod last_seen;
pub mod routing;

pub use last_seen::LastSeenMessageId;
pub use routing::{DEFAULT_TRADE_REFERENCE_ID, HEARTBEAT_REFERENCE_ID, Route, RoutingTable};
