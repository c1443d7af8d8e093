//! Saxo OpenAPI Adapters
//!
//! The wire: binary stream framing, JSON payload codec, typed message
//! schemas, the WebSocket stream listener, and the subscription REST
//! client.

pub mod codec;
pub mod frame;
pub mod framing;
pub mod messages;
pub mod streaming;
pub mod subscriptions;

pub use codec::{CodecError, PayloadCodec};
pub use frame::{Frame, MAX_REFERENCE_ID_LEN, PayloadFormat};
pub use framing::{
    DEFAULT_MAX_PAYLOAD_SIZE, FrameDecoder, FramingError, decode_frames, encode_frame,
};
pub use messages::*;
pub use streaming::{StreamError, StreamListener, StreamListenerConfig};
pub use subscriptions::{SubscriptionApiError, SubscriptionClient};
