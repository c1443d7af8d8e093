//! Streaming WebSocket Listener
//!
//! Connects to the plain WebSocket streaming endpoint and feeds every
//! binary delivery through the frame decoder, dispatching decoded
//! frames through the message router.
//!
//! # Connect URL
//!
//! - Simulation: `wss://gateway.saxobank.com/sim/openapi/streamingws/connect`
//! - Live: `wss://gateway.saxobank.com/openapi/streamingws/connect`
//!
//! The bearer token and context id travel as query parameters on the
//! connect request.
//!
//! The listener does not reconnect: when the connection ends, `run`
//! returns and the caller decides what happens next.

use futures_util::{SinkExt, StreamExt};
use tokio_tungstenite::tungstenite::Message;
use tokio_util::sync::CancellationToken;

use crate::application::ports::{DecodeError, TradeStreamHandler};
use crate::application::services::MessageRouter;

use super::framing::{FrameDecoder, FramingError};

// =============================================================================
// Error Type
// =============================================================================

/// Errors that end a streaming session.
#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    /// The configured streamer URL did not parse.
    #[error("invalid streamer URL: {0}")]
    InvalidUrl(String),

    /// WebSocket error.
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// Structural corruption on the wire; decoding cannot continue.
    #[error("framing error: {0}")]
    Framing(#[from] FramingError),

    /// Server closed the connection.
    #[error("connection closed by server")]
    ConnectionClosed,
}

// =============================================================================
// Listener Configuration
// =============================================================================

/// Configuration for the stream listener.
#[derive(Clone)]
pub struct StreamListenerConfig {
    /// Base streaming connect URL, without query parameters.
    pub streamer_url: String,
    /// OAuth bearer token, sent in the connect query.
    pub access_token: String,
    /// Stream session context id.
    pub context_id: String,
}

impl StreamListenerConfig {
    /// Create a listener configuration.
    #[must_use]
    pub const fn new(streamer_url: String, access_token: String, context_id: String) -> Self {
        Self {
            streamer_url,
            access_token,
            context_id,
        }
    }

    /// Build the connect URL with authorization and context id query
    /// parameters, percent-encoded.
    ///
    /// # Errors
    ///
    /// Returns [`StreamError::InvalidUrl`] if the base URL does not
    /// parse.
    pub fn connect_url(&self) -> Result<reqwest::Url, StreamError> {
        let mut url = reqwest::Url::parse(&self.streamer_url)
            .map_err(|e| StreamError::InvalidUrl(e.to_string()))?;
        url.query_pairs_mut()
            .append_pair("authorization", &format!("BEARER {}", self.access_token))
            .append_pair("contextId", &self.context_id);
        Ok(url)
    }
}

impl std::fmt::Debug for StreamListenerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamListenerConfig")
            .field("streamer_url", &self.streamer_url)
            .field("access_token", &"[REDACTED]")
            .field("context_id", &self.context_id)
            .finish()
    }
}

// =============================================================================
// Stream Listener
// =============================================================================

/// WebSocket listener for the trade message push channel.
///
/// Owns one [`FrameDecoder`] per connection, so frames split across
/// transport deliveries are reassembled before dispatch.
pub struct StreamListener<H> {
    config: StreamListenerConfig,
    router: MessageRouter<H>,
    decoder: FrameDecoder,
    cancel: CancellationToken,
}

impl<H: TradeStreamHandler> StreamListener<H> {
    /// Create a listener.
    #[must_use]
    pub fn new(
        config: StreamListenerConfig,
        router: MessageRouter<H>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            config,
            router,
            decoder: FrameDecoder::new(),
            cancel,
        }
    }

    /// Connect and process deliveries until the server closes the
    /// stream, a fatal framing error occurs, or cancellation fires.
    ///
    /// # Errors
    ///
    /// Returns the error that ended the session. Cancellation is a
    /// clean `Ok(())`.
    pub async fn run(mut self) -> Result<(), StreamError> {
        let url = self.config.connect_url()?;
        tracing::info!(url = %self.config.streamer_url, context_id = %self.config.context_id, "Connecting to streaming endpoint");

        let (ws_stream, _response) = tokio_tungstenite::connect_async(url.as_str()).await?;
        tracing::info!("Streaming connected");

        let (mut write, mut read) = ws_stream.split();
        let cancel = self.cancel.clone();

        loop {
            tokio::select! {
                () = cancel.cancelled() => {
                    tracing::info!("Stream listener cancelled");
                    let _ = write.send(Message::Close(None)).await;
                    return Ok(());
                }
                msg = read.next() => {
                    match msg {
                        Some(Ok(Message::Binary(data))) => {
                            self.handle_delivery(&data)?;
                        }
                        Some(Ok(Message::Ping(data))) => {
                            write.send(Message::Pong(data)).await?;
                        }
                        Some(Ok(Message::Pong(_))) => {}
                        Some(Ok(Message::Close(_))) => {
                            tracing::info!("Server sent close frame");
                            self.check_drained()?;
                            return Err(StreamError::ConnectionClosed);
                        }
                        Some(Ok(_)) => {
                            tracing::trace!("Ignoring non-binary message");
                        }
                        Some(Err(e)) => return Err(e.into()),
                        None => {
                            tracing::info!("WebSocket stream ended");
                            self.check_drained()?;
                            return Err(StreamError::ConnectionClosed);
                        }
                    }
                }
            }
        }
    }

    /// Decode one transport delivery and dispatch every frame that is
    /// now complete, in order.
    fn handle_delivery(&mut self, data: &[u8]) -> Result<(), StreamError> {
        match self.decoder.push(data) {
            Ok(frames) => {
                for frame in &frames {
                    self.router.route(frame);
                }
                Ok(())
            }
            Err(e) => {
                self.router.report(&DecodeError::Framing(e.clone()));
                Err(e.into())
            }
        }
    }

    /// Report a frame cut off by connection end, if any.
    fn check_drained(&mut self) -> Result<(), StreamError> {
        if let Err(e) = self.decoder.finish() {
            self.router.report(&DecodeError::Framing(e.clone()));
            return Err(e.into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connect_url_encodes_query_parameters() {
        let config = StreamListenerConfig::new(
            "wss://gateway.saxobank.com/sim/openapi/streamingws/connect".to_string(),
            "abc def".to_string(),
            "MyApp_1".to_string(),
        );

        let url = config.connect_url().unwrap();
        let query = url.query().unwrap();
        assert!(query.contains("authorization=BEARER+abc+def"));
        assert!(query.contains("contextId=MyApp_1"));
        assert_eq!(url.scheme(), "wss");
        assert_eq!(url.path(), "/sim/openapi/streamingws/connect");
    }

    #[test]
    fn connect_url_rejects_garbage() {
        let config = StreamListenerConfig::new(
            "not a url".to_string(),
            "token".to_string(),
            "ctx".to_string(),
        );
        assert!(matches!(
            config.connect_url(),
            Err(StreamError::InvalidUrl(_))
        ));
    }

    #[test]
    fn debug_redacts_access_token() {
        let config = StreamListenerConfig::new(
            "wss://example.test/connect".to_string(),
            "secret-token".to_string(),
            "ctx".to_string(),
        );
        let debug = format!("{config:?}");
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("secret-token"));
    }
}
