//! Saxo Stream Listener Binary
//!
//! Subscribes to the trade message push channel, decodes the binary
//! stream, and logs each dispatched event. On shutdown the most
//! recently seen trade message is marked as read and the subscription
//! is deleted.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin saxo-stream-listener
//! ```
//!
//! # Environment Variables
//!
//! ## Required
//! - `SAXO_ACCESS_TOKEN`: OAuth bearer token
//!
//! ## Optional
//! - `SAXO_ENV`: SIM | LIVE (default: SIM)
//! - `SAXO_CONTEXT_ID`: Stream session id (default: generated)
//! - `SAXO_TRADE_REFERENCE_ID`: Subscription routing key
//!   (default: MyTradeMessageEvent)
//! - `RUST_LOG`: Log level (default: info)

use std::sync::Arc;

use saxo_stream_listener::infrastructure::telemetry;
use saxo_stream_listener::{
    AppConfig, DecodeError, LastSeenMessageId, MessageRouter, RoutingTable, StreamListener,
    StreamListenerConfig, SubscriptionClient, TradeMessageNotification, TradeStreamHandler,
};
use tokio::signal;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    load_dotenv();

    telemetry::init();

    tracing::info!("Starting Saxo stream listener");

    let config = AppConfig::from_env()?;
    log_config(&config);

    let shutdown_token = CancellationToken::new();

    // Shared last-seen state: written by the router, read by the
    // mark-as-read call at shutdown.
    let last_seen = Arc::new(LastSeenMessageId::new());

    let subscriptions = SubscriptionClient::new(
        config.rest_base_url(),
        config.credentials.access_token(),
        config.context_id.clone(),
    )?;

    // Subscribe before connecting so the snapshot and the first frames
    // share the context.
    let subscription = subscriptions.subscribe(&config.trade_reference_id).await?;
    tracing::info!(
        reference_id = %subscription.reference_id,
        state = ?subscription.state,
        "Subscription created"
    );

    let router = MessageRouter::new(
        RoutingTable::new(config.trade_reference_id.clone()),
        Arc::clone(&last_seen),
        LoggingHandler,
    );

    let listener_config = StreamListenerConfig::new(
        config.streamer_url().to_string(),
        config.credentials.access_token().to_string(),
        config.context_id.clone(),
    );
    let listener = StreamListener::new(listener_config, router, shutdown_token.clone());

    let mut listener_handle = tokio::spawn(listener.run());

    tokio::select! {
        result = &mut listener_handle => {
            match result {
                Ok(Ok(())) => tracing::info!("Stream listener finished"),
                Ok(Err(e)) => tracing::error!(error = %e, "Stream listener failed"),
                Err(e) => tracing::error!(error = %e, "Stream listener task panicked"),
            }
        }
        () = await_shutdown() => {
            shutdown_token.cancel();
            let _ = listener_handle.await;
        }
    }

    // Acknowledge what we saw, then tear the subscription down.
    if let Some(message_id) = last_seen.get() {
        match subscriptions.mark_seen(message_id).await {
            Ok(()) => tracing::info!(message_id, "Marked last trade message as read"),
            Err(e) => tracing::warn!(error = %e, "Failed to mark last trade message as read"),
        }
    }

    match subscriptions.unsubscribe(&config.trade_reference_id).await {
        Ok(()) => tracing::info!("Unsubscribed"),
        Err(e) => tracing::warn!(error = %e, "Failed to delete subscription"),
    }

    tracing::info!("Stream listener stopped");
    Ok(())
}

/// Handler that logs every dispatched event.
struct LoggingHandler;

impl TradeStreamHandler for LoggingHandler {
    fn on_trade_message(&self, payload: &serde_json::Value, message_id: u64) {
        match serde_json::from_value::<Vec<TradeMessageNotification>>(payload.clone()) {
            Ok(notifications) => {
                for notification in &notifications {
                    tracing::info!(
                        frame_message_id = message_id,
                        trade_message_id = notification.message_id,
                        header = notification.message_header.as_deref().unwrap_or(""),
                        "Trade message received"
                    );
                }
            }
            Err(e) => {
                // Still a valid trade message frame, just a shape this
                // client does not model; show it raw.
                tracing::info!(
                    frame_message_id = message_id,
                    payload = %payload,
                    decode = %e,
                    "Trade message received (unmodeled shape)"
                );
            }
        }
    }

    fn on_heartbeat(&self, payload: &serde_json::Value, message_id: u64) {
        tracing::debug!(frame_message_id = message_id, payload = %payload, "Heartbeat");
    }

    fn on_unknown_reference(&self, reference_id: &str, message_id: u64) {
        tracing::warn!(
            frame_message_id = message_id,
            reference_id,
            "No processing implemented for this reference id"
        );
    }

    fn on_decode_error(&self, error: &DecodeError) {
        if error.is_fatal() {
            tracing::error!(error = %error, "Stream decoding aborted");
        } else {
            tracing::warn!(error = %error, "Frame skipped");
        }
    }
}

/// Load .env file from current or ancestor directories.
fn load_dotenv() {
    if dotenvy::dotenv().is_err() {
        load_dotenv_from_ancestors();
    }
}

/// Load .env file from any ancestor directory.
fn load_dotenv_from_ancestors() {
    if let Ok(cwd) = std::env::current_dir() {
        let mut dir = cwd.as_path();
        while let Some(parent) = dir.parent() {
            let env_path = parent.join(".env");
            if env_path.exists() {
                let _ = dotenvy::from_path(&env_path);
                return;
            }
            dir = parent;
        }
    }
}

/// Log the parsed configuration.
fn log_config(config: &AppConfig) {
    tracing::info!(
        environment = config.environment.as_str(),
        context_id = %config.context_id,
        trade_reference_id = %config.trade_reference_id,
        "Configuration loaded"
    );
    tracing::debug!(
        streamer_url = %config.streamer_url(),
        rest_base_url = %config.rest_base_url(),
        "Gateway endpoints"
    );
}

/// Wait for shutdown signal (SIGTERM or SIGINT).
#[allow(clippy::expect_used)]
async fn await_shutdown() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("signal handler installation is critical for graceful shutdown");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("SIGTERM handler installation is critical for graceful shutdown")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, initiating shutdown");
        }
    }
}
