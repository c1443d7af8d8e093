//! Listener Configuration Settings
//!
//! Configuration types for the stream listener, loaded from
//! environment variables.

use crate::domain::DEFAULT_TRADE_REFERENCE_ID;

/// Maximum context id length accepted by the gateway.
const MAX_CONTEXT_ID_LEN: usize = 50;

/// Gateway environment (simulation vs live).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    /// Simulation environment.
    #[default]
    Sim,
    /// Live environment (real accounts).
    Live,
}

impl Environment {
    /// Parse environment from string.
    #[must_use]
    pub fn from_str_case_insensitive(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "LIVE" => Self::Live,
            _ => Self::Sim,
        }
    }

    /// Check if this is the live environment.
    #[must_use]
    pub const fn is_live(&self) -> bool {
        matches!(self, Self::Live)
    }

    /// Get the environment name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Sim => "sim",
            Self::Live => "live",
        }
    }
}

/// OAuth credentials for the gateway.
#[derive(Clone)]
pub struct Credentials {
    access_token: String,
}

impl Credentials {
    /// Create new credentials.
    #[must_use]
    pub const fn new(access_token: String) -> Self {
        Self { access_token }
    }

    /// Get the access token.
    #[must_use]
    pub fn access_token(&self) -> &str {
        &self.access_token
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("access_token", &"[REDACTED]")
            .finish()
    }
}

/// Complete listener configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Gateway environment.
    pub environment: Environment,
    /// OAuth credentials.
    pub credentials: Credentials,
    /// Stream session context id.
    pub context_id: String,
    /// Routing key for the trade message subscription.
    pub trade_reference_id: String,
}

impl AppConfig {
    /// Create configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if `SAXO_ACCESS_TOKEN` is missing or empty, or
    /// if the context id carries characters the gateway rejects.
    pub fn from_env() -> Result<Self, ConfigError> {
        let access_token = std::env::var("SAXO_ACCESS_TOKEN")
            .map_err(|_| ConfigError::MissingEnvVar("SAXO_ACCESS_TOKEN".to_string()))?;

        if access_token.is_empty() {
            return Err(ConfigError::EmptyValue("SAXO_ACCESS_TOKEN".to_string()));
        }

        let environment = std::env::var("SAXO_ENV")
            .map(|s| Environment::from_str_case_insensitive(&s))
            .unwrap_or_default();

        let context_id =
            std::env::var("SAXO_CONTEXT_ID").unwrap_or_else(|_| generate_context_id());
        validate_context_id(&context_id)?;

        let trade_reference_id = std::env::var("SAXO_TRADE_REFERENCE_ID")
            .unwrap_or_else(|_| DEFAULT_TRADE_REFERENCE_ID.to_string());

        Ok(Self {
            environment,
            credentials: Credentials::new(access_token),
            context_id,
            trade_reference_id,
        })
    }

    /// Streaming connect URL for the configured environment.
    #[must_use]
    pub const fn streamer_url(&self) -> &'static str {
        match self.environment {
            Environment::Sim => "wss://gateway.saxobank.com/sim/openapi/streamingws/connect",
            Environment::Live => "wss://gateway.saxobank.com/openapi/streamingws/connect",
        }
    }

    /// REST base URL for the configured environment.
    #[must_use]
    pub const fn rest_base_url(&self) -> &'static str {
        match self.environment {
            Environment::Sim => "https://gateway.saxobank.com/sim/openapi",
            Environment::Live => "https://gateway.saxobank.com/openapi",
        }
    }
}

/// Generate a unique context id for this process.
fn generate_context_id() -> String {
    format!("app-{}", uuid::Uuid::new_v4().simple())
}

/// Reject context ids the gateway cannot carry in URLs verbatim.
fn validate_context_id(context_id: &str) -> Result<(), ConfigError> {
    let valid = !context_id.is_empty()
        && context_id.len() <= MAX_CONTEXT_ID_LEN
        && context_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');

    if valid {
        Ok(())
    } else {
        Err(ConfigError::InvalidContextId(context_id.to_string()))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A required environment variable is not set.
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    /// An environment variable is set but empty.
    #[error("environment variable is empty: {0}")]
    EmptyValue(String),

    /// Context id is empty, too long, or carries invalid characters.
    #[error("invalid context id: {0:?} (max 50 chars, [A-Za-z0-9_-])")]
    InvalidContextId(String),
}
