//! Configuration
//!
//! Environment-driven configuration for the listener.

pub mod settings;

pub use settings::{AppConfig, ConfigError, Credentials, Environment};
