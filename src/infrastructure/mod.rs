//! Infrastructure Layer
//!
//! Adapters and external integrations: the Saxo wire protocol,
//! configuration, and tracing setup.

pub mod config;
pub mod saxo;
pub mod telemetry;
