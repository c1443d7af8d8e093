//! Application Layer
//!
//! Use cases and port definitions sitting between the domain routing
//! semantics and the wire adapters.

pub mod ports;
pub mod services;
