//! Ambient plumbing shared by valet services: error envelope, health probes,
//! HTTP middleware stack, tracing setup, and env-driven configuration.

pub mod config;
pub mod error;
pub mod health;
pub mod middleware;
pub mod serde;
pub mod tracing;
