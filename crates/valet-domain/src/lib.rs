//! Domain vocabulary shared across valet services.
//!
//! This crate contains only pure types with no framework dependencies.

pub mod session;
pub mod user;
pub mod vehicle;

/// Returned when a wire string does not name a known variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind}: {value}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}
