//! Auth types shared across valet services.
//!
//! Provides the signed identity assertion (JWT claims, issue + validate) and
//! the `Identity` extractor that turns a bearer token into a verified
//! `(user_id, role)` pair.

pub mod identity;
pub mod token;
