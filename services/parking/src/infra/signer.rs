use std::sync::Arc;

use anyhow::Context as _;
use chrono::{DateTime, Duration, Utc};
use valet_auth_types::token::{ASSERTION_TTL_SECS, JwtClaims, issue_token};

use crate::domain::repository::Signer;
use crate::domain::types::{SignedAssertion, User};
use crate::error::ParkingServiceError;

/// HS256 assertions carrying user id, phone and role.
#[derive(Clone)]
pub struct JwtSigner {
    pub secret: Arc<str>,
}

impl Signer for JwtSigner {
    fn sign(
        &self,
        user: &User,
        issued_at: DateTime<Utc>,
    ) -> Result<SignedAssertion, ParkingServiceError> {
        let claims = JwtClaims::new(user.id, user.phone.as_str(), user.role, issued_at.timestamp());
        let token = issue_token(&claims, &self.secret).context("sign identity assertion")?;
        Ok(SignedAssertion {
            token,
            expires_at: issued_at + Duration::seconds(ASSERTION_TTL_SECS),
        })
    }
}
