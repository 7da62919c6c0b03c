//! One-time code generation and the login challenge store.

use chrono::Duration;
use rand::RngExt;
use subtle::ConstantTimeEq;
use valet_domain::user::UserRole;

use crate::domain::repository::{Clock, OtpChallengeRepository};
use crate::domain::types::{LOGIN_OTP_TTL_SECS, OTP_DIGITS, OtpChallenge};
use crate::error::ParkingServiceError;

/// Uniformly random numeric code of [`OTP_DIGITS`] digits, leading zeros kept.
pub fn generate_code() -> String {
    let mut rng = rand::rng();
    let upper = 10u32.pow(OTP_DIGITS as u32);
    format!("{:0width$}", rng.random_range(0..upper), width = OTP_DIGITS)
}

/// Compare a supplied code with a stored one in constant time.
pub fn codes_match(supplied: &str, stored: &str) -> bool {
    supplied.as_bytes().ct_eq(stored.as_bytes()).into()
}

/// Why a login challenge did not verify.
#[derive(Debug, thiserror::Error)]
pub enum ChallengeError {
    #[error("no challenge matches")]
    NotFound,
    #[error("challenge expired")]
    Expired,
    #[error(transparent)]
    Store(#[from] ParkingServiceError),
}

impl From<ChallengeError> for ParkingServiceError {
    fn from(err: ChallengeError) -> Self {
        match err {
            ChallengeError::NotFound => Self::InvalidCredential,
            ChallengeError::Expired => Self::CredentialExpired,
            ChallengeError::Store(e) => e,
        }
    }
}

pub struct OtpChallengeStore<O, C>
where
    O: OtpChallengeRepository,
    C: Clock,
{
    pub challenges: O,
    pub clock: C,
}

impl<O, C> OtpChallengeStore<O, C>
where
    O: OtpChallengeRepository,
    C: Clock,
{
    /// Issue a fresh code for `phone`, invalidating any earlier one.
    pub async fn issue(&self, phone: &str, role: UserRole) -> Result<String, ParkingServiceError> {
        let now = self.clock.now();
        let challenge = OtpChallenge {
            phone: phone.to_owned(),
            code: generate_code(),
            role,
            expires_at: now + Duration::seconds(LOGIN_OTP_TTL_SECS),
            created_at: now,
        };
        self.challenges.replace(&challenge).await?;
        Ok(challenge.code)
    }

    /// Verify and consume the challenge, returning the role it was issued for.
    pub async fn verify(&self, phone: &str, code: &str) -> Result<UserRole, ChallengeError> {
        let challenge = self
            .challenges
            .find(phone, code)
            .await?
            .ok_or(ChallengeError::NotFound)?;

        if self.clock.now() > challenge.expires_at {
            self.challenges.consume(phone, code).await?;
            return Err(ChallengeError::Expired);
        }

        // Losing the race to a concurrent verify means the code is spent.
        if !self.challenges.consume(phone, code).await? {
            return Err(ChallengeError::NotFound);
        }
        Ok(challenge.role)
    }
}
