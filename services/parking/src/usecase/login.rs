use valet_domain::user::UserRole;

use crate::domain::repository::{Clock, Notifier, OtpChallengeRepository, Signer, UserRepository};
use crate::domain::types::{CodePurpose, SignedAssertion, User};
use crate::error::ParkingServiceError;
use crate::usecase::directory::IdentityDirectory;
use crate::usecase::otp::OtpChallengeStore;

fn required<'a>(value: &'a str, field: &'static str) -> Result<&'a str, ParkingServiceError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ParkingServiceError::InvalidArgument(field));
    }
    Ok(trimmed)
}

// ── RequestLogin ─────────────────────────────────────────────────────────────

pub struct RequestLoginInput {
    pub phone: String,
    pub role: String,
}

pub struct RequestLoginUseCase<O, C, N>
where
    O: OtpChallengeRepository,
    C: Clock,
    N: Notifier,
{
    pub store: OtpChallengeStore<O, C>,
    pub notifier: N,
}

impl<O, C, N> RequestLoginUseCase<O, C, N>
where
    O: OtpChallengeRepository,
    C: Clock,
    N: Notifier,
{
    /// Issue a login code and hand it to the notifier. Returns the code.
    pub async fn execute(&self, input: RequestLoginInput) -> Result<String, ParkingServiceError> {
        let phone = required(&input.phone, "phone")?;
        let role: UserRole = input
            .role
            .parse()
            .map_err(|_| ParkingServiceError::InvalidArgument("role"))?;

        let code = self.store.issue(phone, role).await?;
        tracing::info!(phone, role = %role, code = %code, "login code issued");

        if let Err(e) = self
            .notifier
            .send_code(phone, &code, CodePurpose::Login)
            .await
        {
            tracing::warn!(phone, error = format!("{e:#}"), "login code delivery failed");
        }
        Ok(code)
    }
}

// ── CompleteLogin ────────────────────────────────────────────────────────────

pub struct CompleteLoginInput {
    pub phone: String,
    pub code: String,
    pub name: Option<String>,
    pub venue_name: Option<String>,
}

#[derive(Debug)]
pub struct CompleteLoginOutput {
    pub user: User,
    pub assertion: SignedAssertion,
}

pub struct CompleteLoginUseCase<O, C, U, S>
where
    O: OtpChallengeRepository,
    C: Clock,
    U: UserRepository,
    S: Signer,
{
    pub store: OtpChallengeStore<O, C>,
    pub directory: IdentityDirectory<U, C>,
    pub signer: S,
}

impl<O, C, U, S> CompleteLoginUseCase<O, C, U, S>
where
    O: OtpChallengeRepository,
    C: Clock,
    U: UserRepository,
    S: Signer,
{
    pub async fn execute(
        &self,
        input: CompleteLoginInput,
    ) -> Result<CompleteLoginOutput, ParkingServiceError> {
        let phone = required(&input.phone, "phone")?;
        let code = required(&input.code, "otp")?;

        let role = self.store.verify(phone, code).await?;

        let user = self
            .directory
            .resolve_or_create(
                phone,
                role,
                input.name.as_deref().unwrap_or_default(),
                input.venue_name.as_deref(),
            )
            .await?;

        let assertion = self.signer.sign(&user, self.store.clock.now())?;
        tracing::info!(user_id = %user.id, role = %user.role, "login completed");
        Ok(CompleteLoginOutput { user, assertion })
    }
}
