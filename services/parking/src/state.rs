use std::sync::Arc;

use axum::extract::FromRef;
use sea_orm::DatabaseConnection;
use valet_auth_types::identity::TokenSecret;

use crate::infra::clock::SystemClock;
use crate::infra::db::{
    DbOtpChallengeRepository, DbSessionRepository, DbUserRepository, DbVehicleRepository,
};
use crate::infra::notifier::AppNotifier;
use crate::infra::signer::JwtSigner;
use crate::usecase::directory::IdentityDirectory;
use crate::usecase::otp::OtpChallengeStore;
use crate::usecase::session_query::SessionEnricher;

/// Shared application state passed to every handler via axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub jwt_secret: Arc<str>,
    pub notifier: AppNotifier,
    /// Echo one-time codes in responses.
    pub return_otp_in_response: bool,
}

impl FromRef<AppState> for TokenSecret {
    fn from_ref(state: &AppState) -> Self {
        TokenSecret(state.jwt_secret.clone())
    }
}

impl AppState {
    pub fn user_repo(&self) -> DbUserRepository {
        DbUserRepository {
            db: self.db.clone(),
        }
    }

    pub fn vehicle_repo(&self) -> DbVehicleRepository {
        DbVehicleRepository {
            db: self.db.clone(),
        }
    }

    pub fn session_repo(&self) -> DbSessionRepository {
        DbSessionRepository {
            db: self.db.clone(),
        }
    }

    pub fn otp_store(&self) -> OtpChallengeStore<DbOtpChallengeRepository, SystemClock> {
        OtpChallengeStore {
            challenges: DbOtpChallengeRepository {
                db: self.db.clone(),
            },
            clock: SystemClock,
        }
    }

    pub fn directory(&self) -> IdentityDirectory<DbUserRepository, SystemClock> {
        IdentityDirectory {
            users: self.user_repo(),
            clock: SystemClock,
        }
    }

    pub fn enricher(&self) -> SessionEnricher<DbVehicleRepository, DbUserRepository> {
        SessionEnricher {
            vehicles: self.vehicle_repo(),
            users: self.user_repo(),
        }
    }

    /// The code to put in a response body, if codes are echoed at all.
    pub fn echoed_code(&self, code: String) -> Option<String> {
        self.return_otp_in_response.then_some(code)
    }

    pub fn signer(&self) -> JwtSigner {
        JwtSigner {
            secret: self.jwt_secret.clone(),
        }
    }
}
