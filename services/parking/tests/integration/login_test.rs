use std::sync::Arc;

use chrono::Duration;
use valet_auth_types::token::validate_token;
use valet_domain::user::UserRole;
use valet_parking::domain::repository::Clock;
use valet_parking::domain::types::{Actor, CodePurpose, LOGIN_OTP_TTL_SECS};
use valet_parking::error::ParkingServiceError;
use valet_parking::infra::signer::JwtSigner;
use valet_parking::usecase::directory::{
    IdentityDirectory, UpdateProfileInput, UpdateProfileUseCase,
};
use valet_parking::usecase::login::{
    CompleteLoginInput, CompleteLoginUseCase, RequestLoginInput, RequestLoginUseCase,
};
use valet_parking::usecase::otp::OtpChallengeStore;

use crate::helpers::{FixedClock, MemoryStore, RecordingNotifier, test_user, wrong_code};

const TEST_JWT_SECRET: &str = "integration-test-secret";
const PHONE: &str = "+15550111";

struct LoginDesk {
    store: MemoryStore,
    clock: FixedClock,
    notifier: RecordingNotifier,
}

impl LoginDesk {
    fn new() -> Self {
        Self::with_notifier(RecordingNotifier::default())
    }

    fn with_notifier(notifier: RecordingNotifier) -> Self {
        Self {
            store: MemoryStore::new(),
            clock: FixedClock::new(),
            notifier,
        }
    }

    fn otp_store(&self) -> OtpChallengeStore<MemoryStore, FixedClock> {
        OtpChallengeStore {
            challenges: self.store.clone(),
            clock: self.clock.clone(),
        }
    }

    async fn request(&self, phone: &str, role: &str) -> Result<String, ParkingServiceError> {
        RequestLoginUseCase {
            store: self.otp_store(),
            notifier: self.notifier.clone(),
        }
        .execute(RequestLoginInput {
            phone: phone.to_owned(),
            role: role.to_owned(),
        })
        .await
    }

    async fn complete(
        &self,
        phone: &str,
        code: &str,
        name: Option<&str>,
    ) -> Result<valet_parking::usecase::login::CompleteLoginOutput, ParkingServiceError> {
        CompleteLoginUseCase {
            store: self.otp_store(),
            directory: IdentityDirectory {
                users: self.store.clone(),
                clock: self.clock.clone(),
            },
            signer: JwtSigner {
                secret: Arc::from(TEST_JWT_SECRET),
            },
        }
        .execute(CompleteLoginInput {
            phone: phone.to_owned(),
            code: code.to_owned(),
            name: name.map(str::to_owned),
            venue_name: Some("Grand Hotel".to_owned()),
        })
        .await
    }
}

// ── RequestLogin ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_issue_six_digit_code_and_notify_phone() {
    let desk = LoginDesk::new();

    let code = desk.request(PHONE, "customer").await.unwrap();

    assert_eq!(code.len(), 6);
    assert!(code.chars().all(|c| c.is_ascii_digit()));
    assert_eq!(
        desk.notifier.sent(),
        vec![(PHONE.to_owned(), code, CodePurpose::Login)]
    );
}

#[tokio::test]
async fn should_reject_unknown_role() {
    let desk = LoginDesk::new();

    let result = desk.request(PHONE, "admin").await;

    assert!(
        matches!(result, Err(ParkingServiceError::InvalidArgument("role"))),
        "expected InvalidArgument(role), got {result:?}"
    );
    assert_eq!(desk.store.challenge_count(PHONE), 0);
}

#[tokio::test]
async fn should_reject_blank_phone() {
    let desk = LoginDesk::new();

    let result = desk.request("   ", "customer").await;

    assert!(matches!(
        result,
        Err(ParkingServiceError::InvalidArgument("phone"))
    ));
}

#[tokio::test]
async fn should_issue_code_even_when_notifier_fails() {
    let desk = LoginDesk::with_notifier(RecordingNotifier::failing());

    let code = desk.request(PHONE, "valet").await.unwrap();

    assert_eq!(desk.store.challenge_count(PHONE), 1);
    assert!(desk.complete(PHONE, &code, Some("Vik")).await.is_ok());
}

#[tokio::test]
async fn should_keep_only_latest_code_per_phone() {
    let desk = LoginDesk::new();
    let first = desk.request(PHONE, "customer").await.unwrap();
    let second = loop {
        let code = desk.request(PHONE, "customer").await.unwrap();
        if code != first {
            break code;
        }
    };

    assert_eq!(desk.store.challenge_count(PHONE), 1);
    let stale = desk.complete(PHONE, &first, None).await;
    assert!(
        matches!(stale, Err(ParkingServiceError::InvalidCredential)),
        "expected InvalidCredential, got {stale:?}"
    );
    assert!(desk.complete(PHONE, &second, None).await.is_ok());
}

// ── CompleteLogin ────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_create_user_and_sign_assertion_on_first_login() {
    let desk = LoginDesk::new();
    let code = desk.request(PHONE, "customer").await.unwrap();

    let out = desk.complete(PHONE, &code, Some("  Asha  ")).await.unwrap();

    assert_eq!(out.user.phone, PHONE);
    assert_eq!(out.user.role, UserRole::Customer);
    assert_eq!(out.user.name, "Asha");
    assert_eq!(out.user.venue_name, None);
    assert_eq!(out.user.created_at, desk.clock.now());

    let info = validate_token(&out.assertion.token, TEST_JWT_SECRET).unwrap();
    assert_eq!(info.user_id, out.user.id);
    assert_eq!(info.role, UserRole::Customer);
    assert_eq!(info.exp, out.assertion.expires_at.timestamp());
}

#[tokio::test]
async fn should_consume_code_so_it_cannot_be_replayed() {
    let desk = LoginDesk::new();
    let code = desk.request(PHONE, "customer").await.unwrap();
    desk.complete(PHONE, &code, None).await.unwrap();

    let replay = desk.complete(PHONE, &code, None).await;

    assert!(
        matches!(replay, Err(ParkingServiceError::InvalidCredential)),
        "expected InvalidCredential, got {replay:?}"
    );
}

#[tokio::test]
async fn should_reject_wrong_code_without_consuming_the_right_one() {
    let desk = LoginDesk::new();
    let code = desk.request(PHONE, "customer").await.unwrap();

    let wrong = desk.complete(PHONE, &wrong_code(&code), None).await;

    assert!(matches!(wrong, Err(ParkingServiceError::InvalidCredential)));
    assert!(desk.complete(PHONE, &code, None).await.is_ok());
}

#[tokio::test]
async fn should_reject_and_remove_expired_code() {
    let desk = LoginDesk::new();
    let code = desk.request(PHONE, "customer").await.unwrap();
    desk.clock.advance(Duration::seconds(LOGIN_OTP_TTL_SECS + 1));

    let expired = desk.complete(PHONE, &code, None).await;

    assert!(
        matches!(expired, Err(ParkingServiceError::CredentialExpired)),
        "expected CredentialExpired, got {expired:?}"
    );
    assert_eq!(desk.store.challenge_count(PHONE), 0);
    assert!(desk.store.users.lock().unwrap().is_empty());
}

#[tokio::test]
async fn should_accept_code_at_the_expiry_instant() {
    let desk = LoginDesk::new();
    let code = desk.request(PHONE, "customer").await.unwrap();
    desk.clock.advance(Duration::seconds(LOGIN_OTP_TTL_SECS));

    assert!(desk.complete(PHONE, &code, None).await.is_ok());
}

#[tokio::test]
async fn should_return_existing_user_unchanged_on_later_login() {
    let desk = LoginDesk::new();
    let code = desk.request(PHONE, "valet").await.unwrap();
    let first = desk.complete(PHONE, &code, Some("Vik")).await.unwrap();

    let code = desk.request(PHONE, "valet").await.unwrap();
    let second = desk.complete(PHONE, &code, Some("Someone Else")).await.unwrap();

    assert_eq!(second.user, first.user);
    assert_eq!(second.user.venue_name.as_deref(), Some("Grand Hotel"));
    assert_eq!(desk.store.users.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn should_keep_separate_identities_per_role_for_one_phone() {
    let desk = LoginDesk::new();
    let code = desk.request(PHONE, "customer").await.unwrap();
    let customer = desk.complete(PHONE, &code, None).await.unwrap().user;
    let code = desk.request(PHONE, "valet").await.unwrap();
    let valet = desk.complete(PHONE, &code, None).await.unwrap().user;

    assert_ne!(customer.id, valet.id);
    assert_eq!(customer.role, UserRole::Customer);
    assert_eq!(valet.role, UserRole::Valet);
}

// ── UpdateProfile ────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_update_name_and_keep_venue_when_absent() {
    let store = MemoryStore::new();
    let valet = test_user(UserRole::Valet, PHONE);
    store.users.lock().unwrap().push(valet.clone());
    let usecase = UpdateProfileUseCase {
        users: store.clone(),
    };
    let actor = Actor {
        user_id: valet.id,
        role: valet.role,
    };

    let updated = usecase
        .execute(
            actor,
            UpdateProfileInput {
                name: "Vikram".to_owned(),
                venue_name: Some("   ".to_owned()),
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.name, "Vikram");
    assert_eq!(updated.venue_name, valet.venue_name);
}

#[tokio::test]
async fn should_reject_blank_profile_name() {
    let store = MemoryStore::new();
    let usecase = UpdateProfileUseCase { users: store };
    let actor = Actor {
        user_id: uuid::Uuid::new_v4(),
        role: UserRole::Customer,
    };

    let result = usecase
        .execute(
            actor,
            UpdateProfileInput {
                name: " ".to_owned(),
                venue_name: None,
            },
        )
        .await;

    assert!(matches!(
        result,
        Err(ParkingServiceError::InvalidArgument("name"))
    ));
}

#[tokio::test]
async fn should_report_missing_user_on_profile_update() {
    let usecase = UpdateProfileUseCase {
        users: MemoryStore::new(),
    };
    let actor = Actor {
        user_id: uuid::Uuid::new_v4(),
        role: UserRole::Customer,
    };

    let result = usecase
        .execute(
            actor,
            UpdateProfileInput {
                name: "Asha".to_owned(),
                venue_name: None,
            },
        )
        .await;

    assert!(matches!(result, Err(ParkingServiceError::UserNotFound)));
}
