use chrono::Duration;
use uuid::Uuid;
use valet_domain::session::SessionStatus;
use valet_domain::user::UserRole;
use valet_parking::domain::types::HISTORY_LIMIT;
use valet_parking::error::ParkingServiceError;
use valet_parking::usecase::session::SessionCommand;
use valet_parking::usecase::session_query::{
    GetActiveSessionUseCase, GetSessionUseCase, ListSessionsUseCase, SessionEnricher,
    SessionListing,
};

use crate::helpers::{Desk, FailingUsers, MemoryStore, actor, session_in, test_user, test_vehicle};

fn lister(desk: &Desk) -> ListSessionsUseCase<MemoryStore, MemoryStore, MemoryStore> {
    ListSessionsUseCase {
        sessions: desk.store.clone(),
        enricher: desk.enricher(),
    }
}

// ── GetSession ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_return_session_with_vehicle_and_parties() {
    let desk = Desk::new();
    let session = desk.create(desk.vehicle.id).await.unwrap();
    let usecase = GetSessionUseCase {
        sessions: desk.store.clone(),
        enricher: desk.enricher(),
    };

    let details = usecase.execute(desk.customer(), session.id).await.unwrap();

    assert_eq!(details.session, session);
    assert_eq!(details.vehicle, Some(desk.vehicle.clone()));
    assert_eq!(details.customer, Some(desk.customer.clone()));
    assert_eq!(details.valet, Some(desk.valet.clone()));
}

#[tokio::test]
async fn should_let_valet_read_any_session_but_not_other_customers() {
    let desk = Desk::new();
    let session = desk.create(desk.vehicle.id).await.unwrap();
    let usecase = GetSessionUseCase {
        sessions: desk.store.clone(),
        enricher: desk.enricher(),
    };
    let other_valet = actor(&test_user(UserRole::Valet, "+15550444"));
    let stranger = actor(&test_user(UserRole::Customer, "+15550555"));

    assert!(usecase.execute(other_valet, session.id).await.is_ok());
    let result = usecase.execute(stranger, session.id).await;
    assert!(
        matches!(result, Err(ParkingServiceError::Forbidden)),
        "expected Forbidden, got {result:?}"
    );
}

#[tokio::test]
async fn should_report_unknown_session_on_read() {
    let desk = Desk::new();
    let usecase = GetSessionUseCase {
        sessions: desk.store.clone(),
        enricher: desk.enricher(),
    };

    let result = usecase.execute(desk.valet(), Uuid::new_v4()).await;

    assert!(matches!(result, Err(ParkingServiceError::SessionNotFound)));
}

// ── Enrichment ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_tolerate_missing_vehicle_record() {
    let desk = Desk::new();
    let ghost = test_vehicle(desk.customer.id, "GHOST01");
    let session = session_in(SessionStatus::Parked, &ghost, &desk.valet, desk.clock_now());
    desk.store.put_session(session.clone());
    let usecase = GetSessionUseCase {
        sessions: desk.store.clone(),
        enricher: desk.enricher(),
    };

    let details = usecase.execute(desk.customer(), session.id).await.unwrap();

    assert!(details.vehicle.is_none());
    assert_eq!(details.customer, Some(desk.customer.clone()));
}

#[tokio::test]
async fn should_tolerate_failing_user_lookups() {
    let desk = Desk::new();
    let session = desk.create(desk.vehicle.id).await.unwrap();
    let usecase = GetSessionUseCase {
        sessions: desk.store.clone(),
        enricher: SessionEnricher {
            vehicles: desk.store.clone(),
            users: FailingUsers,
        },
    };

    let details = usecase.execute(desk.valet(), session.id).await.unwrap();

    assert_eq!(details.vehicle, Some(desk.vehicle.clone()));
    assert!(details.customer.is_none());
    assert!(details.valet.is_none());
}

// ── GetActiveSession ─────────────────────────────────────────────────────────

#[tokio::test]
async fn should_find_active_session_from_either_side() {
    let desk = Desk::new();
    let session = desk.parked_session().await;
    let usecase = GetActiveSessionUseCase {
        sessions: desk.store.clone(),
        enricher: desk.enricher(),
    };

    let for_customer = usecase.execute(desk.customer()).await.unwrap();
    let for_valet = usecase.execute(desk.valet()).await.unwrap();

    assert_eq!(for_customer.session.id, session.id);
    assert_eq!(for_valet.session.id, session.id);
}

#[tokio::test]
async fn should_report_no_active_session_once_delivered() {
    let desk = Desk::new();
    let session = desk.parked_session().await;
    let code = desk.request_pickup(desk.customer(), session.id).await.unwrap();
    desk.verify(desk.valet(), session.id, &code).await.unwrap();
    let usecase = GetActiveSessionUseCase {
        sessions: desk.store.clone(),
        enricher: desk.enricher(),
    };

    let result = usecase.execute(desk.customer()).await;

    assert!(matches!(result, Err(ParkingServiceError::SessionNotFound)));
}

#[tokio::test]
async fn should_pick_most_recently_parked_active_session() {
    let desk = Desk::new();
    let second = test_vehicle(desk.customer.id, "KA01AB5678");
    desk.store.vehicles.lock().unwrap().push(second.clone());
    desk.create(desk.vehicle.id).await.unwrap();
    desk.clock.advance(Duration::minutes(1));
    let newer = desk.create(second.id).await.unwrap();
    let usecase = GetActiveSessionUseCase {
        sessions: desk.store.clone(),
        enricher: desk.enricher(),
    };

    let details = usecase.execute(desk.customer()).await.unwrap();

    assert_eq!(details.session.id, newer.id);
}

// ── Listings ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_list_pending_pickups_oldest_request_first() {
    let desk = Desk::new();
    let base = desk.clock_now();
    let mut expected = Vec::new();
    for (offset, status) in [
        (3, SessionStatus::Available),
        (1, SessionStatus::Requested),
        (2, SessionStatus::Moving),
    ] {
        let mut session = session_in(status, &desk.vehicle, &desk.valet, base);
        session.requested_at = Some(base + Duration::minutes(offset));
        desk.store.put_session(session.clone());
        expected.push((offset, session.id));
    }
    for status in [SessionStatus::Parked, SessionStatus::Delivered] {
        desk.store
            .put_session(session_in(status, &desk.vehicle, &desk.valet, base));
    }
    expected.sort();

    let listed = lister(&desk)
        .execute(desk.valet(), SessionListing::PendingPickups)
        .await
        .unwrap();

    let ids: Vec<_> = listed.iter().map(|d| d.session.id).collect();
    let expected: Vec<_> = expected.into_iter().map(|(_, id)| id).collect();
    assert_eq!(ids, expected);
}

#[tokio::test]
async fn should_list_all_active_sessions_newest_first() {
    let desk = Desk::new();
    let base = desk.clock_now();
    let older = session_in(SessionStatus::Parked, &desk.vehicle, &desk.valet, base);
    let newer = session_in(
        SessionStatus::Pending,
        &desk.vehicle,
        &desk.valet,
        base + Duration::hours(1),
    );
    let done = session_in(
        SessionStatus::Cancelled,
        &desk.vehicle,
        &desk.valet,
        base + Duration::hours(2),
    );
    for s in [&older, &newer, &done] {
        desk.store.put_session(s.clone());
    }

    let listed = lister(&desk)
        .execute(desk.valet(), SessionListing::AllActive)
        .await
        .unwrap();

    let ids: Vec<_> = listed.iter().map(|d| d.session.id).collect();
    assert_eq!(ids, vec![newer.id, older.id]);
}

#[tokio::test]
async fn should_forbid_customers_from_valet_listings() {
    let desk = Desk::new();

    for listing in [SessionListing::PendingPickups, SessionListing::AllActive] {
        let result = lister(&desk).execute(desk.customer(), listing).await;
        assert!(
            matches!(result, Err(ParkingServiceError::Forbidden)),
            "{listing:?}: got {result:?}"
        );
    }
}

#[tokio::test]
async fn should_cap_history_and_order_newest_first() {
    let desk = Desk::new();
    let base = desk.clock_now();
    for i in 0..(HISTORY_LIMIT as i64 + 5) {
        let status = if i % 2 == 0 {
            SessionStatus::Delivered
        } else {
            SessionStatus::Cancelled
        };
        desk.store.put_session(session_in(
            status,
            &desk.vehicle,
            &desk.valet,
            base - Duration::hours(i),
        ));
    }
    desk.store.put_session(session_in(
        SessionStatus::Parked,
        &desk.vehicle,
        &desk.valet,
        base + Duration::hours(1),
    ));

    let listed = lister(&desk)
        .execute(desk.customer(), SessionListing::History)
        .await
        .unwrap();

    assert_eq!(listed.len(), HISTORY_LIMIT as usize);
    assert!(listed.iter().all(|d| d.session.status.is_terminal()));
    assert_eq!(listed[0].session.parked_at, base);
    assert!(
        listed
            .windows(2)
            .all(|w| w[0].session.parked_at >= w[1].session.parked_at)
    );
}

#[tokio::test]
async fn should_scope_history_to_the_caller() {
    let desk = Desk::new();
    let stranger = test_user(UserRole::Customer, "+15550666");
    let their_car = test_vehicle(stranger.id, "MH02CD4321");
    desk.store.put_session(session_in(
        SessionStatus::Delivered,
        &their_car,
        &desk.valet,
        desk.clock_now(),
    ));
    let mine = session_in(
        SessionStatus::Delivered,
        &desk.vehicle,
        &desk.valet,
        desk.clock_now(),
    );
    desk.store.put_session(mine.clone());

    let customer_history = lister(&desk)
        .execute(desk.customer(), SessionListing::History)
        .await
        .unwrap();
    let valet_history = lister(&desk)
        .execute(desk.valet(), SessionListing::History)
        .await
        .unwrap();

    assert_eq!(customer_history.len(), 1);
    assert_eq!(customer_history[0].session.id, mine.id);
    assert_eq!(valet_history.len(), 2);
}

#[tokio::test]
async fn should_move_session_from_active_to_history_when_cancelled() {
    let desk = Desk::new();
    let session = desk.create(desk.vehicle.id).await.unwrap();
    desk.run(desk.customer(), session.id, SessionCommand::Cancel)
        .await
        .unwrap();

    let active = lister(&desk)
        .execute(desk.valet(), SessionListing::AllActive)
        .await
        .unwrap();
    let history = lister(&desk)
        .execute(desk.customer(), SessionListing::History)
        .await
        .unwrap();

    assert!(active.is_empty());
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].session.status, SessionStatus::Cancelled);
}
