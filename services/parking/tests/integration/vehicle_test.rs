use valet_domain::user::UserRole;
use valet_domain::vehicle::VehicleType;
use valet_parking::domain::repository::Clock;
use valet_parking::error::ParkingServiceError;
use valet_parking::usecase::vehicle::{
    AddVehicleInput, AddVehicleUseCase, ListVehiclesUseCase, SearchVehicleUseCase,
};

use crate::helpers::{FailingUsers, FixedClock, MemoryStore, actor, test_user};

fn swift(registration_number: &str) -> AddVehicleInput {
    AddVehicleInput {
        registration_number: registration_number.to_owned(),
        make: "Maruti".to_owned(),
        model: "Swift".to_owned(),
        color: "Red".to_owned(),
        vehicle_type: "car".to_owned(),
        photos: vec!["https://img.example/1.jpg".to_owned(), " ".to_owned()],
    }
}

// ── AddVehicle ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_register_vehicle_for_customer() {
    let store = MemoryStore::new();
    let clock = FixedClock::new();
    let customer = test_user(UserRole::Customer, "+15550100");
    let usecase = AddVehicleUseCase {
        vehicles: store.clone(),
        clock: clock.clone(),
    };

    let vehicle = usecase
        .execute(actor(&customer), swift(" KA01AB1234 "))
        .await
        .unwrap();

    assert_eq!(vehicle.owner_id, customer.id);
    assert_eq!(vehicle.registration_number, "KA01AB1234");
    assert_eq!(vehicle.vehicle_type, VehicleType::Car);
    assert_eq!(vehicle.photos, vec!["https://img.example/1.jpg".to_owned()]);
    assert_eq!(vehicle.created_at, clock.now());
    assert_eq!(store.vehicles.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn should_reject_duplicate_registration_for_same_owner() {
    let store = MemoryStore::new();
    let customer = test_user(UserRole::Customer, "+15550100");
    let usecase = AddVehicleUseCase {
        vehicles: store.clone(),
        clock: FixedClock::new(),
    };
    usecase
        .execute(actor(&customer), swift("KA01AB1234"))
        .await
        .unwrap();

    let result = usecase.execute(actor(&customer), swift("KA01AB1234")).await;

    assert!(
        matches!(result, Err(ParkingServiceError::VehicleAlreadyRegistered)),
        "expected VehicleAlreadyRegistered, got {result:?}"
    );
}

#[tokio::test]
async fn should_reject_unknown_vehicle_type() {
    let usecase = AddVehicleUseCase {
        vehicles: MemoryStore::new(),
        clock: FixedClock::new(),
    };
    let customer = test_user(UserRole::Customer, "+15550100");
    let input = AddVehicleInput {
        vehicle_type: "truck".to_owned(),
        ..swift("KA01AB1234")
    };

    let result = usecase.execute(actor(&customer), input).await;

    assert!(matches!(
        result,
        Err(ParkingServiceError::InvalidArgument("vehicle_type"))
    ));
}

#[tokio::test]
async fn should_reject_blank_required_fields() {
    let usecase = AddVehicleUseCase {
        vehicles: MemoryStore::new(),
        clock: FixedClock::new(),
    };
    let customer = test_user(UserRole::Customer, "+15550100");
    let input = AddVehicleInput {
        make: "  ".to_owned(),
        ..swift("KA01AB1234")
    };

    let result = usecase.execute(actor(&customer), input).await;

    assert!(matches!(
        result,
        Err(ParkingServiceError::InvalidArgument("make"))
    ));
}

#[tokio::test]
async fn should_forbid_valets_from_registering_vehicles() {
    let usecase = AddVehicleUseCase {
        vehicles: MemoryStore::new(),
        clock: FixedClock::new(),
    };
    let valet = test_user(UserRole::Valet, "+15550200");

    let result = usecase.execute(actor(&valet), swift("KA01AB1234")).await;

    assert!(matches!(result, Err(ParkingServiceError::Forbidden)));
}

// ── ListVehicles ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_list_only_the_callers_vehicles() {
    let store = MemoryStore::new();
    let asha = test_user(UserRole::Customer, "+15550100");
    let ravi = test_user(UserRole::Customer, "+15550101");
    let add = AddVehicleUseCase {
        vehicles: store.clone(),
        clock: FixedClock::new(),
    };
    add.execute(actor(&asha), swift("KA01AB1234")).await.unwrap();
    add.execute(actor(&asha), swift("KA01AB5678")).await.unwrap();
    add.execute(actor(&ravi), swift("MH02CD4321")).await.unwrap();

    let listed = ListVehiclesUseCase { vehicles: store }
        .execute(actor(&asha))
        .await
        .unwrap();

    assert_eq!(listed.len(), 2);
    assert!(listed.iter().all(|v| v.owner_id == asha.id));
}

// ── SearchVehicle ────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_find_vehicle_and_owner_by_registration() {
    let store = MemoryStore::new();
    let customer = test_user(UserRole::Customer, "+15550100");
    let valet = test_user(UserRole::Valet, "+15550200");
    store.users.lock().unwrap().push(customer.clone());
    let vehicle = AddVehicleUseCase {
        vehicles: store.clone(),
        clock: FixedClock::new(),
    }
    .execute(actor(&customer), swift("KA01AB1234"))
    .await
    .unwrap();

    let found = SearchVehicleUseCase {
        vehicles: store.clone(),
        users: store,
    }
    .execute(actor(&valet), "KA01AB1234")
    .await
    .unwrap();

    assert_eq!(found.vehicle, vehicle);
    assert_eq!(found.owner, Some(customer));
}

#[tokio::test]
async fn should_return_vehicle_without_owner_when_lookup_fails() {
    let store = MemoryStore::new();
    let customer = test_user(UserRole::Customer, "+15550100");
    let valet = test_user(UserRole::Valet, "+15550200");
    AddVehicleUseCase {
        vehicles: store.clone(),
        clock: FixedClock::new(),
    }
    .execute(actor(&customer), swift("KA01AB1234"))
    .await
    .unwrap();

    let found = SearchVehicleUseCase {
        vehicles: store,
        users: FailingUsers,
    }
    .execute(actor(&valet), "KA01AB1234")
    .await
    .unwrap();

    assert!(found.owner.is_none());
}

#[tokio::test]
async fn should_report_unknown_registration() {
    let valet = test_user(UserRole::Valet, "+15550200");

    let result = SearchVehicleUseCase {
        vehicles: MemoryStore::new(),
        users: MemoryStore::new(),
    }
    .execute(actor(&valet), "NOPE")
    .await;

    assert!(matches!(result, Err(ParkingServiceError::VehicleNotFound)));
}

#[tokio::test]
async fn should_restrict_search_to_valets() {
    let customer = test_user(UserRole::Customer, "+15550100");

    let result = SearchVehicleUseCase {
        vehicles: MemoryStore::new(),
        users: MemoryStore::new(),
    }
    .execute(actor(&customer), "KA01AB1234")
    .await;

    assert!(matches!(result, Err(ParkingServiceError::Forbidden)));
}
