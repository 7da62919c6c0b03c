use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use valet_auth_types::identity::Identity;

use crate::error::ParkingServiceError;
use crate::handlers::ApiJson;
use crate::handlers::views::{UserView, VehicleView};
use crate::infra::clock::SystemClock;
use crate::state::AppState;
use crate::usecase::vehicle::{
    AddVehicleInput, AddVehicleUseCase, ListVehiclesUseCase, SearchVehicleUseCase,
};

// ── POST /api/vehicles ───────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct AddVehicleRequest {
    pub registration_number: String,
    pub make: String,
    pub model: String,
    pub color: String,
    pub vehicle_type: String,
    #[serde(default)]
    pub photos: Vec<String>,
}

pub async fn add_vehicle(
    identity: Identity,
    State(state): State<AppState>,
    ApiJson(body): ApiJson<AddVehicleRequest>,
) -> Result<(StatusCode, Json<VehicleView>), ParkingServiceError> {
    let usecase = AddVehicleUseCase {
        vehicles: state.vehicle_repo(),
        clock: SystemClock,
    };
    let vehicle = usecase
        .execute(
            identity.into(),
            AddVehicleInput {
                registration_number: body.registration_number,
                make: body.make,
                model: body.model,
                color: body.color,
                vehicle_type: body.vehicle_type,
                photos: body.photos,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(vehicle.into())))
}

// ── GET /api/vehicles ────────────────────────────────────────────────────────

pub async fn list_vehicles(
    identity: Identity,
    State(state): State<AppState>,
) -> Result<Json<Vec<VehicleView>>, ParkingServiceError> {
    let usecase = ListVehiclesUseCase {
        vehicles: state.vehicle_repo(),
    };
    let vehicles = usecase.execute(identity.into()).await?;
    Ok(Json(vehicles.into_iter().map(VehicleView::from).collect()))
}

// ── GET /api/vehicles/search ─────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct SearchVehicleQuery {
    #[serde(default)]
    pub registration_number: String,
}

#[derive(Serialize)]
pub struct SearchVehicleResponse {
    pub vehicle: VehicleView,
    pub owner: UserView,
}

pub async fn search_vehicle(
    identity: Identity,
    State(state): State<AppState>,
    Query(query): Query<SearchVehicleQuery>,
) -> Result<Json<SearchVehicleResponse>, ParkingServiceError> {
    let usecase = SearchVehicleUseCase {
        vehicles: state.vehicle_repo(),
        users: state.user_repo(),
    };
    let found = usecase
        .execute(identity.into(), &query.registration_number)
        .await?;
    Ok(Json(SearchVehicleResponse {
        vehicle: found.vehicle.into(),
        owner: found.owner.map(UserView::from).unwrap_or_default(),
    }))
}
