use std::time::Duration;

use axum::{
    Router,
    routing::{get, post, put},
};

use valet_core::error::route_not_found;
use valet_core::health::healthz;
use valet_core::middleware::apply_http_layers;

use crate::handlers::{
    auth::{send_otp, update_profile, verify_otp},
    health::readyz,
    session::{
        accept_parking, cancel_pickup, cancel_session, create_session, get_active_session,
        get_session, list_active_sessions, list_history, list_pending_pickups, reject_parking,
        request_pickup, update_status, verify_delivery,
    },
    vehicle::{add_vehicle, list_vehicles, search_vehicle},
};
use crate::state::AppState;

pub fn build_router(state: AppState, request_timeout: Duration) -> Router {
    let api = Router::new()
        // Auth
        .route("/auth/send-otp", post(send_otp))
        .route("/auth/verify-otp", post(verify_otp))
        .route("/auth/profile", put(update_profile))
        // Vehicles
        .route("/vehicles", post(add_vehicle).get(list_vehicles))
        .route("/vehicles/search", get(search_vehicle))
        // Session reads
        .route("/sessions", post(create_session))
        .route("/sessions/active", get(get_active_session))
        .route("/sessions/pending-pickups", get(list_pending_pickups))
        .route("/sessions/active-all", get(list_active_sessions))
        .route("/sessions/history", get(list_history))
        .route("/sessions/{id}", get(get_session))
        // Session transitions
        .route("/sessions/{id}/accept", post(accept_parking))
        .route("/sessions/{id}/reject", post(reject_parking))
        .route("/sessions/{id}/cancel", post(cancel_session))
        .route("/sessions/{id}/request-pickup", post(request_pickup))
        .route("/sessions/{id}/cancel-pickup", post(cancel_pickup))
        .route("/sessions/{id}/verify-delivery", post(verify_delivery))
        .route("/sessions/{id}/status", put(update_status));

    let router = Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .nest("/api", api)
        .fallback(route_not_found)
        .with_state(state);

    apply_http_layers(router, request_timeout)
}
