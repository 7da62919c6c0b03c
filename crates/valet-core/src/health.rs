use axum::http::StatusCode;

/// Handler for `GET /healthz`: liveness check.
///
/// Readiness depends on each service's backing store, so `/readyz` lives in
/// the service crate.
pub async fn healthz() -> StatusCode {
    StatusCode::OK
}
