use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Errors raised by shared plumbing before a request reaches a service handler.
///
/// Body shape matches every service error: `{"kind": "...", "message": "..."}`.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("missing or invalid bearer token")]
    Unauthorized,
    #[error("route not found")]
    NotFound,
}

impl AppError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Unauthorized => "UNAUTHORIZED",
            Self::NotFound => "NOT_FOUND",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::NotFound => StatusCode::NOT_FOUND,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({
            "kind": self.kind(),
            "message": self.to_string(),
        });
        (self.status(), axum::Json(body)).into_response()
    }
}

/// Router fallback so unknown paths get the JSON envelope instead of an empty 404.
pub async fn route_not_found() -> AppError {
    AppError::NotFound
}
