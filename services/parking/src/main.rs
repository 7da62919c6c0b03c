use std::sync::Arc;
use std::time::Duration;

use sea_orm::Database;
use tracing::info;

use valet_core::config::Config;
use valet_core::tracing::init_tracing;
use valet_parking::config::ParkingConfig;
use valet_parking::infra::notifier::AppNotifier;
use valet_parking::router::build_router;
use valet_parking::state::AppState;

#[tokio::main]
async fn main() {
    init_tracing();

    let config = ParkingConfig::from_env();

    let db = Database::connect(&config.database_url)
        .await
        .expect("failed to connect to database");

    if !config.return_otp_in_response {
        info!("one-time codes are delivered out of band only");
    }

    let state = AppState {
        db,
        jwt_secret: Arc::from(config.jwt_secret.as_str()),
        notifier: AppNotifier::from_webhook_url(config.sms_webhook_url.clone()),
        return_otp_in_response: config.return_otp_in_response,
    };

    let router = build_router(state, Duration::from_secs(config.request_timeout_secs));
    let addr = format!("0.0.0.0:{}", config.parking_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind");

    info!("parking service listening on {addr}");
    axum::serve(listener, router).await.expect("server error");
}
