use serde::Deserialize;
use valet_core::config::Config;

/// Parking service configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct ParkingConfig {
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// HMAC secret for signing identity assertions.
    pub jwt_secret: String,
    /// TCP port to listen on. Env var: `PARKING_PORT`.
    #[serde(default = "default_port")]
    pub parking_port: u16,
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub request_timeout_secs: u64,
    /// Endpoint that receives `{phone, code, purpose}` for SMS delivery.
    /// Codes are only logged when unset.
    #[serde(default)]
    pub sms_webhook_url: Option<String>,
    /// Echo OTP codes in API responses. Turn off once a real SMS channel exists.
    #[serde(default = "default_true")]
    pub return_otp_in_response: bool,
}

impl Config for ParkingConfig {}

fn default_port() -> u16 {
    8080
}

fn default_timeout() -> u64 {
    5
}

fn default_true() -> bool {
    true
}
