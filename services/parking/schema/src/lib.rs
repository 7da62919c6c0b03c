//! sea-orm entities for the parking service tables.

pub mod otp_challenges;
pub mod parking_sessions;
pub mod users;
pub mod vehicles;
