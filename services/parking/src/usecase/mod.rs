pub mod directory;
pub mod login;
pub mod otp;
pub mod session;
pub mod session_query;
pub mod vehicle;
