pub mod clock;
pub mod db;
pub mod notifier;
pub mod signer;
