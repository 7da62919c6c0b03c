//! Parking-session lifecycle: statuses and the guarded transition table.
//!
//! ```text
//! pending → picked → parking_moving → parked → requested → moving ⇄ available → delivered
//!    │         │            │            │          │         │
//!    └─────────┴────────────┴────────────┴──► cancelled       │
//!                                        ▲          │         │
//!                                        └──────────┴─────────┘  (cancel pickup)
//! ```
//!
//! Every transition is applied by the store as a conditional update
//! (`id = ? AND status IN allowed_from()`), so the table below is the single source
//! of truth for which edges exist.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::UnknownVariant;
use crate::user::UserRole;

/// Current position of a parking session in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// Checked in by a valet, waiting for the customer to accept.
    Pending,
    /// Customer accepted; valet has the keys.
    Picked,
    /// Valet is driving the vehicle to a spot.
    ParkingMoving,
    Parked,
    /// Customer asked for the vehicle back; a pickup OTP is live.
    Requested,
    /// Valet is fetching the vehicle.
    Moving,
    /// Vehicle is at the desk.
    Available,
    /// Accepted as a delivery precondition only. No transition produces it.
    InTransit,
    Delivered,
    Cancelled,
}

/// Statuses from which no transition is permitted.
pub const TERMINAL_STATUSES: &[SessionStatus] = &[SessionStatus::Delivered, SessionStatus::Cancelled];

/// Statuses a valet works on after a pickup request.
pub const PICKUP_STATUSES: &[SessionStatus] = &[
    SessionStatus::Requested,
    SessionStatus::Moving,
    SessionStatus::Available,
];

impl SessionStatus {
    /// Status every new session starts in.
    pub const INITIAL: Self = Self::Pending;

    pub const ALL: [Self; 10] = [
        Self::Pending,
        Self::Picked,
        Self::ParkingMoving,
        Self::Parked,
        Self::Requested,
        Self::Moving,
        Self::Available,
        Self::InTransit,
        Self::Delivered,
        Self::Cancelled,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Picked => "picked",
            Self::ParkingMoving => "parking_moving",
            Self::Parked => "parked",
            Self::Requested => "requested",
            Self::Moving => "moving",
            Self::Available => "available",
            Self::InTransit => "in_transit",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(self) -> bool {
        TERMINAL_STATUSES.contains(&self)
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SessionStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownVariant {
                kind: "session status",
                value: s.to_owned(),
            })
    }
}

/// A guarded edge of the lifecycle.
///
/// Session creation is not listed: it has no source status and is guarded by
/// the per-vehicle liveness constraint instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transition {
    AcceptParking,
    /// Removes the session instead of moving it.
    RejectParking,
    AdvanceParkingMoving,
    MarkParked,
    CancelSession,
    RequestPickup,
    CancelPickup,
    AdvanceMoving,
    MarkAvailable,
    VerifyDelivery,
}

impl Transition {
    pub const ALL: [Self; 10] = [
        Self::AcceptParking,
        Self::RejectParking,
        Self::AdvanceParkingMoving,
        Self::MarkParked,
        Self::CancelSession,
        Self::RequestPickup,
        Self::CancelPickup,
        Self::AdvanceMoving,
        Self::MarkAvailable,
        Self::VerifyDelivery,
    ];

    /// Role allowed to trigger the transition.
    pub fn actor(self) -> UserRole {
        match self {
            Self::AcceptParking
            | Self::RejectParking
            | Self::CancelSession
            | Self::RequestPickup
            | Self::CancelPickup => UserRole::Customer,
            Self::AdvanceParkingMoving
            | Self::MarkParked
            | Self::AdvanceMoving
            | Self::MarkAvailable
            | Self::VerifyDelivery => UserRole::Valet,
        }
    }

    /// Customer-side transitions only match sessions owned by the caller.
    pub fn is_owner_scoped(self) -> bool {
        self.actor() == UserRole::Customer
    }

    /// Statuses the session must currently be in.
    pub fn allowed_from(self) -> &'static [SessionStatus] {
        use SessionStatus::*;
        match self {
            Self::AcceptParking | Self::RejectParking => &[Pending],
            Self::AdvanceParkingMoving => &[Picked, ParkingMoving],
            Self::MarkParked => &[Picked, ParkingMoving, Parked],
            Self::CancelSession => &[Pending, Picked, ParkingMoving, Parked],
            Self::RequestPickup => &[Parked],
            Self::CancelPickup => &[Requested, Moving],
            Self::AdvanceMoving | Self::MarkAvailable => PICKUP_STATUSES,
            Self::VerifyDelivery => &[Requested, Moving, Available, InTransit],
        }
    }

    /// Status after the transition, or `None` when the record is deleted.
    pub fn target(self) -> Option<SessionStatus> {
        use SessionStatus::*;
        match self {
            Self::AcceptParking => Some(Picked),
            Self::RejectParking => None,
            Self::AdvanceParkingMoving => Some(ParkingMoving),
            Self::MarkParked => Some(Parked),
            Self::CancelSession => Some(Cancelled),
            Self::RequestPickup => Some(Requested),
            Self::CancelPickup => Some(Parked),
            Self::AdvanceMoving => Some(Moving),
            Self::MarkAvailable => Some(Available),
            Self::VerifyDelivery => Some(Delivered),
        }
    }

    pub fn permits(self, current: SessionStatus) -> bool {
        self.allowed_from().contains(&current)
    }
}
