//! JSON response bodies.
//!
//! Enrichment misses render as empty objects of the same shape, so clients
//! never branch on `null` sub-records.

use chrono::{DateTime, Utc};
use serde::Serialize;
use valet_core::serde::{opt_to_rfc3339_ms, to_rfc3339_ms};

use crate::domain::types::{Actor, ParkingSession, SessionDetails, User, Vehicle};

#[derive(Debug, Default, Serialize)]
pub struct UserView {
    pub id: String,
    pub phone: String,
    pub name: String,
    pub role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub venue_name: Option<String>,
    #[serde(serialize_with = "opt_to_rfc3339_ms")]
    pub created_at: Option<DateTime<Utc>>,
}

impl From<User> for UserView {
    fn from(user: User) -> Self {
        Self {
            id: user.id.to_string(),
            phone: user.phone,
            name: user.name,
            role: user.role.to_string(),
            venue_name: user.venue_name,
            created_at: Some(user.created_at),
        }
    }
}

#[derive(Debug, Default, Serialize)]
pub struct VehicleView {
    pub id: String,
    pub owner_id: String,
    pub registration_number: String,
    pub make: String,
    pub model: String,
    pub color: String,
    pub vehicle_type: String,
    pub photos: Vec<String>,
    #[serde(serialize_with = "opt_to_rfc3339_ms")]
    pub created_at: Option<DateTime<Utc>>,
}

impl From<Vehicle> for VehicleView {
    fn from(vehicle: Vehicle) -> Self {
        Self {
            id: vehicle.id.to_string(),
            owner_id: vehicle.owner_id.to_string(),
            registration_number: vehicle.registration_number,
            make: vehicle.make,
            model: vehicle.model,
            color: vehicle.color,
            vehicle_type: vehicle.vehicle_type.to_string(),
            photos: vehicle.photos,
            created_at: Some(vehicle.created_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SessionView {
    pub id: String,
    pub ticket_number: String,
    pub vehicle_id: String,
    pub customer_id: String,
    pub valet_id: String,
    pub venue_name: String,
    pub status: String,
    #[serde(serialize_with = "to_rfc3339_ms")]
    pub parked_at: DateTime<Utc>,
    #[serde(serialize_with = "opt_to_rfc3339_ms")]
    pub requested_at: Option<DateTime<Utc>>,
    #[serde(serialize_with = "opt_to_rfc3339_ms")]
    pub delivered_at: Option<DateTime<Utc>>,
    pub parking_spot: Option<String>,
    /// Present only for the session's customer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pickup_otp: Option<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "opt_to_rfc3339_ms"
    )]
    pub otp_expires_at: Option<DateTime<Utc>>,
}

impl SessionView {
    /// Render `session` for `viewer`. The pickup code is shown to its customer
    /// only; the valet must get it from them.
    pub fn for_viewer(session: ParkingSession, viewer: Actor) -> Self {
        let (pickup_otp, otp_expires_at) = match session.pickup_otp {
            Some(otp) if viewer.user_id == session.customer_id => {
                (Some(otp.code), Some(otp.expires_at))
            }
            _ => (None, None),
        };
        Self {
            id: session.id.to_string(),
            ticket_number: session.ticket_number,
            vehicle_id: session.vehicle_id.to_string(),
            customer_id: session.customer_id.to_string(),
            valet_id: session.valet_id.to_string(),
            venue_name: session.venue_name,
            status: session.status.to_string(),
            parked_at: session.parked_at,
            requested_at: session.requested_at,
            delivered_at: session.delivered_at,
            parking_spot: session.parking_spot,
            pickup_otp,
            otp_expires_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SessionDetailsView {
    pub session: SessionView,
    pub vehicle: VehicleView,
    pub customer: UserView,
    pub valet: UserView,
}

impl SessionDetailsView {
    pub fn for_viewer(details: SessionDetails, viewer: Actor) -> Self {
        Self {
            session: SessionView::for_viewer(details.session, viewer),
            vehicle: details.vehicle.map(VehicleView::from).unwrap_or_default(),
            customer: details.customer.map(UserView::from).unwrap_or_default(),
            valet: details.valet.map(UserView::from).unwrap_or_default(),
        }
    }
}
