use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::models::Booking;

/// Full booking record.
#[derive(Debug, Clone, Serialize)]
pub struct BookingView {
    pub id: Uuid,
    pub room: Uuid,
    pub check_in: DateTime<Utc>,
    pub check_out: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Booking> for BookingView {
    fn from(booking: &Booking) -> Self {
        Self {
            id: booking.id,
            room: booking.room_id,
            check_in: booking.check_in(),
            check_out: booking.check_out(),
            created_at: booking.created_at,
            updated_at: booking.updated_at,
        }
    }
}
