//! Response shapes for room endpoints.
//!
//! Create, update, and retrieve deliberately answer with different field
//! sets, so each has its own type.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::models::Room;
use crate::modules::bookings::{models::Booking, views::BookingView};

/// Answer to a successful create: the new identifier only.
#[derive(Debug, Clone, Serialize)]
pub struct RoomCreated {
    pub room_id: Uuid,
}

/// Full room record, used by list and update.
#[derive(Debug, Clone, Serialize)]
pub struct RoomView {
    pub room_id: Uuid,
    pub description: String,
    pub price: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Room> for RoomView {
    fn from(room: &Room) -> Self {
        Self {
            room_id: room.room_id,
            description: room.description.clone(),
            price: room.price.to_string(),
            active: room.active,
            created_at: room.created_at,
            updated_at: room.updated_at,
        }
    }
}

/// Room record with its bookings, oldest first.
#[derive(Debug, Clone, Serialize)]
pub struct RoomDetailView {
    pub room_id: Uuid,
    pub description: String,
    pub price: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub bookings: Vec<BookingView>,
}

impl RoomDetailView {
    pub fn new(room: &Room, bookings: &[Booking]) -> Self {
        Self {
            room_id: room.room_id,
            description: room.description.clone(),
            price: room.price.to_string(),
            active: room.active,
            created_at: room.created_at,
            updated_at: room.updated_at,
            bookings: bookings.iter().map(BookingView::from).collect(),
        }
    }
}
