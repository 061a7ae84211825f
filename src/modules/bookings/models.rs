use std::fmt;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::conflict::{Interval, InvalidInterval};

/// A stay in one room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Booking {
    pub id: Uuid,
    pub room_id: Uuid,
    pub interval: Interval,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    pub fn check_in(&self) -> DateTime<Utc> {
        self.interval.start()
    }

    pub fn check_out(&self) -> DateTime<Utc> {
        self.interval.end()
    }
}

impl fmt::Display for Booking {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Booking on {} - Dates: {} - {}",
            self.room_id,
            self.check_in(),
            self.check_out()
        )
    }
}

/// The client-controlled part of a booking, already known to have a valid interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookingDraft {
    pub room_id: Uuid,
    pub interval: Interval,
}

impl BookingDraft {
    pub fn new(
        room_id: Uuid,
        check_in: DateTime<Utc>,
        check_out: DateTime<Utc>,
    ) -> Result<Self, InvalidInterval> {
        Ok(Self {
            room_id,
            interval: Interval::new(check_in, check_out)?,
        })
    }
}
