//! The double-booking rule.
//!
//! A booking occupies the half-open interval `[check_in, check_out)`. Two
//! bookings of the same room conflict when their intervals share any instant;
//! bookings that merely touch (one checks out exactly when the other checks
//! in) do not.

use chrono::{DateTime, Utc};
use innkeep_http::{validation::NON_FIELD_ERRORS, AppError};
use serde_json::json;
use thiserror::Error;

pub const INVALID_INTERVAL_CODE: &str = "invalid_interval";
pub const ROOM_UNAVAILABLE_CODE: &str = "room_unavailable";

const INVALID_INTERVAL_MESSAGE: &str = "Check-out date must be after check-in date.";
const ROOM_UNAVAILABLE_MESSAGE: &str = "The room is already booked for the selected dates.";

/// A non-empty half-open stay `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interval {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{}", INVALID_INTERVAL_MESSAGE)]
pub struct InvalidInterval;

impl Interval {
    /// Fails unless `start` is strictly before `end`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, InvalidInterval> {
        if start >= end {
            return Err(InvalidInterval);
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// `[a, b)` and `[c, d)` overlap iff `a < d && b > c`.
    pub fn overlaps(&self, other: &Interval) -> bool {
        self.start < other.end && self.end > other.start
    }
}

impl From<InvalidInterval> for AppError {
    fn from(err: InvalidInterval) -> Self {
        rule_error(INVALID_INTERVAL_CODE, err.to_string())
    }
}

/// Validation error for a write that would double-book a room.
pub fn room_unavailable() -> AppError {
    rule_error(ROOM_UNAVAILABLE_CODE, ROOM_UNAVAILABLE_MESSAGE.to_string())
}

fn rule_error(code: &str, message: String) -> AppError {
    AppError::validation_with_code(
        code,
        vec![json!({"field": NON_FIELD_ERRORS, "code": code, "message": message})],
        message,
    )
}
