//! Field-level parsing of booking request bodies.

use chrono::{DateTime, FixedOffset, Utc};
use innkeep_http::validation::FieldErrors;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::utils;

/// Booking fields as supplied by the client. A field is `None` when it was
/// absent or failed to parse; failures are recorded in the `FieldErrors`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookingFields {
    pub room: Option<Uuid>,
    pub check_in: Option<DateTime<Utc>>,
    pub check_out: Option<DateTime<Utc>>,
}

impl BookingFields {
    pub fn parse(body: &Map<String, Value>, required: bool, errors: &mut FieldErrors) -> Self {
        Self {
            room: room(errors, body, required),
            check_in: timestamp(errors, body, "check_in", required),
            check_out: timestamp(errors, body, "check_out", required),
        }
    }
}

fn room(errors: &mut FieldErrors, body: &Map<String, Value>, required: bool) -> Option<Uuid> {
    let raw = errors.lookup(body, "room", required)?;
    match raw.as_str().map(Uuid::parse_str) {
        Some(Ok(room_id)) => Some(room_id),
        _ => {
            errors.push("room", "invalid", "Must be a valid UUID.");
            None
        }
    }
}

fn timestamp(
    errors: &mut FieldErrors,
    body: &Map<String, Value>,
    field: &str,
    required: bool,
) -> Option<DateTime<Utc>> {
    let raw = errors.lookup(body, field, required)?;
    match raw.as_str().map(DateTime::<FixedOffset>::parse_from_rfc3339) {
        Some(Ok(at)) => Some(utils::truncate_to_micros(at.with_timezone(&Utc))),
        _ => {
            errors.push(
                field,
                "invalid",
                "Datetime has wrong format. Use RFC 3339, e.g. 2030-01-01T10:00:00Z.",
            );
            None
        }
    }
}
