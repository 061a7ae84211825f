//! Small helpers shared by the domain modules.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use innkeep_http::AppError;

/// Timestamps are persisted as whole microseconds since the Unix epoch.
pub fn to_micros(at: DateTime<Utc>) -> i64 {
    at.timestamp_micros()
}

pub fn from_micros(micros: i64) -> Option<DateTime<Utc>> {
    let secs = micros.div_euclid(1_000_000);
    let nanos = (micros.rem_euclid(1_000_000) * 1_000) as u32;
    DateTime::<Utc>::from_timestamp(secs, nanos)
}

/// Drop sub-microsecond precision so a value survives a storage round trip unchanged.
pub fn truncate_to_micros(at: DateTime<Utc>) -> DateTime<Utc> {
    from_micros(to_micros(at)).unwrap_or(at)
}

/// Current time at storage precision.
pub fn now() -> DateTime<Utc> {
    truncate_to_micros(Utc::now())
}

/// Fresh time-ordered record identifier.
pub fn new_id() -> Uuid {
    Uuid::now_v7()
}

/// Parse an identifier taken from the request path. Anything that is not a
/// UUID cannot name a record, so it is reported as not found.
pub fn parse_path_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::not_found("Not found."))
}
