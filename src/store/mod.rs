//! SQLite-backed storage shared by the room and booking repositories.

use std::sync::Arc;

use innkeep_http::{validation::FieldError, AppError};
use innkeep_kernel::settings::PaginationSettings;
use sqlx::SqlitePool;
use thiserror::Error;
use uuid::Uuid;

use crate::modules::{
    bookings::{conflict, repository::BookingRepository},
    rooms::repository::RoomRepository,
};

/// Message raised by the booking overlap triggers.
pub(crate) const ROOM_UNAVAILABLE_SIGNAL: &str = "room_unavailable";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,

    #[error("room {0} does not exist")]
    RoomMissing(Uuid),

    #[error("room is already booked for an overlapping interval")]
    RoomUnavailable,

    #[error("stored row is malformed: {0}")]
    Corrupt(String),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

impl StoreError {
    /// Classify a failed booking write. The overlap triggers and the room
    /// foreign key surface as database errors; everything else passes through.
    pub(crate) fn from_booking_write(err: sqlx::Error, room_id: Uuid) -> Self {
        if let sqlx::Error::Database(db) = &err {
            if db.message().contains(ROOM_UNAVAILABLE_SIGNAL) {
                return StoreError::RoomUnavailable;
            }
            if db.is_foreign_key_violation() {
                return StoreError::RoomMissing(room_id);
            }
        }
        StoreError::Database(err)
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => AppError::not_found("Not found."),
            StoreError::RoomMissing(room_id) => {
                let error = FieldError::new(
                    "room",
                    "does_not_exist",
                    format!("Invalid pk \"{room_id}\" - object does not exist."),
                );
                innkeep_http::validation::FieldErrors::from(error).into()
            }
            StoreError::RoomUnavailable => conflict::room_unavailable(),
            other => AppError::Internal(anyhow::Error::new(other)),
        }
    }
}

/// Room and booking records in one SQLite database.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pub(crate) pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub(crate) async fn room_exists(&self, room_id: Uuid) -> Result<bool, StoreError> {
        let found: i64 = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM room WHERE room_id = ?1)")
            .bind(room_id.to_string())
            .fetch_one(&self.pool)
            .await?;
        Ok(found != 0)
    }
}

/// Handles passed to every request handler.
#[derive(Clone)]
pub struct AppState {
    pub rooms: Arc<dyn RoomRepository>,
    pub bookings: Arc<dyn BookingRepository>,
    pub pagination: PaginationSettings,
}

impl AppState {
    pub fn new(store: Arc<SqliteStore>, pagination: PaginationSettings) -> Self {
        Self {
            rooms: store.clone(),
            bookings: store,
            pagination,
        }
    }
}

pub(crate) fn corrupt(column: &str, err: impl std::fmt::Display) -> StoreError {
    StoreError::Corrupt(format!("{column}: {err}"))
}

pub(crate) fn to_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}
