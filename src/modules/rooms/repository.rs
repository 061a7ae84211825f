use std::str::FromStr;

use async_trait::async_trait;
use rust_decimal::Decimal;
use uuid::Uuid;

use super::models::{NewRoom, Room, RoomChanges};
use crate::store::{corrupt, to_i64, SqliteStore, StoreError};
use crate::utils;

/// Persistence for rooms.
///
/// Deleting a room also deletes its bookings.
#[async_trait]
pub trait RoomRepository: Send + Sync {
    async fn create(&self, room: NewRoom) -> Result<Room, StoreError>;

    async fn get(&self, room_id: Uuid) -> Result<Room, StoreError>;

    async fn exists(&self, room_id: Uuid) -> Result<bool, StoreError>;

    /// One window of rooms, oldest first.
    async fn list(&self, limit: u64, offset: u64) -> Result<Vec<Room>, StoreError>;

    async fn count(&self) -> Result<u64, StoreError>;

    async fn update(&self, room_id: Uuid, changes: RoomChanges) -> Result<Room, StoreError>;

    async fn delete(&self, room_id: Uuid) -> Result<(), StoreError>;
}

const ROOM_COLUMNS: &str = "room_id, description, price, active, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct RoomRow {
    room_id: String,
    description: String,
    price: String,
    active: bool,
    created_at: i64,
    updated_at: i64,
}

impl TryFrom<RoomRow> for Room {
    type Error = StoreError;

    fn try_from(row: RoomRow) -> Result<Self, Self::Error> {
        Ok(Room {
            room_id: Uuid::parse_str(&row.room_id).map_err(|e| corrupt("room.room_id", e))?,
            description: row.description,
            price: Decimal::from_str(&row.price).map_err(|e| corrupt("room.price", e))?,
            active: row.active,
            created_at: utils::from_micros(row.created_at)
                .ok_or_else(|| corrupt("room.created_at", row.created_at))?,
            updated_at: utils::from_micros(row.updated_at)
                .ok_or_else(|| corrupt("room.updated_at", row.updated_at))?,
        })
    }
}

#[async_trait]
impl RoomRepository for SqliteStore {
    async fn create(&self, room: NewRoom) -> Result<Room, StoreError> {
        let now = utils::now();
        let room = Room {
            room_id: utils::new_id(),
            description: room.description,
            price: room.price,
            active: room.active,
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            "INSERT INTO room (room_id, description, price, active, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )
        .bind(room.room_id.to_string())
        .bind(&room.description)
        .bind(room.price.to_string())
        .bind(room.active)
        .bind(utils::to_micros(room.created_at))
        .bind(utils::to_micros(room.updated_at))
        .execute(&self.pool)
        .await?;

        tracing::info!(room_id = %room.room_id, price = %room.price, active = room.active, "room created");
        Ok(room)
    }

    async fn get(&self, room_id: Uuid) -> Result<Room, StoreError> {
        let row: Option<RoomRow> =
            sqlx::query_as(&format!("SELECT {ROOM_COLUMNS} FROM room WHERE room_id = ?1"))
                .bind(room_id.to_string())
                .fetch_optional(&self.pool)
                .await?;

        row.ok_or(StoreError::NotFound)?.try_into()
    }

    async fn exists(&self, room_id: Uuid) -> Result<bool, StoreError> {
        self.room_exists(room_id).await
    }

    async fn list(&self, limit: u64, offset: u64) -> Result<Vec<Room>, StoreError> {
        let rows: Vec<RoomRow> = sqlx::query_as(&format!(
            "SELECT {ROOM_COLUMNS} FROM room ORDER BY created_at, room_id LIMIT ?1 OFFSET ?2"
        ))
        .bind(to_i64(limit))
        .bind(to_i64(offset))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Room::try_from).collect()
    }

    async fn count(&self) -> Result<u64, StoreError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM room")
            .fetch_one(&self.pool)
            .await?;
        Ok(count.max(0) as u64)
    }

    async fn update(&self, room_id: Uuid, changes: RoomChanges) -> Result<Room, StoreError> {
        let row: Option<RoomRow> = sqlx::query_as(&format!(
            "UPDATE room
             SET description = COALESCE(?1, description),
                 price       = COALESCE(?2, price),
                 active      = COALESCE(?3, active),
                 updated_at  = ?4
             WHERE room_id = ?5
             RETURNING {ROOM_COLUMNS}"
        ))
        .bind(changes.description)
        .bind(changes.price.map(|price| price.to_string()))
        .bind(changes.active)
        .bind(utils::to_micros(utils::now()))
        .bind(room_id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        let room: Room = row.ok_or(StoreError::NotFound)?.try_into()?;
        tracing::info!(room_id = %room.room_id, price = %room.price, active = room.active, "room updated");
        Ok(room)
    }

    async fn delete(&self, room_id: Uuid) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM room WHERE room_id = ?1")
            .bind(room_id.to_string())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }

        tracing::info!(room_id = %room_id, "room deleted");
        Ok(())
    }
}
