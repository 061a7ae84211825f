use async_trait::async_trait;
use uuid::Uuid;

use super::conflict::Interval;
use super::models::{Booking, BookingDraft};
use crate::store::{corrupt, to_i64, SqliteStore, StoreError};
use crate::utils;

/// Persistence for bookings.
///
/// `create` and `update` refuse to write a booking whose room is missing or
/// whose interval overlaps another booking of the same room. The check and
/// the write cannot be split by a concurrent writer: the storage layer
/// re-checks overlap inside the writing statement.
#[async_trait]
pub trait BookingRepository: Send + Sync {
    async fn create(&self, draft: BookingDraft) -> Result<Booking, StoreError>;

    async fn get(&self, id: Uuid) -> Result<Booking, StoreError>;

    /// One window of bookings, oldest first.
    async fn list(&self, limit: u64, offset: u64) -> Result<Vec<Booking>, StoreError>;

    async fn count(&self) -> Result<u64, StoreError>;

    /// All bookings of one room, oldest first.
    async fn list_for_room(&self, room_id: Uuid) -> Result<Vec<Booking>, StoreError>;

    /// Replace the room and interval of an existing booking.
    async fn update(&self, id: Uuid, draft: BookingDraft) -> Result<Booking, StoreError>;

    async fn delete(&self, id: Uuid) -> Result<(), StoreError>;

    /// Whether any booking of `room_id` other than `exclude` overlaps `interval`.
    async fn has_conflict(
        &self,
        room_id: Uuid,
        interval: &Interval,
        exclude: Option<Uuid>,
    ) -> Result<bool, StoreError>;
}

const BOOKING_COLUMNS: &str = "id, room_id, check_in, check_out, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct BookingRow {
    id: String,
    room_id: String,
    check_in: i64,
    check_out: i64,
    created_at: i64,
    updated_at: i64,
}

impl TryFrom<BookingRow> for Booking {
    type Error = StoreError;

    fn try_from(row: BookingRow) -> Result<Self, Self::Error> {
        let timestamp = |column: &str, micros: i64| {
            utils::from_micros(micros).ok_or_else(|| corrupt(column, micros))
        };

        let interval = Interval::new(
            timestamp("booking.check_in", row.check_in)?,
            timestamp("booking.check_out", row.check_out)?,
        )
        .map_err(|e| corrupt("booking.check_out", e))?;

        Ok(Booking {
            id: Uuid::parse_str(&row.id).map_err(|e| corrupt("booking.id", e))?,
            room_id: Uuid::parse_str(&row.room_id).map_err(|e| corrupt("booking.room_id", e))?,
            interval,
            created_at: timestamp("booking.created_at", row.created_at)?,
            updated_at: timestamp("booking.updated_at", row.updated_at)?,
        })
    }
}

impl SqliteStore {
    /// Room must exist and be free before a write is attempted. These checks
    /// give precise errors; the overlap triggers remain the final word.
    async fn precheck_booking(
        &self,
        draft: &BookingDraft,
        exclude: Option<Uuid>,
    ) -> Result<(), StoreError> {
        if !self.room_exists(draft.room_id).await? {
            return Err(StoreError::RoomMissing(draft.room_id));
        }
        if self
            .has_conflict(draft.room_id, &draft.interval, exclude)
            .await?
        {
            tracing::debug!(
                room_id = %draft.room_id,
                check_in = %draft.interval.start(),
                check_out = %draft.interval.end(),
                "booking rejected: room unavailable"
            );
            return Err(StoreError::RoomUnavailable);
        }
        Ok(())
    }
}

#[async_trait]
impl BookingRepository for SqliteStore {
    async fn create(&self, draft: BookingDraft) -> Result<Booking, StoreError> {
        self.precheck_booking(&draft, None).await?;

        let now = utils::now();
        let booking = Booking {
            id: utils::new_id(),
            room_id: draft.room_id,
            interval: draft.interval,
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            "INSERT INTO booking (id, room_id, check_in, check_out, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )
        .bind(booking.id.to_string())
        .bind(booking.room_id.to_string())
        .bind(utils::to_micros(booking.check_in()))
        .bind(utils::to_micros(booking.check_out()))
        .bind(utils::to_micros(booking.created_at))
        .bind(utils::to_micros(booking.updated_at))
        .execute(&self.pool)
        .await
        .map_err(|err| StoreError::from_booking_write(err, draft.room_id))?;

        tracing::info!(
            booking_id = %booking.id,
            room_id = %booking.room_id,
            check_in = %booking.check_in(),
            check_out = %booking.check_out(),
            "booking created"
        );
        Ok(booking)
    }

    async fn get(&self, id: Uuid) -> Result<Booking, StoreError> {
        let row: Option<BookingRow> =
            sqlx::query_as(&format!("SELECT {BOOKING_COLUMNS} FROM booking WHERE id = ?1"))
                .bind(id.to_string())
                .fetch_optional(&self.pool)
                .await?;

        row.ok_or(StoreError::NotFound)?.try_into()
    }

    async fn list(&self, limit: u64, offset: u64) -> Result<Vec<Booking>, StoreError> {
        let rows: Vec<BookingRow> = sqlx::query_as(&format!(
            "SELECT {BOOKING_COLUMNS} FROM booking ORDER BY created_at, id LIMIT ?1 OFFSET ?2"
        ))
        .bind(to_i64(limit))
        .bind(to_i64(offset))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Booking::try_from).collect()
    }

    async fn count(&self) -> Result<u64, StoreError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM booking")
            .fetch_one(&self.pool)
            .await?;
        Ok(count.max(0) as u64)
    }

    async fn list_for_room(&self, room_id: Uuid) -> Result<Vec<Booking>, StoreError> {
        let rows: Vec<BookingRow> = sqlx::query_as(&format!(
            "SELECT {BOOKING_COLUMNS} FROM booking WHERE room_id = ?1 ORDER BY created_at, id"
        ))
        .bind(room_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Booking::try_from).collect()
    }

    async fn update(&self, id: Uuid, draft: BookingDraft) -> Result<Booking, StoreError> {
        // Existence first, so a missing booking is not reported as a bad room.
        BookingRepository::get(self, id).await?;
        self.precheck_booking(&draft, Some(id)).await?;

        let row: Option<BookingRow> = sqlx::query_as(&format!(
            "UPDATE booking
             SET room_id = ?1, check_in = ?2, check_out = ?3, updated_at = ?4
             WHERE id = ?5
             RETURNING {BOOKING_COLUMNS}"
        ))
        .bind(draft.room_id.to_string())
        .bind(utils::to_micros(draft.interval.start()))
        .bind(utils::to_micros(draft.interval.end()))
        .bind(utils::to_micros(utils::now()))
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| StoreError::from_booking_write(err, draft.room_id))?;

        let booking: Booking = row.ok_or(StoreError::NotFound)?.try_into()?;
        tracing::info!(
            booking_id = %booking.id,
            room_id = %booking.room_id,
            check_in = %booking.check_in(),
            check_out = %booking.check_out(),
            "booking updated"
        );
        Ok(booking)
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM booking WHERE id = ?1")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }

        tracing::info!(booking_id = %id, "booking deleted");
        Ok(())
    }

    async fn has_conflict(
        &self,
        room_id: Uuid,
        interval: &Interval,
        exclude: Option<Uuid>,
    ) -> Result<bool, StoreError> {
        let found: i64 = sqlx::query_scalar(
            "SELECT EXISTS (
                 SELECT 1 FROM booking
                 WHERE room_id = ?1
                   AND check_in < ?2
                   AND check_out > ?3
                   AND (?4 IS NULL OR id <> ?4)
             )",
        )
        .bind(room_id.to_string())
        .bind(utils::to_micros(interval.end()))
        .bind(utils::to_micros(interval.start()))
        .bind(exclude.map(|id| id.to_string()))
        .fetch_one(&self.pool)
        .await?;

        Ok(found != 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::rooms::{
        models::{normalize_price, NewRoom},
        repository::RoomRepository,
    };
    use crate::testing::memory_store;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use rust_decimal::Decimal;

    fn day(n: i64, hour: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2030, 3, 1, 0, 0, 0).unwrap() + Duration::days(n) + Duration::hours(hour)
    }

    fn draft(room_id: Uuid, start: DateTime<Utc>, end: DateTime<Utc>) -> BookingDraft {
        BookingDraft::new(room_id, start, end).unwrap()
    }

    async fn room(store: &SqliteStore) -> Uuid {
        RoomRepository::create(
            store,
            NewRoom {
                description: "Test Room".to_string(),
                price: normalize_price(Decimal::from(100)),
                active: true,
            },
        )
        .await
        .unwrap()
        .room_id
    }

    #[tokio::test]
    async fn overlapping_create_is_rejected_touching_is_not() {
        let store = memory_store().await;
        let room_id = room(&store).await;

        BookingRepository::create(&store, draft(room_id, day(1, 10), day(3, 10)))
            .await
            .unwrap();

        let overlapping = BookingRepository::create(&store, draft(room_id, day(2, 10), day(4, 10))).await;
        assert!(matches!(overlapping, Err(StoreError::RoomUnavailable)));

        let touching = BookingRepository::create(&store, draft(room_id, day(3, 10), day(4, 10))).await;
        assert!(touching.is_ok());

        let before = BookingRepository::create(&store, draft(room_id, day(0, 10), day(1, 10))).await;
        assert!(before.is_ok());

        assert_eq!(BookingRepository::count(&store).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn other_rooms_do_not_conflict() {
        let store = memory_store().await;
        let first = room(&store).await;
        let second = room(&store).await;

        BookingRepository::create(&store, draft(first, day(1, 0), day(2, 0)))
            .await
            .unwrap();
        assert!(BookingRepository::create(&store, draft(second, day(1, 0), day(2, 0)))
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn sql_check_agrees_with_interval_rule() {
        let store = memory_store().await;
        let room_id = room(&store).await;
        let existing = draft(room_id, day(0, 2), day(0, 4)).interval;
        BookingRepository::create(&store, BookingDraft { room_id, interval: existing })
            .await
            .unwrap();

        for start in 0..6 {
            for end in (start + 1)..7 {
                let proposed = draft(room_id, day(0, start), day(0, end)).interval;
                let found = store.has_conflict(room_id, &proposed, None).await.unwrap();
                assert_eq!(found, existing.overlaps(&proposed), "[{start}, {end})");
            }
        }
    }

    #[tokio::test]
    async fn update_excludes_itself() {
        let store = memory_store().await;
        let room_id = room(&store).await;
        let booking = BookingRepository::create(&store, draft(room_id, day(1, 10), day(3, 10)))
            .await
            .unwrap();

        assert!(store
            .has_conflict(room_id, &booking.interval, None)
            .await
            .unwrap());
        assert!(!store
            .has_conflict(room_id, &booking.interval, Some(booking.id))
            .await
            .unwrap());
        let unchanged = BookingRepository::update(&store, booking.id, draft(room_id, day(1, 10), day(3, 10)))
            .await
            .unwrap();
        assert_eq!(unchanged.interval, booking.interval);

        let extended = BookingRepository::update(&store, booking.id, draft(room_id, day(1, 10), day(3, 12)))
            .await
            .unwrap();
        assert_eq!(extended.check_out(), day(3, 12));
        assert_eq!(extended.created_at, booking.created_at);
    }

    #[tokio::test]
    async fn update_into_another_booking_is_rejected() {
        let store = memory_store().await;
        let room_id = room(&store).await;
        BookingRepository::create(&store, draft(room_id, day(1, 0), day(2, 0)))
            .await
            .unwrap();
        let later = BookingRepository::create(&store, draft(room_id, day(5, 0), day(6, 0)))
            .await
            .unwrap();

        let moved = BookingRepository::update(&store, later.id, draft(room_id, day(1, 12), day(2, 12))).await;
        assert!(matches!(moved, Err(StoreError::RoomUnavailable)));

        let kept = BookingRepository::get(&store, later.id).await.unwrap();
        assert_eq!(kept.interval, later.interval);
    }

    #[tokio::test]
    async fn writes_against_missing_room_or_booking() {
        let store = memory_store().await;
        let ghost = Uuid::now_v7();

        assert!(matches!(
            BookingRepository::create(&store, draft(ghost, day(1, 0), day(2, 0))).await,
            Err(StoreError::RoomMissing(id)) if id == ghost
        ));

        let room_id = room(&store).await;
        assert!(matches!(
            BookingRepository::update(&store, ghost, draft(room_id, day(1, 0), day(2, 0))).await,
            Err(StoreError::NotFound)
        ));
        assert!(matches!(
            BookingRepository::delete(&store, ghost).await,
            Err(StoreError::NotFound)
        ));
    }

    #[tokio::test]
    async fn triggers_block_overlaps_written_behind_the_repository() {
        let store = memory_store().await;
        let room_id = room(&store).await;
        BookingRepository::create(&store, draft(room_id, day(1, 0), day(3, 0)))
            .await
            .unwrap();

        let raw = sqlx::query(
            "INSERT INTO booking (id, room_id, check_in, check_out, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, 0, 0)",
        )
        .bind(Uuid::now_v7().to_string())
        .bind(room_id.to_string())
        .bind(utils::to_micros(day(2, 0)))
        .bind(utils::to_micros(day(4, 0)))
        .execute(store.pool())
        .await
        .unwrap_err();

        assert!(matches!(
            StoreError::from_booking_write(raw, room_id),
            StoreError::RoomUnavailable
        ));
    }

    #[tokio::test]
    async fn deleting_a_room_cascades() {
        let store = memory_store().await;
        let room_id = room(&store).await;
        let a = BookingRepository::create(&store, draft(room_id, day(1, 0), day(2, 0)))
            .await
            .unwrap();
        let c = BookingRepository::create(&store, draft(room_id, day(2, 0), day(3, 0)))
            .await
            .unwrap();

        assert_eq!(store.list_for_room(room_id).await.unwrap().len(), 2);
        RoomRepository::delete(&store, room_id).await.unwrap();

        for id in [a.id, c.id] {
            assert!(matches!(
                BookingRepository::get(&store, id).await,
                Err(StoreError::NotFound)
            ));
        }
        assert!(store.list_for_room(room_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn concurrent_overlapping_creates_admit_one() {
        let store = std::sync::Arc::new(memory_store().await);
        let room_id = room(&store).await;

        let attempts = (0..8).map(|i| {
            let store = store.clone();
            tokio::spawn(async move {
                let start = day(1, i);
                BookingRepository::create(&*store, draft(room_id, start, start + Duration::hours(24))).await
            })
        });

        let mut created = 0;
        for attempt in attempts.collect::<Vec<_>>() {
            match attempt.await.unwrap() {
                Ok(_) => created += 1,
                Err(StoreError::RoomUnavailable) => {}
                Err(other) => panic!("unexpected error: {other}"),
            }
        }

        assert_eq!(created, 1);
        assert_eq!(store.list_for_room(room_id).await.unwrap().len(), 1);
    }
}
