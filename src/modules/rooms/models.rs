use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

/// Currency precision for room prices.
pub const PRICE_SCALE: u32 = 2;

/// A bookable room.
#[derive(Debug, Clone, PartialEq)]
pub struct Room {
    pub room_id: Uuid,
    pub description: String,
    /// Always carries exactly [`PRICE_SCALE`] decimal places.
    pub price: Decimal,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl fmt::Display for Room {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}> Room {} - {}", self.room_id, self.description, self.price)
    }
}

/// Fields accepted when creating a room.
#[derive(Debug, Clone, PartialEq)]
pub struct NewRoom {
    pub description: String,
    pub price: Decimal,
    pub active: bool,
}

/// Fields to overwrite on an existing room; `None` leaves the stored value alone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoomChanges {
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub active: Option<bool>,
}

/// Pin a price to currency precision, so `100` is stored and shown as `100.00`.
pub fn normalize_price(price: Decimal) -> Decimal {
    let mut price = price;
    price.rescale(PRICE_SCALE);
    price
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn prices_are_shown_with_two_places() {
        let price = normalize_price(Decimal::from(100));
        assert_eq!(price.to_string(), "100.00");

        let price = normalize_price(Decimal::from_str("99.9").unwrap());
        assert_eq!(price.to_string(), "99.90");
    }

    #[test]
    fn display_names_room_and_price() {
        let room = Room {
            room_id: Uuid::nil(),
            description: "Suite".to_string(),
            price: normalize_price(Decimal::from(250)),
            active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert_eq!(
            room.to_string(),
            "<00000000-0000-0000-0000-000000000000> Room Suite - 250.00"
        );
    }
}
