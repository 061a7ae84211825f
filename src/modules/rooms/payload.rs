//! Field-level parsing of room request bodies.

use std::str::FromStr;

use innkeep_http::{validation::FieldErrors, AppError};
use rust_decimal::Decimal;
use serde_json::{Map, Value};

use super::models::{normalize_price, NewRoom, RoomChanges, PRICE_SCALE};

const MAX_WHOLE_DIGITS: usize = 8;

/// Body of a create request: description and price are required, `active`
/// defaults to true.
pub fn parse_new_room(body: &Map<String, Value>) -> Result<NewRoom, AppError> {
    let mut errors = FieldErrors::new();
    let description = description(&mut errors, body, true);
    let price = price(&mut errors, body, true);
    let active = active(&mut errors, body);

    match (description, price) {
        (Some(description), Some(price)) if errors.is_empty() => Ok(NewRoom {
            description,
            price,
            active: active.unwrap_or(true),
        }),
        _ => Err(errors.into()),
    }
}

/// Body of an update. A full update needs description and price; a partial
/// one accepts any subset.
pub fn parse_room_changes(body: &Map<String, Value>, partial: bool) -> Result<RoomChanges, AppError> {
    let mut errors = FieldErrors::new();
    let changes = RoomChanges {
        description: description(&mut errors, body, !partial),
        price: price(&mut errors, body, !partial),
        active: active(&mut errors, body),
    };
    errors.finish(changes)
}

fn description(errors: &mut FieldErrors, body: &Map<String, Value>, required: bool) -> Option<String> {
    match errors.lookup(body, "description", required)? {
        Value::String(text) if text.trim().is_empty() => {
            errors.push("description", "blank", "This field may not be blank.");
            None
        }
        Value::String(text) => Some(text.clone()),
        _ => {
            errors.push("description", "invalid", "Not a valid string.");
            None
        }
    }
}

fn price(errors: &mut FieldErrors, body: &Map<String, Value>, required: bool) -> Option<Decimal> {
    let raw = errors.lookup(body, "price", required)?;

    let Some(price) = decimal_from_json(raw) else {
        errors.push("price", "invalid", "A valid number is required.");
        return None;
    };

    if price < Decimal::ZERO {
        errors.push(
            "price",
            "min_value",
            "Ensure this value is greater than or equal to 0.",
        );
        return None;
    }

    let normalized = price.normalize();
    let scale = normalized.scale();
    if scale > PRICE_SCALE {
        errors.push(
            "price",
            "max_decimal_places",
            format!("Ensure that there are no more than {PRICE_SCALE} decimal places."),
        );
        return None;
    }

    let digits = normalized.mantissa().unsigned_abs().to_string().len();
    if digits.saturating_sub(scale as usize) > MAX_WHOLE_DIGITS {
        errors.push(
            "price",
            "max_whole_digits",
            format!("Ensure that there are no more than {MAX_WHOLE_DIGITS} digits before the decimal point."),
        );
        return None;
    }

    Some(normalize_price(price))
}

fn active(errors: &mut FieldErrors, body: &Map<String, Value>) -> Option<bool> {
    match errors.lookup(body, "active", false)? {
        Value::Bool(flag) => Some(*flag),
        _ => {
            errors.push("active", "invalid", "Must be a valid boolean.");
            None
        }
    }
}

/// Prices arrive as decimal strings or JSON numbers.
fn decimal_from_json(value: &Value) -> Option<Decimal> {
    let text = match value {
        Value::String(text) => text.trim().to_string(),
        Value::Number(number) => number.to_string(),
        _ => return None,
    };
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn body(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    fn failed_fields(err: AppError) -> Vec<(String, String)> {
        match err {
            AppError::Validation { details, .. } => details
                .iter()
                .map(|d| {
                    (
                        d["field"].as_str().unwrap().to_string(),
                        d["code"].as_str().unwrap().to_string(),
                    )
                })
                .collect(),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn create_accepts_string_and_number_prices() {
        let room = parse_new_room(&body(json!({"description": "Suite", "price": "150.5"}))).unwrap();
        assert_eq!(room.price.to_string(), "150.50");
        assert!(room.active);

        let room = parse_new_room(&body(json!({"description": "Suite", "price": 99, "active": false}))).unwrap();
        assert_eq!(room.price.to_string(), "99.00");
        assert!(!room.active);
    }

    #[test]
    fn create_reports_every_bad_field() {
        let err = parse_new_room(&body(json!({
            "description": "",
            "price": "invalid_price",
            "active": "not_boolean",
        })))
        .unwrap_err();

        assert_eq!(
            failed_fields(err),
            vec![
                ("description".to_string(), "blank".to_string()),
                ("price".to_string(), "invalid".to_string()),
                ("active".to_string(), "invalid".to_string()),
            ]
        );
    }

    #[test]
    fn create_requires_description_and_price() {
        let err = parse_new_room(&body(json!({}))).unwrap_err();
        assert_eq!(
            failed_fields(err),
            vec![
                ("description".to_string(), "required".to_string()),
                ("price".to_string(), "required".to_string()),
            ]
        );
    }

    #[test]
    fn price_bounds() {
        let cases = [
            ("-100.00", Some("min_value")),
            ("-0.01", Some("min_value")),
            ("0", None),
            ("0.00", None),
            ("10.123", Some("max_decimal_places")),
            ("10.100", None),
            ("123456789", Some("max_whole_digits")),
            ("12345678.99", None),
        ];

        for (raw, expected) in cases {
            let result = parse_room_changes(&body(json!({"price": raw})), true);
            match expected {
                None => assert!(result.is_ok(), "price {raw} should be accepted"),
                Some(code) => {
                    let fields = failed_fields(result.unwrap_err());
                    assert_eq!(fields, vec![("price".to_string(), code.to_string())], "price {raw}");
                }
            }
        }
    }

    #[test]
    fn partial_changes_leave_missing_fields_alone() {
        let changes = parse_room_changes(&body(json!({"description": "Renamed"})), true).unwrap();
        assert_eq!(
            changes,
            RoomChanges {
                description: Some("Renamed".to_string()),
                price: None,
                active: None,
            }
        );
    }

    #[test]
    fn full_update_requires_description_and_price() {
        let err = parse_room_changes(&body(json!({"active": false})), false).unwrap_err();
        let fields: Vec<String> = failed_fields(err).into_iter().map(|(f, _)| f).collect();
        assert_eq!(fields, vec!["description", "price"]);
    }

    #[test]
    fn explicit_null_is_rejected() {
        let err = parse_room_changes(&body(json!({"price": null})), true).unwrap_err();
        assert_eq!(failed_fields(err), vec![("price".to_string(), "null".to_string())]);
    }
}
