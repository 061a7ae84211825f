//! Request extractors.

use axum::{
    extract::{FromRequest, Request},
    Json,
};
use serde_json::{Map, Value};

use crate::error::AppError;

/// A JSON request body that must be an object.
///
/// Field-level typing is left to the handler so that every bad field can be
/// reported together instead of failing on the first one.
#[derive(Debug, Clone)]
pub struct JsonObject(pub Map<String, Value>);

impl<S> FromRequest<S> for JsonObject
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<Value>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::bad_request(rejection.body_text()))?;

        match value {
            Value::Object(map) => Ok(Self(map)),
            _ => Err(AppError::bad_request("Expected a JSON object.")),
        }
    }
}
