use axum::{extract::rejection::JsonRejection, Json};
use serde::de::DeserializeOwned;
use serde_json::Value;
use uuid::Uuid;

use crate::api::ErrorMap;
use crate::error::ApiError;
use crate::validation::{validate, FieldRule};

/// Unwrap the JSON body and run the field rules against it.
///
/// A body that does not parse is reported as `<base>.body`.
pub fn validated_body(
    payload: Result<Json<Value>, JsonRejection>,
    schema: &[(&str, FieldRule)],
    base: &str,
) -> Result<Value, ApiError> {
    let Json(body) = payload.map_err(|rejection| {
        tracing::debug!("Rejected body for {}: {}", base, rejection);
        ApiError::validation(format!("{}.body", base), "Request body must be valid JSON")
    })?;

    let mut errors = ErrorMap::new();
    if !validate(&body, schema, &mut errors, base) {
        return Err(ApiError::Validation(errors));
    }
    Ok(body)
}

/// Convert an already validated body into its typed form
pub fn typed<T: DeserializeOwned>(body: Value, base: &str) -> Result<T, ApiError> {
    serde_json::from_value(body)
        .map_err(|e| ApiError::validation(format!("{}.body", base), format!("Invalid request body: {}", e)))
}

/// A required query parameter; absent or blank values are a validation error
pub fn required_param<'a>(value: Option<&'a str>, base: &str, name: &str, message: &str) -> Result<&'a str, ApiError> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::validation(format!("{}.{}", base, name), message))
}

/// Ids that do not parse cannot exist, so they are reported as not found
pub fn parse_id(raw: &str, not_found_key: &str, message: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::not_found(not_found_key, message))
}
