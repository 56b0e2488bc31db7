use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use serde_json::{json, Value};

use crate::api::ErrorMap;

/// Wrapper for API responses that adds the `errorMap` next to the payload fields.
///
/// The payload must serialize to a JSON object; its keys are merged with
/// `errorMap` at the top level, e.g. `{ "list": {...}, "errorMap": {} }`.
#[derive(Debug)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub error_map: ErrorMap,
    pub status_code: Option<StatusCode>,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a successful API response with default 200 status
    pub fn success(data: T) -> Self {
        Self {
            data,
            error_map: ErrorMap::new(),
            status_code: None,
        }
    }

    pub fn with_status(data: T, status_code: StatusCode) -> Self {
        Self {
            data,
            error_map: ErrorMap::new(),
            status_code: Some(status_code),
        }
    }

    /// Attach non-fatal errors gathered while producing the payload
    pub fn with_error_map(mut self, error_map: ErrorMap) -> Self {
        self.error_map = error_map;
        self
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = self.status_code.unwrap_or(StatusCode::OK);

        let data_value = match serde_json::to_value(&self.data) {
            Ok(value) => value,
            Err(e) => {
                tracing::error!("Failed to serialize response data: {}", e);
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({
                        "errorMap": ErrorMap::single("response.serialize", "Failed to serialize response data")
                    })),
                )
                    .into_response();
            }
        };

        let mut envelope = match data_value {
            Value::Object(map) => map,
            Value::Null => serde_json::Map::new(),
            other => {
                let mut map = serde_json::Map::new();
                map.insert("data".to_string(), other);
                map
            }
        };
        envelope.insert("errorMap".to_string(), json!(self.error_map));

        (status, Json(Value::Object(envelope))).into_response()
    }
}

pub type ApiResult<T> = Result<ApiResponse<T>, crate::error::ApiError>;
