//! Uniform `{success, message, data}` response body shared by every JSON route.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Map, Value};

/// Serialized body of every enveloped response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Envelope {
    pub success: bool,
    pub message: String,
    pub data: Value,
}

/// An [`Envelope`] paired with the status code it is sent with.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    status: StatusCode,
    body: Envelope,
}

impl ApiResponse {
    /// Builds a response. An absent or empty payload is rendered as `{}`.
    pub fn new(
        success: bool,
        message: impl Into<String>,
        data: Option<Value>,
        status: StatusCode,
    ) -> Self {
        let data = match data {
            Some(value) if !is_empty_payload(&value) => value,
            _ => Value::Object(Map::new()),
        };

        Self {
            status,
            body: Envelope {
                success,
                message: message.into(),
                data,
            },
        }
    }

    pub fn ok(message: impl Into<String>, data: impl Into<Option<Value>>) -> Self {
        Self::new(true, message, data.into(), StatusCode::OK)
    }

    pub fn failure(message: impl Into<String>, status: StatusCode) -> Self {
        Self::new(false, message, None, status)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn body(&self) -> &Envelope {
        &self.body
    }
}

impl IntoResponse for ApiResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

/// Payloads that read as "nothing": null, false, zero and empty strings or containers.
pub fn is_empty_payload(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(fields) => fields.is_empty(),
    }
}
