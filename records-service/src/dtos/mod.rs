use crate::models::{RecordKind, UpdateOutcome};
use serde::Serialize;
use serde_json::{json, Value};
use service_core::envelope::is_empty_payload;
use service_core::error::AppError;

pub const MISSING_FIELDS: &str = "Missing required fields";

/// A validated single-field update.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldUpdate {
    pub id: Value,
    pub field: String,
    pub value: Value,
}

impl FieldUpdate {
    /// Extracts the identifier, `field` and `value` from an update body.
    ///
    /// The identifier may be any non-empty JSON value; `field` must be a non-empty string;
    /// a missing `value` writes null.
    pub fn from_body(kind: RecordKind, body: &Value) -> Result<Self, AppError> {
        let missing = || AppError::BadRequest(MISSING_FIELDS.to_string());
        let object = body.as_object().ok_or_else(missing)?;

        let id = object
            .get(kind.id_key())
            .filter(|id| !is_empty_payload(id))
            .cloned()
            .ok_or_else(missing)?;
        let field = object
            .get("field")
            .and_then(Value::as_str)
            .filter(|field| !field.is_empty())
            .ok_or_else(missing)?
            .to_string();
        let value = object.get("value").cloned().unwrap_or(Value::Null);

        Ok(Self { id, field, value })
    }
}

pub fn update_counts(outcome: UpdateOutcome) -> Value {
    json!({
        "matched": outcome.matched,
        "modified": outcome.modified,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckResult {
    pub status: HealthStatus,
    pub message: String,
}

impl CheckResult {
    pub fn healthy(message: impl Into<String>) -> Self {
        Self {
            status: HealthStatus::Healthy,
            message: message.into(),
        }
    }

    pub fn unhealthy(message: impl Into<String>) -> Self {
        Self {
            status: HealthStatus::Unhealthy,
            message: message.into(),
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.status == HealthStatus::Healthy
    }
}

/// Body of `GET /health`. Key names are part of the public contract.
#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub flask: CheckResult,
    pub mongodb: CheckResult,
    pub unisys_collection: CheckResult,
    pub ibm_collection: CheckResult,
    pub overall_status: HealthStatus,
}

impl HealthReport {
    pub fn new(
        process: CheckResult,
        database: CheckResult,
        payroll: CheckResult,
        shipping: CheckResult,
    ) -> Self {
        let all_healthy = [&process, &database, &payroll, &shipping]
            .iter()
            .all(|check| check.is_healthy());

        Self {
            flask: process,
            mongodb: database,
            unisys_collection: payroll,
            ibm_collection: shipping,
            overall_status: if all_healthy {
                HealthStatus::Healthy
            } else {
                HealthStatus::Unhealthy
            },
        }
    }
}
