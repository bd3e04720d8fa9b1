//! Read and single-field update routes for payroll and shipping records.

use crate::dtos::{update_counts, FieldUpdate, MISSING_FIELDS};
use crate::models::RecordKind;
use crate::services::{metrics::record_update, StoreError};
use crate::startup::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde_json::Value;
use service_core::envelope::ApiResponse;
use service_core::error::AppError;

struct Messages {
    fetched: &'static str,
    fetch_failed: &'static str,
    updated: &'static str,
    update_failed: &'static str,
}

fn messages(kind: RecordKind) -> Messages {
    match kind {
        RecordKind::Payroll => Messages {
            fetched: "Payroll records fetched",
            fetch_failed: "Error fetching payroll records",
            updated: "Payroll updated",
            update_failed: "Error updating payroll",
        },
        RecordKind::Shipping => Messages {
            fetched: "Shipping records fetched",
            fetch_failed: "Error fetching shipping records",
            updated: "Shipping updated",
            update_failed: "Error updating shipping",
        },
    }
}

pub async fn get_payroll(State(state): State<AppState>) -> Result<ApiResponse, AppError> {
    fetch_records(&state, RecordKind::Payroll).await
}

pub async fn get_shipping(State(state): State<AppState>) -> Result<ApiResponse, AppError> {
    fetch_records(&state, RecordKind::Shipping).await
}

pub async fn update_payroll(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<ApiResponse, AppError> {
    update_record(&state, RecordKind::Payroll, body).await
}

pub async fn update_shipping(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<ApiResponse, AppError> {
    update_record(&state, RecordKind::Shipping, body).await
}

async fn fetch_records(state: &AppState, kind: RecordKind) -> Result<ApiResponse, AppError> {
    let messages = messages(kind);
    let fail = |e: StoreError| {
        tracing::error!(kind = %kind, error = %e, "Failed to fetch records");
        AppError::InternalError(messages.fetch_failed.to_string())
    };

    let records = state.repository().map_err(fail)?.fetch_all(kind).await.map_err(fail)?;

    tracing::info!(kind = %kind, count = records.len(), "Fetched records");
    Ok(ApiResponse::ok(messages.fetched, Value::Array(records)))
}

async fn update_record(
    state: &AppState,
    kind: RecordKind,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<ApiResponse, AppError> {
    let messages = messages(kind);

    let Json(body) = body.map_err(|rejection| {
        tracing::warn!(kind = %kind, error = %rejection, "Rejected update body");
        AppError::BadRequest(MISSING_FIELDS.to_string())
    })?;
    let update = FieldUpdate::from_body(kind, &body)?;

    if !state.updates.permits(&update.field) {
        tracing::warn!(kind = %kind, field = %update.field, "Update to field outside allow-list");
        return Err(AppError::BadRequest("Field not allowed".to_string()));
    }

    let fail = |e: StoreError| {
        tracing::error!(
            kind = %kind,
            id = %update.id,
            field = %update.field,
            error = %e,
            "Record update failed"
        );
        record_update(kind, "error");
        AppError::InternalError(messages.update_failed.to_string())
    };

    let outcome = state
        .repository()
        .map_err(fail)?
        .update_field(kind, &update.id, &update.field, &update.value)
        .await
        .map_err(fail)?;

    tracing::info!(
        kind = %kind,
        id = %update.id,
        field = %update.field,
        matched = outcome.matched,
        modified = outcome.modified,
        "Record update applied"
    );
    record_update(
        kind,
        if outcome.modified > 0 {
            "modified"
        } else {
            "unchanged"
        },
    );

    Ok(ApiResponse::ok(messages.updated, update_counts(outcome)))
}
