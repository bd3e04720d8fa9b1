use crate::services::{tail_lines, LOG_TAIL_LINES};
use crate::startup::AppState;
use axum::extract::State;
use serde_json::json;
use service_core::envelope::ApiResponse;
use service_core::error::AppError;
use std::io::ErrorKind;

/// Last lines of the service's own log file.
pub async fn get_logs(State(state): State<AppState>) -> Result<ApiResponse, AppError> {
    match tail_lines(&state.log_file, LOG_TAIL_LINES).await {
        Ok(lines) => Ok(ApiResponse::ok("Logs fetched", json!(lines))),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            Err(AppError::NotFound("Log file not found".to_string()))
        }
        Err(e) => {
            tracing::error!(path = %state.log_file.display(), error = %e, "Failed to read log file");
            Err(AppError::InternalError("Error fetching logs".to_string()))
        }
    }
}
