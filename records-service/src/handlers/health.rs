use crate::dtos::{CheckResult, HealthReport, HealthStatus};
use crate::models::RecordKind;
use crate::services::RecordsRepository;
use crate::startup::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

/// Composite health report. Each sub-check is evaluated even when others fail.
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let process = CheckResult::healthy("API server is running");

    let (database, payroll, shipping) = match state.repository() {
        Ok(repository) => tokio::join!(
            check_database(repository),
            check_collection(repository, RecordKind::Payroll),
            check_collection(repository, RecordKind::Shipping),
        ),
        Err(e) => {
            tracing::error!(error = %e, "Health check without a database handle");
            (
                CheckResult::unhealthy("Database connection failed"),
                CheckResult::unhealthy("Collection not accessible"),
                CheckResult::unhealthy("Collection not accessible"),
            )
        }
    };

    let report = HealthReport::new(process, database, payroll, shipping);
    let status = match report.overall_status {
        HealthStatus::Healthy => StatusCode::OK,
        HealthStatus::Unhealthy => StatusCode::INTERNAL_SERVER_ERROR,
    };

    (status, Json(report))
}

async fn check_database(repository: &RecordsRepository) -> CheckResult {
    match repository.ping().await {
        Ok(()) => CheckResult::healthy("Database connection successful"),
        Err(e) => {
            tracing::error!(error = %e, "Database health check failed");
            CheckResult::unhealthy("Database connection failed")
        }
    }
}

async fn check_collection(repository: &RecordsRepository, kind: RecordKind) -> CheckResult {
    match repository.count(kind).await {
        Ok(count) => CheckResult::healthy(format!("Collection accessible ({} documents)", count)),
        Err(e) => {
            tracing::error!(
                kind = %kind,
                collection = %repository.collection(kind),
                error = %e,
                "Collection health check failed"
            );
            CheckResult::unhealthy("Collection not accessible")
        }
    }
}
