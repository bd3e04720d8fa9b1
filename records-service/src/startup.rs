use crate::config::{MongoConfig, RecordsConfig, UpdatePolicy};
use crate::handlers;
use crate::services::{MongoStore, RecordsRepository, StoreError};
use axum::{
    body::Body,
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use secrecy::ExposeSecret;
use service_core::error::AppError;
use service_core::middleware::{
    metrics::metrics_middleware,
    security_headers::security_headers_middleware,
    tracing::{make_request_span, request_id_middleware},
};
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

/// Shared per-process handles. The repository is `None` when no database is configured
/// or the client could not be built; every data route then fails on its own.
#[derive(Clone)]
pub struct AppState {
    pub repository: Option<RecordsRepository>,
    pub log_file: Arc<PathBuf>,
    pub updates: Arc<UpdatePolicy>,
}

impl AppState {
    pub fn new(
        repository: Option<RecordsRepository>,
        log_file: impl Into<PathBuf>,
        updates: UpdatePolicy,
    ) -> Self {
        Self {
            repository,
            log_file: Arc::new(log_file.into()),
            updates: Arc::new(updates),
        }
    }

    pub fn repository(&self) -> Result<&RecordsRepository, StoreError> {
        self.repository.as_ref().ok_or(StoreError::NotConfigured)
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/get/unisys/payroll", get(handlers::get_payroll))
        .route("/get/ibm/shipping", get(handlers::get_shipping))
        .route("/update/unisys/payroll", post(handlers::update_payroll))
        .route("/update/ibm/shipping", post(handlers::update_shipping))
        .route("/logs", get(handlers::get_logs))
        .route("/health", get(handlers::health_check))
        .route("/metrics", get(handlers::metrics))
        .route_layer(from_fn(metrics_middleware))
        .layer(from_fn(security_headers_middleware))
        .layer(TraceLayer::new_for_http().make_span_with(make_request_span::<Body>))
        .layer(from_fn(request_id_middleware))
        .with_state(state)
}

/// Builds the records repository, tolerating a missing or unusable connection string.
pub async fn connect_repository(config: &MongoConfig) -> Option<RecordsRepository> {
    let Some(uri) = config.uri.as_ref() else {
        tracing::warn!("MONGO_URI is not set; data routes will answer with errors");
        return None;
    };
    tracing::info!("Fetched MongoDB credentials");

    match MongoStore::connect(uri.expose_secret(), &config.database).await {
        Ok(store) => {
            tracing::info!(
                database = %config.database,
                payroll = %config.payroll_collection,
                shipping = %config.shipping_collection,
                "MongoDB collections ready"
            );
            Some(RecordsRepository::new(
                Arc::new(store),
                config.payroll_collection.clone(),
                config.shipping_collection.clone(),
            ))
        }
        Err(e) => {
            tracing::error!("MongoDB connection failed: {}", e);
            None
        }
    }
}

pub struct Application {
    port: u16,
    listener: TcpListener,
    router: Router,
}

impl Application {
    pub async fn build(config: RecordsConfig) -> Result<Self, AppError> {
        let repository = connect_repository(&config.mongodb).await;
        let state = AppState::new(
            repository,
            config.logging.file_path.clone(),
            config.updates.clone(),
        );

        let address = config.common.bind_address();
        let listener = TcpListener::bind(&address).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", address, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Listening on {}", port);

        Ok(Self {
            port,
            listener,
            router: build_router(state),
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped<F>(self, shutdown: F) -> std::io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await
    }
}
