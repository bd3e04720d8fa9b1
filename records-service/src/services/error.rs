use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database client is not configured")]
    NotConfigured,

    #[error("Database error: {0}")]
    Database(#[from] mongodb::error::Error),

    #[error("Invalid value: {0}")]
    InvalidValue(#[from] mongodb::bson::ser::Error),

    #[error("Invalid update: {0}")]
    InvalidUpdate(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}
