use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Database error: {0}")]
    ConnectionError(#[from] sqlx::Error),

    #[error("Database migration failed: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),

    #[error("Invalid holding: {0}")]
    InvalidHolding(#[from] core_types::CoreError),

    #[error("No holding found for symbol '{0}'.")]
    NotFound(String),
}
