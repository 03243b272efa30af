// Storage errors and the degrade-to-empty policy

use std::time::Duration;

/// Error type for store operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Store cannot be used with the current configuration
    #[error("store not configured: {0}")]
    NotConfigured(String),

    /// Could not establish a connection
    #[error("connection error: {0}")]
    Connection(String),

    /// Query failed
    #[error("query error: {0}")]
    Query(String),

    /// Operation exceeded the configured time limit
    #[error("store operation timed out after {0:?}")]
    Timeout(Duration),

    /// Store is reachable but refusing work
    #[error("store unavailable")]
    Unavailable,

    /// Record could not be encoded or decoded
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Schema migration failed
    #[error("migration error: {0}")]
    Migration(String),
}

impl StoreError {
    /// Whether callers should fall back to an empty result.
    ///
    /// Misconfiguration and failed migrations are not transient and are surfaced.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::NotConfigured(_) | Self::Migration(_))
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::Configuration(e) => StoreError::NotConfigured(e.to_string()),
            sqlx::Error::Io(e) => StoreError::Connection(e.to_string()),
            sqlx::Error::Tls(e) => StoreError::Connection(e.to_string()),
            sqlx::Error::PoolTimedOut => StoreError::Connection("pool timed out".to_string()),
            sqlx::Error::PoolClosed => StoreError::Connection("pool closed".to_string()),
            other => StoreError::Query(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Serialization(e.to_string())
    }
}

/// Replace a recoverable failure with `fallback`, logging it
pub(crate) fn recover<T>(
    result: Result<T, StoreError>,
    operation: &'static str,
    fallback: impl FnOnce() -> T,
) -> Result<T, StoreError> {
    match result {
        Ok(value) => Ok(value),
        Err(e) if e.is_recoverable() => {
            tracing::error!(operation, error = %e, "Store operation failed, returning empty result");
            Ok(fallback())
        }
        Err(e) => Err(e),
    }
}
