use thiserror::Error;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Database lock poisoned")]
    LockPoisoned,

    #[error("Package not cached: {0}")]
    NotFound(String),

    #[error("Invalid timestamp stored for {package}: {millis}")]
    InvalidTimestamp { package: String, millis: i64 },
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Package not found: {0}")]
    NotFound(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Timed out after {timeout_ms}ms fetching {package}")]
    Timeout { package: String, timeout_ms: u64 },
}
