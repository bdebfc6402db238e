use thiserror::Error;

impl From<serde_json::Error> for AuditError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError(format!("JSON serialization error: {}", err))
    }
}

impl From<sqlx::Error> for AuditError {
    fn from(err: sqlx::Error) -> Self {
        Self::DatabaseError(format!("Database error: {}", err))
    }
}

impl From<sqlx::migrate::MigrateError> for AuditError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        Self::DatabaseError(format!("Migration error: {}", err))
    }
}

impl From<config::ConfigError> for AuditError {
    fn from(err: config::ConfigError) -> Self {
        Self::ConfigError(err.to_string())
    }
}

#[derive(Error, Debug)]
pub enum AuditError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// The newest persisted row cannot seed the chain head. Appends are
    /// refused rather than starting a second, disconnected chain.
    #[error("Corrupt chain tail: {0}")]
    CorruptTail(String),
}

impl AuditError {
    pub fn corrupt_tail(row_id: i64, reason: &str) -> Self {
        Self::CorruptTail(format!(
            "row {} cannot seed the chain head ({}); refusing to append a new genesis entry, \
             run a chain rebuild or repair the row",
            row_id, reason
        ))
    }
}

pub type AuditResult<T> = Result<T, AuditError>;
