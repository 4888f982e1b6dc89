//! Error types for the disaster recovery library.

use std::path::PathBuf;

use thiserror::Error;
use uuid::Uuid;

/// Comprehensive error type for all disaster recovery operations.
#[derive(Error, Debug)]
pub enum DrError {
    /// Database connection or query errors
    #[error("Database error: {message}")]
    Database {
        message: String,
        #[source]
        source: rusqlite::Error,
    },
    /// DR plan not found for the given ID
    #[error("DR plan not found: {id}")]
    PlanNotFound { id: Uuid },
    /// Instance not found for the given ID
    #[error("Instance not found: {id}")]
    InstanceNotFound { id: Uuid },
    /// Server not found for the given ID
    #[error("Server not found: {id}")]
    ServerNotFound { id: Uuid },
    /// Backup not found for the given ID
    #[error("Backup not found: {id}")]
    BackupNotFound { id: Uuid },
    /// Operation refused because the plan is inactive
    #[error("DR plan is inactive: {id}")]
    PlanInactive { id: Uuid },
    /// Another pipeline run holds the advisory lock for this plan
    #[error("DR plan {id} already has a pipeline in progress")]
    PlanBusy { id: Uuid },
    /// Cron expression failed validation
    #[error("Invalid cron expression '{expression}': {reason}")]
    InvalidCron { expression: String, reason: String },
    /// Invalid input validation errors
    #[error("Invalid input for field '{field}': {reason}")]
    InvalidInput { field: String, reason: String },
    /// A pipeline step reported failure; the message is surfaced verbatim
    #[error("{message}")]
    Pipeline { message: String },
    /// File system operation errors
    #[error("File system error at path '{path}': {source}")]
    FileSystem {
        path: PathBuf,
        source: std::io::Error,
    },
    /// XDG directory specification errors
    #[error("XDG directory error: {0}")]
    XdgDirectory(String),
    /// Serialization/deserialization errors
    #[error("Serialization error: {source}")]
    Serialization {
        #[from]
        source: serde_json::Error,
    },
    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

/// Builder for creating database errors with optional context.
pub struct DatabaseErrorBuilder {
    message: String,
}

impl DatabaseErrorBuilder {
    /// Create a new database error builder with a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Build the error with the given source.
    pub fn with_source(self, source: rusqlite::Error) -> DrError {
        DrError::Database {
            message: self.message,
            source,
        }
    }
}

/// Builder for creating input validation errors.
pub struct InvalidInputBuilder {
    field: String,
}

impl InvalidInputBuilder {
    /// Create a new invalid input error builder for a field.
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
        }
    }

    /// Build the error with the given reason.
    pub fn with_reason(self, reason: impl Into<String>) -> DrError {
        DrError::InvalidInput {
            field: self.field,
            reason: reason.into(),
        }
    }
}

impl DrError {
    /// Creates a builder for database errors.
    pub fn database(message: impl Into<String>) -> DatabaseErrorBuilder {
        DatabaseErrorBuilder::new(message)
    }

    /// Creates a builder for input validation errors.
    pub fn invalid_input(field: impl Into<String>) -> InvalidInputBuilder {
        InvalidInputBuilder::new(field)
    }

    /// Creates a pipeline step failure carrying `message` verbatim.
    pub fn pipeline(message: impl Into<String>) -> Self {
        DrError::Pipeline {
            message: message.into(),
        }
    }

    /// Creates a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        DrError::Configuration {
            message: message.into(),
        }
    }

    /// Returns true for errors raised by validation before any mutation.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            DrError::PlanNotFound { .. }
                | DrError::InstanceNotFound { .. }
                | DrError::ServerNotFound { .. }
                | DrError::BackupNotFound { .. }
                | DrError::PlanInactive { .. }
                | DrError::InvalidCron { .. }
                | DrError::InvalidInput { .. }
        )
    }
}

/// Specialized extension trait for database-related Results.
pub trait DatabaseResultExt<T> {
    /// Map database errors with a message.
    fn db_context(self, message: &str) -> Result<T>;
}

impl<T> DatabaseResultExt<T> for std::result::Result<T, rusqlite::Error> {
    fn db_context(self, message: &str) -> Result<T> {
        self.map_err(|e| DrError::database(message).with_source(e))
    }
}

/// Result type alias for disaster recovery operations
pub type Result<T> = std::result::Result<T, DrError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_message_is_verbatim() {
        let err = DrError::pipeline("Backup not found or not completed");
        assert_eq!(err.to_string(), "Backup not found or not completed");
    }

    #[test]
    fn test_invalid_cron_mentions_cron() {
        let err = DrError::InvalidCron {
            expression: "61 * * * *".to_string(),
            reason: "minute value 61 out of range 0-59".to_string(),
        };
        assert!(err.to_string().to_lowercase().contains("cron"));
        assert!(err.is_validation());
    }

    #[test]
    fn test_invalid_input_builder() {
        let err = DrError::invalid_input("retention_days").with_reason("must not be negative");
        assert!(matches!(err, DrError::InvalidInput { ref field, .. } if field == "retention_days"));
        assert!(!DrError::pipeline("x").is_validation());
    }
}
