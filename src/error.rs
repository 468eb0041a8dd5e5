use thiserror::Error;

use crate::domain::LoadStatus;

/// Main error type for the load lifecycle core
#[derive(Error, Debug)]
pub enum BrokerError {
    // Lookup errors
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    // Validation errors
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    // State machine errors
    #[error("{message} (required: {required}, actual: {actual})")]
    InvalidState {
        message: String,
        required: LoadStatus,
        actual: LoadStatus,
    },

    #[error("Invalid status transition: from {from} to {to}")]
    InvalidTransition { from: LoadStatus, to: LoadStatus },

    #[error("Load {load_id} has {tenders} attached tender(s) and cannot be deleted")]
    TendersAttached { load_id: String, tenders: u64 },

    // Storage errors
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    // Serialization errors
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    // Event delivery errors (never surfaced from lifecycle operations)
    #[error("Event emission failed: {0}")]
    Emit(String),

    // Authentication errors
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
}

/// Result type alias for BrokerError
pub type Result<T> = std::result::Result<T, BrokerError>;

/// Coarse classification used by callers that map errors onto a transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    InvalidInput,
    InvalidState,
    Unauthorized,
    StorageFault,
}

impl BrokerError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        BrokerError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        BrokerError::InvalidInput(message.into())
    }

    pub fn invalid_state(
        message: impl Into<String>,
        required: LoadStatus,
        actual: LoadStatus,
    ) -> Self {
        BrokerError::InvalidState {
            message: message.into(),
            required,
            actual,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            BrokerError::NotFound { .. } => ErrorKind::NotFound,
            BrokerError::InvalidInput(_) => ErrorKind::InvalidInput,
            BrokerError::InvalidState { .. }
            | BrokerError::InvalidTransition { .. }
            | BrokerError::TendersAttached { .. } => ErrorKind::InvalidState,
            BrokerError::Unauthorized(_) => ErrorKind::Unauthorized,
            BrokerError::Storage(_)
            | BrokerError::Database(_)
            | BrokerError::Migration(_)
            | BrokerError::Config(_)
            | BrokerError::Json(_)
            | BrokerError::Emit(_) => ErrorKind::StorageFault,
        }
    }

    /// HTTP status code a thin transport layer should answer with.
    pub fn status_code(&self) -> u16 {
        match self.kind() {
            ErrorKind::NotFound => 404,
            ErrorKind::InvalidInput | ErrorKind::InvalidState => 400,
            ErrorKind::Unauthorized => 401,
            ErrorKind::StorageFault => 500,
        }
    }

    /// Only storage faults are worth retrying, and the retry belongs to the caller.
    pub fn is_retryable(&self) -> bool {
        matches!(self, BrokerError::Storage(_) | BrokerError::Database(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_code_mapping() {
        assert_eq!(BrokerError::not_found("Load", "abc").status_code(), 404);
        assert_eq!(BrokerError::invalid_input("weight").status_code(), 400);
        assert_eq!(
            BrokerError::invalid_state("nope", LoadStatus::Created, LoadStatus::Quoted)
                .status_code(),
            400
        );
        assert_eq!(
            BrokerError::Unauthorized("missing token".into()).status_code(),
            401
        );
        assert_eq!(BrokerError::Storage("down".into()).status_code(), 500);
    }

    #[test]
    fn test_invalid_state_names_required_status() {
        let err = BrokerError::invalid_state(
            "Quote can only be requested for created loads",
            LoadStatus::Created,
            LoadStatus::Tendered,
        );
        let msg = err.to_string();
        assert!(msg.contains("required: created"));
        assert!(msg.contains("actual: tendered"));
    }

    #[test]
    fn test_only_storage_faults_are_retryable() {
        assert!(BrokerError::Storage("timeout".into()).is_retryable());
        assert!(!BrokerError::not_found("Carrier", "C9").is_retryable());
        assert!(!BrokerError::invalid_input("price").is_retryable());
    }

    #[test]
    fn test_source_errors_classify_as_faults() {
        let json = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = BrokerError::from(json);
        assert_eq!(err.kind(), ErrorKind::StorageFault);
        assert!(!err.is_retryable());

        let emit = BrokerError::Emit("sink offline".into());
        assert_eq!(emit.status_code(), 500);
        assert!(!emit.is_retryable());
    }
}
