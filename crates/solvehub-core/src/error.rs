//! Error types for SolveHub.

use thiserror::Error;

/// Result type alias using SolveHub's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for SolveHub operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation failed (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Exercise not found
    #[error("Exercise not found: {0}")]
    ExerciseNotFound(uuid::Uuid),

    /// Answer not found
    #[error("Answer not found: {0}")]
    AnswerNotFound(uuid::Uuid),

    /// User not found
    #[error("User not found: {0}")]
    UserNotFound(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Object storage operation failed
    #[error("Storage error: {0}")]
    Storage(String),

    /// HTTP/network request failed
    #[error("Request error: {0}")]
    Request(String),

    /// Authentication failed (missing, malformed, or expired token)
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Forbidden (authenticated but not authorized)
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// File I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Request(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_error_display_not_found() {
        let err = Error::NotFound("report 42".to_string());
        assert_eq!(err.to_string(), "Not found: report 42");
    }

    #[test]
    fn test_error_display_exercise_not_found() {
        let id = Uuid::nil();
        let err = Error::ExerciseNotFound(id);
        assert_eq!(err.to_string(), format!("Exercise not found: {}", id));
    }

    #[test]
    fn test_error_display_unauthorized() {
        let err = Error::Unauthorized("token expired".to_string());
        assert_eq!(err.to_string(), "Unauthorized: token expired");
    }

    #[test]
    fn test_error_display_forbidden() {
        let err = Error::Forbidden("admin role required".to_string());
        assert_eq!(err.to_string(), "Forbidden: admin role required");
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<i32>("not a number").unwrap_err();
        let err: Error = json_err.into();
        match err {
            Error::Serialization(msg) => assert!(!msg.is_empty()),
            _ => panic!("Expected Serialization error"),
        }
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<Error>();
        assert_sync::<Error>();
    }
}
