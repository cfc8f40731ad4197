//! Common error types for VapeLog

use thiserror::Error;

/// Common result type for VapeLog operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the VapeLog engine
///
/// "No data" is never an error: queries that find nothing return `Ok(None)`
/// or an empty collection. Everything below is a real failure.
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding or decoding error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested entity not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Entity references a parent that does not exist
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    /// Invalid user input or field value
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Internal error (corrupt row, unparseable stored value)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// True when the store could not complete a read or write.
    ///
    /// Front ends show a retry state for these and an empty state for
    /// `Ok(None)` results.
    pub fn is_storage_failure(&self) -> bool {
        matches!(self, Error::Database(_) | Error::Io(_) | Error::Internal(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_failure_classification() {
        let io = Error::Io(std::io::Error::new(std::io::ErrorKind::Other, "disk gone"));
        assert!(io.is_storage_failure());
        assert!(Error::Internal("bad timestamp".to_string()).is_storage_failure());
        assert!(Error::Database(sqlx::Error::RowNotFound).is_storage_failure());

        assert!(!Error::NotFound("product 7".to_string()).is_storage_failure());
        assert!(!Error::ConstraintViolation("session 3".to_string()).is_storage_failure());
        assert!(!Error::InvalidInput("awake = 11".to_string()).is_storage_failure());
    }

    #[test]
    fn test_error_messages() {
        let err = Error::NotFound("product 42".to_string());
        assert_eq!(err.to_string(), "Not found: product 42");

        let err = Error::ConstraintViolation("session references missing product 9".to_string());
        assert_eq!(
            err.to_string(),
            "Constraint violation: session references missing product 9"
        );
    }
}
