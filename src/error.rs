//! Error types for linkdrop.

use thiserror::Error;

/// Common error type for linkdrop.
#[derive(Error, Debug)]
pub enum LinkdropError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Persistence error that is not a plain I/O failure
    /// (corrupt record, exhausted name draws, ...).
    #[error("storage error: {0}")]
    Storage(String),

    /// Validation error for client input.
    #[error("validation error: {0}")]
    Validation(String),

    /// Resource not found.
    #[error("{0} not found")]
    NotFound(String),

    /// Page rendering error.
    #[error("template error: {0}")]
    Template(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl From<serde_json::Error> for LinkdropError {
    fn from(e: serde_json::Error) -> Self {
        LinkdropError::Storage(format!("record encoding: {e}"))
    }
}

impl From<minijinja::Error> for LinkdropError {
    fn from(e: minijinja::Error) -> Self {
        LinkdropError::Template(e.to_string())
    }
}

/// Result type alias for linkdrop operations.
pub type Result<T> = std::result::Result<T, LinkdropError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display() {
        let err = LinkdropError::Validation("file_too_large".to_string());
        assert_eq!(err.to_string(), "validation error: file_too_large");
    }

    #[test]
    fn test_not_found_error_display() {
        let err = LinkdropError::NotFound("record abc".to_string());
        assert_eq!(err.to_string(), "record abc not found");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only volume");
        let err: LinkdropError = io_err.into();
        assert!(matches!(err, LinkdropError::Io(_)));
        assert!(err.to_string().contains("read-only volume"));
    }

    #[test]
    fn test_json_error_becomes_storage() {
        let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: LinkdropError = json_err.into();
        assert!(matches!(err, LinkdropError::Storage(_)));
    }

    #[test]
    fn test_result_alias() {
        fn sample_ok() -> Result<u64> {
            Ok(42)
        }

        fn sample_err() -> Result<u64> {
            Err(LinkdropError::Config("bad port".to_string()))
        }

        assert_eq!(sample_ok().unwrap(), 42);
        assert!(sample_err().is_err());
    }
}
