//! Error types for fixture proxy operations

use thiserror::Error;

/// Main error type for fixture proxy operations
#[derive(Debug, Error)]
pub enum FixtureError {
    /// Network-related errors (binding, serving)
    #[error("Network error: {0}")]
    Network(String),

    /// Certificate authority errors
    #[error("Certificate error: {0}")]
    Certificate(String),

    /// Invalid configuration or route definitions
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl FixtureError {
    /// Whether the error came from user-supplied configuration rather than the runtime
    pub fn is_configuration(&self) -> bool {
        matches!(self, FixtureError::Configuration(_) | FixtureError::Json(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = FixtureError::Configuration("bad status 999".to_string());
        assert_eq!(err.to_string(), "Configuration error: bad status 999");
        assert!(err.is_configuration());

        let io = FixtureError::from(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        assert!(io.to_string().starts_with("I/O error"));
        assert!(!io.is_configuration());
    }
}
