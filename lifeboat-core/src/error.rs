//! Error types for the lifeboat workflow

use thiserror::Error;

/// Result type alias for lifeboat operations
pub type Result<T> = std::result::Result<T, LifeboatError>;

/// Main error type for the lifeboat workflow
#[derive(Error, Debug)]
pub enum LifeboatError {
    #[error("Data error: {0}")]
    DataError(String),

    #[error("Preprocessing error: {0}")]
    PreprocessingError(String),

    #[error("Training error: {0}")]
    TrainingError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Invalid shape: expected {expected}, got {actual}")]
    ShapeError { expected: String, actual: String },

    #[error("Feature not found: {0}")]
    FeatureNotFound(String),

    #[error("Model not fitted")]
    ModelNotFitted,

    #[error("Invalid parameter: {name} = {value}, {reason}")]
    InvalidParameter {
        name: String,
        value: String,
        reason: String,
    },
}

impl From<polars::error::PolarsError> for LifeboatError {
    fn from(err: polars::error::PolarsError) -> Self {
        LifeboatError::DataError(err.to_string())
    }
}

impl From<serde_json::Error> for LifeboatError {
    fn from(err: serde_json::Error) -> Self {
        LifeboatError::SerializationError(err.to_string())
    }
}

impl From<sqlx::Error> for LifeboatError {
    fn from(err: sqlx::Error) -> Self {
        LifeboatError::DatabaseError(err.to_string())
    }
}

impl From<toml::de::Error> for LifeboatError {
    fn from(err: toml::de::Error) -> Self {
        LifeboatError::ConfigError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = LifeboatError::FeatureNotFound("Cabin".to_string());
        assert_eq!(err.to_string(), "Feature not found: Cabin");
    }

    #[test]
    fn test_invalid_parameter_display() {
        let err = LifeboatError::InvalidParameter {
            name: "acc-threshold".to_string(),
            value: "1.5".to_string(),
            reason: "must be between 0 and 1".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid parameter: acc-threshold = 1.5, must be between 0 and 1"
        );
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: LifeboatError = io_err.into();
        assert!(matches!(err, LifeboatError::IoError(_)));
    }
}
