//! Error types and result aliases for the genflow library.
//!
//! This module defines the core error type [`GenflowError`] and the [`Result`] type alias
//! used throughout the library. None of these errors are recovered locally: a failure
//! aborts the generation in flight and propagates to whoever started it.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GenflowError {
    #[error("Authentication error: {0}")]
    AuthenticationError(String),

    #[error("Provider error: {0}")]
    ProviderError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Tool error: {0}")]
    ToolError(String),

    #[error("Model not supported: {0}")]
    ModelNotSupported(String),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl From<reqwest::Error> for GenflowError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            GenflowError::ProviderError(format!("request timed out: {}", err))
        } else {
            GenflowError::ProviderError(err.to_string())
        }
    }
}

pub type Result<T> = std::result::Result<T, GenflowError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authentication_error_display() {
        let err = GenflowError::AuthenticationError("missing API key".to_string());
        assert_eq!(err.to_string(), "Authentication error: missing API key");
    }

    #[test]
    fn test_provider_error_display() {
        let err = GenflowError::ProviderError("connection reset".to_string());
        assert_eq!(err.to_string(), "Provider error: connection reset");
    }

    #[test]
    fn test_validation_error_display() {
        let err = GenflowError::ValidationError("temperature out of range".to_string());
        assert_eq!(err.to_string(), "Validation error: temperature out of range");
    }

    #[test]
    fn test_model_not_supported_display() {
        let err = GenflowError::ModelNotSupported("o1".to_string());
        assert_eq!(err.to_string(), "Model not supported: o1");
    }

    #[test]
    fn test_serialization_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let err: GenflowError = json_err.into();

        match err {
            GenflowError::SerializationError(_) => {}
            _ => panic!("Expected SerializationError"),
        }
    }

    #[test]
    fn test_error_debug() {
        let err = GenflowError::ToolError("test".to_string());
        let debug_str = format!("{:?}", err);
        assert!(debug_str.contains("ToolError"));
    }
}
