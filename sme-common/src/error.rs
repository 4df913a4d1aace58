//! Error types for the SME allotment estimator.

use thiserror::Error;

use crate::validation::ValidationError;

/// Result type alias using the shared error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while setting up the estimator.
///
/// Estimation itself never fails; these only surface from service
/// construction.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration failed validation
    #[error("Invalid configuration: {0}")]
    Validation(#[from] ValidationError),

    /// External service error
    #[error("External service error: {0}")]
    External(String),
}

impl Error {
    /// Check if this error comes from configuration validation.
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_config() {
        assert!(Error::Validation(ValidationError::Conflict {
            reason: "x".into()
        })
        .is_config());
        assert!(!Error::External("down".into()).is_config());
    }

    #[test]
    fn test_validation_message() {
        let err: Error = ValidationError::Conflict {
            reason: "min_lots exceeds max_lots".into(),
        }
        .into();
        assert!(err.to_string().starts_with("Invalid configuration: "));
        assert!(err.to_string().contains("min_lots exceeds max_lots"));
    }
}
