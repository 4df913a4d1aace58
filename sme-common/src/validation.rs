//! Configuration validation.
//!
//! Rejects instrument constants that would make the engine divide by zero,
//! enumerate an empty lot range, or hang on the live fetch.

use thiserror::Error;

use crate::config::{
    Config, ModelConfig, ObservabilityConfig, PlannerConfig, SourceConfig,
    MAX_SOURCE_TIMEOUT_SECS,
};

/// Configuration validation error.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Configuration conflict: {reason}")]
    Conflict { reason: String },

    #[error("Multiple validation errors: {0:?}")]
    Multiple(Vec<ValidationError>),
}

impl ValidationError {
    fn invalid(field: &str, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Trait for validatable configuration sections.
pub trait Validate {
    /// Validate this configuration section.
    fn validate(&self) -> ValidationResult<()>;
}

/// Collapse a list of errors into one.
fn collect(mut errors: Vec<ValidationError>) -> ValidationResult<()> {
    if errors.is_empty() {
        Ok(())
    } else if errors.len() == 1 {
        Err(errors.remove(0))
    } else {
        Err(ValidationError::Multiple(errors))
    }
}

fn positive_finite(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

impl Validate for Config {
    fn validate(&self) -> ValidationResult<()> {
        let sections: [&dyn Validate; 4] = [
            &self.source,
            &self.model,
            &self.planner,
            &self.observability,
        ];

        let mut errors = Vec::new();
        for section in sections {
            match section.validate() {
                Ok(()) => {}
                Err(ValidationError::Multiple(inner)) => errors.extend(inner),
                Err(e) => errors.push(e),
            }
        }

        collect(errors)
    }
}

impl Validate for SourceConfig {
    fn validate(&self) -> ValidationResult<()> {
        let mut errors = Vec::new();

        if self.url.trim().is_empty() {
            errors.push(ValidationError::invalid("source.url", "must not be empty"));
        }
        if self.timeout_secs == 0 || self.timeout_secs > MAX_SOURCE_TIMEOUT_SECS {
            errors.push(ValidationError::invalid(
                "source.timeout_secs",
                format!("must be between 1 and {}", MAX_SOURCE_TIMEOUT_SECS),
            ));
        }
        if self.min_columns < 2 {
            errors.push(ValidationError::invalid(
                "source.min_columns",
                "rows need at least a name and a multiple",
            ));
        }

        collect(errors)
    }
}

impl Validate for ModelConfig {
    fn validate(&self) -> ValidationResult<()> {
        let mut errors = Vec::new();

        if !positive_finite(self.base_factor) {
            errors.push(ValidationError::invalid("model.base_factor", "must be > 0"));
        }
        if !positive_finite(self.fallback_divisor) {
            errors.push(ValidationError::invalid(
                "model.fallback_divisor",
                "must be > 0",
            ));
        }
        if !positive_finite(self.default_subscription) {
            errors.push(ValidationError::invalid(
                "model.default_subscription",
                "must be > 0",
            ));
        }

        collect(errors)
    }
}

impl Validate for PlannerConfig {
    fn validate(&self) -> ValidationResult<()> {
        let mut errors = Vec::new();

        if self.lot_price == 0 {
            errors.push(ValidationError::invalid("planner.lot_price", "must be > 0"));
        }
        if self.share_multiplier == 0 {
            errors.push(ValidationError::invalid(
                "planner.share_multiplier",
                "must be > 0",
            ));
        }
        if self.min_lots == 0 {
            errors.push(ValidationError::invalid("planner.min_lots", "must be >= 1"));
        }
        if self.min_lots > self.max_lots {
            errors.push(ValidationError::Conflict {
                reason: format!(
                    "planner.min_lots ({}) exceeds planner.max_lots ({})",
                    self.min_lots, self.max_lots
                ),
            });
        }

        collect(errors)
    }
}

impl Validate for ObservabilityConfig {
    fn validate(&self) -> ValidationResult<()> {
        let mut errors = Vec::new();

        let level = self.log_level.to_ascii_lowercase();
        if !["trace", "debug", "info", "warn", "error"].contains(&level.as_str()) {
            errors.push(ValidationError::invalid(
                "observability.log_level",
                format!("unknown level '{}'", self.log_level),
            ));
        }
        if !["json", "pretty"].contains(&self.log_format.as_str()) {
            errors.push(ValidationError::invalid(
                "observability.log_format",
                format!("unknown format '{}'", self.log_format),
            ));
        }

        collect(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_zero_lot_price_rejected() {
        let mut planner = PlannerConfig::default();
        planner.lot_price = 0;
        let err = planner.validate().unwrap_err();
        assert!(matches!(err, ValidationError::InvalidValue { ref field, .. } if field == "planner.lot_price"));
    }

    #[test]
    fn test_inverted_lot_range_is_conflict() {
        let mut planner = PlannerConfig::default();
        planner.min_lots = 30;
        assert!(matches!(
            planner.validate(),
            Err(ValidationError::Conflict { .. })
        ));
    }

    #[test]
    fn test_timeout_bounds() {
        let mut source = SourceConfig::default();
        source.timeout_secs = 11;
        assert!(source.validate().is_err());
        source.timeout_secs = 0;
        assert!(source.validate().is_err());
        source.timeout_secs = 10;
        assert!(source.validate().is_ok());
    }

    #[test]
    fn test_model_rejects_non_positive_constants() {
        let mut model = ModelConfig::default();
        model.base_factor = 0.0;
        model.default_subscription = f64::NAN;
        match model.validate() {
            Err(ValidationError::Multiple(errors)) => assert_eq!(errors.len(), 2),
            other => panic!("expected two errors, got {:?}", other),
        }
    }

    #[test]
    fn test_config_flattens_section_errors() {
        let mut config = Config::default();
        config.model.fallback_divisor = -1.0;
        config.planner.share_multiplier = 0;
        config.observability.log_format = "xml".into();

        match config.validate() {
            Err(ValidationError::Multiple(errors)) => assert_eq!(errors.len(), 3),
            other => panic!("expected flattened errors, got {:?}", other),
        }
    }
}
