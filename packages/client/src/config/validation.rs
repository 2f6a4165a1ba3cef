//! Core Configuration Utilities
//!
//! Common configuration patterns and validation.

use std::time::Duration;

/// Configuration validation result type
pub type ConfigResult<T> = Result<T, ConfigurationError>;

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    #[error("Invalid timeout value: {0}")]
    InvalidTimeout(String),

    #[error("Invalid buffer size: {0}")]
    InvalidBufferSize(String),

    #[error("Invalid configuration parameter: {0}")]
    InvalidParameter(String),

    #[error("Configuration conflict: {0}")]
    Conflict(String),
}

/// Configuration validation trait
pub trait Validator {
    /// Validates the configuration settings
    ///
    /// # Errors
    ///
    /// Returns a `ConfigurationError` variant if any validation fails:
    /// - `InvalidTimeout` - if timeout values are zero or exceed limits
    /// - `InvalidBufferSize` - if buffer sizes are zero or exceed limits
    /// - `InvalidParameter` - if parameters are outside valid ranges
    /// - `Conflict` - if configuration settings conflict with each other
    fn validate(&self) -> ConfigResult<()>;
}

/// Common configuration validation utilities
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate timeout duration
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::InvalidTimeout` if:
    /// - The timeout duration is zero
    /// - The timeout duration exceeds 1 hour (3600 seconds)
    pub fn validate_timeout(timeout: Duration, name: &str) -> ConfigResult<()> {
        if timeout.is_zero() {
            return Err(ConfigurationError::InvalidTimeout(format!(
                "{name} cannot be zero"
            )));
        }

        if timeout.as_secs() > 3600 {
            return Err(ConfigurationError::InvalidTimeout(format!(
                "{name} cannot exceed 1 hour"
            )));
        }

        Ok(())
    }

    /// Validate buffer size
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::InvalidBufferSize` if:
    /// - The buffer size is zero
    /// - The buffer size exceeds 1GB
    pub fn validate_buffer_size(size: usize, name: &str) -> ConfigResult<()> {
        if size == 0 {
            return Err(ConfigurationError::InvalidBufferSize(format!(
                "{name} cannot be zero"
            )));
        }

        if size > 1024 * 1024 * 1024 {
            return Err(ConfigurationError::InvalidBufferSize(format!(
                "{name} cannot exceed 1GB"
            )));
        }

        Ok(())
    }

    /// Validate numeric range
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::InvalidParameter` if the value is outside
    /// the specified range [min, max] (inclusive).
    pub fn validate_range<T>(value: T, min: T, max: T, name: &str) -> ConfigResult<()>
    where
        T: PartialOrd + std::fmt::Display + Copy,
    {
        if value < min || value > max {
            return Err(ConfigurationError::InvalidParameter(format!(
                "{name} must be between {min} and {max}, got {value}"
            )));
        }

        Ok(())
    }
}
