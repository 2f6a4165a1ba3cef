//! Transport configuration
//!
//! Settings consumed by [`HyperTransport`](crate::transport::HyperTransport):
//! deadlines, connection pool sizing, response size cap and the default
//! `User-Agent`.

use std::time::Duration;

use super::validation::{ConfigResult, ConfigValidator, ConfigurationError, Validator};

/// Default `User-Agent` sent when a request does not carry one
pub const DEFAULT_USER_AGENT: &str = concat!("meteor/", env!("CARGO_PKG_VERSION"));

/// HTTP transport configuration
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Whole-request deadline (connect, send, receive body)
    pub timeout: Duration,

    /// Connection timeout
    pub connect_timeout: Duration,

    /// Pool idle timeout
    pub pool_idle_timeout: Duration,

    /// Maximum number of idle connections per host
    pub pool_max_idle_per_host: usize,

    /// Largest response body read into memory
    pub max_response_bytes: usize,

    /// User agent string
    pub user_agent: String,

    /// Worker threads of the transport's private runtime
    pub worker_threads: usize,

    /// Trust the platform's certificate store in addition to the bundled roots
    pub use_system_certs: bool,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            pool_idle_timeout: Duration::from_secs(90),
            pool_max_idle_per_host: 32,
            max_response_bytes: 64 * 1024 * 1024,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            worker_threads: 2,
            use_system_certs: true,
        }
    }
}

impl TransportConfig {
    /// Set the whole-request deadline
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the connection timeout
    #[must_use]
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set the response body cap in bytes
    #[must_use]
    pub fn with_max_response_bytes(mut self, bytes: usize) -> Self {
        self.max_response_bytes = bytes;
        self
    }

    /// Enable or disable the platform's certificate store
    #[must_use]
    pub fn with_system_certs(mut self, enabled: bool) -> Self {
        self.use_system_certs = enabled;
        self
    }

    /// Set the default `User-Agent`
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

impl Validator for TransportConfig {
    fn validate(&self) -> ConfigResult<()> {
        ConfigValidator::validate_timeout(self.timeout, "timeout")?;
        ConfigValidator::validate_timeout(self.connect_timeout, "connect_timeout")?;
        ConfigValidator::validate_timeout(self.pool_idle_timeout, "pool_idle_timeout")?;
        ConfigValidator::validate_range(self.pool_max_idle_per_host, 1, 1000, "pool_max_idle_per_host")?;
        ConfigValidator::validate_buffer_size(self.max_response_bytes, "max_response_bytes")?;
        ConfigValidator::validate_range(self.worker_threads, 1, 512, "worker_threads")?;

        if self.user_agent.is_empty() {
            return Err(ConfigurationError::InvalidParameter(
                "user_agent cannot be empty".to_string(),
            ));
        }
        if self.connect_timeout > self.timeout {
            return Err(ConfigurationError::Conflict(
                "connect_timeout exceeds timeout".to_string(),
            ));
        }

        Ok(())
    }
}
