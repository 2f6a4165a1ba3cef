//! Configuration
//!
//! Transport settings and the validation helpers they are checked with.
//! Everything is built in code; nothing is read from files or the environment.

pub mod transport;
pub mod validation;

pub use transport::{DEFAULT_USER_AGENT, TransportConfig};
pub use validation::{ConfigResult, ConfigValidator, ConfigurationError, Validator};
