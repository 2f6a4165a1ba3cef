pub mod classification;
pub mod constructors;
pub mod helpers;
pub mod types;

pub use constructors::*;
pub use helpers::{NoResponse, TimedOut};
pub use types::{Error, Kind, Result};

pub(crate) use constructors::BoxError;
