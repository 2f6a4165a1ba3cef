//! Meteor public API
//!
//! Fluent HTTP request building with pluggable responders and concurrent
//! fan-out. [`Meteor`] holds the transport and credentials shared by every
//! service of one API; [`service`] starts a standalone builder.
//!
//! ```no_run
//! use meteor::{Meteor, JsonResponder};
//! # #[derive(Clone, Default, Debug, serde::Deserialize)] struct Forecast { summary: String }
//!
//! let weather = Meteor::simple();
//! let forecast = std::sync::Arc::new(JsonResponder::<Forecast, ()>::default());
//! weather
//!     .common()
//!     .base("http://weather.example.com/api")
//!     .get(&["forecast", "today"])
//!     .responder(forecast.clone())
//!     .receive()?;
//! println!("{:?}", forecast.success());
//! # Ok::<(), meteor::Error>(())
//! ```

#![deny(unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]

pub mod client;

pub use crate::client::{Credentials, Meteor, USER_AGENT};

// Re-export the client surface
pub use meteor_client::async_job::{AsyncDoer, AsyncJob, StopReason};
pub use meteor_client::body::{BodyProvider, FormBodyProvider, JsonBodyProvider, RawBodyProvider};
pub use meteor_client::config::TransportConfig;
pub use meteor_client::error::{Error, Kind, Result};
pub use meteor_client::http::{HttpRequest, HttpResponse, StatusPredicate};
pub use meteor_client::responder::{
    BinaryResponder, BitSet, BitSetError, BitsetResponder, GenericResponder, JsonResponder,
    ProtobufResponder, Responder, SharedSink, Target,
};
pub use meteor_client::service::{AsyncRequest, AsyncResponse, Service};
pub use meteor_client::transport::{DefaultTransport, Doer, HyperTransport};
pub use meteor_client::prelude;

/// Start a standalone service on the process-wide transport
///
/// Shorthand for `Service::new()`
#[inline]
pub fn service() -> Service {
    Service::new()
}
