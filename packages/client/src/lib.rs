//! # Meteor client
//!
//! Fluent HTTP request building with pluggable responders and a concurrent
//! fan-out engine.
//!
//! ## Features
//!
//! - **Fluent [`Service`] builder**: base URL, path segments, method, headers
//!   and body providers, with child services for per-request variants
//! - **Responders** that classify a response and decode it exactly once into
//!   typed success or failure values (JSON, binary, bitset, protobuf)
//! - **Async fan-out** over any [`AsyncDoer`] with target counts and
//!   worker-raised stop signals
//! - **Pluggable transport**: any [`Doer`], with a hyper-based default
//!
//! ## Usage
//!
//! ```no_run
//! use meteor_client::prelude::*;
//! # #[derive(Clone, Default, Debug, serde::Deserialize)] struct Widget { id: u32 }
//! # #[derive(Clone, Default, Debug, serde::Deserialize)] struct ApiError { message: String }
//!
//! let responder = Arc::new(JsonResponder::<Widget, ApiError>::default());
//! let response = Service::new()
//!     .base("http://api.example.com/")
//!     .get(&["widgets", "7"])
//!     .responder(responder.clone())
//!     .receive()?;
//!
//! println!("{} -> {:?}", response.status(), responder.success());
//! # Ok::<(), meteor_client::Error>(())
//! ```

#![deny(unsafe_code)]
#![warn(clippy::all)]

pub mod async_job;
pub mod body;
pub mod config;
pub mod error;
pub mod http;
pub mod prelude;
pub mod responder;
pub mod service;
pub mod transport;

pub use crate::async_job::{AsyncDoer, AsyncJob, StopReason};
pub use crate::error::{Error, Result};
pub use crate::http::{HttpRequest, HttpResponse};
pub use crate::responder::Responder;
pub use crate::service::{AsyncRequest, AsyncResponse, Service};
pub use crate::transport::{DefaultTransport, Doer, HyperTransport};
