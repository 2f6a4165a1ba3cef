//! Fluent request builder
//!
//! A [`Service`] accumulates everything needed for one kind of request: the
//! transport, method, URL, headers, body and responder. Derive variants of a
//! configured service with [`Service::child`]; each child shares the transport
//! and configuration but gets a fresh responder, so concurrent children never
//! see each other's results.
//!
//! ```no_run
//! use meteor_client::service::Service;
//! # #[derive(Clone, Default, Debug, serde::Deserialize)] struct Repo { name: String }
//! # #[derive(Clone, Default, Debug, serde::Deserialize)] struct ApiError { message: String }
//!
//! let api = Service::new().base("http://api.example.com/v1");
//! let repos = api
//!     .child()
//!     .get(&["repos", "meteor"])
//!     .json_responder(Repo::default(), ApiError::default());
//! let response = repos.receive()?;
//! # Ok::<(), meteor_client::Error>(())
//! ```

use std::fmt;
use std::sync::Arc;

use http::{HeaderMap, Method};

use crate::body::BodyProvider;
use crate::error::Error;
use crate::responder::{GenericResponder, Responder};
use crate::transport::{DefaultTransport, Doer};

mod async_request;
mod body;
mod execution;
mod headers;
mod paths;
mod responders;

pub use async_request::{AsyncRequest, AsyncResponse};

/// HTTP request builder and sender
#[derive(Clone)]
#[must_use = "services do nothing until a request is built or received"]
pub struct Service {
    transport: Arc<dyn Doer>,
    method: Method,
    raw_url: String,
    headers: HeaderMap,
    body_provider: Option<Arc<dyn BodyProvider>>,
    responder: Arc<dyn Responder>,
    /// Builder input that failed to encode; surfaced by `request()`
    deferred_error: Option<Error>,
}

impl Service {
    /// A service on the process-wide transport: `GET`, no URL, no headers,
    /// generic responder
    pub fn new() -> Self {
        Self::with_transport(Arc::new(DefaultTransport))
    }

    /// A service on the given transport
    pub fn with_transport(transport: Arc<dyn Doer>) -> Self {
        Self {
            transport,
            method: Method::GET,
            raw_url: String::new(),
            headers: HeaderMap::new(),
            body_provider: None,
            responder: Arc::new(GenericResponder::new()),
            deferred_error: None,
        }
    }

    /// A copy of this service with a fresh responder.
    ///
    /// Headers are copied; the transport and body provider are shared.
    pub fn child(&self) -> Self {
        Self {
            responder: self.responder.fresh(),
            ..self.clone()
        }
    }

    /// Reset everything except the transport
    pub fn reset(mut self) -> Self {
        self.method = Method::GET;
        self.raw_url.clear();
        self.headers.clear();
        self.body_provider = None;
        self.responder = Arc::new(GenericResponder::new());
        self.deferred_error = None;
        self
    }

    /// Use `transport` for requests
    pub fn doer(mut self, transport: Arc<dyn Doer>) -> Self {
        self.transport = transport;
        self
    }

    /// The transport requests go through
    #[inline]
    pub fn transport(&self) -> &Arc<dyn Doer> {
        &self.transport
    }

    #[inline]
    pub fn http_method(&self) -> &Method {
        &self.method
    }

    /// The URL as built so far
    #[inline]
    pub fn raw_url(&self) -> &str {
        &self.raw_url
    }

    #[inline]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// The responder of this service's current cycle
    #[inline]
    pub fn current_responder(&self) -> &Arc<dyn Responder> {
        &self.responder
    }
}

impl Default for Service {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Service")
            .field("method", &self.method)
            .field("raw_url", &self.raw_url)
            .field("headers", &self.headers)
            .field("body_provider", &self.body_provider)
            .field("responder", &self.responder)
            .field("deferred_error", &self.deferred_error)
            .finish_non_exhaustive()
    }
}
