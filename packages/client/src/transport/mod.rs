//! Transport abstraction
//!
//! A [`Doer`] executes one prepared request and returns the buffered response
//! or the transport error. The core never looks past that contract, so any
//! HTTP client can be plugged in; [`HyperTransport`] is the bundled one.

use std::fmt;
use std::sync::{Arc, OnceLock};

use crate::config::TransportConfig;
use crate::error::Result;
use crate::http::{HttpRequest, HttpResponse};

pub mod hyper;
pub mod tls;

pub use self::hyper::HyperTransport;
pub use self::tls::HttpsConnector;

/// Executes HTTP requests.
///
/// Implementations block the calling thread until the response body has been
/// read. Closures with the matching signature are `Doer`s too, which is how
/// tests and middleware stacks usually provide one.
pub trait Doer: Send + Sync {
    /// Execute the request
    ///
    /// # Errors
    ///
    /// Returns an error when no response could be obtained: connection
    /// failures, timeouts, malformed URLs or oversized bodies.
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse>;
}

impl<F> Doer for F
where
    F: Fn(HttpRequest) -> Result<HttpResponse> + Send + Sync,
{
    #[inline]
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        self(request)
    }
}

/// Process-wide transport, created on first use
static GLOBAL_TRANSPORT: OnceLock<Arc<HyperTransport>> = OnceLock::new();

/// Get the global transport instance
///
/// # Errors
///
/// Returns an error if the transport's runtime could not be started. The
/// failure is not cached; the next call tries again.
pub fn global_transport() -> Result<Arc<HyperTransport>> {
    if let Some(transport) = GLOBAL_TRANSPORT.get() {
        return Ok(Arc::clone(transport));
    }

    let transport = Arc::new(HyperTransport::new(TransportConfig::default())?);
    // A concurrent initializer may have won; use whichever instance is stored
    Ok(Arc::clone(GLOBAL_TRANSPORT.get_or_init(|| transport)))
}

/// The transport a new [`Service`](crate::service::Service) starts with.
///
/// Defers to [`global_transport`] at execution time so that building a
/// service never fails.
#[derive(Clone, Copy, Default)]
pub struct DefaultTransport;

impl Doer for DefaultTransport {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        global_transport()?.execute(request)
    }
}

impl fmt::Debug for DefaultTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DefaultTransport")
    }
}
