//! Building and sending requests

use url::Url;

use super::Service;
use crate::error::{self, Result};
use crate::http::{HttpRequest, HttpResponse};

impl Service {
    /// Build the request described by this service.
    ///
    /// # Errors
    ///
    /// Returns a deferred body-encoding error, a builder error when the URL
    /// does not parse, or the body provider's error.
    pub fn request(&self) -> Result<HttpRequest> {
        if let Some(e) = &self.deferred_error {
            return Err(e.clone());
        }

        let url = Url::parse(&self.raw_url).map_err(|e| error::invalid_url(e, &self.raw_url))?;
        let mut request = HttpRequest::new(self.method.clone(), url).with_headers(self.headers.clone());
        if let Some(provider) = &self.body_provider {
            request = request.with_body(provider.body()?);
        }
        Ok(request)
    }

    /// Send `request` and let the responder classify and decode the result.
    ///
    /// Transport failures are recorded on the responder as well, so its
    /// accessors describe this exchange either way.
    ///
    /// # Errors
    ///
    /// Returns the transport error or the responder's decode error.
    pub fn do_request(&self, request: HttpRequest) -> Result<HttpResponse> {
        tracing::debug!(
            target: "meteor::service",
            method = %request.method(),
            url = %request.url(),
            "sending request"
        );
        let outcome = self.transport.execute(request.clone());
        if let Err(e) = &outcome {
            tracing::debug!(target: "meteor::service", "transport failed: {e}");
        }
        self.responder.respond(Some(request), outcome).do_response()
    }

    /// Build the request and send it; shorthand for
    /// [`request`](Self::request) then [`do_request`](Self::do_request).
    ///
    /// Decoded values are read from the responder afterwards.
    ///
    /// # Errors
    ///
    /// Returns any error from building, sending or decoding.
    pub fn receive(&self) -> Result<HttpResponse> {
        let request = self.request()?;
        self.do_request(request)
    }
}
