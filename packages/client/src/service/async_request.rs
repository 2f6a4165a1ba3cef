//! Requests as fan-out workers

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use super::Service;
use crate::async_job::{AsyncDoer, AsyncJob};
use crate::error::{Error, Result};
use crate::http::{HttpRequest, HttpResponse};
use crate::responder::Responder;

/// One request of a fan-out, bound to its own child service and responder
pub struct AsyncRequest {
    service: Service,
    request: Result<HttpRequest>,
    index: usize,
}

impl AsyncRequest {
    /// The prepared request, or the error building it
    pub fn request(&self) -> std::result::Result<&HttpRequest, &Error> {
        self.request.as_ref()
    }

    /// The responder this request decodes with
    pub fn responder(&self) -> &Arc<dyn Responder> {
        &self.service.responder
    }
}

impl AsyncDoer for AsyncRequest {
    type Output = AsyncResponse;

    fn prepare(&mut self, index: usize) {
        self.index = index;
    }

    fn execute(&mut self) -> AsyncResponse {
        let outcome = match &self.request {
            Ok(request) => self.service.do_request(request.clone()),
            Err(e) => Err(e.clone()),
        };
        let (response, error) = match outcome {
            Ok(response) => (Some(response), None),
            Err(e) => (self.service.responder.response(), Some(e)),
        };
        AsyncResponse {
            index: self.index,
            responder: Arc::clone(&self.service.responder),
            response,
            error,
        }
    }

    fn stop_signal(&self) -> Option<String> {
        None
    }
}

impl fmt::Debug for AsyncRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsyncRequest")
            .field("index", &self.index)
            .field("request", &self.request)
            .finish_non_exhaustive()
    }
}

/// Outcome of one [`AsyncRequest`]
#[derive(Clone)]
pub struct AsyncResponse {
    index: usize,
    responder: Arc<dyn Responder>,
    response: Option<HttpResponse>,
    error: Option<Error>,
}

impl AsyncResponse {
    /// Position of the originating request in the fan-out
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    /// The raw response, if one was received
    #[inline]
    pub fn response(&self) -> Option<&HttpResponse> {
        self.response.as_ref()
    }

    /// Transport, build or decode error
    #[inline]
    pub fn error(&self) -> Option<&Error> {
        self.error.as_ref()
    }

    #[inline]
    pub fn responder(&self) -> &Arc<dyn Responder> {
        &self.responder
    }

    /// The decoded success value, if the responder produced a `T`
    pub fn success<T: Any>(&self) -> Option<T> {
        self.responder
            .success_any()
            .and_then(|value| value.downcast::<T>().ok())
            .map(|value| *value)
    }

    /// The decoded failure value, if the responder produced a `T`
    pub fn failure<T: Any>(&self) -> Option<T> {
        self.responder
            .failure_any()
            .and_then(|value| value.downcast::<T>().ok())
            .map(|value| *value)
    }
}

impl fmt::Debug for AsyncResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsyncResponse")
            .field("index", &self.index)
            .field("status", &self.response.as_ref().map(HttpResponse::status))
            .field("error", &self.error)
            .finish_non_exhaustive()
    }
}

impl Service {
    /// A fan-out worker for this service's request.
    ///
    /// The worker runs on a child of this service, so its responder is its
    /// own; the request is built now and any build error is reported when the
    /// worker executes.
    pub fn async_request(&self) -> AsyncRequest {
        let service = self.child();
        let request = service.request();
        AsyncRequest {
            service,
            request,
            index: 0,
        }
    }

    /// Like [`async_request`](Self::async_request) with `responder` in place
    /// of this service's
    pub fn async_request_with(&self, responder: Arc<dyn Responder>) -> AsyncRequest {
        let service = self.clone().responder(responder);
        let request = service.request();
        AsyncRequest {
            service,
            request,
            index: 0,
        }
    }

    /// Send every request concurrently and collect all responses in arrival
    /// order
    pub fn do_async(&self, requests: Vec<AsyncRequest>) -> Vec<AsyncResponse> {
        self.do_async_until(requests, 0)
    }

    /// Send every request concurrently and stop collecting after `target`
    /// responses; 0 means all of them
    pub fn do_async_until(&self, requests: Vec<AsyncRequest>, target: usize) -> Vec<AsyncResponse> {
        tracing::debug!(target: "meteor::service", requests = requests.len(), limit = target, "fan-out");
        AsyncJob::with_target(requests, target).run()
    }
}
