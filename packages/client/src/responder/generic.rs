use std::any::Any;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use http::StatusCode;

use super::Responder;
use crate::error::{Error, Kind, NoResponse, Result};
use crate::http::{HttpRequest, HttpResponse, StatusPredicate, default_predicate};

#[derive(Default)]
struct Recorded {
    request: Option<HttpRequest>,
    response: Option<HttpResponse>,
    error: Option<Error>,
}

/// Passthrough responder.
///
/// Records the exchange and hands the raw response back untouched, for callers
/// that only want headers or want to forward the body themselves.
pub struct GenericResponder {
    predicate: StatusPredicate,
    state: RwLock<Recorded>,
}

impl GenericResponder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            predicate: default_predicate(),
            state: RwLock::new(Recorded::default()),
        }
    }
}

impl Default for GenericResponder {
    fn default() -> Self {
        Self::new()
    }
}

impl Responder for GenericResponder {
    fn respond(&self, request: Option<HttpRequest>, outcome: Result<HttpResponse>) -> &dyn Responder {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.request = request;
        match outcome {
            Ok(response) => {
                state.response = Some(response);
                state.error = None;
            }
            Err(e) => {
                state.response = None;
                state.error = Some(e);
            }
        }
        self
    }

    fn do_response(&self) -> Result<HttpResponse> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        if let Some(e) = state.error.clone() {
            return Err(e);
        }
        state
            .response
            .clone()
            .ok_or_else(|| Error::new(Kind::Request).with(NoResponse))
    }

    fn response(&self) -> Option<HttpResponse> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .response
            .clone()
    }

    fn request(&self) -> Option<HttpRequest> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .request
            .clone()
    }

    fn error(&self) -> Option<Error> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .error
            .clone()
    }

    fn success_any(&self) -> Option<Box<dyn Any + Send>> {
        None
    }

    fn failure_any(&self) -> Option<Box<dyn Any + Send>> {
        None
    }

    fn is_ok(&self, status: StatusCode, response: &HttpResponse) -> bool {
        (self.predicate)(status, response)
    }

    fn fresh(&self) -> Arc<dyn Responder> {
        Arc::new(GenericResponder {
            predicate: self.predicate.clone(),
            state: RwLock::new(Recorded::default()),
        })
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl fmt::Debug for GenericResponder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenericResponder")
            .field("has_response", &self.response().is_some())
            .field("error", &self.error())
            .finish()
    }
}
