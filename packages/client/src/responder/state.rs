//! Per-cycle responder state
//!
//! Every typed responder variant owns one [`Cycle`]: the classification
//! predicate, the initial targets, and the recorded exchange behind a
//! reader/writer lock. Accessors take the read lock; recording an exchange
//! and decoding it take the write lock, so a decode never overlaps a read or
//! another decode.

use std::fmt;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use bytes::Bytes;
use http::StatusCode;

use super::target::Target;
use crate::error::{Error, Kind, NoResponse, Result};
use crate::http::{HttpRequest, HttpResponse, StatusPredicate, default_predicate};

/// What one request/response cycle recorded
pub(crate) struct Exchange<S, F> {
    pub(crate) request: Option<HttpRequest>,
    pub(crate) response: Option<HttpResponse>,
    pub(crate) transport_error: Option<Error>,
    pub(crate) decode_error: Option<Error>,
    pub(crate) success: Target<S>,
    pub(crate) failure: Target<F>,
    pub(crate) decoded: bool,
}

impl<S, F> Exchange<S, F> {
    pub(crate) fn error(&self) -> Option<Error> {
        self.transport_error
            .as_ref()
            .or(self.decode_error.as_ref())
            .cloned()
    }

    pub(crate) fn outcome(&self) -> Result<HttpResponse> {
        if let Some(e) = self.error() {
            return Err(e);
        }
        self.response
            .clone()
            .ok_or_else(|| Error::new(Kind::Request).with(NoResponse))
    }
}

pub(crate) struct Cycle<S, F> {
    predicate: StatusPredicate,
    initial_success: Target<S>,
    initial_failure: Target<F>,
    state: RwLock<Exchange<S, F>>,
}

impl<S: Clone, F: Clone> Cycle<S, F> {
    pub(crate) fn new(success: Target<S>, failure: Target<F>) -> Self {
        Self::with_predicate(success, failure, default_predicate())
    }

    pub(crate) fn with_predicate(
        success: Target<S>,
        failure: Target<F>,
        predicate: StatusPredicate,
    ) -> Self {
        let state = RwLock::new(Exchange {
            request: None,
            response: None,
            transport_error: None,
            decode_error: None,
            success: success.clone(),
            failure: failure.clone(),
            decoded: false,
        });
        Self {
            predicate,
            initial_success: success,
            initial_failure: failure,
            state,
        }
    }

    /// Same predicate and initial targets, nothing recorded
    pub(crate) fn fresh(&self) -> Self {
        Self::with_predicate(
            self.initial_success.clone(),
            self.initial_failure.clone(),
            self.predicate.clone(),
        )
    }

    /// Replace the predicate, keeping the targets
    pub(crate) fn predicate(self, predicate: StatusPredicate) -> Self {
        Self::with_predicate(self.initial_success, self.initial_failure, predicate)
    }

    /// Record an exchange; re-arms decode and resets the targets
    pub(crate) fn record(&self, request: Option<HttpRequest>, outcome: Result<HttpResponse>) {
        let mut state = self.write();
        let (response, transport_error) = match outcome {
            Ok(response) => (Some(response), None),
            Err(e) => (None, Some(e)),
        };
        state.request = request;
        state.response = response;
        state.transport_error = transport_error;
        state.decode_error = None;
        state.success = self.initial_success.clone();
        state.failure = self.initial_failure.clone();
        state.decoded = false;
    }

    /// Run `decode` at most once for the recorded response.
    ///
    /// `decode` receives the classification and both targets; its error is
    /// stored as the decode error. Without a response nothing is decoded.
    pub(crate) fn decode_once<D>(&self, decode: D) -> Result<HttpResponse>
    where
        D: FnOnce(bool, &Bytes, &mut Target<S>, &mut Target<F>) -> Result<()>,
    {
        let mut guard = self.write();
        let state = &mut *guard;

        if !state.decoded {
            if let Some(response) = state.response.as_ref() {
                let ok = (self.predicate)(response.status(), response);
                if let Err(e) = decode(ok, response.body(), &mut state.success, &mut state.failure) {
                    state.decode_error = Some(e);
                }
            }
            state.decoded = true;
        }

        state.outcome()
    }

    #[inline]
    pub(crate) fn is_ok(&self, status: StatusCode, response: &HttpResponse) -> bool {
        (self.predicate)(status, response)
    }

    pub(crate) fn read(&self) -> RwLockReadGuard<'_, Exchange<S, F>> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Exchange<S, F>> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn success(&self) -> Option<S> {
        self.read().success.value().cloned()
    }

    pub(crate) fn failure(&self) -> Option<F> {
        self.read().failure.value().cloned()
    }

    pub(crate) fn success_raw(&self) -> Option<Bytes> {
        self.read().success.raw().cloned()
    }

    pub(crate) fn failure_raw(&self) -> Option<Bytes> {
        self.read().failure.raw().cloned()
    }
}

impl<S: fmt::Debug, F: fmt::Debug> fmt::Debug for Cycle<S, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut f = f.debug_struct("Cycle");
        match self.state.try_read() {
            Ok(state) => {
                f.field("status", &state.response.as_ref().map(HttpResponse::status))
                    .field("decoded", &state.decoded)
                    .field("success", &state.success)
                    .field("failure", &state.failure)
                    .field("error", &state.error());
            }
            Err(_) => {
                f.field("state", &"<locked>");
            }
        }
        f.finish()
    }
}
