use std::any::Any;
use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use http::StatusCode;
use serde::de::DeserializeOwned;

use super::decode::{capture_bytes, decode_json};
use super::state::Cycle;
use super::target::{SharedSink, Target};
use super::{Responder, erase};
use crate::error::{Error, Result};
use crate::http::{HttpRequest, HttpResponse};

/// Keeps the whole body of a successful response as bytes.
///
/// Non-ok responses are JSON-decoded into the failure target when one is
/// configured, since error payloads of binary endpoints are usually JSON.
pub struct BinaryResponder<F = ()> {
    cycle: Cycle<Bytes, F>,
}

impl BinaryResponder<()> {
    /// Success bytes only; failure bodies are not decoded
    #[must_use]
    pub fn new() -> Self {
        Self {
            cycle: Cycle::new(Target::Value(Bytes::new()), Target::Skip),
        }
    }
}

impl Default for BinaryResponder<()> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F> BinaryResponder<F>
where
    F: DeserializeOwned + Clone + Send + Sync + 'static,
{
    /// Success bytes plus a JSON failure target
    #[must_use]
    pub fn with_failure(failure: F) -> Self {
        Self::with_targets(Target::Value(Bytes::new()), Target::Value(failure))
    }

    /// Arbitrary targets
    #[must_use]
    pub fn with_targets(success: Target<Bytes>, failure: Target<F>) -> Self {
        Self {
            cycle: Cycle::new(success, failure),
        }
    }

    /// Stream successful bodies into `sink` instead of keeping them
    #[must_use]
    pub fn with_success_sink(sink: SharedSink, failure: Target<F>) -> Self {
        Self::with_targets(Target::Sink(sink), failure)
    }

    /// Override the classification predicate
    #[must_use]
    pub fn with_predicate<P>(self, predicate: P) -> Self
    where
        P: Fn(StatusCode, &HttpResponse) -> bool + Send + Sync + 'static,
    {
        Self {
            cycle: self.cycle.predicate(Arc::new(predicate)),
        }
    }

    /// The body of the last successful response
    pub fn success(&self) -> Option<Bytes> {
        self.cycle.success()
    }

    pub fn failure(&self) -> Option<F> {
        self.cycle.failure()
    }

    pub fn failure_raw(&self) -> Option<Bytes> {
        self.cycle.failure_raw()
    }
}

impl<F> Responder for BinaryResponder<F>
where
    F: DeserializeOwned + Clone + fmt::Debug + Send + Sync + 'static,
{
    fn respond(&self, request: Option<HttpRequest>, outcome: Result<HttpResponse>) -> &dyn Responder {
        self.cycle.record(request, outcome);
        self
    }

    fn do_response(&self) -> Result<HttpResponse> {
        self.cycle.decode_once(|ok, body, success, failure| {
            if ok {
                capture_bytes(success, body)
            } else {
                decode_json(failure, body)
            }
        })
    }

    fn response(&self) -> Option<HttpResponse> {
        self.cycle.read().response.clone()
    }

    fn request(&self) -> Option<HttpRequest> {
        self.cycle.read().request.clone()
    }

    fn error(&self) -> Option<Error> {
        self.cycle.read().error()
    }

    fn success_any(&self) -> Option<Box<dyn Any + Send>> {
        erase(self.success())
    }

    fn failure_any(&self) -> Option<Box<dyn Any + Send>> {
        erase(self.failure())
    }

    fn is_ok(&self, status: StatusCode, response: &HttpResponse) -> bool {
        self.cycle.is_ok(status, response)
    }

    fn fresh(&self) -> Arc<dyn Responder> {
        Arc::new(Self {
            cycle: self.cycle.fresh(),
        })
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl<F: fmt::Debug> fmt::Debug for BinaryResponder<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BinaryResponder")
            .field("cycle", &self.cycle)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Clone, Default, PartialEq, Deserialize)]
    struct ApiError {
        message: String,
    }

    #[test]
    fn ok_body_is_kept_verbatim() {
        let responder = BinaryResponder::new();
        responder
            .respond(None, Ok(HttpResponse::new(StatusCode::OK, "abc")))
            .do_response()
            .expect("bytes never fail");
        assert_eq!(responder.success(), Some(Bytes::from_static(b"abc")));
    }

    #[test]
    fn failure_body_is_json_decoded() {
        let responder = BinaryResponder::with_failure(ApiError::default());
        responder
            .respond(
                None,
                Ok(HttpResponse::new(StatusCode::FORBIDDEN, r#"{"message":"no"}"#)),
            )
            .do_response()
            .expect("decodes");
        assert_eq!(responder.failure().map(|e| e.message), Some("no".to_owned()));
        assert_eq!(responder.success(), Some(Bytes::new()));
    }

    #[test]
    fn success_sink_receives_body() {
        let sink = Arc::new(Mutex::new(Vec::<u8>::new()));
        let responder = BinaryResponder::<ApiError>::with_success_sink(sink.clone(), Target::Skip);
        responder
            .respond(None, Ok(HttpResponse::new(StatusCode::OK, vec![0u8, 159, 146, 150])))
            .do_response()
            .expect("sink write");
        assert_eq!(sink.lock().expect("lock").as_slice(), &[0u8, 159, 146, 150]);
        assert_eq!(responder.success(), None);
    }
}
