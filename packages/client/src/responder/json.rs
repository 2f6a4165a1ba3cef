use std::any::Any;
use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use http::StatusCode;
use serde::de::DeserializeOwned;

use super::decode::decode_json;
use super::state::Cycle;
use super::target::Target;
use super::{Responder, erase};
use crate::error::{Error, Result};
use crate::http::{HttpRequest, HttpResponse};

/// Decodes JSON bodies into a typed success or failure value.
///
/// The default predicate routes 2xx responses into the success target and
/// everything else into the failure target. An empty body leaves the target
/// at its initial value.
///
/// # Examples
///
/// ```no_run
/// use meteor_client::responder::{JsonResponder, Responder};
/// # #[derive(Clone, Default, serde::Deserialize, Debug)] struct Widget { id: u32 }
/// # #[derive(Clone, Default, serde::Deserialize, Debug)] struct ApiError { message: String }
///
/// let responder = JsonResponder::<Widget, ApiError>::default();
/// // service.responder(...).receive()
/// if let Some(widget) = responder.success() {
///     println!("widget {}", widget.id);
/// }
/// ```
pub struct JsonResponder<S, F = ()> {
    cycle: Cycle<S, F>,
}

impl<S, F> JsonResponder<S, F>
where
    S: DeserializeOwned + Clone + Send + Sync + 'static,
    F: DeserializeOwned + Clone + Send + Sync + 'static,
{
    /// Success and failure targets, both starting at the given values
    #[must_use]
    pub fn new(success: S, failure: F) -> Self {
        Self::with_targets(Target::Value(success), Target::Value(failure))
    }

    /// Arbitrary targets: skipped, typed, or byte sinks
    #[must_use]
    pub fn with_targets(success: Target<S>, failure: Target<F>) -> Self {
        Self {
            cycle: Cycle::new(success, failure),
        }
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

    /// The decoded success value, or its initial value before decode
    pub fn success(&self) -> Option<S> {
        self.cycle.success()
    }

    /// The decoded failure value, or its initial value before decode
    pub fn failure(&self) -> Option<F> {
        self.cycle.failure()
    }

    /// The success body when it failed to decode
    pub fn success_raw(&self) -> Option<Bytes> {
        self.cycle.success_raw()
    }

    /// The failure body when it failed to decode
    pub fn failure_raw(&self) -> Option<Bytes> {
        self.cycle.failure_raw()
    }
}

impl<S> JsonResponder<S, ()>
where
    S: DeserializeOwned + Clone + Send + Sync + 'static,
{
    /// Success target only; failure bodies are not decoded
    #[must_use]
    pub fn success_only(success: S) -> Self {
        Self::with_targets(Target::Value(success), Target::Skip)
    }
}

impl<S, F> Default for JsonResponder<S, F>
where
    S: DeserializeOwned + Clone + Default + Send + Sync + 'static,
    F: DeserializeOwned + Clone + Default + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new(S::default(), F::default())
    }
}

impl<S, F> Responder for JsonResponder<S, F>
where
    S: DeserializeOwned + Clone + fmt::Debug + Send + Sync + 'static,
    F: DeserializeOwned + Clone + fmt::Debug + Send + Sync + 'static,
{
    fn respond(&self, request: Option<HttpRequest>, outcome: Result<HttpResponse>) -> &dyn Responder {
        self.cycle.record(request, outcome);
        self
    }

    fn do_response(&self) -> Result<HttpResponse> {
        self.cycle.decode_once(|ok, body, success, failure| {
            if ok {
                decode_json(success, body)
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

impl<S: fmt::Debug, F: fmt::Debug> fmt::Debug for JsonResponder<S, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonResponder")
            .field("cycle", &self.cycle)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Clone, Default, PartialEq, Deserialize)]
    struct Widget {
        id: u32,
    }

    #[derive(Debug, Clone, Default, PartialEq, Deserialize)]
    struct ApiError {
        message: String,
    }

    fn exchange(responder: &dyn Responder, status: StatusCode, body: &'static str) -> Result<HttpResponse> {
        responder
            .respond(None, Ok(HttpResponse::new(status, body)))
            .do_response()
    }

    #[test]
    fn ok_response_decodes_success_only() {
        let responder = JsonResponder::<Widget, ApiError>::default();
        exchange(&responder, StatusCode::OK, r#"{"id":7}"#).expect("decodes");
        assert_eq!(responder.success(), Some(Widget { id: 7 }));
        assert_eq!(responder.failure(), Some(ApiError::default()));
        assert!(responder.error().is_none());
    }

    #[test]
    fn error_response_decodes_failure_only() {
        let responder = JsonResponder::<Widget, ApiError>::default();
        exchange(&responder, StatusCode::BAD_REQUEST, r#"{"message":"bad"}"#).expect("decodes");
        assert_eq!(responder.success(), Some(Widget::default()));
        assert_eq!(
            responder.failure(),
            Some(ApiError {
                message: "bad".into()
            })
        );
    }

    #[test]
    fn custom_predicate_reroutes_classification() {
        let responder = JsonResponder::<Widget, ApiError>::default()
            .with_predicate(|status, _| status == StatusCode::NOT_FOUND);
        exchange(&responder, StatusCode::NOT_FOUND, r#"{"id":3}"#).expect("decodes");
        assert_eq!(responder.success(), Some(Widget { id: 3 }));
    }

    #[test]
    fn decode_runs_once_per_recorded_response() {
        let responder = JsonResponder::<Widget, ApiError>::default();
        let first = exchange(&responder, StatusCode::OK, r#"{"id":"x"}"#).expect_err("bad json");
        assert!(first.is_decode());
        // the second call reports the stored outcome without decoding again
        let second = responder.do_response().expect_err("stored");
        assert!(second.is_decode());
        assert!(responder.success_raw().is_some());
    }

    #[test]
    fn respond_resets_targets() {
        let responder = JsonResponder::<Widget, ApiError>::default();
        exchange(&responder, StatusCode::OK, r#"{"id":1}"#).expect("decodes");
        exchange(&responder, StatusCode::NO_CONTENT, "").expect("empty body");
        assert_eq!(responder.success(), Some(Widget::default()));
    }

    #[test]
    fn fresh_copy_has_nothing_recorded() {
        let responder = JsonResponder::<Widget, ApiError>::default();
        exchange(&responder, StatusCode::OK, r#"{"id":9}"#).expect("decodes");
        let copy = responder.fresh();
        assert!(copy.response().is_none());
        let copy = copy
            .as_any()
            .downcast_ref::<JsonResponder<Widget, ApiError>>()
            .expect("same variant");
        assert_eq!(copy.success(), Some(Widget::default()));
    }

    #[test]
    fn success_only_skips_failure_bodies() {
        let responder = JsonResponder::success_only(Widget::default());
        exchange(&responder, StatusCode::INTERNAL_SERVER_ERROR, "<html>oops</html>")
            .expect("failure target skipped");
        assert_eq!(responder.failure(), None);
    }
}
