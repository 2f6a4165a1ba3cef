use std::any::Any;
use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use http::StatusCode;
use prost::Message;

use super::decode::decode_with;
use super::state::Cycle;
use super::target::Target;
use super::{Responder, erase};
use crate::error::{self, Error, Result};
use crate::http::{HttpRequest, HttpResponse};

fn decode_message<T: Message + Default>(target: &mut Target<T>, body: &Bytes) -> Result<()> {
    decode_with(target, body, |bytes| T::decode(bytes).map_err(error::decode))
}

/// Decodes protobuf bodies into typed success or failure messages.
///
/// Same contract as [`JsonResponder`](super::JsonResponder), with `prost`
/// as the codec.
pub struct ProtobufResponder<S, F = ()> {
    cycle: Cycle<S, F>,
}

impl<S, F> ProtobufResponder<S, F>
where
    S: Message + Default + Clone + 'static,
    F: Message + Default + Clone + 'static,
{
    #[must_use]
    pub fn new(success: S, failure: F) -> Self {
        Self::with_targets(Target::Value(success), Target::Value(failure))
    }

    #[must_use]
    pub fn with_targets(success: Target<S>, failure: Target<F>) -> Self {
        Self {
            cycle: Cycle::new(success, failure),
        }
    }

    #[must_use]
    pub fn with_predicate<P>(self, predicate: P) -> Self
    where
        P: Fn(StatusCode, &HttpResponse) -> bool + Send + Sync + 'static,
    {
        Self {
            cycle: self.cycle.predicate(Arc::new(predicate)),
        }
    }

    pub fn success(&self) -> Option<S> {
        self.cycle.success()
    }

    pub fn failure(&self) -> Option<F> {
        self.cycle.failure()
    }

    pub fn success_raw(&self) -> Option<Bytes> {
        self.cycle.success_raw()
    }

    pub fn failure_raw(&self) -> Option<Bytes> {
        self.cycle.failure_raw()
    }
}

impl<S> ProtobufResponder<S, ()>
where
    S: Message + Default + Clone + 'static,
{
    /// Success message only; failure bodies are not decoded
    #[must_use]
    pub fn success_only(success: S) -> Self {
        Self::with_targets(Target::Value(success), Target::Skip)
    }
}

impl<S, F> Default for ProtobufResponder<S, F>
where
    S: Message + Default + Clone + 'static,
    F: Message + Default + Clone + 'static,
{
    fn default() -> Self {
        Self::new(S::default(), F::default())
    }
}

impl<S, F> Responder for ProtobufResponder<S, F>
where
    S: Message + Default + Clone + 'static,
    F: Message + Default + Clone + 'static,
{
    fn respond(&self, request: Option<HttpRequest>, outcome: Result<HttpResponse>) -> &dyn Responder {
        self.cycle.record(request, outcome);
        self
    }

    fn do_response(&self) -> Result<HttpResponse> {
        self.cycle.decode_once(|ok, body, success, failure| {
            if ok {
                decode_message(success, body)
            } else {
                decode_message(failure, body)
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

impl<S: fmt::Debug, F: fmt::Debug> fmt::Debug for ProtobufResponder<S, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProtobufResponder")
            .field("cycle", &self.cycle)
            .finish()
    }
}
