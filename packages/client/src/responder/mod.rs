//! Responder strategies
//!
//! A [`Responder`] governs one request/response cycle: it records the
//! exchange, classifies the response with its status predicate, decodes the
//! body into the success or the failure target exactly once, and exposes the
//! results to any number of concurrent readers.
//!
//! Variants:
//!
//! * [`GenericResponder`]: passthrough, no decode
//! * [`JsonResponder`]: JSON into typed success/failure targets
//! * [`BinaryResponder`]: whole body as bytes on success, JSON failure
//! * [`BitsetResponder`]: serialized bitset on success, JSON failure
//! * [`ProtobufResponder`]: protobuf into typed success/failure targets

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use http::StatusCode;

use crate::error::{Error, Result};
use crate::http::{HttpRequest, HttpResponse};

pub mod binary;
pub mod bitset;
pub(crate) mod decode;
pub mod generic;
pub mod json;
pub mod protobuf;
pub(crate) mod state;
pub mod target;

pub use binary::BinaryResponder;
pub use bitset::{BitSet, BitSetError, BitsetResponder};
pub use generic::GenericResponder;
pub use json::JsonResponder;
pub use protobuf::ProtobufResponder;
pub use target::{SharedSink, Target};

/// Classifies and decodes the response of one request/response cycle.
///
/// All methods take `&self`; implementations guard their state so that
/// accessors may run concurrently with each other while recording and
/// decoding are exclusive.
pub trait Responder: Send + Sync + fmt::Debug {
    /// Record the exchange and return the responder for chaining into
    /// [`do_response`](Responder::do_response).
    fn respond(&self, request: Option<HttpRequest>, outcome: Result<HttpResponse>) -> &dyn Responder;

    /// Classify and decode the recorded response, at most once.
    ///
    /// # Errors
    ///
    /// Returns the recorded transport error, or the decode error if the body
    /// could not be decoded into its target. Either way the raw response stays
    /// available through [`response`](Responder::response).
    fn do_response(&self) -> Result<HttpResponse>;

    /// The recorded response
    fn response(&self) -> Option<HttpResponse>;

    /// The recorded request
    fn request(&self) -> Option<HttpRequest>;

    /// The transport or decode error, if any
    fn error(&self) -> Option<Error>;

    /// The decoded success value, type-erased
    fn success_any(&self) -> Option<Box<dyn Any + Send>>;

    /// The decoded failure value, type-erased
    fn failure_any(&self) -> Option<Box<dyn Any + Send>>;

    /// The classification predicate
    fn is_ok(&self, status: StatusCode, response: &HttpResponse) -> bool;

    /// A responder with the same configuration and nothing recorded
    fn fresh(&self) -> Arc<dyn Responder>;

    /// Downcast support for holders of an erased responder
    fn as_any(&self) -> &dyn Any;
}

#[inline]
pub(crate) fn erase<T: Any + Send>(value: Option<T>) -> Option<Box<dyn Any + Send>> {
    value.map(|value| Box::new(value) as Box<dyn Any + Send>)
}
