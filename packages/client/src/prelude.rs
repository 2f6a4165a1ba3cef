//! Meteor prelude
//!
//! The types most callers need to build, send and decode requests.

pub use std::sync::Arc;

pub use ::http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode, Version};

pub use crate::async_job::{AsyncDoer, AsyncJob, StopReason};
pub use crate::body::{BodyProvider, FormBodyProvider, JsonBodyProvider, RawBodyProvider};
pub use crate::config::TransportConfig;
pub use crate::error::{Error, Result};
pub use crate::http::{HttpRequest, HttpResponse, StatusPredicate};
pub use crate::responder::{
    BinaryResponder, BitSet, BitsetResponder, GenericResponder, JsonResponder, ProtobufResponder,
    Responder, SharedSink, Target,
};
pub use crate::service::{AsyncRequest, AsyncResponse, Service};
pub use crate::transport::{DefaultTransport, Doer, HyperTransport};
