//! Request body providers
//!
//! A [`BodyProvider`] hands the builder an encoded body and, optionally, the
//! Content-Type that goes with it. The responders and the async engine never
//! care which provider produced a request body.

use std::fmt;

use bytes::Bytes;

use crate::error::Result;

pub mod form;
pub mod json;

pub use form::FormBodyProvider;
pub use json::JsonBodyProvider;

pub const JPEG_CONTENT_TYPE: &str = "image/jpeg";
pub const PNG_CONTENT_TYPE: &str = "image/png";
pub const GIF_CONTENT_TYPE: &str = "image/gif";
pub const TEXT_CONTENT_TYPE: &str = "text/plain";
pub const JSON_CONTENT_TYPE: &str = "application/json";
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";
pub const OCTET_STREAM_CONTENT_TYPE: &str = "application/octet-stream";

/// Provides body content for request attachment
pub trait BodyProvider: Send + Sync + fmt::Debug {
    /// Content-Type of the body, if the provider implies one
    fn content_type(&self) -> Option<&str>;

    /// The encoded body
    ///
    /// # Errors
    ///
    /// Returns a body error if the payload cannot be produced.
    fn body(&self) -> Result<Bytes>;
}

/// Provides raw bytes as the body, without a content type
#[derive(Debug, Clone)]
pub struct RawBodyProvider {
    body: Bytes,
}

impl RawBodyProvider {
    #[must_use]
    pub fn new(body: impl Into<Bytes>) -> Self {
        Self { body: body.into() }
    }
}

impl BodyProvider for RawBodyProvider {
    fn content_type(&self) -> Option<&str> {
        None
    }

    fn body(&self) -> Result<Bytes> {
        Ok(self.body.clone())
    }
}
