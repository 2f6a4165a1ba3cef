//! Request bodies

use std::sync::Arc;

use bytes::Bytes;
use serde::Serialize;

use super::Service;
use crate::body::{BodyProvider, FormBodyProvider, JsonBodyProvider, RawBodyProvider};
use crate::error::Error;

impl Service {
    /// Send `body` as is; the Content-Type header is left alone
    pub fn body(self, body: impl Into<Bytes>) -> Self {
        self.body_provider(Arc::new(RawBodyProvider::new(body)))
    }

    /// Take the body from `provider`, setting Content-Type when it names one
    pub fn body_provider(mut self, provider: Arc<dyn BodyProvider>) -> Self {
        let content_type = provider.content_type().map(str::to_owned);
        self.body_provider = Some(provider);
        self.deferred_error = None;
        match content_type {
            Some(content_type) => self.content_type(&content_type),
            None => self,
        }
    }

    /// JSON-encode `payload` as the body.
    ///
    /// An encoding failure does not break the chain; it is returned by
    /// [`request`](Self::request).
    pub fn body_json<T: Serialize + ?Sized>(self, payload: &T) -> Self {
        match JsonBodyProvider::new(payload) {
            Ok(provider) => self.body_provider(Arc::new(provider)),
            Err(e) => self.defer(e),
        }
    }

    /// Form-encode `payload` as the body.
    ///
    /// An encoding failure is returned by [`request`](Self::request).
    pub fn body_form<T: Serialize + ?Sized>(self, payload: &T) -> Self {
        match FormBodyProvider::new(payload) {
            Ok(provider) => self.body_provider(Arc::new(provider)),
            Err(e) => self.defer(e),
        }
    }

    fn defer(mut self, error: Error) -> Self {
        tracing::warn!(target: "meteor::service", "body encoding failed: {error}");
        self.body_provider = None;
        self.deferred_error = Some(error);
        self
    }
}
