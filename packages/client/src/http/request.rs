//! HTTP request type
//!
//! `HttpRequest` is the materialized output of a [`Service`](crate::service::Service):
//! method, absolute URL, headers and an optional fully encoded body. It is
//! cheap to clone, so every fan-out worker can own its copy.

use bytes::Bytes;
use http::{HeaderMap, HeaderName, HeaderValue, Method};
use url::Url;

/// A prepared HTTP request, ready to be handed to a [`Doer`](crate::transport::Doer)
#[derive(Debug, Clone)]
pub struct HttpRequest {
    method: Method,
    url: Url,
    headers: HeaderMap,
    body: Option<Bytes>,
}

impl HttpRequest {
    /// Create a request with no headers and no body
    #[must_use]
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            headers: HeaderMap::new(),
            body: None,
        }
    }

    /// Replace the method
    #[must_use = "Request builder methods return a new request and should be used"]
    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Replace the URL
    #[must_use = "Request builder methods return a new request and should be used"]
    pub fn with_url(mut self, url: Url) -> Self {
        self.url = url;
        self
    }

    /// Append a header value, keeping existing values for the same name
    #[must_use = "Request builder methods return a new request and should be used"]
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.append(name, value);
        self
    }

    /// Replace all headers
    #[must_use = "Request builder methods return a new request and should be used"]
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// Set the encoded body
    #[must_use = "Request builder methods return a new request and should be used"]
    pub fn with_body(mut self, body: Bytes) -> Self {
        self.body = Some(body);
        self
    }

    #[inline]
    pub fn method(&self) -> &Method {
        &self.method
    }

    #[inline]
    pub fn url(&self) -> &Url {
        &self.url
    }

    #[inline]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    #[inline]
    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    #[inline]
    pub fn body(&self) -> Option<&Bytes> {
        self.body.as_ref()
    }
}
