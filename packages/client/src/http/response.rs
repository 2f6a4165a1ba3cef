//! HTTP response type
//!
//! The transport reads the whole body before handing the response over, so a
//! response is an immutable value that responders may inspect as often as
//! they like. Decoding it into targets is still done at most once per
//! exchange; that guarantee lives in the responder, not here.

use bytes::Bytes;
use http::{HeaderMap, StatusCode, Version};
use url::Url;

/// A received HTTP response with its body fully buffered
#[derive(Debug, Clone)]
pub struct HttpResponse {
    status: StatusCode,
    version: Version,
    headers: HeaderMap,
    body: Bytes,
    url: Option<Url>,
}

impl HttpResponse {
    /// Create a response with no headers
    #[must_use]
    pub fn new(status: StatusCode, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            version: Version::HTTP_11,
            headers: HeaderMap::new(),
            body: body.into(),
            url: None,
        }
    }

    #[must_use]
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    #[must_use]
    pub fn with_version(mut self, version: Version) -> Self {
        self.version = version;
        self
    }

    /// Record the URL this response was received from
    #[must_use]
    pub fn with_url(mut self, url: Url) -> Self {
        self.url = Some(url);
        self
    }

    #[inline]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    #[inline]
    pub fn version(&self) -> Version {
        self.version
    }

    #[inline]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// The raw body bytes
    #[inline]
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    #[inline]
    pub fn url(&self) -> Option<&Url> {
        self.url.as_ref()
    }

    /// Body as UTF-8 text, replacing invalid sequences
    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Whether the status is in the 2xx range
    #[inline]
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}
