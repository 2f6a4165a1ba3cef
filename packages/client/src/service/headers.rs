//! Request headers
//!
//! Invalid names or values are skipped with a warning instead of failing the
//! builder chain.

use http::header::CONTENT_TYPE;
use http::{HeaderName, HeaderValue};

use super::Service;

fn parse(name: &str, value: &str) -> Option<(HeaderName, HeaderValue)> {
    if name.is_empty() {
        return None;
    }
    let Ok(header_name) = HeaderName::from_bytes(name.as_bytes()) else {
        tracing::warn!(target: "meteor::service", %name, "invalid header name, skipped");
        return None;
    };
    let Ok(header_value) = HeaderValue::from_str(value) else {
        tracing::warn!(target: "meteor::service", %name, "invalid header value, skipped");
        return None;
    };
    Some((header_name, header_value))
}

impl Service {
    /// Add a header, keeping existing values for the same name
    pub fn add_header(mut self, name: &str, value: &str) -> Self {
        if let Some((name, value)) = parse(name, value) {
            self.headers.append(name, value);
        }
        self
    }

    /// Set a header, replacing existing values for the same name
    pub fn set_header(mut self, name: &str, value: &str) -> Self {
        if let Some((name, value)) = parse(name, value) {
            self.headers.insert(name, value);
        }
        self
    }

    /// Set the Content-Type header; an empty value is ignored
    pub fn content_type(self, content_type: &str) -> Self {
        if content_type.is_empty() {
            return self;
        }
        self.set_header(CONTENT_TYPE.as_str(), content_type)
    }
}
