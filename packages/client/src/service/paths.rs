//! Method and URL building

use http::Method;
use url::Url;

use super::Service;

impl Service {
    /// Set the method and extend the URL with `segments` joined by `/`
    pub fn method(mut self, method: Method, segments: &[&str]) -> Self {
        self.method = method;
        self.path(&segments.join("/"))
    }

    pub fn get(self, segments: &[&str]) -> Self {
        self.method(Method::GET, segments)
    }

    pub fn post(self, segments: &[&str]) -> Self {
        self.method(Method::POST, segments)
    }

    pub fn put(self, segments: &[&str]) -> Self {
        self.method(Method::PUT, segments)
    }

    pub fn patch(self, segments: &[&str]) -> Self {
        self.method(Method::PATCH, segments)
    }

    pub fn delete(self, segments: &[&str]) -> Self {
        self.method(Method::DELETE, segments)
    }

    pub fn head(self, segments: &[&str]) -> Self {
        self.method(Method::HEAD, segments)
    }

    /// Set the base URL, ensuring exactly one trailing slash
    pub fn base(mut self, raw_url: &str) -> Self {
        self.raw_url = format!("{}/", raw_url.trim_end_matches('/'));
        self
    }

    /// Set the URL verbatim
    pub fn raw_base(mut self, raw_url: &str) -> Self {
        self.raw_url = raw_url.to_owned();
        self
    }

    /// Extend the URL by resolving `path` as a reference against it.
    ///
    /// The current URL is treated as a directory. Relative paths append,
    /// paths starting with `/` replace the path, and absolute URLs replace
    /// the whole URL. If either side fails to parse the URL is left as it was.
    pub fn path(mut self, path: &str) -> Self {
        if path.is_empty() {
            return self;
        }
        if !self.raw_url.ends_with('/') {
            self.raw_url.push('/');
        }

        let resolved = match Url::parse(&self.raw_url) {
            Ok(base) => base.join(path),
            // no usable base; only an absolute reference can stand alone
            Err(_) => Url::parse(path),
        };
        match resolved {
            Ok(url) => self.raw_url = url.into(),
            Err(e) => {
                tracing::warn!(base = %self.raw_url, %path, "path not applied: {e}");
                // undo the slash added above
                self.raw_url.pop();
            }
        }
        self
    }
}
