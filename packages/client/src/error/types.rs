use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

/// A Result alias where the Err case is `meteor_client::Error`.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents errors that can occur building, sending or decoding a request.
///
/// Cloning is cheap and keeps the source chain, so a recorded error can be
/// handed out by every accessor of a responder.
#[derive(Clone)]
pub struct Error {
    pub(crate) inner: Box<Inner>,
}

#[derive(Clone)]
pub(crate) struct Inner {
    pub(crate) kind: Kind,
    pub(crate) source: Option<Arc<dyn StdError + Send + Sync>>,
    pub(crate) url: Option<url::Url>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    /// Invalid builder input (URL, header, body encoding)
    Builder,
    /// The transport failed to produce a response
    Request,
    /// Connection could not be established
    Connect,
    /// Request or response timeout
    Timeout,
    /// Request or response body could not be read or written
    Body,
    /// Response body could not be decoded into its target
    Decode,
    /// Payload exceeds maximum size limit
    PayloadTooLarge,
}

impl Error {
    pub fn new(kind: Kind) -> Error {
        Error {
            inner: Box::new(Inner {
                kind,
                source: None,
                url: None,
            }),
        }
    }

    #[must_use = "Error builder methods return a new Error and should be used"]
    pub fn with<E: Into<Box<dyn StdError + Send + Sync>>>(mut self, source: E) -> Error {
        self.inner.source = Some(Arc::from(source.into()));
        self
    }

    #[must_use]
    pub fn with_url(mut self, url: url::Url) -> Self {
        self.inner.url = Some(url);
        self
    }

    /// The category of this error
    #[must_use]
    pub fn kind(&self) -> Kind {
        self.inner.kind
    }

    /// Get the URL associated with this error, if any
    #[must_use]
    pub fn url(&self) -> Option<&url::Url> {
        self.inner.url.as_ref()
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut f = f.debug_struct("meteor_client::Error");

        f.field("kind", &self.inner.kind);

        if let Some(ref source) = self.inner.source {
            f.field("source", source);
        }

        if let Some(ref url) = self.inner.url {
            f.field("url", url);
        }

        f.finish()
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = match self.inner.kind {
            Kind::Builder => "builder error",
            Kind::Request => "error sending request",
            Kind::Connect => "connection error",
            Kind::Timeout => "request timeout",
            Kind::Body => "request or response body error",
            Kind::Decode => "error decoding response body",
            Kind::PayloadTooLarge => "payload too large",
        };
        f.write_str(prefix)?;

        if let Some(ref url) = self.inner.url {
            write!(f, " for url ({url})")?;
        }

        if let Some(ref source) = self.inner.source {
            write!(f, ": {source}")?;
        }

        Ok(())
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.inner
            .source
            .as_ref()
            .map(|err| &**err as &(dyn StdError + 'static))
    }
}
