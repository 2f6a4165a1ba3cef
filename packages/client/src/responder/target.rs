//! Decode destinations
//!
//! A [`Target`] is where a responder puts the decoded body: nowhere
//! ([`Target::Skip`]), into a typed value, into a caller-owned byte sink, or,
//! when decoding failed, into the raw body bytes.

use std::fmt;
use std::io::Write;
use std::sync::{Arc, Mutex};

use bytes::Bytes;

/// A writer shared between the caller and a responder
pub type SharedSink = Arc<Mutex<dyn Write + Send>>;

/// Destination for a decoded response body
pub enum Target<T> {
    /// No destination; decoding into it is skipped and is not an error
    Skip,
    /// Typed destination; holds the caller's initial value until decoded
    Value(T),
    /// The body could not be decoded; the raw bytes are kept instead
    Raw(Bytes),
    /// Byte sink; the body bypasses structured decoding and is written here
    Sink(SharedSink),
}

impl<T> Target<T> {
    /// Whether this target is skipped
    #[inline]
    pub fn is_skip(&self) -> bool {
        matches!(self, Target::Skip)
    }

    /// The typed value, if any
    #[inline]
    pub fn value(&self) -> Option<&T> {
        match self {
            Target::Value(value) => Some(value),
            _ => None,
        }
    }

    /// The raw fallback bytes, if decoding failed
    #[inline]
    pub fn raw(&self) -> Option<&Bytes> {
        match self {
            Target::Raw(bytes) => Some(bytes),
            _ => None,
        }
    }
}

impl<T> From<Option<T>> for Target<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Target::Skip, Target::Value)
    }
}

impl<T: Clone> Clone for Target<T> {
    fn clone(&self) -> Self {
        match self {
            Target::Skip => Target::Skip,
            Target::Value(value) => Target::Value(value.clone()),
            Target::Raw(bytes) => Target::Raw(bytes.clone()),
            Target::Sink(sink) => Target::Sink(Arc::clone(sink)),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Target<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Skip => f.write_str("Skip"),
            Target::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Target::Raw(bytes) => f
                .debug_tuple("Raw")
                .field(&format!("{} bytes", bytes.len()))
                .finish(),
            Target::Sink(_) => f.debug_tuple("Sink").field(&"<writer>").finish(),
        }
    }
}
