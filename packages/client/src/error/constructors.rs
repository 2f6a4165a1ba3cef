use super::types::{Error, Kind};

pub(crate) type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Creates an `Error` for a builder error.
pub fn builder<E: Into<BoxError>>(e: E) -> Error {
    Error::new(Kind::Builder).with(e.into())
}

/// Creates an `Error` for a request error.
pub fn request<E: Into<BoxError>>(e: E) -> Error {
    Error::new(Kind::Request).with(e.into())
}

/// Creates an `Error` for connection failures.
pub fn connect<E: Into<BoxError>>(e: E) -> Error {
    Error::new(Kind::Connect).with(e.into())
}

/// Creates an `Error` for an elapsed request deadline.
pub fn timeout<E: Into<BoxError>>(e: E) -> Error {
    Error::new(Kind::Timeout).with(e.into())
}

/// Creates an `Error` for a body error.
pub fn body<E: Into<BoxError>>(e: E) -> Error {
    Error::new(Kind::Body).with(e.into())
}

/// Creates an `Error` for a decode error.
pub fn decode<E: Into<BoxError>>(e: E) -> Error {
    Error::new(Kind::Decode).with(e.into())
}

/// Creates an `Error` for a response body over the configured limit.
pub fn payload_too_large<E: Into<BoxError>>(e: E) -> Error {
    Error::new(Kind::PayloadTooLarge).with(e.into())
}

pub fn invalid_url<E: Into<BoxError>>(e: E, raw: &str) -> Error {
    Error::new(Kind::Builder).with(format!("invalid url '{raw}': {}", e.into()))
}
