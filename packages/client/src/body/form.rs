use bytes::Bytes;
use serde::Serialize;

use super::{BodyProvider, FORM_CONTENT_TYPE};
use crate::error::{self, Result};

/// Encodes a serializable value as an `application/x-www-form-urlencoded` body
#[derive(Debug, Clone)]
pub struct FormBodyProvider {
    payload: Bytes,
}

impl FormBodyProvider {
    /// Encode `payload` as a form
    ///
    /// # Errors
    ///
    /// Returns a builder error if the value is not a flat struct or map.
    pub fn new<T: Serialize + ?Sized>(payload: &T) -> Result<Self> {
        let encoded = serde_urlencoded::to_string(payload).map_err(error::builder)?;
        Ok(Self {
            payload: Bytes::from(encoded),
        })
    }
}

impl BodyProvider for FormBodyProvider {
    fn content_type(&self) -> Option<&str> {
        Some(FORM_CONTENT_TYPE)
    }

    fn body(&self) -> Result<Bytes> {
        Ok(self.payload.clone())
    }
}
