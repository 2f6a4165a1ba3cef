use bytes::Bytes;
use serde::Serialize;

use super::{BodyProvider, JSON_CONTENT_TYPE};
use crate::error::{self, Result};

/// Encodes a serializable value as a JSON body
///
/// The payload is encoded when the provider is created, so later mutation of
/// the source value does not leak into requests built from it.
#[derive(Debug, Clone)]
pub struct JsonBodyProvider {
    payload: Bytes,
}

impl JsonBodyProvider {
    /// Encode `payload` as JSON
    ///
    /// # Errors
    ///
    /// Returns a builder error if the value cannot be serialized.
    pub fn new<T: Serialize + ?Sized>(payload: &T) -> Result<Self> {
        let encoded = serde_json::to_vec(payload).map_err(error::builder)?;
        Ok(Self {
            payload: Bytes::from(encoded),
        })
    }
}

impl BodyProvider for JsonBodyProvider {
    fn content_type(&self) -> Option<&str> {
        Some(JSON_CONTENT_TYPE)
    }

    fn body(&self) -> Result<Bytes> {
        Ok(self.payload.clone())
    }
}

#[cfg(test)]
mod tests {
    use serde::Serialize;

    use super::*;

    #[derive(Serialize)]
    struct FakeParams {
        kind_name: &'static str,
        count: i32,
    }

    #[test]
    fn encodes_struct_as_json() {
        let provider = JsonBodyProvider::new(&FakeParams {
            kind_name: "recent",
            count: 25,
        })
        .expect("serializable");
        assert_eq!(provider.content_type(), Some(JSON_CONTENT_TYPE));
        assert_eq!(
            provider.body().expect("body"),
            Bytes::from_static(br#"{"kind_name":"recent","count":25}"#)
        );
    }

    #[test]
    fn rejects_maps_with_non_string_keys() {
        let mut payload = std::collections::BTreeMap::new();
        payload.insert(vec![1u8], 1);
        let err = JsonBodyProvider::new(&payload).expect_err("non-string keys");
        assert!(err.is_builder());
    }
}
