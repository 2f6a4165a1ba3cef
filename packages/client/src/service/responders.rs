//! Responder selection

use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;

use super::Service;
use crate::responder::{BinaryResponder, JsonResponder, Responder};

impl Service {
    /// Use `responder` for the next cycle
    pub fn responder(mut self, responder: Arc<dyn Responder>) -> Self {
        self.responder = responder;
        self
    }

    /// Decode JSON bodies into `success` on 2xx and `failure` otherwise
    pub fn json_responder<S, F>(self, success: S, failure: F) -> Self
    where
        S: DeserializeOwned + Clone + fmt::Debug + Send + Sync + 'static,
        F: DeserializeOwned + Clone + fmt::Debug + Send + Sync + 'static,
    {
        self.responder(Arc::new(JsonResponder::new(success, failure)))
    }

    /// Decode JSON bodies into `success` on 2xx; other bodies are not decoded
    pub fn json_success_responder<S>(self, success: S) -> Self
    where
        S: DeserializeOwned + Clone + fmt::Debug + Send + Sync + 'static,
    {
        self.responder(Arc::new(JsonResponder::success_only(success)))
    }

    /// Keep 2xx bodies as bytes and JSON-decode others into `failure`
    pub fn binary_responder<F>(self, failure: F) -> Self
    where
        F: DeserializeOwned + Clone + fmt::Debug + Send + Sync + 'static,
    {
        self.responder(Arc::new(BinaryResponder::with_failure(failure)))
    }

    /// Keep 2xx bodies as bytes; other bodies are not decoded
    pub fn binary_success_responder(self) -> Self {
        self.responder(Arc::new(BinaryResponder::new()))
    }
}
