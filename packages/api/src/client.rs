//! API client holder
//!
//! A [`Meteor`] bundles what every call to one API shares: the transport, the
//! user agent and the caller's credentials. Services handed out by
//! [`Meteor::common`] start from that shared configuration and carry their
//! own responder.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use http::header::USER_AGENT as USER_AGENT_HEADER;
use meteor_client::service::Service;
use meteor_client::transport::{DefaultTransport, Doer};

/// User agent sent by services created through [`Meteor`]
pub const USER_AGENT: &str = meteor_client::config::DEFAULT_USER_AGENT;

/// API keys and other secrets, by name
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials(HashMap<String, String>);

impl Credentials {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a credential
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// The credential stored under `key`, if any
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Credentials {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}

impl fmt::Debug for Credentials {
    // values are secrets; only the keys are shown
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<_> = self.0.keys().collect();
        keys.sort_unstable();
        f.debug_struct("Credentials").field("keys", &keys).finish()
    }
}

/// Manages communication with one API
pub struct Meteor {
    transport: Arc<dyn Doer>,
    credentials: Credentials,
    user_agent: String,
    common: Service,
}

impl Meteor {
    /// A client on `transport`, or on the process-wide transport when `None`
    ///
    /// # Arguments
    /// * `credentials` - Secrets the API's services may need
    /// * `transport` - Transport every service of this client uses
    #[must_use]
    pub fn new(credentials: Credentials, transport: Option<Arc<dyn Doer>>) -> Self {
        let transport = transport.unwrap_or_else(|| {
            log::debug!("Meteor: no transport given, using the process-wide transport");
            Arc::new(DefaultTransport)
        });
        Self::assemble(credentials, transport, USER_AGENT.to_owned())
    }

    /// A client on the process-wide transport with no credentials
    #[must_use]
    pub fn simple() -> Self {
        Self::new(Credentials::new(), None)
    }

    /// Replace the user agent sent by services created from now on
    #[must_use]
    pub fn with_user_agent(self, user_agent: impl Into<String>) -> Self {
        Self::assemble(self.credentials, self.transport, user_agent.into())
    }

    fn assemble(credentials: Credentials, transport: Arc<dyn Doer>, user_agent: String) -> Self {
        let common = Service::with_transport(Arc::clone(&transport))
            .set_header(USER_AGENT_HEADER.as_str(), &user_agent);
        log::debug!("Meteor: client ready, user agent {user_agent}");
        Self {
            transport,
            credentials,
            user_agent,
            common,
        }
    }

    /// A service carrying this client's transport and user agent.
    ///
    /// Every call returns a new child, so services never share a responder.
    pub fn common(&self) -> Service {
        self.common.child()
    }

    /// The credential stored under `key`, or `""` when missing
    #[must_use]
    pub fn credential(&self, key: &str) -> &str {
        self.credentials.get(key).unwrap_or_else(|| {
            log::warn!("Meteor: no credential named {key}");
            ""
        })
    }

    #[must_use]
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    #[must_use]
    pub fn transport(&self) -> &Arc<dyn Doer> {
        &self.transport
    }

    #[must_use]
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }
}

impl Default for Meteor {
    fn default() -> Self {
        Self::simple()
    }
}

impl fmt::Debug for Meteor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Meteor")
            .field("credentials", &self.credentials)
            .field("user_agent", &self.user_agent)
            .finish_non_exhaustive()
    }
}
