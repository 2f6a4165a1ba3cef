//! Blocking transport over the hyper-util client
//!
//! Each `HyperTransport` owns a small multi-threaded tokio runtime and a
//! pooled hyper-util client over a rustls-capable connector. `execute`
//! blocks the calling thread on that runtime, which lets fan-out worker
//! threads share one connection pool.
//! Calling it from inside another tokio runtime panics; use
//! `spawn_blocking` there.

use std::fmt;

use bytes::Bytes;
use http::header::USER_AGENT;
use http::HeaderValue;
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper_util::client::legacy::Client;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::rt::{TokioExecutor, TokioTimer};
use tokio::runtime::Runtime;

use super::Doer;
use super::tls::{self, HttpsConnector};
use crate::config::{TransportConfig, Validator};
use crate::error::{self, Error, Result, TimedOut};
use crate::http::{HttpRequest, HttpResponse};

/// HTTP/1.1 transport over `http` and `https` with connection pooling, a
/// request deadline and a response size cap.
pub struct HyperTransport {
    config: TransportConfig,
    client: Client<HttpsConnector, Full<Bytes>>,
    runtime: Runtime,
}

impl HyperTransport {
    /// Create a transport with its own runtime
    ///
    /// # Errors
    ///
    /// Returns a builder error if the configuration is invalid, the TLS
    /// configuration cannot be built or the runtime cannot be started.
    pub fn new(config: TransportConfig) -> Result<Self> {
        config.validate().map_err(error::builder)?;

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(config.worker_threads)
            .thread_name("meteor-transport")
            .enable_all()
            .build()
            .map_err(error::builder)?;

        let tls_config = tls::client_config(&config).map_err(error::builder)?;

        let mut http = HttpConnector::new();
        http.set_connect_timeout(Some(config.connect_timeout));
        http.set_nodelay(true);
        let connector = HttpsConnector::new(http, tls_config);

        let client = Client::builder(TokioExecutor::new())
            .pool_timer(TokioTimer::new())
            .pool_idle_timeout(config.pool_idle_timeout)
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .build(connector);

        tracing::debug!(
            timeout_ms = config.timeout.as_millis() as u64,
            worker_threads = config.worker_threads,
            "hyper transport started"
        );

        Ok(Self {
            config,
            client,
            runtime,
        })
    }

    /// Get current configuration
    #[inline]
    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    fn outgoing(&self, request: &HttpRequest) -> Result<http::Request<Full<Bytes>>> {
        let url = request.url();
        if !matches!(url.scheme(), "http" | "https") {
            return Err(error::builder(format!(
                "unsupported scheme '{}': expected http or https",
                url.scheme()
            ))
            .with_url(url.clone()));
        }

        let uri: http::Uri = url
            .as_str()
            .parse()
            .map_err(|e| error::builder(e).with_url(url.clone()))?;

        let mut outgoing = http::Request::new(Full::new(request.body().cloned().unwrap_or_default()));
        *outgoing.method_mut() = request.method().clone();
        *outgoing.uri_mut() = uri;
        *outgoing.headers_mut() = request.headers().clone();

        if !outgoing.headers().contains_key(USER_AGENT) {
            match HeaderValue::from_str(&self.config.user_agent) {
                Ok(value) => {
                    outgoing.headers_mut().insert(USER_AGENT, value);
                }
                Err(e) => tracing::warn!("Invalid configured user agent: {e}"),
            }
        }

        Ok(outgoing)
    }
}

impl Doer for HyperTransport {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        let url = request.url().clone();
        let outgoing = self.outgoing(&request)?;
        let client = self.client.clone();
        let limit = self.config.max_response_bytes;
        let deadline = self.config.timeout;

        tracing::trace!(method = %request.method(), url = %url, "executing request");

        let exchange = async move {
            let response = client.request(outgoing).await.map_err(|e| {
                if e.is_connect() {
                    error::connect(e)
                } else {
                    error::request(e)
                }
            })?;

            let (parts, incoming) = response.into_parts();
            let collected = Limited::new(incoming, limit).collect().await.map_err(|e| {
                if e.is::<LengthLimitError>() {
                    error::payload_too_large(e)
                } else {
                    error::body(e)
                }
            })?;

            Ok::<_, Error>(
                HttpResponse::new(parts.status, collected.to_bytes())
                    .with_headers(parts.headers)
                    .with_version(parts.version),
            )
        };

        let outcome = self
            .runtime
            .block_on(async move { tokio::time::timeout(deadline, exchange).await });

        match outcome {
            Ok(Ok(response)) => {
                tracing::trace!(status = %response.status(), url = %url, "response received");
                Ok(response.with_url(url))
            }
            Ok(Err(e)) => {
                tracing::debug!(url = %url, "request failed: {e}");
                Err(e.with_url(url))
            }
            Err(_) => {
                tracing::debug!(url = %url, "request timed out");
                Err(error::timeout(TimedOut).with_url(url))
            }
        }
    }
}

impl fmt::Debug for HyperTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HyperTransport")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
