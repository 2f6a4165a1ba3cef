//! rustls connector for the hyper-util client
//!
//! [`HttpsConnector`] dials TCP through hyper-util's `HttpConnector` and, for
//! `https` URIs, runs the rustls handshake on top before handing the stream to
//! the connection pool. Plain `http` URIs pass through untouched.

use std::future::Future;
use std::io;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use http::Uri;
use http::uri::Scheme;
use hyper::rt::{Read, ReadBufCursor, Write};
use hyper_util::client::legacy::connect::{Connected, Connection, HttpConnector};
use hyper_util::rt::TokioIo;
use rustls::pki_types::ServerName;
use rustls::{ClientConfig, RootCertStore};
use tokio::net::TcpStream;
use tokio_rustls::TlsConnector;
use tokio_rustls::client::TlsStream;
use tower_service::Service;

use crate::config::TransportConfig;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

type PlainStream = TokioIo<TcpStream>;

/// Build the rustls client configuration
///
/// Starts from the bundled webpki roots and adds the platform's native
/// certificates when `use_system_certs` is set. Native certificates that fail
/// to load are logged and skipped.
pub(crate) fn client_config(config: &TransportConfig) -> Result<ClientConfig, rustls::Error> {
    let mut roots = RootCertStore::empty();
    roots.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());

    if config.use_system_certs {
        let loaded = rustls_native_certs::load_native_certs();
        for err in &loaded.errors {
            tracing::warn!("Certificate load error: {err}");
        }
        let (added, ignored) = roots.add_parsable_certificates(loaded.certs);
        tracing::debug!(added, ignored, "loaded system certificates");
    }

    let provider = Arc::new(rustls::crypto::ring::default_provider());
    Ok(ClientConfig::builder_with_provider(provider)
        .with_safe_default_protocol_versions()?
        .with_root_certificates(roots)
        .with_no_client_auth())
}

/// Connector speaking `http` and `https`
#[derive(Clone)]
pub struct HttpsConnector {
    http: HttpConnector,
    tls: TlsConnector,
}

impl HttpsConnector {
    /// Wrap a TCP connector with a TLS configuration
    pub fn new(mut http: HttpConnector, tls: ClientConfig) -> Self {
        http.enforce_http(false);
        Self {
            http,
            tls: TlsConnector::from(Arc::new(tls)),
        }
    }
}

impl Service<Uri> for HttpsConnector {
    type Response = MaybeTlsStream;
    type Error = BoxError;
    type Future = Pin<Box<dyn Future<Output = Result<MaybeTlsStream, BoxError>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.http.poll_ready(cx).map_err(Into::into)
    }

    fn call(&mut self, dst: Uri) -> Self::Future {
        let secure = dst.scheme() == Some(&Scheme::HTTPS);
        let host = dst
            .host()
            .map(|host| host.trim_start_matches('[').trim_end_matches(']').to_owned());
        let connecting = self.http.call(dst);
        Box::pin(handshake(connecting, self.tls.clone(), secure, host))
    }
}

async fn handshake<F, E>(
    connecting: F,
    tls: TlsConnector,
    secure: bool,
    host: Option<String>,
) -> Result<MaybeTlsStream, BoxError>
where
    F: Future<Output = Result<PlainStream, E>>,
    E: Into<BoxError>,
{
    let plain = connecting.await.map_err(Into::into)?;
    if !secure {
        return Ok(MaybeTlsStream::Plain(plain));
    }

    let host = host.ok_or("https uri without a host")?;
    let server_name = ServerName::try_from(host)?;
    let stream = tls.connect(server_name, TokioIo::new(plain)).await?;
    Ok(MaybeTlsStream::Tls(TokioIo::new(stream)))
}

/// A pooled connection, encrypted or not
pub enum MaybeTlsStream {
    /// Plain TCP
    Plain(PlainStream),
    /// TLS over TCP
    Tls(TokioIo<TlsStream<TokioIo<PlainStream>>>),
}

impl Connection for MaybeTlsStream {
    fn connected(&self) -> Connected {
        match self {
            Self::Plain(stream) => stream.connected(),
            Self::Tls(stream) => {
                let (tcp, _) = stream.inner().get_ref();
                tcp.inner().connected()
            }
        }
    }
}

impl Read for MaybeTlsStream {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: ReadBufCursor<'_>,
    ) -> Poll<io::Result<()>> {
        match self.get_mut() {
            Self::Plain(stream) => Pin::new(stream).poll_read(cx, buf),
            Self::Tls(stream) => Pin::new(stream).poll_read(cx, buf),
        }
    }
}

impl Write for MaybeTlsStream {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        match self.get_mut() {
            Self::Plain(stream) => Pin::new(stream).poll_write(cx, buf),
            Self::Tls(stream) => Pin::new(stream).poll_write(cx, buf),
        }
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match self.get_mut() {
            Self::Plain(stream) => Pin::new(stream).poll_flush(cx),
            Self::Tls(stream) => Pin::new(stream).poll_flush(cx),
        }
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match self.get_mut() {
            Self::Plain(stream) => Pin::new(stream).poll_shutdown(cx),
            Self::Tls(stream) => Pin::new(stream).poll_shutdown(cx),
        }
    }
}
