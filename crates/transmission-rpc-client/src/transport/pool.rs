//! Pooled hyper connections to one daemon endpoint.

use std::io;
use std::sync::Arc;

use http_body_util::{BodyExt, Full};
use hyper::body::Bytes;
use hyper::client::conn::http1::{self, SendRequest};
use hyper::header::{CONTENT_TYPE, HOST, HeaderValue};
use hyper::rt::{Read, Write};
use hyper::{Method, Request};
use hyper_util::rt::TokioIo;
use rustls::pki_types::ServerName;
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio_rustls::TlsConnector;
use tracing::{debug, trace};

use transmission_rpc_types::{Result, TransmissionError};

use super::{HttpRequest, HttpResponse, Transport, TransportError};
use crate::config::{ClientConfig, Protocol};

type Sender = SendRequest<Full<Bytes>>;

enum Target {
    Tcp {
        host: String,
        port: u16,
    },
    Tls {
        host: String,
        port: u16,
        server_name: ServerName<'static>,
        connector: TlsConnector,
    },
    #[cfg(unix)]
    Unix { path: std::path::PathBuf },
}

impl Target {
    fn describe(&self) -> String {
        match self {
            Self::Tcp { host, port } | Self::Tls { host, port, .. } => format!("{host}:{port}"),
            #[cfg(unix)]
            Self::Unix { path } => path.display().to_string(),
        }
    }
}

/// Keep-alive HTTP/1.1 connections to the daemon.
///
/// Idle connections are reused most recent first. A connection the server
/// closed is discarded and a new one is dialed.
pub struct HttpPool {
    target: Target,
    host_header: HeaderValue,
    path: String,
    idle: Mutex<Vec<Sender>>,
    max_idle: usize,
}

impl std::fmt::Debug for HttpPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpPool")
            .field("target", &self.target.describe())
            .field("path", &self.path)
            .field("max_idle", &self.max_idle)
            .finish()
    }
}

impl HttpPool {
    /// Prepares a pool for `config`. No connection is opened yet.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let default_port = match config.protocol {
            Protocol::Https => 443,
            _ => 80,
        };
        let port = config.port.unwrap_or(default_port);
        let (target, host_header) = match config.protocol {
            Protocol::Http => (
                Target::Tcp {
                    host: config.host.clone(),
                    port,
                },
                authority(&config.host, port),
            ),
            Protocol::Https => {
                let server_name = ServerName::try_from(config.host.clone()).map_err(|e| {
                    TransmissionError::invalid_usage(format!(
                        "invalid TLS server name {:?}: {e}",
                        config.host
                    ))
                })?;
                (
                    Target::Tls {
                        host: config.host.clone(),
                        port,
                        server_name,
                        connector: tls_connector()?,
                    },
                    authority(&config.host, port),
                )
            }
            #[cfg(unix)]
            Protocol::HttpUnix => (
                Target::Unix {
                    path: config.host.clone().into(),
                },
                "localhost".to_owned(),
            ),
            #[cfg(not(unix))]
            Protocol::HttpUnix => {
                return Err(TransmissionError::connect(
                    "unix sockets are not supported on this platform",
                ));
            }
        };
        let host_header = HeaderValue::from_str(&host_header).map_err(|e| {
            TransmissionError::invalid_usage(format!("invalid host {:?}", config.host))
                .with_source(e)
        })?;

        Ok(Self {
            target,
            host_header,
            path: config.path.clone(),
            idle: Mutex::new(Vec::new()),
            max_idle: config.max_idle_connections,
        })
    }

    /// Number of idle connections currently kept.
    pub async fn idle_connections(&self) -> usize {
        self.idle.lock().await.len()
    }

    async fn checkout(&self) -> Option<Sender> {
        let mut idle = self.idle.lock().await;
        while let Some(sender) = idle.pop() {
            if !sender.is_closed() {
                return Some(sender);
            }
            trace!("discarding closed connection");
        }
        None
    }

    async fn checkin(&self, sender: Sender) {
        if sender.is_closed() {
            return;
        }
        let mut idle = self.idle.lock().await;
        if idle.len() < self.max_idle {
            idle.push(sender);
        }
    }

    async fn dial(&self) -> Result<Sender, TransportError> {
        let connect_error = |source: io::Error| TransportError::Connect {
            target: self.target.describe(),
            source,
        };
        debug!(addr = %self.target.describe(), "opening connection");
        match &self.target {
            Target::Tcp { host, port } => {
                let stream = TcpStream::connect((host.as_str(), *port))
                    .await
                    .map_err(connect_error)?;
                stream.set_nodelay(true).map_err(connect_error)?;
                handshake(TokioIo::new(stream)).await
            }
            Target::Tls {
                host,
                port,
                server_name,
                connector,
            } => {
                let stream = TcpStream::connect((host.as_str(), *port))
                    .await
                    .map_err(connect_error)?;
                stream.set_nodelay(true).map_err(connect_error)?;
                let stream = connector
                    .connect(server_name.clone(), stream)
                    .await
                    .map_err(connect_error)?;
                handshake(TokioIo::new(stream)).await
            }
            #[cfg(unix)]
            Target::Unix { path } => {
                let stream = tokio::net::UnixStream::connect(path)
                    .await
                    .map_err(connect_error)?;
                handshake(TokioIo::new(stream)).await
            }
        }
    }

    async fn exchange(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut sender = match self.checkout().await {
            Some(sender) => sender,
            None => self.dial().await?,
        };
        sender.ready().await?;

        let mut builder = Request::builder()
            .method(Method::POST)
            .uri(self.path.as_str())
            .header(HOST, self.host_header.clone())
            .header(CONTENT_TYPE, "application/json");
        if let Some(headers) = builder.headers_mut() {
            headers.extend(request.headers);
        }
        let http_request = builder
            .body(Full::new(request.body))
            .map_err(|e| TransportError::Request(e.into()))?;

        let response = sender.send_request(http_request).await?;
        let (parts, body) = response.into_parts();
        let body = body.collect().await?.to_bytes();
        self.checkin(sender).await;

        trace!(status = %parts.status, bytes = body.len(), "response received");
        Ok(HttpResponse {
            status: parts.status,
            headers: parts.headers,
            body,
        })
    }
}

impl Transport for HttpPool {
    async fn request(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let timeout = request.timeout;
        tokio::time::timeout(timeout, self.exchange(request))
            .await
            .map_err(|_| TransportError::Timeout(timeout))?
    }

    async fn close(&self) {
        let mut idle = self.idle.lock().await;
        debug!(connections = idle.len(), "closing idle connections");
        idle.clear();
    }
}

async fn handshake<S>(io: S) -> Result<Sender, TransportError>
where
    S: Read + Write + Unpin + Send + 'static,
{
    let (sender, connection) = http1::handshake(io).await?;
    tokio::spawn(async move {
        if let Err(e) = connection.await {
            debug!(error = %e, "connection closed with error");
        }
    });
    Ok(sender)
}

fn authority(host: &str, port: u16) -> String {
    if host.contains(':') {
        format!("[{host}]:{port}")
    } else {
        format!("{host}:{port}")
    }
}

fn tls_connector() -> Result<TlsConnector> {
    let mut roots = rustls::RootCertStore::empty();
    roots.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
    let config = rustls::ClientConfig::builder_with_provider(Arc::new(
        rustls::crypto::ring::default_provider(),
    ))
    .with_safe_default_protocol_versions()
    .map_err(|e| TransmissionError::connect("failed to set up TLS").with_source(e))?
    .with_root_certificates(roots)
    .with_no_client_auth();
    Ok(TlsConnector::from(Arc::new(config)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_targets() {
        let pool = HttpPool::new(&ClientConfig::default()).unwrap();
        assert_eq!(pool.target.describe(), "127.0.0.1:9091");
        assert_eq!(pool.host_header, "127.0.0.1:9091");
        assert_eq!(pool.path, "/transmission/rpc");

        let config = ClientConfig::from_url("https://example.com/rpc").unwrap();
        let pool = HttpPool::new(&config).unwrap();
        assert_eq!(pool.target.describe(), "example.com:443");
    }

    #[cfg(unix)]
    #[test]
    fn test_unix_target_uses_localhost() {
        let config = ClientConfig::from_url("http+unix://%2Ftmp%2Ftr.sock/transmission/rpc").unwrap();
        let pool = HttpPool::new(&config).unwrap();
        assert_eq!(pool.target.describe(), "/tmp/tr.sock");
        assert_eq!(pool.host_header, "localhost");
    }

    #[tokio::test]
    async fn test_connection_refused_is_connect_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let config = ClientConfig {
            port: Some(port),
            ..ClientConfig::default()
        };
        let pool = HttpPool::new(&config).unwrap();
        let err = pool
            .request(HttpRequest {
                headers: hyper::HeaderMap::new(),
                body: Bytes::from_static(b"{}"),
                timeout: std::time::Duration::from_secs(5),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::Connect { .. }));
        assert_eq!(pool.idle_connections().await, 0);
    }
}
