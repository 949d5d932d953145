//! HTTP transport seam.
//!
//! The RPC engine only needs "send these headers and this body, give me the
//! status, headers and body back". [`Transport`] is that contract; [`HttpPool`]
//! is the pooled hyper implementation used outside of tests.

use std::io;
use std::time::Duration;

use hyper::body::Bytes;
use hyper::{HeaderMap, StatusCode};
use thiserror::Error;

use transmission_rpc_types::{BoxError, TransmissionError};

mod pool;

pub use pool::HttpPool;

/// One POST to the RPC endpoint.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    /// Request headers, on top of `Host` and `Content-Length`.
    pub headers: HeaderMap,
    /// JSON encoded request envelope.
    pub body: Bytes,
    /// Upper bound for the whole exchange, connecting included.
    pub timeout: Duration,
}

/// Raw HTTP answer.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    #[allow(missing_docs)]
    pub status: StatusCode,
    #[allow(missing_docs)]
    pub headers: HeaderMap,
    #[allow(missing_docs)]
    pub body: Bytes,
}

impl HttpResponse {
    /// Body as text, for error reports.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Failures below the HTTP status line.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Dialing the daemon failed.
    #[error("failed to connect to {target}")]
    Connect {
        /// Address that was dialed.
        target: String,
        #[source]
        source: io::Error,
    },

    /// The exchange did not finish in time.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// The connection broke mid exchange.
    #[error("http exchange failed")]
    Http(#[from] hyper::Error),

    /// The request could not be built.
    #[error("invalid request")]
    Request(#[source] BoxError),
}

impl From<TransportError> for TransmissionError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Timeout(after) => {
                TransmissionError::timeout(format!("timeout after {after:?}"))
                    .with_source(TransportError::Timeout(after))
            }
            TransportError::Connect { .. } => {
                TransmissionError::connect("failed to connect to transmission daemon")
                    .with_source(err)
            }
            TransportError::Http(_) | TransportError::Request(_) => {
                TransmissionError::connect("failed to exchange data with transmission daemon")
                    .with_source(err)
            }
        }
    }
}

/// Sends RPC requests to the daemon.
///
/// Implemented by [`HttpPool`]; tests substitute a mock.
#[cfg_attr(test, mockall::automock)]
#[allow(async_fn_in_trait)]
pub trait Transport {
    /// Performs one HTTP exchange.
    async fn request(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;

    /// Releases pooled connections.
    async fn close(&self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_errors_classify() {
        let err: TransmissionError = TransportError::Timeout(Duration::from_secs(1)).into();
        assert!(err.is_timeout());
        assert!(err.is_connect());

        let err: TransmissionError = TransportError::Connect {
            target: "127.0.0.1:1".to_owned(),
            source: io::Error::from(io::ErrorKind::ConnectionRefused),
        }
        .into();
        assert!(err.is_connect());
        assert!(!err.is_timeout());
        assert!(err.original().is_some());
    }

    #[test]
    fn test_response_text() {
        let response = HttpResponse {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            body: Bytes::from_static(b"{\"result\":\"success\"}"),
        };
        assert_eq!(response.text(), "{\"result\":\"success\"}");
    }
}
