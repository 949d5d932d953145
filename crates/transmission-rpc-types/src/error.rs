//! Error taxonomy shared by the whole client.

use thiserror::Error;

/// Boxed lower-level error kept as the source of a [`TransmissionError`].
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Convenience alias used across the workspace.
pub type Result<T, E = TransmissionError> = std::result::Result<T, E>;

/// Error type for Transmission RPC operations.
///
/// `Timeout` is a kind of connection failure: [`TransmissionError::is_connect`]
/// is true for both `Connect` and `Timeout`. `Auth` and `Protocol` are not
/// connection failures. `InvalidUsage` is raised locally, before any network
/// I/O happens.
#[derive(Error, Debug)]
pub enum TransmissionError {
    /// The daemon could not be reached (refused, reset, TLS failure, ...).
    #[error("{}", render(.message, .source.as_ref()))]
    Connect {
        /// Human readable description.
        message: String,
        /// The transport error that caused this one.
        #[source]
        source: Option<BoxError>,
    },

    /// The request did not complete before the configured timeout.
    #[error("{}", render(.message, .source.as_ref()))]
    Timeout {
        /// Human readable description.
        message: String,
        /// The transport error that caused this one.
        #[source]
        source: Option<BoxError>,
    },

    /// The daemon answered HTTP 401.
    #[error("{}", render(.message, None))]
    Auth {
        /// Human readable description.
        message: String,
        /// Body of the rejected response.
        raw_response: Option<String>,
    },

    /// The daemon answered, but the answer is unusable or reports a failure.
    #[error("{}", render(.message, .source.as_ref()))]
    Protocol {
        /// Human readable description.
        message: String,
        /// Body of the offending response, when there was one.
        raw_response: Option<String>,
        /// The decoding error that caused this one.
        #[source]
        source: Option<BoxError>,
    },

    /// The caller broke the API contract (bad ids, nothing to set, ...).
    #[error("{0}")]
    InvalidUsage(String),
}

fn render(message: &str, source: Option<&BoxError>) -> String {
    match source {
        Some(source) => format!("{message}, original error: \"{source}\""),
        None => message.to_owned(),
    }
}

impl TransmissionError {
    /// Connection failure without an underlying error.
    pub fn connect(message: impl Into<String>) -> Self {
        Self::Connect {
            message: message.into(),
            source: None,
        }
    }

    /// Timeout without an underlying error.
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::Timeout {
            message: message.into(),
            source: None,
        }
    }

    /// Authentication failure.
    pub fn auth(message: impl Into<String>, raw_response: Option<String>) -> Self {
        Self::Auth {
            message: message.into(),
            raw_response,
        }
    }

    /// Protocol failure without a raw response or cause.
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol {
            message: message.into(),
            raw_response: None,
            source: None,
        }
    }

    /// Protocol failure that keeps the offending response body.
    pub fn protocol_with_response(message: impl Into<String>, raw_response: String) -> Self {
        Self::Protocol {
            message: message.into(),
            raw_response: Some(raw_response),
            source: None,
        }
    }

    /// Caller contract violation.
    pub fn invalid_usage(message: impl Into<String>) -> Self {
        Self::InvalidUsage(message.into())
    }

    /// Attaches the original lower-level error. Ignored for variants that
    /// don't carry one.
    pub fn with_source(mut self, original: impl Into<BoxError>) -> Self {
        match &mut self {
            Self::Connect { source, .. }
            | Self::Timeout { source, .. }
            | Self::Protocol { source, .. } => *source = Some(original.into()),
            Self::Auth { .. } | Self::InvalidUsage(_) => {}
        }
        self
    }

    /// The message without the rendered cause.
    pub fn message(&self) -> &str {
        match self {
            Self::Connect { message, .. }
            | Self::Timeout { message, .. }
            | Self::Auth { message, .. }
            | Self::Protocol { message, .. } => message,
            Self::InvalidUsage(message) => message,
        }
    }

    /// Body of the response that caused the error, if any.
    pub fn raw_response(&self) -> Option<&str> {
        match self {
            Self::Auth { raw_response, .. } | Self::Protocol { raw_response, .. } => {
                raw_response.as_deref()
            }
            _ => None,
        }
    }

    /// The original lower-level error, if any.
    pub fn original(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        match self {
            Self::Connect { source, .. }
            | Self::Timeout { source, .. }
            | Self::Protocol { source, .. } => source.as_deref(),
            _ => None,
        }
    }

    /// True for connection failures, timeouts included.
    pub fn is_connect(&self) -> bool {
        matches!(self, Self::Connect { .. } | Self::Timeout { .. })
    }

    /// True for timeouts only.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// True for HTTP 401 answers.
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Auth { .. })
    }

    /// True for protocol level failures.
    pub fn is_protocol(&self) -> bool {
        matches!(self, Self::Protocol { .. })
    }

    /// True for caller contract violations.
    pub fn is_invalid_usage(&self) -> bool {
        matches!(self, Self::InvalidUsage(_))
    }
}
