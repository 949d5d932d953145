//! Request engine: envelopes, the session-id handshake and response decoding.

use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use hyper::StatusCode;
use hyper::body::Bytes;
use hyper::header::{AUTHORIZATION, HeaderMap, HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{Instrument, Span, debug, debug_span, warn};

use transmission_rpc_types::{Result, RpcMethod, SESSION_ID_HEADER, TransmissionError};

use crate::transport::{HttpRequest, HttpResponse, Transport};

fn session_id_header() -> HeaderName {
    HeaderName::from_static("x-transmission-session-id")
}

/// Attempts per call, the first one included, before giving up on 409s.
const MAX_ATTEMPTS: usize = 3;

#[derive(Debug, Serialize)]
struct RequestEnvelope<'a> {
    method: &'static str,
    arguments: &'a Map<String, Value>,
    tag: u64,
}

#[derive(Debug, Deserialize)]
struct ResponseEnvelope {
    result: Option<Value>,
    #[serde(default)]
    arguments: Map<String, Value>,
}

/// Turns an RPC response body into its `arguments` object.
pub(crate) fn decode_response(body: &[u8]) -> Result<Map<String, Value>> {
    let raw = || String::from_utf8_lossy(body).into_owned();
    let envelope: ResponseEnvelope = serde_json::from_slice(body).map_err(|e| {
        TransmissionError::protocol_with_response("failed to parse response as json", raw())
            .with_source(e)
    })?;
    match envelope.result {
        None => Err(TransmissionError::protocol_with_response(
            "Query failed, response data missing without result.",
            raw(),
        )),
        Some(Value::String(result)) if result == "success" => Ok(envelope.arguments),
        Some(Value::String(result)) => Err(TransmissionError::protocol_with_response(
            format!("Query failed with result \"{result}\"."),
            raw(),
        )),
        Some(other) => Err(TransmissionError::protocol_with_response(
            format!("Query failed with result \"{other}\"."),
            raw(),
        )),
    }
}

/// Whether `arguments` selects at least one torrent.
fn has_ids(arguments: &Map<String, Value>) -> bool {
    match arguments.get("ids") {
        None | Some(Value::Null) => false,
        Some(Value::Array(ids)) => !ids.is_empty(),
        Some(_) => true,
    }
}

/// Sends RPC calls over a [`Transport`] and keeps the session token.
#[derive(Debug)]
pub(crate) struct Engine<T> {
    transport: T,
    session_id: Mutex<Option<String>>,
    authorization: Option<HeaderValue>,
    logger: Option<Span>,
    tag: AtomicU64,
}

impl<T: Transport> Engine<T> {
    pub(crate) fn new(transport: T, authorization: Option<&str>, logger: Option<Span>) -> Result<Self> {
        let authorization = authorization
            .map(|value| {
                let mut value = HeaderValue::from_str(value).map_err(|e| {
                    TransmissionError::invalid_usage("credentials are not a valid header value")
                        .with_source(e)
                })?;
                value.set_sensitive(true);
                Ok::<_, TransmissionError>(value)
            })
            .transpose()?;
        Ok(Self {
            transport,
            session_id: Mutex::new(None),
            authorization,
            logger,
            tag: AtomicU64::new(0),
        })
    }

    pub(crate) fn transport(&self) -> &T {
        &self.transport
    }

    /// Last session token the daemon handed out.
    pub(crate) fn session_id(&self) -> Option<String> {
        self.session_id
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    fn store_session_id(&self, id: Option<String>) {
        match self.session_id.lock() {
            Ok(mut guard) => *guard = id,
            Err(poisoned) => *poisoned.into_inner() = id,
        }
    }

    /// Calls `method` and returns the `arguments` of a successful answer.
    pub(crate) async fn call(
        &self,
        method: RpcMethod,
        arguments: Map<String, Value>,
        timeout: Duration,
    ) -> Result<Map<String, Value>> {
        if method.requires_ids() && !has_ids(&arguments) {
            return Err(TransmissionError::invalid_usage("request require ids"));
        }

        let tag = self.tag.fetch_add(1, Ordering::Relaxed);
        let span = match &self.logger {
            Some(parent) => debug_span!(parent: parent, "rpc", %method, tag),
            None => debug_span!("rpc", %method, tag),
        };

        async move {
            let body = serde_json::to_vec(&RequestEnvelope {
                method: method.as_str(),
                arguments: &arguments,
                tag,
            })
            .map_err(|e| {
                TransmissionError::invalid_usage("failed to encode request").with_source(e)
            })?;
            debug!(arguments = ?arguments, "sending request");

            let response = self.dispatch(Bytes::from(body), timeout).await?;
            let result = decode_response(&response.body);
            match &result {
                Ok(arguments) => debug!(keys = arguments.len(), "request succeeded"),
                Err(e) => debug!(error = %e, "request failed"),
            }
            result
        }
        .instrument(span)
        .await
    }

    /// Posts `body`, renewing the session token on 409.
    async fn dispatch(&self, body: Bytes, timeout: Duration) -> Result<HttpResponse> {
        for attempt in 1..=MAX_ATTEMPTS {
            let request = HttpRequest {
                headers: self.headers()?,
                body: body.clone(),
                timeout,
            };
            let response = self.transport.request(request).await?;
            debug!(attempt, status = %response.status, "response received");

            match response.status {
                StatusCode::CONFLICT => {
                    let id = response
                        .headers
                        .get(session_id_header())
                        .and_then(|value| value.to_str().ok())
                        .map(str::to_owned);
                    if id.is_none() {
                        warn!("409 response without {SESSION_ID_HEADER} header");
                    }
                    debug!(session_id = ?id, "session id renewed");
                    self.store_session_id(id);
                }
                StatusCode::UNAUTHORIZED => {
                    return Err(TransmissionError::auth(
                        "transmission daemon require auth",
                        Some(response.text()),
                    ));
                }
                _ => return Ok(response),
            }
        }
        Err(TransmissionError::protocol(
            "too much request, try enable logger to see what happened",
        ))
    }

    fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        if let Some(id) = self.session_id() {
            let value = HeaderValue::from_str(&id).map_err(|e| {
                TransmissionError::protocol(format!("daemon sent an invalid session id {id:?}"))
                    .with_source(e)
            })?;
            headers.insert(session_id_header(), value);
        }
        if let Some(authorization) = &self.authorization {
            headers.insert(AUTHORIZATION, authorization.clone());
        }
        Ok(headers)
    }
}
