//! Shared test utilities and fixtures.

use hyper::body::Bytes;
use hyper::{HeaderMap, StatusCode};
use mockall::Sequence;
use serde_json::{Map, Value, json};

use crate::client::Client;
use crate::config::ClientConfig;
use crate::transport::{HttpRequest, HttpResponse, MockTransport};

pub(crate) const TEST_HASH: &str = "a1b2c3d4e5f6a7b8c9d0a1b2c3d4e5f6a7b8c9d0";

pub(crate) fn init_test_tracing() {
    static ONCE: std::sync::Once = std::sync::Once::new();
    ONCE.call_once(|| {
        let subscriber = tracing_subscriber::fmt()
            .with_test_writer()
            .with_env_filter("debug")
            .finish();
        let _ = tracing::subscriber::set_global_default(subscriber);
    });
}

pub(crate) fn status_response(status: StatusCode, body: &str) -> HttpResponse {
    HttpResponse {
        status,
        headers: HeaderMap::new(),
        body: Bytes::from(body.to_owned()),
    }
}

pub(crate) fn json_response(body: Value) -> HttpResponse {
    status_response(StatusCode::OK, &body.to_string())
}

pub(crate) fn success(arguments: Value) -> HttpResponse {
    json_response(json!({"result": "success", "arguments": arguments}))
}

pub(crate) fn conflict(session_id: &str) -> HttpResponse {
    let mut response = status_response(StatusCode::CONFLICT, "409: Conflict");
    if let Ok(value) = session_id.parse() {
        response.headers.insert("x-transmission-session-id", value);
    }
    response
}

/// The decoded request envelope.
pub(crate) fn request_body(request: &HttpRequest) -> Value {
    serde_json::from_slice(&request.body).unwrap_or(Value::Null)
}

/// Expects one call of `method` whose arguments satisfy `check`, answered
/// with `arguments`.
pub(crate) fn expect_call<F>(
    mock: &mut MockTransport,
    seq: &mut Sequence,
    method: &'static str,
    check: F,
    arguments: Value,
) where
    F: Fn(&Map<String, Value>) -> bool + Send + 'static,
{
    mock.expect_request()
        .times(1)
        .in_sequence(seq)
        .withf(move |request| {
            let body = request_body(request);
            body["method"] == method && body["arguments"].as_object().is_some_and(|args| check(args))
        })
        .return_once(move |_| Ok(success(arguments)));
}

/// Expects the `session-get` every client sends on construction.
pub(crate) fn expect_bootstrap(mock: &mut MockTransport, seq: &mut Sequence, rpc_version: u64) {
    expect_call(
        mock,
        seq,
        "session-get",
        |args| args.contains_key("fields"),
        json!({
            "rpc-version": rpc_version,
            "rpc-version-semver": "5.3.0",
            "version": "4.0.5 (a6fe2a64aa)",
        }),
    );
}

pub(crate) async fn make_test_client(mock: MockTransport) -> Client<MockTransport> {
    Client::with_transport(ClientConfig::default(), mock)
        .await
        .unwrap()
}

pub(crate) fn make_test_torrent(id: u64, name: &str, hash: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "hashString": hash,
        "status": 4,
        "percentDone": 0.5,
        "queuePosition": id,
        "totalSize": 1000,
        "sizeWhenDone": 1000,
        "leftUntilDone": 500,
        "downloadDir": "/downloads",
    })
}
