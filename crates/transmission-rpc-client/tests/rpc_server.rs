//! End-to-end tests of [`Client`] and [`HttpPool`] against an in-process
//! fake daemon speaking the Transmission RPC handshake.
//!
//! The fake daemon answers 409 with a session token until the client echoes
//! it back. It can also demand basic auth or stall every answer.

#![allow(unused_crate_dependencies)]
#![allow(missing_docs)]

use std::convert::Infallible;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use http_body_util::{BodyExt, Full};
use hyper::body::{Bytes, Incoming};
use hyper::header::{AUTHORIZATION, HeaderMap, HeaderName, HeaderValue};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use serde_json::{Value, json};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

use transmission_rpc_client::{
    Client, ClientConfig, HttpPool, HttpRequest, Protocol, TorrentIds, Transport,
};

const SESSION_ID: &str = "fake-session-0123456789";

fn session_id_header() -> HeaderName {
    HeaderName::from_static("x-transmission-session-id")
}

#[derive(Default)]
struct Behaviour {
    authorization: Option<&'static str>,
    delay: Duration,
}

struct State {
    behaviour: Behaviour,
    connections: AtomicUsize,
    requests: AtomicUsize,
}

/// Fake daemon running on a background task until dropped.
struct FakeDaemon {
    url: String,
    state: Arc<State>,
    shutdown_tx: Option<oneshot::Sender<()>>,
    _dir: Option<tempfile::TempDir>,
}

impl FakeDaemon {
    async fn tcp(behaviour: Behaviour) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let state = Self::state(behaviour);
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel();

        let accept_state = state.clone();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    result = listener.accept() => match result {
                        Ok((stream, _)) => serve(stream, accept_state.clone()),
                        Err(err) => eprintln!("accept error: {err}"),
                    },
                    _ = &mut shutdown_rx => break,
                }
            }
        });

        Self {
            url: format!("http://{addr}/transmission/rpc"),
            state,
            shutdown_tx: Some(shutdown_tx),
            _dir: None,
        }
    }

    #[cfg(unix)]
    async fn unix(behaviour: Behaviour) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let socket = dir.path().join("daemon.sock");
        let listener = tokio::net::UnixListener::bind(&socket).unwrap();
        let state = Self::state(behaviour);
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel();

        let accept_state = state.clone();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    result = listener.accept() => match result {
                        Ok((stream, _)) => serve(stream, accept_state.clone()),
                        Err(err) => eprintln!("accept error: {err}"),
                    },
                    _ = &mut shutdown_rx => break,
                }
            }
        });

        let encoded = socket.to_str().unwrap().replace('/', "%2F");
        Self {
            url: format!("http+unix://{encoded}/transmission/rpc"),
            state,
            shutdown_tx: Some(shutdown_tx),
            _dir: Some(dir),
        }
    }

    fn state(behaviour: Behaviour) -> Arc<State> {
        Arc::new(State {
            behaviour,
            connections: AtomicUsize::new(0),
            requests: AtomicUsize::new(0),
        })
    }

    fn connections(&self) -> usize {
        self.state.connections.load(Ordering::SeqCst)
    }

    fn requests(&self) -> usize {
        self.state.requests.load(Ordering::SeqCst)
    }
}

impl Drop for FakeDaemon {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

fn serve<S>(stream: S, state: Arc<State>)
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    state.connections.fetch_add(1, Ordering::SeqCst);
    tokio::spawn(async move {
        let service = service_fn(move |req| handle(state.clone(), req));
        if let Err(err) = http1::Builder::new()
            .serve_connection(TokioIo::new(stream), service)
            .await
        {
            eprintln!("server error: {err}");
        }
    });
}

fn reply(status: StatusCode, body: String) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::from(body)));
    *response.status_mut() = status;
    response
}

async fn handle(
    state: Arc<State>,
    req: Request<Incoming>,
) -> Result<Response<Full<Bytes>>, Infallible> {
    state.requests.fetch_add(1, Ordering::SeqCst);
    let (parts, body) = req.into_parts();
    let body = match body.collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(_) => Bytes::new(),
    };

    if let Some(expected) = state.behaviour.authorization {
        let authorized = parts
            .headers
            .get(AUTHORIZATION)
            .is_some_and(|value| value == expected);
        if !authorized {
            return Ok(reply(StatusCode::UNAUTHORIZED, "401: Unauthorized".into()));
        }
    }

    let has_session = parts
        .headers
        .get(session_id_header())
        .is_some_and(|value| value == SESSION_ID);
    if !has_session {
        let mut response = reply(StatusCode::CONFLICT, "409: Conflict".into());
        response
            .headers_mut()
            .insert(session_id_header(), HeaderValue::from_static(SESSION_ID));
        return Ok(response);
    }

    tokio::time::sleep(state.behaviour.delay).await;

    let request: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    let arguments = match request["method"].as_str() {
        Some("session-get") => json!({
            "rpc-version": 17,
            "rpc-version-semver": "5.3.0",
            "version": "4.0.5 (a6fe2a64aa)",
        }),
        Some("torrent-get") => json!({
            "torrents": [
                {"id": 1, "name": "debian.iso", "hashString": "a1b2c3d4e5f6a7b8c9d0a1b2c3d4e5f6a7b8c9d0", "status": 4},
                {"id": 2, "name": "ubuntu.iso", "hashString": "0123456789abcdef0123456789abcdef01234567", "status": 0},
            ],
        }),
        Some("torrent-stop") => json!({}),
        _ => {
            let body = json!({"result": "method name not recognized", "arguments": {}});
            return Ok(reply(StatusCode::OK, body.to_string()));
        }
    };
    let body = json!({"result": "success", "arguments": arguments, "tag": request["tag"]});
    Ok(reply(StatusCode::OK, body.to_string()))
}

fn session_get_body() -> Bytes {
    Bytes::from(json!({"method": "session-get", "arguments": {}, "tag": 0}).to_string())
}

#[test_log::test(tokio::test)]
async fn test_handshake_and_torrent_get_over_tcp() {
    let daemon = FakeDaemon::tcp(Behaviour::default()).await;
    let client = Client::from_url(&daemon.url).await.unwrap();

    assert_eq!(client.protocol_version(), 17);
    assert_eq!(client.semver_version(), Some("5.3.0"));
    assert_eq!(client.server_version(), Some("4.0.5 (a6fe2a64aa)"));
    assert_eq!(client.session_id().as_deref(), Some(SESSION_ID));

    let torrents = client.get_torrents(None, None).await.unwrap();
    assert_eq!(torrents.len(), 2);
    assert_eq!(torrents[0].id(), Some(1));
    assert_eq!(torrents[1].name(), Some("ubuntu.iso"));

    client.stop_torrent(TorrentIds::from(vec![1u64, 2])).await.unwrap();

    // 409 then the bootstrap session-get, then one request per call.
    assert_eq!(daemon.requests(), 4);
    assert_eq!(daemon.connections(), 1);
}

#[test_log::test(tokio::test)]
async fn test_unknown_method_is_protocol_error() {
    let daemon = FakeDaemon::tcp(Behaviour::default()).await;
    let client = Client::from_url(&daemon.url).await.unwrap();

    let err = client
        .port_test(None)
        .await
        .unwrap_err();
    assert!(err.is_protocol());
    assert_eq!(
        err.message(),
        "Query failed with result \"method name not recognized\"."
    );
}

#[test_log::test(tokio::test)]
async fn test_basic_auth() {
    let behaviour = || Behaviour {
        // user:secret
        authorization: Some("Basic dXNlcjpzZWNyZXQ="),
        ..Behaviour::default()
    };

    let daemon = FakeDaemon::tcp(behaviour()).await;
    let err = Client::from_url(&daemon.url).await.unwrap_err();
    assert!(err.is_auth());
    assert_eq!(err.raw_response(), Some("401: Unauthorized"));

    let daemon = FakeDaemon::tcp(behaviour()).await;
    let url = daemon.url.replace("http://", "http://user:secret@");
    let client = Client::from_url(&url).await.unwrap();
    assert_eq!(client.protocol_version(), 17);
}

#[test_log::test(tokio::test)]
async fn test_slow_daemon_times_out() {
    let daemon = FakeDaemon::tcp(Behaviour {
        delay: Duration::from_secs(5),
        ..Behaviour::default()
    })
    .await;
    let config = ClientConfig {
        timeout: Duration::from_millis(200),
        ..ClientConfig::from_url(&daemon.url).unwrap()
    };

    let err = Client::new(config).await.unwrap_err();
    assert!(err.is_timeout(), "unexpected error: {err:?}");
}

#[test_log::test(tokio::test)]
async fn test_connection_refused() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = Client::from_url(&format!("http://{addr}/transmission/rpc"))
        .await
        .unwrap_err();
    assert!(err.is_connect(), "unexpected error: {err:?}");
}

#[test_log::test(tokio::test)]
async fn test_pool_reuses_connection() {
    let daemon = FakeDaemon::tcp(Behaviour::default()).await;
    let pool = HttpPool::new(&ClientConfig::from_url(&daemon.url).unwrap()).unwrap();
    assert_eq!(pool.idle_connections().await, 0);

    let response = pool
        .request(HttpRequest {
            headers: HeaderMap::new(),
            body: session_get_body(),
            timeout: Duration::from_secs(5),
        })
        .await
        .unwrap();
    assert_eq!(response.status, StatusCode::CONFLICT);
    assert_eq!(pool.idle_connections().await, 1);

    let mut headers = HeaderMap::new();
    headers.insert(session_id_header(), HeaderValue::from_static(SESSION_ID));
    let response = pool
        .request(HttpRequest {
            headers,
            body: session_get_body(),
            timeout: Duration::from_secs(5),
        })
        .await
        .unwrap();
    assert_eq!(response.status, StatusCode::OK);
    let body: Value = serde_json::from_slice(&response.body).unwrap();
    assert_eq!(body["result"], "success");
    assert_eq!(body["arguments"]["rpc-version"], 17);

    assert_eq!(daemon.connections(), 1);
    pool.close().await;
    assert_eq!(pool.idle_connections().await, 0);
}

#[test_log::test(tokio::test)]
async fn test_pool_respects_idle_limit() {
    let daemon = FakeDaemon::tcp(Behaviour::default()).await;
    let config = ClientConfig {
        max_idle_connections: 0,
        ..ClientConfig::from_url(&daemon.url).unwrap()
    };
    let pool = HttpPool::new(&config).unwrap();

    for _ in 0..2 {
        pool.request(HttpRequest {
            headers: HeaderMap::new(),
            body: session_get_body(),
            timeout: Duration::from_secs(5),
        })
        .await
        .unwrap();
    }
    assert_eq!(pool.idle_connections().await, 0);
    assert_eq!(daemon.connections(), 2);
}

#[cfg(unix)]
#[test_log::test(tokio::test)]
async fn test_handshake_over_unix_socket() {
    let daemon = FakeDaemon::unix(Behaviour::default()).await;
    let config = ClientConfig::from_url(&daemon.url).unwrap();
    assert_eq!(config.protocol, Protocol::HttpUnix);

    let client = Client::new(config).await.unwrap();
    assert_eq!(client.url(), "http+unix://localhost/transmission/rpc");
    assert_eq!(client.session_id().as_deref(), Some(SESSION_ID));

    let torrents = client.get_torrents(None, None).await.unwrap();
    assert_eq!(torrents.len(), 2);
    assert_eq!(daemon.connections(), 1);
}

#[cfg(unix)]
#[test_log::test(tokio::test)]
async fn test_missing_unix_socket_is_connect_error() {
    let dir = tempfile::tempdir().unwrap();
    let socket = dir.path().join("missing.sock");
    let url = format!(
        "http+unix://{}/transmission/rpc",
        socket.to_str().unwrap().replace('/', "%2F")
    );

    let err = Client::from_url(&url).await.unwrap_err();
    assert!(err.is_connect(), "unexpected error: {err:?}");
}
