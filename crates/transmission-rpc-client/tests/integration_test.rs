//! Tests against a real `transmission-daemon` started for the test.
//!
//! They need the daemon binary on `PATH` and are ignored by default:
//! `cargo test -- --ignored`.

#![allow(unused_crate_dependencies)]
#![allow(missing_docs)]

use std::io;
use std::process::Stdio;
use std::time::Duration;

use tokio::net::TcpStream;
use tokio::process::{Child, Command};

use transmission_rpc_client::{
    AddTorrentArgs, Client, ClientConfig, SessionChange, TorrentChange, TorrentId, TorrentIds,
};

const MAGNET: &str = "magnet:?xt=urn:btih:08ada5a7a6183aae1e09d831df6748d566095a10&dn=Sintel";
const MAGNET_HASH: &str = "08ada5a7a6183aae1e09d831df6748d566095a10";

fn magnet_id() -> TorrentId {
    TorrentId::hash(MAGNET_HASH).unwrap()
}

/// Foreground daemon, killed when the test ends.
struct Daemon {
    _child: Child,
    client: Client,
}

/// Starts a daemon with its own config dir on `port` and connects to it.
async fn start_daemon(tmp: &tempfile::TempDir, port: u16) -> io::Result<Daemon> {
    let config_dir = tmp.path().join("config");
    let download_dir = tmp.path().join("complete");

    let child = Command::new("transmission-daemon")
        .arg("-f")
        .arg("-T")
        .arg("-g")
        .arg(&config_dir)
        .arg("-w")
        .arg(&download_dir)
        .arg("-p")
        .arg(port.to_string())
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .spawn()?;

    let mut ready = false;
    for _ in 0..100 {
        if TcpStream::connect(("127.0.0.1", port)).await.is_ok() {
            ready = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    if !ready {
        return Err(io::Error::new(
            io::ErrorKind::TimedOut,
            "daemon did not become ready in time",
        ));
    }

    let config = ClientConfig {
        port: Some(port),
        ..ClientConfig::default()
    };
    let client = Client::new(config).await.map_err(io::Error::other)?;
    Ok(Daemon {
        _child: child,
        client,
    })
}

#[cfg(unix)]
#[ignore = "needs transmission-daemon"]
#[test_log::test(tokio::test(flavor = "current_thread"))]
async fn integration_test_torrent_lifecycle() -> io::Result<()> {
    let tmp = tempfile::tempdir()?;
    let daemon = start_daemon(&tmp, 9191).await?;
    let client = &daemon.client;
    assert!(client.protocol_version() >= 14);

    let added = client
        .add_torrent(
            MAGNET,
            AddTorrentArgs {
                paused: Some(true),
                ..AddTorrentArgs::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(added.hash_string(), Some(MAGNET_HASH));

    let torrents = client.get_torrents(None, None).await.unwrap();
    assert_eq!(torrents.len(), 1);

    let torrent = client
        .get_torrent(magnet_id(), Some(&["name", "labels"]))
        .await
        .unwrap();
    assert_eq!(torrent.hash_string(), Some(MAGNET_HASH));

    client
        .change_torrent(
            magnet_id(),
            TorrentChange {
                labels: Some(vec!["integration".into()]),
                ..TorrentChange::default()
            },
        )
        .await
        .unwrap();
    let torrent = client
        .get_torrent(magnet_id(), Some(&["labels"]))
        .await
        .unwrap();
    assert_eq!(torrent.labels(), Some(vec!["integration".to_owned()]));

    client.stop_torrent(magnet_id()).await.unwrap();
    client.remove_torrent(magnet_id(), true).await.unwrap();
    let torrents = client.get_torrents(None, None).await.unwrap();
    assert!(torrents.is_empty());

    Ok(())
}

#[cfg(unix)]
#[ignore = "needs transmission-daemon"]
#[test_log::test(tokio::test(flavor = "current_thread"))]
async fn integration_test_session_roundtrip() -> io::Result<()> {
    let tmp = tempfile::tempdir()?;
    let daemon = start_daemon(&tmp, 9192).await?;
    let client = &daemon.client;

    client
        .set_session(SessionChange {
            speed_limit_down: Some(512),
            speed_limit_down_enabled: Some(true),
            ..SessionChange::default()
        })
        .await
        .unwrap();

    let session = client.get_session(None).await.unwrap();
    assert_eq!(session.speed_limit_down(), Some(512));
    assert_eq!(session.speed_limit_down_enabled(), Some(true));

    let stats = client.session_stats().await.unwrap();
    assert_eq!(stats.torrent_count(), Some(0));

    Ok(())
}

#[cfg(unix)]
#[ignore = "needs transmission-daemon"]
#[test_log::test(tokio::test(flavor = "current_thread"))]
async fn integration_test_unknown_torrents_are_ignored() -> io::Result<()> {
    let tmp = tempfile::tempdir()?;
    let daemon = start_daemon(&tmp, 9193).await?;
    let client = &daemon.client;

    client.stop_torrent(magnet_id()).await.unwrap();
    client.remove_torrent(999_999u64, false).await.unwrap();
    assert!(client.get_recently_active_torrents(None).await.unwrap().0.is_empty());
    client.start_torrent(TorrentIds::RecentlyActive, false).await.unwrap();

    Ok(())
}
