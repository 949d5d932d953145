//! # Transmission RPC client.
//!
//! Async client for the JSON-RPC interface of the Transmission BitTorrent
//! daemon. It handles the `X-Transmission-Session-Id` handshake, keeps a small
//! pool of keep-alive connections over TCP, TLS or a Unix socket, and checks
//! every call against the protocol version the daemon reported.
//!
//! The client needs a tokio runtime. Every connection [`HttpPool`] opens is
//! driven by a task spawned with `tokio::spawn`. The task ends once the
//! connection is dropped from the pool or closed by the daemon.
//!
//! usage:
//!
//! ```rust,no_run
//! use transmission_rpc_client::{AddTorrentArgs, Client, TorrentIds};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = Client::from_url("http://127.0.0.1:9091/transmission/rpc").await?;
//!     let torrent = client
//!         .add_torrent("magnet:?xt=urn:btih:08ada5a7a6183aae1e09d831df6748d566095a10", AddTorrentArgs::default())
//!         .await?;
//!     println!("added {torrent}");
//!
//!     for torrent in client.get_torrents(None, Some(&["name", "status", "percentDone"])).await? {
//!         println!("{torrent}: {:.1}%", torrent.progress());
//!     }
//!     client.stop_torrent(TorrentIds::RecentlyActive).await?;
//!     Ok(())
//! }
//! ```

mod args;
mod client;
mod config;
mod ids;
mod rpc;
mod transport;

#[cfg(test)]
mod testutil;

pub use args::{AddTorrentArgs, GroupChange, SessionChange, TorrentChange, TorrentSource};
pub use client::Client;
pub use config::{ClientConfig, DEFAULT_MAX_IDLE_CONNECTIONS, Protocol, RPC_URL_ENV};
pub use ids::{TorrentId, TorrentIds, parse_torrent_id, parse_torrent_ids};
pub use transport::{HttpPool, HttpRequest, HttpResponse, Transport, TransportError};
pub use transmission_rpc_types::*;

