//! # Transmission RPC Types
//!
//! Protocol level building blocks of the Transmission RPC client: the error
//! taxonomy, method names and enumerated values, the table of fields per
//! protocol version, and read-only typed views over daemon responses.
//!
//! Views never talk to the network. They wrap the raw JSON object the daemon
//! sent and decode fields on access:
//!
//! ```rust
//! use transmission_rpc_types::{Status, Torrent};
//!
//! let raw = serde_json::json!({"id": 1, "status": 4, "percentDone": 0.25});
//! let torrent = Torrent::new(raw.as_object().cloned().unwrap_or_default());
//! assert_eq!(torrent.id(), Some(1));
//! assert_eq!(torrent.status(), Some(Status::Downloading));
//! assert_eq!(torrent.progress(), 25.0);
//! ```

mod bitmap;
mod constants;
mod error;
mod fields;
mod group;
pub mod registry;
mod session;
mod torrent;
mod utils;

pub use bitmap::BitMap;
pub use constants::{
    DEFAULT_HOST, DEFAULT_PATH, DEFAULT_PORT, DEFAULT_TIMEOUT, Encryption, IdleMode, IpProtocol,
    Priority, RatioLimitMode, RpcMethod, SESSION_ID_HEADER,
};
pub use error::{BoxError, Result, TransmissionError};
pub use fields::Fields;
pub use group::Group;
pub use registry::{FieldDescriptor, FieldKind, Table, fields_for, torrent_get_arguments};
pub use session::{PortTestResult, Session, SessionStats, Stats, Units};
pub use torrent::{
    File, FileStat, Peer, PeersFrom, Status, Torrent, Tracker, TrackerStats,
};
pub use utils::{format_timedelta, from_timestamp};
