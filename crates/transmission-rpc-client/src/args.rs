//! Argument builders for the mutating calls.
//!
//! Every builder serializes to the wire spelling of its fields, skipping the
//! ones left as `None`. Keys the builder has no field for can be passed
//! through `extra`, which is merged verbatim.

use std::path::PathBuf;

use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use transmission_rpc_types::{
    Encryption, IdleMode, Priority, RatioLimitMode, Result, TransmissionError,
};

/// Serializes a builder into an argument object.
pub(crate) fn to_arguments<T: Serialize>(value: &T) -> Result<Map<String, Value>> {
    match serde_json::to_value(value) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(TransmissionError::invalid_usage(format!(
            "arguments must serialize to an object, got {other}"
        ))),
        Err(e) => Err(TransmissionError::invalid_usage("failed to serialize arguments").with_source(e)),
    }
}

/// What to add with `torrent-add`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TorrentSource {
    /// `http://`, `https://` or `magnet:` URL, or a path on the daemon host.
    Filename(String),
    /// Content of a `.torrent` file.
    Metainfo(Vec<u8>),
    /// A `.torrent` file on this machine, read when the call is made.
    Path(PathBuf),
}

impl From<&str> for TorrentSource {
    fn from(url: &str) -> Self {
        Self::Filename(url.to_owned())
    }
}

impl From<String> for TorrentSource {
    fn from(url: String) -> Self {
        Self::Filename(url)
    }
}

impl From<Vec<u8>> for TorrentSource {
    fn from(metainfo: Vec<u8>) -> Self {
        Self::Metainfo(metainfo)
    }
}

impl From<&[u8]> for TorrentSource {
    fn from(metainfo: &[u8]) -> Self {
        Self::Metainfo(metainfo.to_vec())
    }
}

impl From<PathBuf> for TorrentSource {
    fn from(path: PathBuf) -> Self {
        Self::Path(path)
    }
}

impl From<&std::path::Path> for TorrentSource {
    fn from(path: &std::path::Path) -> Self {
        Self::Path(path.to_path_buf())
    }
}

/// Optional arguments of `torrent-add`.
#[derive(Debug, Clone, Default, Serialize)]
#[allow(missing_docs)]
pub struct AddTorrentArgs {
    #[serde(rename = "download-dir", skip_serializing_if = "Option::is_none")]
    pub download_dir: Option<String>,
    /// Add without starting.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paused: Option<bool>,
    #[serde(rename = "peer-limit", skip_serializing_if = "Option::is_none")]
    pub peer_limit: Option<i64>,
    #[serde(rename = "bandwidthPriority", skip_serializing_if = "Option::is_none")]
    pub bandwidth_priority: Option<Priority>,
    #[serde(rename = "files-wanted", skip_serializing_if = "Option::is_none")]
    pub files_wanted: Option<Vec<usize>>,
    #[serde(rename = "files-unwanted", skip_serializing_if = "Option::is_none")]
    pub files_unwanted: Option<Vec<usize>>,
    #[serde(rename = "priority-high", skip_serializing_if = "Option::is_none")]
    pub priority_high: Option<Vec<usize>>,
    #[serde(rename = "priority-low", skip_serializing_if = "Option::is_none")]
    pub priority_low: Option<Vec<usize>>,
    #[serde(rename = "priority-normal", skip_serializing_if = "Option::is_none")]
    pub priority_normal: Option<Vec<usize>>,
    /// Cookie header value used when the daemon fetches a URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cookies: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sequential_download: Option<bool>,
    /// Passed through unchanged.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Arguments of `torrent-set`.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
#[allow(missing_docs)]
pub struct TorrentChange {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bandwidth_priority: Option<Priority>,
    /// KBps.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_limit: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_limited: Option<bool>,
    #[serde(rename = "files-wanted", skip_serializing_if = "Option::is_none")]
    pub files_wanted: Option<Vec<usize>>,
    #[serde(rename = "files-unwanted", skip_serializing_if = "Option::is_none")]
    pub files_unwanted: Option<Vec<usize>>,
    /// Bandwidth group.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub honors_session_limits: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<String>>,
    /// New location, without moving data. See `move_torrent_data` to move.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(rename = "peer-limit", skip_serializing_if = "Option::is_none")]
    pub peer_limit: Option<i64>,
    #[serde(rename = "priority-high", skip_serializing_if = "Option::is_none")]
    pub priority_high: Option<Vec<usize>>,
    #[serde(rename = "priority-low", skip_serializing_if = "Option::is_none")]
    pub priority_low: Option<Vec<usize>>,
    #[serde(rename = "priority-normal", skip_serializing_if = "Option::is_none")]
    pub priority_normal: Option<Vec<usize>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub queue_position: Option<i64>,
    /// Minutes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed_idle_limit: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed_idle_mode: Option<IdleMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed_ratio_limit: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed_ratio_mode: Option<RatioLimitMode>,
    #[serde(rename = "sequential_download", skip_serializing_if = "Option::is_none")]
    pub sequential_download: Option<bool>,
    /// Tracker tiers. Sent as one announce URL per line, tiers separated by an
    /// empty line.
    #[serde(
        serialize_with = "serialize_tracker_tiers",
        skip_serializing_if = "Option::is_none"
    )]
    pub tracker_list: Option<Vec<Vec<String>>>,
    /// Only for daemons older than protocol 17; use `tracker_list` otherwise.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tracker_add: Option<Vec<String>>,
    /// Only for daemons older than protocol 17; use `tracker_list` otherwise.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tracker_remove: Option<Vec<i64>>,
    /// KBps.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upload_limit: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upload_limited: Option<bool>,
    /// Passed through unchanged.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Arguments of `session-set`.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
#[allow(missing_docs)]
pub struct SessionChange {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alt_speed_down: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alt_speed_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alt_speed_time_begin: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alt_speed_time_day: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alt_speed_time_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alt_speed_time_end: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alt_speed_up: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blocklist_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blocklist_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_size_mb: Option<i64>,
    /// Announce URLs added to every public torrent, one per entry.
    #[serde(
        serialize_with = "serialize_lines",
        skip_serializing_if = "Option::is_none"
    )]
    pub default_trackers: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dht_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_dir: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_queue_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_queue_size: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encryption: Option<Encryption>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub idle_seeding_limit: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub idle_seeding_limit_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub incomplete_dir: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub incomplete_dir_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lpd_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub peer_limit_global: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub peer_limit_per_torrent: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub peer_port: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub peer_port_random_on_start: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pex_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port_forwarding_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub queue_stalled_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub queue_stalled_minutes: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rename_partial_files: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub script_torrent_added_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub script_torrent_added_filename: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub script_torrent_done_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub script_torrent_done_filename: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub script_torrent_done_seeding_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub script_torrent_done_seeding_filename: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed_queue_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed_queue_size: Option<i64>,
    #[serde(rename = "seedRatioLimit", skip_serializing_if = "Option::is_none")]
    pub seed_ratio_limit: Option<f64>,
    #[serde(rename = "seedRatioLimited", skip_serializing_if = "Option::is_none")]
    pub seed_ratio_limited: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed_limit_down: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed_limit_down_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed_limit_up: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed_limit_up_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_added_torrents: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trash_original_torrent_files: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub utp_enabled: Option<bool>,
    /// Passed through unchanged, for settings newer than this crate.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Arguments of `group-set`, besides the group name.
#[derive(Debug, Clone, Default, Serialize)]
#[allow(missing_docs)]
pub struct GroupChange {
    #[serde(rename = "bandwidthPriority", skip_serializing_if = "Option::is_none")]
    pub bandwidth_priority: Option<Priority>,
    #[serde(rename = "honorsSessionLimits", skip_serializing_if = "Option::is_none")]
    pub honors_session_limits: Option<bool>,
    #[serde(rename = "speed-limit-down", skip_serializing_if = "Option::is_none")]
    pub speed_limit_down: Option<i64>,
    #[serde(rename = "speed-limit-down-enabled", skip_serializing_if = "Option::is_none")]
    pub speed_limit_down_enabled: Option<bool>,
    #[serde(rename = "speed-limit-up", skip_serializing_if = "Option::is_none")]
    pub speed_limit_up: Option<i64>,
    #[serde(rename = "speed-limit-up-enabled", skip_serializing_if = "Option::is_none")]
    pub speed_limit_up_enabled: Option<bool>,
    /// Passed through unchanged.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn serialize_lines<S: Serializer>(
    lines: &Option<Vec<String>>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    match lines {
        Some(lines) => serializer.serialize_str(&lines.join("\n")),
        None => serializer.serialize_none(),
    }
}

fn serialize_tracker_tiers<S: Serializer>(
    tiers: &Option<Vec<Vec<String>>>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    match tiers {
        Some(tiers) => {
            let tiers: Vec<String> = tiers.iter().map(|tier| tier.join("\n")).collect();
            serializer.serialize_str(&tiers.join("\n\n"))
        }
        None => serializer.serialize_none(),
    }
}
