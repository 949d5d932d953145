//! Torrent view and its nested objects.

use std::fmt;

use chrono::{DateTime, TimeDelta, Utc};

use crate::bitmap::BitMap;
use crate::constants::{IdleMode, Priority, RatioLimitMode};
use crate::error::{Result, TransmissionError};
use crate::fields::{Fields, accessors, value_as_bool, value_as_int, view};
use crate::utils::{format_timedelta, seconds};

const ETA_NOT_AVAILABLE: i64 = -1;
const ETA_UNKNOWN: i64 = -2;

/// Torrent status as reported by the `status` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum Status {
    Stopped,
    CheckPending,
    Checking,
    DownloadPending,
    Downloading,
    SeedPending,
    Seeding,
}

impl Status {
    /// Decodes a status code.
    pub const fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Self::Stopped),
            1 => Some(Self::CheckPending),
            2 => Some(Self::Checking),
            3 => Some(Self::DownloadPending),
            4 => Some(Self::Downloading),
            5 => Some(Self::SeedPending),
            6 => Some(Self::Seeding),
            _ => None,
        }
    }

    /// Wire code.
    pub const fn code(self) -> i64 {
        match self {
            Self::Stopped => 0,
            Self::CheckPending => 1,
            Self::Checking => 2,
            Self::DownloadPending => 3,
            Self::Downloading => 4,
            Self::SeedPending => 5,
            Self::Seeding => 6,
        }
    }

    /// Human readable name, e.g. `"check pending"`.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Stopped => "stopped",
            Self::CheckPending => "check pending",
            Self::Checking => "checking",
            Self::DownloadPending => "download pending",
            Self::Downloading => "downloading",
            Self::SeedPending => "seed pending",
            Self::Seeding => "seeding",
        }
    }

    #[allow(missing_docs)]
    pub fn is_stopped(self) -> bool {
        self == Self::Stopped
    }

    #[allow(missing_docs)]
    pub fn is_check_pending(self) -> bool {
        self == Self::CheckPending
    }

    #[allow(missing_docs)]
    pub fn is_checking(self) -> bool {
        self == Self::Checking
    }

    #[allow(missing_docs)]
    pub fn is_download_pending(self) -> bool {
        self == Self::DownloadPending
    }

    #[allow(missing_docs)]
    pub fn is_downloading(self) -> bool {
        self == Self::Downloading
    }

    #[allow(missing_docs)]
    pub fn is_seed_pending(self) -> bool {
        self == Self::SeedPending
    }

    #[allow(missing_docs)]
    pub fn is_seeding(self) -> bool {
        self == Self::Seeding
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One file of a torrent, assembled by [`Torrent::get_files`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct File {
    /// Index of the file inside the torrent.
    pub id: usize,
    /// Path relative to the download directory.
    pub name: String,
    /// Size in bytes.
    pub size: i64,
    /// Bytes downloaded.
    pub completed: i64,
    /// Download priority.
    pub priority: Priority,
    /// Whether the file is selected for download.
    pub selected: bool,
    /// First piece of the file (protocol 17+).
    pub begin_piece: Option<i64>,
    /// Piece after the last piece of the file (protocol 17+).
    pub end_piece: Option<i64>,
}

view! {
    /// Per-file statistics from `fileStats`.
    FileStat
}

accessors!(FileStat {
    bytes_completed: int = "bytesCompleted",
    wanted: bool = "wanted",
});

impl FileStat {
    /// Download priority of the file.
    pub fn priority(&self) -> Option<Priority> {
        self.fields.int("priority").and_then(Priority::from_value)
    }
}

view! {
    /// A connected peer from `peers`.
    Peer
}

accessors!(Peer {
    address: str = "address",
    client_is_choked: bool = "clientIsChoked",
    client_is_interested: bool = "clientIsInterested",
    client_name: str = "clientName",
    flag_str: str = "flagStr",
    is_downloading_from: bool = "isDownloadingFrom",
    is_encrypted: bool = "isEncrypted",
    is_incoming: bool = "isIncoming",
    is_uploading_to: bool = "isUploadingTo",
    is_utp: bool = "isUTP",
    peer_is_choked: bool = "peerIsChoked",
    peer_is_interested: bool = "peerIsInterested",
    port: int = "port",
    progress: float = "progress",
    rate_to_client: int = "rateToClient",
    rate_to_peer: int = "rateToPeer",
});

view! {
    /// Peer source counters from `peersFrom`.
    PeersFrom
}

accessors!(PeersFrom {
    from_cache: int = "fromCache",
    from_dht: int = "fromDht",
    from_incoming: int = "fromIncoming",
    from_lpd: int = "fromLpd",
    from_ltep: int = "fromLtep",
    from_pex: int = "fromPex",
    from_tracker: int = "fromTracker",
});

view! {
    /// A tracker from `trackers`.
    Tracker
}

accessors!(Tracker {
    id: int = "id",
    announce: str = "announce",
    scrape: str = "scrape",
    sitename: str = "sitename",
    tier: int = "tier",
});

view! {
    /// Tracker statistics from `trackerStats`.
    TrackerStats
}

accessors!(TrackerStats {
    announce: str = "announce",
    announce_state: int = "announceState",
    download_count: int = "downloadCount",
    has_announced: bool = "hasAnnounced",
    has_scraped: bool = "hasScraped",
    host: str = "host",
    id: int = "id",
    is_backup: bool = "isBackup",
    last_announce_peer_count: int = "lastAnnouncePeerCount",
    last_announce_result: str = "lastAnnounceResult",
    last_announce_start_time: int = "lastAnnounceStartTime",
    last_announce_succeeded: bool = "lastAnnounceSucceeded",
    last_announce_time: int = "lastAnnounceTime",
    last_announce_timed_out: bool = "lastAnnounceTimedOut",
    last_scrape_result: str = "lastScrapeResult",
    last_scrape_start_time: int = "lastScrapeStartTime",
    last_scrape_succeeded: bool = "lastScrapeSucceeded",
    last_scrape_time: int = "lastScrapeTime",
    last_scrape_timed_out: bool = "lastScrapeTimedOut",
    leecher_count: int = "leecherCount",
    next_announce_time: int = "nextAnnounceTime",
    next_scrape_time: int = "nextScrapeTime",
    scrape: str = "scrape",
    scrape_state: int = "scrapeState",
    seeder_count: int = "seederCount",
    site_name: str = "sitename",
    tier: int = "tier",
});

view! {
    /// A torrent as returned by `torrent-get`, `torrent-add` and friends.
    ///
    /// Only the fields that were requested are present; every accessor
    /// returns `None` for a missing field.
    Torrent
}

accessors!(Torrent {
    activity_date: date = "activityDate",
    added_date: date = "addedDate",
    comment: str = "comment",
    corrupt_ever: int = "corruptEver",
    creator: str = "creator",
    date_created: date = "dateCreated",
    desired_available: int = "desiredAvailable",
    download_dir: str = "downloadDir",
    downloaded_ever: int = "downloadedEver",
    download_limit: int = "downloadLimit",
    download_limited: bool = "downloadLimited",
    edit_date: date = "editDate",
    error: int = "error",
    error_string: str = "errorString",
    file_count: int = "file-count",
    group: str = "group",
    /// Info hash as a 40 character hex string.
    hash_string: str = "hashString",
    /// Alias of [`Torrent::hash_string`].
    info_hash: str = "hashString",
    #[deprecated(note = "this is a typo, use `info_hash` or `hash_string` instead")]
    into_hash: str = "hashString",
    have_unchecked: int = "haveUnchecked",
    have_valid: int = "haveValid",
    honors_session_limits: bool = "honorsSessionLimits",
    id: int = "id",
    is_finished: bool = "isFinished",
    is_private: bool = "isPrivate",
    is_stalled: bool = "isStalled",
    labels: strings = "labels",
    left_until_done: int = "leftUntilDone",
    magnet_link: str = "magnetLink",
    manual_announce_time: date = "manualAnnounceTime",
    max_connected_peers: int = "maxConnectedPeers",
    metadata_percent_complete: float = "metadataPercentComplete",
    name: str = "name",
    peer_limit: int = "peer-limit",
    peers_connected: int = "peersConnected",
    peers_getting_from_us: int = "peersGettingFromUs",
    peers_sending_to_us: int = "peersSendingToUs",
    percent_complete: float = "percentComplete",
    percent_done: float = "percentDone",
    piece_count: int = "pieceCount",
    piece_size: int = "pieceSize",
    primary_mime_type: str = "primary-mime-type",
    queue_position: int = "queuePosition",
    rate_download: int = "rateDownload",
    rate_upload: int = "rateUpload",
    recheck_progress: float = "recheckProgress",
    seconds_downloading: int = "secondsDownloading",
    seconds_seeding: int = "secondsSeeding",
    seed_idle_limit: int = "seedIdleLimit",
    seed_ratio_limit: float = "seedRatioLimit",
    sequential_download: bool = "sequential_download",
    size_when_done: int = "sizeWhenDone",
    start_date: date = "startDate",
    torrent_file: str = "torrentFile",
    total_size: int = "totalSize",
    uploaded_ever: int = "uploadedEver",
    upload_limit: int = "uploadLimit",
    upload_limited: bool = "uploadLimited",
    upload_ratio: float = "uploadRatio",
    webseeds: strings = "webseeds",
    webseeds_sending_to_us: int = "webseedsSendingToUs",
    availability: ints = "availability",
});

impl Torrent {
    /// Decoded `status`.
    pub fn status(&self) -> Option<Status> {
        self.fields.int("status").and_then(Status::from_code)
    }

    /// Decoded `bandwidthPriority`.
    pub fn bandwidth_priority(&self) -> Option<Priority> {
        self.fields
            .int("bandwidthPriority")
            .and_then(Priority::from_value)
    }

    /// Same as [`Torrent::bandwidth_priority`].
    pub fn priority(&self) -> Option<Priority> {
        self.bandwidth_priority()
    }

    /// Decoded `seedIdleMode`.
    pub fn seed_idle_mode(&self) -> Option<IdleMode> {
        self.fields.int("seedIdleMode").and_then(IdleMode::from_value)
    }

    /// Decoded `seedRatioMode`.
    pub fn seed_ratio_mode(&self) -> Option<RatioLimitMode> {
        self.fields
            .int("seedRatioMode")
            .and_then(RatioLimitMode::from_value)
    }

    /// When the download finished. A zero `doneDate` means it never did.
    pub fn done_date(&self) -> Option<DateTime<Utc>> {
        self.fields.int("doneDate").filter(|&date| date > 0)?;
        self.fields.date("doneDate")
    }

    /// Time left until the download completes; `None` when not available
    /// or unknown.
    pub fn eta(&self) -> Option<TimeDelta> {
        self.fields.int("eta").and_then(duration_or_sentinel)
    }

    /// Time left until the idle seed limit is reached; `None` when not
    /// available or unknown.
    pub fn eta_idle(&self) -> Option<TimeDelta> {
        self.fields.int("etaIdle").and_then(duration_or_sentinel)
    }

    /// Renders `eta` as `"not available"`, `"unknown"` or `"D HH:MM:SS"`.
    pub fn format_eta(&self) -> String {
        match self.fields.int("eta") {
            Some(ETA_UNKNOWN) => "unknown".to_owned(),
            Some(eta) if eta >= 0 => seconds(eta)
                .map(format_timedelta)
                .unwrap_or_else(|| "unknown".to_owned()),
            _ => "not available".to_owned(),
        }
    }

    /// Download progress in percent of the selected data.
    pub fn progress(&self) -> f64 {
        if let Some(done) = self.percent_done() {
            return done * 100.0;
        }
        let size = self.size_when_done().unwrap_or(0);
        if size == 0 {
            return 0.0;
        }
        let left = self.left_until_done().unwrap_or(0);
        100.0 * (size as f64 - left as f64) / size as f64
    }

    /// Percent of the torrent available from us and connected peers.
    pub fn available(&self) -> f64 {
        let total = self.total_size().unwrap_or(0);
        if total == 0 {
            return 0.0;
        }
        let completed: f64 = self
            .fields
            .objects("fileStats")
            .unwrap_or_default()
            .iter()
            .filter_map(|stat| stat.int("bytesCompleted"))
            .map(|bytes| bytes as f64)
            .sum();
        let desired = self.desired_available().unwrap_or(0) as f64;
        100.0 * (desired + completed) / total as f64
    }

    /// Upload ratio, 0 when unknown.
    pub fn ratio(&self) -> f64 {
        self.upload_ratio().unwrap_or(0.0)
    }

    /// Per-file statistics, in the order of `files`.
    pub fn file_stats(&self) -> Option<Vec<FileStat>> {
        views(&self.fields, "fileStats")
    }

    /// Connected peers.
    pub fn peers(&self) -> Option<Vec<Peer>> {
        views(&self.fields, "peers")
    }

    /// Where peers were found.
    pub fn peers_from(&self) -> Option<PeersFrom> {
        self.fields.object("peersFrom").map(PeersFrom::new)
    }

    /// Trackers of the torrent.
    pub fn trackers(&self) -> Option<Vec<Tracker>> {
        views(&self.fields, "trackers")
    }

    /// Per tracker statistics.
    pub fn tracker_stats(&self) -> Option<Vec<TrackerStats>> {
        views(&self.fields, "trackerStats")
    }

    /// Announce URLs from `trackerList`, blank lines between tiers dropped.
    pub fn tracker_list(&self) -> Option<Vec<String>> {
        let list = self.fields.str("trackerList")?;
        Some(
            list.lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_owned)
                .collect(),
        )
    }

    /// Downloaded pieces, decoded from the base64 `pieces` field.
    pub fn pieces(&self) -> Result<Option<BitMap>> {
        self.fields
            .str("pieces")
            .map(BitMap::from_base64)
            .transpose()
    }

    /// Files of the torrent.
    ///
    /// Assembled from `files` and, per attribute, either the `priorities`
    /// and `wanted` arrays or `fileStats`. All arrays present must have the
    /// same length.
    pub fn get_files(&self) -> Result<Vec<File>> {
        let files = self
            .fields
            .objects("files")
            .ok_or_else(|| TransmissionError::protocol("torrent has no `files` field"))?;
        let count = files.len();

        let stats = self.fields.objects("fileStats");
        let priorities = self.parallel("priorities", count)?;
        let wanted = self.parallel("wanted", count)?;
        match &stats {
            Some(stats) if stats.len() != count => {
                return Err(length_mismatch("fileStats", stats.len(), count));
            }
            _ => {}
        }

        files
            .into_iter()
            .enumerate()
            .map(|(index, file)| {
                let stat = stats.as_ref().map(|stats| &stats[index]);

                let priority = match &priorities {
                    Some(priorities) => value_as_int(&priorities[index]),
                    None => stat.and_then(|stat| stat.int("priority")),
                }
                .and_then(Priority::from_value)
                .ok_or_else(|| missing_file_attribute("priority", index))?;

                let selected = match &wanted {
                    Some(wanted) => value_as_bool(&wanted[index]),
                    None => stat.and_then(|stat| stat.bool("wanted")),
                }
                .ok_or_else(|| missing_file_attribute("wanted", index))?;

                Ok(File {
                    id: index,
                    name: file.str("name").unwrap_or_default().to_owned(),
                    size: file.int("length").unwrap_or(0),
                    completed: file.int("bytesCompleted").unwrap_or(0),
                    priority,
                    selected,
                    begin_piece: file.int("begin_piece"),
                    end_piece: file.int("end_piece"),
                })
            })
            .collect()
    }

    fn parallel(&self, key: &str, count: usize) -> Result<Option<&Vec<serde_json::Value>>> {
        match self.fields.get(key).and_then(serde_json::Value::as_array) {
            Some(list) if list.len() != count => Err(length_mismatch(key, list.len(), count)),
            list => Ok(list),
        }
    }
}

impl fmt::Display for Torrent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.id(), self.name()) {
            (Some(id), Some(name)) => write!(f, "<Torrent {id} \"{name}\">"),
            (Some(id), None) => write!(f, "<Torrent {id}>"),
            (None, _) => f.write_str("<Torrent>"),
        }
    }
}

fn duration_or_sentinel(value: i64) -> Option<TimeDelta> {
    match value {
        ETA_NOT_AVAILABLE | ETA_UNKNOWN => None,
        value => seconds(value),
    }
}

fn views<T: From<Fields>>(fields: &Fields, key: &str) -> Option<Vec<T>> {
    fields
        .objects(key)
        .map(|list| list.into_iter().map(T::from).collect())
}

fn length_mismatch(key: &str, len: usize, expected: usize) -> TransmissionError {
    TransmissionError::protocol(format!(
        "`{key}` has {len} entries but the torrent has {expected} files"
    ))
}

fn missing_file_attribute(attribute: &str, index: usize) -> TransmissionError {
    TransmissionError::protocol(format!("no {attribute} for file {index}"))
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};

    use super::*;
    use crate::registry::{Table, torrent_get_arguments};

    fn torrent(value: Value) -> Torrent {
        match value {
            Value::Object(map) => Torrent::new(map),
            _ => unreachable!(),
        }
    }

    fn fixture() -> Value {
        json!({
            "id": 1,
            "name": "test",
            "hashString": "0000000000000000000000000000000000000000",
            "status": 0,
            "bandwidthPriority": 0,
            "desiredAvailable": 0,
            "doneDate": 0,
            "editDate": 0,
            "eta": -1,
            "etaIdle": -1,
            "file-count": 1,
            "files": [
                {"length": 100, "name": "file1", "bytesCompleted": 50, "begin_piece": 0, "end_piece": 1},
            ],
            "fileStats": [{"bytesCompleted": 50, "wanted": true, "priority": 0}],
            "labels": [],
            "leftUntilDone": 50,
            "percentDone": 0.5,
            "pieces": "gA==",
            "priorities": [0],
            "seedIdleMode": 0,
            "seedRatioMode": 0,
            "sizeWhenDone": 100,
            "totalSize": 100,
            "trackerList": "",
            "trackerStats": [],
            "uploadRatio": 0.0,
            "wanted": [1],
        })
    }

    #[test]
    fn test_keys_are_known_fields() {
        let known = torrent_get_arguments(u32::MAX);
        for key in Torrent::KEYS {
            assert!(known.contains(key), "{key} is not a torrent-get field");
        }
        for key in Peer::KEYS.iter().chain(TrackerStats::KEYS) {
            assert!(!key.is_empty());
        }
        assert!(Table::TorrentGet.find("hashString").is_some());
    }

    #[test]
    fn test_basic_properties() {
        let t = torrent(fixture());
        assert_eq!(t.id(), Some(1));
        assert_eq!(t.name(), Some("test"));
        assert_eq!(t.info_hash(), t.hash_string());
        #[allow(deprecated)]
        let legacy = t.into_hash();
        assert_eq!(legacy, t.hash_string());
        assert_eq!(t.get("hashString"), Some(&json!("0000000000000000000000000000000000000000")));
        assert_eq!(t.bandwidth_priority(), Some(Priority::Normal));
        assert_eq!(t.priority(), Some(Priority::Normal));
        assert_eq!(t.seed_idle_mode(), Some(IdleMode::Global));
        assert_eq!(t.seed_ratio_mode(), Some(RatioLimitMode::Global));
        assert_eq!(t.edit_date().map(|d| d.timestamp()), Some(0));
        assert_eq!(t.labels(), Some(vec![]));
        assert_eq!(t.file_count(), Some(1));
        assert_eq!(t.tracker_list(), Some(vec![]));
        assert_eq!(t.tracker_stats().map(|s| s.len()), Some(0));
        assert_eq!(t.comment(), None);
        assert_eq!(t.to_string(), "<Torrent 1 \"test\">");
    }

    #[test]
    fn test_status_codes() {
        let names = [
            "stopped",
            "check pending",
            "checking",
            "download pending",
            "downloading",
            "seed pending",
            "seeding",
        ];
        for (code, name) in names.into_iter().enumerate() {
            let mut value = fixture();
            value["status"] = json!(code);
            let status = torrent(value).status().unwrap();
            assert_eq!(status.code(), code as i64);
            assert_eq!(status.to_string(), name);
        }
        assert!(Status::Stopped.is_stopped());
        assert!(Status::CheckPending.is_check_pending());
        assert!(Status::Checking.is_checking());
        assert!(Status::DownloadPending.is_download_pending());
        assert!(Status::Downloading.is_downloading());
        assert!(Status::SeedPending.is_seed_pending());
        assert!(Status::Seeding.is_seeding());
        assert!(!Status::Seeding.is_stopped());
        assert_eq!(Status::from_code(7), None);
    }

    #[test]
    fn test_eta_sentinels() {
        let t = torrent(fixture());
        assert_eq!(t.eta(), None);
        assert_eq!(t.eta_idle(), None);
        assert_eq!(t.format_eta(), "not available");

        let mut value = fixture();
        value["eta"] = json!(-2);
        let t = torrent(value);
        assert_eq!(t.eta(), None);
        assert_eq!(t.format_eta(), "unknown");

        let mut value = fixture();
        value["eta"] = json!(3600);
        value["etaIdle"] = json!(3600);
        let t = torrent(value);
        assert_eq!(t.eta(), TimeDelta::try_seconds(3600));
        assert_eq!(t.eta_idle(), TimeDelta::try_seconds(3600));
        assert_eq!(t.format_eta(), "0 01:00:00");
    }

    #[test]
    fn test_done_date() {
        assert_eq!(torrent(fixture()).done_date(), None);

        let mut value = fixture();
        value["doneDate"] = json!(1000);
        assert_eq!(torrent(value).done_date().map(|d| d.timestamp()), Some(1000));
    }

    #[test]
    fn test_progress() {
        assert_eq!(torrent(fixture()).progress(), 50.0);

        let t = torrent(json!({"percentDone": 1.0}));
        assert_eq!(t.progress(), 100.0);

        let mut value = fixture();
        value.as_object_mut().unwrap().remove("percentDone");
        assert_eq!(torrent(value).progress(), 50.0);

        let t = torrent(json!({"sizeWhenDone": 0, "leftUntilDone": 0}));
        assert_eq!(t.progress(), 0.0);
    }

    #[test]
    fn test_progress_with_out_of_range_sizes() {
        let t = torrent(json!({"sizeWhenDone": i64::MAX, "leftUntilDone": -5}));
        assert!(t.progress().is_finite());
        assert!(t.progress() >= 100.0);
    }

    #[test]
    fn test_available() {
        assert_eq!(torrent(fixture()).available(), 50.0);

        let mut value = fixture();
        value["totalSize"] = json!(0);
        assert_eq!(torrent(value).available(), 0.0);
    }

    #[test]
    fn test_available_with_out_of_range_sizes() {
        let t = torrent(json!({
            "totalSize": 10,
            "desiredAvailable": i64::MAX,
            "fileStats": [{"bytesCompleted": 5}, {"bytesCompleted": i64::MAX}],
        }));
        assert!(t.available().is_finite());
        assert!(t.available() > 100.0);
    }

    #[test]
    fn test_file_stats() {
        let stats = torrent(fixture()).file_stats().unwrap();
        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].bytes_completed(), Some(50));
        assert_eq!(stats[0].wanted(), Some(true));
        assert_eq!(stats[0].priority(), Some(Priority::Normal));

        assert!(torrent(json!({})).file_stats().is_none());
    }

    #[test]
    fn test_ratio() {
        assert_eq!(torrent(json!({"uploadRatio": 1.0})).ratio(), 1.0);
        assert_eq!(torrent(json!({})).ratio(), 0.0);
    }

    #[test]
    fn test_get_files_from_parallel_arrays() {
        let files = torrent(fixture()).get_files().unwrap();
        assert_eq!(
            files,
            vec![File {
                id: 0,
                name: "file1".into(),
                size: 100,
                completed: 50,
                priority: Priority::Normal,
                selected: true,
                begin_piece: Some(0),
                end_piece: Some(1),
            }]
        );
    }

    #[test]
    fn test_get_files_from_file_stats() {
        let t = torrent(json!({
            "files": [{"name": "f1", "bytesCompleted": 100, "length": 1000}],
            "fileStats": [{"bytesCompleted": 100, "wanted": true, "priority": 1}],
        }));
        let files = t.get_files().unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].priority, Priority::High);
        assert!(files[0].selected);
        assert_eq!(files[0].begin_piece, None);
    }

    #[test]
    fn test_get_files_length_mismatch() {
        let mut value = fixture();
        value["priorities"] = json!([0, 1]);
        let err = torrent(value).get_files().unwrap_err();
        assert!(err.is_protocol());
        assert!(err.to_string().contains("priorities"));
    }

    #[test]
    fn test_get_files_missing_sources() {
        let err = torrent(json!({})).get_files().unwrap_err();
        assert!(err.is_protocol());

        let t = torrent(json!({"files": [{"name": "f", "length": 1, "bytesCompleted": 0}]}));
        assert!(t.get_files().unwrap_err().is_protocol());
    }

    #[test]
    fn test_pieces() {
        let pieces = torrent(fixture()).pieces().unwrap().unwrap();
        assert!(pieces.get(0));
        assert!(!pieces.get(1));
        assert_eq!(torrent(json!({})).pieces().unwrap(), None);
    }

    #[test]
    fn test_tracker_list_tiers() {
        let t = torrent(json!({"trackerList": "http://a/announce\n\nhttp://b/announce\nhttp://c/announce\n"}));
        assert_eq!(
            t.tracker_list().unwrap(),
            vec!["http://a/announce", "http://b/announce", "http://c/announce"]
        );
    }

    #[test]
    fn test_nested_views() {
        let t = torrent(json!({
            "peersFrom": {
                "fromCache": 1,
                "fromDht": 2,
                "fromIncoming": 3,
                "fromLpd": 4,
                "fromLtep": 5,
                "fromPex": 6,
                "fromTracker": 7,
            },
            "trackers": [{"announce": "url", "id": 1, "scrape": "url", "tier": 1}],
            "peers": [{
                "address": "1.2.3.4",
                "clientName": "client",
                "isUTP": false,
                "port": 51413,
                "progress": 0.5,
                "rateToClient": 100,
            }],
        }));
        let from = t.peers_from().unwrap();
        assert_eq!(from.from_cache(), Some(1));
        assert_eq!(from.from_tracker(), Some(7));

        let trackers = t.trackers().unwrap();
        assert_eq!(trackers[0].announce(), Some("url"));
        assert_eq!(trackers[0].tier(), Some(1));

        let peers = t.peers().unwrap();
        assert_eq!(peers[0].address(), Some("1.2.3.4"));
        assert_eq!(peers[0].client_name(), Some("client"));
        assert_eq!(peers[0].is_utp(), Some(false));
        assert_eq!(peers[0].rate_to_client(), Some(100));
        assert_eq!(peers[0].progress(), Some(0.5));
    }

    #[test]
    fn test_tracker_stats_and_file_stat() {
        let stats = TrackerStats::new(Fields::new(
            json!({
                "announceState": 1,
                "hasAnnounced": true,
                "lastAnnounceResult": "ok",
                "sitename": "site",
                "seederCount": 3,
            })
            .as_object()
            .cloned()
            .unwrap(),
        ));
        assert_eq!(stats.announce_state(), Some(1));
        assert_eq!(stats.has_announced(), Some(true));
        assert_eq!(stats.last_announce_result(), Some("ok"));
        assert_eq!(stats.site_name(), Some("site"));
        assert_eq!(stats.seeder_count(), Some(3));

        let stat = FileStat::new(
            json!({"bytesCompleted": 100, "wanted": true, "priority": 1})
                .as_object()
                .cloned()
                .unwrap(),
        );
        assert_eq!(stat.bytes_completed(), Some(100));
        assert_eq!(stat.wanted(), Some(true));
        assert_eq!(stat.priority(), Some(Priority::High));
    }
}
