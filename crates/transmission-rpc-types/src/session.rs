//! Session views: settings, unit tables, statistics and the port check.

use serde_json::Value;

use crate::constants::{Encryption, IpProtocol};
use crate::fields::{accessors, view};

view! {
    /// Daemon settings as returned by `session-get`.
    Session
}

accessors!(Session {
    alt_speed_down: int = "alt-speed-down",
    alt_speed_enabled: bool = "alt-speed-enabled",
    alt_speed_time_begin: int = "alt-speed-time-begin",
    alt_speed_time_day: int = "alt-speed-time-day",
    alt_speed_time_enabled: bool = "alt-speed-time-enabled",
    alt_speed_time_end: int = "alt-speed-time-end",
    alt_speed_up: int = "alt-speed-up",
    blocklist_enabled: bool = "blocklist-enabled",
    blocklist_size: int = "blocklist-size",
    blocklist_url: str = "blocklist-url",
    cache_size_mb: int = "cache-size-mb",
    config_dir: str = "config-dir",
    dht_enabled: bool = "dht-enabled",
    download_dir: str = "download-dir",
    /// Deprecated by the daemon in favour of the `free-space` call.
    download_dir_free_space: int = "download-dir-free-space",
    download_queue_enabled: bool = "download-queue-enabled",
    download_queue_size: int = "download-queue-size",
    idle_seeding_limit: int = "idle-seeding-limit",
    idle_seeding_limit_enabled: bool = "idle-seeding-limit-enabled",
    incomplete_dir: str = "incomplete-dir",
    incomplete_dir_enabled: bool = "incomplete-dir-enabled",
    lpd_enabled: bool = "lpd-enabled",
    peer_limit_global: int = "peer-limit-global",
    peer_limit_per_torrent: int = "peer-limit-per-torrent",
    peer_port: int = "peer-port",
    peer_port_random_on_start: bool = "peer-port-random-on-start",
    pex_enabled: bool = "pex-enabled",
    port_forwarding_enabled: bool = "port-forwarding-enabled",
    queue_stalled_enabled: bool = "queue-stalled-enabled",
    queue_stalled_minutes: int = "queue-stalled-minutes",
    rename_partial_files: bool = "rename-partial-files",
    rpc_version: int = "rpc-version",
    rpc_version_minimum: int = "rpc-version-minimum",
    rpc_version_semver: str = "rpc-version-semver",
    script_torrent_added_enabled: bool = "script-torrent-added-enabled",
    script_torrent_added_filename: str = "script-torrent-added-filename",
    script_torrent_done_enabled: bool = "script-torrent-done-enabled",
    script_torrent_done_filename: str = "script-torrent-done-filename",
    script_torrent_done_seeding_enabled: bool = "script-torrent-done-seeding-enabled",
    script_torrent_done_seeding_filename: str = "script-torrent-done-seeding-filename",
    seed_queue_enabled: bool = "seed-queue-enabled",
    seed_queue_size: int = "seed-queue-size",
    seed_ratio_limit: float = "seedRatioLimit",
    seed_ratio_limited: bool = "seedRatioLimited",
    session_id: str = "session-id",
    speed_limit_down: int = "speed-limit-down",
    speed_limit_down_enabled: bool = "speed-limit-down-enabled",
    speed_limit_up: int = "speed-limit-up",
    speed_limit_up_enabled: bool = "speed-limit-up-enabled",
    start_added_torrents: bool = "start-added-torrents",
    trash_original_torrent_files: bool = "trash-original-torrent-files",
    utp_enabled: bool = "utp-enabled",
    version: str = "version",
});

impl Session {
    /// Encryption preference. Unknown values read as `None`.
    pub fn encryption(&self) -> Option<Encryption> {
        self.fields.str("encryption")?.parse().ok()
    }

    /// Unit names and sizes.
    pub fn units(&self) -> Option<Units> {
        self.fields.object("units").map(Units::new)
    }

    /// Default trackers, one per entry.
    ///
    /// Daemons send a newline separated string; a list is accepted too.
    pub fn default_trackers(&self) -> Option<Vec<String>> {
        match self.fields.get("default-trackers")? {
            Value::String(trackers) => Some(
                trackers
                    .lines()
                    .map(str::trim)
                    .filter(|line| !line.is_empty())
                    .map(str::to_owned)
                    .collect(),
            ),
            Value::Array(_) => self.fields.strings("default-trackers"),
            _ => None,
        }
    }
}

view! {
    /// Units the daemon uses to display sizes and speeds.
    Units
}

accessors!(Units {
    speed_units: strings = "speed-units",
    speed_bytes: int = "speed-bytes",
    size_units: strings = "size-units",
    size_bytes: int = "size-bytes",
    memory_units: strings = "memory-units",
    memory_bytes: int = "memory-bytes",
});

view! {
    /// Transfer counters for one period.
    Stats
}

accessors!(Stats {
    uploaded_bytes: int = "uploadedBytes",
    downloaded_bytes: int = "downloadedBytes",
    files_added: int = "filesAdded",
    session_count: int = "sessionCount",
    seconds_active: int = "secondsActive",
});

view! {
    /// Result of `session-stats`.
    SessionStats
}

accessors!(SessionStats {
    active_torrent_count: int = "activeTorrentCount",
    download_speed: int = "downloadSpeed",
    paused_torrent_count: int = "pausedTorrentCount",
    torrent_count: int = "torrentCount",
    upload_speed: int = "uploadSpeed",
});

impl SessionStats {
    /// Counters since the daemon was first started.
    pub fn cumulative_stats(&self) -> Option<Stats> {
        self.fields.object("cumulative-stats").map(Stats::new)
    }

    /// Counters of the running daemon.
    pub fn current_stats(&self) -> Option<Stats> {
        self.fields.object("current-stats").map(Stats::new)
    }
}

view! {
    /// Result of `port-test`.
    PortTestResult
}

accessors!(PortTestResult {
    port_is_open: bool = "port-is-open",
});

impl PortTestResult {
    /// Address family that was tested, when the daemon reports it.
    pub fn ip_protocol(&self) -> Option<IpProtocol> {
        self.fields.str("ip_protocol")?.parse().ok()
    }
}
