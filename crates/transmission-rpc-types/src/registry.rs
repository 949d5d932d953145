//! Protocol version registry.
//!
//! Every request argument and response field the client knows about is listed
//! here with the protocol version range it is valid in. The client uses the
//! tables to decide which torrent fields to request and to warn when a caller
//! passes an argument the connected daemon does not understand.

use std::fmt;

use tracing::warn;

/// JSON type of a field as documented by the protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum FieldKind {
    Number,
    Double,
    Boolean,
    String,
    Array,
    Object,
}

/// A field or argument together with the versions it is valid in.
///
/// The field is visible at version `v` when `added_version <= v` and either
/// there is no `removed_version` or `removed_version > v`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDescriptor {
    /// Wire name.
    pub name: &'static str,
    /// JSON type.
    pub kind: FieldKind,
    /// First version the field exists in.
    pub added_version: u32,
    /// First version the field no longer exists in.
    pub removed_version: Option<u32>,
    /// Name the field had before it was renamed to this one.
    pub previous_name: Option<&'static str>,
    /// Name that replaced this field.
    pub next_name: Option<&'static str>,
    /// Short description.
    pub description: &'static str,
}

impl FieldDescriptor {
    const fn new(
        name: &'static str,
        kind: FieldKind,
        added_version: u32,
        description: &'static str,
    ) -> Self {
        Self {
            name,
            kind,
            added_version,
            removed_version: None,
            previous_name: None,
            next_name: None,
            description,
        }
    }

    const fn removed(mut self, version: u32) -> Self {
        self.removed_version = Some(version);
        self
    }

    const fn previous(mut self, name: &'static str) -> Self {
        self.previous_name = Some(name);
        self
    }

    const fn next(mut self, name: &'static str) -> Self {
        self.next_name = Some(name);
        self
    }

    /// Whether the field exists at `version`.
    pub const fn is_available(&self, version: u32) -> bool {
        if self.added_version > version {
            return false;
        }
        match self.removed_version {
            Some(removed) => removed > version,
            None => true,
        }
    }
}

impl fmt::Display for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}<{:?}, added in {}",
            self.name, self.kind, self.added_version
        )?;
        if let Some(removed) = self.removed_version {
            write!(f, ", removed in {removed}")?;
        }
        write!(f, ">: {}", self.description)
    }
}

/// Which table to look a name up in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    /// Fields returned by `torrent-get`.
    TorrentGet,
    /// Arguments accepted by `torrent-set`.
    TorrentSet,
    /// Arguments accepted by `torrent-add`.
    TorrentAdd,
    /// Fields returned by `session-get` and accepted by `session-set`.
    Session,
    /// Arguments accepted by `group-set`.
    GroupSet,
}

impl Table {
    /// The descriptors of this table.
    pub fn descriptors(self) -> &'static [FieldDescriptor] {
        match self {
            Self::TorrentGet => TORRENT_GET,
            Self::TorrentSet => TORRENT_SET,
            Self::TorrentAdd => TORRENT_ADD,
            Self::Session => SESSION,
            Self::GroupSet => GROUP_SET,
        }
    }

    /// Looks up a descriptor by wire name.
    pub fn find(self, name: &str) -> Option<&'static FieldDescriptor> {
        self.descriptors().iter().find(|field| field.name == name)
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::TorrentGet => "torrent-get",
            Self::TorrentSet => "torrent-set",
            Self::TorrentAdd => "torrent-add",
            Self::Session => "session",
            Self::GroupSet => "group-set",
        })
    }
}

/// Descriptors of `table` visible at `version`.
pub fn fields_for(table: Table, version: u32) -> Vec<&'static FieldDescriptor> {
    table
        .descriptors()
        .iter()
        .filter(|field| field.is_available(version))
        .collect()
}

/// Field names requested by a bulk `torrent-get` at `version`.
pub fn torrent_get_arguments(version: u32) -> Vec<&'static str> {
    fields_for(Table::TorrentGet, version)
        .into_iter()
        .map(|field| field.name)
        .collect()
}

/// Why an argument is not usable at a given version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgumentIssue {
    /// The name is not in the table at all.
    Unknown {
        /// The offending name.
        name: String,
    },
    /// The daemon is older than the argument.
    NotYetAvailable {
        /// The offending name.
        name: String,
        /// Version the argument was introduced in.
        added_version: u32,
    },
    /// The daemon is newer than the argument.
    Removed {
        /// The offending name.
        name: String,
        /// Version the argument was removed in.
        removed_version: u32,
        /// Replacement, if the protocol defines one.
        replacement: Option<&'static str>,
    },
}

impl fmt::Display for ArgumentIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown { name } => write!(f, "argument {name:?} is not known"),
            Self::NotYetAvailable {
                name,
                added_version,
            } => write!(
                f,
                "argument {name:?} requires protocol version {added_version}"
            ),
            Self::Removed {
                name,
                removed_version,
                replacement: Some(replacement),
            } => write!(
                f,
                "argument {name:?} was removed in protocol version {removed_version}, use {replacement:?} instead"
            ),
            Self::Removed {
                name,
                removed_version,
                replacement: None,
            } => write!(
                f,
                "argument {name:?} was removed in protocol version {removed_version}"
            ),
        }
    }
}

/// Checks each name against `table` at `version`.
pub fn check_arguments<'a>(
    table: Table,
    names: impl IntoIterator<Item = &'a str>,
    version: u32,
) -> Vec<ArgumentIssue> {
    names
        .into_iter()
        .filter_map(|name| match table.find(name) {
            None => Some(ArgumentIssue::Unknown {
                name: name.to_owned(),
            }),
            Some(field) if field.added_version > version => Some(ArgumentIssue::NotYetAvailable {
                name: name.to_owned(),
                added_version: field.added_version,
            }),
            Some(field) => match field.removed_version {
                Some(removed) if removed <= version => Some(ArgumentIssue::Removed {
                    name: name.to_owned(),
                    removed_version: removed,
                    replacement: field.next_name,
                }),
                _ => None,
            },
        })
        .collect()
}

/// Like [`check_arguments`], but logs every issue as a warning.
pub fn warn_arguments<'a>(
    table: Table,
    names: impl IntoIterator<Item = &'a str>,
    version: u32,
) -> usize {
    let issues = check_arguments(table, names, version);
    for issue in &issues {
        warn!(%table, rpc_version = version, "{issue}");
    }
    issues.len()
}

use FieldKind::{Array, Boolean, Double, Number, Object, String as Str};

const fn f(
    name: &'static str,
    kind: FieldKind,
    added_version: u32,
    description: &'static str,
) -> FieldDescriptor {
    FieldDescriptor::new(name, kind, added_version, description)
}

/// Fields returned by `torrent-get`.
pub static TORRENT_GET: &[FieldDescriptor] = &[
    f("activityDate", Number, 1, "Last time of upload or download activity."),
    f("addedDate", Number, 1, "The date when this torrent was first added."),
    f("announceResponse", Str, 1, "The announce message from the tracker.").removed(7),
    f("announceURL", Str, 1, "Current announce URL.").removed(7),
    f("availability", Array, 18, "Number of peers having each piece."),
    f("bandwidthPriority", Number, 5, "Bandwidth priority."),
    f("comment", Str, 1, "Torrent comment."),
    f("corruptEver", Number, 1, "Bytes of corrupt data downloaded."),
    f("creator", Str, 1, "Torrent creator."),
    f("dateCreated", Number, 1, "Torrent creation date."),
    f("desiredAvailable", Number, 1, "Bytes needed that peers can provide."),
    f("doneDate", Number, 1, "The date when the torrent finished downloading."),
    f("downloadDir", Str, 4, "The directory data is downloaded to."),
    f("downloadedEver", Number, 1, "Bytes downloaded over the torrent lifetime."),
    f("downloaders", Number, 4, "Number of downloaders reported by the tracker.").removed(7),
    f("downloadLimit", Number, 1, "Download limit in KBps."),
    f("downloadLimitMode", Number, 1, "Download limit mode.").removed(5),
    f("downloadLimited", Boolean, 5, "Download limit is enabled."),
    f("editDate", Number, 16, "The last time the torrent metadata changed."),
    f("error", Number, 1, "Kind of error."),
    f("errorString", Str, 1, "Error message."),
    f("eta", Number, 1, "Estimated seconds until download completes."),
    f("etaIdle", Number, 15, "Estimated seconds until the idle seed limit is reached."),
    f("file-count", Number, 17, "Number of files."),
    f("files", Array, 1, "Array of file objects."),
    f("fileStats", Array, 5, "Array of per-file statistics."),
    f("group", Str, 17, "Bandwidth group name."),
    f("hashString", Str, 1, "Info hash."),
    f("haveUnchecked", Number, 1, "Bytes of unchecked data."),
    f("haveValid", Number, 1, "Bytes of checksum verified data."),
    f("honorsSessionLimits", Boolean, 5, "Session speed limits apply to the torrent."),
    f("id", Number, 1, "Session unique torrent id."),
    f("isFinished", Boolean, 9, "The torrent has reached its seed limit."),
    f("isPrivate", Boolean, 1, "The torrent is private."),
    f("isStalled", Boolean, 14, "The torrent has been idle for too long."),
    f("labels", Array, 16, "Labels attached to the torrent."),
    f("lastAnnounceTime", Number, 1, "Time of the last announce.").removed(7),
    f("lastScrapeTime", Number, 1, "Time of the last scrape.").removed(7),
    f("leechers", Number, 1, "Number of leechers reported by the tracker.").removed(7),
    f("leftUntilDone", Number, 1, "Bytes left until the download is done."),
    f("magnetLink", Str, 7, "The magnet link for this torrent."),
    f("manualAnnounceTime", Number, 1, "Time when a manual announce is allowed."),
    f("maxConnectedPeers", Number, 1, "Maximum number of connected peers."),
    f("metadataPercentComplete", Double, 7, "Metadata download progress, 0.0 to 1.0."),
    f("name", Str, 1, "Torrent name."),
    f("nextAnnounceTime", Number, 1, "Time of the next announce.").removed(7),
    f("nextScrapeTime", Number, 1, "Time of the next scrape.").removed(7),
    f("peer-limit", Number, 5, "Maximum number of peers."),
    f("peers", Array, 2, "Array of peer objects."),
    f("peersConnected", Number, 1, "Number of connected peers."),
    f("peersFrom", Object, 1, "How many peers were found from each source."),
    f("peersGettingFromUs", Number, 1, "Number of peers we are uploading to."),
    f("peersKnown", Number, 1, "Number of peers known.").removed(13),
    f("peersSendingToUs", Number, 1, "Number of peers we are downloading from."),
    f("percentComplete", Double, 17, "Progress of the whole torrent, 0.0 to 1.0."),
    f("percentDone", Double, 5, "Progress of the selected files, 0.0 to 1.0."),
    f("pieceCount", Number, 1, "Number of pieces."),
    f("pieceSize", Number, 1, "Size of a piece in bytes."),
    f("pieces", Str, 5, "Base64 encoded bitfield of downloaded pieces."),
    f("primary-mime-type", Str, 17, "Mime type of the largest share of content."),
    f("priorities", Array, 1, "Priority of each file."),
    f("queuePosition", Number, 14, "Position in the queue."),
    f("rateDownload", Number, 1, "Download rate in bytes per second."),
    f("rateUpload", Number, 1, "Upload rate in bytes per second."),
    f("recheckProgress", Double, 1, "Verification progress, 0.0 to 1.0."),
    f("scrapeResponse", Str, 1, "Scrape message from the tracker.").removed(7),
    f("scrapeURL", Str, 1, "Current scrape URL.").removed(7),
    f("secondsDownloading", Number, 15, "Seconds spent downloading."),
    f("secondsSeeding", Number, 15, "Seconds spent seeding."),
    f("seedIdleLimit", Number, 10, "Idle minutes before seeding stops."),
    f("seedIdleMode", Number, 10, "Which idle limit applies."),
    f("seedRatioLimit", Double, 5, "Ratio at which seeding stops."),
    f("seedRatioMode", Number, 5, "Which ratio limit applies."),
    f("seeders", Number, 1, "Number of seeders reported by the tracker.").removed(7),
    f("sequential_download", Boolean, 18, "Pieces are downloaded in order."),
    f("sizeWhenDone", Number, 1, "Bytes of selected data when complete."),
    f("startDate", Number, 1, "The last time the torrent was started."),
    f("status", Number, 1, "Torrent status code."),
    f("timesCompleted", Number, 1, "Completed downloads reported by the tracker.").removed(7),
    f("torrentFile", Str, 5, "Path to the torrent file."),
    f("totalSize", Number, 1, "Total size of the torrent in bytes."),
    f("trackerList", Str, 17, "Announce URLs, one per line, tiers separated by blank lines."),
    f("trackers", Array, 1, "Array of tracker objects."),
    f("trackerStats", Array, 7, "Array of tracker statistics."),
    f("uploadedEver", Number, 1, "Bytes uploaded over the torrent lifetime."),
    f("uploadLimit", Number, 1, "Upload limit in KBps."),
    f("uploadLimitMode", Number, 1, "Upload limit mode.").removed(5),
    f("uploadLimited", Boolean, 5, "Upload limit is enabled."),
    f("uploadRatio", Double, 1, "Seed ratio."),
    f("wanted", Array, 1, "Selection flag of each file."),
    f("webseeds", Array, 1, "Array of web seed URLs."),
    f("webseedsSendingToUs", Number, 1, "Number of web seeds sending to us."),
];

/// Arguments accepted by `torrent-set`.
pub static TORRENT_SET: &[FieldDescriptor] = &[
    f("bandwidthPriority", Number, 5, "Bandwidth priority."),
    f("downloadLimit", Number, 5, "Download limit in KBps."),
    f("downloadLimited", Boolean, 5, "Enable the download limit."),
    f("files-unwanted", Array, 1, "Indices of files not to download."),
    f("files-wanted", Array, 1, "Indices of files to download."),
    f("group", Str, 17, "Bandwidth group."),
    f("honorsSessionLimits", Boolean, 5, "Session speed limits apply to the torrent."),
    f("ids", Array, 1, "Torrents to modify."),
    f("labels", Array, 16, "Labels to attach."),
    f("location", Str, 1, "New data location."),
    f("peer-limit", Number, 1, "Maximum number of peers."),
    f("priority-high", Array, 1, "Indices of high priority files."),
    f("priority-low", Array, 1, "Indices of low priority files."),
    f("priority-normal", Array, 1, "Indices of normal priority files."),
    f("queuePosition", Number, 14, "Position in the queue."),
    f("seedIdleLimit", Number, 10, "Idle minutes before seeding stops."),
    f("seedIdleMode", Number, 10, "Which idle limit applies."),
    f("seedRatioLimit", Double, 5, "Ratio at which seeding stops."),
    f("seedRatioMode", Number, 5, "Which ratio limit applies."),
    f("sequential_download", Boolean, 18, "Download pieces in order."),
    f("speed-limit-down", Number, 1, "Download limit in KBps.")
        .removed(5)
        .next("downloadLimit"),
    f("speed-limit-down-enabled", Boolean, 1, "Enable the download limit.")
        .removed(5)
        .next("downloadLimited"),
    f("speed-limit-up", Number, 1, "Upload limit in KBps.")
        .removed(5)
        .next("uploadLimit"),
    f("speed-limit-up-enabled", Boolean, 1, "Enable the upload limit.")
        .removed(5)
        .next("uploadLimited"),
    f("trackerAdd", Array, 10, "Announce URLs to add.")
        .removed(17)
        .next("trackerList"),
    f("trackerList", Str, 17, "Announce URLs, one per line, tiers separated by blank lines."),
    f("trackerRemove", Array, 10, "Tracker ids to remove.")
        .removed(17)
        .next("trackerList"),
    f("trackerReplace", Array, 10, "Pairs of tracker id and announce URL.")
        .removed(17)
        .next("trackerList"),
    f("uploadLimit", Number, 5, "Upload limit in KBps."),
    f("uploadLimited", Boolean, 5, "Enable the upload limit."),
];

/// Arguments accepted by `torrent-add`.
pub static TORRENT_ADD: &[FieldDescriptor] = &[
    f("bandwidthPriority", Number, 8, "Bandwidth priority."),
    f("cookies", Str, 13, "HTTP cookies sent when fetching the torrent."),
    f("download-dir", Str, 1, "Directory to download into."),
    f("filename", Str, 1, "URL or magnet link of the torrent."),
    f("files-unwanted", Array, 1, "Indices of files not to download."),
    f("files-wanted", Array, 1, "Indices of files to download."),
    f("labels", Array, 17, "Labels to attach."),
    f("metainfo", Str, 1, "Base64 encoded torrent file."),
    f("paused", Boolean, 1, "Add without starting."),
    f("peer-limit", Number, 1, "Maximum number of peers."),
    f("priority-high", Array, 1, "Indices of high priority files."),
    f("priority-low", Array, 1, "Indices of low priority files."),
    f("priority-normal", Array, 1, "Indices of normal priority files."),
    f("sequential_download", Boolean, 18, "Download pieces in order."),
];

/// Fields returned by `session-get` and accepted by `session-set`.
pub static SESSION: &[FieldDescriptor] = &[
    f("alt-speed-down", Number, 5, "Alternate download limit in KBps."),
    f("alt-speed-enabled", Boolean, 5, "Alternate speed limits are active."),
    f("alt-speed-time-begin", Number, 5, "Minutes after midnight the alternate schedule starts."),
    f("alt-speed-time-day", Number, 5, "Days the alternate schedule applies, as a bitmask."),
    f("alt-speed-time-enabled", Boolean, 5, "Alternate speed schedule is enabled."),
    f("alt-speed-time-end", Number, 5, "Minutes after midnight the alternate schedule ends."),
    f("alt-speed-up", Number, 5, "Alternate upload limit in KBps."),
    f("blocklist-enabled", Boolean, 5, "Blocklist is enabled."),
    f("blocklist-size", Number, 5, "Number of rules in the blocklist."),
    f("blocklist-url", Str, 11, "Location of the blocklist."),
    f("cache-size-mb", Number, 10, "Disk cache size in MB."),
    f("config-dir", Str, 8, "Daemon configuration directory."),
    f("default-trackers", Str, 17, "Announce URLs added to public torrents."),
    f("dht-enabled", Boolean, 6, "DHT is enabled."),
    f("download-dir", Str, 1, "Default download directory."),
    f("download-dir-free-space", Number, 12, "Free space in the download directory."),
    f("download-queue-enabled", Boolean, 14, "Download queue is enabled."),
    f("download-queue-size", Number, 14, "Maximum number of active downloads."),
    f("encryption", Str, 1, "Encryption preference."),
    f("idle-seeding-limit", Number, 10, "Idle minutes before seeding stops."),
    f("idle-seeding-limit-enabled", Boolean, 10, "Idle seeding limit is enabled."),
    f("incomplete-dir", Str, 7, "Directory for incomplete torrents."),
    f("incomplete-dir-enabled", Boolean, 7, "Incomplete directory is enabled."),
    f("lpd-enabled", Boolean, 9, "Local peer discovery is enabled."),
    f("peer-limit", Number, 1, "Maximum number of peers.")
        .removed(5)
        .next("peer-limit-global"),
    f("peer-limit-global", Number, 5, "Maximum number of peers.").previous("peer-limit"),
    f("peer-limit-per-torrent", Number, 5, "Maximum number of peers per torrent."),
    f("peer-port", Number, 5, "Incoming peer port.").previous("port"),
    f("peer-port-random-on-start", Boolean, 5, "Pick a random peer port on start."),
    f("pex-allowed", Boolean, 1, "Peer exchange is enabled.")
        .removed(5)
        .next("pex-enabled"),
    f("pex-enabled", Boolean, 5, "Peer exchange is enabled.").previous("pex-allowed"),
    f("port", Number, 1, "Incoming peer port.")
        .removed(5)
        .next("peer-port"),
    f("port-forwarding-enabled", Boolean, 1, "UPnP/NAT-PMP port forwarding is enabled."),
    f("queue-stalled-enabled", Boolean, 14, "Stalled torrents leave the queue."),
    f("queue-stalled-minutes", Number, 14, "Idle minutes before a torrent is stalled."),
    f("rename-partial-files", Boolean, 8, "Append .part to incomplete files."),
    f("rpc-version", Number, 4, "Current protocol version."),
    f("rpc-version-minimum", Number, 4, "Oldest protocol version supported."),
    f("rpc-version-semver", Str, 17, "Current protocol version as a semantic version."),
    f("script-torrent-added-enabled", Boolean, 17, "Run a script when a torrent is added."),
    f("script-torrent-added-filename", Str, 17, "Script run when a torrent is added."),
    f("script-torrent-done-enabled", Boolean, 9, "Run a script when a torrent finishes."),
    f("script-torrent-done-filename", Str, 9, "Script run when a torrent finishes."),
    f("script-torrent-done-seeding-enabled", Boolean, 17, "Run a script when seeding finishes."),
    f("script-torrent-done-seeding-filename", Str, 17, "Script run when seeding finishes."),
    f("seed-queue-enabled", Boolean, 14, "Seed queue is enabled."),
    f("seed-queue-size", Number, 14, "Maximum number of active seeds."),
    f("seedRatioLimit", Double, 5, "Default seed ratio limit."),
    f("seedRatioLimited", Boolean, 5, "Default seed ratio limit is enabled."),
    f("session-id", Str, 17, "Current session token."),
    f("speed-limit-down", Number, 1, "Download limit in KBps."),
    f("speed-limit-down-enabled", Boolean, 1, "Download limit is enabled."),
    f("speed-limit-up", Number, 1, "Upload limit in KBps."),
    f("speed-limit-up-enabled", Boolean, 1, "Upload limit is enabled."),
    f("start-added-torrents", Boolean, 9, "Start torrents when they are added."),
    f("trash-original-torrent-files", Boolean, 9, "Delete torrent files once added."),
    f("units", Object, 10, "Unit names and sizes used by the daemon."),
    f("utp-enabled", Boolean, 13, "uTP is enabled."),
    f("version", Str, 3, "Daemon version string."),
];

/// Arguments accepted by `group-set`.
pub static GROUP_SET: &[FieldDescriptor] = &[
    f("bandwidthPriority", Number, 17, "Bandwidth priority."),
    f("honorsSessionLimits", Boolean, 17, "Session speed limits apply to the group."),
    f("name", Str, 17, "Group name."),
    f("speed-limit-down", Number, 17, "Download limit in KBps."),
    f("speed-limit-down-enabled", Boolean, 17, "Download limit is enabled."),
    f("speed-limit-up", Number, 17, "Upload limit in KBps."),
    f("speed-limit-up-enabled", Boolean, 17, "Upload limit is enabled."),
];
