//! Torrent identifiers and their normalization.

use std::fmt;

use serde::{Serialize, Serializer};
use serde_json::Value;

use transmission_rpc_types::{Result, TransmissionError};

const RECENTLY_ACTIVE: &str = "recently-active";

/// One torrent, by daemon id or by info hash.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TorrentId {
    /// Daemon assigned id.
    Id(u64),
    /// 40 character hex info hash.
    Hash(String),
}

impl TorrentId {
    /// Validates an info hash.
    pub fn hash(hash: impl Into<String>) -> Result<Self> {
        let hash = hash.into();
        if is_info_hash(&hash) {
            Ok(Self::Hash(hash))
        } else {
            Err(not_valid(&hash))
        }
    }

    /// Whether the daemon would report this torrent as `id`/`hashString`.
    pub fn matches(&self, id: Option<i64>, hash_string: Option<&str>) -> bool {
        match self {
            Self::Id(wanted) => id.is_some_and(|id| u64::try_from(id) == Ok(*wanted)),
            Self::Hash(wanted) => hash_string.is_some_and(|hash| hash.eq_ignore_ascii_case(wanted)),
        }
    }
}

impl fmt::Display for TorrentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "{id}"),
            Self::Hash(hash) => f.write_str(hash),
        }
    }
}

impl Serialize for TorrentId {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Self::Id(id) => serializer.serialize_u64(*id),
            Self::Hash(hash) => serializer.serialize_str(hash),
        }
    }
}

impl From<u64> for TorrentId {
    fn from(id: u64) -> Self {
        Self::Id(id)
    }
}

impl TryFrom<&str> for TorrentId {
    type Error = TransmissionError;

    fn try_from(hash: &str) -> Result<Self> {
        Self::hash(hash)
    }
}

/// Torrent selection of a call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TorrentIds {
    /// Explicit torrents. Empty means "none given".
    List(Vec<TorrentId>),
    /// Torrents active since the last query, sent as `"recently-active"`.
    RecentlyActive,
}

impl TorrentIds {
    /// Whether nothing was selected.
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::List(ids) if ids.is_empty())
    }
}

impl Default for TorrentIds {
    fn default() -> Self {
        Self::List(Vec::new())
    }
}

impl Serialize for TorrentIds {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Self::List(ids) => ids.serialize(serializer),
            Self::RecentlyActive => serializer.serialize_str(RECENTLY_ACTIVE),
        }
    }
}

impl From<TorrentId> for TorrentIds {
    fn from(id: TorrentId) -> Self {
        Self::List(vec![id])
    }
}

impl From<u64> for TorrentIds {
    fn from(id: u64) -> Self {
        Self::List(vec![TorrentId::Id(id)])
    }
}

impl From<Vec<TorrentId>> for TorrentIds {
    fn from(ids: Vec<TorrentId>) -> Self {
        Self::List(ids)
    }
}

impl From<Vec<u64>> for TorrentIds {
    fn from(ids: Vec<u64>) -> Self {
        Self::List(ids.into_iter().map(TorrentId::Id).collect())
    }
}

impl From<&[u64]> for TorrentIds {
    fn from(ids: &[u64]) -> Self {
        Self::List(ids.iter().copied().map(TorrentId::Id).collect())
    }
}

impl TryFrom<&str> for TorrentIds {
    type Error = TransmissionError;

    /// Accepts `"recently-active"` or an info hash.
    fn try_from(value: &str) -> Result<Self> {
        if value == RECENTLY_ACTIVE {
            Ok(Self::RecentlyActive)
        } else {
            TorrentId::hash(value).map(Self::from)
        }
    }
}

/// Parses one torrent id from a dynamic value: a non-negative integer or an
/// info hash.
pub fn parse_torrent_id(value: &Value) -> Result<TorrentId> {
    match value {
        Value::Number(number) => number.as_u64().map(TorrentId::Id).ok_or_else(|| {
            TransmissionError::invalid_usage(format!("{number} is not valid torrent id"))
        }),
        Value::String(hash) => TorrentId::hash(hash.as_str()),
        other => Err(TransmissionError::invalid_usage(format!(
            "{other} is not valid torrent id"
        ))),
    }
}

/// Parses a torrent selection from a dynamic value.
///
/// `null` selects nothing, a single id or hash becomes a one element list,
/// `"recently-active"` is kept as is.
pub fn parse_torrent_ids(value: &Value) -> Result<TorrentIds> {
    match value {
        Value::Null => Ok(TorrentIds::default()),
        Value::String(s) if s == RECENTLY_ACTIVE => Ok(TorrentIds::RecentlyActive),
        Value::String(_) => parse_torrent_id(value).map(TorrentIds::from),
        Value::Number(number) if number.is_f64() => {
            Err(TransmissionError::invalid_usage(format!(
                "Invalid torrent id {number}"
            )))
        }
        Value::Number(_) => parse_torrent_id(value).map(TorrentIds::from),
        Value::Array(items) => items
            .iter()
            .map(parse_torrent_id)
            .collect::<Result<Vec<_>>>()
            .map(TorrentIds::List),
        Value::Bool(_) | Value::Object(_) => Err(TransmissionError::invalid_usage(
            "ids must be int, str, or list",
        )),
    }
}

fn is_info_hash(value: &str) -> bool {
    value.len() == 40 && value.bytes().all(|b| b.is_ascii_hexdigit())
}

fn not_valid(value: &str) -> TransmissionError {
    TransmissionError::invalid_usage(format!("{value} is not valid torrent id"))
}
