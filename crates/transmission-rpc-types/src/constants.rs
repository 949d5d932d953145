//! Protocol constants: RPC method names, enumerated field values and defaults.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::TransmissionError;

/// Default daemon host.
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default daemon RPC port.
pub const DEFAULT_PORT: u16 = 9091;

/// Default RPC endpoint path.
pub const DEFAULT_PATH: &str = "/transmission/rpc";

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Header carrying the session token.
pub const SESSION_ID_HEADER: &str = "X-Transmission-Session-Id";

/// Methods understood by the daemon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum RpcMethod {
    BlocklistUpdate,
    FreeSpace,
    GroupGet,
    GroupSet,
    PortTest,
    QueueMoveBottom,
    QueueMoveDown,
    QueueMoveTop,
    QueueMoveUp,
    SessionClose,
    SessionGet,
    SessionSet,
    SessionStats,
    TorrentAdd,
    TorrentGet,
    TorrentReannounce,
    TorrentRemove,
    TorrentRenamePath,
    TorrentSet,
    TorrentSetLocation,
    TorrentStart,
    TorrentStartNow,
    TorrentStop,
    TorrentVerify,
}

impl RpcMethod {
    /// Every method, in wire-name order.
    pub const ALL: [RpcMethod; 24] = [
        Self::BlocklistUpdate,
        Self::FreeSpace,
        Self::GroupGet,
        Self::GroupSet,
        Self::PortTest,
        Self::QueueMoveBottom,
        Self::QueueMoveDown,
        Self::QueueMoveTop,
        Self::QueueMoveUp,
        Self::SessionClose,
        Self::SessionGet,
        Self::SessionSet,
        Self::SessionStats,
        Self::TorrentAdd,
        Self::TorrentGet,
        Self::TorrentReannounce,
        Self::TorrentRemove,
        Self::TorrentRenamePath,
        Self::TorrentSet,
        Self::TorrentSetLocation,
        Self::TorrentStart,
        Self::TorrentStartNow,
        Self::TorrentStop,
        Self::TorrentVerify,
    ];

    /// Name used in the request envelope.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BlocklistUpdate => "blocklist-update",
            Self::FreeSpace => "free-space",
            Self::GroupGet => "group-get",
            Self::GroupSet => "group-set",
            Self::PortTest => "port-test",
            Self::QueueMoveBottom => "queue-move-bottom",
            Self::QueueMoveDown => "queue-move-down",
            Self::QueueMoveTop => "queue-move-top",
            Self::QueueMoveUp => "queue-move-up",
            Self::SessionClose => "session-close",
            Self::SessionGet => "session-get",
            Self::SessionSet => "session-set",
            Self::SessionStats => "session-stats",
            Self::TorrentAdd => "torrent-add",
            Self::TorrentGet => "torrent-get",
            Self::TorrentReannounce => "torrent-reannounce",
            Self::TorrentRemove => "torrent-remove",
            Self::TorrentRenamePath => "torrent-rename-path",
            Self::TorrentSet => "torrent-set",
            Self::TorrentSetLocation => "torrent-set-location",
            Self::TorrentStart => "torrent-start",
            Self::TorrentStartNow => "torrent-start-now",
            Self::TorrentStop => "torrent-stop",
            Self::TorrentVerify => "torrent-verify",
        }
    }

    /// Protocol version the method first appeared in.
    pub const fn added_version(self) -> u32 {
        match self {
            Self::TorrentReannounce | Self::BlocklistUpdate | Self::PortTest => 5,
            Self::TorrentSetLocation => 6,
            Self::TorrentStartNow
            | Self::QueueMoveBottom
            | Self::QueueMoveDown
            | Self::QueueMoveTop
            | Self::QueueMoveUp
            | Self::SessionClose => 14,
            Self::TorrentRenamePath | Self::FreeSpace => 15,
            Self::GroupGet | Self::GroupSet => 17,
            _ => 1,
        }
    }

    /// Whether the call is meaningless without an `ids` argument.
    pub const fn requires_ids(self) -> bool {
        matches!(
            self,
            Self::TorrentStart
                | Self::TorrentStartNow
                | Self::TorrentStop
                | Self::TorrentVerify
                | Self::TorrentReannounce
                | Self::TorrentRemove
                | Self::TorrentSet
                | Self::TorrentSetLocation
                | Self::TorrentRenamePath
                | Self::QueueMoveBottom
                | Self::QueueMoveDown
                | Self::QueueMoveTop
                | Self::QueueMoveUp
        )
    }
}

impl fmt::Display for RpcMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RpcMethod {
    type Err = TransmissionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|method| method.as_str() == s)
            .ok_or_else(|| TransmissionError::invalid_usage(format!("unknown rpc method {s:?}")))
    }
}

/// File and bandwidth priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[allow(missing_docs)]
pub enum Priority {
    Low,
    #[default]
    Normal,
    High,
}

impl Priority {
    /// Wire value.
    pub const fn value(self) -> i64 {
        match self {
            Self::Low => -1,
            Self::Normal => 0,
            Self::High => 1,
        }
    }

    /// Decodes a wire value.
    pub const fn from_value(value: i64) -> Option<Self> {
        match value {
            -1 => Some(Self::Low),
            0 => Some(Self::Normal),
            1 => Some(Self::High),
            _ => None,
        }
    }
}

impl Serialize for Priority {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.value())
    }
}

/// Seed idle limit mode of a torrent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdleMode {
    /// Follow the global setting.
    Global,
    /// Override the global setting for this torrent.
    Single,
    /// Seed regardless of activity.
    Unlimited,
}

/// Seed ratio limit mode of a torrent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RatioLimitMode {
    /// Follow the global setting.
    Global,
    /// Override the global setting for this torrent.
    Single,
    /// Seed regardless of ratio.
    Unlimited,
}

macro_rules! mode_codec {
    ($($ty:ident),*) => {$(
        impl $ty {
            /// Wire value.
            pub const fn value(self) -> i64 {
                match self {
                    Self::Global => 0,
                    Self::Single => 1,
                    Self::Unlimited => 2,
                }
            }

            /// Decodes a wire value.
            pub const fn from_value(value: i64) -> Option<Self> {
                match value {
                    0 => Some(Self::Global),
                    1 => Some(Self::Single),
                    2 => Some(Self::Unlimited),
                    _ => None,
                }
            }
        }

        impl Serialize for $ty {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_i64(self.value())
            }
        }
    )*};
}

mode_codec!(IdleMode, RatioLimitMode);

/// Peer connection encryption preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[allow(missing_docs)]
pub enum Encryption {
    Required,
    Preferred,
    Tolerated,
}

impl Encryption {
    /// Wire value.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Required => "required",
            Self::Preferred => "preferred",
            Self::Tolerated => "tolerated",
        }
    }
}

impl FromStr for Encryption {
    type Err = TransmissionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "required" => Ok(Self::Required),
            "preferred" => Ok(Self::Preferred),
            "tolerated" => Ok(Self::Tolerated),
            other => Err(TransmissionError::invalid_usage(format!(
                "Invalid encryption value {other:?}, expected one of required, preferred, tolerated"
            ))),
        }
    }
}

impl fmt::Display for Encryption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Address family for `port-test`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[allow(missing_docs)]
pub enum IpProtocol {
    Ipv4,
    Ipv6,
}

impl IpProtocol {
    /// Wire value.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ipv4 => "ipv4",
            Self::Ipv6 => "ipv6",
        }
    }
}

impl FromStr for IpProtocol {
    type Err = TransmissionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ipv4" => Ok(Self::Ipv4),
            "ipv6" => Ok(Self::Ipv6),
            other => Err(TransmissionError::invalid_usage(format!(
                "Invalid ip protocol {other:?}"
            ))),
        }
    }
}
