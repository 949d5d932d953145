//! Transmission RPC client.

use std::collections::HashMap;
use std::time::Duration;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::Serialize;
use serde_json::{Map, Value, json};
use tracing::{debug, info, warn};

use transmission_rpc_types::registry::warn_arguments;
use transmission_rpc_types::{
    DEFAULT_TIMEOUT, Group, IpProtocol, PortTestResult, Result, RpcMethod, Session, SessionStats,
    Table, Torrent, TransmissionError, torrent_get_arguments,
};

use crate::args::{
    AddTorrentArgs, GroupChange, SessionChange, TorrentChange, TorrentSource, to_arguments,
};
use crate::config::ClientConfig;
use crate::ids::{TorrentId, TorrentIds};
use crate::rpc::Engine;
use crate::transport::{HttpPool, Transport};


/// Client of one Transmission daemon.
///
/// Construction asks the daemon for its protocol version; every later call
/// is checked against it and logs a warning when it uses something the
/// daemon does not know yet.
#[derive(Debug)]
pub struct Client<T: Transport = HttpPool> {
    engine: Engine<T>,
    url: String,
    timeout: Duration,
    protocol_version: u32,
    semver_version: Option<String>,
    server_version: Option<String>,
    torrent_get_arguments: Vec<&'static str>,
}

impl Client {
    /// Connects to the daemon described by `config`.
    pub async fn new(config: ClientConfig) -> Result<Self> {
        let pool = HttpPool::new(&config)?;
        Self::with_transport(config, pool).await
    }

    /// Connects to the daemon at `url`, see [`ClientConfig::from_url`].
    pub async fn from_url(url: &str) -> Result<Self> {
        Self::new(ClientConfig::from_url(url)?).await
    }

    /// Connects using [`ClientConfig::from_env`].
    pub async fn from_env() -> Result<Self> {
        Self::new(ClientConfig::from_env()?).await
    }
}

impl<T: Transport> Client<T> {
    /// Builds a client over an existing transport and performs the
    /// version handshake.
    pub async fn with_transport(config: ClientConfig, transport: T) -> Result<Self> {
        let engine = Engine::new(
            transport,
            config.authorization().as_deref(),
            config.logger.clone(),
        )?;
        let mut client = Self {
            engine,
            url: config.url(),
            timeout: config.timeout,
            protocol_version: 0,
            semver_version: None,
            server_version: None,
            torrent_get_arguments: Vec::new(),
        };
        client.bootstrap().await?;
        Ok(client)
    }

    async fn bootstrap(&mut self) -> Result<()> {
        let arguments = object(json!({
            "fields": ["rpc-version", "rpc-version-semver", "version"],
        }));
        let session = Session::new(
            self.engine
                .call(RpcMethod::SessionGet, arguments, self.timeout)
                .await?,
        );
        let version = session
            .rpc_version()
            .and_then(|version| u32::try_from(version).ok())
            .ok_or_else(|| {
                TransmissionError::protocol(
                    "session-get response is missing a valid rpc-version",
                )
            })?;

        self.protocol_version = version;
        self.semver_version = session.rpc_version_semver().map(str::to_owned);
        self.server_version = session.version().map(str::to_owned);
        self.torrent_get_arguments = torrent_get_arguments(version);
        info!(
            url = %self.url,
            rpc_version = version,
            server_version = self.server_version.as_deref().unwrap_or("unknown"),
            "connected to transmission daemon"
        );
        Ok(())
    }

    /// RPC protocol version of the daemon.
    pub fn protocol_version(&self) -> u32 {
        self.protocol_version
    }

    /// Semantic RPC version, reported by daemons since protocol 17.
    pub fn semver_version(&self) -> Option<&str> {
        self.semver_version.as_deref()
    }

    /// Daemon release, for example `4.0.5 (a6fe2a64aa)`.
    pub fn server_version(&self) -> Option<&str> {
        self.server_version.as_deref()
    }

    /// RPC URL this client talks to.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Default timeout of each call.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    #[allow(missing_docs)]
    pub fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }

    /// Restores the 30 seconds default.
    pub fn reset_timeout(&mut self) {
        self.timeout = DEFAULT_TIMEOUT;
    }

    /// Current session token.
    pub fn session_id(&self) -> Option<String> {
        self.engine.session_id()
    }

    /// Drops pooled connections. The client stays usable and reconnects on
    /// the next call.
    pub async fn close(&self) {
        self.engine.transport().close().await;
    }

    /// Raw call. Returns the `arguments` of the answer.
    pub async fn call(
        &self,
        method: RpcMethod,
        arguments: Map<String, Value>,
        timeout: Option<Duration>,
    ) -> Result<Map<String, Value>> {
        if method.added_version() > self.protocol_version {
            warn!(
                %method,
                added_version = method.added_version(),
                rpc_version = self.protocol_version,
                "method is not supported by the daemon"
            );
        }
        self.engine
            .call(method, arguments, timeout.unwrap_or(self.timeout))
            .await
    }

    async fn call_with_ids(
        &self,
        method: RpcMethod,
        mut arguments: Map<String, Value>,
        ids: TorrentIds,
    ) -> Result<Map<String, Value>> {
        arguments.insert("ids".to_owned(), to_value(&ids)?);
        self.call(method, arguments, None).await
    }

    fn check_arguments(&self, table: Table, arguments: &Map<String, Value>) {
        warn_arguments(
            table,
            arguments.keys().map(String::as_str),
            self.protocol_version,
        );
    }

    fn torrent_fields(&self, fields: Option<&[&str]>) -> Map<String, Value> {
        let names = match fields {
            None => self.torrent_get_arguments.clone(),
            Some(fields) => {
                warn_arguments(Table::TorrentGet, fields.iter().copied(), self.protocol_version);
                let mut names = fields.to_vec();
                for required in ["id", "hashString"] {
                    if !names.contains(&required) {
                        names.push(required);
                    }
                }
                names
            }
        };
        object(json!({ "fields": names }))
    }

    /// Adds a torrent from a URL, magnet link, `.torrent` content or local
    /// `.torrent` file.
    ///
    /// Returns the added torrent, or the existing one if the daemon already
    /// has it. The returned torrent only carries `id`, `name` and
    /// `hashString`.
    pub async fn add_torrent(
        &self,
        source: impl Into<TorrentSource>,
        args: AddTorrentArgs,
    ) -> Result<Torrent> {
        let mut arguments = to_arguments(&args)?;
        match source.into() {
            TorrentSource::Filename(filename) => {
                if filename.starts_with("file://") {
                    return Err(TransmissionError::invalid_usage(
                        "support for `file://` URL has been removed",
                    ));
                }
                arguments.insert("filename".to_owned(), Value::String(filename));
            }
            TorrentSource::Metainfo(content) => {
                arguments.insert("metainfo".to_owned(), STANDARD.encode(content).into());
            }
            TorrentSource::Path(path) => {
                let content = tokio::fs::read(&path).await.map_err(|e| {
                    TransmissionError::invalid_usage(format!(
                        "failed to read torrent file {}: {e}",
                        path.display()
                    ))
                })?;
                arguments.insert("metainfo".to_owned(), STANDARD.encode(content).into());
            }
        }
        self.check_arguments(Table::TorrentAdd, &arguments);

        let result = self.call(RpcMethod::TorrentAdd, arguments, None).await?;
        if let Some(Value::Object(torrent)) = result.get("torrent-added") {
            return Ok(Torrent::new(torrent.clone()));
        }
        if let Some(Value::Object(torrent)) = result.get("torrent-duplicate") {
            debug!("torrent already added");
            return Ok(Torrent::new(torrent.clone()));
        }
        Err(TransmissionError::protocol_with_response(
            "Invalid torrent-add response",
            Value::Object(result).to_string(),
        ))
    }

    /// Removes torrents, optionally deleting their data.
    pub async fn remove_torrent(&self, ids: impl Into<TorrentIds>, delete_data: bool) -> Result<()> {
        let arguments = object(json!({ "delete-local-data": delete_data }));
        self.call_with_ids(RpcMethod::TorrentRemove, arguments, ids.into())
            .await?;
        Ok(())
    }

    /// Starts torrents. `bypass_queue` starts them right away.
    pub async fn start_torrent(&self, ids: impl Into<TorrentIds>, bypass_queue: bool) -> Result<()> {
        let method = if bypass_queue {
            RpcMethod::TorrentStartNow
        } else {
            RpcMethod::TorrentStart
        };
        self.call_with_ids(method, Map::new(), ids.into()).await?;
        Ok(())
    }

    /// Starts every torrent, in queue order.
    pub async fn start_all(&self, bypass_queue: bool) -> Result<()> {
        let arguments = object(json!({ "fields": ["id", "queuePosition"] }));
        let result = self.call(RpcMethod::TorrentGet, arguments, None).await?;
        let mut torrents = parse_torrents(&result)?;
        torrents.sort_by_key(|torrent| torrent.queue_position().unwrap_or(i64::MAX));

        let ids: Vec<TorrentId> = torrents
            .iter()
            .filter_map(Torrent::id)
            .filter_map(|id| u64::try_from(id).ok())
            .map(TorrentId::Id)
            .collect();
        if ids.is_empty() {
            debug!("no torrent to start");
            return Ok(());
        }
        self.start_torrent(ids, bypass_queue).await
    }

    #[allow(missing_docs)]
    pub async fn stop_torrent(&self, ids: impl Into<TorrentIds>) -> Result<()> {
        self.call_with_ids(RpcMethod::TorrentStop, Map::new(), ids.into())
            .await?;
        Ok(())
    }

    /// Queues torrents for a data check.
    pub async fn verify_torrent(&self, ids: impl Into<TorrentIds>) -> Result<()> {
        self.call_with_ids(RpcMethod::TorrentVerify, Map::new(), ids.into())
            .await?;
        Ok(())
    }

    /// Asks trackers for more peers now.
    pub async fn reannounce_torrent(&self, ids: impl Into<TorrentIds>) -> Result<()> {
        self.call_with_ids(RpcMethod::TorrentReannounce, Map::new(), ids.into())
            .await?;
        Ok(())
    }

    /// Fetches one torrent.
    ///
    /// `fields` limits the fields requested; `id` and `hashString` are always
    /// added. `None` requests every field the daemon knows.
    pub async fn get_torrent(
        &self,
        id: impl Into<TorrentId>,
        fields: Option<&[&str]>,
    ) -> Result<Torrent> {
        let id = id.into();
        let mut arguments = self.torrent_fields(fields);
        arguments.insert("ids".to_owned(), to_value(&[&id])?);
        let result = self.call(RpcMethod::TorrentGet, arguments, None).await?;
        parse_torrents(&result)?
            .into_iter()
            .find(|torrent| id.matches(torrent.id(), torrent.hash_string()))
            .ok_or_else(|| TransmissionError::protocol("Torrent not found in result"))
    }

    /// Fetches torrents. `None` fetches all of them.
    pub async fn get_torrents(
        &self,
        ids: Option<TorrentIds>,
        fields: Option<&[&str]>,
    ) -> Result<Vec<Torrent>> {
        let mut arguments = self.torrent_fields(fields);
        if let Some(ids) = ids.filter(|ids| !ids.is_empty()) {
            arguments.insert("ids".to_owned(), to_value(&ids)?);
        }
        let result = self.call(RpcMethod::TorrentGet, arguments, None).await?;
        parse_torrents(&result)
    }

    /// Torrents active since the previous query, and ids of the ones removed
    /// in the meantime.
    pub async fn get_recently_active_torrents(
        &self,
        fields: Option<&[&str]>,
    ) -> Result<(Vec<Torrent>, Vec<i64>)> {
        let arguments = self.torrent_fields(fields);
        let result = self
            .call_with_ids(RpcMethod::TorrentGet, arguments, TorrentIds::RecentlyActive)
            .await?;
        let removed = result
            .get("removed")
            .and_then(Value::as_array)
            .map(|ids| ids.iter().filter_map(Value::as_i64).collect())
            .unwrap_or_default();
        Ok((parse_torrents(&result)?, removed))
    }

    /// Changes torrent settings.
    pub async fn change_torrent(
        &self,
        ids: impl Into<TorrentIds>,
        change: TorrentChange,
    ) -> Result<()> {
        let arguments = non_empty(to_arguments(&change)?)?;
        self.check_arguments(Table::TorrentSet, &arguments);
        self.call_with_ids(RpcMethod::TorrentSet, arguments, ids.into())
            .await?;
        Ok(())
    }

    /// Sets a new data location. With `move_data` the daemon moves the files,
    /// otherwise it looks for them there.
    pub async fn move_torrent_data(
        &self,
        ids: impl Into<TorrentIds>,
        location: &str,
        move_data: bool,
    ) -> Result<()> {
        let arguments = object(json!({ "location": location, "move": move_data }));
        self.call_with_ids(RpcMethod::TorrentSetLocation, arguments, ids.into())
            .await?;
        Ok(())
    }

    /// Renames a file or directory inside a torrent.
    ///
    /// `location` is the path relative to the torrent root, `name` the new
    /// last path component. Returns the path and name the daemon reports.
    pub async fn rename_torrent_path(
        &self,
        id: impl Into<TorrentId>,
        location: &str,
        name: &str,
    ) -> Result<(String, String)> {
        let id: TorrentId = id.into();
        let arguments = object(json!({ "path": location, "name": name }));
        let result = self
            .call_with_ids(RpcMethod::TorrentRenamePath, arguments, id.into())
            .await?;
        match (
            result.get("path").and_then(Value::as_str),
            result.get("name").and_then(Value::as_str),
        ) {
            (Some(path), Some(name)) => Ok((path.to_owned(), name.to_owned())),
            _ => Err(TransmissionError::protocol_with_response(
                "Invalid torrent-rename-path response",
                Value::Object(result).to_string(),
            )),
        }
    }

    /// Moves torrents to the top of the queue.
    pub async fn queue_top(&self, ids: impl Into<TorrentIds>) -> Result<()> {
        self.call_with_ids(RpcMethod::QueueMoveTop, Map::new(), ids.into())
            .await?;
        Ok(())
    }

    /// Moves torrents to the bottom of the queue.
    pub async fn queue_bottom(&self, ids: impl Into<TorrentIds>) -> Result<()> {
        self.call_with_ids(RpcMethod::QueueMoveBottom, Map::new(), ids.into())
            .await?;
        Ok(())
    }

    /// Moves torrents one step up the queue.
    pub async fn queue_up(&self, ids: impl Into<TorrentIds>) -> Result<()> {
        self.call_with_ids(RpcMethod::QueueMoveUp, Map::new(), ids.into())
            .await?;
        Ok(())
    }

    /// Moves torrents one step down the queue.
    pub async fn queue_down(&self, ids: impl Into<TorrentIds>) -> Result<()> {
        self.call_with_ids(RpcMethod::QueueMoveDown, Map::new(), ids.into())
            .await?;
        Ok(())
    }

    /// Daemon settings. `fields` limits the keys returned.
    pub async fn get_session(&self, fields: Option<&[&str]>) -> Result<Session> {
        let mut arguments = Map::new();
        if let Some(fields) = fields {
            warn_arguments(Table::Session, fields.iter().copied(), self.protocol_version);
            arguments.insert("fields".to_owned(), to_value(&fields)?);
        }
        let result = self.call(RpcMethod::SessionGet, arguments, None).await?;
        Ok(Session::new(result))
    }

    /// Changes daemon settings.
    pub async fn set_session(&self, change: SessionChange) -> Result<()> {
        let arguments = non_empty(to_arguments(&change)?)?;
        self.check_arguments(Table::Session, &arguments);
        self.call(RpcMethod::SessionSet, arguments, None).await?;
        Ok(())
    }

    /// Reloads the blocklist and returns its new size.
    pub async fn blocklist_update(&self) -> Result<i64> {
        let result = self
            .call(RpcMethod::BlocklistUpdate, Map::new(), None)
            .await?;
        result
            .get("blocklist-size")
            .and_then(Value::as_i64)
            .ok_or_else(|| {
                TransmissionError::protocol_with_response(
                    "Invalid blocklist-update response",
                    Value::Object(result.clone()).to_string(),
                )
            })
    }

    /// Asks the daemon whether its peer port is reachable.
    pub async fn port_test(&self, ip_protocol: Option<IpProtocol>) -> Result<PortTestResult> {
        let mut arguments = Map::new();
        if let Some(ip_protocol) = ip_protocol {
            arguments.insert("ip_protocol".to_owned(), ip_protocol.as_str().into());
        }
        let result = self.call(RpcMethod::PortTest, arguments, None).await?;
        Ok(PortTestResult::new(result))
    }

    /// Free bytes in `path` on the daemon host.
    ///
    /// `None` when the daemon answers for a different path.
    pub async fn free_space(&self, path: &str) -> Result<Option<i64>> {
        let arguments = object(json!({ "path": path }));
        let result = self.call(RpcMethod::FreeSpace, arguments, None).await?;
        if result.get("path").and_then(Value::as_str) == Some(path) {
            Ok(result.get("size-bytes").and_then(Value::as_i64))
        } else {
            Ok(None)
        }
    }

    /// Transfer statistics.
    pub async fn session_stats(&self) -> Result<SessionStats> {
        let mut result = self.call(RpcMethod::SessionStats, Map::new(), None).await?;
        if let Some(Value::Object(stats)) = result.remove("session-stats") {
            return Ok(SessionStats::new(stats));
        }
        Ok(SessionStats::new(result))
    }

    /// Shuts the daemon down.
    pub async fn session_close(&self) -> Result<()> {
        self.call(RpcMethod::SessionClose, Map::new(), None).await?;
        Ok(())
    }

    /// One bandwidth group, `None` when it does not exist.
    pub async fn get_group(&self, name: &str) -> Result<Option<Group>> {
        let arguments = object(json!({ "group": name }));
        let result = self.call(RpcMethod::GroupGet, arguments, None).await?;
        Ok(parse_groups(&result)?.into_iter().next())
    }

    /// Bandwidth groups by name. `None` fetches all of them.
    pub async fn get_groups(&self, names: Option<&[&str]>) -> Result<HashMap<String, Group>> {
        let mut arguments = Map::new();
        if let Some(names) = names {
            arguments.insert("group".to_owned(), to_value(&names)?);
        }
        let result = self.call(RpcMethod::GroupGet, arguments, None).await?;
        Ok(parse_groups(&result)?
            .into_iter()
            .filter_map(|group| Some((group.name()?.to_owned(), group)))
            .collect())
    }

    /// Creates or changes a bandwidth group.
    pub async fn set_group(&self, name: &str, change: GroupChange) -> Result<()> {
        let mut arguments = to_arguments(&change)?;
        arguments.insert("name".to_owned(), name.into());
        self.check_arguments(Table::GroupSet, &arguments);
        self.call(RpcMethod::GroupSet, arguments, None).await?;
        Ok(())
    }
}

fn object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

fn to_value<S: Serialize + ?Sized>(value: &S) -> Result<Value> {
    serde_json::to_value(value)
        .map_err(|e| TransmissionError::invalid_usage("failed to serialize arguments").with_source(e))
}

fn non_empty(arguments: Map<String, Value>) -> Result<Map<String, Value>> {
    if arguments.is_empty() {
        Err(TransmissionError::invalid_usage("No arguments to set"))
    } else {
        Ok(arguments)
    }
}

fn parse_torrents(result: &Map<String, Value>) -> Result<Vec<Torrent>> {
    let torrents = result
        .get("torrents")
        .and_then(Value::as_array)
        .ok_or_else(|| {
            TransmissionError::protocol_with_response(
                "Invalid torrent-get response",
                Value::Object(result.clone()).to_string(),
            )
        })?;
    Ok(torrents
        .iter()
        .filter_map(Value::as_object)
        .map(|torrent| Torrent::new(torrent.clone()))
        .collect())
}

fn parse_groups(result: &Map<String, Value>) -> Result<Vec<Group>> {
    let groups = result
        .get("group")
        .and_then(Value::as_array)
        .ok_or_else(|| {
            TransmissionError::protocol_with_response(
                "Invalid group-get response",
                Value::Object(result.clone()).to_string(),
            )
        })?;
    Ok(groups
        .iter()
        .filter_map(Value::as_object)
        .map(|group| Group::new(group.clone()))
        .collect())
}
