//! Server configuration.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::cache::BoardCacheConfig;

/// Error reading configuration from the environment.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid value {value:?} for {var}: {reason}")]
pub struct ConfigError {
    pub var: &'static str,
    pub value: String,
    pub reason: String,
}

/// Configuration parameters for the schedule server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Address to listen on.
    pub bind: SocketAddr,

    /// JSON snapshot loaded at start and rewritten after every write.
    /// `None` keeps the store purely in memory.
    pub snapshot: Option<PathBuf>,

    /// Directory served under `/static`.
    pub static_dir: PathBuf,

    /// Location board cache settings.
    pub board_cache: BoardCacheConfig,

    /// Cap applied to location boards when a request gives no limit.
    pub default_limit: Option<usize>,
}

impl ServerConfig {
    pub const BIND_VAR: &'static str = "SCHEDULE_BIND";
    pub const SNAPSHOT_VAR: &'static str = "SCHEDULE_SNAPSHOT";
    pub const STATIC_DIR_VAR: &'static str = "SCHEDULE_STATIC_DIR";
    pub const BOARD_TTL_VAR: &'static str = "SCHEDULE_BOARD_TTL_SECS";
    pub const DEFAULT_LIMIT_VAR: &'static str = "SCHEDULE_DEFAULT_LIMIT";

    /// Read configuration from `SCHEDULE_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    ///
    /// Unset or empty variables keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(value) = get(Self::BIND_VAR) {
            config.bind = parse_var(Self::BIND_VAR, &value)?;
        }
        if let Some(value) = get(Self::SNAPSHOT_VAR) {
            config.snapshot = Some(PathBuf::from(value));
        }
        if let Some(value) = get(Self::STATIC_DIR_VAR) {
            config.static_dir = PathBuf::from(value);
        }
        if let Some(value) = get(Self::BOARD_TTL_VAR) {
            let secs: u64 = parse_var(Self::BOARD_TTL_VAR, &value)?;
            config.board_cache.ttl = Duration::from_secs(secs);
        }
        if let Some(value) = get(Self::DEFAULT_LIMIT_VAR) {
            config.default_limit = Some(parse_var(Self::DEFAULT_LIMIT_VAR, &value)?);
        }

        Ok(config)
    }

    pub fn with_bind(mut self, bind: SocketAddr) -> Self {
        self.bind = bind;
        self
    }

    pub fn with_snapshot(mut self, path: impl Into<PathBuf>) -> Self {
        self.snapshot = Some(path.into());
        self
    }

    pub fn with_static_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.static_dir = dir.into();
        self
    }

    pub fn with_board_cache(mut self, board_cache: BoardCacheConfig) -> Self {
        self.board_cache = board_cache;
        self
    }

    pub fn with_default_limit(mut self, limit: usize) -> Self {
        self.default_limit = Some(limit);
        self
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 3000)),
            snapshot: None,
            static_dir: PathBuf::from("static"),
            board_cache: BoardCacheConfig::default(),
            default_limit: None,
        }
    }
}

fn parse_var<T>(var: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| ConfigError {
        var,
        value: value.to_string(),
        reason: e.to_string(),
    })
}
