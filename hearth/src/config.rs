//! `hearth.toml` configuration.
//!
//! Every field has a default, so an absent file or an empty file is a valid
//! configuration. String values of the form `${VAR}` are replaced by the
//! environment variable `VAR` when the config is resolved.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use crate::storage::{Backend, JsonFileStore, MemoryStore, RedisStore};

pub const DEFAULT_CONFIG_FILE: &str = "hearth.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HearthConfig {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub storage: StorageSettings,
    #[serde(default)]
    pub fanout: FanoutSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self { bind: default_bind() }
    }
}

fn default_bind() -> String {
    "127.0.0.1:5000".to_string()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// JSON files in `data_dir`
    #[default]
    Json,
    /// Keys in a Redis database
    Redis,
    /// Process memory only (nothing survives a restart)
    Memory,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageSettings {
    #[serde(default)]
    pub backend: BackendKind,
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    #[serde(default = "default_redis_url")]
    pub redis_url: String,
    #[serde(default = "default_prefix")]
    pub prefix: String,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            backend: BackendKind::default(),
            data_dir: default_data_dir(),
            redis_url: default_redis_url(),
            prefix: default_prefix(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_redis_url() -> String {
    "${REDIS_URL}".to_string()
}

fn default_prefix() -> String {
    "hearth".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FanoutSettings {
    /// Events buffered per observer before it starts missing them.
    #[serde(default = "default_capacity")]
    pub capacity: usize,
    /// Also publish every event on the Redis channel `{prefix}:events`.
    #[serde(default)]
    pub redis_relay: bool,
}

impl Default for FanoutSettings {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
            redis_relay: false,
        }
    }
}

fn default_capacity() -> usize {
    crate::fanout::DEFAULT_CAPACITY
}

impl HearthConfig {
    /// Reads `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("{} not found, using default configuration", path.display());
            return Ok(Self::default());
        }
        let content =
            std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// The Redis URL with `${VAR}` expanded, falling back to the local default port.
    pub fn redis_url(&self) -> Result<String> {
        match expand_env(&self.storage.redis_url)? {
            Some(url) => Ok(url),
            None => Ok("redis://127.0.0.1/".to_string()),
        }
    }

    pub fn needs_redis(&self) -> bool {
        self.storage.backend == BackendKind::Redis || self.fanout.redis_relay
    }

    /// Opens the configured snapshot backend.
    pub async fn open_backend(&self) -> Result<Backend> {
        let backend = match self.storage.backend {
            BackendKind::Json => Backend::Json(JsonFileStore::new(&self.storage.data_dir)),
            BackendKind::Memory => Backend::Memory(MemoryStore::new()),
            BackendKind::Redis => {
                let url = self.redis_url()?;
                let store = RedisStore::connect(&url, self.storage.prefix.clone())
                    .await
                    .with_context(|| format!("Failed to connect to redis at {url}"))?;
                Backend::Redis(store)
            }
        };
        Ok(backend)
    }
}

/// Expands a whole-value `${VAR}` reference.
///
/// Returns `None` when the variable is unset, the value itself otherwise.
fn expand_env(value: &str) -> Result<Option<String>> {
    let Some(name) = value.strip_prefix("${").and_then(|rest| rest.strip_suffix('}')) else {
        return Ok(Some(value.to_string()));
    };
    if name.is_empty() {
        bail!("empty environment variable reference in configuration");
    }
    Ok(std::env::var(name).ok())
}
