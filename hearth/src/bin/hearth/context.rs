use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use hearth::{
    Backend, Fanout, Network, SnapshotStore,
    config::{BackendKind, DEFAULT_CONFIG_FILE, HearthConfig},
};
use redis::aio::ConnectionManager;

/// Resolved configuration for one CLI invocation
pub struct RunContext {
    /// Path the configuration was read from (it may not exist)
    pub config_path: PathBuf,
    pub config: HearthConfig,
}

/// Storage flags shared by every subcommand
#[derive(clap::Args, Debug, Clone, Default)]
pub struct StorageArgs {
    /// Snapshot backend, overriding `[storage] backend`
    #[arg(long, value_enum, env = "HEARTH_BACKEND")]
    pub backend: Option<BackendKind>,

    /// Directory for the JSON backend, overriding `[storage] data_dir`
    #[arg(long, env = "HEARTH_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Key prefix for the Redis backend, overriding `[storage] prefix`
    #[arg(long)]
    pub prefix: Option<String>,
}

impl RunContext {
    /// Loads `path`, or `hearth.toml` in the current directory.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(path) => path.to_path_buf(),
            None => std::env::current_dir()
                .context("Failed to get current directory")?
                .join(DEFAULT_CONFIG_FILE),
        };
        let config = HearthConfig::load(&config_path)?;
        Ok(Self { config_path, config })
    }

    pub fn apply_storage_args(&mut self, args: &StorageArgs) {
        if let Some(backend) = args.backend {
            self.config.storage.backend = backend;
        }
        if let Some(dir) = &args.data_dir {
            self.config.storage.data_dir = dir.clone();
        }
        if let Some(prefix) = &args.prefix {
            self.config.storage.prefix = prefix.clone();
        }
    }

    pub fn config_source(&self) -> String {
        if self.config_path.exists() {
            self.config_path.display().to_string()
        } else {
            "defaults".to_string()
        }
    }

    pub async fn open_backend(&self) -> Result<Backend> {
        self.config.open_backend().await
    }

    /// Opens the backend and loads the network from it.
    pub async fn open_network(&self) -> Result<Network<Backend>> {
        let backend = self.open_backend().await?;
        let description = backend.describe();
        Network::open(backend, Fanout::new(self.config.fanout.capacity))
            .await
            .with_context(|| format!("Failed to load state from {description}"))
    }

    /// Connection for the event relay, reusing the store's when it is Redis.
    pub async fn relay_connection(&self, backend: &Backend) -> Result<ConnectionManager> {
        if let Backend::Redis(store) = backend {
            return Ok(store.connection());
        }
        let url = self.config.redis_url()?;
        let client = redis::Client::open(url.as_str()).context("Failed to create Redis client")?;
        ConnectionManager::new(client)
            .await
            .with_context(|| format!("Failed to connect to Redis at {url}"))
    }
}
