//! Snapshot persistence.
//!
//! The whole state is three ordered collections (`users`, `posts`,
//! `notifications`) that are rewritten in full after every mutation. There
//! is no incremental update contract.

mod json_file;
mod memory;
mod redis_store;

pub use json_file::JsonFileStore;
pub use memory::MemoryStore;
pub use redis_store::RedisStore;

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::{
    errors::HearthResult,
    types::{Notification, Post, User},
};

pub const USERS: &str = "users";
pub const POSTS: &str = "posts";
pub const NOTIFICATIONS: &str = "notifications";

/// Full copy of the persisted state. Posts are newest first, comments and
/// notifications in append order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub posts: Vec<Post>,
    #[serde(default)]
    pub notifications: Vec<Notification>,
}

/// Key-value/document store holding the three collections.
pub trait SnapshotStore: Send + Sync {
    /// Reads the stored collections. `None` when nothing was ever saved.
    fn load(&self) -> impl Future<Output = HearthResult<Option<Snapshot>>> + Send;

    /// Replaces the stored collections with `snapshot`.
    fn save(&self, snapshot: &Snapshot) -> impl Future<Output = HearthResult<()>> + Send;

    /// Short human readable location, for logs.
    fn describe(&self) -> String;
}

/// Runtime-selected backend.
#[derive(Debug, Clone)]
pub enum Backend {
    Json(JsonFileStore),
    Redis(RedisStore),
    Memory(MemoryStore),
}

impl SnapshotStore for Backend {
    async fn load(&self) -> HearthResult<Option<Snapshot>> {
        match self {
            Backend::Json(store) => store.load().await,
            Backend::Redis(store) => store.load().await,
            Backend::Memory(store) => store.load().await,
        }
    }

    async fn save(&self, snapshot: &Snapshot) -> HearthResult<()> {
        match self {
            Backend::Json(store) => store.save(snapshot).await,
            Backend::Redis(store) => store.save(snapshot).await,
            Backend::Memory(store) => store.save(snapshot).await,
        }
    }

    fn describe(&self) -> String {
        match self {
            Backend::Json(store) => store.describe(),
            Backend::Redis(store) => store.describe(),
            Backend::Memory(store) => store.describe(),
        }
    }
}
