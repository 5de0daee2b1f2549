use std::path::{Path, PathBuf};

use log::debug;
use serde::{Serialize, de::DeserializeOwned};

use super::{NOTIFICATIONS, POSTS, Snapshot, SnapshotStore, USERS};
use crate::errors::HearthResult;

/// Stores each collection as a pretty-printed JSON array in `<dir>/<collection>.json`.
///
/// Files are written to a sibling temp file and renamed into place, so a
/// crash mid-write leaves the previous version intact.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, collection: &str) -> PathBuf {
        self.dir.join(format!("{collection}.json"))
    }

    async fn read_collection<T: DeserializeOwned>(&self, collection: &str) -> HearthResult<Option<Vec<T>>> {
        let path = self.path_for(collection);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    async fn write_collection<T: Serialize>(&self, collection: &str, records: &[T]) -> HearthResult<()> {
        let path = self.path_for(collection);
        let tmp = self.dir.join(format!(".{collection}.json.tmp"));
        let payload = serde_json::to_vec_pretty(records)?;
        tokio::fs::write(&tmp, payload).await?;
        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }
}

impl SnapshotStore for JsonFileStore {
    async fn load(&self) -> HearthResult<Option<Snapshot>> {
        let users = self.read_collection(USERS).await?;
        let posts = self.read_collection(POSTS).await?;
        let notifications = self.read_collection(NOTIFICATIONS).await?;

        if users.is_none() && posts.is_none() && notifications.is_none() {
            debug!("no snapshot files in {}", self.dir.display());
            return Ok(None);
        }

        Ok(Some(Snapshot {
            users: users.unwrap_or_default(),
            posts: posts.unwrap_or_default(),
            notifications: notifications.unwrap_or_default(),
        }))
    }

    async fn save(&self, snapshot: &Snapshot) -> HearthResult<()> {
        tokio::fs::create_dir_all(&self.dir).await?;
        self.write_collection(USERS, &snapshot.users).await?;
        self.write_collection(POSTS, &snapshot.posts).await?;
        self.write_collection(NOTIFICATIONS, &snapshot.notifications).await?;
        Ok(())
    }

    fn describe(&self) -> String {
        format!("json files in {}", self.dir.display())
    }
}
