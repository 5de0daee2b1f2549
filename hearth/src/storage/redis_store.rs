use redis::aio::ConnectionManager;
use serde::de::DeserializeOwned;

use super::{NOTIFICATIONS, POSTS, Snapshot, SnapshotStore, USERS};
use crate::{errors::HearthResult, keys::KeyContext};

/// Stores each collection as a JSON string under `{prefix}:snapshot:{collection}`.
///
/// The three keys are written in one `MULTI`/`EXEC` block so readers never
/// observe a half-written snapshot.
#[derive(Clone)]
pub struct RedisStore {
    conn: ConnectionManager,
    prefix: String,
}

impl std::fmt::Debug for RedisStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisStore").field("prefix", &self.prefix).finish()
    }
}

impl RedisStore {
    pub fn new(conn: ConnectionManager, prefix: impl Into<String>) -> Self {
        Self {
            conn,
            prefix: prefix.into(),
        }
    }

    /// Opens a connection manager for `url`.
    pub async fn connect(url: &str, prefix: impl Into<String>) -> Result<Self, redis::RedisError> {
        let client = redis::Client::open(url)?;
        let conn = ConnectionManager::new(client).await?;
        Ok(Self::new(conn, prefix))
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn connection(&self) -> ConnectionManager {
        self.conn.clone()
    }

    fn keys(&self) -> [String; 3] {
        let ctx = KeyContext::new(&self.prefix);
        [ctx.collection(USERS), ctx.collection(POSTS), ctx.collection(NOTIFICATIONS)]
    }
}

fn decode<T: DeserializeOwned>(raw: Option<String>) -> HearthResult<Vec<T>> {
    match raw {
        Some(json) => Ok(serde_json::from_str(&json)?),
        None => Ok(Vec::new()),
    }
}

impl SnapshotStore for RedisStore {
    async fn load(&self) -> HearthResult<Option<Snapshot>> {
        let mut conn = self.conn.clone();
        let [users_key, posts_key, notifications_key] = self.keys();
        let values: Vec<Option<String>> = redis::cmd("MGET")
            .arg(&users_key)
            .arg(&posts_key)
            .arg(&notifications_key)
            .query_async(&mut conn)
            .await?;

        if values.iter().all(Option::is_none) {
            return Ok(None);
        }

        let mut values = values.into_iter();
        Ok(Some(Snapshot {
            users: decode(values.next().flatten())?,
            posts: decode(values.next().flatten())?,
            notifications: decode(values.next().flatten())?,
        }))
    }

    async fn save(&self, snapshot: &Snapshot) -> HearthResult<()> {
        let mut conn = self.conn.clone();
        let [users_key, posts_key, notifications_key] = self.keys();
        let users = serde_json::to_string(&snapshot.users)?;
        let posts = serde_json::to_string(&snapshot.posts)?;
        let notifications = serde_json::to_string(&snapshot.notifications)?;

        let _: () = redis::pipe()
            .atomic()
            .cmd("SET")
            .arg(&users_key)
            .arg(users)
            .ignore()
            .cmd("SET")
            .arg(&posts_key)
            .arg(posts)
            .ignore()
            .cmd("SET")
            .arg(&notifications_key)
            .arg(notifications)
            .ignore()
            .query_async(&mut conn)
            .await?;
        Ok(())
    }

    fn describe(&self) -> String {
        format!("redis keys under {}:snapshot", self.prefix)
    }
}
