//! Broadcast-to-all event fanout.
//!
//! Every successful mutation publishes one [`Event`] carrying the full
//! updated object. Events are not targeted: every observer receives every
//! event and decides relevance itself (see [`crate::client_view`]). There is
//! no acknowledgement and no replay; an observer that falls behind the
//! channel capacity is told how many events it missed and must reconcile by
//! querying.

use log::{debug, warn};
use redis::aio::ConnectionManager;
use serde::{Deserialize, Serialize};
use tokio::{sync::broadcast, task::JoinHandle};

use crate::types::{Post, UserId};

pub const DEFAULT_CAPACITY: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum Event {
    NewPost(Post),
    LikeUpdate(Post),
    CommentUpdate(Post),
    Notification {
        to: UserId,
    },
    FriendRequest {
        to: UserId,
    },
    #[serde(rename_all = "camelCase")]
    FriendAccepted {
        from_user_id: UserId,
        to_user_id: UserId,
    },
    #[serde(rename_all = "camelCase")]
    FriendRequestUpdated {
        user_id: UserId,
    },
    #[serde(rename_all = "camelCase")]
    FriendRemoved {
        user_id: UserId,
        friend_id: UserId,
    },
}

impl Event {
    /// Wire name of the event.
    pub fn name(&self) -> &'static str {
        match self {
            Event::NewPost(_) => "newPost",
            Event::LikeUpdate(_) => "likeUpdate",
            Event::CommentUpdate(_) => "commentUpdate",
            Event::Notification { .. } => "notification",
            Event::FriendRequest { .. } => "friendRequest",
            Event::FriendAccepted { .. } => "friendAccepted",
            Event::FriendRequestUpdated { .. } => "friendRequestUpdated",
            Event::FriendRemoved { .. } => "friendRemoved",
        }
    }
}

/// What an observer pulled off the channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    Event(Event),
    /// The observer lagged and this many events were dropped for it.
    Missed(u64),
}

/// Publisher side of the fanout. Cheap to clone.
#[derive(Debug, Clone)]
pub struct Fanout {
    sender: broadcast::Sender<Event>,
}

impl Default for Fanout {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl Fanout {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Sends `event` to every current observer without waiting.
    ///
    /// Returns how many observers it was queued for; zero observers is not an error.
    pub fn publish(&self, event: Event) -> usize {
        let name = event.name();
        match self.sender.send(event) {
            Ok(reached) => {
                debug!("published {name} to {reached} observer(s)");
                reached
            }
            Err(_) => {
                debug!("published {name} with no observers connected");
                0
            }
        }
    }

    /// Registers a new observer. It only sees events published after this call.
    pub fn subscribe(&self) -> Observer {
        Observer {
            receiver: self.sender.subscribe(),
        }
    }

    pub fn observer_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

/// Receiving side held by one connected client. Events arrive in publish order.
#[derive(Debug)]
pub struct Observer {
    receiver: broadcast::Receiver<Event>,
}

impl Observer {
    /// Waits for the next delivery. `None` once every publisher is gone.
    pub async fn recv(&mut self) -> Option<Delivery> {
        match self.receiver.recv().await {
            Ok(event) => Some(Delivery::Event(event)),
            Err(broadcast::error::RecvError::Lagged(missed)) => Some(Delivery::Missed(missed)),
            Err(broadcast::error::RecvError::Closed) => None,
        }
    }

    /// Non-blocking variant of [`Observer::recv`]; `None` when nothing is queued.
    pub fn try_recv(&mut self) -> Option<Delivery> {
        match self.receiver.try_recv() {
            Ok(event) => Some(Delivery::Event(event)),
            Err(broadcast::error::TryRecvError::Lagged(missed)) => Some(Delivery::Missed(missed)),
            Err(_) => None,
        }
    }
}

/// Republishes every fanout event as JSON on a Redis pub/sub channel.
///
/// Runs as its own task so a slow Redis never delays a mutation. Publish
/// failures are logged and the event is dropped.
pub fn spawn_redis_relay(fanout: &Fanout, mut conn: ConnectionManager, channel: String) -> JoinHandle<()> {
    let mut observer = fanout.subscribe();
    tokio::spawn(async move {
        while let Some(delivery) = observer.recv().await {
            let event = match delivery {
                Delivery::Event(event) => event,
                Delivery::Missed(missed) => {
                    warn!("redis relay fell behind and dropped {missed} event(s)");
                    continue;
                }
            };
            let payload = match serde_json::to_string(&event) {
                Ok(payload) => payload,
                Err(err) => {
                    warn!("failed to encode {} for redis relay: {err}", event.name());
                    continue;
                }
            };
            let published: Result<i64, redis::RedisError> =
                redis::cmd("PUBLISH").arg(&channel).arg(payload).query_async(&mut conn).await;
            if let Err(err) = published {
                warn!("failed to relay {} to {channel}: {err}", event.name());
            }
        }
        debug!("redis relay stopped: fanout closed");
    })
}
