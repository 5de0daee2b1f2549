//! Single owner of all mutable state.
//!
//! Every command runs as one unit while holding the state lock:
//!
//! 1. validate the request (nothing is touched on failure),
//! 2. apply the mutation to a draft copy of the state, appending to the
//!    notification ledger where the operation calls for it,
//! 3. persist the draft as the new snapshot,
//! 4. swap the draft in as the live state,
//! 5. publish the resulting events, still under the lock so observers see
//!    them in commit order.
//!
//! A failed save leaves the live state exactly as it was. A crash between
//! steps 3 and 5 loses only the events; clients reconcile by querying.

use log::{error, info};
use tokio::sync::Mutex;

use crate::{
    errors::{HearthError, HearthResult},
    fanout::{Event, Fanout, Observer},
    graph::{AcceptOutcome, Relationship, RelationshipStore, RequestOutcome},
    notifications::NotificationLedger,
    posts::PostAggregate,
    storage::{Snapshot, SnapshotStore},
    types::{Comment, Notification, NotificationKind, Post, PostId, Privacy, ReactionKind, User, UserId, seed_users},
    validators::{check_media, check_required_text, finish},
};

/// Request to publish a post.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub user_id: UserId,
    pub text: String,
    pub media: Option<String>,
    pub privacy: Privacy,
}

#[derive(Debug, Clone, Default)]
struct State {
    graph: RelationshipStore,
    posts: PostAggregate,
    ledger: NotificationLedger,
}

impl State {
    fn from_snapshot(snapshot: Snapshot) -> Self {
        let users = if snapshot.users.is_empty() {
            info!("no users in snapshot, seeding demo users");
            seed_users()
        } else {
            snapshot.users
        };
        Self {
            graph: RelationshipStore::from_users(users),
            posts: PostAggregate::from_posts(snapshot.posts),
            ledger: NotificationLedger::from_entries(snapshot.notifications),
        }
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            users: self.graph.users().to_vec(),
            posts: self.posts.posts().to_vec(),
            notifications: self.ledger.entries().to_vec(),
        }
    }
}

/// The social network: relationship store, post aggregate and notification
/// ledger behind one lock, persisted through `S` and broadcast through a
/// [`Fanout`].
pub struct Network<S> {
    state: Mutex<State>,
    store: S,
    fanout: Fanout,
}

impl<S: SnapshotStore> Network<S> {
    /// Loads the stored snapshot, or seeds the demo users when there is none.
    pub async fn open(store: S, fanout: Fanout) -> HearthResult<Self> {
        let snapshot = match store.load().await? {
            Some(snapshot) => {
                info!(
                    "loaded {} user(s), {} post(s), {} notification(s) from {}",
                    snapshot.users.len(),
                    snapshot.posts.len(),
                    snapshot.notifications.len(),
                    store.describe()
                );
                snapshot
            }
            None => {
                info!("nothing stored in {}, starting fresh", store.describe());
                Snapshot::default()
            }
        };
        Ok(Self::from_snapshot(store, fanout, snapshot))
    }

    /// Builds a network over an explicit snapshot without reading `store`.
    pub fn from_snapshot(store: S, fanout: Fanout, snapshot: Snapshot) -> Self {
        Self {
            state: Mutex::new(State::from_snapshot(snapshot)),
            store,
            fanout,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn fanout(&self) -> &Fanout {
        &self.fanout
    }

    /// Registers a new event observer.
    pub fn subscribe(&self) -> Observer {
        self.fanout.subscribe()
    }

    pub async fn users(&self) -> Vec<User> {
        self.state.lock().await.graph.users().to_vec()
    }

    pub async fn user(&self, id: UserId) -> Option<User> {
        self.state.lock().await.graph.user(id).cloned()
    }

    /// Posts `viewer` may see, newest first. Unknown viewers see nothing.
    pub async fn visible_posts(&self, viewer: UserId) -> Vec<Post> {
        let state = self.state.lock().await;
        match state.graph.user(viewer) {
            Some(user) => state.posts.list_visible(user),
            None => Vec::new(),
        }
    }

    pub async fn notifications_for(&self, user: UserId) -> Vec<Notification> {
        self.state.lock().await.ledger.list_for(user)
    }

    pub async fn relationship(&self, viewer: UserId, other: UserId) -> HearthResult<Relationship> {
        self.state.lock().await.graph.relationship(viewer, other)
    }

    /// Copy of the live state in persisted form.
    pub async fn snapshot(&self) -> Snapshot {
        self.state.lock().await.snapshot()
    }

    pub async fn create_post(&self, request: NewPost) -> HearthResult<Post> {
        let mut issues = Vec::new();
        check_required_text("text", &request.text, &mut issues);
        check_media("media", request.media.as_deref(), &mut issues);
        finish(issues)?;

        self.commit("create post", move |draft| {
            let owner = draft.graph.require(request.user_id)?.clone();
            let post = draft
                .posts
                .create_post(&owner, request.text, request.media, request.privacy);
            Ok((post.clone(), vec![Event::NewPost(post)]))
        })
        .await
    }

    pub async fn react(&self, post_id: PostId, user_id: UserId, kind: ReactionKind) -> HearthResult<Post> {
        self.commit("react", move |draft| {
            ensure_post(draft, post_id)?;
            draft.graph.require(user_id)?;
            let post = draft.posts.react(post_id, user_id, kind, &mut draft.ledger)?;
            let owner = post.user_id;
            Ok((post.clone(), vec![Event::LikeUpdate(post), Event::Notification { to: owner }]))
        })
        .await
    }

    pub async fn comment(&self, post_id: PostId, user_id: UserId, text: String) -> HearthResult<Comment> {
        let mut issues = Vec::new();
        check_required_text("text", &text, &mut issues);
        finish(issues)?;

        self.commit("comment", move |draft| {
            ensure_post(draft, post_id)?;
            let author = draft.graph.require(user_id)?.clone();
            let done = draft.posts.comment(post_id, &author, text, &mut draft.ledger)?;
            let owner = done.post.user_id;
            Ok((
                done.comment,
                vec![Event::CommentUpdate(done.post), Event::Notification { to: owner }],
            ))
        })
        .await
    }

    /// `from` asks `to` to be friends.
    pub async fn send_friend_request(&self, from: UserId, to: UserId) -> HearthResult<RequestOutcome> {
        self.commit("send friend request", move |draft| {
            let outcome = draft.graph.send_friend_request(from, to)?;
            let event = match outcome {
                RequestOutcome::Sent => {
                    draft.ledger.record(NotificationKind::FriendRequest, from, to, None, None);
                    Event::FriendRequest { to }
                }
                RequestOutcome::AlreadyPending | RequestOutcome::AlreadyFriends | RequestOutcome::SelfRequest => {
                    Event::FriendRequest { to }
                }
            };
            Ok((outcome, vec![event]))
        })
        .await
    }

    /// `user` accepts the request `from` sent them.
    ///
    /// `friendAccepted` is only published when the pair are friends afterwards.
    /// Without a pending request the caller's records are stale, so only
    /// `user` is asked to refresh.
    pub async fn accept_friend_request(&self, user: UserId, from: UserId) -> HearthResult<AcceptOutcome> {
        self.commit("accept friend request", move |draft| {
            let outcome = draft.graph.accept_friend_request(user, from)?;
            let event = match outcome {
                AcceptOutcome::Accepted => {
                    draft.ledger.record(NotificationKind::FriendAccepted, user, from, None, None);
                    Event::FriendAccepted {
                        from_user_id: from,
                        to_user_id: user,
                    }
                }
                AcceptOutcome::AlreadyFriends => Event::FriendAccepted {
                    from_user_id: from,
                    to_user_id: user,
                },
                AcceptOutcome::NoPendingRequest => Event::FriendRequestUpdated { user_id: user },
            };
            Ok((outcome, vec![event]))
        })
        .await
    }

    /// `from` withdraws the request they sent to `user`.
    pub async fn cancel_sent_request(&self, from: UserId, user: UserId) -> HearthResult<bool> {
        self.commit("cancel friend request", move |draft| {
            let changed = draft.graph.cancel_sent_request(from, user)?;
            Ok((changed, vec![Event::FriendRequestUpdated { user_id: user }]))
        })
        .await
    }

    pub async fn remove_friend(&self, user: UserId, friend: UserId) -> HearthResult<bool> {
        self.commit("remove friend", move |draft| {
            let changed = draft.graph.remove_friend(user, friend)?;
            Ok((
                changed,
                vec![Event::FriendRemoved {
                    user_id: user,
                    friend_id: friend,
                }],
            ))
        })
        .await
    }

    /// `user` discards the request `from` sent them. `from` is not told.
    pub async fn delete_incoming_request(&self, user: UserId, from: UserId) -> HearthResult<bool> {
        self.commit("delete friend request", move |draft| {
            let changed = draft.graph.delete_incoming_request(user, from)?;
            Ok((changed, Vec::new()))
        })
        .await
    }

    async fn commit<T, F>(&self, operation: &'static str, apply: F) -> HearthResult<T>
    where
        F: FnOnce(&mut State) -> HearthResult<(T, Vec<Event>)> + Send,
        T: Send,
    {
        let mut live = self.state.lock().await;
        let mut draft = live.clone();
        let (value, events) = apply(&mut draft)?;

        if let Err(err) = self.store.save(&draft.snapshot()).await {
            error!("{operation}: failed to persist snapshot to {}: {err}", self.store.describe());
            return Err(err);
        }

        *live = draft;
        for event in events {
            self.fanout.publish(event);
        }
        drop(live);
        Ok(value)
    }
}

fn ensure_post(state: &State, post_id: PostId) -> HearthResult<()> {
    match state.posts.post(post_id) {
        Some(_) => Ok(()),
        None => Err(HearthError::post_not_found(post_id)),
    }
}
