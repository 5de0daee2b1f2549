//! Hearth core library.
//!
//! A small social network: users befriend each other through directed
//! requests, publish posts that are public or friends-only, react and
//! comment, and receive notifications. Every mutation is persisted as a full
//! snapshot and then broadcast to all connected observers.

pub mod client_view;
pub mod config;
pub mod errors;
pub mod fanout;
pub mod graph;
pub mod id;
pub mod keys;
pub mod network;
pub mod notifications;
pub mod posts;
pub mod server;
pub mod storage;
pub mod types;
pub mod validators;
pub mod visibility;

pub use client_view::{ClientView, Followup};
pub use config::HearthConfig;
pub use errors::{EntityKind, HearthError, HearthResult, ValidationError, ValidationIssue};
pub use fanout::{Delivery, Event, Fanout, Observer};
pub use graph::{AcceptOutcome, FriendAction, Relationship, RelationshipStore, RequestOutcome};
pub use network::{Network, NewPost};
pub use storage::{Backend, JsonFileStore, MemoryStore, RedisStore, Snapshot, SnapshotStore};
pub use types::{Comment, Notification, NotificationKind, Post, Privacy, Reaction, ReactionKind, User};
