//! Records shared by the store, the aggregate, the ledger and the wire.
//!
//! Field names follow the JSON layout of the `users`, `posts` and
//! `notifications` collections (camelCase, `type` for kinds), so snapshots
//! written by earlier deployments load unchanged.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

pub type UserId = u64;
pub type PostId = u64;
pub type CommentId = u64;
pub type NotificationId = u64;

/// A member of the network.
///
/// `friend_requests` holds *incoming* pending requests: the ids of users who
/// asked to befriend this user. Outgoing requests are only visible on the
/// recipient's record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub name: String,
    #[serde(default)]
    pub avatar: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub friends: Vec<UserId>,
    #[serde(default)]
    pub friend_requests: Vec<UserId>,
}

impl User {
    pub fn new(id: UserId, name: impl Into<String>, avatar: impl Into<String>, bio: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            avatar: avatar.into(),
            bio: bio.into(),
            friends: Vec::new(),
            friend_requests: Vec::new(),
        }
    }

    pub fn is_friends_with(&self, other: UserId) -> bool {
        self.friends.contains(&other)
    }

    /// True when `other` has a pending request addressed to this user.
    pub fn has_request_from(&self, other: UserId) -> bool {
        self.friend_requests.contains(&other)
    }
}

/// The three demo members created when no snapshot exists yet.
pub fn seed_users() -> Vec<User> {
    vec![
        User::new(1, "Alice", "https://i.pravatar.cc/150?img=1", "Hello, I am Alice"),
        User::new(2, "Bob", "https://i.pravatar.cc/150?img=2", "Hey, Bob here!"),
        User::new(3, "Charlie", "https://i.pravatar.cc/150?img=3", "Charlie's profile"),
    ]
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Privacy {
    #[default]
    Public,
    Friends,
}

impl FromStr for Privacy {
    type Err = UnknownVariant;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "public" => Ok(Privacy::Public),
            "friends" => Ok(Privacy::Friends),
            other => Err(UnknownVariant(other.to_string())),
        }
    }
}

impl fmt::Display for Privacy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Privacy::Public => f.write_str("public"),
            Privacy::Friends => f.write_str("friends"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReactionKind {
    Like,
    Love,
    Haha,
    Wow,
    Sad,
    Angry,
}

impl ReactionKind {
    pub const ALL: [ReactionKind; 6] = [
        ReactionKind::Like,
        ReactionKind::Love,
        ReactionKind::Haha,
        ReactionKind::Wow,
        ReactionKind::Sad,
        ReactionKind::Angry,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReactionKind::Like => "like",
            ReactionKind::Love => "love",
            ReactionKind::Haha => "haha",
            ReactionKind::Wow => "wow",
            ReactionKind::Sad => "sad",
            ReactionKind::Angry => "angry",
        }
    }
}

impl FromStr for ReactionKind {
    type Err = UnknownVariant;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        ReactionKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == value)
            .ok_or_else(|| UnknownVariant(value.to_string()))
    }
}

impl fmt::Display for ReactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string does not name a known privacy or reaction kind.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown variant `{0}`")]
pub struct UnknownVariant(pub String);

/// One user's live reaction on a post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reaction {
    pub user_id: UserId,
    #[serde(rename = "type")]
    pub kind: ReactionKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: CommentId,
    pub user_id: UserId,
    pub author: String,
    #[serde(default)]
    pub avatar: String,
    pub text: String,
}

/// A post together with its reactions and comments.
///
/// `author` and `avatar` are copied from the owner when the post is created
/// and are not refreshed afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: PostId,
    pub user_id: UserId,
    pub author: String,
    #[serde(default)]
    pub avatar: String,
    pub text: String,
    #[serde(default)]
    pub media: Option<String>,
    #[serde(default)]
    pub likes: Vec<Reaction>,
    #[serde(default)]
    pub comments: Vec<Comment>,
    #[serde(default)]
    pub privacy: Privacy,
}

impl Post {
    /// The reaction `user_id` currently holds on this post, if any.
    pub fn reaction_of(&self, user_id: UserId) -> Option<ReactionKind> {
        self.likes
            .iter()
            .find(|reaction| reaction.user_id == user_id)
            .map(|reaction| reaction.kind)
    }

    /// Number of live reactions per kind, in palette order, omitting zeros.
    pub fn reaction_counts(&self) -> Vec<(ReactionKind, usize)> {
        ReactionKind::ALL
            .into_iter()
            .map(|kind| (kind, self.likes.iter().filter(|r| r.kind == kind).count()))
            .filter(|(_, count)| *count > 0)
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NotificationKind {
    Reaction,
    Comment,
    FriendRequest,
    FriendAccepted,
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            NotificationKind::Reaction => "reaction",
            NotificationKind::Comment => "comment",
            NotificationKind::FriendRequest => "friendRequest",
            NotificationKind::FriendAccepted => "friendAccepted",
        };
        f.write_str(label)
    }
}

/// "Something happened to your content" record addressed to `to`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: NotificationId,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub from: UserId,
    pub to: UserId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_id: Option<PostId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reaction_type: Option<ReactionKind>,
}
