//! What one connected client holds, and how it reacts to fanout events.
//!
//! The server broadcasts every event to everybody, so relevance is decided
//! here: a `newPost` is only kept if it passes [`is_visible`] for the local
//! viewer, notifications only matter when addressed to the viewer, and so
//! on. Anything the reducer cannot derive locally is returned as a
//! [`Followup`] telling the client which query to re-run.
//!
//! Friend-button presses are applied optimistically with the same
//! transitions the server uses, before the request is sent.

use crate::{
    fanout::{Delivery, Event},
    graph::{
        FriendAction, Relationship,
        transitions::{self, ActionOutcome},
    },
    types::{Notification, Post, User, UserId},
    visibility::is_visible,
};

/// A pull the client should perform after applying an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Followup {
    /// Re-fetch `GET /users`.
    RefreshUsers,
    /// Re-fetch the viewer's posts and notifications.
    RefreshFeed,
    /// Show the "friend added" banner.
    AnnounceFriendship,
}

#[derive(Debug, Clone)]
pub struct ClientView {
    viewer: UserId,
    users: Vec<User>,
    posts: Vec<Post>,
    notifications: Vec<Notification>,
}

impl ClientView {
    pub fn new(viewer: UserId, users: Vec<User>, posts: Vec<Post>, notifications: Vec<Notification>) -> Self {
        Self {
            viewer,
            users,
            posts,
            notifications,
        }
    }

    pub fn viewer(&self) -> Option<&User> {
        self.user(self.viewer)
    }

    pub fn user(&self, id: UserId) -> Option<&User> {
        self.users.iter().find(|user| user.id == id)
    }

    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    pub fn replace_users(&mut self, users: Vec<User>) {
        self.users = users;
    }

    pub fn replace_feed(&mut self, posts: Vec<Post>, notifications: Vec<Notification>) {
        self.posts = posts;
        self.notifications = notifications;
    }

    /// Folds one delivery into the local state.
    pub fn apply(&mut self, delivery: &Delivery) -> Vec<Followup> {
        match delivery {
            Delivery::Event(event) => self.apply_event(event),
            Delivery::Missed(_) => vec![Followup::RefreshUsers, Followup::RefreshFeed],
        }
    }

    pub fn apply_event(&mut self, event: &Event) -> Vec<Followup> {
        match event {
            Event::NewPost(post) => {
                let visible = self.viewer().is_some_and(|viewer| is_visible(viewer, post));
                if visible && !self.posts.iter().any(|existing| existing.id == post.id) {
                    self.posts.insert(0, post.clone());
                }
                Vec::new()
            }
            Event::LikeUpdate(post) | Event::CommentUpdate(post) => {
                if let Some(existing) = self.posts.iter_mut().find(|existing| existing.id == post.id) {
                    *existing = post.clone();
                }
                Vec::new()
            }
            Event::Notification { to } => {
                if *to == self.viewer {
                    vec![Followup::RefreshFeed]
                } else {
                    Vec::new()
                }
            }
            Event::FriendRequest { .. } => vec![Followup::RefreshUsers],
            Event::FriendAccepted {
                from_user_id,
                to_user_id,
            } => {
                if self.viewer == *from_user_id || self.viewer == *to_user_id {
                    vec![Followup::RefreshUsers, Followup::RefreshFeed, Followup::AnnounceFriendship]
                } else {
                    vec![Followup::RefreshUsers]
                }
            }
            Event::FriendRequestUpdated { user_id } => {
                if self.viewer == *user_id {
                    vec![Followup::RefreshUsers]
                } else {
                    Vec::new()
                }
            }
            Event::FriendRemoved { user_id, friend_id } => {
                if self.viewer == *user_id || self.viewer == *friend_id {
                    vec![Followup::RefreshUsers, Followup::RefreshFeed]
                } else {
                    Vec::new()
                }
            }
        }
    }

    /// The viewer's relationship with `other`, from local records.
    pub fn relationship_with(&self, other: UserId) -> Option<Relationship> {
        let viewer = self.viewer()?;
        let other = self.user(other)?;
        Some(transitions::relationship(viewer, other))
    }

    /// Presses the friend button next to `other`.
    ///
    /// Applies the button's action to the local copies of both records and
    /// returns it so the caller can send the matching request. `None` when
    /// either user is unknown locally or `other` is the viewer.
    pub fn toggle_friend(&mut self, other: UserId) -> Option<FriendAction> {
        let action = self.relationship_with(other)?.primary_action()?;
        self.apply_friend_action(action, other)?;
        Some(action)
    }

    /// Applies `action` by the viewer towards `other` to the local records.
    pub fn apply_friend_action(&mut self, action: FriendAction, other: UserId) -> Option<ActionOutcome> {
        let viewer_idx = self.users.iter().position(|user| user.id == self.viewer)?;
        let other_idx = self.users.iter().position(|user| user.id == other)?;
        if viewer_idx == other_idx {
            return None;
        }

        let mut viewer = self.users[viewer_idx].clone();
        let mut subject = self.users[other_idx].clone();
        let outcome = transitions::apply(action, &mut viewer, &mut subject);
        self.users[viewer_idx] = viewer;
        self.users[other_idx] = subject;
        Some(outcome)
    }
}
