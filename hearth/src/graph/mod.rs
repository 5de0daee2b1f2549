//! Relationship store: user records and the friend/request graph.

pub mod transitions;

pub use transitions::{AcceptOutcome, ActionOutcome, FriendAction, Relationship, RequestOutcome};

use log::warn;

use crate::{
    errors::{HearthError, HearthResult},
    types::{User, UserId},
};

/// Owns every [`User`] record, in load order.
///
/// All friend-state operations go through this type. Each one resolves both
/// ids first, so an unknown id fails before any record is touched.
#[derive(Debug, Clone, Default)]
pub struct RelationshipStore {
    users: Vec<User>,
}

impl RelationshipStore {
    /// Builds a store from loaded records, repairing broken invariants.
    ///
    /// Duplicate ids inside a set are dropped, a pending request between two
    /// friends is discarded and one-sided friendships are made mutual.
    pub fn from_users(users: Vec<User>) -> Self {
        let mut store = Self { users };
        let repaired = store.repair();
        if repaired > 0 {
            warn!("repaired {repaired} inconsistent friend entries while loading users");
        }
        store
    }

    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn into_users(self) -> Vec<User> {
        self.users
    }

    pub fn user(&self, id: UserId) -> Option<&User> {
        self.users.iter().find(|user| user.id == id)
    }

    pub fn require(&self, id: UserId) -> HearthResult<&User> {
        self.user(id).ok_or_else(|| HearthError::user_not_found(id))
    }

    pub fn contains(&self, id: UserId) -> bool {
        self.user(id).is_some()
    }

    /// `actor` asks `subject` to be friends.
    pub fn send_friend_request(&mut self, actor: UserId, subject: UserId) -> HearthResult<RequestOutcome> {
        match self.pair_mut(actor, subject)? {
            Some((a, b)) => Ok(transitions::send_request(a, b)),
            None => Ok(RequestOutcome::SelfRequest),
        }
    }

    /// `actor` accepts the request `subject` previously sent them.
    pub fn accept_friend_request(&mut self, actor: UserId, subject: UserId) -> HearthResult<AcceptOutcome> {
        match self.pair_mut(actor, subject)? {
            Some((a, b)) => Ok(transitions::accept_request(a, b)),
            None => Ok(AcceptOutcome::NoPendingRequest),
        }
    }

    /// `actor` withdraws the request they sent to `subject`.
    pub fn cancel_sent_request(&mut self, actor: UserId, subject: UserId) -> HearthResult<bool> {
        match self.pair_mut(actor, subject)? {
            Some((a, b)) => Ok(transitions::cancel_request(a, b)),
            None => Ok(false),
        }
    }

    pub fn remove_friend(&mut self, actor: UserId, subject: UserId) -> HearthResult<bool> {
        match self.pair_mut(actor, subject)? {
            Some((a, b)) => Ok(transitions::remove_friend(a, b)),
            None => Ok(false),
        }
    }

    /// `actor` discards the request `subject` sent them, without telling `subject`.
    pub fn delete_incoming_request(&mut self, actor: UserId, subject: UserId) -> HearthResult<bool> {
        match self.pair_mut(actor, subject)? {
            Some((a, b)) => Ok(transitions::delete_request(a, b)),
            None => Ok(false),
        }
    }

    pub fn apply(&mut self, action: FriendAction, actor: UserId, subject: UserId) -> HearthResult<ActionOutcome> {
        match action {
            FriendAction::SendRequest => self.send_friend_request(actor, subject).map(ActionOutcome::Request),
            FriendAction::AcceptRequest => self.accept_friend_request(actor, subject).map(ActionOutcome::Accept),
            FriendAction::CancelRequest => self.cancel_sent_request(actor, subject).map(ActionOutcome::Withdrawn),
            FriendAction::RemoveFriend => self.remove_friend(actor, subject).map(ActionOutcome::Unfriended),
            FriendAction::DeleteRequest => self.delete_incoming_request(actor, subject).map(ActionOutcome::Declined),
        }
    }

    /// How `viewer` relates to `other`.
    pub fn relationship(&self, viewer: UserId, other: UserId) -> HearthResult<Relationship> {
        let a = self.require(viewer)?;
        let b = self.require(other)?;
        Ok(transitions::relationship(a, b))
    }

    /// The friend-button action `viewer` would take towards `other`.
    pub fn friend_action(&self, viewer: UserId, other: UserId) -> HearthResult<Option<FriendAction>> {
        self.relationship(viewer, other).map(Relationship::primary_action)
    }

    /// Mutable access to two distinct records. `Ok(None)` when both ids are the same user.
    fn pair_mut(&mut self, a: UserId, b: UserId) -> HearthResult<Option<(&mut User, &mut User)>> {
        let ia = self.index_of(a)?;
        let ib = self.index_of(b)?;
        if ia == ib {
            return Ok(None);
        }
        if ia < ib {
            let (left, right) = self.users.split_at_mut(ib);
            Ok(Some((&mut left[ia], &mut right[0])))
        } else {
            let (left, right) = self.users.split_at_mut(ia);
            Ok(Some((&mut right[0], &mut left[ib])))
        }
    }

    fn index_of(&self, id: UserId) -> HearthResult<usize> {
        self.users
            .iter()
            .position(|user| user.id == id)
            .ok_or_else(|| HearthError::user_not_found(id))
    }

    fn repair(&mut self) -> usize {
        let mut repaired = 0;

        for user in &mut self.users {
            repaired += dedup(&mut user.friends);
            repaired += dedup(&mut user.friend_requests);
            let own_id = user.id;
            let friends = user.friends.clone();
            let before = user.friend_requests.len();
            user.friend_requests
                .retain(|id| *id != own_id && !friends.contains(id));
            repaired += before - user.friend_requests.len();
        }

        let edges: Vec<(UserId, UserId)> = self
            .users
            .iter()
            .flat_map(|user| user.friends.iter().map(move |friend| (user.id, *friend)))
            .collect();
        for (owner, friend) in edges {
            if owner == friend {
                continue;
            }
            if let Some(other) = self.users.iter_mut().find(|user| user.id == friend)
                && !other.friends.contains(&owner)
            {
                other.friends.push(owner);
                other.friend_requests.retain(|id| *id != owner);
                repaired += 1;
            }
        }

        repaired
    }
}

fn dedup(ids: &mut Vec<UserId>) -> usize {
    let before = ids.len();
    let mut seen = Vec::with_capacity(before);
    ids.retain(|id| {
        if seen.contains(id) {
            false
        } else {
            seen.push(*id);
            true
        }
    });
    before - ids.len()
}
