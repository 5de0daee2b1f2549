//! Friendship state machine over a pair of user records.
//!
//! For an ordered pair (A, B) the relationship is one of `None`,
//! `OutgoingPending` (A asked B), `IncomingPending` (B asked A) or
//! `Friends`. A pending request is always stored on the *recipient's*
//! record: "A asked B" means `A ∈ B.friend_requests`.
//!
//! Every function here takes two distinct records and never fails; calls
//! that would not change anything report so through their outcome instead.
//! The same functions drive the server-side store and the client reducer.

use serde::{Deserialize, Serialize};

use crate::types::{User, UserId};

/// How `a` relates to `b`, from `a`'s point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Relationship {
    None,
    OutgoingPending,
    IncomingPending,
    Friends,
    Myself,
}

impl Relationship {
    /// The single action a friend button offers in this state.
    pub fn primary_action(self) -> Option<FriendAction> {
        match self {
            Relationship::None => Some(FriendAction::SendRequest),
            Relationship::OutgoingPending => Some(FriendAction::CancelRequest),
            Relationship::IncomingPending => Some(FriendAction::AcceptRequest),
            Relationship::Friends => Some(FriendAction::RemoveFriend),
            Relationship::Myself => None,
        }
    }
}

/// Operations an actor can apply to their relationship with a subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FriendAction {
    SendRequest,
    AcceptRequest,
    CancelRequest,
    RemoveFriend,
    DeleteRequest,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestOutcome {
    Sent,
    AlreadyPending,
    AlreadyFriends,
    SelfRequest,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcceptOutcome {
    Accepted,
    AlreadyFriends,
    NoPendingRequest,
}

/// Result of [`apply`]: whether the pair's records changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    Request(RequestOutcome),
    Accept(AcceptOutcome),
    Withdrawn(bool),
    Unfriended(bool),
    Declined(bool),
}

pub fn relationship(a: &User, b: &User) -> Relationship {
    if a.id == b.id {
        Relationship::Myself
    } else if a.is_friends_with(b.id) {
        Relationship::Friends
    } else if b.has_request_from(a.id) {
        Relationship::OutgoingPending
    } else if a.has_request_from(b.id) {
        Relationship::IncomingPending
    } else {
        Relationship::None
    }
}

/// `actor` asks `subject` to be friends.
pub fn send_request(actor: &mut User, subject: &mut User) -> RequestOutcome {
    if actor.id == subject.id {
        return RequestOutcome::SelfRequest;
    }
    if subject.is_friends_with(actor.id) {
        return RequestOutcome::AlreadyFriends;
    }
    if subject.has_request_from(actor.id) {
        return RequestOutcome::AlreadyPending;
    }
    subject.friend_requests.push(actor.id);
    RequestOutcome::Sent
}

/// `actor` accepts the request `subject` left on `actor`'s record.
pub fn accept_request(actor: &mut User, subject: &mut User) -> AcceptOutcome {
    if actor.has_request_from(subject.id) {
        remove_id(&mut actor.friend_requests, subject.id);
        remove_id(&mut subject.friend_requests, actor.id);
        insert_id(&mut actor.friends, subject.id);
        insert_id(&mut subject.friends, actor.id);
        AcceptOutcome::Accepted
    } else if actor.is_friends_with(subject.id) {
        insert_id(&mut subject.friends, actor.id);
        AcceptOutcome::AlreadyFriends
    } else {
        AcceptOutcome::NoPendingRequest
    }
}

/// `actor` withdraws the request they left on `subject`'s record.
pub fn cancel_request(actor: &User, subject: &mut User) -> bool {
    remove_id(&mut subject.friend_requests, actor.id)
}

/// Symmetric teardown of a friendship.
pub fn remove_friend(actor: &mut User, subject: &mut User) -> bool {
    let left = remove_id(&mut actor.friends, subject.id);
    let right = remove_id(&mut subject.friends, actor.id);
    left || right
}

/// `actor` discards the request `subject` left on `actor`'s record.
pub fn delete_request(actor: &mut User, subject: &User) -> bool {
    remove_id(&mut actor.friend_requests, subject.id)
}

/// Dispatches a [`FriendAction`] to its transition.
pub fn apply(action: FriendAction, actor: &mut User, subject: &mut User) -> ActionOutcome {
    match action {
        FriendAction::SendRequest => ActionOutcome::Request(send_request(actor, subject)),
        FriendAction::AcceptRequest => ActionOutcome::Accept(accept_request(actor, subject)),
        FriendAction::CancelRequest => ActionOutcome::Withdrawn(cancel_request(actor, subject)),
        FriendAction::RemoveFriend => ActionOutcome::Unfriended(remove_friend(actor, subject)),
        FriendAction::DeleteRequest => ActionOutcome::Declined(delete_request(actor, subject)),
    }
}

fn insert_id(ids: &mut Vec<UserId>, id: UserId) -> bool {
    if ids.contains(&id) {
        false
    } else {
        ids.push(id);
        true
    }
}

fn remove_id(ids: &mut Vec<UserId>, id: UserId) -> bool {
    let before = ids.len();
    ids.retain(|existing| *existing != id);
    ids.len() != before
}
