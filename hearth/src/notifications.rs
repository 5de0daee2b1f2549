use crate::{
    id::IdMinter,
    types::{Notification, NotificationKind, PostId, ReactionKind, UserId},
};

/// Append-only list of notifications.
///
/// Entries are never updated or removed; there is no read state.
#[derive(Debug, Clone, Default)]
pub struct NotificationLedger {
    entries: Vec<Notification>,
    ids: IdMinter,
}

impl NotificationLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a ledger from persisted entries. New ids continue after the largest loaded id.
    pub fn from_entries(entries: Vec<Notification>) -> Self {
        let floor = entries.iter().map(|n| n.id).max().unwrap_or(0);
        Self {
            entries,
            ids: IdMinter::resume_after(floor),
        }
    }

    /// Appends a notification; the id is assigned here.
    pub fn record(
        &mut self,
        kind: NotificationKind,
        from: UserId,
        to: UserId,
        post_id: Option<PostId>,
        reaction_type: Option<ReactionKind>,
    ) -> Notification {
        let notification = Notification {
            id: self.ids.next_id(),
            kind,
            from,
            to,
            post_id,
            reaction_type,
        };
        self.entries.push(notification.clone());
        notification
    }

    /// Everything addressed to `user_id`, oldest first.
    pub fn list_for(&self, user_id: UserId) -> Vec<Notification> {
        self.entries.iter().filter(|n| n.to == user_id).cloned().collect()
    }

    pub fn entries(&self) -> &[Notification] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_entries(self) -> Vec<Notification> {
        self.entries
    }
}
