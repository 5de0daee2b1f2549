//! Post aggregate: posts, their reactions and their comments.

use crate::{
    errors::{HearthError, HearthResult},
    id::IdMinter,
    notifications::NotificationLedger,
    types::{Comment, NotificationKind, Post, PostId, Privacy, Reaction, ReactionKind, User, UserId},
    visibility::visible_to,
};

/// A comment that was just appended, with the post it now belongs to.
#[derive(Debug, Clone)]
pub struct Commented {
    pub comment: Comment,
    pub post: Post,
}

/// Owns every post, newest first.
#[derive(Debug, Clone, Default)]
pub struct PostAggregate {
    posts: Vec<Post>,
    ids: IdMinter,
}

impl PostAggregate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds the aggregate from persisted posts (already newest first).
    pub fn from_posts(posts: Vec<Post>) -> Self {
        let floor = posts
            .iter()
            .flat_map(|post| std::iter::once(post.id).chain(post.comments.iter().map(|c| c.id)))
            .max()
            .unwrap_or(0);
        Self {
            posts,
            ids: IdMinter::resume_after(floor),
        }
    }

    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    pub fn into_posts(self) -> Vec<Post> {
        self.posts
    }

    pub fn post(&self, id: PostId) -> Option<&Post> {
        self.posts.iter().find(|post| post.id == id)
    }

    /// Creates a post owned by `owner` and puts it at the head of the list.
    ///
    /// The owner's name and avatar are copied into the post as they are now.
    pub fn create_post(&mut self, owner: &User, text: String, media: Option<String>, privacy: Privacy) -> Post {
        let post = Post {
            id: self.ids.next_id(),
            user_id: owner.id,
            author: owner.name.clone(),
            avatar: owner.avatar.clone(),
            text,
            media,
            likes: Vec::new(),
            comments: Vec::new(),
            privacy,
        };
        self.posts.insert(0, post.clone());
        post
    }

    /// Sets `user_id`'s reaction on a post, replacing any previous one.
    ///
    /// Every call by someone other than the owner appends a `reaction`
    /// notification, even when the kind did not change.
    pub fn react(
        &mut self,
        post_id: PostId,
        user_id: UserId,
        kind: ReactionKind,
        ledger: &mut NotificationLedger,
    ) -> HearthResult<Post> {
        let post = self.post_mut(post_id)?;
        post.likes.retain(|reaction| reaction.user_id != user_id);
        post.likes.push(Reaction { user_id, kind });

        if post.user_id != user_id {
            ledger.record(NotificationKind::Reaction, user_id, post.user_id, Some(post.id), Some(kind));
        }
        Ok(post.clone())
    }

    /// Appends a comment by `author`; notifies the owner when someone else commented.
    pub fn comment(
        &mut self,
        post_id: PostId,
        author: &User,
        text: String,
        ledger: &mut NotificationLedger,
    ) -> HearthResult<Commented> {
        let comment_id = self.ids.next_id();
        let post = self.post_mut(post_id)?;
        let comment = Comment {
            id: comment_id,
            user_id: author.id,
            author: author.name.clone(),
            avatar: author.avatar.clone(),
            text,
        };
        post.comments.push(comment.clone());

        if post.user_id != author.id {
            ledger.record(NotificationKind::Comment, author.id, post.user_id, Some(post.id), None);
        }
        Ok(Commented {
            comment,
            post: post.clone(),
        })
    }

    /// Posts `viewer` may see, in list order.
    pub fn list_visible(&self, viewer: &User) -> Vec<Post> {
        visible_to(viewer, &self.posts).cloned().collect()
    }

    fn post_mut(&mut self, id: PostId) -> HearthResult<&mut Post> {
        self.posts
            .iter_mut()
            .find(|post| post.id == id)
            .ok_or_else(|| HearthError::post_not_found(id))
    }
}
