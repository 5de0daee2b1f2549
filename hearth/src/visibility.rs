use crate::types::{Post, Privacy, User};

/// Whether `viewer` may see `post`.
///
/// Public posts are visible to everyone, a post is always visible to its
/// owner, and friends-only posts are visible to the owner's friends. The
/// friendship is read from the viewer's own record.
pub fn is_visible(viewer: &User, post: &Post) -> bool {
    match post.privacy {
        Privacy::Public => true,
        Privacy::Friends => post.user_id == viewer.id || viewer.is_friends_with(post.user_id),
    }
}

/// Keeps the posts `viewer` may see, preserving order.
pub fn visible_to<'a, I>(viewer: &'a User, posts: I) -> impl Iterator<Item = &'a Post> + 'a
where
    I: IntoIterator<Item = &'a Post>,
    I::IntoIter: 'a,
{
    posts.into_iter().filter(move |post| is_visible(viewer, post))
}
