use async_trait::async_trait;

use crate::domain::{Post, PostId};
use crate::error::MirrorError;

/// Local mirror trait - abstraction over the degraded-mode post store
/// (file-backed, in-memory).
///
/// The mirror only holds posts this client tried to write while the remote
/// was unreachable. Records are kept most-recent-first and keyed by id.
#[async_trait]
pub trait PostMirror: Send + Sync {
    /// Look up a mirrored post by id.
    async fn load(&self, id: &PostId) -> Result<Option<Post>, MirrorError>;

    /// Put `post` at the front, even when a record with the same id exists.
    async fn prepend(&self, post: Post) -> Result<(), MirrorError>;

    /// Replace the record with the same id in place, or prepend it.
    async fn save(&self, post: Post) -> Result<(), MirrorError>;

    /// All mirrored posts, most recent first.
    async fn list(&self) -> Result<Vec<Post>, MirrorError>;

    /// Remove a post by id. Returns whether a record was removed.
    async fn delete(&self, id: &PostId) -> Result<bool, MirrorError>;
}

/// Insert `post` at the front of an ordered mirror list. Records sharing its
/// id are kept.
pub fn prepend(posts: &mut Vec<Post>, post: Post) {
    posts.insert(0, post);
}

/// Insert `post` into an ordered mirror list: in place when the id is
/// already present, at the front otherwise.
pub fn upsert(posts: &mut Vec<Post>, post: Post) {
    match posts.iter_mut().find(|p| p.id.same_key(&post.id)) {
        Some(existing) => *existing = post,
        None => posts.insert(0, post),
    }
}

/// Drop every record keyed by `id`. Returns whether anything was removed.
pub fn remove(posts: &mut Vec<Post>, id: &PostId) -> bool {
    let before = posts.len();
    posts.retain(|p| !p.id.same_key(id));
    posts.len() != before
}
