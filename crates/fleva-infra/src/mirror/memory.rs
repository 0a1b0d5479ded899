//! In-memory mirror - used in tests and when no file store is configured.

use async_trait::async_trait;
use tokio::sync::RwLock;

use fleva_core::domain::{Post, PostId};
use fleva_core::error::MirrorError;
use fleva_core::ports::{PostMirror, mirror};

/// In-memory post mirror behind an async RwLock.
///
/// Note: Data is lost on process restart.
pub struct InMemoryPostMirror {
    posts: RwLock<Vec<Post>>,
}

impl InMemoryPostMirror {
    pub fn new() -> Self {
        Self {
            posts: RwLock::new(Vec::new()),
        }
    }

    /// Mirror pre-filled with `posts`, most recent first.
    pub fn with_posts(posts: Vec<Post>) -> Self {
        Self {
            posts: RwLock::new(posts),
        }
    }

    pub async fn len(&self) -> usize {
        self.posts.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.posts.read().await.is_empty()
    }
}

impl Default for InMemoryPostMirror {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PostMirror for InMemoryPostMirror {
    async fn load(&self, id: &PostId) -> Result<Option<Post>, MirrorError> {
        let posts = self.posts.read().await;
        Ok(posts.iter().find(|p| p.id.same_key(id)).cloned())
    }

    async fn prepend(&self, post: Post) -> Result<(), MirrorError> {
        let mut posts = self.posts.write().await;
        mirror::prepend(&mut posts, post);
        Ok(())
    }

    async fn save(&self, post: Post) -> Result<(), MirrorError> {
        let mut posts = self.posts.write().await;
        mirror::upsert(&mut posts, post);
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Post>, MirrorError> {
        Ok(self.posts.read().await.clone())
    }

    async fn delete(&self, id: &PostId) -> Result<bool, MirrorError> {
        let mut posts = self.posts.write().await;
        Ok(mirror::remove(&mut posts, id))
    }
}
