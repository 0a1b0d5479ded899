//! Remote collection port - the REST resource holding the authoritative posts.

use async_trait::async_trait;

use crate::domain::{ActorId, ImageUpload, Post, PostId, PostUpdate};
use crate::error::RemoteError;

/// Access to the remote post collection.
///
/// Implementations report every failure (transport, status, decode) as a
/// [`RemoteError`]; they never fall back on their own.
#[async_trait]
pub trait PostRemote: Send + Sync {
    /// Fetch the whole collection, in server order.
    async fn list(&self) -> Result<Vec<Post>, RemoteError>;

    /// Fetch a single post.
    async fn get(&self, id: &PostId) -> Result<Post, RemoteError>;

    /// Submit a new post and return the server record.
    async fn create(&self, post: &Post, actor: &ActorId) -> Result<Post, RemoteError>;

    /// Attach an image to an existing post.
    async fn attach_image(
        &self,
        id: &PostId,
        image: ImageUpload,
        actor: &ActorId,
    ) -> Result<Post, RemoteError>;

    /// Replace the mutable fields of a post.
    async fn update(
        &self,
        id: &PostId,
        update: &PostUpdate,
        actor: &ActorId,
    ) -> Result<Post, RemoteError>;

    async fn delete(&self, id: &PostId, actor: &ActorId) -> Result<(), RemoteError>;

    /// Absolute URL of the image sub-resource. No network call.
    fn image_url(&self, id: &PostId) -> String;
}
