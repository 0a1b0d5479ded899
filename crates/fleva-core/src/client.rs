//! Network-first post client with local-mirror fallback.
//!
//! Every remote failure (transport, status, decode) is treated the same way:
//! the operation is replayed against the local mirror and the result is
//! tagged [`Source::LocalFallback`]. Delete is the one operation that still
//! reports the failure to the caller.

use std::sync::Arc;

use serde::Serialize;

use crate::domain::{ActorId, ImageUpload, Post, PostId, PostUpdate};
use crate::error::ClientError;
use crate::ports::{PostMirror, PostRemote};

/// Where a result came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Source {
    Remote,
    LocalFallback,
}

/// A value paired with the store that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Sourced<T> {
    pub value: T,
    pub source: Source,
}

impl<T> Sourced<T> {
    pub fn remote(value: T) -> Self {
        Self {
            value,
            source: Source::Remote,
        }
    }

    pub fn fallback(value: T) -> Self {
        Self {
            value,
            source: Source::LocalFallback,
        }
    }

    /// True when the remote was unavailable and the mirror answered.
    pub fn is_degraded(&self) -> bool {
        self.source == Source::LocalFallback
    }

    pub fn into_inner(self) -> T {
        self.value
    }
}

/// What happened to the image supplied with a create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageStatus {
    NotRequested,
    Attached,
    /// The post was created but the upload failed.
    Failed { reason: String },
    /// The create fell back to the mirror, so no upload was attempted.
    Skipped,
}

/// Result of a create.
#[derive(Debug, Clone, PartialEq)]
pub struct Created {
    pub post: Post,
    pub image: ImageStatus,
}

/// Result of an update.
#[derive(Debug, Clone, PartialEq)]
pub enum Updated {
    /// Server record, or the mirrored record with the update merged in.
    Record(Post),
    /// The mirror did not hold the id; the attempted payload is echoed back.
    Unpersisted { id: PostId, update: PostUpdate },
}

impl Updated {
    pub fn post(&self) -> Option<&Post> {
        match self {
            Updated::Record(post) => Some(post),
            Updated::Unpersisted { .. } => None,
        }
    }
}

/// Post client bridging callers to the remote collection.
#[derive(Clone)]
pub struct PostClient {
    remote: Arc<dyn PostRemote>,
    mirror: Arc<dyn PostMirror>,
}

impl PostClient {
    pub fn new(remote: Arc<dyn PostRemote>, mirror: Arc<dyn PostMirror>) -> Self {
        Self { remote, mirror }
    }

    /// List posts in server order, or the mirror contents when the remote is
    /// unavailable. Never fails.
    pub async fn list(&self) -> Sourced<Vec<Post>> {
        match self.remote.list().await {
            Ok(posts) => {
                tracing::debug!(count = posts.len(), "Listed posts from remote");
                Sourced::remote(posts)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Remote list failed, serving local mirror");
                Sourced::fallback(self.mirrored_posts().await)
            }
        }
    }

    /// Fetch one post. `None` when neither the remote nor the mirror has it.
    pub async fn get(&self, id: &PostId) -> Sourced<Option<Post>> {
        match self.remote.get(id).await {
            Ok(post) => Sourced::remote(Some(post)),
            Err(e) => {
                tracing::warn!(
                    post_id = %id,
                    error = %e,
                    "Remote get failed, searching local mirror"
                );
                let local = match self.mirror.load(id).await {
                    Ok(post) => post,
                    Err(e) => {
                        tracing::error!(post_id = %id, error = %e, "Local mirror unavailable");
                        None
                    }
                };
                Sourced::fallback(local)
            }
        }
    }

    /// Submit a post, then attach `image` to the created record.
    ///
    /// A failed upload does not fail the create. When the create itself
    /// fails the client-stamped record is mirrored and returned as is.
    pub async fn create(
        &self,
        post: Post,
        actor: &ActorId,
        image: Option<ImageUpload>,
    ) -> Sourced<Created> {
        let created = match self.remote.create(&post, actor).await {
            Ok(created) => created,
            Err(e) => {
                tracing::warn!(
                    post_id = %post.id,
                    error = %e,
                    "Remote create failed, mirroring post locally"
                );
                if let Err(e) = self.mirror.prepend(post.clone()).await {
                    tracing::error!(post_id = %post.id, error = %e, "Failed to mirror post");
                }
                let image = match image {
                    Some(_) => ImageStatus::Skipped,
                    None => ImageStatus::NotRequested,
                };
                return Sourced::fallback(Created { post, image });
            }
        };

        tracing::debug!(post_id = %created.id, "Post created on remote");

        let Some(image) = image else {
            return Sourced::remote(Created {
                post: created,
                image: ImageStatus::NotRequested,
            });
        };

        match self.remote.attach_image(&created.id, image, actor).await {
            Ok(with_image) => Sourced::remote(Created {
                post: with_image,
                image: ImageStatus::Attached,
            }),
            Err(e) => {
                tracing::warn!(
                    post_id = %created.id,
                    error = %e,
                    "Image upload failed, keeping post without image"
                );
                Sourced::remote(Created {
                    post: created,
                    image: ImageStatus::Failed {
                        reason: e.to_string(),
                    },
                })
            }
        }
    }

    /// Replace the mutable fields of a post.
    ///
    /// On remote failure the update is merged into the mirrored record; an id
    /// the mirror does not hold leaves the mirror untouched.
    pub async fn update(
        &self,
        id: &PostId,
        update: PostUpdate,
        actor: &ActorId,
    ) -> Sourced<Updated> {
        match self.remote.update(id, &update, actor).await {
            Ok(post) => Sourced::remote(Updated::Record(post)),
            Err(e) => {
                tracing::warn!(
                    post_id = %id,
                    error = %e,
                    "Remote update failed, updating local mirror"
                );
                Sourced::fallback(self.merge_into_mirror(id, update).await)
            }
        }
    }

    /// Delete a post.
    ///
    /// On remote failure the id is still dropped from the mirror, and the
    /// failure is returned so the caller never mistakes it for success.
    pub async fn delete(&self, id: &PostId, actor: &ActorId) -> Result<(), ClientError> {
        let source = match self.remote.delete(id, actor).await {
            Ok(()) => {
                tracing::debug!(post_id = %id, "Post deleted on remote");
                return Ok(());
            }
            Err(e) => e,
        };

        let removed_locally = match self.mirror.delete(id).await {
            Ok(removed) => removed,
            Err(e) => {
                tracing::error!(
                    post_id = %id,
                    error = %e,
                    "Failed to remove post from local mirror"
                );
                false
            }
        };
        tracing::warn!(post_id = %id, removed_locally, error = %source, "Remote delete failed");

        Err(ClientError::DeleteUnconfirmed {
            id: id.clone(),
            removed_locally,
            source,
        })
    }

    /// URL of the image attached to a post.
    pub fn image_url(&self, id: &PostId) -> String {
        self.remote.image_url(id)
    }

    async fn mirrored_posts(&self) -> Vec<Post> {
        match self.mirror.list().await {
            Ok(posts) => posts,
            Err(e) => {
                tracing::error!(error = %e, "Local mirror unavailable, returning no posts");
                Vec::new()
            }
        }
    }

    async fn merge_into_mirror(&self, id: &PostId, update: PostUpdate) -> Updated {
        let existing = match self.mirror.load(id).await {
            Ok(post) => post,
            Err(e) => {
                tracing::error!(post_id = %id, error = %e, "Local mirror unavailable");
                None
            }
        };

        let Some(mut post) = existing else {
            tracing::debug!(post_id = %id, "Post not in local mirror, update dropped");
            return Updated::Unpersisted {
                id: id.clone(),
                update,
            };
        };

        post.apply(&update);
        if let Err(e) = self.mirror.save(post.clone()).await {
            tracing::error!(post_id = %id, error = %e, "Failed to persist merged post");
        }
        Updated::Record(post)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::{Duration, TimeZone, Utc};

    use super::*;
    use crate::domain::{PostFields, create_post_at, image_path};
    use crate::error::{MirrorError, RemoteError};
    use crate::ports::mirror;

    /// Remote that either serves from memory or fails every call.
    struct FakeRemote {
        reachable: bool,
        fail_images: bool,
        posts: Mutex<Vec<Post>>,
        next_id: Mutex<u32>,
    }

    impl FakeRemote {
        fn reachable() -> Self {
            Self {
                reachable: true,
                fail_images: false,
                posts: Mutex::new(Vec::new()),
                next_id: Mutex::new(1),
            }
        }

        fn unreachable() -> Self {
            Self {
                reachable: false,
                ..Self::reachable()
            }
        }

        fn check(&self) -> Result<(), RemoteError> {
            if self.reachable {
                Ok(())
            } else {
                Err(RemoteError::Transport("connection refused".into()))
            }
        }
    }

    #[async_trait]
    impl PostRemote for FakeRemote {
        async fn list(&self) -> Result<Vec<Post>, RemoteError> {
            self.check()?;
            Ok(self.posts.lock().unwrap().clone())
        }

        async fn get(&self, id: &PostId) -> Result<Post, RemoteError> {
            self.check()?;
            self.posts
                .lock()
                .unwrap()
                .iter()
                .find(|p| p.id.same_key(id))
                .cloned()
                .ok_or(RemoteError::Status {
                    status: 404,
                    detail: None,
                })
        }

        async fn create(&self, post: &Post, _actor: &ActorId) -> Result<Post, RemoteError> {
            self.check()?;
            let mut next = self.next_id.lock().unwrap();
            let mut created = post.clone();
            created.id = PostId::server(format!("srv-{}", *next));
            *next += 1;
            self.posts.lock().unwrap().push(created.clone());
            Ok(created)
        }

        async fn attach_image(
            &self,
            id: &PostId,
            _image: ImageUpload,
            _actor: &ActorId,
        ) -> Result<Post, RemoteError> {
            self.check()?;
            if self.fail_images {
                return Err(RemoteError::Status {
                    status: 413,
                    detail: Some("image too large".into()),
                });
            }
            let mut post = self.get(id).await?;
            post.image_url = Some(self.image_url(id));
            Ok(post)
        }

        async fn update(
            &self,
            id: &PostId,
            update: &PostUpdate,
            _actor: &ActorId,
        ) -> Result<Post, RemoteError> {
            self.check()?;
            let mut post = self.get(id).await?;
            post.apply(update);
            post.updated_at = Some(Utc::now());
            Ok(post)
        }

        async fn delete(&self, _id: &PostId, _actor: &ActorId) -> Result<(), RemoteError> {
            self.check()
        }

        fn image_url(&self, id: &PostId) -> String {
            format!("http://remote.test{}", image_path(id))
        }
    }

    #[derive(Default)]
    struct FakeMirror {
        posts: Mutex<Vec<Post>>,
        broken: bool,
    }

    impl FakeMirror {
        fn broken() -> Self {
            Self {
                broken: true,
                ..Self::default()
            }
        }

        fn check(&self) -> Result<(), MirrorError> {
            if self.broken {
                Err(MirrorError::Corrupt("not a list".into()))
            } else {
                Ok(())
            }
        }

        fn count(&self) -> usize {
            self.posts.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl PostMirror for FakeMirror {
        async fn load(&self, id: &PostId) -> Result<Option<Post>, MirrorError> {
            self.check()?;
            Ok(self
                .posts
                .lock()
                .unwrap()
                .iter()
                .find(|p| p.id.same_key(id))
                .cloned())
        }

        async fn prepend(&self, post: Post) -> Result<(), MirrorError> {
            self.check()?;
            mirror::prepend(&mut self.posts.lock().unwrap(), post);
            Ok(())
        }

        async fn save(&self, post: Post) -> Result<(), MirrorError> {
            self.check()?;
            mirror::upsert(&mut self.posts.lock().unwrap(), post);
            Ok(())
        }

        async fn list(&self) -> Result<Vec<Post>, MirrorError> {
            self.check()?;
            Ok(self.posts.lock().unwrap().clone())
        }

        async fn delete(&self, id: &PostId) -> Result<bool, MirrorError> {
            self.check()?;
            Ok(mirror::remove(&mut self.posts.lock().unwrap(), id))
        }
    }

    fn client(remote: FakeRemote, mirror: Arc<FakeMirror>) -> PostClient {
        PostClient::new(Arc::new(remote), mirror)
    }

    fn post(title: &str, seconds: i64) -> Post {
        let base = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();
        create_post_at(
            &PostFields::new(title, "Long enough body text").tag("Facilities"),
            base + Duration::seconds(seconds),
        )
    }

    fn actor() -> ActorId {
        ActorId::new("student-7")
    }

    fn image() -> ImageUpload {
        ImageUpload::new("photo.png", vec![0x89, 0x50, 0x4e, 0x47]).with_content_type("image/png")
    }

    #[tokio::test]
    async fn test_create_returns_server_record() {
        let mirror = Arc::new(FakeMirror::default());
        let client = client(FakeRemote::reachable(), mirror.clone());

        let result = client.create(post("Wifi down", 0), &actor(), None).await;

        assert_eq!(result.source, Source::Remote);
        assert_eq!(result.value.post.id, PostId::server("srv-1"));
        assert_eq!(result.value.image, ImageStatus::NotRequested);
        assert_eq!(mirror.count(), 0);
    }

    #[tokio::test]
    async fn test_create_then_get_round_trips() {
        let client = client(FakeRemote::reachable(), Arc::new(FakeMirror::default()));
        let draft = post("Wifi down", 0);

        let created = client.create(draft.clone(), &actor(), None).await.into_inner().post;
        let fetched = client.get(&created.id).await;

        assert_eq!(fetched.source, Source::Remote);
        let fetched = fetched.value.unwrap();
        assert_eq!(fetched.title, draft.title);
        assert_eq!(fetched.content, draft.content);
        assert_eq!(fetched.tags, draft.tags);
        assert_eq!(fetched.anonymous, draft.anonymous);
        assert_eq!(fetched.community, draft.community);
    }

    #[tokio::test]
    async fn test_create_attaches_image() {
        let client = client(FakeRemote::reachable(), Arc::new(FakeMirror::default()));

        let result = client.create(post("Lost bag", 0), &actor(), Some(image())).await;

        assert_eq!(result.value.image, ImageStatus::Attached);
        assert_eq!(
            result.value.post.image_url.as_deref(),
            Some("http://remote.test/posts/srv-1/image")
        );
    }

    #[tokio::test]
    async fn test_image_failure_keeps_created_post() {
        let remote = FakeRemote {
            fail_images: true,
            ..FakeRemote::reachable()
        };
        let client = client(remote, Arc::new(FakeMirror::default()));

        let result = client.create(post("Lost bag", 0), &actor(), Some(image())).await;

        assert_eq!(result.source, Source::Remote);
        assert_eq!(result.value.post.id, PostId::server("srv-1"));
        assert!(result.value.post.image_url.is_none());
        assert!(matches!(result.value.image, ImageStatus::Failed { .. }));
    }

    #[tokio::test]
    async fn test_unreachable_create_is_listed_first() {
        let mirror = Arc::new(FakeMirror::default());
        let client = client(FakeRemote::unreachable(), mirror.clone());
        let older = post("Older", 0);
        let newer = post("Newer", 5);

        client.create(older.clone(), &actor(), None).await;
        let created = client.create(newer.clone(), &actor(), Some(image())).await;

        assert!(created.is_degraded());
        assert_eq!(created.value.post, newer);
        assert_eq!(created.value.image, ImageStatus::Skipped);

        let listed = client.list().await;
        assert_eq!(listed.source, Source::LocalFallback);
        let ids: Vec<_> = listed.value.iter().map(|p| p.id.clone()).collect();
        assert_eq!(ids, vec![newer.id, older.id]);
    }

    #[tokio::test]
    async fn test_unreachable_creates_in_same_millisecond_are_both_kept() {
        let mirror = Arc::new(FakeMirror::default());
        let client = client(FakeRemote::unreachable(), mirror.clone());
        let first = post("First post", 0);
        let second = post("Second post", 0);
        assert_eq!(first.id, second.id);

        client.create(first, &actor(), None).await;
        client.create(second, &actor(), None).await;

        let titles: Vec<_> = client.list().await.value.into_iter().map(|p| p.title).collect();
        assert_eq!(titles, vec!["Second post", "First post"]);
    }

    #[tokio::test]
    async fn test_unreachable_resubmit_goes_to_front() {
        let mirror = Arc::new(FakeMirror::default());
        let client = client(FakeRemote::unreachable(), mirror.clone());
        let a = post("A", 0);
        let b = post("B", 5);

        client.create(a.clone(), &actor(), None).await;
        client.create(b, &actor(), None).await;
        client.create(a, &actor(), None).await;

        let titles: Vec<_> = client.list().await.value.into_iter().map(|p| p.title).collect();
        assert_eq!(titles, vec!["A", "B", "A"]);
    }

    #[tokio::test]
    async fn test_unreachable_get_searches_mirror() {
        let mirror = Arc::new(FakeMirror::default());
        let client = client(FakeRemote::unreachable(), mirror.clone());
        let local = post("Local", 0);
        client.create(local.clone(), &actor(), None).await;

        let found = client.get(&local.id).await;
        assert!(found.is_degraded());
        assert_eq!(found.value, Some(local));

        let missing = client.get(&PostId::server("nope")).await;
        assert_eq!(missing.value, None);
    }

    #[tokio::test]
    async fn test_unreachable_update_merges_mirrored_post() {
        let mirror = Arc::new(FakeMirror::default());
        let client = client(FakeRemote::unreachable(), mirror.clone());
        let local = post("Before", 0);
        client.create(local.clone(), &actor(), None).await;

        let update = PostUpdate::from_fields(&PostFields::new("After", "Updated body text here"));
        let result = client.update(&local.id, update, &actor()).await;

        assert!(result.is_degraded());
        let merged = result.value.post().cloned().unwrap();
        assert_eq!(merged.title, "After");
        assert_eq!(merged.created_at, local.created_at);
        assert_eq!(mirror.count(), 1);
        assert_eq!(client.get(&local.id).await.value.unwrap().title, "After");
    }

    #[tokio::test]
    async fn test_unreachable_update_of_unknown_id_leaves_mirror() {
        let mirror = Arc::new(FakeMirror::default());
        let client = client(FakeRemote::unreachable(), mirror.clone());
        client.create(post("Kept", 0), &actor(), None).await;

        let id = PostId::server("elsewhere");
        let update = PostUpdate::from_fields(&PostFields::new("Title", "Some body text"));
        let result = client.update(&id, update.clone(), &actor()).await;

        assert_eq!(mirror.count(), 1);
        assert_eq!(result.value, Updated::Unpersisted { id, update });
    }

    #[tokio::test]
    async fn test_unreachable_delete_removes_locally_and_fails() {
        let mirror = Arc::new(FakeMirror::default());
        let client = client(FakeRemote::unreachable(), mirror.clone());
        let local = post("Doomed", 0);
        client.create(local.clone(), &actor(), None).await;

        let err = client.delete(&local.id, &actor()).await.unwrap_err();

        let ClientError::DeleteUnconfirmed { id, removed_locally, .. } = err;
        assert_eq!(id, local.id);
        assert!(removed_locally);
        assert_eq!(mirror.count(), 0);
    }

    #[tokio::test]
    async fn test_delete_succeeds_on_reachable_remote() {
        let client = client(FakeRemote::reachable(), Arc::new(FakeMirror::default()));
        assert!(client.delete(&PostId::server("srv-1"), &actor()).await.is_ok());
    }

    #[tokio::test]
    async fn test_broken_mirror_degrades_to_empty() {
        let client = client(FakeRemote::unreachable(), Arc::new(FakeMirror::broken()));

        let created = client.create(post("Lost", 0), &actor(), None).await;
        assert!(created.is_degraded());

        let listed = client.list().await;
        assert!(listed.is_degraded());
        assert!(listed.value.is_empty());

        let err = client.delete(&created.value.post.id, &actor()).await.unwrap_err();
        assert!(matches!(
            err,
            ClientError::DeleteUnconfirmed {
                removed_locally: false,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_remote_list_ignores_mirror() {
        let mirror = Arc::new(FakeMirror::default());
        mirror.save(post("Only local", 0)).await.unwrap();
        let client = client(FakeRemote::reachable(), mirror);

        let listed = client.list().await;
        assert_eq!(listed.source, Source::Remote);
        assert!(listed.value.is_empty());
    }

    #[test]
    fn test_image_url_delegates_to_remote() {
        let client = client(FakeRemote::unreachable(), Arc::new(FakeMirror::default()));
        assert_eq!(
            client.image_url(&PostId::server("9")), "http://remote.test/posts/9/image"
        );
    }
}
