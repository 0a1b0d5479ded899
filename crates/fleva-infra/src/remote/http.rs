//! reqwest-backed implementation of the remote posts collection.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;

use fleva_core::domain::{
    ActorId, DEFAULT_COMMUNITY, ImageUpload, Post, PostId, PostUpdate, image_path,
};
use fleva_core::error::RemoteError;
use fleva_core::ports::PostRemote;
use fleva_shared::{CreatePostRequest, ErrorResponse, PostDto, UpdatePostRequest};

/// Header carrying the actor identifier on write requests.
pub const ACTOR_HEADER: &str = "x-user-id";

/// Base URL used when none is configured.
pub const DEFAULT_API_BASE: &str = "http://localhost:8080";

/// Remote API configuration.
#[derive(Debug, Clone)]
pub struct RemoteConfig {
    /// API base URL, e.g. `http://localhost:8080` or `https://campus.example/api`.
    pub base_url: String,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE.to_string(),
        }
    }
}

impl RemoteConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            base_url: std::env::var("FLEVA_API_BASE")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
        }
    }
}

/// HTTP client for `{base}/posts`.
///
/// No timeout is set beyond the transport default and failed calls are
/// never retried.
#[derive(Clone)]
pub struct HttpPostRemote {
    base: Url,
    client: Client,
}

impl HttpPostRemote {
    pub fn new(config: &RemoteConfig) -> Result<Self, RemoteError> {
        let trimmed = config.base_url.trim().trim_end_matches('/');
        let base = Url::parse(trimmed)
            .map_err(|e| RemoteError::InvalidUrl(format!("{}: {}", config.base_url, e)))?;
        if base.cannot_be_a_base() {
            return Err(RemoteError::InvalidUrl(config.base_url.clone()));
        }

        let client = Client::builder()
            .user_agent(concat!("fleva/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| RemoteError::Transport(e.to_string()))?;

        tracing::info!(base_url = %base, "Post remote configured");

        Ok(Self { base, client })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Append percent-encoded path segments to the base URL.
    fn url(&self, segments: &[&str]) -> Result<Url, RemoteError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| RemoteError::InvalidUrl(self.base.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, RemoteError> {
        let response = request
            .send()
            .await
            .map_err(|e| RemoteError::Transport(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(RemoteError::Status {
            status: status.as_u16(),
            detail: error_detail(&body),
        })
    }

    async fn fetch<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, RemoteError> {
        let response = self.send(request).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| RemoteError::Transport(e.to_string()))?;
        serde_json::from_slice(&bytes).map_err(|e| RemoteError::Decode(e.to_string()))
    }
}

/// Problem-details summary when the body is one, otherwise the raw text.
fn error_detail(body: &str) -> Option<String> {
    let body = body.trim();
    if body.is_empty() {
        return None;
    }
    serde_json::from_str::<ErrorResponse>(body)
        .ok()
        .and_then(|problem| problem.summary())
        .or_else(|| Some(body.to_string()))
}

/// Map a wire post onto the domain. `created_fallback` stands in for a
/// missing `createdAt`.
fn into_post(dto: PostDto, created_fallback: DateTime<Utc>) -> Post {
    Post {
        id: PostId::server(dto.id.to_string()),
        title: dto.title,
        content: dto.content,
        community: dto
            .community
            .unwrap_or_else(|| DEFAULT_COMMUNITY.to_string()),
        tags: dto.tags,
        anonymous: dto.anonymous,
        author: dto.author,
        image_url: dto.image_url,
        created_at: dto.created_at.unwrap_or(created_fallback),
        updated_at: dto.updated_at,
        upvotes: dto.upvotes,
        downvotes: dto.downvotes,
    }
}

#[async_trait]
impl PostRemote for HttpPostRemote {
    async fn list(&self) -> Result<Vec<Post>, RemoteError> {
        let url = self.url(&["posts"])?;
        tracing::debug!(%url, "Fetching posts");

        let posts: Vec<PostDto> = self.fetch(self.client.get(url)).await?;
        let received_at = Utc::now();
        Ok(posts
            .into_iter()
            .map(|dto| into_post(dto, received_at))
            .collect())
    }

    async fn get(&self, id: &PostId) -> Result<Post, RemoteError> {
        let url = self.url(&["posts", id.as_str()])?;
        tracing::debug!(%url, "Fetching post");

        let post: PostDto = self.fetch(self.client.get(url)).await?;
        Ok(into_post(post, Utc::now()))
    }

    async fn create(&self, post: &Post, actor: &ActorId) -> Result<Post, RemoteError> {
        let url = self.url(&["posts"])?;
        let body = CreatePostRequest {
            title: post.title.clone(),
            content: post.content.clone(),
            community: post.community.clone(),
            tags: post.tags.clone(),
            anonymous: post.anonymous,
            created_at: post.created_at,
        };
        tracing::debug!(%url, client_id = %post.id, "Creating post");

        let created: PostDto = self
            .fetch(
                self.client
                    .post(url)
                    .header(ACTOR_HEADER, actor.as_str())
                    .json(&body),
            )
            .await?;
        Ok(into_post(created, post.created_at))
    }

    async fn attach_image(
        &self,
        id: &PostId,
        image: ImageUpload,
        actor: &ActorId,
    ) -> Result<Post, RemoteError> {
        let url = self.url(&["posts", id.as_str(), "image"])?;
        let size = image.bytes.len();

        let mut part = Part::bytes(image.bytes).file_name(image.file_name);
        if let Some(content_type) = image.content_type.as_deref() {
            part = part
                .mime_str(content_type)
                .map_err(|e| RemoteError::Transport(format!("invalid image type: {}", e)))?;
        }
        let form = Form::new().part("file", part);
        tracing::debug!(%url, bytes = size, "Uploading post image");

        let post: PostDto = self
            .fetch(
                self.client
                    .post(url)
                    .header(ACTOR_HEADER, actor.as_str())
                    .multipart(form),
            )
            .await?;
        Ok(into_post(post, Utc::now()))
    }

    async fn update(
        &self,
        id: &PostId,
        update: &PostUpdate,
        actor: &ActorId,
    ) -> Result<Post, RemoteError> {
        let url = self.url(&["posts", id.as_str()])?;
        let body = UpdatePostRequest {
            title: update.title.clone(),
            content: update.content.clone(),
            community: update.community.clone(),
            tags: update.tags.clone(),
            anonymous: update.anonymous,
        };
        tracing::debug!(%url, "Updating post");

        let post: PostDto = self
            .fetch(
                self.client
                    .put(url)
                    .header(ACTOR_HEADER, actor.as_str())
                    .json(&body),
            )
            .await?;
        Ok(into_post(post, Utc::now()))
    }

    async fn delete(&self, id: &PostId, actor: &ActorId) -> Result<(), RemoteError> {
        let url = self.url(&["posts", id.as_str()])?;
        tracing::debug!(%url, "Deleting post");

        self.send(self.client.delete(url).header(ACTOR_HEADER, actor.as_str()))
            .await?;
        Ok(())
    }

    fn image_url(&self, id: &PostId) -> String {
        match self.url(&["posts", id.as_str(), "image"]) {
            Ok(url) => url.to_string(),
            Err(_) => format!(
                "{}{}",
                self.base.as_str().trim_end_matches('/'),
                image_path(id)
            ),
        }
    }
}
