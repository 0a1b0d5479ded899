use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Longest accepted title, in characters.
pub const TITLE_MAX_CHARS: usize = 100;
/// Shortest accepted body, in characters.
pub const BODY_MIN_CHARS: usize = 10;

pub const DEFAULT_TAG: &str = "Other";
pub const DEFAULT_COMMUNITY: &str = "General";

/// Post identifier, tagged with where it was minted.
///
/// Mirror lookups compare the raw identifier only; the provenance tag is kept
/// so that locally minted records can be told apart from server records.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "origin", content = "value", rename_all = "lowercase")]
pub enum PostId {
    /// Generated on this client, from the creation instant.
    Client(String),
    /// Assigned by the remote collection resource.
    Server(String),
}

impl PostId {
    /// Client id derived from the creation instant (`post_<unix millis>`).
    pub fn client_at(now: DateTime<Utc>) -> Self {
        PostId::Client(format!("post_{}", now.timestamp_millis()))
    }

    pub fn server(id: impl Into<String>) -> Self {
        PostId::Server(id.into())
    }

    pub fn as_str(&self) -> &str {
        match self {
            PostId::Client(id) | PostId::Server(id) => id,
        }
    }

    pub fn is_client_generated(&self) -> bool {
        matches!(self, PostId::Client(_))
    }

    /// Whether both ids name the same record, regardless of provenance.
    pub fn same_key(&self, other: &PostId) -> bool {
        self.as_str() == other.as_str()
    }
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Post entity - the canonical unit shared by the client, the mirror and the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: PostId,
    pub title: String,
    pub content: String,
    pub community: String,
    pub tags: Vec<String>,
    pub anonymous: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub upvotes: u64,
    #[serde(default)]
    pub downvotes: u64,
}

impl Post {
    /// Tag used for display colouring.
    pub fn primary_tag(&self) -> Option<&str> {
        self.tags.first().map(String::as_str)
    }

    /// Upvotes minus downvotes, saturating at the `i64` bounds.
    pub fn score(&self) -> i64 {
        let up = i64::try_from(self.upvotes).unwrap_or(i64::MAX);
        let down = i64::try_from(self.downvotes).unwrap_or(i64::MAX);
        up.saturating_sub(down)
    }

    /// Author as shown to readers; anonymous posts never expose one.
    pub fn visible_author(&self) -> Option<&str> {
        if self.anonymous {
            None
        } else {
            self.author.as_deref()
        }
    }

    pub fn has_image(&self) -> bool {
        self.image_url.is_some()
    }

    /// Shallow-merge the mutable fields of `update` into this record.
    pub fn apply(&mut self, update: &PostUpdate) {
        self.title.clone_from(&update.title);
        self.content.clone_from(&update.content);
        self.community.clone_from(&update.community);
        self.tags.clone_from(&update.tags);
        self.anonymous = update.anonymous;
    }
}

/// Raw form input for a post.
///
/// Every field is optional so that a half-filled form can still be validated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostFields {
    pub title: Option<String>,
    pub body: Option<String>,
    pub tag: Option<String>,
    pub anonymous: Option<bool>,
    pub community: Option<String>,
}

impl PostFields {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            body: Some(body.into()),
            ..Self::default()
        }
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    pub fn anonymous(mut self, anonymous: bool) -> Self {
        self.anonymous = Some(anonymous);
        self
    }

    pub fn community(mut self, community: impl Into<String>) -> Self {
        self.community = Some(community.into());
        self
    }

    /// Validate, then normalize into a post stamped with the current instant.
    pub fn validated(&self) -> Result<Post, ValidationErrors> {
        let errors = validate_post(self);
        if errors.is_empty() {
            Ok(create_post(self))
        } else {
            Err(errors)
        }
    }
}

/// Full replacement of the mutable fields of a post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostUpdate {
    pub title: String,
    pub content: String,
    pub community: String,
    pub tags: Vec<String>,
    pub anonymous: bool,
}

impl PostUpdate {
    /// Normalize form input the same way `create_post` does.
    pub fn from_fields(fields: &PostFields) -> Self {
        Self {
            title: trimmed(fields.title.as_deref()),
            content: trimmed(fields.body.as_deref()),
            community: community_of(fields),
            tags: tags_of(fields),
            anonymous: fields.anonymous.unwrap_or(true),
        }
    }
}

impl From<&Post> for PostUpdate {
    fn from(post: &Post) -> Self {
        Self {
            title: post.title.clone(),
            content: post.content.clone(),
            community: post.community.clone(),
            tags: post.tags.clone(),
            anonymous: post.anonymous,
        }
    }
}

/// Normalize form input into a post stamped with the current instant.
///
/// Does not validate; run [`validate_post`] first.
pub fn create_post(fields: &PostFields) -> Post {
    create_post_at(fields, Utc::now())
}

/// Same as [`create_post`] with an explicit creation instant.
pub fn create_post_at(fields: &PostFields, now: DateTime<Utc>) -> Post {
    Post {
        id: PostId::client_at(now),
        title: trimmed(fields.title.as_deref()),
        content: trimmed(fields.body.as_deref()),
        community: community_of(fields),
        tags: tags_of(fields),
        anonymous: fields.anonymous.unwrap_or(true),
        author: None,
        image_url: None,
        created_at: now,
        updated_at: None,
        upvotes: 0,
        downvotes: 0,
    }
}

fn trimmed(value: Option<&str>) -> String {
    value.map(str::trim).unwrap_or_default().to_string()
}

// An explicitly empty tag means "no tag", not the default.
fn tags_of(fields: &PostFields) -> Vec<String> {
    match fields.tag.as_deref() {
        None => vec![DEFAULT_TAG.to_string()],
        Some("") => Vec::new(),
        Some(tag) => vec![tag.to_string()],
    }
}

fn community_of(fields: &PostFields) -> String {
    fields
        .community
        .clone()
        .unwrap_or_else(|| DEFAULT_COMMUNITY.to_string())
}

/// Form field that can carry a validation message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostField {
    Title,
    Body,
}

impl PostField {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostField::Title => "title",
            PostField::Body => "body",
        }
    }
}

/// Field name to message. Empty means the input is valid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<PostField, String>);

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, field: PostField) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (PostField, &str)> {
        self.0.iter().map(|(field, msg)| (*field, msg.as_str()))
    }

    fn insert(&mut self, field: PostField, message: &str) {
        self.0.entry(field).or_insert_with(|| message.to_string());
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in self.iter() {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", field.as_str(), message)?;
            first = false;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// Check title and body. Each field gets at most one message, from the
/// first rule it fails.
pub fn validate_post(fields: &PostFields) -> ValidationErrors {
    let mut errors = ValidationErrors::default();

    match fields.title.as_deref() {
        None => errors.insert(PostField::Title, "Title is required"),
        Some(title) if title.trim().is_empty() => {
            errors.insert(PostField::Title, "Title is required")
        }
        Some(title) if title.chars().count() > TITLE_MAX_CHARS => {
            errors.insert(PostField::Title, "Title must be under 100 characters")
        }
        Some(_) => {}
    }

    match fields.body.as_deref() {
        None => errors.insert(PostField::Body, "Post content is required"),
        Some(body) if body.trim().is_empty() => {
            errors.insert(PostField::Body, "Post content is required")
        }
        Some(body) if body.chars().count() < BODY_MIN_CHARS => {
            errors.insert(PostField::Body, "Content must be at least 10 characters")
        }
        Some(_) => {}
    }

    errors
}

/// Orderings offered by list views.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PostOrder {
    /// Newest first.
    #[default]
    Recent,
    /// Highest score first, newest first among ties.
    Score,
}

impl PostOrder {
    pub fn sort(self, posts: &mut [Post]) {
        match self {
            PostOrder::Recent => posts.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
            PostOrder::Score => posts.sort_by(|a, b| {
                b.score()
                    .cmp(&a.score())
                    .then_with(|| b.created_at.cmp(&a.created_at))
            }),
        }
    }
}
