//! Data Transfer Objects - request/response bodies of the `/posts` resource.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Post identifier as sent by the server: either a string or a number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WireId {
    Text(String),
    Number(i64),
}

impl fmt::Display for WireId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WireId::Text(id) => f.write_str(id),
            WireId::Number(id) => write!(f, "{}", id),
        }
    }
}

/// Post representation returned by every read and write endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostDto {
    pub id: WireId,
    pub title: String,
    #[serde(alias = "body")]
    pub content: String,
    #[serde(default)]
    pub community: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub anonymous: bool,
    #[serde(default, alias = "authorId")]
    pub author: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub upvotes: u64,
    #[serde(default)]
    pub downvotes: u64,
}

/// Body of `POST /posts`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostRequest {
    pub title: String,
    pub content: String,
    pub community: String,
    pub tags: Vec<String>,
    pub anonymous: bool,
    pub created_at: DateTime<Utc>,
}

/// Body of `PUT /posts/{id}` - the full set of mutable fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePostRequest {
    pub title: String,
    pub content: String,
    pub community: String,
    pub tags: Vec<String>,
    pub anonymous: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_dto_accepts_numeric_id_and_body_alias() {
        let dto: PostDto = serde_json::from_str(
            r#"{"id": 17, "title": "Mess food", "body": "Needs more options", "upvotes": 3}"#,
        )
        .unwrap();

        assert_eq!(dto.id, WireId::Number(17));
        assert_eq!(dto.id.to_string(), "17");
        assert_eq!(dto.content, "Needs more options");
        assert!(dto.tags.is_empty());
        assert!(!dto.anonymous);
        assert_eq!(dto.upvotes, 3);
        assert_eq!(dto.created_at, None);
    }

    #[test]
    fn test_post_dto_reads_camel_case() {
        let dto: PostDto = serde_json::from_str(
            r#"{
                "id": "p-1",
                "title": "Wifi down",
                "content": "It's been two days now",
                "community": "General",
                "tags": ["Facilities"],
                "anonymous": true,
                "imageUrl": "/posts/p-1/image",
                "createdAt": "2024-05-01T09:00:00Z"
            }"#,
        )
        .unwrap();

        assert_eq!(dto.id, WireId::Text("p-1".into()));
        assert_eq!(dto.image_url.as_deref(), Some("/posts/p-1/image"));
        assert!(dto.created_at.is_some());
    }

    #[test]
    fn test_post_dto_rejects_missing_title() {
        let parsed = serde_json::from_str::<PostDto>(r#"{"id": "p-1", "content": "x"}"#);
        assert!(parsed.is_err());
    }
}
