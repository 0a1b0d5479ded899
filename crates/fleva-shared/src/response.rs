//! Error bodies returned by the posts API (RFC 7807 problem details).

use serde::{Deserialize, Serialize};

/// RFC 7807 Problem Details for HTTP APIs.
///
/// See: https://datatracker.ietf.org/doc/html/rfc7807
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// A URI reference that identifies the problem type.
    #[serde(rename = "type", default)]
    pub error_type: Option<String>,

    /// A short, human-readable summary of the problem type.
    #[serde(default)]
    pub title: Option<String>,

    /// The HTTP status code.
    #[serde(default)]
    pub status: Option<u16>,

    /// A human-readable explanation specific to this occurrence.
    #[serde(default)]
    pub detail: Option<String>,

    /// Request ID for debugging purposes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

impl ErrorResponse {
    /// Most specific message available, with the request id when present.
    pub fn summary(&self) -> Option<String> {
        let message = self.detail.as_ref().or(self.title.as_ref())?;
        Some(match &self.request_id {
            Some(request_id) => format!("{} (request {})", message, request_id),
            None => message.clone(),
        })
    }
}
