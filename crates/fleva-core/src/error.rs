//! Error types for the post client and its ports.

use thiserror::Error;

use crate::domain::PostId;

/// Remote collection failures. Every variant means "remote unavailable" to
/// the client and triggers the same fallback.
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("Transport failure: {0}")]
    Transport(String),

    #[error("Remote returned status {status}: {}", .detail.as_deref().unwrap_or("no detail"))]
    Status { status: u16, detail: Option<String> },

    #[error("Malformed response body: {0}")]
    Decode(String),

    #[error("Invalid request URL: {0}")]
    InvalidUrl(String),
}

/// Local mirror failures.
#[derive(Debug, Error)]
pub enum MirrorError {
    #[error("Mirror storage I/O failed: {0}")]
    Io(String),

    #[error("Mirror data is corrupt: {0}")]
    Corrupt(String),

    #[error("Mirror quota exceeded: {size} bytes over limit of {limit}")]
    QuotaExceeded { size: usize, limit: usize },

    #[error("Mirror serialization failed: {0}")]
    Serialization(String),
}

/// Errors surfaced by the post client to its callers.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The remote never confirmed the deletion. The local mirror has already
    /// dropped the record when `removed_locally` is set.
    #[error("Deletion of post {id} was not confirmed by the remote: {source}")]
    DeleteUnconfirmed {
        id: PostId,
        removed_locally: bool,
        source: RemoteError,
    },
}
