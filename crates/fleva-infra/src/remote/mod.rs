//! Remote collection implementations.

#[cfg(feature = "http")]
mod http;

#[cfg(feature = "http")]
pub use http::{ACTOR_HEADER, DEFAULT_API_BASE, HttpPostRemote, RemoteConfig};
