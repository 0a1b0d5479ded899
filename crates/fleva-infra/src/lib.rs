//! # FLEVA Infrastructure
//!
//! Concrete implementations of the ports defined in `fleva-core`:
//! the HTTP posts API and the local mirror stores.
//!
//! ## Feature Flags
//!
//! - `full` (default) - All features enabled
//! - `minimal` - In-memory mirror only, without reqwest or the file store
//! - `http` - Remote posts API via reqwest
//! - `file-store` - JSON file mirror

pub mod mirror;
pub mod remote;

// Re-exports - In-Memory
pub use mirror::InMemoryPostMirror;

#[cfg(feature = "file-store")]
pub use mirror::{FileMirrorConfig, FilePostMirror};

#[cfg(feature = "http")]
pub use remote::{HttpPostRemote, RemoteConfig};
