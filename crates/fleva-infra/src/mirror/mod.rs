//! Local mirror implementations - file-backed store and in-memory fallback.

mod memory;

#[cfg(feature = "file-store")]
mod file;

pub use memory::InMemoryPostMirror;

#[cfg(feature = "file-store")]
pub use file::{FileMirrorConfig, FilePostMirror, MIRROR_KEY};
