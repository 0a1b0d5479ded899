//! File-backed mirror - the persistent local store used in degraded mode.
//!
//! The file holds a JSON object of keyed entries; the mirror owns the
//! `posts` entry, an ordered list of post records. Other entries are kept
//! untouched on write.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::Mutex;

use fleva_core::domain::{Post, PostId};
use fleva_core::error::MirrorError;
use fleva_core::ports::{PostMirror, mirror};

/// Entry holding the mirrored posts.
pub const MIRROR_KEY: &str = "posts";

/// File mirror configuration.
#[derive(Debug, Clone)]
pub struct FileMirrorConfig {
    /// Location of the store file. Parent directories are created on first write.
    pub path: PathBuf,
    /// Largest store file accepted, in bytes.
    pub max_bytes: usize,
}

impl Default for FileMirrorConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(".fleva/posts.json"),
            max_bytes: 5 * 1024 * 1024,
        }
    }
}

impl FileMirrorConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            path: std::env::var("FLEVA_MIRROR_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.path),
            max_bytes: std::env::var("FLEVA_MIRROR_MAX_BYTES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_bytes),
        }
    }
}

/// Post mirror persisted to a single JSON file.
///
/// Each operation reads and rewrites the whole file under a lock. The lock
/// only covers this instance; two processes sharing a file can still race.
pub struct FilePostMirror {
    config: FileMirrorConfig,
    lock: Mutex<()>,
}

impl FilePostMirror {
    pub fn new(config: FileMirrorConfig) -> Self {
        tracing::debug!(path = %config.path.display(), "Using file-backed post mirror");
        Self {
            config,
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.config.path
    }

    async fn read_entries(&self) -> Result<Map<String, Value>, MirrorError> {
        let bytes = match tokio::fs::read(&self.config.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => return Err(MirrorError::Io(e.to_string())),
        };

        if bytes.len() > self.config.max_bytes {
            return Err(MirrorError::QuotaExceeded {
                size: bytes.len(),
                limit: self.config.max_bytes,
            });
        }
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Map::new());
        }

        serde_json::from_slice(&bytes).map_err(|e| MirrorError::Corrupt(e.to_string()))
    }

    async fn read_posts(&self) -> Result<(Map<String, Value>, Vec<Post>), MirrorError> {
        let mut entries = self.read_entries().await?;
        let posts = match entries.remove(MIRROR_KEY) {
            None | Some(Value::Null) => Vec::new(),
            Some(value) => {
                serde_json::from_value(value).map_err(|e| MirrorError::Corrupt(e.to_string()))?
            }
        };
        Ok((entries, posts))
    }

    async fn write_posts(
        &self,
        mut entries: Map<String, Value>,
        posts: &[Post],
    ) -> Result<(), MirrorError> {
        let value =
            serde_json::to_value(posts).map_err(|e| MirrorError::Serialization(e.to_string()))?;
        entries.insert(MIRROR_KEY.to_string(), value);
        let bytes = serde_json::to_vec_pretty(&entries)
            .map_err(|e| MirrorError::Serialization(e.to_string()))?;

        if bytes.len() > self.config.max_bytes {
            return Err(MirrorError::QuotaExceeded {
                size: bytes.len(),
                limit: self.config.max_bytes,
            });
        }

        if let Some(parent) = self.config.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| MirrorError::Io(e.to_string()))?;
        }

        // Write then rename so a crash never leaves a truncated store.
        let tmp = self.config.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, &bytes)
            .await
            .map_err(|e| MirrorError::Io(e.to_string()))?;
        tokio::fs::rename(&tmp, &self.config.path)
            .await
            .map_err(|e| MirrorError::Io(e.to_string()))?;

        tracing::debug!(count = posts.len(), bytes = bytes.len(), "Post mirror written");
        Ok(())
    }
}

#[async_trait]
impl PostMirror for FilePostMirror {
    async fn load(&self, id: &PostId) -> Result<Option<Post>, MirrorError> {
        let _guard = self.lock.lock().await;
        let (_, posts) = self.read_posts().await?;
        Ok(posts.into_iter().find(|p| p.id.same_key(id)))
    }

    async fn prepend(&self, post: Post) -> Result<(), MirrorError> {
        let _guard = self.lock.lock().await;
        let (entries, mut posts) = self.read_posts().await?;
        mirror::prepend(&mut posts, post);
        self.write_posts(entries, &posts).await
    }

    async fn save(&self, post: Post) -> Result<(), MirrorError> {
        let _guard = self.lock.lock().await;
        let (entries, mut posts) = self.read_posts().await?;
        mirror::upsert(&mut posts, post);
        self.write_posts(entries, &posts).await
    }

    async fn list(&self) -> Result<Vec<Post>, MirrorError> {
        let _guard = self.lock.lock().await;
        let (_, posts) = self.read_posts().await?;
        Ok(posts)
    }

    async fn delete(&self, id: &PostId) -> Result<bool, MirrorError> {
        let _guard = self.lock.lock().await;
        let (entries, mut posts) = self.read_posts().await?;
        if !mirror::remove(&mut posts, id) {
            return Ok(false);
        }
        self.write_posts(entries, &posts).await?;
        Ok(true)
    }
}
