//! Metadata cache with get / set-with-TTL semantics.
//!
//! A miss (absent, expired or unreadable entry) is never an error for
//! the caller; it just triggers regeneration.

use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::{debug, warn};

/// Key-value store with per-entry expiry
#[async_trait]
pub trait MetadataCache: Send + Sync {
    /// Fetch a live value; `None` on miss or expiry
    async fn get(&self, key: &str, namespace: &str) -> Result<Option<serde_json::Value>>;

    /// Store a value that expires after `ttl`
    async fn set(
        &self,
        key: &str,
        value: serde_json::Value,
        namespace: &str,
        ttl: Duration,
    ) -> Result<()>;

    /// Drop a single entry
    async fn invalidate(&self, key: &str, namespace: &str) -> Result<()>;

    /// Drop every entry in a namespace, returning how many were removed
    async fn clear(&self, namespace: &str) -> Result<usize>;
}

/// On-disk envelope around a cached value
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CacheEnvelope {
    stored_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
    value: serde_json::Value,
}

impl CacheEnvelope {
    fn new(value: serde_json::Value, ttl: Duration) -> Self {
        let stored_at = Utc::now();
        let expires_at = chrono::Duration::from_std(ttl)
            .ok()
            .and_then(|ttl| stored_at.checked_add_signed(ttl))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        Self {
            stored_at,
            expires_at,
            value,
        }
    }

    fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }
}

/// JSON-file cache: `<dir>/<namespace>/<key>.json`
#[derive(Debug, Clone)]
pub struct FileMetadataCache {
    dir: PathBuf,
}

impl FileMetadataCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Cache under the configured cache directory
    pub fn open_default() -> Result<Self> {
        Ok(Self::new(crate::config::paths::metadata_cache_dir()?))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn namespace_dir(&self, namespace: &str) -> PathBuf {
        self.dir.join(sanitize(namespace))
    }

    fn entry_path(&self, key: &str, namespace: &str) -> PathBuf {
        self.namespace_dir(namespace)
            .join(format!("{}.json", sanitize(key)))
    }
}

/// Keep keys filesystem-safe
fn sanitize(raw: &str) -> String {
    raw.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[async_trait]
impl MetadataCache for FileMetadataCache {
    async fn get(&self, key: &str, namespace: &str) -> Result<Option<serde_json::Value>> {
        let path = self.entry_path(key, namespace);

        if !path.exists() {
            return Ok(None);
        }

        let raw = fs::read_to_string(&path)
            .await
            .with_context(|| format!("Failed to read cache entry: {}", path.display()))?;

        let envelope: CacheEnvelope = match serde_json::from_str(&raw) {
            Ok(envelope) => envelope,
            Err(e) => {
                warn!("Discarding corrupt cache entry {}: {}", path.display(), e);
                return Ok(None);
            }
        };

        if envelope.is_expired() {
            debug!(key, namespace, expired_at = %envelope.expires_at, "Cache entry expired");
            return Ok(None);
        }

        Ok(Some(envelope.value))
    }

    async fn set(
        &self,
        key: &str,
        value: serde_json::Value,
        namespace: &str,
        ttl: Duration,
    ) -> Result<()> {
        let dir = self.namespace_dir(namespace);
        fs::create_dir_all(&dir)
            .await
            .with_context(|| format!("Failed to create cache directory: {}", dir.display()))?;

        let path = self.entry_path(key, namespace);
        let body = serde_json::to_vec_pretty(&CacheEnvelope::new(value, ttl))?;

        // Write to a sibling temp file, then rename over the entry
        tokio::task::spawn_blocking(move || -> Result<()> {
            let mut tmp = tempfile::NamedTempFile::new_in(&dir)
                .with_context(|| format!("Failed to create temp file in {}", dir.display()))?;
            tmp.write_all(&body)?;
            tmp.persist(&path)
                .with_context(|| format!("Failed to write cache entry: {}", path.display()))?;
            Ok(())
        })
        .await
        .context("Cache writer task panicked")??;

        Ok(())
    }

    async fn invalidate(&self, key: &str, namespace: &str) -> Result<()> {
        let path = self.entry_path(key, namespace);
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e)
                .with_context(|| format!("Failed to remove cache entry: {}", path.display())),
        }
    }

    async fn clear(&self, namespace: &str) -> Result<usize> {
        let dir = self.namespace_dir(namespace);
        if !dir.exists() {
            return Ok(0);
        }

        let mut removed = 0;
        let mut entries = fs::read_dir(&dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) == Some("json") {
                fs::remove_file(&path).await?;
                removed += 1;
            }
        }

        Ok(removed)
    }
}

/// Process-local cache, mainly for tests and embedding
#[derive(Debug, Default)]
pub struct MemoryMetadataCache {
    entries: Mutex<HashMap<(String, String), CacheEnvelope>>,
}

impl MemoryMetadataCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries, expired ones included
    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<(String, String), CacheEnvelope>>> {
        self.entries
            .lock()
            .map_err(|_| anyhow::anyhow!("Metadata cache lock poisoned"))
    }
}

#[async_trait]
impl MetadataCache for MemoryMetadataCache {
    async fn get(&self, key: &str, namespace: &str) -> Result<Option<serde_json::Value>> {
        let entries = self.lock()?;
        Ok(entries
            .get(&(namespace.to_string(), key.to_string()))
            .filter(|e| !e.is_expired())
            .map(|e| e.value.clone()))
    }

    async fn set(
        &self,
        key: &str,
        value: serde_json::Value,
        namespace: &str,
        ttl: Duration,
    ) -> Result<()> {
        self.lock()?.insert(
            (namespace.to_string(), key.to_string()),
            CacheEnvelope::new(value, ttl),
        );
        Ok(())
    }

    async fn invalidate(&self, key: &str, namespace: &str) -> Result<()> {
        self.lock()?
            .remove(&(namespace.to_string(), key.to_string()));
        Ok(())
    }

    async fn clear(&self, namespace: &str) -> Result<usize> {
        let mut entries = self.lock()?;
        let before = entries.len();
        entries.retain(|(ns, _), _| ns != namespace);
        Ok(before - entries.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    const DAY: Duration = Duration::from_secs(24 * 60 * 60);

    #[tokio::test]
    async fn test_file_cache_roundtrip() {
        let temp = TempDir::new().unwrap();
        let cache = FileMetadataCache::new(temp.path());

        assert!(cache.get("meta", "art").await.unwrap().is_none());

        cache.set("meta", json!({"a": 1}), "art", DAY).await.unwrap();
        let value = cache.get("meta", "art").await.unwrap();
        assert_eq!(value, Some(json!({"a": 1})));
    }

    #[tokio::test]
    async fn test_file_cache_expiry_is_a_miss() {
        let temp = TempDir::new().unwrap();
        let cache = FileMetadataCache::new(temp.path());

        cache
            .set("meta", json!(1), "art", Duration::ZERO)
            .await
            .unwrap();
        assert!(cache.get("meta", "art").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_file_cache_corrupt_entry_is_a_miss() {
        let temp = TempDir::new().unwrap();
        let cache = FileMetadataCache::new(temp.path());

        std::fs::create_dir_all(temp.path().join("art")).unwrap();
        std::fs::write(temp.path().join("art").join("meta.json"), "{not json").unwrap();

        assert!(cache.get("meta", "art").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_file_cache_invalidate_and_clear() {
        let temp = TempDir::new().unwrap();
        let cache = FileMetadataCache::new(temp.path());

        cache.set("one", json!(1), "art", DAY).await.unwrap();
        cache.set("two", json!(2), "art", DAY).await.unwrap();
        cache.set("other", json!(3), "misc", DAY).await.unwrap();

        cache.invalidate("one", "art").await.unwrap();
        cache.invalidate("one", "art").await.unwrap();
        assert!(cache.get("one", "art").await.unwrap().is_none());

        assert_eq!(cache.clear("art").await.unwrap(), 1);
        assert!(cache.get("other", "misc").await.unwrap().is_some());
    }

    #[test]
    fn test_sanitize_keys() {
        assert_eq!(sanitize("ascii-art/meta data"), "ascii-art_meta_data");
    }

    #[tokio::test]
    async fn test_memory_cache_namespaces() {
        let cache = MemoryMetadataCache::new();

        cache.set("k", json!("a"), "one", DAY).await.unwrap();
        cache.set("k", json!("b"), "two", DAY).await.unwrap();

        assert_eq!(cache.get("k", "one").await.unwrap(), Some(json!("a")));
        assert_eq!(cache.clear("one").await.unwrap(), 1);
        assert_eq!(cache.len(), 1);
    }
}
