//! Read-only asset storage.
//!
//! Assets are laid out as `<root>/<category>/<name>.txt`.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use glob::Pattern;
use thiserror::Error;
use tokio::fs;

/// Default asset file pattern
pub const DEFAULT_FILE_PATTERN: &str = "*.txt";

/// Extension matched (case-insensitively) without a custom pattern
const DEFAULT_EXTENSION: &str = "txt";

/// Errors raised by asset storage
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Asset root is unreadable: {path}: {source}")]
    RootUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid asset file pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Source of text-art assets
#[async_trait]
pub trait AssetStorage: Send + Sync {
    /// Category directories present in storage (any order)
    async fn list_categories(&self) -> Result<Vec<String>, StorageError>;

    /// Asset names (without extension) in a category, sorted
    async fn list_assets(&self, category: &str) -> Result<Vec<String>, StorageError>;

    /// Read one asset as UTF-8 text
    async fn read_asset(&self, category: &str, name: &str) -> Result<String, StorageError>;
}

/// Filesystem-backed asset storage
#[derive(Debug, Clone)]
pub struct FsAssetStorage {
    root: PathBuf,
    /// Custom file-name pattern; `None` matches `.txt` in any case
    pattern: Option<Pattern>,
}

impl FsAssetStorage {
    /// Storage rooted at `root`, matching `*.txt` files (see [`DEFAULT_FILE_PATTERN`])
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            pattern: None,
        }
    }

    /// Storage matching a custom file pattern (e.g. `*.art`)
    pub fn with_pattern(root: impl Into<PathBuf>, pattern: &str) -> Result<Self, StorageError> {
        let compiled = Pattern::new(pattern).map_err(|source| StorageError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })?;

        Ok(Self {
            root: root.into(),
            pattern: Some(compiled),
        })
    }

    /// Root directory of the storage
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn matches(&self, path: &Path) -> bool {
        match &self.pattern {
            Some(pattern) => path
                .file_name()
                .and_then(|n| n.to_str())
                .map(|n| pattern.matches(n))
                .unwrap_or(false),
            None => path
                .extension()
                .and_then(|e| e.to_str())
                .map(|e| e.eq_ignore_ascii_case(DEFAULT_EXTENSION))
                .unwrap_or(false),
        }
    }

    /// Matching files in a category as `(name, path)` pairs
    async fn scan(&self, category: &str) -> Result<Vec<(String, PathBuf)>, StorageError> {
        let mut entries = fs::read_dir(self.root.join(category)).await?;

        let mut assets = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if !self.matches(&path) {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()).map(str::to_string) else {
                continue;
            };
            assets.push((stem, path));
        }

        assets.sort();
        Ok(assets)
    }
}

#[async_trait]
impl AssetStorage for FsAssetStorage {
    async fn list_categories(&self) -> Result<Vec<String>, StorageError> {
        let mut entries = fs::read_dir(&self.root)
            .await
            .map_err(|source| StorageError::RootUnreadable {
                path: self.root.clone(),
                source,
            })?;

        let mut categories = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_dir() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                if !name.starts_with('.') {
                    categories.push(name.to_string());
                }
            }
        }

        Ok(categories)
    }

    async fn list_assets(&self, category: &str) -> Result<Vec<String>, StorageError> {
        let mut names: Vec<String> = self
            .scan(category)
            .await?
            .into_iter()
            .map(|(name, _)| name)
            .collect();
        names.dedup();
        Ok(names)
    }

    async fn read_asset(&self, category: &str, name: &str) -> Result<String, StorageError> {
        let path = self
            .scan(category)
            .await?
            .into_iter()
            .find(|(stem, _)| stem == name)
            .map(|(_, path)| path)
            .ok_or_else(|| {
                std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("No asset '{}' in category '{}'", name, category),
                )
            })?;

        Ok(fs::read_to_string(&path).await?)
    }
}
