//! In-memory catalog of text art and its derived metadata.
//!
//! The catalog is built once by [`ArtCatalog::initialize`] and replaced
//! wholesale by [`ArtCatalog::refresh`]. Each build produces an immutable
//! snapshot; readers clone the current snapshot and never observe a
//! half-built state.
//!
//! # Category order
//!
//! Lookups that span categories (e.g. [`ArtCatalog::get_art`] without a
//! category) resolve in *declaration order*: the configured category list
//! first, then any other category directory found in storage, sorted
//! alphabetically.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use super::cache::MetadataCache;
use super::popularity::{PopularityProvider, RandomPopularity};
use super::search::{self, SearchHit, SearchOptions};
use super::storage::{AssetStorage, StorageError};
use crate::domain::{ArtEntry, ArtKey, ArtMetadata};

/// Categories searched first, in this order
pub const DEFAULT_CATEGORIES: &[&str] = &["superheroes", "logos", "animals", "nature", "tech"];

/// Cache namespace for art metadata
pub const METADATA_NAMESPACE: &str = "ascii-art";

/// Cache key for the metadata snapshot
pub const METADATA_KEY: &str = "metadata";

/// Metadata snapshot lifetime (24 hours)
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(24 * 60 * 60);

const SNAPSHOT_VERSION: u32 = 1;

/// Catalog errors
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Art catalog is not initialized")]
    NotInitialized,

    #[error("Failed to load art catalog: {0}")]
    LoadFailed(#[from] StorageError),
}

/// An entry together with its metadata
#[derive(Debug, Clone)]
pub struct CatalogItem {
    pub entry: Arc<ArtEntry>,
    pub metadata: ArtMetadata,
}

/// Size record used by [`CatalogStatistics`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SizeRecord {
    pub key: ArtKey,
    pub byte_size: usize,
}

/// Aggregate numbers about the loaded catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogStatistics {
    pub total_art: usize,
    pub category_count: usize,

    /// Entry count per non-empty category, in declaration order
    pub per_category: Vec<(String, usize)>,

    /// Mean byte size, rounded
    pub average_size: usize,

    pub largest: Option<SizeRecord>,
    pub smallest: Option<SizeRecord>,
}

/// Persisted form of the generated metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
struct MetadataSnapshot {
    version: u32,
    generated_at: DateTime<Utc>,

    /// Digest of the asset set the metadata was generated for
    fingerprint: String,

    entries: Vec<ArtMetadata>,
}

/// One immutable build of the catalog
#[derive(Debug, Default)]
struct CatalogSnapshot {
    /// Every known category in declaration order (empty ones included)
    order: Vec<String>,

    /// Entries in declaration order, then by name
    entries: Vec<Arc<ArtEntry>>,

    metadata: HashMap<ArtKey, ArtMetadata>,
}

impl CatalogSnapshot {
    fn pool<'a>(&'a self, category: Option<&'a str>) -> impl Iterator<Item = &'a Arc<ArtEntry>> {
        self.entries
            .iter()
            .filter(move |e| category.map_or(true, |c| e.category == c))
    }

    fn item(&self, entry: &Arc<ArtEntry>) -> Option<CatalogItem> {
        self.metadata.get(&entry.key()).map(|metadata| CatalogItem {
            entry: Arc::clone(entry),
            metadata: metadata.clone(),
        })
    }
}

/// Catalog of text art loaded from an [`AssetStorage`]
pub struct ArtCatalog {
    storage: Arc<dyn AssetStorage>,
    cache: Arc<dyn MetadataCache>,
    popularity: Arc<dyn PopularityProvider>,

    /// Declared category priority
    categories: Vec<String>,

    cache_ttl: Duration,

    state: RwLock<Option<Arc<CatalogSnapshot>>>,

    /// Serializes initialize/refresh
    build_lock: tokio::sync::Mutex<()>,
}

impl ArtCatalog {
    /// Create an uninitialized catalog with default settings
    pub fn new(storage: Arc<dyn AssetStorage>, cache: Arc<dyn MetadataCache>) -> Self {
        Self {
            storage,
            cache,
            popularity: Arc::new(RandomPopularity::new()),
            categories: DEFAULT_CATEGORIES.iter().map(|c| c.to_string()).collect(),
            cache_ttl: DEFAULT_CACHE_TTL,
            state: RwLock::new(None),
            build_lock: tokio::sync::Mutex::new(()),
        }
    }

    /// Use a custom popularity provider
    pub fn with_popularity(mut self, provider: Arc<dyn PopularityProvider>) -> Self {
        self.popularity = provider;
        self
    }

    /// Override the declared category order
    pub fn with_categories(mut self, categories: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.categories = categories.into_iter().map(Into::into).collect();
        self
    }

    /// Override the metadata cache lifetime
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    /// Whether a snapshot is loaded
    pub fn is_initialized(&self) -> bool {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Load entries and metadata. No-op if already initialized.
    #[instrument(skip(self))]
    pub async fn initialize(&self) -> Result<(), CatalogError> {
        let _guard = self.build_lock.lock().await;

        if self.is_initialized() {
            debug!("Catalog already initialized");
            return Ok(());
        }

        let snapshot = self.build().await?;
        self.install(Some(Arc::new(snapshot)));
        Ok(())
    }

    /// Invalidate the metadata cache and rebuild from storage.
    ///
    /// Popularity scores are drawn afresh. On failure the catalog is left
    /// uninitialized.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> Result<(), CatalogError> {
        let _guard = self.build_lock.lock().await;

        if let Err(e) = self.cache.invalidate(METADATA_KEY, METADATA_NAMESPACE).await {
            warn!("Failed to invalidate metadata cache: {:#}", e);
        }

        match self.build().await {
            Ok(snapshot) => {
                self.install(Some(Arc::new(snapshot)));
                Ok(())
            }
            Err(e) => {
                self.install(None);
                Err(e)
            }
        }
    }

    /// Exact-name lookup. Without a category, the first match in
    /// declaration order wins.
    pub fn get_art(
        &self,
        name: &str,
        category: Option<&str>,
    ) -> Result<Option<Arc<ArtEntry>>, CatalogError> {
        let snapshot = self.snapshot()?;
        let found = snapshot.pool(category).find(|e| e.name == name).cloned();
        Ok(found)
    }

    /// Every entry named `name`, across categories, in declaration order
    pub fn get_art_matches(&self, name: &str) -> Result<Vec<Arc<ArtEntry>>, CatalogError> {
        let snapshot = self.snapshot()?;
        Ok(snapshot
            .entries
            .iter()
            .filter(|e| e.name == name)
            .cloned()
            .collect())
    }

    /// Metadata for one entry
    pub fn get_metadata(&self, key: &ArtKey) -> Result<Option<ArtMetadata>, CatalogError> {
        Ok(self.snapshot()?.metadata.get(key).cloned())
    }

    /// Ranked search over names and tags
    pub fn search_art(
        &self,
        query: &str,
        options: &SearchOptions,
    ) -> Result<Vec<SearchHit>, CatalogError> {
        let snapshot = self.snapshot()?;
        let query = query.trim().to_lowercase();

        if query.is_empty() {
            return Ok(Vec::new());
        }

        let mut hits: Vec<SearchHit> = snapshot
            .pool(options.category.as_deref())
            .filter_map(|entry| {
                let metadata = snapshot.metadata.get(&entry.key())?;
                let score = search::score(&query, metadata, options.fuzzy);
                (score > 0).then(|| SearchHit {
                    metadata: metadata.clone(),
                    entry: Arc::clone(entry),
                    score,
                })
            })
            .collect();

        hits.sort_by(search::rank);
        hits.truncate(options.limit);
        Ok(hits)
    }

    /// Non-empty categories in declaration order
    pub fn get_categories(&self) -> Result<Vec<String>, CatalogError> {
        let snapshot = self.snapshot()?;
        Ok(snapshot
            .order
            .iter()
            .filter(|c| snapshot.entries.iter().any(|e| &e.category == *c))
            .cloned()
            .collect())
    }

    /// All entries of a category; empty for unknown categories
    pub fn get_category(&self, category: &str) -> Result<Vec<Arc<ArtEntry>>, CatalogError> {
        let snapshot = self.snapshot()?;
        Ok(snapshot.pool(Some(category)).cloned().collect())
    }

    /// Uniformly random entry from one category or the whole catalog
    pub fn get_random_art(
        &self,
        category: Option<&str>,
    ) -> Result<Option<Arc<ArtEntry>>, CatalogError> {
        let snapshot = self.snapshot()?;
        let pool: Vec<&Arc<ArtEntry>> = snapshot.pool(category).collect();

        if pool.is_empty() {
            return Ok(None);
        }

        let index = rand::rng().random_range(0..pool.len());
        Ok(Some(Arc::clone(pool[index])))
    }

    /// Most popular entries first; ties keep catalog order
    pub fn get_popular_art(
        &self,
        limit: usize,
        category: Option<&str>,
    ) -> Result<Vec<CatalogItem>, CatalogError> {
        let snapshot = self.snapshot()?;
        let mut items: Vec<CatalogItem> = snapshot
            .pool(category)
            .filter_map(|entry| snapshot.item(entry))
            .collect();

        items.sort_by(|a, b| b.metadata.popularity.cmp(&a.metadata.popularity));
        items.truncate(limit);
        Ok(items)
    }

    /// Totals, per-category counts and size extremes
    pub fn get_statistics(&self) -> Result<CatalogStatistics, CatalogError> {
        let snapshot = self.snapshot()?;

        let mut per_category: Vec<(String, usize)> = Vec::new();
        for category in &snapshot.order {
            let count = snapshot.pool(Some(category.as_str())).count();
            if count > 0 {
                per_category.push((category.clone(), count));
            }
        }

        let mut largest: Option<&ArtEntry> = None;
        let mut smallest: Option<&ArtEntry> = None;
        let mut total_bytes = 0usize;

        for entry in &snapshot.entries {
            let entry: &ArtEntry = entry;
            total_bytes += entry.byte_size;
            if largest.map_or(true, |l| entry.byte_size > l.byte_size) {
                largest = Some(entry);
            }
            if smallest.map_or(true, |s| entry.byte_size < s.byte_size) {
                smallest = Some(entry);
            }
        }

        let total_art = snapshot.entries.len();
        let average_size = if total_art == 0 {
            0
        } else {
            (total_bytes as f64 / total_art as f64).round() as usize
        };

        let record = |e: &ArtEntry| SizeRecord {
            key: e.key(),
            byte_size: e.byte_size,
        };

        Ok(CatalogStatistics {
            total_art,
            category_count: per_category.len(),
            per_category,
            average_size,
            largest: largest.map(record),
            smallest: smallest.map(record),
        })
    }

    fn snapshot(&self) -> Result<Arc<CatalogSnapshot>, CatalogError> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or(CatalogError::NotInitialized)
    }

    fn install(&self, snapshot: Option<Arc<CatalogSnapshot>>) {
        *self.state.write().unwrap_or_else(PoisonError::into_inner) = snapshot;
    }

    /// Scan storage and produce a fresh snapshot
    async fn build(&self) -> Result<CatalogSnapshot, CatalogError> {
        let discovered = self.storage.list_categories().await?;
        let order = declaration_order(&self.categories, &discovered);
        let present: HashSet<&str> = discovered.iter().map(String::as_str).collect();

        let mut entries = Vec::new();
        for category in &order {
            if !present.contains(category.as_str()) {
                debug!(category = %category, "Declared category has no directory");
                continue;
            }

            let names = match self.storage.list_assets(category).await {
                Ok(names) => names,
                Err(e) => {
                    warn!("Skipping unreadable category '{}': {}", category, e);
                    continue;
                }
            };

            for name in names {
                match self.storage.read_asset(category, &name).await {
                    Ok(content) => entries.push(Arc::new(ArtEntry::new(category, name, content))),
                    Err(e) => warn!("Skipping unreadable art '{}/{}': {}", category, name, e),
                }
            }
        }

        let metadata = self.load_metadata(&entries).await;

        info!(
            entries = entries.len(),
            categories = order.len(),
            "Art catalog loaded"
        );

        Ok(CatalogSnapshot {
            order,
            entries,
            metadata,
        })
    }

    /// Reuse cached metadata where possible, generate the rest
    async fn load_metadata(&self, entries: &[Arc<ArtEntry>]) -> HashMap<ArtKey, ArtMetadata> {
        let fingerprint = fingerprint(entries);
        let cached = self.read_cached_snapshot().await;

        let previous: HashMap<ArtKey, ArtMetadata> = cached
            .as_ref()
            .map(|s| s.entries.iter().map(|m| (m.key(), m.clone())).collect())
            .unwrap_or_default();

        let mut generated = 0usize;
        let metadata: HashMap<ArtKey, ArtMetadata> = entries
            .iter()
            .map(|entry| {
                let key = entry.key();
                let meta = match previous.get(&key) {
                    Some(existing) => existing.refreshed(entry),
                    None => {
                        generated += 1;
                        ArtMetadata::generate(entry, self.popularity.popularity(&key))
                    }
                };
                (key, meta)
            })
            .collect();

        let stale = match &cached {
            Some(snapshot) => snapshot.fingerprint != fingerprint,
            None => true,
        };

        if stale {
            debug!(generated, "Persisting regenerated metadata");
            self.persist(&metadata, entries, fingerprint).await;
        } else {
            debug!("Metadata loaded from cache");
        }

        metadata
    }

    async fn read_cached_snapshot(&self) -> Option<MetadataSnapshot> {
        let value = match self.cache.get(METADATA_KEY, METADATA_NAMESPACE).await {
            Ok(Some(value)) => value,
            Ok(None) => return None,
            Err(e) => {
                warn!("Metadata cache read failed, regenerating: {:#}", e);
                return None;
            }
        };

        match serde_json::from_value::<MetadataSnapshot>(value) {
            Ok(snapshot) if snapshot.version == SNAPSHOT_VERSION => Some(snapshot),
            Ok(snapshot) => {
                debug!(version = snapshot.version, "Ignoring metadata snapshot from another version");
                None
            }
            Err(e) => {
                warn!("Metadata cache entry is malformed, regenerating: {}", e);
                None
            }
        }
    }

    async fn persist(
        &self,
        metadata: &HashMap<ArtKey, ArtMetadata>,
        entries: &[Arc<ArtEntry>],
        fingerprint: String,
    ) {
        let snapshot = MetadataSnapshot {
            version: SNAPSHOT_VERSION,
            generated_at: Utc::now(),
            fingerprint,
            entries: entries
                .iter()
                .filter_map(|e| metadata.get(&e.key()).cloned())
                .collect(),
        };

        let value = match serde_json::to_value(&snapshot) {
            Ok(value) => value,
            Err(e) => {
                warn!("Failed to serialize metadata snapshot: {}", e);
                return;
            }
        };

        if let Err(e) = self
            .cache
            .set(METADATA_KEY, value, METADATA_NAMESPACE, self.cache_ttl)
            .await
        {
            warn!("Failed to persist metadata cache: {:#}", e);
        }
    }
}

/// Declared categories first, then undeclared directories alphabetically
fn declaration_order(declared: &[String], discovered: &[String]) -> Vec<String> {
    let mut order: Vec<String> = Vec::new();
    for category in declared {
        if !order.contains(category) {
            order.push(category.clone());
        }
    }

    let mut extra: Vec<String> = discovered
        .iter()
        .filter(|c| !order.contains(c))
        .cloned()
        .collect();
    extra.sort();
    extra.dedup();

    order.extend(extra);
    order
}

/// SHA-256 over the sorted `(key, size)` list
fn fingerprint(entries: &[Arc<ArtEntry>]) -> String {
    let mut keys: Vec<(ArtKey, usize)> = entries.iter().map(|e| (e.key(), e.byte_size)).collect();
    keys.sort();

    let mut hasher = Sha256::new();
    for (key, size) in &keys {
        hasher.update(format!("{}:{}\n", key, size).as_bytes());
    }
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declaration_order() {
        let declared = vec!["logos".to_string(), "animals".to_string()];
        let discovered = vec![
            "zoo".to_string(),
            "animals".to_string(),
            "emoji".to_string(),
        ];

        assert_eq!(
            declaration_order(&declared, &discovered),
            vec!["logos", "animals", "emoji", "zoo"]
        );
    }

    #[test]
    fn test_fingerprint_is_order_independent() {
        let a = Arc::new(ArtEntry::new("animals", "cat", "=^.^="));
        let b = Arc::new(ArtEntry::new("logos", "rust", "R"));

        assert_eq!(
            fingerprint(&[a.clone(), b.clone()]),
            fingerprint(&[b.clone(), a.clone()])
        );

        let c = Arc::new(ArtEntry::new("animals", "cat", "=^.^= meow"));
        assert_ne!(fingerprint(&[a, b.clone()]), fingerprint(&[c, b]));
    }
}
