//! Art library: asset storage, metadata cache and the searchable catalog.
//!
//! # Storage Layout
//!
//! ```text
//! <assets>/
//! └── <category>/
//!     └── <name>.txt            # Raw text art
//!
//! <cache>/
//! └── ascii-art/
//!     └── metadata.json         # Tags, difficulty, popularity (24h TTL)
//! ```

pub mod cache;
pub mod catalog;
pub mod popularity;
pub mod search;
pub mod storage;

pub use cache::{FileMetadataCache, MemoryMetadataCache, MetadataCache};
pub use catalog::{
    ArtCatalog, CatalogError, CatalogItem, CatalogStatistics, SizeRecord, DEFAULT_CACHE_TTL,
    DEFAULT_CATEGORIES, METADATA_KEY, METADATA_NAMESPACE,
};
pub use popularity::{FixedPopularity, PopularityProvider, RandomPopularity};
pub use search::{SearchHit, SearchOptions, SCORE_EXACT};
pub use storage::{AssetStorage, FsAssetStorage, StorageError, DEFAULT_FILE_PATTERN};
