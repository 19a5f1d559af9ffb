//! mdsaad - ASCII art catalog and terminal renderer
//!
//! Finds text art by name, keyword or fuzzy query and draws it in the
//! terminal, statically or with one of several animations.
//!
//! # Architecture
//!
//! Two components meet only through plain data:
//! - The catalog loads art from storage, derives metadata (tags,
//!   difficulty, popularity) and answers lookups and searches
//! - The render engine takes the chosen content plus display options and
//!   writes colored, optionally animated output to a terminal sink
//!
//! # Modules
//!
//! - `domain`: Data structures (ArtEntry, ArtMetadata)
//! - `library`: Storage, metadata cache and the searchable catalog
//! - `render`: Colors, animations, terminal sink and the render engine
//! - `config`: Layered configuration (env, .mdsaad/config.yaml, defaults)
//! - `cli`: Command-line interface
//!
//! # Usage
//!
//! ```bash
//! # Show a piece of art
//! mdsaad ascii batman --color yellow
//!
//! # Animate it
//! mdsaad ascii rust --color-scheme fire --animation fade
//!
//! # Search names and tags
//! mdsaad ascii search cat
//! ```

pub mod cli;
pub mod config;
pub mod domain;
pub mod library;
pub mod render;

// Re-export main types at crate root for convenience
pub use domain::{ArtEntry, ArtKey, ArtMetadata};
pub use library::{
    ArtCatalog, AssetStorage, CatalogError, CatalogItem, CatalogStatistics, FileMetadataCache,
    FsAssetStorage, MemoryMetadataCache, MetadataCache, SearchHit, SearchOptions,
};
pub use render::{
    Animation, ArtColor, ColorScheme, ColorSource, DisplayConfig, RenderEngine, RenderError,
    TerminalSink,
};
