//! Canonical paths for mdsaad state.
//!
//! Single source of truth - import this instead of hardcoding paths.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use mdsaad::config::paths;
//!
//! let assets = paths::assets_dir()?;
//! let cache = paths::metadata_cache_dir()?;
//! ```
//!
//! ## Layout
//!
//! | Location | Purpose |
//! |----------|---------|
//! | `<home>/` | State root (~/.mdsaad) |
//! | `<assets>/<category>/*.txt` | Art files, read-only |
//! | `<cache>/ascii-art/metadata.json` | Catalog metadata snapshot |

use std::path::PathBuf;

use anyhow::Result;

/// Get the mdsaad home directory (~/.mdsaad)
pub fn mdsaad_home() -> Result<PathBuf> {
    Ok(crate::config::config()?.home.clone())
}

/// Get the art assets root
pub fn assets_dir() -> Result<PathBuf> {
    Ok(crate::config::config()?.assets.clone())
}

/// Get the cache root (~/.mdsaad/cache/)
pub fn cache_dir() -> Result<PathBuf> {
    Ok(crate::config::config()?.cache.clone())
}

/// Get the directory the metadata cache writes namespaces under
pub fn metadata_cache_dir() -> Result<PathBuf> {
    cache_dir()
}

/// Get the config file path, if one was discovered
pub fn config_file() -> Result<Option<PathBuf>> {
    Ok(crate::config::config()?.config_file.clone())
}
