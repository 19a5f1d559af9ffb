//! Configuration for mdsaad paths, catalog and display defaults.
//!
//! Configuration sources (highest priority first):
//! 1. Environment variables (MDSAAD_HOME, MDSAAD_ASSETS)
//! 2. Config file (.mdsaad/config.yaml)
//! 3. Defaults (~/.mdsaad, bundled assets/ascii-art)
//!
//! Config file discovery:
//! - Searches current directory and parents for .mdsaad/config.yaml
//! - `home` is relative to the .mdsaad/ directory, other paths to its parent

pub mod paths;

use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::library::{DEFAULT_CACHE_TTL, DEFAULT_CATEGORIES, DEFAULT_FILE_PATTERN};
use crate::render::DEFAULT_SPEED;

/// Global cached configuration (stores Result to handle init errors)
static CONFIG: OnceLock<Result<ResolvedConfig, String>> = OnceLock::new();

/// Art bundled with the source tree
pub const BUNDLED_ASSETS: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/assets/ascii-art");

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    pub version: Option<String>,
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub catalog: Option<CatalogConfig>,
    #[serde(default)]
    pub display: Option<DisplayConfigFile>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PathsConfig {
    /// State directory (relative to .mdsaad/)
    pub home: Option<String>,
    /// Art assets root, one subdirectory per category
    pub assets: Option<String>,
    /// Metadata cache directory
    pub cache: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogConfig {
    /// Category declaration order
    pub categories: Option<Vec<String>>,
    pub cache_ttl_hours: Option<u64>,
    pub file_pattern: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DisplayConfigFile {
    pub color: Option<String>,
    pub color_scheme: Option<String>,
    pub animation: Option<String>,
    pub speed_ms: Option<u64>,
}

/// Resolved configuration with absolute paths
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// Absolute path to mdsaad home (state)
    pub home: PathBuf,
    /// Art assets root
    pub assets: PathBuf,
    /// Cache root
    pub cache: PathBuf,
    /// Path to config file (if found)
    pub config_file: Option<PathBuf>,
    pub catalog: CatalogSettings,
    pub display: DisplaySettings,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CatalogSettings {
    pub categories: Vec<String>,
    pub cache_ttl: Duration,
    pub file_pattern: String,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            categories: DEFAULT_CATEGORIES.iter().map(|c| c.to_string()).collect(),
            cache_ttl: DEFAULT_CACHE_TTL,
            file_pattern: DEFAULT_FILE_PATTERN.to_string(),
        }
    }
}

/// Display defaults; command-line flags win over these
#[derive(Debug, Clone, PartialEq)]
pub struct DisplaySettings {
    pub color: Option<String>,
    pub color_scheme: Option<String>,
    pub animation: Option<String>,
    pub speed: Duration,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            color: None,
            color_scheme: None,
            animation: None,
            speed: DEFAULT_SPEED,
        }
    }
}

/// Find config file by searching current directory and parents
fn find_config_file() -> Option<PathBuf> {
    let mut current = std::env::current_dir().ok()?;

    loop {
        let config_path = current.join(".mdsaad").join("config.yaml");
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            break;
        }
    }

    None
}

/// Load and parse config file
fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Resolve a path that may be relative to the config file's parent
fn resolve_path(base: &Path, path_str: &str) -> PathBuf {
    let path = PathBuf::from(path_str);
    if path.is_absolute() {
        path
    } else {
        base.join(path)
            .canonicalize()
            .unwrap_or_else(|_| base.join(path_str))
    }
}

/// Merge defaults, an optional config file and environment overrides
fn resolve(
    default_home: PathBuf,
    config_path: Option<&Path>,
    file: ConfigFile,
    env: impl Fn(&str) -> Option<String>,
) -> ResolvedConfig {
    // .mdsaad/ and the directory holding it
    let dot_dir = config_path.and_then(|p| p.parent());
    let base_dir = dot_dir.and_then(|p| p.parent());

    let home = if let Some(env_home) = env("MDSAAD_HOME") {
        PathBuf::from(env_home)
    } else if let (Some(dir), Some(home_path)) = (dot_dir, file.paths.home.as_deref()) {
        resolve_path(dir, home_path)
    } else {
        default_home
    };

    let assets = if let Some(env_assets) = env("MDSAAD_ASSETS") {
        PathBuf::from(env_assets)
    } else if let (Some(dir), Some(assets_path)) = (base_dir, file.paths.assets.as_deref()) {
        resolve_path(dir, assets_path)
    } else if home.join("assets").join("ascii-art").is_dir() {
        home.join("assets").join("ascii-art")
    } else {
        PathBuf::from(BUNDLED_ASSETS)
    };

    let cache = match (base_dir, file.paths.cache.as_deref()) {
        (Some(dir), Some(cache_path)) => resolve_path(dir, cache_path),
        _ => home.join("cache"),
    };

    let defaults = CatalogSettings::default();
    let catalog = match file.catalog {
        Some(c) => CatalogSettings {
            categories: c.categories.unwrap_or(defaults.categories),
            cache_ttl: c
                .cache_ttl_hours
                .map(|h| Duration::from_secs(h * 3600))
                .unwrap_or(defaults.cache_ttl),
            file_pattern: c.file_pattern.unwrap_or(defaults.file_pattern),
        },
        None => defaults,
    };

    let display = match file.display {
        Some(d) => DisplaySettings {
            color: d.color,
            color_scheme: d.color_scheme,
            animation: d.animation,
            speed: d
                .speed_ms
                .map(Duration::from_millis)
                .unwrap_or(DEFAULT_SPEED),
        },
        None => DisplaySettings::default(),
    };

    ResolvedConfig {
        home,
        assets,
        cache,
        config_file: config_path.map(Path::to_path_buf),
        catalog,
        display,
    }
}

/// Load configuration from all sources
fn load_config() -> Result<ResolvedConfig> {
    let default_home = dirs::home_dir()
        .context("Failed to determine home directory")?
        .join(".mdsaad");

    let config_file = find_config_file();
    let file = match config_file {
        Some(ref path) => load_config_file(path)?,
        None => ConfigFile::default(),
    };

    Ok(resolve(
        default_home,
        config_file.as_deref(),
        file,
        |name| std::env::var(name).ok(),
    ))
}

/// Get the global configuration (loads once, then cached)
pub fn config() -> Result<&'static ResolvedConfig> {
    let result = CONFIG.get_or_init(|| load_config().map_err(|e| e.to_string()));

    match result {
        Ok(config) => Ok(config),
        Err(e) => anyhow::bail!("{}", e),
    }
}

/// Force reload configuration (useful for testing)
pub fn reload_config() -> Result<ResolvedConfig> {
    load_config()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_defaults_without_file() {
        let home = PathBuf::from("/test/.mdsaad");
        let config = resolve(home.clone(), None, ConfigFile::default(), no_env);

        assert_eq!(config.home, home);
        assert_eq!(config.cache, home.join("cache"));
        assert_eq!(config.assets, PathBuf::from(BUNDLED_ASSETS));
        assert!(config.config_file.is_none());
        assert_eq!(config.catalog, CatalogSettings::default());
        assert_eq!(config.display.speed, DEFAULT_SPEED);
    }

    #[test]
    fn test_config_file_parsing() {
        let temp = TempDir::new().unwrap();
        let dot_dir = temp.path().join(".mdsaad");
        std::fs::create_dir_all(&dot_dir).unwrap();

        let config_path = dot_dir.join("config.yaml");
        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(
            file,
            r#"
version: "1.0"
paths:
  assets: art
catalog:
  categories: [animals, tech]
  cache_ttl_hours: 2
display:
  color_scheme: fire
  speed_ms: 20
"#
        )
        .unwrap();

        let parsed = load_config_file(&config_path).unwrap();
        assert_eq!(parsed.version.as_deref(), Some("1.0"));
        assert_eq!(parsed.paths.assets.as_deref(), Some("art"));

        let config = resolve(
            PathBuf::from("/test/.mdsaad"),
            Some(&config_path),
            parsed,
            no_env,
        );
        assert_eq!(config.assets, temp.path().join("art"));
        assert_eq!(config.catalog.categories, vec!["animals", "tech"]);
        assert_eq!(config.catalog.cache_ttl, Duration::from_secs(7200));
        assert_eq!(config.catalog.file_pattern, "*.txt");
        assert_eq!(config.display.color_scheme.as_deref(), Some("fire"));
        assert_eq!(config.display.speed, Duration::from_millis(20));
        assert_eq!(config.config_file, Some(config_path));
    }

    #[test]
    fn test_env_overrides_file() {
        let file = ConfigFile {
            paths: PathsConfig {
                assets: Some("art".to_string()),
                ..Default::default()
            },
            ..Default::default()
        };
        let env = |name: &str| match name {
            "MDSAAD_HOME" => Some("/env/home".to_string()),
            "MDSAAD_ASSETS" => Some("/env/art".to_string()),
            _ => None,
        };

        let config = resolve(
            PathBuf::from("/test/.mdsaad"),
            Some(Path::new("/project/.mdsaad/config.yaml")),
            file,
            env,
        );

        assert_eq!(config.home, PathBuf::from("/env/home"));
        assert_eq!(config.assets, PathBuf::from("/env/art"));
        assert_eq!(config.cache, PathBuf::from("/env/home/cache"));
    }

    #[test]
    fn test_resolve_relative_path() {
        let base = PathBuf::from("/home/user/project");

        assert_eq!(
            resolve_path(&base, "./subdir"),
            PathBuf::from("/home/user/project/subdir")
        );
        assert_eq!(
            resolve_path(&base, "/absolute/path"),
            PathBuf::from("/absolute/path")
        );
    }
}
