//! `mdsaad ascii` subcommand: find art in the catalog and render it.
//!
//! The first positional argument is either an art name or one of the
//! keywords `list`, `categories`, `search`, `random`, `popular`, `stats`,
//! `colors`, `animations` and `help`.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;

use crate::config::{self, DisplaySettings};
use crate::domain::ArtEntry;
use crate::library::{ArtCatalog, FileMetadataCache, FsAssetStorage, SearchOptions, SCORE_EXACT};
use crate::render::{
    clip_width, Animation, ArtColor, ColorScheme, ColorSource, DisplayConfig, RenderEngine,
    SlideDirection, StdoutTerminal,
};

/// Arguments of `mdsaad ascii`
#[derive(Args, Debug, Default)]
pub struct AsciiArgs {
    /// Art name or keyword (list, categories, search, random, popular, stats, colors, animations, help)
    pub target: Option<String>,

    /// Search words, or the rest of a multi-word art name
    pub words: Vec<String>,

    /// Restrict to a category
    #[arg(short, long)]
    pub category: Option<String>,

    /// Color name, or a comma-separated palette (e.g. "red,yellow")
    #[arg(long)]
    pub color: Option<String>,

    /// Named palette (rainbow, fire, ocean, forest, sunset, neon, mono)
    #[arg(long)]
    pub color_scheme: Option<String>,

    /// Animate with the configured (or typewriter) animation
    #[arg(short, long)]
    pub animated: bool,

    /// Animation mode (typewriter, fade, slide, matrix, pulse, wave)
    #[arg(long)]
    pub animation: Option<String>,

    /// Milliseconds per unit of animation progress
    #[arg(long)]
    pub speed: Option<u64>,

    /// Clip art to this many columns
    #[arg(long)]
    pub width: Option<usize>,

    /// Search query (alternative to positional words)
    #[arg(short, long)]
    pub query: Option<String>,

    /// Maximum number of results
    #[arg(short, long, default_value = "10")]
    pub limit: usize,

    /// Slide-in direction (left, right, top, bottom)
    #[arg(long)]
    pub direction: Option<String>,

    /// Rebuild the catalog and its metadata cache first
    #[arg(long)]
    pub refresh: bool,
}

/// What the positional arguments ask for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    List,
    Categories,
    Search(String),
    Random,
    Popular,
    Stats,
    Colors,
    Animations,
    Help,
    Art(String),
}

impl Target {
    /// Interpret `target` and trailing `words`
    pub fn parse(target: Option<&str>, words: &[String], query: Option<&str>) -> Target {
        let Some(target) = target else {
            return Target::Help;
        };

        match target.to_lowercase().as_str() {
            "list" => Target::List,
            "categories" => Target::Categories,
            "search" => {
                let query = query
                    .map(str::to_string)
                    .unwrap_or_else(|| words.join(" "));
                Target::Search(query)
            }
            "random" => Target::Random,
            "popular" => Target::Popular,
            "stats" => Target::Stats,
            "colors" => Target::Colors,
            "animations" => Target::Animations,
            "help" => Target::Help,
            _ if words.is_empty() => Target::Art(target.to_string()),
            _ => {
                let mut parts = vec![target.to_string()];
                parts.extend(words.iter().cloned());
                Target::Art(parts.join("-"))
            }
        }
    }
}

/// Build the display options from flags, falling back to configured defaults
pub fn display_config(args: &AsciiArgs, defaults: &DisplaySettings) -> DisplayConfig {
    let colors = if let Some(scheme) = args.color_scheme.as_deref() {
        ColorSource::scheme(ColorScheme::resolve(scheme))
    } else if let Some(color) = args.color.as_deref() {
        parse_colors(color)
    } else if let Some(scheme) = defaults.color_scheme.as_deref() {
        ColorSource::scheme(ColorScheme::resolve(scheme))
    } else if let Some(color) = defaults.color.as_deref() {
        parse_colors(color)
    } else {
        ColorSource::default()
    };

    let animation = match (args.animation.as_deref(), args.animated) {
        (Some(name), _) => Animation::resolve(name),
        (None, true) => defaults
            .animation
            .as_deref()
            .map(Animation::resolve)
            .unwrap_or(Animation::Typewriter),
        (None, false) => Animation::Static,
    };

    let speed = args
        .speed
        .map(Duration::from_millis)
        .unwrap_or(defaults.speed);

    let mut display = DisplayConfig::new(colors, animation).with_speed(speed);
    if let Some(direction) = args.direction.as_deref() {
        display = display.with_direction(SlideDirection::resolve(direction));
    }
    display
}

/// One color, or a palette when the value lists several
fn parse_colors(value: &str) -> ColorSource {
    let colors: Vec<ArtColor> = value
        .split(',')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(ArtColor::resolve)
        .collect();

    match colors.as_slice() {
        [] => ColorSource::default(),
        [single] => ColorSource::Single(*single),
        _ => ColorSource::Palette(colors),
    }
}

/// Build and load the catalog from the configured assets
async fn open_catalog(refresh: bool) -> Result<ArtCatalog> {
    let cfg = config::config()?;

    let storage = FsAssetStorage::with_pattern(&cfg.assets, &cfg.catalog.file_pattern)
        .context("Invalid catalog file pattern")?;
    let cache = FileMetadataCache::open_default()?;

    let catalog = ArtCatalog::new(Arc::new(storage), Arc::new(cache))
        .with_categories(cfg.catalog.categories.clone())
        .with_cache_ttl(cfg.catalog.cache_ttl);

    let loaded = if refresh {
        catalog.refresh().await
    } else {
        catalog.initialize().await
    };
    loaded.with_context(|| format!("Failed to load art from {}", cfg.assets.display()))?;

    Ok(catalog)
}

/// Execute `mdsaad ascii`
pub async fn execute(args: AsciiArgs) -> Result<()> {
    let target = Target::parse(args.target.as_deref(), &args.words, args.query.as_deref());

    match target {
        Target::Help => {
            print_help();
            Ok(())
        }
        Target::Colors => {
            print_colors();
            Ok(())
        }
        Target::Animations => {
            print_animations();
            Ok(())
        }
        Target::List => list_art(&open_catalog(args.refresh).await?, &args),
        Target::Categories => list_categories(&open_catalog(args.refresh).await?),
        Target::Search(query) => search_art(&open_catalog(args.refresh).await?, &query, &args),
        Target::Popular => popular_art(&open_catalog(args.refresh).await?, &args),
        Target::Stats => show_stats(&open_catalog(args.refresh).await?),
        Target::Random => {
            let catalog = open_catalog(args.refresh).await?;
            match catalog.get_random_art(args.category.as_deref())? {
                Some(entry) => {
                    eprintln!("🎲 {}/{}", entry.category, entry.name);
                    show_art(&entry, &args).await
                }
                None => {
                    println!("No art available{}", category_suffix(&args));
                    Ok(())
                }
            }
        }
        Target::Art(name) => {
            let catalog = open_catalog(args.refresh).await?;
            show_named(&catalog, &name, &args).await
        }
    }
}

fn category_suffix(args: &AsciiArgs) -> String {
    args.category
        .as_deref()
        .map(|c| format!(" in category '{}'", c))
        .unwrap_or_default()
}

/// Look up `name` and render it, or suggest close matches
async fn show_named(catalog: &ArtCatalog, name: &str, args: &AsciiArgs) -> Result<()> {
    if let Some(entry) = find_art(catalog, name, args.category.as_deref())? {
        if args.category.is_none() {
            let matches = catalog.get_art_matches(&entry.name)?;
            if matches.len() > 1 {
                let categories: Vec<&str> = matches.iter().map(|e| e.category.as_str()).collect();
                eprintln!(
                    "'{}' exists in {}; showing {}/{} (use --category to pick)",
                    name,
                    categories.join(", "),
                    entry.category,
                    entry.name
                );
            }
        }
        return show_art(&entry, args).await;
    }

    println!("Art '{}' not found{}.", name, category_suffix(args));

    let suggestions = catalog.search_art(name, &SearchOptions::default().with_limit(5))?;
    if !suggestions.is_empty() {
        let names: Vec<&str> = suggestions.iter().map(|hit| hit.name()).collect();
        println!("Did you mean: {}", names.join(", "));
    }
    println!("Use 'mdsaad ascii list' to see all available art.");

    Ok(())
}

/// Exact name as typed, else the first case-insensitive name match
fn find_art(
    catalog: &ArtCatalog,
    name: &str,
    category: Option<&str>,
) -> Result<Option<Arc<ArtEntry>>> {
    if let Some(entry) = catalog.get_art(name, category)? {
        return Ok(Some(entry));
    }

    let mut options = SearchOptions::default().exact_only();
    if let Some(category) = category {
        options = options.in_category(category);
    }

    Ok(catalog
        .search_art(name, &options)?
        .into_iter()
        .find(|hit| hit.score == SCORE_EXACT)
        .map(|hit| hit.entry))
}

/// Render one entry to stdout; Ctrl-C stops a running animation
async fn show_art(entry: &ArtEntry, args: &AsciiArgs) -> Result<()> {
    let cfg = config::config()?;
    let display = display_config(args, &cfg.display);

    let content = match args.width {
        Some(width) => clip_width(&entry.content, width),
        None => entry.content.clone(),
    };

    let engine = RenderEngine::new(StdoutTerminal::new());
    let render = engine.render(&content, &display);
    tokio::pin!(render);

    tokio::select! {
        result = &mut render => result?,
        _ = tokio::signal::ctrl_c() => {
            engine.stop_animation();
            render.await?;
        }
    }

    Ok(())
}

/// List art, grouped by category
fn list_art(catalog: &ArtCatalog, args: &AsciiArgs) -> Result<()> {
    let categories = match args.category.as_deref() {
        Some(category) => vec![category.to_string()],
        None => catalog.get_categories()?,
    };

    let mut total = 0;
    println!("{:<20} {:<14} {:<6} {:<6}", "NAME", "CATEGORY", "LINES", "WIDTH");
    println!("{}", "-".repeat(50));

    for category in &categories {
        for entry in catalog.get_category(category)? {
            println!(
                "{:<20} {:<14} {:<6} {:<6}",
                entry.name, entry.category, entry.line_count, entry.max_width
            );
            total += 1;
        }
    }

    if total == 0 {
        println!("No art found{}.", category_suffix(args));
    } else {
        println!("\nTotal: {} pieces", total);
    }

    Ok(())
}

fn list_categories(catalog: &ArtCatalog) -> Result<()> {
    let categories = catalog.get_categories()?;

    if categories.is_empty() {
        println!("No categories found");
        return Ok(());
    }

    println!("{:<16} {:<6}", "CATEGORY", "COUNT");
    println!("{}", "-".repeat(24));
    for category in categories {
        let count = catalog.get_category(&category)?.len();
        println!("{:<16} {:<6}", category, count);
    }

    Ok(())
}

fn search_art(catalog: &ArtCatalog, query: &str, args: &AsciiArgs) -> Result<()> {
    if query.trim().is_empty() {
        println!("Usage: mdsaad ascii search <query>");
        return Ok(());
    }

    let mut options = SearchOptions::default().with_limit(args.limit);
    if let Some(category) = args.category.as_deref() {
        options = options.in_category(category);
    }

    let hits = catalog.search_art(query, &options)?;
    if hits.is_empty() {
        println!("No results found for: {}", query);
        return Ok(());
    }

    println!("Found {} result(s) for \"{}\":\n", hits.len(), query);
    println!("{:<20} {:<14} {:<6} {:<40}", "NAME", "CATEGORY", "SCORE", "DESCRIPTION");
    println!("{}", "-".repeat(80));

    for hit in &hits {
        println!(
            "{:<20} {:<14} {:<6} {:<40}",
            hit.name(),
            hit.entry.category,
            hit.score,
            hit.metadata.description
        );
    }

    Ok(())
}

fn popular_art(catalog: &ArtCatalog, args: &AsciiArgs) -> Result<()> {
    let items = catalog.get_popular_art(args.limit, args.category.as_deref())?;

    if items.is_empty() {
        println!("No art found{}.", category_suffix(args));
        return Ok(());
    }

    println!("{:<20} {:<14} {:<10} {:<10}", "NAME", "CATEGORY", "POPULARITY", "DIFFICULTY");
    println!("{}", "-".repeat(56));
    for item in &items {
        println!(
            "{:<20} {:<14} {:<10} {:<10}",
            item.entry.name, item.entry.category, item.metadata.popularity, item.metadata.difficulty
        );
    }

    Ok(())
}

fn show_stats(catalog: &ArtCatalog) -> Result<()> {
    let stats = catalog.get_statistics()?;

    println!("Art catalog");
    println!("  Total pieces:   {}", stats.total_art);
    println!("  Categories:     {}", stats.category_count);
    println!("  Average size:   {} bytes", stats.average_size);
    if let Some(largest) = &stats.largest {
        println!("  Largest:        {} ({} bytes)", largest.key, largest.byte_size);
    }
    if let Some(smallest) = &stats.smallest {
        println!("  Smallest:       {} ({} bytes)", smallest.key, smallest.byte_size);
    }

    if !stats.per_category.is_empty() {
        println!();
        println!("Per category:");
        for (category, count) in &stats.per_category {
            println!("  {:<16} {}", category, count);
        }
    }

    Ok(())
}

fn print_colors() {
    println!("Colors:");
    for color in ArtColor::ALL {
        println!("  {}", color);
    }
    println!();
    println!("Color schemes:");
    for scheme in ColorScheme::ALL {
        let palette: Vec<&str> = scheme.palette().into_iter().map(ArtColor::name).collect();
        println!("  {:<10} {}", scheme.name(), palette.join(", "));
    }
}

fn print_animations() {
    println!("Animations:");
    for animation in Animation::ANIMATED {
        println!("  {:<12} {}", animation.name(), animation.description());
    }
    println!();
    println!("Slide directions: left, right, top, bottom");
}

fn print_help() {
    println!("Usage: mdsaad ascii <name|keyword> [options]");
    println!();
    println!("Keywords:");
    println!("  list         List all art (--category to filter)");
    println!("  categories   List categories");
    println!("  search <q>   Search names and tags");
    println!("  random       Show random art");
    println!("  popular      Show the most popular art");
    println!("  stats        Catalog statistics");
    println!("  colors       Available colors and schemes");
    println!("  animations   Available animations");
    println!();
    println!("Examples:");
    println!("  mdsaad ascii batman --color yellow");
    println!("  mdsaad ascii rust --color-scheme fire --animation fade");
    println!("  mdsaad ascii search cat --limit 5");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_target_keywords() {
        assert_eq!(Target::parse(None, &[], None), Target::Help);
        assert_eq!(Target::parse(Some("LIST"), &[], None), Target::List);
        assert_eq!(Target::parse(Some("popular"), &[], None), Target::Popular);
        assert_eq!(
            Target::parse(Some("search"), &words(&["big", "cat"]), None),
            Target::Search("big cat".to_string())
        );
        assert_eq!(
            Target::parse(Some("search"), &words(&["ignored"]), Some("owl")),
            Target::Search("owl".to_string())
        );
    }

    #[test]
    fn test_target_art_names() {
        assert_eq!(
            Target::parse(Some("batman"), &[], None),
            Target::Art("batman".to_string())
        );
        assert_eq!(
            Target::parse(Some("iron"), &words(&["man"]), None),
            Target::Art("iron-man".to_string())
        );
    }

    #[test]
    fn test_display_config_flags_win() {
        let defaults = DisplaySettings {
            color_scheme: Some("ocean".to_string()),
            animation: Some("wave".to_string()),
            ..Default::default()
        };
        let args = AsciiArgs {
            color: Some("red".to_string()),
            animated: true,
            speed: Some(5),
            ..Default::default()
        };

        let display = display_config(&args, &defaults);
        assert_eq!(display.colors, ColorSource::Single(ArtColor::Red));
        assert_eq!(display.animation, Animation::Wave);
        assert_eq!(display.speed, Duration::from_millis(5));
    }

    #[test]
    fn test_display_config_defaults() {
        let args = AsciiArgs::default();
        let display = display_config(&args, &DisplaySettings::default());

        assert_eq!(display.colors, ColorSource::default());
        assert_eq!(display.animation, Animation::Static);

        let animated = AsciiArgs {
            animated: true,
            ..Default::default()
        };
        assert_eq!(
            display_config(&animated, &DisplaySettings::default()).animation,
            Animation::Typewriter
        );
    }

    #[tokio::test]
    async fn test_find_art_ignores_case() {
        use crate::library::{FixedPopularity, MemoryMetadataCache};
        use tempfile::TempDir;

        let temp = TempDir::new().unwrap();
        let logos = temp.path().join("logos");
        std::fs::create_dir_all(&logos).unwrap();
        std::fs::write(logos.join("GitHub.txt"), "octocat").unwrap();

        let catalog = ArtCatalog::new(
            Arc::new(FsAssetStorage::new(temp.path())),
            Arc::new(MemoryMetadataCache::new()),
        )
        .with_popularity(Arc::new(FixedPopularity::new(50)));
        catalog.initialize().await.unwrap();

        let exact = find_art(&catalog, "GitHub", None).unwrap().unwrap();
        assert_eq!(exact.name, "GitHub");

        let folded = find_art(&catalog, "github", Some("logos")).unwrap().unwrap();
        assert_eq!(folded.name, "GitHub");

        assert!(find_art(&catalog, "gitlab", None).unwrap().is_none());
        assert!(find_art(&catalog, "github", Some("tech")).unwrap().is_none());
    }

    #[test]
    fn test_palette_from_color_list() {
        assert_eq!(
            parse_colors("red, blue"),
            ColorSource::Palette(vec![ArtColor::Red, ArtColor::Blue])
        );
        // Unknown names fall back to the default color
        assert_eq!(parse_colors("chartreuse"), ColorSource::Single(ArtColor::White));
    }
}
