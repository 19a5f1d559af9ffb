//! Command-line interface for mdsaad.
//!
//! Provides commands for showing and searching ASCII art, inspecting the
//! resolved configuration, clearing the metadata cache and printing shell
//! completions.

use std::io;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

use crate::config;
use crate::library::{FileMetadataCache, MetadataCache, METADATA_NAMESPACE};

pub mod ascii;

/// mdsaad - ASCII art catalog and terminal renderer
#[derive(Parser, Debug)]
#[command(name = "mdsaad")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show, list and search ASCII art
    Ascii(ascii::AsciiArgs),

    /// Show resolved configuration (debug)
    Config,

    /// Manage the metadata cache
    Cache {
        #[command(subcommand)]
        command: CacheCommands,
    },

    /// Print a shell completion script
    Completions {
        /// Shell to generate the script for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Cache maintenance subcommands
#[derive(Subcommand, Debug)]
pub enum CacheCommands {
    /// Delete cached art metadata (regenerated on next use)
    Clear,
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Ascii(args) => ascii::execute(args).await,
            Commands::Config => show_config().await,
            Commands::Cache { command } => match command {
                CacheCommands::Clear => clear_cache().await,
            },
            Commands::Completions { shell } => {
                print_completions(shell);
                Ok(())
            }
        }
    }
}

/// Show the resolved configuration (for debugging)
async fn show_config() -> Result<()> {
    let cfg = config::config()?;

    println!("mdsaad configuration");
    println!();
    println!(
        "Config file: {}",
        config::paths::config_file()?
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(none - using defaults)".to_string())
    );
    println!();
    println!("Paths:");
    println!("  Home:   {}", config::paths::mdsaad_home()?.display());
    println!("  Assets: {}", config::paths::assets_dir()?.display());
    println!("  Cache:  {}", config::paths::cache_dir()?.display());
    println!();
    println!("Catalog:");
    println!("  Categories:   {}", cfg.catalog.categories.join(", "));
    println!("  File pattern: {}", cfg.catalog.file_pattern);
    println!("  Cache TTL:    {}h", cfg.catalog.cache_ttl.as_secs() / 3600);
    println!();
    println!("Display:");
    println!("  Color:        {}", cfg.display.color.as_deref().unwrap_or("(default)"));
    println!("  Color scheme: {}", cfg.display.color_scheme.as_deref().unwrap_or("(none)"));
    println!("  Animation:    {}", cfg.display.animation.as_deref().unwrap_or("(typewriter with -a)"));
    println!("  Speed:        {}ms", cfg.display.speed.as_millis());

    Ok(())
}

/// Remove the cached metadata snapshot
async fn clear_cache() -> Result<()> {
    let cache = FileMetadataCache::open_default()?;
    let removed = cache
        .clear(METADATA_NAMESPACE)
        .await
        .with_context(|| format!("Failed to clear cache in {}", cache.dir().display()))?;

    println!("Removed {} cached entr{}", removed, if removed == 1 { "y" } else { "ies" });
    Ok(())
}

fn print_completions(shell: Shell) {
    let mut command = Cli::command();
    let name = command.get_name().to_string();
    clap_complete::generate(shell, &mut command, name, &mut io::stdout());
}
