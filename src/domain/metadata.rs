//! Derived metadata for art entries.
//!
//! Tags, description and difficulty are deterministic functions of the
//! entry. Popularity is supplied from outside (see
//! [`crate::library::PopularityProvider`]) and persisted with the rest of
//! the record in the metadata cache.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::art::{ArtEntry, ArtKey};

/// Highest difficulty score
pub const MAX_DIFFICULTY: u8 = 10;

/// Highest popularity score
pub const MAX_POPULARITY: u8 = 99;

/// Derived, cacheable metadata for one entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtMetadata {
    pub category: String,
    pub name: String,

    /// Search tags (category, name tokens, category vocabulary)
    pub tags: BTreeSet<String>,

    /// Human-readable description
    pub description: String,

    /// 1-10, from line count, width and byte size
    pub difficulty: u8,

    /// 0-99, frozen at generation time
    pub popularity: u8,
}

impl ArtMetadata {
    /// Build metadata for an entry with the given popularity score
    pub fn generate(entry: &ArtEntry, popularity: u8) -> Self {
        Self {
            category: entry.category.clone(),
            name: entry.name.clone(),
            tags: derive_tags(&entry.category, &entry.name),
            description: describe(&entry.category, &entry.name),
            difficulty: difficulty(entry.line_count, entry.max_width, entry.byte_size),
            popularity: popularity.min(MAX_POPULARITY),
        }
    }

    pub fn key(&self) -> ArtKey {
        ArtKey::new(&self.category, &self.name)
    }

    /// Recompute the deterministic fields, keeping the stored popularity
    pub fn refreshed(&self, entry: &ArtEntry) -> Self {
        Self::generate(entry, self.popularity)
    }
}

/// Fixed extra tags per known category
fn category_vocabulary(category: &str) -> &'static [&'static str] {
    match category {
        "superheroes" => &["hero", "comic", "character"],
        "logos" => &["logo", "brand", "tech"],
        "animals" => &["animal", "nature", "cute"],
        "nature" => &["nature", "outdoors", "scenery"],
        "tech" => &["tech", "computer", "code"],
        _ => &[],
    }
}

/// Tags from the category, the name tokens and the category vocabulary
pub fn derive_tags(category: &str, name: &str) -> BTreeSet<String> {
    let mut tags = BTreeSet::new();
    tags.insert(category.to_lowercase());

    for token in name
        .split(|c: char| c == '-' || c == '_' || c.is_whitespace())
        .filter(|t| !t.is_empty())
    {
        tags.insert(token.to_lowercase());
    }

    tags.extend(category_vocabulary(category).iter().map(|t| t.to_string()));
    tags
}

/// Description from the built-in table, or a generated default
pub fn describe(category: &str, name: &str) -> String {
    let known = match (category, name) {
        ("superheroes", "batman") => Some("The Dark Knight of Gotham City"),
        ("superheroes", "spiderman") => Some("Your friendly neighborhood Spider-Man"),
        ("superheroes", "superman") => Some("The Man of Steel and his famous crest"),
        ("logos", "rust") => Some("The Rust programming language gear"),
        ("logos", "github") => Some("GitHub's Octocat silhouette"),
        ("logos", "apple") => Some("A bitten apple"),
        ("animals", "cat") => Some("A curious cat"),
        ("animals", "dog") => Some("A loyal dog"),
        ("animals", "owl") => Some("A wise owl perched at night"),
        ("nature", "tree") => Some("A tall leafy tree"),
        ("nature", "mountain") => Some("Snow-capped mountain peaks"),
        ("tech", "computer") => Some("A classic desktop computer"),
        ("tech", "rocket") => Some("A rocket ready for launch"),
        _ => None,
    };

    known
        .map(str::to_string)
        .unwrap_or_else(|| format!("ASCII art of {}", name))
}

/// Sum of three bucket scores, clamped to 1..=10
pub fn difficulty(line_count: usize, max_width: usize, byte_size: usize) -> u8 {
    let lines = match line_count {
        0..=5 => 1,
        6..=15 => 2,
        _ => 3,
    };
    let width = match max_width {
        0..=20 => 1,
        21..=50 => 2,
        _ => 3,
    };
    let bytes = match byte_size {
        0..=200 => 1,
        201..=800 => 2,
        801..=2000 => 3,
        _ => 4,
    };

    (lines + width + bytes).clamp(1, MAX_DIFFICULTY)
}
