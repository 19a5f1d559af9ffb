//! Art entries loaded from asset storage.
//!
//! An entry is immutable once loaded; only a full catalog refresh
//! replaces it.

use serde::{Deserialize, Serialize};
use unicode_width::UnicodeWidthStr;

/// Identifies an entry: `name` is unique only within its `category`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ArtKey {
    pub category: String,
    pub name: String,
}

impl ArtKey {
    pub fn new(category: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            name: name.into(),
        }
    }
}

impl std::fmt::Display for ArtKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.category, self.name)
    }
}

/// A single piece of text art
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtEntry {
    /// Art name (file stem)
    pub name: String,

    /// Category the art was loaded from
    pub category: String,

    /// Raw art text, whitespace preserved
    pub content: String,

    /// Number of `\n`-separated lines (a trailing newline yields an empty last line)
    pub line_count: usize,

    /// Widest line, in terminal columns
    pub max_width: usize,

    /// Size of `content` in bytes
    pub byte_size: usize,
}

impl ArtEntry {
    /// Create an entry, deriving its dimensions from the content
    pub fn new(
        category: impl Into<String>,
        name: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        let content = content.into();
        let (line_count, max_width) = measure(&content);

        Self {
            name: name.into(),
            category: category.into(),
            byte_size: content.len(),
            line_count,
            max_width,
            content,
        }
    }

    pub fn key(&self) -> ArtKey {
        ArtKey::new(&self.category, &self.name)
    }

    /// Content split into lines, in the same way `line_count` counts them
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.content.split('\n')
    }
}

/// Line count and widest line (in columns) of a block of text
pub fn measure(content: &str) -> (usize, usize) {
    content
        .split('\n')
        .fold((0, 0), |(count, width), line| {
            (count + 1, width.max(line.width()))
        })
}
