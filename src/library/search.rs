//! Ranked name/tag search with an edit-distance fallback.

use std::cmp::Ordering;
use std::sync::Arc;

use crate::domain::{ArtEntry, ArtMetadata};

/// Score for an exact (case-insensitive) name match
pub const SCORE_EXACT: u32 = 100;
/// Score for a name substring match
pub const SCORE_NAME_SUBSTRING: u32 = 50;
/// Score for a tag substring match
pub const SCORE_TAG: u32 = 30;
/// Score for an edit-distance match
pub const SCORE_FUZZY: u32 = 20;

/// Fraction of the query length tolerated as edit distance
pub const FUZZY_TOLERANCE: f64 = 0.3;

/// Options for [`crate::library::ArtCatalog::search_art`]
#[derive(Debug, Clone)]
pub struct SearchOptions {
    /// Restrict to one category
    pub category: Option<String>,

    /// Maximum number of hits (default: 10)
    pub limit: usize,

    /// Allow edit-distance matches (default: true)
    pub fuzzy: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            category: None,
            limit: 10,
            fuzzy: true,
        }
    }
}

impl SearchOptions {
    pub fn in_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn exact_only(mut self) -> Self {
        self.fuzzy = false;
        self
    }
}

/// One ranked search result
#[derive(Debug, Clone)]
pub struct SearchHit {
    pub metadata: ArtMetadata,
    pub entry: Arc<ArtEntry>,
    pub score: u32,
}

impl SearchHit {
    pub fn name(&self) -> &str {
        &self.metadata.name
    }
}

/// Score one entry against an already-lowercased query.
///
/// The first matching rule wins; 0 means no match.
pub fn score(query_lower: &str, metadata: &ArtMetadata, fuzzy: bool) -> u32 {
    let name = metadata.name.to_lowercase();

    if name == query_lower {
        return SCORE_EXACT;
    }
    if name.contains(query_lower) {
        return SCORE_NAME_SUBSTRING;
    }
    if metadata
        .tags
        .iter()
        .any(|tag| tag.to_lowercase().contains(query_lower))
    {
        return SCORE_TAG;
    }
    if fuzzy && levenshtein(query_lower, &name) <= fuzzy_threshold(query_lower) {
        return SCORE_FUZZY;
    }

    0
}

/// Maximum edit distance accepted for a query: floor(len * 0.3)
pub fn fuzzy_threshold(query: &str) -> usize {
    (query.chars().count() as f64 * FUZZY_TOLERANCE).floor() as usize
}

/// Score descending, then name ascending
pub fn rank(a: &SearchHit, b: &SearchHit) -> Ordering {
    b.score
        .cmp(&a.score)
        .then_with(|| a.metadata.name.cmp(&b.metadata.name))
}

/// Character-level Levenshtein distance
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev_row: Vec<usize> = (0..=b.len()).collect();
    let mut curr_row = vec![0; b.len() + 1];

    for (i, a_char) in a.iter().enumerate() {
        curr_row[0] = i + 1;

        for (j, b_char) in b.iter().enumerate() {
            let cost = usize::from(a_char != b_char);
            curr_row[j + 1] = (curr_row[j] + 1)
                .min(prev_row[j + 1] + 1)
                .min(prev_row[j] + cost);
        }

        std::mem::swap(&mut prev_row, &mut curr_row);
    }

    prev_row[b.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(category: &str, name: &str) -> ArtMetadata {
        let entry = ArtEntry::new(category, name, "x");
        ArtMetadata::generate(&entry, 0)
    }

    #[test]
    fn test_levenshtein() {
        assert_eq!(levenshtein("", "abc"), 3);
        assert_eq!(levenshtein("kitten", "sitting"), 3);
        assert_eq!(levenshtein("kat", "cat"), 1);
        assert_eq!(levenshtein("ㅅㅅ", "ㅅ"), 1);
        assert_eq!(levenshtein("same", "same"), 0);
    }

    #[test]
    fn test_threshold_floors() {
        assert_eq!(fuzzy_threshold("kat"), 0);
        assert_eq!(fuzzy_threshold("spidrman"), 2);
        assert_eq!(fuzzy_threshold("batmn"), 1);
    }

    #[test]
    fn test_rule_priority() {
        let batman = meta("superheroes", "batman");

        assert_eq!(score("batman", &batman, true), SCORE_EXACT);
        assert_eq!(score("bat", &batman, true), SCORE_NAME_SUBSTRING);
        assert_eq!(score("comic", &batman, true), SCORE_TAG);
        assert_eq!(score("batmn", &batman, true), SCORE_FUZZY);
        assert_eq!(score("batmn", &batman, false), 0);
        assert_eq!(score("python", &batman, true), 0);
    }

    #[test]
    fn test_short_query_has_no_fuzzy_slack() {
        let cat = meta("misc", "cat");
        assert_eq!(score("kat", &cat, true), 0);
    }

    #[test]
    fn test_exact_match_is_case_insensitive() {
        let entry = meta("logos", "GitHub");
        assert_eq!(score("github", &entry, false), SCORE_EXACT);
    }
}
