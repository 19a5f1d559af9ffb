//! Popularity scores for art entries.
//!
//! The catalog asks a provider once per newly seen entry and persists the
//! answer in the metadata snapshot, so scores stay stable until the cache
//! expires or the catalog is refreshed.

use std::collections::HashMap;
use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::domain::{ArtKey, MAX_POPULARITY};

/// Supplies a popularity score (0-99) for an entry
pub trait PopularityProvider: Send + Sync {
    fn popularity(&self, key: &ArtKey) -> u8;
}

/// Uniform random draw in 0..=99
#[derive(Debug, Default)]
pub struct RandomPopularity {
    /// Seeded generator for reproducible draws; thread RNG otherwise
    seeded: Option<Mutex<StdRng>>,
}

impl RandomPopularity {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reproducible draws from a fixed seed
    pub fn seeded(seed: u64) -> Self {
        Self {
            seeded: Some(Mutex::new(StdRng::seed_from_u64(seed))),
        }
    }
}

impl PopularityProvider for RandomPopularity {
    fn popularity(&self, _key: &ArtKey) -> u8 {
        let range = 0..=MAX_POPULARITY;
        match &self.seeded {
            Some(rng) => match rng.lock() {
                Ok(mut rng) => rng.random_range(range),
                Err(poisoned) => poisoned.into_inner().random_range(range),
            },
            None => rand::rng().random_range(range),
        }
    }
}

/// Fixed scores per key, with a default for unknown keys
#[derive(Debug, Clone, Default)]
pub struct FixedPopularity {
    scores: HashMap<ArtKey, u8>,
    default: u8,
}

impl FixedPopularity {
    pub fn new(default: u8) -> Self {
        Self {
            scores: HashMap::new(),
            default: default.min(MAX_POPULARITY),
        }
    }

    pub fn with_score(mut self, key: ArtKey, score: u8) -> Self {
        self.scores.insert(key, score.min(MAX_POPULARITY));
        self
    }
}

impl PopularityProvider for FixedPopularity {
    fn popularity(&self, key: &ArtKey) -> u8 {
        self.scores.get(key).copied().unwrap_or(self.default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_popularity_in_range() {
        let provider = RandomPopularity::new();
        let key = ArtKey::new("animals", "cat");

        for _ in 0..500 {
            assert!(provider.popularity(&key) <= MAX_POPULARITY);
        }
    }

    #[test]
    fn test_seeded_popularity_is_reproducible() {
        let key = ArtKey::new("animals", "cat");
        let a = RandomPopularity::seeded(7);
        let b = RandomPopularity::seeded(7);

        let first: Vec<u8> = (0..10).map(|_| a.popularity(&key)).collect();
        let second: Vec<u8> = (0..10).map(|_| b.popularity(&key)).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_fixed_popularity() {
        let provider = FixedPopularity::new(5)
            .with_score(ArtKey::new("animals", "cat"), 90)
            .with_score(ArtKey::new("animals", "dog"), 200);

        assert_eq!(provider.popularity(&ArtKey::new("animals", "cat")), 90);
        assert_eq!(provider.popularity(&ArtKey::new("animals", "dog")), MAX_POPULARITY);
        assert_eq!(provider.popularity(&ArtKey::new("logos", "rust")), 5);
    }
}
