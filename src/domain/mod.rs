//! Domain types for the art catalog.
//!
//! - ArtEntry: Immutable text art loaded from storage
//! - ArtMetadata: Derived tags, description, difficulty and popularity

pub mod art;
pub mod metadata;

// Re-export commonly used types
pub use art::{ArtEntry, ArtKey};
pub use metadata::{ArtMetadata, MAX_DIFFICULTY, MAX_POPULARITY};
