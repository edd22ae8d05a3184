//! Location string normalization used for cache keys and fixture lookups.

use std::sync::Arc;

/// Maps a raw location string to a canonical cache key.
pub type Normalizer = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Lowercase, trim, and collapse internal whitespace runs to single spaces.
pub fn canonical_location(raw: &str) -> String {
    raw.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// The built-in normalizer as a [`Normalizer`].
pub fn default_normalizer() -> Normalizer {
    Arc::new(canonical_location)
}
