//! Error types surfaced by configuration and construction.

use crate::cache::CacheError;

/// Invalid configuration value: rejected when configuring, never mid-request.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("unknown scheduler {0:?} (expected ordered_list, weighted_round_robin, or weighted_random)")]
    UnknownScheduler(String),
    #[error("unknown filter preset {0:?} (expected all, min_precision:<t>, or country:<name>)")]
    UnknownFilter(String),
    #[error("unknown picker preset {0:?} (expected first, max_precision, or consensus:<n>:<nearness>)")]
    UnknownPicker(String),
    #[error("invalid parameter in preset {preset:?}: {reason}")]
    InvalidParameter { preset: String, reason: String },
}

/// Failure while assembling an [`crate::aggregator::Aggregator`].
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("cache failed its round-trip self-test")]
    CacheSelfTest(#[source] CacheError),
}
