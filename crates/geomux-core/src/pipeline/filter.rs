//! Candidate filters.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::error::ConfigError;
use crate::response::Candidate;

use super::split_preset;

/// Custom filter callback.
pub type FilterFn = Arc<dyn Fn(&Candidate) -> bool + Send + Sync>;

/// Predicate deciding whether a candidate may reach the picker.
#[derive(Clone, Default)]
pub enum CandidateFilter {
    /// Accept everything.
    #[default]
    AcceptAll,
    /// Reject unknown precision and anything below the threshold.
    MinPrecision(f64),
    /// Reject candidates whose country is not exactly this string.
    Country(String),
    Custom(FilterFn),
}

impl CandidateFilter {
    pub fn min_precision(threshold: f64) -> Self {
        CandidateFilter::MinPrecision(threshold)
    }

    pub fn country(name: impl Into<String>) -> Self {
        CandidateFilter::Country(name.into())
    }

    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(&Candidate) -> bool + Send + Sync + 'static,
    {
        CandidateFilter::Custom(Arc::new(f))
    }

    pub fn accepts(&self, candidate: &Candidate) -> bool {
        match self {
            CandidateFilter::AcceptAll => true,
            CandidateFilter::MinPrecision(t) => candidate.precision.is_some_and(|p| p >= *t),
            CandidateFilter::Country(name) => candidate.country.as_deref() == Some(name.as_str()),
            CandidateFilter::Custom(f) => f(candidate),
        }
    }
}

impl FromStr for CandidateFilter {
    type Err = ConfigError;

    /// Presets: `""`/`"all"`, `"min_precision:<t>"`, `"country:<name>"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, args) = split_preset(s);
        match (name.as_str(), args.as_slice()) {
            ("" | "all", []) => Ok(CandidateFilter::AcceptAll),
            ("min_precision", [t]) => {
                let threshold: f64 = t.parse().map_err(|_| ConfigError::InvalidParameter {
                    preset: s.to_string(),
                    reason: format!("{t:?} is not a number"),
                })?;
                if !(0.0..=1.0).contains(&threshold) {
                    return Err(ConfigError::InvalidParameter {
                        preset: s.to_string(),
                        reason: "threshold must be within [0, 1]".to_string(),
                    });
                }
                Ok(CandidateFilter::MinPrecision(threshold))
            }
            // Country names are matched verbatim, so take the raw remainder.
            ("country", [_, ..]) => {
                let raw = s.trim().split_once(':').map(|(_, rest)| rest.trim()).unwrap_or("");
                if raw.is_empty() {
                    return Err(ConfigError::InvalidParameter {
                        preset: s.to_string(),
                        reason: "country name is empty".to_string(),
                    });
                }
                Ok(CandidateFilter::Country(raw.to_string()))
            }
            _ => Err(ConfigError::UnknownFilter(s.to_string())),
        }
    }
}

impl fmt::Debug for CandidateFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CandidateFilter::AcceptAll => write!(f, "AcceptAll"),
            CandidateFilter::MinPrecision(t) => write!(f, "MinPrecision({t})"),
            CandidateFilter::Country(c) => write!(f, "Country({c:?})"),
            CandidateFilter::Custom(_) => write!(f, "Custom(..)"),
        }
    }
}
