//! Pickers: decide when the accumulated candidates are good enough.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::error::ConfigError;
use crate::response::Candidate;

use super::{best_by_precision, split_preset};

/// Custom picker callback: `(candidates_so_far, more_available) -> choice`.
pub type PickerFn = Arc<dyn Fn(&[Candidate], bool) -> Option<Candidate> + Send + Sync>;

const DEFAULT_CONSENSUS: usize = 2;
const DEFAULT_NEARNESS: f64 = 0.1;

/// Decision procedure over the candidates accumulated so far.
///
/// Returning `None` asks for more data. The aggregator calls the picker
/// after every attempt that produced filtered candidates and once more with
/// `more_available = false` when providers run out.
#[derive(Clone, Default)]
pub enum Picker {
    /// Take the first candidate offered.
    #[default]
    First,
    /// Wait for every provider, then take the most precise candidate.
    MaxPrecision,
    /// Accept once `required` candidates agree within a square of half-width
    /// `nearness` degrees.
    Consensus { required: usize, nearness: f64 },
    Custom(PickerFn),
}

impl Picker {
    pub fn consensus(required: usize, nearness: f64) -> Self {
        Picker::Consensus { required, nearness }
    }

    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(&[Candidate], bool) -> Option<Candidate> + Send + Sync + 'static,
    {
        Picker::Custom(Arc::new(f))
    }

    pub fn pick(&self, candidates: &[Candidate], more_available: bool) -> Option<Candidate> {
        match self {
            Picker::First => candidates.first().cloned(),
            Picker::MaxPrecision => {
                if more_available {
                    return None;
                }
                best_by_precision(candidates).cloned()
            }
            Picker::Consensus { required, nearness } => {
                consensus(candidates, *required, *nearness).cloned()
            }
            Picker::Custom(f) => f(candidates, more_available),
        }
    }
}

/// First sufficient cluster in candidate order wins; its most precise member
/// is returned. Quadratic, but the list is bounded by the provider count.
fn consensus(candidates: &[Candidate], required: usize, nearness: f64) -> Option<&Candidate> {
    let near = |a: &Candidate, b: &Candidate| {
        (b.latitude - a.latitude).abs() < nearness && (b.longitude - a.longitude).abs() < nearness
    };
    candidates.iter().find_map(|center| {
        let cluster: Vec<&Candidate> = candidates.iter().filter(|c| near(center, c)).collect();
        if cluster.len() >= required {
            best_by_precision(cluster)
        } else {
            None
        }
    })
}

impl FromStr for Picker {
    type Err = ConfigError;

    /// Presets: `""`/`"first"`, `"max_precision"`,
    /// `"consensus[:<required>[:<nearness>]]"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, args) = split_preset(s);
        let invalid = |reason: String| ConfigError::InvalidParameter {
            preset: s.to_string(),
            reason,
        };
        match (name.as_str(), args.as_slice()) {
            ("" | "first", []) => Ok(Picker::First),
            ("max_precision", []) => Ok(Picker::MaxPrecision),
            ("consensus", rest) if rest.len() <= 2 => {
                let required = match rest.first() {
                    Some(r) => r
                        .parse::<usize>()
                        .map_err(|_| invalid(format!("{r:?} is not a count")))?,
                    None => DEFAULT_CONSENSUS,
                };
                let nearness = match rest.get(1) {
                    Some(n) => n
                        .parse::<f64>()
                        .map_err(|_| invalid(format!("{n:?} is not a number")))?,
                    None => DEFAULT_NEARNESS,
                };
                if required == 0 {
                    return Err(invalid("required consensus must be at least 1".to_string()));
                }
                if !(nearness.is_finite() && nearness > 0.0) {
                    return Err(invalid("nearness must be a positive number".to_string()));
                }
                Ok(Picker::Consensus { required, nearness })
            }
            _ => Err(ConfigError::UnknownPicker(s.to_string())),
        }
    }
}

impl fmt::Debug for Picker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Picker::First => write!(f, "First"),
            Picker::MaxPrecision => write!(f, "MaxPrecision"),
            Picker::Consensus { required, nearness } => {
                write!(f, "Consensus {{ required: {required}, nearness: {nearness} }}")
            }
            Picker::Custom(_) => write!(f, "Custom(..)"),
        }
    }
}
