//! Candidate pipeline: a stateless filter followed by a picker that decides
//! when enough evidence has accumulated to stop querying providers.

mod filter;
mod picker;

pub use filter::{CandidateFilter, FilterFn};
pub use picker::{Picker, PickerFn};

use crate::response::Candidate;

/// First candidate with the highest precision; unknown precision ranks lowest.
pub(crate) fn best_by_precision<'a, I>(candidates: I) -> Option<&'a Candidate>
where
    I: IntoIterator<Item = &'a Candidate>,
{
    let mut best: Option<&Candidate> = None;
    for c in candidates {
        match best {
            Some(b) if c.rank() <= b.rank() => {}
            _ => best = Some(c),
        }
    }
    best
}

/// Split `"name:arg:arg"` into the lowercase name and its arguments.
fn split_preset(s: &str) -> (String, Vec<&str>) {
    let mut parts = s.trim().split(':');
    let name = parts.next().unwrap_or("").trim().to_ascii_lowercase();
    (name, parts.map(str::trim).collect())
}
