//! Provider scheduling.
//!
//! A [`Scheduler`] decides which provider the aggregator tries next within
//! one request cycle. Three base policies are provided (strict priority,
//! weighted round robin, weighted random) plus two decorators that compose
//! over any scheduler:
//!
//! - [`Unique`] guarantees a provider is offered at most once per cycle.
//! - [`Selective`] keeps providers in exponential backoff out of rotation.
//!
//! [`build`] assembles the stack the aggregator uses.

mod clock;
mod cycle;
mod ordered;
mod random;
mod round_robin;
mod selective;
mod unique;

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::backoff::BackoffPolicy;
use crate::status;

pub use clock::{Clock, ManualClock, SystemClock};
pub use ordered::OrderedList;
pub use random::WeightedRandom;
pub use round_robin::WeightedRoundRobin;
pub use selective::Selective;
pub use unique::Unique;

/// A provider as the scheduler sees it: a name and a positive weight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderDescriptor {
    pub name: String,
    pub weight: u32,
}

impl ProviderDescriptor {
    pub fn new(name: impl Into<String>, weight: u32) -> Self {
        Self {
            name: name.into(),
            weight: weight.max(1),
        }
    }
}

/// Answer to "when could the next provider be tried?".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextAvailable {
    /// Some provider becomes eligible after this wait (zero = now).
    After(Duration),
    /// No provider can become eligible again this cycle.
    Done,
}

impl NextAvailable {
    pub fn is_done(&self) -> bool {
        matches!(self, NextAvailable::Done)
    }
}

/// Outcome of one provider attempt, reported back to the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Feedback {
    pub status_code: u16,
}

impl Feedback {
    pub fn new(status_code: u16) -> Self {
        Self { status_code }
    }

    pub fn is_success(&self) -> bool {
        status::is_success(self.status_code)
    }
}

/// Scheduling policy over a fixed provider set.
///
/// Within one cycle (between two `reset_available` calls) a name is
/// returned by `get_next_unique` / `next_where` at most once.
pub trait Scheduler: Send {
    /// Replace the provider set. Called whenever a provider is registered.
    fn set_providers(&mut self, providers: &[ProviderDescriptor]);

    /// Start a new cycle. Must be called once at the start of each request.
    fn reset_available(&mut self);

    /// Providers not yet offered this cycle, in provider order.
    fn pending(&self) -> Vec<String>;

    /// Minimum wait before a not-yet-offered provider may be eligible.
    fn next_available(&self) -> NextAvailable {
        self.next_available_where(&|_| true)
    }

    /// Like [`Scheduler::next_available`], counting only names `eligible` accepts.
    fn next_available_where(&self, eligible: &dyn Fn(&str) -> bool) -> NextAvailable {
        if self.pending().iter().any(|n| eligible(n)) {
            NextAvailable::After(Duration::ZERO)
        } else {
            NextAvailable::Done
        }
    }

    /// Next provider to try, restricted to names `eligible` accepts.
    ///
    /// Decorators pass their own constraints down through `eligible`.
    fn next_where(&mut self, eligible: &dyn Fn(&str) -> bool) -> Option<String>;

    /// Next provider to try, or `None` if nothing can be offered right now.
    fn get_next_unique(&mut self) -> Option<String> {
        self.next_where(&|_| true)
    }

    /// Tell the scheduler how the last attempt against `provider` went.
    fn process_feedback(&mut self, _provider: &str, _feedback: Feedback) {}
}

impl<S: Scheduler + ?Sized> Scheduler for Box<S> {
    fn set_providers(&mut self, providers: &[ProviderDescriptor]) {
        (**self).set_providers(providers)
    }

    fn reset_available(&mut self) {
        (**self).reset_available()
    }

    fn pending(&self) -> Vec<String> {
        (**self).pending()
    }

    fn next_available(&self) -> NextAvailable {
        (**self).next_available()
    }

    fn next_available_where(&self, eligible: &dyn Fn(&str) -> bool) -> NextAvailable {
        (**self).next_available_where(eligible)
    }

    fn next_where(&mut self, eligible: &dyn Fn(&str) -> bool) -> Option<String> {
        (**self).next_where(eligible)
    }

    fn get_next_unique(&mut self) -> Option<String> {
        (**self).get_next_unique()
    }

    fn process_feedback(&mut self, provider: &str, feedback: Feedback) {
        (**self).process_feedback(provider, feedback)
    }
}

/// Which base policy to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchedulerKind {
    OrderedList,
    #[default]
    WeightedRoundRobin,
    WeightedRandom,
}

impl SchedulerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SchedulerKind::OrderedList => "ordered_list",
            SchedulerKind::WeightedRoundRobin => "weighted_round_robin",
            SchedulerKind::WeightedRandom => "weighted_random",
        }
    }
}

impl FromStr for SchedulerKind {
    type Err = crate::error::ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "ordered_list" | "ordered" => Ok(SchedulerKind::OrderedList),
            "weighted_round_robin" | "wrr" => Ok(SchedulerKind::WeightedRoundRobin),
            "weighted_random" | "random" => Ok(SchedulerKind::WeightedRandom),
            _ => Err(crate::error::ConfigError::UnknownScheduler(s.to_string())),
        }
    }
}

impl std::fmt::Display for SchedulerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Assemble the scheduler stack: base policy, wrapped in [`Unique`], and in
/// [`Selective`] when `use_timeouts` is set.
pub fn build(
    kind: SchedulerKind,
    use_timeouts: bool,
    backoff: BackoffPolicy,
    clock: Arc<dyn Clock>,
) -> Box<dyn Scheduler> {
    let base: Box<dyn Scheduler> = match kind {
        SchedulerKind::OrderedList => Box::new(OrderedList::new()),
        SchedulerKind::WeightedRoundRobin => Box::new(WeightedRoundRobin::new()),
        SchedulerKind::WeightedRandom => Box::new(WeightedRandom::new()),
    };
    let unique = Unique::new(base);
    if use_timeouts {
        Box::new(Selective::new(unique, backoff, clock))
    } else {
        Box::new(unique)
    }
}
