//! geomux core: fan a geocoding query out over several providers, one at a
//! time, until a filtered candidate satisfies the configured picker.

pub mod aggregator;
pub mod backoff;
pub mod cache;
pub mod config;
pub mod error;
pub mod logging;
pub mod normalize;
pub mod pipeline;
pub mod provider;
pub mod response;
pub mod scheduler;
pub mod status;

pub use aggregator::{Aggregator, AggregatorBuilder, GeocodeOutcome, GeocodeRequest};
pub use response::{Candidate, ResponseEnvelope};
