//! CLI command handlers. Each command is in its own file.

mod completions;
mod geocode;
mod providers;

pub use completions::run_completions;
pub use geocode::{run_geocode, GeocodeArgs};
pub use providers::run_providers;
