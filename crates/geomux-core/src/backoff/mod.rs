//! Per-provider failure backoff.
//!
//! This module holds the exponential backoff policy and the per-provider
//! bookkeeping it drives. The Selective scheduler decorator owns a
//! [`BackoffTable`] and consults it to keep failing providers out of rotation
//! until their timeout has passed.

mod entry;
mod policy;
mod table;

pub use entry::BackoffEntry;
pub use policy::BackoffPolicy;
pub use table::BackoffTable;
