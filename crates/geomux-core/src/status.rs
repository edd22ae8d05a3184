//! Result status codes surfaced on envelopes, candidates, and outcomes.

/// Provider answered with at least one usable record.
pub const OK: u16 = 200;
/// Result was served from the cache instead of a provider.
pub const CACHED: u16 = 210;
/// No location found for the query.
pub const NOT_FOUND: u16 = 401;
/// Every provider was out of quota, backing off, or failing.
pub const EXHAUSTED: u16 = 402;
/// Provider call raised an error instead of returning a reply.
pub const PROVIDER_ERROR: u16 = 500;

/// Whether a status code belongs to the success class (2xx).
pub fn is_success(code: u16) -> bool {
    (200..300).contains(&code)
}

/// Map an HTTP status from a provider endpoint to an envelope status.
///
/// Quota signals (402, 429) collapse to [`EXHAUSTED`] so backoff treats them
/// the same way; everything else passes through unchanged.
pub fn from_http(code: u32) -> u16 {
    match code {
        402 | 429 => EXHAUSTED,
        c => u16::try_from(c).unwrap_or(PROVIDER_ERROR),
    }
}
