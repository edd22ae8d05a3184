//! One geocode cycle: cache check, dispatch loop, finalize, cache store.

use tracing::{debug, error, info, warn};

use crate::cache::CachedResult;
use crate::response::{Candidate, ResponseEnvelope};
use crate::scheduler::{Feedback, NextAvailable};
use crate::status;

use super::{Aggregator, GeocodeOutcome, GeocodeRequest};

impl Aggregator {
    /// Geocode `request.location`, returning the accepted candidate (if any)
    /// together with every provider envelope produced on the way.
    pub fn geocode(&mut self, request: &GeocodeRequest) -> GeocodeOutcome {
        let key = self.cache_key(&request.location);
        let use_cache = self.cache.is_some() && !request.no_cache;

        if use_cache {
            if let Some(outcome) = self.lookup_cached(&key) {
                return outcome;
            }
        }

        if self.registry.is_empty() {
            warn!(location = %request.location, "no providers registered");
            return GeocodeOutcome {
                candidate: None,
                status_code: status::EXHAUSTED,
                from_cache: false,
                responses: Vec::new(),
            };
        }

        let (candidate, responses) = self.dispatch(request);
        let status_code = match &candidate {
            Some(c) => c.status_code,
            None => exhausted_or_not_found(&responses),
        };

        match &candidate {
            Some(c) => info!(
                location = %request.location,
                provider = %c.provider_name,
                latitude = c.latitude,
                longitude = c.longitude,
                "accepted result"
            ),
            None => info!(location = %request.location, status = status_code, "no result"),
        }

        // 402 is transient (quota, backoff) and never cached.
        let definitive_miss = candidate.is_none() && status_code == status::NOT_FOUND;
        if use_cache && (candidate.is_some() || (self.cache_misses && definitive_miss)) {
            self.store_cached(&key, &candidate);
        }

        GeocodeOutcome {
            candidate,
            status_code,
            from_cache: false,
            responses,
        }
    }

    fn lookup_cached(&self, key: &str) -> Option<GeocodeOutcome> {
        let cache = self.cache.as_ref()?;
        let hit = match cache.get(key) {
            Ok(hit) => hit?,
            Err(e) => {
                warn!(key, error = %e, "cache lookup failed; querying providers");
                return None;
            }
        };
        debug!(key, "cache hit");
        let candidate = hit.candidate.map(|c| c.as_cached());
        let status_code = if candidate.is_some() {
            status::CACHED
        } else {
            status::NOT_FOUND
        };
        Some(GeocodeOutcome {
            candidate,
            status_code,
            from_cache: true,
            responses: Vec::new(),
        })
    }

    fn store_cached(&self, key: &str, candidate: &Option<Candidate>) {
        let Some(cache) = &self.cache else { return };
        let value = CachedResult {
            candidate: candidate.clone(),
        };
        if let Err(e) = cache.set(key, &value) {
            warn!(key, error = %e, "cache store failed");
        }
    }

    /// Dispatch loop plus the final picker call.
    fn dispatch(&mut self, request: &GeocodeRequest) -> (Option<Candidate>, Vec<ResponseEnvelope>) {
        let location = request.location.as_str();
        let mut candidates: Vec<Candidate> = Vec::new();
        let mut responses: Vec<ResponseEnvelope> = Vec::new();
        let mut accepted: Option<Candidate> = None;
        let mut idle_after_wait = false;
        let mut picked_final = false;
        // Skipped providers are never drawn, so they keep their scheduling credit.
        let not_skipped = |n: &str| !request.skip.contains(n);

        self.scheduler.reset_available();

        loop {
            let wait = match self.scheduler.next_available_where(&not_skipped) {
                NextAvailable::Done => break,
                NextAvailable::After(wait) => wait,
            };

            let waited = !wait.is_zero() && request.wait_for_retries;
            if waited {
                debug!(?wait, "waiting for a provider to leave backoff");
                self.clock.sleep(wait);
            }

            let Some(name) = self.scheduler.next_where(&not_skipped) else {
                if waited && !idle_after_wait {
                    idle_after_wait = true;
                    continue;
                }
                if wait.is_zero() || waited {
                    error!(location, "scheduler reported a pending provider but offered none");
                } else {
                    debug!(?wait, "remaining providers are backing off; not waiting");
                }
                break;
            };
            idle_after_wait = false;

            let Some(provider) = self.registry.get(&name) else {
                error!(provider = %name, "scheduler offered an unregistered provider");
                continue;
            };

            debug!(provider = %name, location, "dispatching");
            let envelope = match provider.geocode(location) {
                Ok(reply) => ResponseEnvelope::from_reply(location, &name, reply),
                Err(e) => {
                    warn!(provider = %name, error = %e, "provider call failed");
                    ResponseEnvelope::failed(location, &name, status::PROVIDER_ERROR)
                }
            };

            self.scheduler
                .process_feedback(&name, Feedback::new(envelope.status_code));

            if !envelope.is_success() {
                debug!(provider = %name, status = envelope.status_code, "unsuccessful reply");
                responses.push(envelope);
                continue;
            }

            let filtered: Vec<Candidate> = envelope
                .records
                .iter()
                .filter(|c| self.filter.accepts(c))
                .cloned()
                .collect();
            debug!(
                provider = %name,
                records = envelope.records.len(),
                kept = filtered.len(),
                "filtered reply"
            );
            responses.push(envelope);
            if filtered.is_empty() {
                continue;
            }

            let Some(picker) = &self.picker else {
                accepted = filtered.into_iter().next();
                break;
            };
            candidates.extend(filtered);
            let more_available = !self
                .scheduler
                .next_available_where(&not_skipped)
                .is_done();
            picked_final = !more_available;
            if let Some(choice) = picker.pick(&candidates, more_available) {
                accepted = Some(choice);
                break;
            }
        }

        // The picker sees `more_available == false` exactly once.
        if accepted.is_none() && !picked_final {
            if let Some(picker) = &self.picker {
                accepted = picker.pick(&candidates, false);
            }
        }
        (accepted, responses)
    }
}

/// 401 if any provider gave a definitive answer, else 402.
fn exhausted_or_not_found(responses: &[ResponseEnvelope]) -> u16 {
    let answered = responses
        .iter()
        .any(|r| r.is_success() || r.status_code == status::NOT_FOUND);
    if answered {
        status::NOT_FOUND
    } else {
        status::EXHAUSTED
    }
}
