//! Orchestrator behaviour against stub providers.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::*;
use crate::cache::{CacheError, CachedResult, MemoryCache};
use crate::normalize::default_normalizer;
use crate::provider::{ProviderError, ProviderRecord, ProviderReply};
use crate::scheduler::ManualClock;
use crate::status;

type Answer = Box<dyn Fn(usize) -> Result<ProviderReply, ProviderError> + Send + Sync>;

/// Answers by call index (0-based).
struct Stub {
    name: String,
    limit: u32,
    calls: Arc<AtomicUsize>,
    answer: Answer,
}

impl Provider for Stub {
    fn name(&self) -> &str {
        &self.name
    }

    fn daily_limit(&self) -> u32 {
        self.limit
    }

    fn geocode(&self, _location: &str) -> Result<ProviderReply, ProviderError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        (self.answer)(n)
    }
}

fn stub<F>(name: &str, limit: u32, answer: F) -> (Box<dyn Provider>, Arc<AtomicUsize>)
where
    F: Fn(usize) -> Result<ProviderReply, ProviderError> + Send + Sync + 'static,
{
    let calls = Arc::new(AtomicUsize::new(0));
    let p = Stub {
        name: name.to_string(),
        limit,
        calls: Arc::clone(&calls),
        answer: Box::new(answer),
    };
    (Box::new(p), calls)
}

fn found(lat: f64, lon: f64, precision: Option<f64>) -> ProviderReply {
    ProviderReply::found(vec![ProviderRecord {
        address: Some(format!("{lat},{lon}")),
        country: Some("Norway".to_string()),
        latitude: Some(lat),
        longitude: Some(lon),
        precision,
    }])
}

fn at(lat: f64, lon: f64, precision: Option<f64>) -> impl Fn(usize) -> Result<ProviderReply, ProviderError> {
    move |_| Ok(found(lat, lon, precision))
}

fn replying(reply: ProviderReply) -> impl Fn(usize) -> Result<ProviderReply, ProviderError> {
    move |_| Ok(reply.clone())
}

fn failing(_: usize) -> Result<ProviderReply, ProviderError> {
    Err(ProviderError::Other("down".to_string()))
}

fn calls(counter: &AtomicUsize) -> usize {
    counter.load(Ordering::SeqCst)
}

fn ordered() -> Aggregator {
    Aggregator::builder()
        .scheduler(SchedulerKind::OrderedList)
        .build()
        .unwrap()
}

/// Picker that always declines and records `(candidates, more_available)`.
fn recording_picker() -> (Picker, Arc<Mutex<Vec<(usize, bool)>>>) {
    let log = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&log);
    let picker = Picker::custom(move |candidates, more| {
        sink.lock().unwrap().push((candidates.len(), more));
        None
    });
    (picker, log)
}

#[test]
fn without_picker_first_filtered_candidate_wins() {
    let mut agg = ordered();
    let (a, a_calls) = stub("a", 100, at(1.0, 2.0, Some(0.5)));
    let (b, b_calls) = stub("b", 10, at(3.0, 4.0, Some(1.0)));
    agg.add_provider(a);
    agg.add_provider(b);

    let out = agg.geocode(&GeocodeRequest::new("oslo"));
    let c = out.candidate.expect("candidate");
    assert_eq!(c.provider_name, "a");
    assert_eq!(out.status_code, status::OK);
    assert!(!out.from_cache);
    assert_eq!(calls(&a_calls), 1);
    assert_eq!(calls(&b_calls), 0);
}

#[test]
fn unsuccessful_replies_move_on_to_the_next_provider() {
    let mut agg = ordered();
    let (a, _) = stub("a", 100, replying(ProviderReply::status(status::EXHAUSTED)));
    let (b, _) = stub("b", 50, failing);
    let (c, _) = stub("c", 10, at(1.0, 1.0, None));
    agg.add_provider(a);
    agg.add_provider(b);
    agg.add_provider(c);

    let out = agg.geocode(&GeocodeRequest::new("x"));
    assert_eq!(out.candidate.unwrap().provider_name, "c");
    let codes: Vec<u16> = out.responses.iter().map(|r| r.status_code).collect();
    assert_eq!(codes, [status::EXHAUSTED, status::PROVIDER_ERROR, status::OK]);
}

#[test]
fn picker_accumulates_candidates_across_providers() {
    let mut agg = ordered();
    agg.set_picker(Picker::consensus(2, 0.1));
    let (a, _) = stub("a", 100, at(0.0, 0.0, Some(0.3)));
    let (b, _) = stub("b", 50, at(9.0, 9.0, Some(1.0)));
    let (c, _) = stub("c", 20, at(0.05, 0.05, Some(0.8)));
    let (d, d_calls) = stub("d", 10, at(0.0, 0.0, Some(0.9)));
    for p in [a, b, c, d] {
        agg.add_provider(p);
    }

    let out = agg.geocode(&GeocodeRequest::new("x"));
    assert_eq!(out.candidate.unwrap().provider_name, "c");
    assert_eq!(out.responses.len(), 3);
    assert_eq!(calls(&d_calls), 0);
}

#[test]
fn max_precision_picks_on_the_final_call() {
    let mut agg = ordered();
    agg.set_picker_preset("max_precision").unwrap();
    let (a, _) = stub("a", 100, at(0.0, 0.0, Some(0.4)));
    let (b, _) = stub("b", 50, at(0.0, 0.0, Some(0.9)));
    let (c, _) = stub("c", 10, at(0.0, 0.0, Some(0.2)));
    for p in [a, b, c] {
        agg.add_provider(p);
    }
    let out = agg.geocode(&GeocodeRequest::new("x"));
    assert_eq!(out.candidate.unwrap().provider_name, "b");
    assert_eq!(out.responses.len(), 3);
}

#[test]
fn picker_gets_a_final_call_even_without_candidates() {
    let mut agg = ordered();
    let (picker, log) = recording_picker();
    agg.set_picker(picker);
    let (a, _) = stub("a", 100, failing);
    let (b, _) = stub("b", 10, replying(ProviderReply::status(status::EXHAUSTED)));
    agg.add_provider(a);
    agg.add_provider(b);

    let out = agg.geocode(&GeocodeRequest::new("x"));
    assert!(out.candidate.is_none());
    assert_eq!(*log.lock().unwrap(), [(0, false)]);
}

#[test]
fn picker_sees_more_available_until_the_last_provider() {
    let mut agg = ordered();
    let (picker, log) = recording_picker();
    agg.set_picker(picker);
    let (a, _) = stub("a", 100, at(1.0, 1.0, None));
    let (b, _) = stub("b", 10, at(2.0, 2.0, None));
    agg.add_provider(a);
    agg.add_provider(b);

    let out = agg.geocode(&GeocodeRequest::new("x"));
    assert!(out.candidate.is_none());
    assert_eq!(*log.lock().unwrap(), [(1, true), (2, false)]);
}

#[test]
fn skipped_providers_are_not_called() {
    let mut agg = ordered();
    let (a, a_calls) = stub("a", 100, at(1.0, 1.0, None));
    let (b, _) = stub("b", 10, at(2.0, 2.0, None));
    agg.add_provider(a);
    agg.add_provider(b);

    let out = agg.geocode(&GeocodeRequest::new("x").skip("a"));
    assert_eq!(out.candidate.unwrap().provider_name, "b");
    assert_eq!(calls(&a_calls), 0);
    assert_eq!(out.responses.len(), 1);
}

#[test]
fn skipping_does_not_spend_round_robin_credit() {
    let mut agg = Aggregator::builder()
        .scheduler(SchedulerKind::WeightedRoundRobin)
        .build()
        .unwrap();
    for (name, lat) in [("a", 1.0), ("b", 2.0), ("c", 3.0)] {
        let (p, _) = stub(name, 1, at(lat, lat, None));
        agg.add_provider(p);
    }

    let mut served = Vec::new();
    for skip_b in [false, true, false, false] {
        let mut req = GeocodeRequest::new("x");
        if skip_b {
            req = req.skip("b");
        }
        served.push(agg.geocode(&req).candidate.unwrap().provider_name);
    }
    // b kept its credit through the skipped request and is served next.
    assert_eq!(served, ["a", "c", "b", "a"]);
}

#[test]
fn all_providers_skipped_ends_without_calls() {
    let mut agg = ordered();
    let (a, a_calls) = stub("a", 100, at(1.0, 1.0, None));
    agg.add_provider(a);
    let out = agg.geocode(&GeocodeRequest::new("x").skip("a"));
    assert!(out.candidate.is_none());
    assert!(out.responses.is_empty());
    assert_eq!(out.status_code, status::EXHAUSTED);
    assert_eq!(calls(&a_calls), 0);
}

#[test]
fn duplicate_names_keep_the_first_registration() {
    let mut agg = ordered();
    let (first, first_calls) = stub("a", 10, at(1.0, 1.0, None));
    let (second, second_calls) = stub("a", 100, at(2.0, 2.0, None));
    assert!(agg.add_provider(first));
    assert!(!agg.add_provider(second));
    assert_eq!(agg.providers().len(), 1);

    agg.geocode(&GeocodeRequest::new("x"));
    assert_eq!(calls(&first_calls), 1);
    assert_eq!(calls(&second_calls), 0);
}

#[test]
fn no_providers_yields_exhausted() {
    let mut agg = ordered();
    let out = agg.geocode(&GeocodeRequest::new("x"));
    assert!(out.candidate.is_none());
    assert_eq!(out.status_code, status::EXHAUSTED);
}

#[test]
fn empty_answers_report_not_found() {
    let mut agg = ordered();
    let (a, _) = stub("a", 10, replying(ProviderReply::found(vec![])));
    agg.add_provider(a);
    let out = agg.geocode(&GeocodeRequest::new("atlantis"));
    assert!(out.candidate.is_none());
    assert_eq!(out.status_code, status::NOT_FOUND);
}

#[test]
fn cache_key_uses_normalizer() {
    let agg = Aggregator::builder()
        .location_normalizer(default_normalizer())
        .build()
        .unwrap();
    assert_eq!(agg.cache_key("  Oslo   Sentrum "), "oslo sentrum");
    assert_eq!(ordered().cache_key(" Oslo "), " Oslo ");
}

#[test]
fn misses_are_cached_only_when_enabled() {
    let cache = Arc::new(MemoryCache::new());
    let mut agg = Aggregator::builder()
        .cache(Box::new(Arc::clone(&cache)))
        .build()
        .unwrap();
    let (a, a_calls) = stub("a", 10, replying(ProviderReply::found(vec![])));
    agg.add_provider(a);
    agg.geocode(&GeocodeRequest::new("nowhere"));
    agg.geocode(&GeocodeRequest::new("nowhere"));
    assert_eq!(calls(&a_calls), 2);
    assert!(cache.get("nowhere").unwrap().is_none());

    let cache = Arc::new(MemoryCache::new());
    let mut agg = Aggregator::builder()
        .cache(Box::new(Arc::clone(&cache)))
        .cache_misses(true)
        .build()
        .unwrap();
    let (a, a_calls) = stub("a", 10, replying(ProviderReply::found(vec![])));
    agg.add_provider(a);
    agg.geocode(&GeocodeRequest::new("nowhere"));
    let second = agg.geocode(&GeocodeRequest::new("nowhere"));
    assert_eq!(calls(&a_calls), 1);
    assert!(second.from_cache);
    assert!(second.candidate.is_none());
    assert_eq!(second.status_code, status::NOT_FOUND);
    assert_eq!(cache.get("nowhere").unwrap(), Some(CachedResult { candidate: None }));
}

#[test]
fn exhausted_outcome_is_never_cached_as_a_miss() {
    let cache = Arc::new(MemoryCache::new());
    let mut agg = Aggregator::builder()
        .cache(Box::new(Arc::clone(&cache)))
        .cache_misses(true)
        .build()
        .unwrap();
    let (a, a_calls) = stub("a", 10, |n| {
        if n == 0 {
            Ok(ProviderReply::status(status::EXHAUSTED))
        } else {
            Ok(found(1.0, 1.0, None))
        }
    });
    agg.add_provider(a);

    let first = agg.geocode(&GeocodeRequest::new("x"));
    assert_eq!(first.status_code, status::EXHAUSTED);
    assert!(cache.get("x").unwrap().is_none());

    let second = agg.geocode(&GeocodeRequest::new("x"));
    assert!(!second.from_cache);
    assert_eq!(second.status_code, status::OK);
    assert!(second.candidate.is_some());
    assert_eq!(calls(&a_calls), 2);
}

#[test]
fn no_cache_bypasses_lookup_and_store() {
    let cache = Arc::new(MemoryCache::new());
    let mut agg = Aggregator::builder()
        .cache(Box::new(Arc::clone(&cache)))
        .build()
        .unwrap();
    let (a, a_calls) = stub("a", 10, at(1.0, 1.0, None));
    agg.add_provider(a);
    let out = agg.geocode(&GeocodeRequest::new("oslo").no_cache(true));
    assert_eq!(out.status_code, status::OK);
    assert!(cache.get("oslo").unwrap().is_none());
    agg.geocode(&GeocodeRequest::new("oslo"));
    agg.geocode(&GeocodeRequest::new("oslo").no_cache(true));
    assert_eq!(calls(&a_calls), 3);
}

#[test]
fn broken_cache_fails_the_build() {
    struct Broken;
    impl GeocodeCache for Broken {
        fn get(&self, _key: &str) -> Result<Option<CachedResult>, CacheError> {
            Ok(None)
        }
        fn set(&self, _key: &str, _value: &CachedResult) -> Result<(), CacheError> {
            Err(CacheError::Poisoned)
        }
        fn remove(&self, _key: &str) -> Result<(), CacheError> {
            Ok(())
        }
    }
    let err = Aggregator::builder().cache(Box::new(Broken)).build().unwrap_err();
    assert!(matches!(err, BuildError::CacheSelfTest(CacheError::Poisoned)));
}

#[test]
fn backed_off_provider_is_waited_for_only_on_request() {
    let clock = Arc::new(ManualClock::new());
    let mut agg = Aggregator::builder()
        .scheduler(SchedulerKind::OrderedList)
        .use_timeouts(true)
        .backoff(BackoffPolicy::new(Duration::from_secs(10), Duration::from_secs(80)))
        .clock(clock.clone())
        .build()
        .unwrap();
    let (a, a_calls) = stub("a", 10, |n| {
        if n == 0 {
            failing(n)
        } else {
            Ok(found(1.0, 1.0, None))
        }
    });
    agg.add_provider(a);

    let first = agg.geocode(&GeocodeRequest::new("x"));
    assert_eq!(first.status_code, status::EXHAUSTED);
    assert_eq!(calls(&a_calls), 1);

    let impatient = agg.geocode(&GeocodeRequest::new("x"));
    assert!(impatient.candidate.is_none());
    assert!(impatient.responses.is_empty());
    assert_eq!(impatient.status_code, status::EXHAUSTED);
    assert_eq!(calls(&a_calls), 1);

    let start = clock.now();
    let patient = agg.geocode(&GeocodeRequest::new("x").wait_for_retries(true));
    assert_eq!(patient.candidate.unwrap().provider_name, "a");
    assert_eq!(clock.now() - start, Duration::from_secs(10));
    assert_eq!(calls(&a_calls), 2);
}
