//! Provider whose replies are scripted up front.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use geomux_core::provider::{Provider, ProviderError, ProviderRecord, ProviderReply};

#[derive(Clone)]
pub enum Step {
    Reply(ProviderReply),
    Fail,
}

pub struct Scripted {
    name: String,
    limit: u32,
    steps: Mutex<VecDeque<Step>>,
    fallback: Step,
    calls: Arc<AtomicUsize>,
}

impl Provider for Scripted {
    fn name(&self) -> &str {
        &self.name
    }

    fn daily_limit(&self) -> u32 {
        self.limit
    }

    fn geocode(&self, _location: &str) -> Result<ProviderReply, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let step = self
            .steps
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone());
        match step {
            Step::Reply(r) => Ok(r),
            Step::Fail => Err(ProviderError::Other("scripted failure".to_string())),
        }
    }
}

/// Provider answering `fallback` forever; returns it with a call counter.
pub fn always(name: &str, limit: u32, fallback: Step) -> (Box<dyn Provider>, Arc<AtomicUsize>) {
    script(name, limit, Vec::new(), fallback)
}

/// Provider answering `steps` in order, then `fallback`.
pub fn script(
    name: &str,
    limit: u32,
    steps: Vec<Step>,
    fallback: Step,
) -> (Box<dyn Provider>, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let provider = Scripted {
        name: name.to_string(),
        limit,
        steps: Mutex::new(steps.into()),
        fallback,
        calls: Arc::clone(&calls),
    };
    (Box::new(provider), calls)
}

pub fn found(lat: f64, lon: f64, precision: Option<f64>) -> Step {
    Step::Reply(ProviderReply::found(vec![ProviderRecord {
        address: Some(format!("{lat}, {lon}")),
        country: Some("Norway".to_string()),
        latitude: Some(lat),
        longitude: Some(lon),
        precision,
    }]))
}

pub fn status(code: u16) -> Step {
    Step::Reply(ProviderReply::status(code))
}

pub fn calls(counter: &AtomicUsize) -> usize {
    counter.load(Ordering::SeqCst)
}
