//! `geomux geocode <LOCATION>` – run one geocode cycle and print the outcome.

use anyhow::{Context, Result};
use geomux_core::config::GeomuxConfig;
use geomux_core::scheduler::SchedulerKind;
use geomux_core::{Aggregator, GeocodeOutcome, GeocodeRequest};

/// Parsed `geocode` arguments.
#[derive(Debug, Clone, Default)]
pub struct GeocodeArgs {
    pub location: String,
    pub no_cache: bool,
    pub wait: bool,
    pub skip: Vec<String>,
    pub scheduler: Option<SchedulerKind>,
    pub filter: Option<String>,
    pub picker: Option<String>,
    pub json: bool,
}

impl GeocodeArgs {
    /// Apply command-line overrides on top of the loaded config.
    pub fn apply_overrides(&self, cfg: &mut GeomuxConfig) {
        if let Some(kind) = self.scheduler {
            cfg.scheduler = kind;
        }
        if let Some(filter) = &self.filter {
            cfg.filter = filter.clone();
        }
        if let Some(picker) = &self.picker {
            cfg.picker = picker.clone();
        }
    }

    pub fn request(&self) -> GeocodeRequest {
        let mut req = GeocodeRequest::new(&self.location)
            .no_cache(self.no_cache)
            .wait_for_retries(self.wait);
        for name in &self.skip {
            req = req.skip(name.as_str());
        }
        req
    }
}

pub fn run_geocode(mut cfg: GeomuxConfig, args: GeocodeArgs) -> Result<()> {
    args.apply_overrides(&mut cfg);
    let mut aggregator = Aggregator::from_config(&cfg)?;
    let outcome = aggregator.geocode(&args.request());
    if args.json {
        print_json(&args.location, &outcome)
    } else {
        print_human(&args.location, &outcome);
        Ok(())
    }
}

fn print_json(location: &str, outcome: &GeocodeOutcome) -> Result<()> {
    let value = serde_json::json!({
        "location": location,
        "status_code": outcome.status_code,
        "from_cache": outcome.from_cache,
        "candidate": outcome.candidate,
        "attempts": outcome
            .responses
            .iter()
            .map(|r| serde_json::json!({
                "provider": r.provider_name,
                "status_code": r.status_code,
                "records": r.records.len(),
            }))
            .collect::<Vec<_>>(),
    });
    let text = serde_json::to_string_pretty(&value).context("encode outcome")?;
    println!("{text}");
    Ok(())
}

fn print_human(location: &str, outcome: &GeocodeOutcome) {
    for r in &outcome.responses {
        println!(
            "  tried {:<16} status {} ({} records)",
            r.provider_name,
            r.status_code,
            r.records.len()
        );
    }
    match &outcome.candidate {
        Some(c) => {
            println!("{:.6}, {:.6}", c.latitude, c.longitude);
            if let Some(address) = &c.address {
                println!("  address:   {address}");
            }
            if let Some(country) = &c.country {
                println!("  country:   {country}");
            }
            if let Some(p) = c.precision {
                println!("  precision: {p:.2}");
            }
            let source = if outcome.from_cache { "cache" } else { "live" };
            println!(
                "  provider:  {} (status {}, {})",
                c.provider_name, outcome.status_code, source
            );
        }
        None => println!("no result for {location:?} (status {})", outcome.status_code),
    }
}
