//! `geomux providers` – list configured providers and weights.

use std::collections::HashSet;

use anyhow::Result;
use geomux_core::config::GeomuxConfig;

pub fn run_providers(cfg: &GeomuxConfig) -> Result<()> {
    if cfg.providers.is_empty() {
        println!("No providers configured.");
        return Ok(());
    }
    println!("scheduler: {} (timeouts {})", cfg.scheduler, if cfg.use_timeouts { "on" } else { "off" });
    println!("{:<16} {:<10} {:<8} {}", "NAME", "KIND", "WEIGHT", "ENDPOINT");
    let mut seen = HashSet::new();
    for p in &cfg.providers {
        let kind = format!("{:?}", p.kind).to_lowercase();
        let endpoint = p
            .endpoint
            .clone()
            .or_else(|| p.path.as_ref().map(|path| path.display().to_string()))
            .unwrap_or_else(|| "-".to_string());
        let note = if seen.insert(p.name.as_str()) {
            ""
        } else {
            "  (duplicate, ignored)"
        };
        println!(
            "{:<16} {:<10} {:<8} {}{}",
            p.name,
            kind,
            p.daily_limit.max(1),
            endpoint,
            note
        );
    }
    Ok(())
}
