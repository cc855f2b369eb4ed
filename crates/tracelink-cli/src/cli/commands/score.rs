//! `tracelink score <url>` – offline scoring, no network access.

use anyhow::{Context, Result};
use tracelink_core::config::TraceLinkConfig;
use tracelink_core::score::ThreatScorer;

pub fn run_score(cfg: &TraceLinkConfig, url: &str, hops: usize, json: bool) -> Result<()> {
    let scorer = ThreatScorer::from_config(&cfg.scoring)?;
    let result = scorer.score_hops(url, hops);

    if json {
        let out = serde_json::to_string_pretty(&result).context("serialize score")?;
        println!("{}", out);
        return Ok(());
    }

    println!("Threat score: {}% ({})", result.score, result.level());
    for reason in &result.reasons {
        println!("  - {}", reason);
    }
    Ok(())
}
