//! `tracelink config` – show where the config lives and what is in effect.

use anyhow::{Context, Result};
use tracelink_core::config::{self, TraceLinkConfig};

pub fn run_config(cfg: &TraceLinkConfig) -> Result<()> {
    let path = config::config_path()?;
    println!("# {}", path.display());
    let toml = toml::to_string_pretty(cfg).context("serialize config")?;
    print!("{}", toml);
    Ok(())
}
