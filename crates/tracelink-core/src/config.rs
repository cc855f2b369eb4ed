use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Per-hop fetch limits (the `[trace]` section of config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TraceConfig {
    /// Whole-request timeout for a single hop, in seconds.
    pub timeout_secs: u64,
    /// TCP/TLS connect timeout for a single hop, in seconds.
    pub connect_timeout_secs: u64,
    /// Hard cap on hops per trace, independent of loop detection.
    pub max_hops: usize,
    /// Response bytes kept for meta-refresh / script detection; the rest is dropped.
    pub max_body_bytes: usize,
    /// User-Agent sent with every request.
    pub user_agent: String,
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 7,
            connect_timeout_secs: 7,
            max_hops: 20,
            max_body_bytes: 2 * 1024 * 1024,
            user_agent: concat!("tracelink/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl TraceConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs.min(self.timeout_secs))
    }
}

/// Heuristic blocklists for the threat scorer (the `[scoring]` section).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Public suffixes (without the leading dot) considered suspicious.
    pub suspicious_tlds: Vec<String>,
    /// Substrings identifying known URL shorteners.
    pub shorteners: Vec<String>,
    /// Lowercase keywords typical of credential-phishing URLs.
    pub keywords: Vec<String>,
    /// Chains strictly longer than this many hops are flagged.
    pub long_chain_threshold: usize,
    /// Optional `public_suffix_list.dat`; the built-in list is used when unset.
    pub public_suffix_list: Option<PathBuf>,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            suspicious_tlds: strings(&["zip", "xyz", "click", "loan"]),
            shorteners: strings(&["bit.ly", "tinyurl", "t.co"]),
            keywords: strings(&["login", "bank", "wallet", "update"]),
            long_chain_threshold: 4,
            public_suffix_list: None,
        }
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Global configuration loaded from `~/.config/tracelink/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TraceLinkConfig {
    #[serde(default)]
    pub trace: TraceConfig,
    #[serde(default)]
    pub scoring: ScoringConfig,
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("tracelink")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<TraceLinkConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = TraceLinkConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    load_from(&path)
}

/// Load configuration from an explicit path. Missing keys fall back to defaults.
pub fn load_from(path: &Path) -> Result<TraceLinkConfig> {
    let data =
        fs::read_to_string(path).with_context(|| format!("read config {}", path.display()))?;
    let cfg: TraceLinkConfig =
        toml::from_str(&data).with_context(|| format!("parse config {}", path.display()))?;
    Ok(cfg)
}
