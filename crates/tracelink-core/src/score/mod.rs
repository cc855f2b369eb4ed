//! Heuristic threat scoring of a traced destination.
//!
//! Independent additive signals, each worth a fixed number of points; the
//! total is clamped to 100. Reasons are reported in signal order.

mod suffix;

use anyhow::Result;
use serde::Serialize;
use std::fmt;
use url::{Host, Url};

use crate::config::ScoringConfig;
use crate::trace::Chain;

pub use suffix::SuffixList;

pub const MAX_SCORE: u8 = 100;

/// One heuristic that can contribute to the score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Signal {
    SuspiciousTld,
    UrlShortener,
    SensitiveKeyword,
    LongChain,
}

impl Signal {
    pub const fn points(self) -> u32 {
        match self {
            Signal::SuspiciousTld => 20,
            Signal::UrlShortener => 25,
            Signal::SensitiveKeyword => 20,
            Signal::LongChain => 20,
        }
    }
}

/// Coarse bucket used when presenting a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ThreatLevel {
    Low,
    Medium,
    High,
}

impl ThreatLevel {
    pub fn from_score(score: u8) -> Self {
        match score {
            0..=29 => ThreatLevel::Low,
            30..=69 => ThreatLevel::Medium,
            _ => ThreatLevel::High,
        }
    }
}

impl fmt::Display for ThreatLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ThreatLevel::Low => "low",
            ThreatLevel::Medium => "medium",
            ThreatLevel::High => "high",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoreResult {
    /// Sum of triggered points, clamped to 0..=100.
    pub score: u8,
    /// One message per triggered signal, in signal order.
    pub reasons: Vec<String>,
    pub signals: Vec<Signal>,
}

impl ScoreResult {
    pub fn level(&self) -> ThreatLevel {
        ThreatLevel::from_score(self.score)
    }

    fn push(&mut self, signal: Signal, reason: String) {
        self.signals.push(signal);
        self.reasons.push(reason);
    }
}

/// Scores a final URL and its chain against the configured blocklists.
#[derive(Debug, Default)]
pub struct ThreatScorer {
    cfg: ScoringConfig,
    suffixes: SuffixList,
}

impl ThreatScorer {
    pub fn new(cfg: ScoringConfig, suffixes: SuffixList) -> Self {
        Self { cfg, suffixes }
    }

    /// Build a scorer, loading the public suffix list named in the config, if any.
    pub fn from_config(cfg: &ScoringConfig) -> Result<Self> {
        let suffixes = SuffixList::load(cfg.public_suffix_list.as_deref())?;
        Ok(Self::new(cfg.clone(), suffixes))
    }

    pub fn score(&self, final_url: &str, chain: &Chain) -> ScoreResult {
        self.score_hops(final_url, chain.len())
    }

    /// Score `final_url` as the end of a chain of `hop_count` hops.
    pub fn score_hops(&self, final_url: &str, hop_count: usize) -> ScoreResult {
        let mut result = ScoreResult {
            score: 0,
            reasons: Vec::new(),
            signals: Vec::new(),
        };

        if let Some(suffix) = self.suspicious_suffix(final_url) {
            result.push(Signal::SuspiciousTld, format!("Suspicious TLD: .{}", suffix));
        }

        if self.cfg.shorteners.iter().any(|s| final_url.contains(s.as_str())) {
            result.push(Signal::UrlShortener, "URL shortener detected".to_string());
        }

        let lower = final_url.to_lowercase();
        if self.cfg.keywords.iter().any(|k| lower.contains(&k.to_lowercase())) {
            result.push(Signal::SensitiveKeyword, "Sensitive phishing keyword".to_string());
        }

        if hop_count > self.cfg.long_chain_threshold {
            result.push(Signal::LongChain, "Long redirect chain".to_string());
        }

        let total: u32 = result.signals.iter().map(|s| s.points()).sum();
        result.score = total.min(u32::from(MAX_SCORE)) as u8;
        tracing::debug!(
            "scored {} ({} hop(s)): {} {:?}",
            final_url,
            hop_count,
            result.score,
            result.signals
        );
        result
    }

    /// Public suffix of the URL's host if it is on the blocklist.
    fn suspicious_suffix(&self, url: &str) -> Option<String> {
        let host = domain_of(url)?;
        let suffix = self.suffixes.suffix(&host)?;
        self.cfg
            .suspicious_tlds
            .iter()
            .any(|t| t.trim_start_matches('.').eq_ignore_ascii_case(suffix))
            .then(|| suffix.to_string())
    }
}

/// Lowercase domain name of `url`; `None` for IP hosts and unparseable input.
/// Scheme-less input such as `example.com/path` is read as `http://`.
fn domain_of(url: &str) -> Option<String> {
    let parsed = match Url::parse(url) {
        Ok(u) => u,
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            Url::parse(&format!("http://{}", url)).ok()?
        }
        Err(_) => return None,
    };
    match parsed.host()? {
        Host::Domain(d) => Some(d.to_ascii_lowercase()),
        Host::Ipv4(_) | Host::Ipv6(_) => None,
    }
}
