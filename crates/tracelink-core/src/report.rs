//! Analysis result and its plain-text / Graphviz renderings.

use serde::Serialize;
use std::fmt::Write as _;

use crate::control::CancelToken;
use crate::fetch::Fetcher;
use crate::score::{ScoreResult, ThreatLevel, ThreatScorer};
use crate::trace::{Chain, TraceError, Tracer};

/// Everything one analysis produces: the chain and the score of where it ended.
#[derive(Debug, Clone, Serialize)]
pub struct Analysis {
    pub seed: String,
    pub final_url: String,
    pub chain: Chain,
    pub score: ScoreResult,
    pub level: ThreatLevel,
}

/// Trace `seed` and score the final hop.
pub fn analyze<F: Fetcher>(
    tracer: &Tracer<F>,
    scorer: &ThreatScorer,
    seed: &str,
    cancel: &CancelToken,
) -> Result<Analysis, TraceError> {
    let chain = tracer.trace(seed, cancel)?;
    let final_url = chain.final_url().unwrap_or(seed).to_string();
    let score = scorer.score(&final_url, &chain);
    Ok(Analysis {
        seed: seed.trim().to_string(),
        final_url,
        level: score.level(),
        chain,
        score,
    })
}

/// Human-readable report. With `show_headers`, each hop's response headers are listed.
pub fn render_text(analysis: &Analysis, show_headers: bool) -> String {
    let mut out = String::new();
    let chain = &analysis.chain;

    let _ = writeln!(out, "Redirect chain ({} hop(s)):", chain.len());
    for (i, hop) in chain.hops().iter().enumerate() {
        let _ = writeln!(out, "  {:>2}. [{}] → {}", i + 1, hop.status, hop.url);
        let _ = writeln!(out, "      {}", hop.explanation);
        if let Some(via) = hop.via {
            let _ = writeln!(out, "      followed via {}", via);
        }
    }
    let _ = writeln!(out, "Stopped: {}", chain.termination());

    if show_headers {
        let _ = writeln!(out);
        let _ = writeln!(out, "Headers:");
        for (i, hop) in chain.hops().iter().enumerate() {
            let _ = writeln!(out, "  Hop {}: {}", i + 1, hop.url);
            match &hop.headers {
                Some(headers) if !headers.is_empty() => {
                    for (k, v) in headers {
                        let _ = writeln!(out, "    {}: {}", k, v);
                    }
                }
                _ => {
                    let _ = writeln!(out, "    (none)");
                }
            }
        }
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "Final URL: {}", analysis.final_url);
    let _ = writeln!(
        out,
        "Threat score: {}% ({})",
        analysis.score.score, analysis.level
    );
    if !analysis.score.reasons.is_empty() {
        let _ = writeln!(out, "Why this score:");
        for reason in &analysis.score.reasons {
            let _ = writeln!(out, "  - {}", reason);
        }
    }
    out
}

/// Graphviz digraph: one box per hop labelled `status\nurl`, edges in hop order.
pub fn render_dot(chain: &Chain) -> String {
    let mut out = String::from("digraph redirects {\n    node [shape=box];\n");
    for (i, hop) in chain.hops().iter().enumerate() {
        let label = format!("{}\n{}", hop.status, hop.url);
        let _ = writeln!(out, "    n{} [label=\"{}\"];", i, escape_dot(&label));
    }
    for i in 1..chain.len() {
        let _ = writeln!(out, "    n{} -> n{};", i - 1, i);
    }
    out.push_str("}\n");
    out
}

fn escape_dot(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            c => out.push(c),
        }
    }
    out
}
