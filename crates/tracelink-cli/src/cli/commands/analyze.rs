//! `tracelink analyze <url>` – trace the redirect chain and score the destination.

use anyhow::{Context, Result};
use tracelink_core::config::TraceLinkConfig;
use tracelink_core::control::CancelToken;
use tracelink_core::report::{self, Analysis};
use tracelink_core::score::ThreatScorer;
use tracelink_core::trace::Tracer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
    Dot,
}

impl OutputFormat {
    pub fn from_flags(json: bool, dot: bool) -> Self {
        if json {
            OutputFormat::Json
        } else if dot {
            OutputFormat::Dot
        } else {
            OutputFormat::Text
        }
    }
}

#[derive(Debug, Clone)]
pub struct AnalyzeOptions {
    pub format: OutputFormat,
    pub show_headers: bool,
    pub max_hops: Option<usize>,
    pub timeout_secs: Option<u64>,
}

pub async fn run_analyze(cfg: &TraceLinkConfig, url: &str, opts: AnalyzeOptions) -> Result<()> {
    let mut trace_cfg = cfg.trace.clone();
    if let Some(n) = opts.max_hops {
        trace_cfg.max_hops = n;
    }
    if let Some(secs) = opts.timeout_secs {
        trace_cfg.timeout_secs = secs;
    }

    let scorer = ThreatScorer::from_config(&cfg.scoring)?;
    let tracer = Tracer::from_config(&trace_cfg);
    let cancel = CancelToken::new();

    // Curl blocks; keep the runtime free to notice Ctrl-C.
    let mut task = tokio::task::spawn_blocking({
        let cancel = cancel.clone();
        let url = url.to_string();
        move || report::analyze(&tracer, &scorer, &url, &cancel)
    });

    let analysis = tokio::select! {
        res = &mut task => res.context("trace task join")??,
        Ok(()) = tokio::signal::ctrl_c() => {
            tracing::info!("interrupt received, cancelling trace of {}", url);
            cancel.cancel();
            task.await.context("trace task join")??
        }
    };

    print_analysis(&analysis, &opts)
}

fn print_analysis(analysis: &Analysis, opts: &AnalyzeOptions) -> Result<()> {
    match opts.format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(analysis).context("serialize analysis")?;
            println!("{}", json);
        }
        OutputFormat::Dot => print!("{}", report::render_dot(&analysis.chain)),
        OutputFormat::Text => print!("{}", report::render_text(analysis, opts.show_headers)),
    }
    Ok(())
}
