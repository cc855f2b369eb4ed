//! CLI for the TraceLink redirect analyzer.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracelink_core::config;

use commands::{run_analyze, run_config, run_score, AnalyzeOptions, OutputFormat};

/// Top-level CLI for TraceLink.
#[derive(Debug, Parser)]
#[command(name = "tracelink")]
#[command(about = "TraceLink: redirect chain tracer and phishing heuristics", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Follow the redirect chain of a URL and score where it ends.
    Analyze {
        /// HTTP/HTTPS URL to start from.
        url: String,
        /// Print the analysis as JSON.
        #[arg(long, conflicts_with = "dot")]
        json: bool,
        /// Print the chain as a Graphviz digraph.
        #[arg(long)]
        dot: bool,
        /// Include response headers of every hop in the text report.
        #[arg(long)]
        headers: bool,
        /// Override the hop cap from config.
        #[arg(long, value_name = "N")]
        max_hops: Option<usize>,
        /// Override the per-hop timeout from config, in seconds.
        #[arg(long, value_name = "SECS")]
        timeout: Option<u64>,
    },

    /// Score a URL without fetching it.
    Score {
        /// URL to score as the final destination.
        url: String,
        /// Length of the chain that led to the URL.
        #[arg(long, default_value = "1", value_name = "N")]
        hops: usize,
        /// Print the score as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Show the config file path and the effective configuration.
    Config,
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Analyze {
                url,
                json,
                dot,
                headers,
                max_hops,
                timeout,
            } => {
                let opts = AnalyzeOptions {
                    format: OutputFormat::from_flags(json, dot),
                    show_headers: headers,
                    max_hops,
                    timeout_secs: timeout,
                };
                run_analyze(&cfg, &url, opts).await?;
            }
            CliCommand::Score { url, hops, json } => run_score(&cfg, &url, hops, json)?,
            CliCommand::Config => run_config(&cfg)?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
