//! CLI command handlers, one file per command.

mod analyze;
mod config;
mod score;

pub use analyze::{run_analyze, AnalyzeOptions, OutputFormat};
pub use config::run_config;
pub use score::run_score;
