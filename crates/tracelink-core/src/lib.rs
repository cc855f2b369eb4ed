pub mod config;
pub mod logging;

pub mod control;
pub mod fetch;
pub mod report;
pub mod score;
pub mod trace;
