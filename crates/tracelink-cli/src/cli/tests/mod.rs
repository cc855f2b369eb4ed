//! CLI parse tests.

use super::{Cli, CliCommand};
use clap::Parser;

fn parse(args: &[&str]) -> CliCommand {
    let cli = Cli::try_parse_from(args).unwrap();
    cli.command
}

#[test]
fn analyze_defaults() {
    match parse(&["tracelink", "analyze", "http://example.com"]) {
        CliCommand::Analyze {
            url,
            json,
            dot,
            headers,
            max_hops,
            timeout,
        } => {
            assert_eq!(url, "http://example.com");
            assert!(!json && !dot && !headers);
            assert_eq!(max_hops, None);
            assert_eq!(timeout, None);
        }
        _ => panic!("expected Analyze"),
    }
}

#[test]
fn analyze_with_overrides() {
    let cmd = parse(&[
        "tracelink",
        "analyze",
        "https://bit.ly/x",
        "--json",
        "--max-hops",
        "5",
        "--timeout",
        "3",
    ]);
    match cmd {
        CliCommand::Analyze {
            url,
            json,
            max_hops,
            timeout,
            ..
        } => {
            assert_eq!(url, "https://bit.ly/x");
            assert!(json);
            assert_eq!(max_hops, Some(5));
            assert_eq!(timeout, Some(3));
        }
        _ => panic!("expected Analyze"),
    }
}

#[test]
fn analyze_dot_and_headers() {
    match parse(&["tracelink", "analyze", "http://a.test", "--dot", "--headers"]) {
        CliCommand::Analyze { dot, headers, json, .. } => {
            assert!(dot);
            assert!(headers);
            assert!(!json);
        }
        _ => panic!("expected Analyze"),
    }
}

#[test]
fn analyze_json_conflicts_with_dot() {
    let res = Cli::try_parse_from(["tracelink", "analyze", "http://a.test", "--json", "--dot"]);
    assert!(res.is_err());
}

#[test]
fn analyze_requires_url() {
    assert!(Cli::try_parse_from(["tracelink", "analyze"]).is_err());
}

#[test]
fn score_defaults_to_single_hop() {
    match parse(&["tracelink", "score", "http://login.example.tk"]) {
        CliCommand::Score { url, hops, json } => {
            assert_eq!(url, "http://login.example.tk");
            assert_eq!(hops, 1);
            assert!(!json);
        }
        _ => panic!("expected Score"),
    }
}

#[test]
fn score_with_hops_and_json() {
    match parse(&["tracelink", "score", "http://x.test", "--hops", "6", "--json"]) {
        CliCommand::Score { hops, json, .. } => {
            assert_eq!(hops, 6);
            assert!(json);
        }
        _ => panic!("expected Score"),
    }
}

#[test]
fn config_takes_no_args() {
    assert!(matches!(parse(&["tracelink", "config"]), CliCommand::Config));
    assert!(Cli::try_parse_from(["tracelink", "config", "extra"]).is_err());
}
