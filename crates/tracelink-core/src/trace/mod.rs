//! Redirect chain tracer.
//!
//! Fetches one hop at a time with redirect-following disabled and decides
//! the next URL itself: `Location` on 3xx, then meta-refresh, then a script
//! `window.location.href` assignment. Every URL is fetched at most once per
//! trace, and a hop cap bounds the chain even when every target is new.
//! Transport failures become a terminal error hop; only an empty seed is an
//! error for the caller.

mod chain;
mod redirect;
mod status;

use std::collections::HashSet;
use thiserror::Error;
use url::Url;

use crate::config::TraceConfig;
use crate::control::CancelToken;
use crate::fetch::{CurlFetcher, FetchError, Fetcher};

pub use chain::{Chain, Hop, HopStatus, RedirectKind, Termination};
pub use status::{explain_status, is_redirect_status, REDIRECT_STATUSES};

use redirect::NextStep;

/// Contract violations rejected before any fetch.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TraceError {
    #[error("seed URL is empty")]
    EmptySeed,
}

/// Follows a redirect chain using any `Fetcher`.
#[derive(Debug, Clone)]
pub struct Tracer<F> {
    fetcher: F,
    max_hops: usize,
}

impl Tracer<CurlFetcher> {
    /// Tracer backed by libcurl with the configured timeouts and hop cap.
    pub fn from_config(cfg: &TraceConfig) -> Self {
        Self::new(CurlFetcher::new(cfg), cfg.max_hops)
    }
}

impl<F: Fetcher> Tracer<F> {
    pub fn new(fetcher: F, max_hops: usize) -> Self {
        Self {
            fetcher,
            max_hops: max_hops.max(1),
        }
    }

    /// Trace the redirect chain starting at `seed`.
    ///
    /// Always returns a non-empty chain for a non-empty seed. The chain's
    /// `termination` says why tracing stopped.
    pub fn trace(&self, seed: &str, cancel: &CancelToken) -> Result<Chain, TraceError> {
        let seed = seed.trim();
        if seed.is_empty() {
            return Err(TraceError::EmptySeed);
        }

        let mut hops: Vec<Hop> = Vec::new();
        let mut visited: HashSet<String> = HashSet::new();
        let mut current = normalize(seed);

        let termination = loop {
            if visited.contains(&current) {
                break Termination::LoopDetected { url: current };
            }
            if hops.len() >= self.max_hops {
                break Termination::HopLimit {
                    limit: self.max_hops,
                };
            }
            visited.insert(current.clone());

            let resp = match self.fetcher.fetch(&current, cancel) {
                Ok(resp) => resp,
                Err(e) => {
                    let termination = match &e {
                        FetchError::Cancelled => Termination::Cancelled,
                        FetchError::Transport { .. } => Termination::FetchFailed,
                    };
                    tracing::warn!("hop {} {} failed: {}", hops.len() + 1, current, e);
                    hops.push(Hop::from_error(current, &e));
                    break termination;
                }
            };
            tracing::debug!(
                "hop {} {} -> {} ({} header(s), {} body bytes{})",
                hops.len() + 1,
                current,
                resp.status,
                resp.headers.len(),
                resp.body.len(),
                if resp.truncated { ", truncated" } else { "" }
            );

            match redirect::next_step(&resp) {
                NextStep::Final => {
                    hops.push(Hop::from_response(current, &resp, None));
                    break Termination::FinalContent;
                }
                NextStep::MissingLocation => {
                    hops.push(Hop::from_response(current, &resp, None));
                    break Termination::MissingTarget;
                }
                NextStep::Redirect { kind, target } => {
                    match redirect::resolve_target(&current, &target) {
                        Some(next) => {
                            tracing::debug!("{} redirect {} -> {}", kind, current, next);
                            hops.push(Hop::from_response(current, &resp, Some(kind)));
                            current = next;
                        }
                        None => {
                            tracing::debug!("{} redirect target {:?} rejected", kind, target);
                            hops.push(Hop::from_response(current, &resp, None));
                            break Termination::MalformedTarget { target };
                        }
                    }
                }
            }
        };

        tracing::info!(
            "traced {} hop(s) from {}: {}",
            hops.len(),
            seed,
            termination
        );
        Ok(Chain::new(hops, termination))
    }
}

/// Canonical form used for fetching and loop detection; unparseable input is kept as-is.
fn normalize(url: &str) -> String {
    Url::parse(url)
        .map(|u| u.to_string())
        .unwrap_or_else(|_| url.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::Response;
    use std::cell::RefCell;
    use std::collections::{BTreeMap, HashMap};

    const CURLE_COULDNT_CONNECT: i32 = 7;

    enum Scripted {
        Reply(Response),
        Refused,
    }

    /// Serves canned responses keyed by URL and records every request.
    #[derive(Default)]
    struct ScriptedFetcher {
        routes: HashMap<String, Scripted>,
        requests: RefCell<Vec<String>>,
    }

    impl ScriptedFetcher {
        fn reply(mut self, url: &str, status: u16, headers: &[(&str, &str)], body: &str) -> Self {
            let headers: BTreeMap<String, String> = headers
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect();
            self.routes.insert(
                url.to_string(),
                Scripted::Reply(Response {
                    status,
                    headers,
                    body: body.to_string(),
                    truncated: false,
                }),
            );
            self
        }

        fn redirect(self, url: &str, status: u16, location: &str) -> Self {
            self.reply(url, status, &[("Location", location)], "")
        }

        fn refused(mut self, url: &str) -> Self {
            self.routes.insert(url.to_string(), Scripted::Refused);
            self
        }
    }

    impl Fetcher for &ScriptedFetcher {
        fn fetch(&self, url: &str, cancel: &CancelToken) -> Result<Response, FetchError> {
            if cancel.is_cancelled() {
                return Err(FetchError::Cancelled);
            }
            self.requests.borrow_mut().push(url.to_string());
            match self.routes.get(url) {
                Some(Scripted::Reply(r)) => Ok(r.clone()),
                Some(Scripted::Refused) | None => {
                    Err(curl::Error::new(CURLE_COULDNT_CONNECT as _).into())
                }
            }
        }
    }

    fn urls(chain: &Chain) -> Vec<&str> {
        chain.hops().iter().map(|h| h.url.as_str()).collect()
    }

    fn statuses(chain: &Chain) -> Vec<HopStatus> {
        chain.hops().iter().map(|h| h.status).collect()
    }

    #[test]
    fn permanent_redirect_then_content() {
        let f = ScriptedFetcher::default()
            .redirect("http://a.test/", 301, "http://b.test")
            .reply("http://b.test/", 200, &[], "<p>done</p>");
        let chain = Tracer::new(&f, 20)
            .trace("http://a.test", &CancelToken::new())
            .unwrap();
        assert_eq!(urls(&chain), ["http://a.test/", "http://b.test/"]);
        assert_eq!(statuses(&chain), [HopStatus::Http(301), HopStatus::Http(200)]);
        assert_eq!(chain.final_url(), Some("http://b.test/"));
        assert_eq!(chain.termination(), &Termination::FinalContent);
        assert_eq!(chain.hops()[0].via, Some(RedirectKind::Status));
        assert_eq!(
            chain.hops()[0].explanation,
            "Moved Permanently – browser caches this redirect."
        );
        assert_eq!(chain.hops()[1].via, None);
        assert!(chain.hops()[1].headers.is_some());
    }

    #[test]
    fn self_redirect_stops_before_second_fetch() {
        let f = ScriptedFetcher::default().redirect("http://a.test/", 302, "http://a.test/");
        let chain = Tracer::new(&f, 20)
            .trace("http://a.test/", &CancelToken::new())
            .unwrap();
        assert_eq!(chain.len(), 1);
        assert_eq!(f.requests.borrow().len(), 1);
        assert_eq!(
            chain.termination(),
            &Termination::LoopDetected {
                url: "http://a.test/".to_string()
            }
        );
    }

    #[test]
    fn longer_loop_never_repeats_a_url() {
        let f = ScriptedFetcher::default()
            .redirect("http://a.test/", 302, "http://b.test/")
            .redirect("http://b.test/", 307, "/c")
            .redirect("http://b.test/c", 308, "http://a.test/");
        let chain = Tracer::new(&f, 20)
            .trace("http://a.test/", &CancelToken::new())
            .unwrap();
        assert_eq!(
            urls(&chain),
            ["http://a.test/", "http://b.test/", "http://b.test/c"]
        );
        let unique: HashSet<&str> = urls(&chain).into_iter().collect();
        assert_eq!(unique.len(), chain.len());
        assert!(matches!(chain.termination(), Termination::LoopDetected { .. }));
    }

    #[test]
    fn unreachable_seed_gives_single_error_hop() {
        let f = ScriptedFetcher::default().refused("http://down.test/");
        let chain = Tracer::new(&f, 20)
            .trace("http://down.test/", &CancelToken::new())
            .unwrap();
        assert_eq!(chain.len(), 1);
        let hop = &chain.hops()[0];
        assert_eq!(hop.status, HopStatus::Error);
        assert!(!hop.explanation.is_empty());
        assert!(hop.headers.is_none());
        assert_eq!(chain.termination(), &Termination::FetchFailed);
    }

    #[test]
    fn failure_mid_chain_keeps_earlier_hops() {
        let f = ScriptedFetcher::default()
            .redirect("http://a.test/", 302, "http://down.test/")
            .refused("http://down.test/");
        let chain = Tracer::new(&f, 20)
            .trace("http://a.test/", &CancelToken::new())
            .unwrap();
        assert_eq!(statuses(&chain), [HopStatus::Http(302), HopStatus::Error]);
        assert_eq!(chain.final_url(), Some("http://down.test/"));
    }

    #[test]
    fn meta_refresh_and_script_are_followed() {
        let f = ScriptedFetcher::default()
            .reply(
                "http://a.test/",
                200,
                &[],
                r#"<meta http-equiv="refresh" content="0; url=/landing">"#,
            )
            .reply(
                "http://a.test/landing",
                200,
                &[],
                r#"<script>window.location.href = "http://b.test/final";</script>"#,
            )
            .reply("http://b.test/final", 200, &[], "ok");
        let chain = Tracer::new(&f, 20)
            .trace("http://a.test/", &CancelToken::new())
            .unwrap();
        assert_eq!(
            urls(&chain),
            ["http://a.test/", "http://a.test/landing", "http://b.test/final"]
        );
        let via: Vec<_> = chain.hops().iter().map(|h| h.via).collect();
        assert_eq!(
            via,
            [
                Some(RedirectKind::MetaRefresh),
                Some(RedirectKind::Script),
                None
            ]
        );
    }

    #[test]
    fn redirect_without_location_ends_trace() {
        let f = ScriptedFetcher::default().reply("http://a.test/", 302, &[], "");
        let chain = Tracer::new(&f, 20)
            .trace("http://a.test/", &CancelToken::new())
            .unwrap();
        assert_eq!(chain.len(), 1);
        assert_eq!(chain.termination(), &Termination::MissingTarget);
    }

    #[test]
    fn malformed_target_ends_trace() {
        let f = ScriptedFetcher::default().reply(
            "http://a.test/",
            200,
            &[],
            "window.location.href = 'javascript:void(0)'",
        );
        let chain = Tracer::new(&f, 20)
            .trace("http://a.test/", &CancelToken::new())
            .unwrap();
        assert_eq!(chain.len(), 1);
        assert_eq!(
            chain.termination(),
            &Termination::MalformedTarget {
                target: "javascript:void(0)".to_string()
            }
        );
        assert_eq!(chain.hops()[0].via, None);
    }

    #[test]
    fn hop_limit_caps_chain() {
        let mut f = ScriptedFetcher::default();
        for i in 0..10 {
            f = f.redirect(
                &format!("http://a.test/{}", i),
                302,
                &format!("/{}", i + 1),
            );
        }
        let chain = Tracer::new(&f, 3)
            .trace("http://a.test/0", &CancelToken::new())
            .unwrap();
        assert_eq!(chain.len(), 3);
        assert_eq!(chain.termination(), &Termination::HopLimit { limit: 3 });
        assert_eq!(f.requests.borrow().len(), 3);
    }

    #[test]
    fn cancelled_trace_records_one_error_hop() {
        let f = ScriptedFetcher::default().reply("http://a.test/", 200, &[], "");
        let token = CancelToken::new();
        token.cancel();
        let chain = Tracer::new(&f, 20).trace("http://a.test/", &token).unwrap();
        assert_eq!(chain.len(), 1);
        assert!(chain.hops()[0].status.is_error());
        assert_eq!(chain.termination(), &Termination::Cancelled);
        assert!(f.requests.borrow().is_empty());
    }

    #[test]
    fn empty_seed_is_rejected() {
        let f = ScriptedFetcher::default();
        let tracer = Tracer::new(&f, 20);
        assert_eq!(
            tracer.trace("", &CancelToken::new()).unwrap_err(),
            TraceError::EmptySeed
        );
        assert_eq!(
            tracer.trace("   ", &CancelToken::new()).unwrap_err(),
            TraceError::EmptySeed
        );
    }

    #[test]
    fn unparseable_seed_is_fetched_verbatim() {
        let f = ScriptedFetcher::default();
        let chain = Tracer::new(&f, 20)
            .trace("example.com/path", &CancelToken::new())
            .unwrap();
        assert_eq!(f.requests.borrow().as_slice(), ["example.com/path"]);
        assert_eq!(chain.len(), 1);
    }
}
