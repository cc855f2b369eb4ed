//! Single-hop HTTP GET.
//!
//! Uses the curl crate (libcurl) with redirect-following disabled so the
//! tracer sees every 3xx itself. Returns the status code, response headers
//! and a bounded, lossily-decoded body for redirect detection.

mod error;
mod handler;
mod parse;

use std::collections::BTreeMap;
use std::time::Duration;

use crate::config::TraceConfig;
use crate::control::CancelToken;

pub use error::{classify_curl_error, FetchError, TransportKind};

use handler::HopHandler;

/// Response of a single GET.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub headers: BTreeMap<String, String>,
    /// Body text; invalid UTF-8 is replaced.
    pub body: String,
    /// True if the body was cut at the configured byte limit.
    pub truncated: bool,
}

impl Response {
    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// HTTP client seam used by the tracer.
///
/// Implementations must not follow redirects and must surface transport
/// failures as `FetchError` rather than panicking.
pub trait Fetcher {
    fn fetch(&self, url: &str, cancel: &CancelToken) -> Result<Response, FetchError>;
}

/// libcurl-backed fetcher. Runs in the current thread; call from
/// `spawn_blocking` if used from async code.
#[derive(Debug, Clone)]
pub struct CurlFetcher {
    timeout: Duration,
    connect_timeout: Duration,
    user_agent: String,
    max_body_bytes: usize,
}

impl CurlFetcher {
    pub fn new(cfg: &TraceConfig) -> Self {
        Self {
            timeout: cfg.timeout(),
            connect_timeout: cfg.connect_timeout(),
            user_agent: cfg.user_agent.clone(),
            max_body_bytes: cfg.max_body_bytes,
        }
    }
}

impl Fetcher for CurlFetcher {
    fn fetch(&self, url: &str, cancel: &CancelToken) -> Result<Response, FetchError> {
        if cancel.is_cancelled() {
            return Err(FetchError::Cancelled);
        }

        let mut easy = curl::easy::Easy2::new(HopHandler::new(cancel.clone(), self.max_body_bytes));
        easy.url(url)?;
        easy.get(true)?;
        easy.follow_location(false)?;
        easy.connect_timeout(self.connect_timeout)?;
        easy.timeout(self.timeout)?;
        easy.useragent(&self.user_agent)?;
        // Empty string = every encoding libcurl can decode.
        easy.accept_encoding("")?;
        easy.progress(true)?;

        if let Err(e) = easy.perform() {
            let handler = easy.get_ref();
            if handler.cancelled {
                return Err(FetchError::Cancelled);
            }
            if !(e.is_write_error() && handler.truncated) {
                return Err(e.into());
            }
            tracing::debug!("body of {} truncated at {} bytes", url, self.max_body_bytes);
        }

        let code = easy.response_code()?;
        let handler = easy.get_mut();
        let headers = parse::parse_headers(&handler.header_lines);
        let body = String::from_utf8_lossy(&handler.body).into_owned();

        Ok(Response {
            status: u16::try_from(code).unwrap_or(0),
            headers,
            body,
            truncated: handler.truncated,
        })
    }
}
