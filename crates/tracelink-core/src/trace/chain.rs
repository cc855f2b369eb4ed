//! Hop and chain types produced by the tracer.

use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

use crate::fetch::{FetchError, Response};

use super::status::explain_status;

/// Outcome of one fetch attempt: an HTTP status, or the error sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HopStatus {
    Http(u16),
    Error,
}

impl HopStatus {
    pub fn code(&self) -> Option<u16> {
        match self {
            HopStatus::Http(code) => Some(*code),
            HopStatus::Error => None,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, HopStatus::Error)
    }
}

impl fmt::Display for HopStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HopStatus::Http(code) => write!(f, "{}", code),
            HopStatus::Error => f.write_str("ERROR"),
        }
    }
}

impl Serialize for HopStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            HopStatus::Http(code) => serializer.serialize_u16(*code),
            HopStatus::Error => serializer.serialize_str("ERROR"),
        }
    }
}

/// Mechanism that carried the trace from one hop to the next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RedirectKind {
    /// 3xx status with a `Location` header.
    Status,
    /// `<meta http-equiv="refresh">` tag.
    MetaRefresh,
    /// `window.location.href = '...'` in the body.
    Script,
}

impl fmt::Display for RedirectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RedirectKind::Status => "status",
            RedirectKind::MetaRefresh => "meta-refresh",
            RedirectKind::Script => "script",
        };
        f.write_str(s)
    }
}

/// One step in a trace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Hop {
    /// URL fetched at this step.
    pub url: String,
    pub status: HopStatus,
    /// Status semantics, or the failure description for error hops.
    pub explanation: String,
    /// Response headers; `None` for error hops.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headers: Option<BTreeMap<String, String>>,
    /// How the trace left this hop, if it was followed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub via: Option<RedirectKind>,
}

impl Hop {
    pub(crate) fn from_response(url: String, resp: &Response, via: Option<RedirectKind>) -> Self {
        Self {
            url,
            status: HopStatus::Http(resp.status),
            explanation: explain_status(resp.status).to_string(),
            headers: Some(resp.headers.clone()),
            via,
        }
    }

    pub(crate) fn from_error(url: String, err: &FetchError) -> Self {
        Self {
            url,
            status: HopStatus::Error,
            explanation: err.to_string(),
            headers: None,
            via: None,
        }
    }
}

/// Why tracing stopped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum Termination {
    /// Last hop had nothing left to follow.
    FinalContent,
    /// The next target had already been fetched in this trace.
    LoopDetected { url: String },
    /// Redirect status without a `Location` header.
    MissingTarget,
    /// A redirect target was empty, unparseable, or not http(s).
    MalformedTarget { target: String },
    /// The last hop is a transport error.
    FetchFailed,
    /// The hop cap was reached before the chain ended.
    HopLimit { limit: usize },
    /// The caller cancelled the trace.
    Cancelled,
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Termination::FinalContent => f.write_str("final content reached"),
            Termination::LoopDetected { url } => write!(f, "redirect loop back to {}", url),
            Termination::MissingTarget => f.write_str("redirect without Location header"),
            Termination::MalformedTarget { target } => {
                write!(f, "malformed redirect target {:?}", target)
            }
            Termination::FetchFailed => f.write_str("fetch failed"),
            Termination::HopLimit { limit } => write!(f, "hop limit of {} reached", limit),
            Termination::Cancelled => f.write_str("cancelled"),
        }
    }
}

/// Ordered hops from seed to termination, plus the reason tracing stopped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Chain {
    hops: Vec<Hop>,
    termination: Termination,
}

impl Chain {
    pub fn new(hops: Vec<Hop>, termination: Termination) -> Self {
        Self { hops, termination }
    }

    pub fn hops(&self) -> &[Hop] {
        &self.hops
    }

    pub fn len(&self) -> usize {
        self.hops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hops.is_empty()
    }

    pub fn termination(&self) -> &Termination {
        &self.termination
    }

    pub fn last(&self) -> Option<&Hop> {
        self.hops.last()
    }

    /// URL of the last hop: the final destination, or where tracing failed.
    pub fn final_url(&self) -> Option<&str> {
        self.hops.last().map(|h| h.url.as_str())
    }
}
