//! Redirect detection for a single response: `Location` on 3xx, then
//! `<meta http-equiv="refresh">`, then a `window.location.href = '...'`
//! assignment in the raw body.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};
use url::Url;

use crate::fetch::Response;

use super::chain::RedirectKind;
use super::status::is_redirect_status;

static META_WITH_HTTP_EQUIV: Lazy<Selector> =
    Lazy::new(|| Selector::parse("meta[http-equiv]").expect("static selector is valid"));

// Literal href assignment only; scripts are never evaluated.
static SCRIPT_REDIRECT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"window\.location\.href\s*=\s*['"]([^'"]*)['"]"#)
        .expect("static regex is valid")
});

/// What the tracer should do after a successful fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum NextStep {
    /// Follow `target` (raw, not yet resolved against the current URL).
    Redirect { kind: RedirectKind, target: String },
    /// Redirect status without a `Location` header.
    MissingLocation,
    /// Nothing to follow; final content reached.
    Final,
}

pub(crate) fn next_step(resp: &Response) -> NextStep {
    if is_redirect_status(resp.status) {
        return match resp.header("Location") {
            Some(loc) => NextStep::Redirect {
                kind: RedirectKind::Status,
                target: loc.to_string(),
            },
            None => NextStep::MissingLocation,
        };
    }
    if let Some(target) = meta_refresh_target(&resp.body) {
        return NextStep::Redirect {
            kind: RedirectKind::MetaRefresh,
            target,
        };
    }
    if let Some(target) = script_redirect_target(&resp.body) {
        return NextStep::Redirect {
            kind: RedirectKind::Script,
            target,
        };
    }
    NextStep::Final
}

/// Target of the first `<meta http-equiv="refresh">` tag, if its `content`
/// carries a `url=` clause.
pub(crate) fn meta_refresh_target(html: &str) -> Option<String> {
    let doc = Html::parse_document(html);
    let meta = doc.select(&META_WITH_HTTP_EQUIV).find(|el| {
        el.value()
            .attr("http-equiv")
            .is_some_and(|v| v.trim().eq_ignore_ascii_case("refresh"))
    })?;
    refresh_url(meta.value().attr("content")?)
}

/// Text after the last `url=` (any case) in a refresh `content` value.
fn refresh_url(content: &str) -> Option<String> {
    let idx = content.to_ascii_lowercase().rfind("url=")?;
    let raw = &content[idx + "url=".len()..];
    Some(raw.trim().trim_matches(|c| c == '\'' || c == '"').trim().to_string())
}

/// Target of the first `window.location.href = '<target>'` in the raw body.
pub(crate) fn script_redirect_target(body: &str) -> Option<String> {
    SCRIPT_REDIRECT
        .captures(body)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// Resolve a redirect target against the URL that produced it.
///
/// Returns `None` for empty targets, targets that do not form a valid URL,
/// and non-HTTP schemes (`javascript:`, `data:`, ...).
pub(crate) fn resolve_target(base: &str, target: &str) -> Option<String> {
    let target = target.trim();
    if target.is_empty() {
        return None;
    }
    let resolved = match Url::parse(base) {
        Ok(base) => base.join(target).ok()?,
        Err(_) => Url::parse(target).ok()?,
    };
    match resolved.scheme() {
        "http" | "https" => Some(resolved.to_string()),
        _ => None,
    }
}
