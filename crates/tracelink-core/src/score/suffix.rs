//! Public suffix lookup: the list compiled into `psl`, or a
//! `public_suffix_list.dat` supplied by the user.

use anyhow::{Context, Result};
use publicsuffix::Psl;
use std::fmt;
use std::path::Path;

pub enum SuffixList {
    Builtin,
    File(publicsuffix::List),
}

impl fmt::Debug for SuffixList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SuffixList::Builtin => f.write_str("SuffixList::Builtin"),
            SuffixList::File(_) => f.write_str("SuffixList::File(..)"),
        }
    }
}

impl Default for SuffixList {
    fn default() -> Self {
        SuffixList::Builtin
    }
}

impl SuffixList {
    /// Load the list from `path`, or use the built-in one when `path` is `None`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(SuffixList::Builtin);
        };
        let bytes = std::fs::read(path)
            .with_context(|| format!("read public suffix list {}", path.display()))?;
        let list = publicsuffix::List::from_bytes(&bytes).map_err(|e| {
            anyhow::anyhow!("parse public suffix list {}: {:?}", path.display(), e)
        })?;
        tracing::debug!("loaded public suffix list from {}", path.display());
        Ok(SuffixList::File(list))
    }

    /// ICANN public suffix of a lowercase hostname, e.g. `co.uk` for `www.example.co.uk`.
    /// Private rules such as `github.io` are skipped, so `foo.github.io` yields `io`.
    /// Unlisted TLDs fall back to the last label.
    pub fn suffix<'a>(&self, host: &'a str) -> Option<&'a str> {
        let host = host.trim_end_matches('.');
        if host.is_empty() {
            return None;
        }
        match self {
            SuffixList::Builtin => icann_suffix(host, |name| {
                let s = psl::suffix(name)?;
                Some((s.as_bytes().len(), s.typ() == Some(psl::Type::Private)))
            }),
            SuffixList::File(list) => icann_suffix(host, |name| {
                let s = list.suffix(name)?;
                Some((s.as_bytes().len(), s.typ() == Some(publicsuffix::Type::Private)))
            }),
        }
    }
}

/// Walks down from a private suffix until the lookup reports an ICANN or unlisted one.
/// `lookup` returns the suffix length in bytes and whether it came from a private rule.
fn icann_suffix<'a, F>(host: &'a str, lookup: F) -> Option<&'a str>
where
    F: Fn(&[u8]) -> Option<(usize, bool)>,
{
    let mut name = host;
    loop {
        let (len, private) = lookup(name.as_bytes())?;
        let suffix = name.get(name.len().checked_sub(len)?..)?;
        if !private {
            return Some(suffix);
        }
        match suffix.split_once('.') {
            Some((_, rest)) => name = rest,
            None => return Some(suffix),
        }
    }
}
