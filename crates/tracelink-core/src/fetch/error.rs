//! Fetch error type and curl error classification.

use std::fmt;
use thiserror::Error;

/// Coarse classification of a transport failure, used in hop explanations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportKind {
    /// Connect or whole-request timeout elapsed.
    Timeout,
    /// Host (or proxy) name could not be resolved.
    Dns,
    /// Connection refused, reset, or closed without a response.
    Connection,
    /// TLS handshake or certificate verification failed.
    Tls,
    /// The URL could not be used by the client (malformed, unsupported scheme).
    InvalidUrl,
    Other,
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TransportKind::Timeout => "timeout",
            TransportKind::Dns => "DNS resolution failed",
            TransportKind::Connection => "connection failed",
            TransportKind::Tls => "TLS failure",
            TransportKind::InvalidUrl => "invalid URL",
            TransportKind::Other => "transport error",
        };
        f.write_str(s)
    }
}

/// Error returned by a single-hop fetch.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Curl reported an error (timeout, DNS, connection, TLS, ...).
    #[error("{kind}: {source}")]
    Transport {
        kind: TransportKind,
        #[source]
        source: curl::Error,
    },
    /// The caller's cancel token was set before or during the fetch.
    #[error("trace cancelled")]
    Cancelled,
}

impl FetchError {
    pub fn transport_kind(&self) -> Option<TransportKind> {
        match self {
            FetchError::Transport { kind, .. } => Some(*kind),
            FetchError::Cancelled => None,
        }
    }
}

impl From<curl::Error> for FetchError {
    fn from(source: curl::Error) -> Self {
        FetchError::Transport {
            kind: classify_curl_error(&source),
            source,
        }
    }
}

/// Classify a curl error into a transport kind.
pub fn classify_curl_error(e: &curl::Error) -> TransportKind {
    if e.is_operation_timedout() {
        return TransportKind::Timeout;
    }
    if e.is_couldnt_resolve_host() || e.is_couldnt_resolve_proxy() {
        return TransportKind::Dns;
    }
    if e.is_couldnt_connect()
        || e.is_read_error()
        || e.is_recv_error()
        || e.is_send_error()
        || e.is_got_nothing()
    {
        return TransportKind::Connection;
    }
    if e.is_ssl_connect_error()
        || e.is_peer_failed_verification()
        || e.is_ssl_certproblem()
        || e.is_ssl_cacert()
    {
        return TransportKind::Tls;
    }
    if e.is_url_malformed() || e.is_unsupported_protocol() {
        return TransportKind::InvalidUrl;
    }
    TransportKind::Other
}
