//! HTTP status semantics shown next to each hop.

/// Status codes the tracer follows via the `Location` header.
pub const REDIRECT_STATUSES: [u16; 5] = [301, 302, 303, 307, 308];

pub fn is_redirect_status(code: u16) -> bool {
    REDIRECT_STATUSES.contains(&code)
}

/// Human-readable meaning of a status code; unknown codes map to "Unknown behavior".
pub fn explain_status(code: u16) -> &'static str {
    match code {
        200 => "OK – Final content delivered.",
        301 => "Moved Permanently – browser caches this redirect.",
        302 => "Temporary Redirect – often used for tracking.",
        307 => "Temporary redirect (method preserved).",
        308 => "Permanent redirect (method preserved).",
        _ => "Unknown behavior",
    }
}
