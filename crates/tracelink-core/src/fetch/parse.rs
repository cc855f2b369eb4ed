//! Parse HTTP response header lines collected by the curl handler.

use std::collections::BTreeMap;

/// Extract the status code from a status line such as `HTTP/1.1 301 Moved Permanently`.
pub(crate) fn parse_status_line(line: &str) -> Option<u16> {
    let mut parts = line.split_whitespace();
    let proto = parts.next()?;
    if !proto.starts_with("HTTP/") {
        return None;
    }
    parts.next()?.parse().ok()
}

/// Parse collected header lines into a name → value map.
///
/// The status line and blank separator lines are skipped. Repeated headers
/// are joined with `", "`; the first spelling of the name is kept.
pub(crate) fn parse_headers(lines: &[String]) -> BTreeMap<String, String> {
    let mut headers: BTreeMap<String, String> = BTreeMap::new();

    for line in lines {
        let line = line.trim();
        if line.is_empty() || line.starts_with("HTTP/") {
            continue;
        }
        let Some((name, value)) = line.split_once(':') else {
            continue;
        };
        let name = name.trim();
        let value = value.trim();
        if name.is_empty() {
            continue;
        }
        let existing = headers
            .keys()
            .find(|k| k.eq_ignore_ascii_case(name))
            .cloned();
        match existing {
            Some(key) => {
                if let Some(v) = headers.get_mut(&key) {
                    v.push_str(", ");
                    v.push_str(value);
                }
            }
            None => {
                headers.insert(name.to_string(), value.to_string());
            }
        }
    }

    headers
}
