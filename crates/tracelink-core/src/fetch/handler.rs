//! Easy2 handler for a single hop: collects headers and a bounded body,
//! and aborts the transfer when the trace is cancelled.

use std::str;

use crate::control::CancelToken;

use super::parse::parse_status_line;

pub(super) struct HopHandler {
    cancel: CancelToken,
    max_body_bytes: usize,
    pub(super) header_lines: Vec<String>,
    pub(super) body: Vec<u8>,
    /// Set when the body hit `max_body_bytes` and the rest of the transfer was dropped.
    pub(super) truncated: bool,
    /// Set when the progress callback saw the cancel token.
    pub(super) cancelled: bool,
}

impl HopHandler {
    pub(super) fn new(cancel: CancelToken, max_body_bytes: usize) -> Self {
        Self {
            cancel,
            max_body_bytes,
            header_lines: Vec::new(),
            body: Vec::new(),
            truncated: false,
            cancelled: false,
        }
    }
}

impl curl::easy::Handler for HopHandler {
    fn header(&mut self, data: &[u8]) -> bool {
        if let Ok(s) = str::from_utf8(data) {
            let line = s.trim_end();
            // A new status line starts a new header block (e.g. after 100 Continue).
            if parse_status_line(line).is_some() {
                self.header_lines.clear();
            }
            self.header_lines.push(line.to_string());
        }
        true
    }

    fn write(&mut self, data: &[u8]) -> Result<usize, curl::easy::WriteError> {
        let room = self.max_body_bytes.saturating_sub(self.body.len());
        if data.len() > room {
            self.body.extend_from_slice(&data[..room]);
            self.truncated = true;
            return Ok(0); // abort transfer
        }
        self.body.extend_from_slice(data);
        Ok(data.len())
    }

    fn progress(&mut self, _dltotal: f64, _dlnow: f64, _ultotal: f64, _ulnow: f64) -> bool {
        if self.cancel.is_cancelled() {
            self.cancelled = true;
            return false;
        }
        true
    }
}
