//! Response collaborator attached to request messages.

use std::collections::HashMap;

/// A response being produced for a request message.
///
/// Calling [`Response::end`] finishes the response and terminates the chain
/// level that is currently running.
#[derive(Debug, Clone)]
pub struct Response {
    /// HTTP status code.
    pub status: u16,
    /// Response headers.
    pub headers: HashMap<String, String>,
    /// Response body.
    pub body: Vec<u8>,
    finished: bool,
    end_signal: bool,
}

impl Default for Response {
    fn default() -> Self {
        Self::ok()
    }
}

impl Response {
    /// Creates a new response with the given status.
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: HashMap::new(),
            body: Vec::new(),
            finished: false,
            end_signal: false,
        }
    }

    /// Creates a 200 OK response.
    pub fn ok() -> Self {
        Self::new(200)
    }

    /// Sets the status code.
    pub fn set_status(&mut self, status: u16) -> &mut Self {
        self.status = status;
        self
    }

    /// Sets a header.
    pub fn set_header(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Appends bytes to the body.
    pub fn write(&mut self, data: impl AsRef<[u8]>) -> &mut Self {
        self.body.extend_from_slice(data.as_ref());
        self
    }

    /// Returns the body as a string.
    pub fn body_string(&self) -> Option<String> {
        String::from_utf8(self.body.clone()).ok()
    }

    /// Finishes the response.
    pub fn end(&mut self) {
        self.finished = true;
        self.end_signal = true;
    }

    /// Whether [`end`](Self::end) has been called.
    pub const fn is_finished(&self) -> bool {
        self.finished
    }

    pub(crate) const fn end_signal_pending(&self) -> bool {
        self.end_signal
    }

    /// Consumes a pending end signal.
    pub(crate) fn take_end_signal(&mut self) -> bool {
        std::mem::take(&mut self.end_signal)
    }
}
