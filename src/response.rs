//! Buffered outbound response sink.
//!
//! Handlers and middleware write into this buffer through [`Context`]
//! (crate::Context); the transport converts the finished buffer into a wire
//! response after dispatch completes. Buffering is what lets after-middleware
//! observe the status a handler wrote, and what lets the pipeline fail
//! closed when a body cannot be serialized.

use bytes::Bytes;
use http::StatusCode;
use http_body_util::Full;

/// The outbound half of a request.
///
/// The status line is recorded at most once — further attempts are ignored.
/// Headers and body bytes accumulate. An uncommitted response goes out as
/// `200 OK`, matching the transport collaborator's contract.
#[derive(Debug, Default)]
pub struct Response {
    status: u16,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
    committed: bool,
    size: u64,
}

impl Response {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Records the status line. Only the first call has any effect.
    pub fn write_header(&mut self, code: u16) {
        if self.committed {
            return;
        }
        self.status = code;
        self.committed = true;
    }

    /// Appends body bytes, committing the response as `200 OK` first if no
    /// status was written yet. Returns the number of bytes accepted.
    pub fn write(&mut self, bytes: &[u8]) -> usize {
        if !self.committed {
            self.write_header(200);
        }
        self.body.extend_from_slice(bytes);
        self.size += bytes.len() as u64;
        bytes.len()
    }

    /// Replace-or-insert a header. Names compare case-insensitively.
    pub fn set_header(&mut self, name: &str, value: &str) {
        match self.headers.iter_mut().find(|(n, _)| n.eq_ignore_ascii_case(name)) {
            Some((_, v)) => *v = value.to_owned(),
            None => self.headers.push((name.to_owned(), value.to_owned())),
        }
    }

    /// Appends a header without touching earlier values of the same name.
    pub fn add_header(&mut self, name: &str, value: &str) {
        self.headers.push((name.to_owned(), value.to_owned()));
    }

    /// The status that will go on the wire: the committed code, or 200.
    pub fn status(&self) -> u16 {
        if self.committed { self.status } else { 200 }
    }

    /// Whether the status line has been written.
    pub fn committed(&self) -> bool {
        self.committed
    }

    /// Case-insensitive lookup of the first header with `name`.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Total body bytes written so far.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Converts the buffer into a hyper-compatible response.
    pub(crate) fn into_http(self) -> http::Response<Full<Bytes>> {
        let status =
            StatusCode::from_u16(self.status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let mut builder = http::Response::builder().status(status);
        for (name, value) in &self.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        match builder.body(Full::new(Bytes::from(self.body))) {
            Ok(response) => response,
            Err(err) => {
                // A handler smuggled an invalid header name or value in.
                tracing::error!("response conversion failed: {err}");
                let mut fallback = http::Response::new(Full::new(Bytes::new()));
                *fallback.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
                fallback
            }
        }
    }
}
