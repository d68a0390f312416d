//! The request and response an action result is applied to.
//!
//! These are deliberately small: a result only needs the request method and
//! format, and a response it can set a status and headers on before writing
//! the body. [`Response`] wraps any `io::Write` sink; [`SharedBody`] is an
//! in-memory sink that can be inspected after the response is dropped.

use std::io::{self, Write};
use std::sync::{Arc, Mutex, PoisonError};

use http::header::{HeaderValue, CONTENT_LENGTH, CONTENT_TYPE};
use http::{HeaderMap, Method, StatusCode};

/// The request format used when none is negotiated.
pub const DEFAULT_FORMAT: &str = "html";

/// The parts of an incoming request that rendering depends on.
#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    /// Response format, such as `html` or `json`.
    pub format: String,
    pub path: String,
}

impl Request {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            format: DEFAULT_FORMAT.to_string(),
            path: path.into(),
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn head(path: impl Into<String>) -> Self {
        Self::new(Method::HEAD, path)
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = format.into();
        self
    }

    /// HEAD requests get headers but no body.
    pub fn is_head(&self) -> bool {
        self.method == Method::HEAD
    }
}

/// An outgoing response.
///
/// The status line and headers are sent once, by the first call to
/// [`write_header`](Self::write_header) or the first body write. A status
/// set on [`status`](Self::status) beforehand takes precedence over the
/// default passed to `write_header`.
pub struct Response {
    /// Status to send; `None` lets `write_header` choose.
    pub status: Option<StatusCode>,
    pub headers: HeaderMap,
    out: Box<dyn Write + Send>,
    sent_status: Option<StatusCode>,
}

impl Response {
    pub fn new(out: impl Write + Send + 'static) -> Self {
        Self {
            status: None,
            headers: HeaderMap::new(),
            out: Box::new(out),
            sent_status: None,
        }
    }

    /// Sends the status line and headers.
    ///
    /// Later calls are ignored: once the header has gone out neither the
    /// status nor the content type can change.
    pub fn write_header(&mut self, default_status: StatusCode, content_type: &str) {
        if self.sent_status.is_some() {
            tracing::debug!(
                status = %default_status,
                "response header already written, ignoring"
            );
            return;
        }

        let status = *self.status.get_or_insert(default_status);
        if !self.headers.contains_key(CONTENT_TYPE) {
            match HeaderValue::from_str(content_type) {
                Ok(value) => {
                    self.headers.insert(CONTENT_TYPE, value);
                }
                Err(err) => {
                    tracing::warn!(content_type, error = %err, "invalid content type");
                }
            }
        }
        tracing::trace!(status = %status, "response header written");
        self.sent_status = Some(status);
    }

    /// Sets `Content-Length`; has no effect once the header is written.
    pub fn set_content_length(&mut self, len: usize) {
        if self.header_written() {
            return;
        }
        self.headers.insert(CONTENT_LENGTH, HeaderValue::from(len));
    }

    pub fn header_written(&self) -> bool {
        self.sent_status.is_some()
    }

    /// The status that was sent, if the header has been written.
    pub fn written_status(&self) -> Option<StatusCode> {
        self.sent_status
    }

    /// The status a result should report for an error: the preset status
    /// when it is already an error, else 500.
    pub fn error_status(&self) -> StatusCode {
        self.status
            .filter(|status| status.is_client_error() || status.is_server_error())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl Write for Response {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if !self.header_written() {
            self.write_header(StatusCode::OK, "text/html; charset=utf-8");
        }
        self.out.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}

impl std::fmt::Debug for Response {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Response")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .field("sent_status", &self.sent_status)
            .finish()
    }
}

/// An in-memory body sink shared between a [`Response`] and its owner.
#[derive(Debug, Clone, Default)]
pub struct SharedBody {
    bytes: Arc<Mutex<Vec<u8>>>,
}

impl SharedBody {
    pub fn new() -> Self {
        Self::default()
    }

    /// A copy of everything written so far.
    pub fn contents(&self) -> Vec<u8> {
        self.bytes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn to_string_lossy(&self) -> String {
        String::from_utf8_lossy(&self.contents()).into_owned()
    }

    pub fn len(&self) -> usize {
        self.bytes.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Write for SharedBody {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.bytes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
