//! Action results: what an action hands back to be written to the response.
//!
//! An action never writes to the response directly. It returns a value
//! implementing [`ActionResult`], and the caller applies it once the action
//! has finished. This keeps every write to the response in one place:
//!
//! - [`RenderLayoutResult`](crate::RenderLayoutResult): a page, optionally
//!   wrapped in a layout
//! - [`ErrorResult`]: a structured error page
//! - [`PlaintextErrorResult`]: a bare `text/plain` 500

use std::io::Write;
use std::sync::Arc;

use contentfor_render::{RenderArgs, TemplateSet};
use http::StatusCode;

use crate::error::SourceError;
use crate::response::{Request, Response};

const PLAINTEXT: &str = "text/plain; charset=utf-8";

/// Something that can write itself to a response.
pub trait ActionResult {
    fn apply(&mut self, req: &Request, resp: &mut Response);
}

/// The content type for a request format, always with a UTF-8 charset.
///
/// Unknown formats are served as HTML.
pub fn content_type_for(format: &str) -> &'static str {
    match format {
        "json" => "application/json; charset=utf-8",
        "xml" => "application/xml; charset=utf-8",
        "txt" => PLAINTEXT,
        "js" => "application/javascript; charset=utf-8",
        "css" => "text/css; charset=utf-8",
        _ => "text/html; charset=utf-8",
    }
}

fn write_body(req: &Request, resp: &mut Response, body: &[u8]) {
    if req.is_head() {
        return;
    }
    if let Err(err) = resp.write_all(body) {
        tracing::warn!(error = %err, path = %req.path, "failed to write response body");
    }
}

/// A 500 with the error text as a plain-text body.
#[derive(Debug, Clone)]
pub struct PlaintextErrorResult {
    pub error: String,
}

impl PlaintextErrorResult {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

impl ActionResult for PlaintextErrorResult {
    fn apply(&mut self, req: &Request, resp: &mut Response) {
        resp.write_header(StatusCode::INTERNAL_SERVER_ERROR, PLAINTEXT);
        write_body(req, resp, self.error.as_bytes());
    }
}

/// An error page.
///
/// The status is taken from the response when it already holds an error
/// status, else 500. When the view templates contain
/// `errors/<status>.<format>` that template renders the page with the render
/// arguments plus `Error` (the [`SourceError`]) and `Status`. Otherwise the
/// error is written as plain text with its source context.
#[derive(Debug)]
pub struct ErrorResult {
    pub render_args: RenderArgs,
    pub error: SourceError,
    templates: Option<Arc<TemplateSet>>,
}

impl ErrorResult {
    pub fn new(render_args: RenderArgs, error: SourceError) -> Self {
        Self {
            render_args,
            error,
            templates: None,
        }
    }

    /// Looks for error page templates in `templates`.
    pub fn with_templates(mut self, templates: Arc<TemplateSet>) -> Self {
        self.templates = Some(templates);
        self
    }

    fn render_page(&self, status: StatusCode, format: &str) -> Option<String> {
        let templates = self.templates.as_ref()?;
        let name = format!("errors/{}.{}", status.as_u16(), format);
        let template = templates.template(&name).ok()?;

        let mut args = self.render_args.clone();
        args.insert("Error", &self.error);
        args.insert("Status", status.as_u16());
        match template.render_to_string(&args.to_value()) {
            Ok(page) => Some(page),
            Err(err) => {
                tracing::warn!(
                    template = template.name(),
                    error = %err,
                    "error page template failed, falling back to plain text"
                );
                None
            }
        }
    }
}

impl ActionResult for ErrorResult {
    fn apply(&mut self, req: &Request, resp: &mut Response) {
        let status = resp.error_status();
        resp.status = Some(status);

        match self.render_page(status, &req.format) {
            Some(page) => {
                resp.write_header(status, content_type_for(&req.format));
                write_body(req, resp, page.as_bytes());
            }
            None => {
                resp.write_header(status, PLAINTEXT);
                write_body(req, resp, self.error.to_plaintext().as_bytes());
            }
        }
    }
}
