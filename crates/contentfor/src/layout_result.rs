//! The result that renders a page, optionally inside a layout.
//!
//! # Output modes
//!
//! | Mode | When | Behavior |
//! |------|------|----------|
//! | Buffered | default, and always in dev mode | render into memory, then write `200` with `Content-Length` |
//! | Streaming | `results.chunked` outside dev mode | write `200`, then render straight into the response |
//!
//! Buffered rendering never exposes a half-rendered page: a failure turns
//! into an error page and nothing of the page is written. Streaming sends the
//! status before rendering starts, so a late failure leaves the partial page
//! followed by the error output under a `200`.
//!
//! HEAD requests render the page the same way but write no body.

use std::any::Any;
use std::collections::BTreeMap;
use std::io::{self, Write};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use contentfor_render::{
    ContentForItems, RenderArgs, RenderError, TemplateHandle, Value, CONTENT_FOR_ITEMS,
};
use http::StatusCode;

use crate::error::SourceError;
use crate::parse::parse_template_error;
use crate::response::{Request, Response};
use crate::result::{content_type_for, ActionResult, ErrorResult, PlaintextErrorResult};
use crate::views::Views;

/// Renders `template`, wrapped in `layout` when one is set.
///
/// The render context is the render arguments plus `ContentForItems`:
/// `template` under the empty name and every `render_tmpl` entry under its
/// yield name.
#[derive(Debug)]
pub struct RenderLayoutResult {
    pub template: TemplateHandle,
    pub layout: Option<TemplateHandle>,
    pub render_args: RenderArgs,
    pub render_tmpl: BTreeMap<String, TemplateHandle>,
    views: Arc<Views>,
}

impl RenderLayoutResult {
    pub fn new(
        template: TemplateHandle,
        layout: Option<TemplateHandle>,
        render_args: RenderArgs,
        render_tmpl: BTreeMap<String, TemplateHandle>,
        views: Arc<Views>,
    ) -> Self {
        Self {
            template,
            layout,
            render_args,
            render_tmpl,
            views,
        }
    }

    /// The template rendered first: the layout, or the page itself.
    fn entry(&self) -> &TemplateHandle {
        self.layout.as_ref().unwrap_or(&self.template)
    }

    fn render_context(&self) -> Value {
        let mut items = self.render_tmpl.clone();
        items.insert(String::new(), self.template.clone());

        let mut args = self.render_args.clone();
        args.remove(CONTENT_FOR_ITEMS);
        ContentForItems::new(args, items).into_render_context()
    }

    fn apply_rendering(&self, req: &Request, resp: &mut Response) {
        let content_type = content_type_for(&req.format);
        let context = self.render_context();
        let entry = self.entry();

        if self.views.config().streams_results() {
            resp.write_header(StatusCode::OK, content_type);
            let rendered = if req.is_head() {
                entry.render(io::sink(), &context)
            } else {
                entry.render(&mut *resp, &context)
            };
            if let Err(err) = rendered {
                self.render_error(req, resp, &err);
            }
            return;
        }

        let mut page = Vec::new();
        if let Err(err) = entry.render(&mut page, &context) {
            self.render_error(req, resp, &err);
            return;
        }

        if !self.views.config().results.chunked {
            resp.set_content_length(page.len());
        }
        resp.write_header(StatusCode::OK, content_type);
        if req.is_head() {
            return;
        }
        if let Err(err) = resp.write_all(&page) {
            tracing::warn!(
                template = entry.name(),
                error = %err,
                "failed to write rendered page"
            );
        }
    }

    fn render_error(&self, req: &Request, resp: &mut Response, err: &RenderError) {
        let parsed = parse_template_error(&err.to_string());
        let (path, source_lines) = if parsed.template_name.is_empty() {
            let entry = self.entry();
            (entry.name().to_string(), entry.content())
        } else {
            let lines = self
                .views
                .source_lines(&parsed.template_name)
                .unwrap_or_default();
            (parsed.template_name, lines)
        };

        let error = SourceError {
            title: "Layout Execution Error".to_string(),
            path,
            description: parsed.description,
            line: parsed.line,
            source_lines,
        };
        tracing::error!(
            template = %error.path,
            line = error.line,
            description = %error.description,
            "template execution error"
        );

        resp.status = Some(StatusCode::INTERNAL_SERVER_ERROR);
        ErrorResult::new(self.render_args.clone(), error)
            .with_templates(Arc::clone(self.views.templates()))
            .apply(req, resp);
    }
}

impl ActionResult for RenderLayoutResult {
    fn apply(&mut self, req: &Request, resp: &mut Response) {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.apply_rendering(req, resp)));
        if let Err(payload) = outcome {
            let message = panic_message(&*payload);
            tracing::error!(
                template = self.template.name(),
                panic = %message,
                "template execution panicked"
            );
            PlaintextErrorResult::new(format!(
                "Template Execution Panic in {}:\n{}",
                self.template.name(),
                message
            ))
            .apply(req, resp);
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::response::SharedBody;
    use contentfor_render::TemplateSet;
    use http::header::{CONTENT_LENGTH, CONTENT_TYPE};

    fn views(config: Config, templates: &[(&str, &str)], layouts: &[(&str, &str)]) -> Arc<Views> {
        Arc::new(
            Views::new(config, Arc::new(TemplateSet::from_inline(templates).unwrap()))
                .with_layouts(Arc::new(TemplateSet::from_inline(layouts).unwrap())),
        )
    }

    fn result(views: &Arc<Views>, template: &str, layout: Option<&str>) -> RenderLayoutResult {
        RenderLayoutResult::new(
            views.templates().template(template).unwrap(),
            layout.map(|name| views.layouts().unwrap().template(name).unwrap()),
            RenderArgs::new().with("title", "Hotels"),
            BTreeMap::new(),
            Arc::clone(views),
        )
    }

    fn apply(result: &mut RenderLayoutResult, req: Request) -> (Response, SharedBody) {
        let body = SharedBody::new();
        let mut resp = Response::new(body.clone());
        result.apply(&req, &mut resp);
        (resp, body)
    }

    #[test]
    fn test_buffered_layout_render() {
        let views = views(
            Config::new(),
            &[("Hotels/index.html", "<h1>{{ title }}</h1>")],
            &[("application.html", "<main>{{ yield() }}</main>")],
        );
        let (resp, body) = apply(
            &mut result(&views, "Hotels/index.html", Some("application.html")),
            Request::get("/hotels"),
        );

        assert_eq!(body.to_string_lossy(), "<main><h1>Hotels</h1></main>");
        assert_eq!(resp.written_status(), Some(StatusCode::OK));
        assert_eq!(resp.headers[CONTENT_TYPE], "text/html; charset=utf-8");
        assert_eq!(resp.headers[CONTENT_LENGTH], "28");
    }

    #[test]
    fn test_render_without_layout() {
        let views = views(Config::new(), &[("Hotels/index.html", "{{ title }}")], &[]);
        let (_, body) = apply(&mut result(&views, "Hotels/index.html", None), Request::get("/"));
        assert_eq!(body.to_string_lossy(), "Hotels");
    }

    #[test]
    fn test_content_for_items_cannot_be_shadowed() {
        let views = views(
            Config::new(),
            &[("page.html", "page")],
            &[("application.html", "{{ yield() }}")],
        );
        let mut result = result(&views, "page.html", Some("application.html"));
        result.render_args.insert(CONTENT_FOR_ITEMS, "bogus");

        let (_, body) = apply(&mut result, Request::get("/"));
        assert_eq!(body.to_string_lossy(), "page");
    }

    #[test]
    fn test_head_request_writes_no_body() {
        let views = views(
            Config::new(),
            &[("page.html", "page")],
            &[("application.html", "<main>{{ yield() }}</main>")],
        );
        let (resp, body) = apply(
            &mut result(&views, "page.html", Some("application.html")),
            Request::head("/"),
        );

        assert_eq!(resp.written_status(), Some(StatusCode::OK));
        assert_eq!(resp.headers[CONTENT_LENGTH], "17");
        assert!(body.is_empty());
    }

    #[test]
    fn test_streaming_head_request_writes_no_body() {
        let views = views(
            Config::new().with_chunked(true),
            &[("page.html", "page")],
            &[("application.html", "<main>{{ yield() }}</main>")],
        );
        let (resp, body) = apply(
            &mut result(&views, "page.html", Some("application.html")),
            Request::head("/"),
        );

        assert_eq!(resp.written_status(), Some(StatusCode::OK));
        assert!(!resp.headers.contains_key(CONTENT_LENGTH));
        assert!(body.is_empty());
    }

    #[test]
    fn test_buffered_failure_writes_no_page() {
        let views = views(
            Config::new(),
            &[("page.html", "first\n{{ explode() }}")],
            &[("application.html", "<main>{{ yield() }}</main>")],
        );
        let (resp, body) = apply(
            &mut result(&views, "page.html", Some("application.html")),
            Request::get("/"),
        );

        let text = body.to_string_lossy();
        assert_eq!(resp.written_status(), Some(StatusCode::INTERNAL_SERVER_ERROR));
        assert!(!text.contains("<main>"));
        assert!(!resp.headers.contains_key(CONTENT_LENGTH));
        assert!(text.starts_with("Layout Execution Error page.html:2:"));
        assert!(text.contains("> 2 | {{ explode() }}"));
    }

    #[test]
    fn test_streaming_failure_keeps_partial_page() {
        let views = views(
            Config::new().with_chunked(true),
            &[("page.html", "{{ explode() }}")],
            &[("application.html", "<main>{{ yield() }}</main>")],
        );
        let (resp, body) = apply(
            &mut result(&views, "page.html", Some("application.html")),
            Request::get("/"),
        );

        let text = body.to_string_lossy();
        assert_eq!(resp.written_status(), Some(StatusCode::OK));
        assert!(text.starts_with("<main>"));
        assert!(text.contains("Layout Execution Error page.html:1:"));
        assert!(!resp.headers.contains_key(CONTENT_LENGTH));
    }

    #[test]
    fn test_dev_mode_buffers_even_when_chunked() {
        let views = views(
            Config::new().with_chunked(true).with_dev_mode(true),
            &[("page.html", "{{ explode() }}")],
            &[("application.html", "<main>{{ yield() }}</main>")],
        );
        let (resp, body) = apply(
            &mut result(&views, "page.html", Some("application.html")),
            Request::get("/"),
        );

        assert_eq!(resp.written_status(), Some(StatusCode::INTERNAL_SERVER_ERROR));
        assert!(!body.to_string_lossy().contains("<main>"));
    }

    #[test]
    fn test_error_in_layout_uses_layout_source() {
        let views = views(
            Config::new(),
            &[("page.html", "page")],
            &[("application.html", "<main>\n{{ yield() }}\n{{ explode() }}</main>")],
        );
        let (_, body) = apply(
            &mut result(&views, "page.html", Some("application.html")),
            Request::get("/"),
        );

        let text = body.to_string_lossy();
        assert!(text.starts_with("Layout Execution Error application.html:3:"));
        assert!(text.contains("> 3 | {{ explode() }}</main>"));
    }

    #[test]
    fn test_json_format_content_type() {
        let views = views(Config::new(), &[("Hotels/index.json", "{\"title\": \"Hotels\"}")], &[]);
        let (resp, body) = apply(
            &mut result(&views, "Hotels/index.json", None),
            Request::get("/hotels").with_format("json"),
        );

        assert_eq!(resp.headers[CONTENT_TYPE], "application/json; charset=utf-8");
        assert_eq!(body.to_string_lossy(), "{\"title\": \"Hotels\"}");
    }

    struct PanicOnce {
        body: SharedBody,
        panicked: bool,
    }

    impl Write for PanicOnce {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if !self.panicked {
                self.panicked = true;
                panic!("sink exploded");
            }
            self.body.write(buf)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_panic_becomes_plaintext_error() {
        let views = views(Config::new(), &[("page.html", "page")], &[]);
        let body = SharedBody::new();
        let mut resp = Response::new(PanicOnce {
            body: body.clone(),
            panicked: false,
        });

        result(&views, "page.html", None).apply(&Request::get("/"), &mut resp);
        assert_eq!(
            body.to_string_lossy(),
            "Template Execution Panic in page.html:\nsink exploded"
        );
    }

    #[test]
    fn test_panic_message_payloads() {
        assert_eq!(panic_message(&"static"), "static");
        assert_eq!(panic_message(&String::from("owned")), "owned");
        assert_eq!(panic_message(&42u8), "unknown panic");
    }
}
