use contentfor::{
    invoke, ActionOutcome, Config, Controller, LayoutController, RenderArgs, Request, Response,
    SharedBody, Views,
};
use http::header::{CONTENT_LENGTH, CONTENT_TYPE};
use http::StatusCode;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

fn write(root: &Path, name: &str, content: &str) {
    let path = root.join(name);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

// A small booking app on disk: views, layouts and an error page
fn booking_app() -> TempDir {
    let base = TempDir::new().unwrap();
    let root = base.path();
    write(root, "app/views/Hotels/Show.html", "<h1>{{ hotel }}</h1>");
    write(root, "app/views/Hotels/Show.json", "{\"hotel\": \"Ritz\"}");
    write(root, "app/views/Hotels/sidebar.html", "<nav>{{ hotel }} nearby</nav>");
    write(root, "app/views/Hotels/Broken.html", "<p>before</p>\n{{ undefined_helper() }}");
    write(root, "app/views/footer.html", "<footer>Booking</footer>");
    write(
        root,
        "app/layouts/application.html",
        "<html>{% if could_yield('sidebar') %}<aside>{{ yield('sidebar') }}</aside>{% endif %}<main>{{ yield() }}</main>{{ yield('footer') }}</html>",
    );
    write(root, "app/layouts/admin.html", "<admin>{{ yield() }}</admin>");
    base
}

fn config(base: &TempDir) -> Config {
    Config::from_yaml_str(&format!(
        "base_path: {}\nlayouts:\n  default:\n    html: application.html\n",
        base.path().display()
    ))
    .unwrap()
}

fn run<F>(views: &Arc<Views>, action: &str, req: Request, f: F) -> (Response, SharedBody)
where
    F: FnOnce(&mut LayoutController) -> ActionOutcome,
{
    let body = SharedBody::new();
    let mut resp = Response::new(body.clone());
    let mut controller =
        LayoutController::new(Controller::new(Arc::clone(views), "Hotels", action, req));
    invoke(&mut controller, f, &mut resp);
    (resp, body)
}

#[test]
fn test_default_layout_wraps_action_template() {
    let base = booking_app();
    let views = Arc::new(Views::load(config(&base)).unwrap());

    let (resp, body) = run(&views, "Show", Request::get("/hotels/1"), |c| {
        Ok(c.render(RenderArgs::new().with("hotel", "Ritz")))
    });

    assert_eq!(resp.written_status(), Some(StatusCode::OK));
    assert_eq!(body.to_string_lossy(), "<html><main><h1>Ritz</h1></main></html>");
    assert_eq!(
        resp.headers[CONTENT_LENGTH],
        body.len().to_string().as_str()
    );
}

#[test]
fn test_content_for_fills_named_regions() {
    let base = booking_app();
    let views = Arc::new(Views::load(config(&base)).unwrap());

    let (_, body) = run(&views, "Show", Request::get("/hotels/1"), |c| {
        c.content_for("sidebar", "sidebar.html")?;
        c.content_for("footer", "footer.html")?;
        Ok(c.render(RenderArgs::new().with("hotel", "Ritz")))
    });

    assert_eq!(
        body.to_string_lossy(),
        "<html><aside><nav>Ritz nearby</nav></aside><main><h1>Ritz</h1></main><footer>Booking</footer></html>"
    );
}

#[test]
fn test_explicit_layout_with_format_suffix() {
    let base = booking_app();
    let views = Arc::new(Views::load(config(&base)).unwrap());

    let (_, body) = run(&views, "Show", Request::get("/hotels/1"), |c| {
        c.layout("admin");
        Ok(c.render(RenderArgs::new().with("hotel", "Ritz")))
    });

    assert_eq!(body.to_string_lossy(), "<admin><h1>Ritz</h1></admin>");
}

#[test]
fn test_disabled_layout_renders_plain_template() {
    let base = booking_app();
    let views = Arc::new(Views::load(config(&base)).unwrap());

    let (_, body) = run(&views, "Show", Request::get("/hotels/1"), |c| {
        c.layout("");
        Ok(c.render(RenderArgs::new().with("hotel", "Ritz")))
    });

    assert_eq!(body.to_string_lossy(), "<h1>Ritz</h1>");
}

#[test]
fn test_format_without_default_layout_skips_layout() {
    let base = booking_app();
    let views = Arc::new(Views::load(config(&base)).unwrap());

    let (resp, body) = run(
        &views,
        "Show",
        Request::get("/hotels/1").with_format("json"),
        |c| Ok(c.render(RenderArgs::new())),
    );

    assert_eq!(resp.headers[CONTENT_TYPE], "application/json; charset=utf-8");
    assert_eq!(body.to_string_lossy(), "{\"hotel\": \"Ritz\"}");
}

#[test]
fn test_head_request_has_headers_and_no_body() {
    let base = booking_app();
    let views = Arc::new(Views::load(config(&base)).unwrap());

    let (resp, body) = run(&views, "Show", Request::head("/hotels/1"), |c| {
        Ok(c.render(RenderArgs::new().with("hotel", "Ritz")))
    });

    assert_eq!(resp.written_status(), Some(StatusCode::OK));
    assert_eq!(resp.headers[CONTENT_LENGTH], "39");
    assert!(body.is_empty());
}

#[test]
fn test_buffered_failure_shows_only_error_page() {
    let base = booking_app();
    let views = Arc::new(Views::load(config(&base)).unwrap());

    let (resp, body) = run(&views, "Broken", Request::get("/hotels/broken"), |c| {
        Ok(c.render(RenderArgs::new()))
    });

    let text = body.to_string_lossy();
    assert_eq!(resp.written_status(), Some(StatusCode::INTERNAL_SERVER_ERROR));
    assert!(!text.contains("<html>"));
    assert!(text.starts_with("Layout Execution Error Hotels/Broken.html:2:"));
    assert!(text.contains("> 2 | {{ undefined_helper() }}"));
}

#[test]
fn test_streaming_failure_keeps_partial_page() {
    let base = booking_app();
    let views = Arc::new(Views::load(config(&base).with_chunked(true)).unwrap());

    let (resp, body) = run(&views, "Broken", Request::get("/hotels/broken"), |c| {
        Ok(c.render(RenderArgs::new()))
    });

    let text = body.to_string_lossy();
    assert_eq!(resp.written_status(), Some(StatusCode::OK));
    assert!(text.starts_with("<html>"));
    assert!(text.contains("Layout Execution Error Hotels/Broken.html:2:"));
}

#[test]
fn test_error_page_template_is_used() {
    let base = booking_app();
    write(
        base.path(),
        "app/views/errors/500.html",
        "<h1>{{ Error.title }}</h1><p>{{ Error.path }} line {{ Error.line }}</p>",
    );
    let views = Arc::new(Views::load(config(&base)).unwrap());

    let (resp, body) = run(&views, "Broken", Request::get("/hotels/broken"), |c| {
        Ok(c.render(RenderArgs::new()))
    });

    assert_eq!(resp.written_status(), Some(StatusCode::INTERNAL_SERVER_ERROR));
    assert_eq!(
        body.to_string_lossy(),
        "<h1>Layout Execution Error</h1><p>Hotels&#x2f;Broken.html line 2</p>"
    );
}

#[test]
fn test_missing_content_template_is_error_result() {
    let base = booking_app();
    let views = Arc::new(Views::load(config(&base)).unwrap());

    let (resp, body) = run(&views, "Show", Request::get("/hotels/1"), |c| {
        c.content_for("sidebar", "nope.html")?;
        Ok(c.render(RenderArgs::new()))
    });

    assert_eq!(resp.written_status(), Some(StatusCode::INTERNAL_SERVER_ERROR));
    assert!(body.to_string_lossy().contains("nope.html not found"));
}

#[test]
fn test_layout_load_retried_after_failure() {
    let base = booking_app();
    fs::remove_dir_all(base.path().join("app/layouts")).unwrap();
    let views = Arc::new(Views::load(config(&base)).unwrap());

    let (resp, body) = run(&views, "Show", Request::get("/hotels/1"), |c| {
        Ok(c.render(RenderArgs::new().with("hotel", "Ritz")))
    });
    assert_eq!(resp.written_status(), Some(StatusCode::INTERNAL_SERVER_ERROR));
    assert!(body.to_string_lossy().contains("failed to load layouts"));

    write(base.path(), "app/layouts/application.html", "<main>{{ yield() }}</main>");
    let (resp, body) = run(&views, "Show", Request::get("/hotels/1"), |c| {
        Ok(c.render(RenderArgs::new().with("hotel", "Ritz")))
    });
    assert_eq!(resp.written_status(), Some(StatusCode::OK));
    assert_eq!(body.to_string_lossy(), "<main><h1>Ritz</h1></main>");
}

#[test]
fn test_positional_render_args() {
    let base = booking_app();
    let views = Arc::new(Views::load(config(&base)).unwrap());

    let (_, body) = run(&views, "Show", Request::get("/hotels/1"), |c| {
        let args = RenderArgs::zip(&["hotel"], vec!["Savoy".into()]);
        Ok(c.render(args))
    });
    assert_eq!(body.to_string_lossy(), "<html><main><h1>Savoy</h1></main></html>");
}
