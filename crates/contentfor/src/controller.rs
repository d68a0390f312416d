//! Per-request controllers.
//!
//! [`Controller`] is the base every action works with: the controller and
//! action names, the request, the render arguments and the shared
//! [`Views`]. [`LayoutController`] adds layouts and named content regions
//! on top of it.
//!
//! # Example
//!
//! ```rust,ignore
//! fn show(c: &mut LayoutController) -> ActionOutcome {
//!     let hotel = find_hotel()?;
//!     c.layout("booking.html");
//!     c.content_for("sidebar", "hotel_sidebar.html")?;
//!     Ok(c.render(RenderArgs::new().with("hotel", hotel)))
//! }
//! ```
//!
//! With the default `html` format this renders `Hotels/Show.html` inside
//! `booking.html`, and the layout can call `yield("sidebar")` to place
//! `Hotels/hotel_sidebar.html` (or a top-level `hotel_sidebar.html`).

use std::collections::BTreeMap;
use std::error::Error;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use contentfor_render::{RenderArgs, TemplateHandle, TemplateSet};

use crate::error::LayoutError;
use crate::layout_result::RenderLayoutResult;
use crate::response::Request;
use crate::result::{ActionResult, ErrorResult};
use crate::views::Views;

/// The per-request controller state shared by every action.
#[derive(Debug)]
pub struct Controller {
    /// Controller name, used as the template directory (`Hotels`).
    pub name: String,
    /// Action name, used as the template file stem (`Show`).
    pub action: String,
    pub request: Request,
    pub render_args: RenderArgs,
    views: Arc<Views>,
}

impl Controller {
    pub fn new(
        views: Arc<Views>,
        name: impl Into<String>,
        action: impl Into<String>,
        request: Request,
    ) -> Self {
        Self {
            name: name.into(),
            action: action.into(),
            request,
            render_args: RenderArgs::new(),
            views,
        }
    }

    pub fn views(&self) -> &Arc<Views> {
        &self.views
    }

    /// The action's own template: `<Controller>/<Action>.<format>`.
    pub fn template_path(&self) -> String {
        format!("{}/{}.{}", self.name, self.action, self.request.format)
    }

    /// Renders `path` from the view templates without a layout.
    pub fn render_template(&self, path: &str) -> Box<dyn ActionResult> {
        self.render_template_with_content(path, BTreeMap::new())
    }

    pub(crate) fn render_template_with_content(
        &self,
        path: &str,
        content: BTreeMap<String, TemplateHandle>,
    ) -> Box<dyn ActionResult> {
        match self.views.templates().template(path) {
            Ok(template) => Box::new(RenderLayoutResult::new(
                template,
                None,
                self.render_args.clone(),
                content,
                Arc::clone(&self.views),
            )),
            Err(err) => self.render_error(&err),
        }
    }

    /// A 500 error page describing `err`.
    pub fn render_error(&self, err: &dyn Error) -> Box<dyn ActionResult> {
        tracing::error!(
            controller = %self.name,
            action = %self.action,
            error = %err,
            "action failed"
        );
        let error = self.views.source_error("Template Error", err);
        Box::new(
            ErrorResult::new(self.render_args.clone(), error)
                .with_templates(Arc::clone(self.views.templates())),
        )
    }
}

/// A controller that renders inside layouts and fills named content regions.
///
/// Dereferences to the wrapped [`Controller`].
#[derive(Debug)]
pub struct LayoutController {
    pub controller: Controller,
    /// Content registered with [`content_for`](Self::content_for), by yield name.
    pub render_tmpl: BTreeMap<String, TemplateHandle>,
    /// Layout chosen with [`layout`](Self::layout).
    pub layout_path: Option<String>,
    no_layout: bool,
}

impl LayoutController {
    pub fn new(controller: Controller) -> Self {
        Self {
            controller,
            render_tmpl: BTreeMap::new(),
            layout_path: None,
            no_layout: false,
        }
    }

    /// Chooses the layout for this request. An empty name disables layouts.
    pub fn layout(&mut self, name: &str) {
        if name.is_empty() {
            self.no_layout = true;
        } else {
            self.layout_path = Some(name.to_string());
        }
    }

    /// Whether layouts were disabled with `layout("")`.
    pub fn no_layout(&self) -> bool {
        self.no_layout
    }

    /// Registers `template_name` as the content of the `yield_name` region.
    ///
    /// The name is looked up as given, then under the controller's own
    /// directory (`<Controller>/<template_name>`).
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::ContentNotFound`] if neither name resolves.
    pub fn content_for(&mut self, yield_name: &str, template_name: &str) -> Result<(), LayoutError> {
        let templates = self.controller.views.templates();
        let scoped = format!("{}/{}", self.controller.name, template_name);
        let template = templates
            .template(template_name)
            .or_else(|_| templates.template(&scoped))
            .map_err(|_| LayoutError::ContentNotFound {
                yield_name: yield_name.to_string(),
                template: template_name.to_string(),
            })?;

        tracing::debug!(yield_name, template = template.name(), "registered content");
        self.render_tmpl.insert(yield_name.to_string(), template);
        Ok(())
    }

    /// Renders the action's template, inside a layout when one applies.
    ///
    /// `args` are merged into the render arguments. The layout is skipped
    /// when layouts were disabled, or when none was chosen and the request
    /// format has no default layout.
    pub fn render(&mut self, args: RenderArgs) -> Box<dyn ActionResult> {
        self.controller.render_args.extend(args);
        let path = self.controller.template_path();

        let default_layout = self
            .controller
            .views
            .config()
            .default_layout(&self.controller.request.format)
            .map(str::to_string);
        if self.no_layout || (self.layout_path.is_none() && default_layout.is_none()) {
            return self
                .controller
                .render_template_with_content(&path, self.render_tmpl.clone());
        }

        if self.layout_path.is_none() {
            self.layout_path = default_layout;
        }
        self.render_template_with_layout(&path)
    }

    /// Renders `path` inside the chosen layout.
    ///
    /// Falls back to the format's default layout when none was chosen; with
    /// neither, the result is an error page.
    pub fn render_template_with_layout(&mut self, path: &str) -> Box<dyn ActionResult> {
        match self.prepare_layout_render(path) {
            Ok(result) => Box::new(result),
            Err(err) => self.controller.render_error(&err),
        }
    }

    fn prepare_layout_render(&mut self, path: &str) -> Result<RenderLayoutResult, LayoutError> {
        let views = Arc::clone(&self.controller.views);
        let layouts = views.layouts()?;
        let template = views.templates().template(path)?;

        let format = &self.controller.request.format;
        let layout_name = match &self.layout_path {
            Some(name) => name.clone(),
            None => views
                .config()
                .default_layout(format)
                .map(str::to_string)
                .ok_or_else(|| LayoutError::NoLayout {
                    format: format.clone(),
                })?,
        };
        let layout = resolve_layout(layouts, &layout_name, format)?;
        self.layout_path = Some(layout_name);

        Ok(RenderLayoutResult::new(
            template,
            Some(layout),
            self.controller.render_args.clone(),
            self.render_tmpl.clone(),
            views,
        ))
    }
}

/// Looks a layout up by name, then with `.<format>` appended.
fn resolve_layout(
    layouts: &Arc<TemplateSet>,
    name: &str,
    format: &str,
) -> Result<TemplateHandle, LayoutError> {
    layouts
        .template(name)
        .or_else(|_| layouts.template(&format!("{}.{}", name, format)))
        .map_err(|_| LayoutError::LayoutNotFound {
            name: name.to_string(),
        })
}

impl Deref for LayoutController {
    type Target = Controller;

    fn deref(&self) -> &Controller {
        &self.controller
    }
}

impl DerefMut for LayoutController {
    fn deref_mut(&mut self) -> &mut Controller {
        &mut self.controller
    }
}
