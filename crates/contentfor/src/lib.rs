//! # contentfor - Layouts and named content regions for controller actions
//!
//! `contentfor` lets a controller action render its page inside a layout and
//! fill named regions of that layout from other templates, in the style of
//! `yield` / `content_for`:
//!
//! ```jinja
//! {# app/layouts/application.html #}
//! <html>
//!   <head>{{ yield("head") }}</head>
//!   <body>
//!     {% if could_yield("sidebar") %}<aside>{{ yield("sidebar") }}</aside>{% endif %}
//!     <main>{{ yield() }}</main>
//!   </body>
//! </html>
//! ```
//!
//! ```rust,ignore
//! fn show(c: &mut LayoutController) -> ActionOutcome {
//!     c.content_for("sidebar", "sidebar.html")?;
//!     Ok(c.render(RenderArgs::new().with("hotel", &hotel)))
//! }
//! ```
//!
//! ## Core Concepts
//!
//! - [`Config`]: view and layout directories, per-format default layouts,
//!   streaming and development mode
//! - [`Views`]: the compiled view templates plus the lazily loaded layouts
//! - [`LayoutController`]: `layout`, `content_for`, `render`
//! - [`RenderLayoutResult`]: renders the page into a [`Response`], buffered or
//!   streaming, turning failures into error pages
//! - [`invoke`]: runs an action and applies whatever it returned
//!
//! The template side (template sets, handles, the `yield` functions) lives in
//! `contentfor-render` and is re-exported here.

pub mod config;
pub mod controller;
pub mod dispatch;
pub mod error;
pub mod layout_result;
pub mod parse;
pub mod response;
pub mod result;
pub mod views;

pub use config::{Config, ConfigError, LayoutsConfig, ResultsConfig};
pub use controller::{Controller, LayoutController};
pub use dispatch::{invoke, ActionOutcome};
pub use error::{LayoutError, SourceError, SourceLine};
pub use layout_result::RenderLayoutResult;
pub use parse::{parse_template_error, ParsedTemplateError};
pub use response::{Request, Response, SharedBody, DEFAULT_FORMAT};
pub use result::{content_type_for, ActionResult, ErrorResult, PlaintextErrorResult};
pub use views::Views;

pub use contentfor_render::{
    could_yield, yield_content, ContentForItems, RenderArgs, RenderError, TemplateHandle,
    TemplateSet, Value, CONTENT_FOR_ITEMS,
};
