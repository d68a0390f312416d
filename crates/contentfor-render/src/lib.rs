//! # contentfor-render - Template index and yield helpers
//!
//! `contentfor-render` holds the template side of layout-wrapped rendering:
//! a template index compiled from view directories, template handles that
//! render into any writer, and the `could_yield` / `yield` template functions
//! that let a layout pull in named content regions.
//!
//! This crate is the rendering foundation for the `contentfor` controller
//! layer, but can be used on its own with any code that owns a
//! [`RenderArgs`] bag.
//!
//! ## Core Concepts
//!
//! - [`TemplateSet`]: compiled templates, shared behind an `Arc`
//! - [`TemplateHandle`]: a resolved template (`render`, `name`, `content`)
//! - [`RenderArgs`]: the named values a template sees
//! - [`ContentForItems`]: yield name → template, injected as `ContentForItems`
//!
//! ## Quick Start
//!
//! ```rust
//! use std::collections::BTreeMap;
//! use std::sync::Arc;
//! use contentfor_render::{ContentForItems, RenderArgs, TemplateSet};
//!
//! let set = Arc::new(TemplateSet::from_inline(&[
//!     ("application.html", "<main>{{ yield() }}</main>{{ yield('footer') }}"),
//!     ("Hotels/index.html", "<h1>{{ title }}</h1>"),
//!     ("footer.html", "<footer>{{ title }}</footer>"),
//! ]).unwrap());
//!
//! let mut items = BTreeMap::new();
//! items.insert(String::new(), set.template("Hotels/index.html").unwrap());
//! items.insert("footer".to_string(), set.template("footer.html").unwrap());
//!
//! let args = RenderArgs::new().with("title", "Hotels");
//! let context = ContentForItems::new(args, items).into_render_context();
//!
//! let page = set.template("application.html").unwrap().render_to_string(&context).unwrap();
//! assert_eq!(page, "<main><h1>Hotels</h1></main><footer>Hotels</footer>");
//! ```

pub mod context;
mod error;
pub mod template;

pub use context::RenderArgs;
pub use error::RenderError;
pub use template::{
    could_yield, register_functions, walk_template_dir, yield_content, ContentForItems,
    RegistryError, ResolvedTemplate, TemplateFile, TemplateHandle, TemplateRegistry,
    TemplateSet, CONTENT_FOR_ITEMS, MAX_YIELD_DEPTH,
};

// Re-export the engine value type so callers can build arguments without
// depending on minijinja directly.
pub use minijinja::Value;
