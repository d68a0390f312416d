//! Template index and named content regions.
//!
//! This module provides everything a layout render needs from the template
//! engine:
//!
//! - [`TemplateRegistry`]: collects templates from view directories and inline strings
//! - [`TemplateSet`]: compiles a registry into a MiniJinja environment
//! - [`TemplateHandle`]: a resolved template that renders into any writer
//! - [`ContentForItems`]: the yield-name → template map injected into layout renders
//! - [`register_functions`]: installs `could_yield` and `yield`
//!
//! ## Template Registry
//!
//! ```rust,ignore
//! let mut registry = TemplateRegistry::new();
//! registry.add_template_dir("app/views")?;
//! let set = Arc::new(TemplateSet::from_registry(registry)?);
//! let handle = set.template("Hotels/index.html")?;
//! ```
//!
//! Names keep their extension and use `/` separators. Lookups fall back to a
//! case-insensitive match.
//!
//! ## Yields
//!
//! A layout pulls in the action's template with `{{ yield() }}` and any block
//! registered through `content_for` with `{{ yield("name") }}`. Use
//! `could_yield("name")` to wrap optional regions.

mod content;
mod functions;
pub mod registry;
mod set;

pub use content::{ContentForItems, CONTENT_FOR_ITEMS, MAX_YIELD_DEPTH};
pub use functions::{could_yield, register_functions, yield_content};
pub use registry::{
    walk_template_dir, RegistryError, ResolvedTemplate, TemplateFile, TemplateRegistry,
};
pub use set::{TemplateHandle, TemplateSet};
