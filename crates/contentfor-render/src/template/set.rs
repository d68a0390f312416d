//! Compiled template sets and template handles.
//!
//! A [`TemplateSet`] is the template index: every template of a
//! [`TemplateRegistry`] compiled into one MiniJinja environment with the
//! `could_yield` and `yield` functions installed. Sets are built once during
//! startup and shared behind an [`Arc`].
//!
//! A [`TemplateHandle`] is a resolved template: the shared set plus the
//! canonical name. Handles are cheap to clone and render into any writer.
//!
//! Autoescaping follows MiniJinja's defaults: names ending in `.html`, `.htm`
//! or `.xml` escape their output, everything else renders verbatim.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use contentfor_render::{RenderArgs, TemplateSet};
//!
//! let set = Arc::new(TemplateSet::from_inline(&[
//!     ("Hotels/index.html", "<h1>{{ title }}</h1>"),
//! ]).unwrap());
//!
//! let handle = set.template("Hotels/index.html").unwrap();
//! let args = RenderArgs::new().with("title", "Hotels");
//! assert_eq!(handle.render_to_string(&args.to_value()).unwrap(), "<h1>Hotels</h1>");
//! ```

use std::fmt;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use minijinja::{Environment, Value};

use super::functions::register_functions;
use super::registry::TemplateRegistry;
use crate::error::RenderError;

/// A compiled, read-only collection of templates.
pub struct TemplateSet {
    env: Environment<'static>,
    registry: TemplateRegistry,
}

impl TemplateSet {
    /// Compiles every template of `registry`.
    ///
    /// # Errors
    ///
    /// Returns the first read or syntax error encountered.
    pub fn from_registry(registry: TemplateRegistry) -> Result<Self, RenderError> {
        let mut env = Environment::new();
        register_functions(&mut env);

        let names: Vec<String> = registry.names().map(str::to_string).collect();
        for name in names {
            let content = registry.get_content(&name)?;
            env.add_template_owned(name, content)?;
        }

        Ok(Self { env, registry })
    }

    /// Walks and compiles the given directories.
    ///
    /// # Errors
    ///
    /// Returns an error if a directory is missing, two directories provide the
    /// same name, or a template fails to compile.
    pub fn load<P: AsRef<Path>>(dirs: &[P]) -> Result<Self, RenderError> {
        let mut registry = TemplateRegistry::new();
        for dir in dirs {
            registry.add_template_dir(dir)?;
        }
        tracing::debug!(
            dirs = dirs.len(),
            templates = registry.len(),
            "loaded template directories"
        );
        Self::from_registry(registry)
    }

    /// Compiles a set from `(name, content)` pairs.
    pub fn from_inline(entries: &[(&str, &str)]) -> Result<Self, RenderError> {
        Self::from_registry(TemplateRegistry::from_entries(entries))
    }

    /// Resolves a template by name.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::TemplateNotFound`] if no template matches.
    pub fn template(self: &Arc<Self>, name: &str) -> Result<TemplateHandle, RenderError> {
        let canonical = self
            .registry
            .canonical_name(name)
            .ok_or_else(|| RenderError::TemplateNotFound(name.to_string()))?;
        Ok(TemplateHandle {
            set: Arc::clone(self),
            name: canonical.to_string(),
        })
    }

    /// Returns true if `name` resolves in this set.
    pub fn contains(&self, name: &str) -> bool {
        self.registry.canonical_name(name).is_some()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.registry.names()
    }

    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    /// Returns the source lines of a template, if it exists.
    pub fn source_lines(&self, name: &str) -> Option<Vec<String>> {
        let canonical = self.registry.canonical_name(name)?;
        let template = self.env.get_template(canonical).ok()?;
        Some(template.source().lines().map(str::to_string).collect())
    }
}

impl fmt::Debug for TemplateSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TemplateSet")
            .field("templates", &self.registry.len())
            .field("dirs", &self.registry.dirs())
            .finish()
    }
}

/// A resolved template.
#[derive(Clone)]
pub struct TemplateHandle {
    set: Arc<TemplateSet>,
    name: String,
}

impl TemplateHandle {
    /// The canonical template name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The set this template belongs to.
    pub fn set(&self) -> &Arc<TemplateSet> {
        &self.set
    }

    /// The template's source, one entry per line.
    pub fn content(&self) -> Vec<String> {
        self.set.source_lines(&self.name).unwrap_or_default()
    }

    /// Renders the template straight into `out`.
    ///
    /// Output produced before a failure has already been written.
    pub fn render<W: Write>(&self, out: W, context: &Value) -> Result<(), RenderError> {
        let template = self.set.env.get_template(&self.name)?;
        template.render_to_write(context, out)?;
        Ok(())
    }

    /// Renders the template into a string.
    pub fn render_to_string(&self, context: &Value) -> Result<String, RenderError> {
        let template = self.set.env.get_template(&self.name)?;
        Ok(template.render(context)?)
    }
}

impl fmt::Debug for TemplateHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TemplateHandle").field(&self.name).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::RenderArgs;

    fn set(entries: &[(&str, &str)]) -> Arc<TemplateSet> {
        Arc::new(TemplateSet::from_inline(entries).unwrap())
    }

    #[test]
    fn test_template_resolves_case_insensitively() {
        let set = set(&[("Hotels/Show.html", "{{ name }}")]);
        let handle = set.template("hotels/show.html").unwrap();
        assert_eq!(handle.name(), "Hotels/Show.html");
    }

    #[test]
    fn test_template_not_found() {
        let set = set(&[]);
        let err = set.template("missing.html").unwrap_err();
        assert!(matches!(err, RenderError::TemplateNotFound(name) if name == "missing.html"));
    }

    #[test]
    fn test_render_into_writer() {
        let set = set(&[("greeting.txt", "Hello, {{ name }}!")]);
        let handle = set.template("greeting.txt").unwrap();

        let mut out = Vec::new();
        handle
            .render(&mut out, &RenderArgs::new().with("name", "World").to_value())
            .unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "Hello, World!");
    }

    #[test]
    fn test_html_autoescape() {
        let set = set(&[("page.html", "{{ body }}"), ("page.txt", "{{ body }}")]);
        let ctx = RenderArgs::new().with("body", "<b>").to_value();

        assert_eq!(set.template("page.html").unwrap().render_to_string(&ctx).unwrap(), "&lt;b&gt;");
        assert_eq!(set.template("page.txt").unwrap().render_to_string(&ctx).unwrap(), "<b>");
    }

    #[test]
    fn test_include_between_templates() {
        let set = set(&[
            ("page.html", "[{% include 'footer.html' %}]"),
            ("footer.html", "footer"),
        ]);
        let out = set
            .template("page.html")
            .unwrap()
            .render_to_string(&RenderArgs::new().to_value())
            .unwrap();
        assert_eq!(out, "[footer]");
    }

    #[test]
    fn test_content_lines() {
        let set = set(&[("multi.html", "one\ntwo\nthree")]);
        let handle = set.template("multi.html").unwrap();
        assert_eq!(handle.content(), vec!["one", "two", "three"]);
    }

    #[test]
    fn test_syntax_error_is_located() {
        let err = TemplateSet::from_inline(&[("broken.html", "line one\n{{ unclosed")]).unwrap_err();
        let (name, line) = err.location().expect("syntax errors carry a location");
        assert_eq!(name, "broken.html");
        assert_eq!(line, 2);
    }

    #[test]
    fn test_runtime_error_is_located() {
        let set = set(&[("broken.html", "ok\n{{ no_such_function() }}")]);
        let err = set
            .template("broken.html")
            .unwrap()
            .render_to_string(&RenderArgs::new().to_value())
            .unwrap_err();
        assert_eq!(err.location(), Some(("broken.html", 2)));
        assert!(err.to_string().starts_with("template:broken.html:2: "));
    }
}
