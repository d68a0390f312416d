//! The compiled view and layout templates of an application.
//!
//! [`Views`] owns the [`Config`] and the main [`TemplateSet`] built from the
//! view directories. The layout set is compiled from the layout directory the
//! first time a layout is needed and then kept for the life of the `Views`.
//! A failed layout load is not remembered: the next request tries again.

use std::error::Error;
use std::sync::Arc;

use contentfor_render::{RenderError, TemplateSet};
use once_cell::sync::OnceCell;

use crate::config::Config;
use crate::error::{LayoutError, SourceError};
use crate::parse::parse_template_error;

/// View templates, layout templates and the configuration they came from.
#[derive(Debug)]
pub struct Views {
    config: Arc<Config>,
    templates: Arc<TemplateSet>,
    layouts: OnceCell<Arc<TemplateSet>>,
}

impl Views {
    /// Wraps an already compiled view set.
    pub fn new(config: impl Into<Arc<Config>>, templates: Arc<TemplateSet>) -> Self {
        Self {
            config: config.into(),
            templates,
            layouts: OnceCell::new(),
        }
    }

    /// Compiles the configured view directories.
    pub fn load(config: impl Into<Arc<Config>>) -> Result<Self, RenderError> {
        let config = config.into();
        let dirs = config.view_dirs();
        let templates = TemplateSet::load(&dirs[..])?;
        tracing::info!(
            dirs = dirs.len(),
            templates = templates.len(),
            "loaded view templates"
        );
        Ok(Self::new(config, Arc::new(templates)))
    }

    /// Uses `layouts` instead of loading the layout directory.
    pub fn with_layouts(self, layouts: Arc<TemplateSet>) -> Self {
        Self {
            layouts: OnceCell::with_value(layouts),
            ..self
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The main view templates.
    pub fn templates(&self) -> &Arc<TemplateSet> {
        &self.templates
    }

    /// The layout templates, loading them on first use.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::LayoutLoad`] if the layout directory is missing
    /// or a layout fails to compile. The failure is not cached.
    pub fn layouts(&self) -> Result<&Arc<TemplateSet>, LayoutError> {
        self.layouts.get_or_try_init(|| {
            let dir = self.config.layout_dir();
            match TemplateSet::load(&[&dir]) {
                Ok(set) => {
                    tracing::info!(
                        dir = %dir.display(),
                        layouts = set.len(),
                        "loaded layout templates"
                    );
                    Ok(Arc::new(set))
                }
                Err(source) => {
                    tracing::error!(dir = %dir.display(), error = %source, "failed to load layouts");
                    Err(LayoutError::LayoutLoad { path: dir, source })
                }
            }
        })
    }

    /// The layout set, if it has been loaded.
    pub fn loaded_layouts(&self) -> Option<&Arc<TemplateSet>> {
        self.layouts.get()
    }

    /// Source lines of a template, looked up in the views and then in the
    /// loaded layouts.
    pub fn source_lines(&self, name: &str) -> Option<Vec<String>> {
        self.templates
            .source_lines(name)
            .or_else(|| self.loaded_layouts()?.source_lines(name))
    }

    /// Builds a [`SourceError`] from any error, locating the template and
    /// line when the message carries them.
    pub fn source_error(&self, title: &str, err: &dyn Error) -> SourceError {
        let parsed = parse_template_error(&err.to_string());
        let source_lines = if parsed.template_name.is_empty() {
            Vec::new()
        } else {
            self.source_lines(&parsed.template_name).unwrap_or_default()
        };
        SourceError {
            title: title.to_string(),
            path: parsed.template_name,
            description: parsed.description,
            line: parsed.line,
            source_lines,
        }
    }
}
