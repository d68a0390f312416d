//! Error types for layout rendering.
//!
//! [`LayoutError`] covers everything that can go wrong while an action sets up
//! a layout render. [`SourceError`] is the structured report handed to
//! [`ErrorResult`](crate::ErrorResult): a title, the failing template and
//! line, and the template source for context.

use std::fmt;
use std::path::PathBuf;

use contentfor_render::RenderError;
use serde::Serialize;

/// Lines of context shown on each side of the failing line.
const CONTEXT_LINES: usize = 5;

/// Errors raised while preparing a layout render.
#[derive(Debug, thiserror::Error)]
pub enum LayoutError {
    /// Neither the bare name nor the controller-scoped name resolved.
    #[error("content_for {yield_name}: template {template} not found")]
    ContentNotFound { yield_name: String, template: String },

    #[error("layout {name} not found")]
    LayoutNotFound { name: String },

    /// A layout render was requested but no layout is set or configured.
    #[error("no layout set and no default layout configured for format {format}")]
    NoLayout { format: String },

    #[error("failed to load layouts from {}: {source}", path.display())]
    LayoutLoad {
        path: PathBuf,
        #[source]
        source: RenderError,
    },

    #[error(transparent)]
    Render(#[from] RenderError),
}

/// A failure report pointing into template source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SourceError {
    pub title: String,
    /// Template name the error occurred in; empty when unknown.
    pub path: String,
    pub description: String,
    /// 1-based line number; 0 when unknown.
    pub line: usize,
    pub source_lines: Vec<String>,
}

/// One numbered line of a [`SourceError`]'s context window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceLine {
    pub number: usize,
    pub source: String,
    pub is_error: bool,
}

impl SourceError {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            ..Self::default()
        }
    }

    /// The lines around [`line`](Self::line), numbered from 1.
    pub fn context_source(&self) -> Vec<SourceLine> {
        if self.source_lines.is_empty() {
            return Vec::new();
        }
        let start = self.line.saturating_sub(CONTEXT_LINES + 1);
        let end = self
            .line
            .saturating_add(CONTEXT_LINES - 1)
            .min(self.source_lines.len());
        if start >= end {
            return Vec::new();
        }

        self.source_lines[start..end]
            .iter()
            .enumerate()
            .map(|(offset, source)| {
                let number = start + offset + 1;
                SourceLine {
                    number,
                    source: source.clone(),
                    is_error: number == self.line,
                }
            })
            .collect()
    }

    /// A plain-text rendering with the context window, marking the failing
    /// line with `>`.
    pub fn to_plaintext(&self) -> String {
        let mut text = self.to_string();
        let context = self.context_source();
        if !context.is_empty() {
            text.push_str("\n\n");
            let width = context.last().map(|l| l.number.to_string().len()).unwrap_or(1);
            for line in context {
                let marker = if line.is_error { '>' } else { ' ' };
                text.push_str(&format!(
                    "{} {:>width$} | {}\n",
                    marker,
                    line.number,
                    line.source,
                    width = width
                ));
            }
        }
        text
    }
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ", self.title)?;
        if !self.path.is_empty() {
            write!(f, "{}:", self.path)?;
        }
        if self.line != 0 {
            write!(f, "{}:", self.line)?;
        }
        write!(f, "{}", self.description)
    }
}

impl std::error::Error for SourceError {}
