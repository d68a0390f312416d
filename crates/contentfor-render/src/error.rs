//! Error types for template rendering.
//!
//! This module provides [`RenderError`], the primary error type for all rendering
//! operations. It abstracts over the underlying template engine's errors, providing
//! a stable public API.
//!
//! Located template failures display as `template:<name>:<line>: <message>`, the
//! same shape the controller layer parses back into a name, a line number and a
//! description when it builds an error page.

use std::fmt;

use crate::template::RegistryError;

/// Error type for template rendering operations.
///
/// This error type provides a stable API that doesn't expose implementation details
/// of the underlying template engine. All public rendering functions return this type.
#[derive(Debug)]
pub enum RenderError {
    /// Template syntax error or execution failure.
    ///
    /// `name` and `line` are filled in when the engine knows where the
    /// failure happened.
    TemplateError {
        name: Option<String>,
        line: Option<usize>,
        message: String,
    },

    /// Template not found in the index.
    TemplateNotFound(String),

    /// Data serialization error.
    SerializationError(String),

    /// I/O error (e.g., reading a template from disk, writing output).
    IoError(std::io::Error),

    /// Other operational error.
    OperationError(String),

    /// The render context is missing something a helper needs, or has the
    /// wrong shape.
    ContextError(String),
}

impl RenderError {
    /// Returns the template name and line of a located template failure.
    pub fn location(&self) -> Option<(&str, usize)> {
        match self {
            RenderError::TemplateError {
                name: Some(name),
                line: Some(line),
                ..
            } => Some((name.as_str(), *line)),
            _ => None,
        }
    }
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::TemplateError {
                name: Some(name),
                line: Some(line),
                message,
            } => write!(f, "template:{}:{}: {}", name, line, message),
            RenderError::TemplateError {
                name: Some(name),
                line: None,
                message,
            } => write!(f, "template:{}: {}", name, message),
            RenderError::TemplateError { message, .. } => write!(f, "template error: {}", message),
            RenderError::TemplateNotFound(name) => write!(f, "template not found: {}", name),
            RenderError::SerializationError(msg) => write!(f, "serialization error: {}", msg),
            RenderError::IoError(err) => write!(f, "I/O error: {}", err),
            RenderError::OperationError(msg) => write!(f, "{}", msg),
            RenderError::ContextError(msg) => write!(f, "context error: {}", msg),
        }
    }
}

impl std::error::Error for RenderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RenderError::IoError(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for RenderError {
    fn from(err: std::io::Error) -> Self {
        RenderError::IoError(err)
    }
}

impl From<serde_json::Error> for RenderError {
    fn from(err: serde_json::Error) -> Self {
        RenderError::SerializationError(err.to_string())
    }
}

impl From<RegistryError> for RenderError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::NotFound { name } => RenderError::TemplateNotFound(name),
            other => RenderError::OperationError(other.to_string()),
        }
    }
}

// Conversion from minijinja::Error. A failure inside a yielded template
// travels up as the source of the outer error; the innermost located
// failure wins so error pages point at the template that actually broke.
impl From<minijinja::Error> for RenderError {
    fn from(err: minijinja::Error) -> Self {
        use minijinja::ErrorKind;

        let mut source = std::error::Error::source(&err);
        while let Some(cause) = source {
            if let Some(inner) = cause.downcast_ref::<RenderError>() {
                if let RenderError::TemplateError {
                    name: Some(name),
                    line: Some(line),
                    message,
                } = inner
                {
                    return RenderError::TemplateError {
                        name: Some(name.clone()),
                        line: Some(*line),
                        message: message.clone(),
                    };
                }
            }
            source = cause.source();
        }

        match err.kind() {
            ErrorKind::TemplateNotFound if err.line().is_none() => RenderError::TemplateNotFound(
                err.detail().map(str::to_string).unwrap_or_else(|| err.to_string()),
            ),
            ErrorKind::BadSerialization => RenderError::SerializationError(err.to_string()),
            ErrorKind::WriteFailure => {
                RenderError::IoError(std::io::Error::other(err.to_string()))
            }
            kind => {
                let message = match err.detail() {
                    Some(detail) => format!("{}: {}", kind, detail),
                    None => kind.to_string(),
                };
                RenderError::TemplateError {
                    name: err.name().map(str::to_string),
                    line: err.line(),
                    message,
                }
            }
        }
    }
}
