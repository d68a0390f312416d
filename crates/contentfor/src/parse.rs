//! Recovering the template name and line from a rendered error message.
//!
//! Located template errors read `<prefix>:<name>:<line>:<description>`, for
//! example `template:Hotels/show.html:12: undefined value`. The first
//! `:<digits>:` marker splits the message; anything before the first colon of
//! the leading part is an engine prefix and is dropped.

use once_cell::sync::Lazy;
use regex::Regex;

static LINE_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r":\d+:").expect("line marker pattern is valid"));

/// The pieces of a located template error message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedTemplateError {
    /// Template name, empty when the message carries no location.
    pub template_name: String,
    /// 1-based line, 0 when unknown.
    pub line: usize,
    /// Everything after the line marker, leading whitespace included.
    pub description: String,
}

/// Splits an error message into template name, line and description.
///
/// Messages without a `:<line>:` marker come back with an empty name, line 0
/// and the whole message as the description.
pub fn parse_template_error(message: &str) -> ParsedTemplateError {
    let Some(marker) = LINE_MARKER.find(message) else {
        return ParsedTemplateError {
            description: message.to_string(),
            ..ParsedTemplateError::default()
        };
    };

    let digits = &message[marker.start() + 1..marker.end() - 1];
    let line = digits.parse().unwrap_or_else(|err| {
        tracing::error!(digits, error = %err, "failed to parse template error line number");
        0
    });

    let head = &message[..marker.start()];
    let template_name = match head.find(':') {
        Some(colon) => &head[colon + 1..],
        None => head,
    };

    ParsedTemplateError {
        template_name: template_name.trim().to_string(),
        line,
        description: message[marker.end()..].to_string(),
    }
}
