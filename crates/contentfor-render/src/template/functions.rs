//! Template functions for named content regions.
//!
//! Two functions are installed into every [`TemplateSet`](super::TemplateSet):
//!
//! | Function | Returns |
//! |----------|---------|
//! | `could_yield(name)` | whether content is registered under `name` |
//! | `yield()` | the default body (the action's template) |
//! | `yield(name)` | the content registered under `name`, or nothing |
//!
//! A layout typically looks like:
//!
//! ```jinja
//! <html>
//!   <body>
//!     {% if could_yield("sidebar") %}<aside>{{ yield("sidebar") }}</aside>{% endif %}
//!     <main>{{ yield() }}</main>
//!   </body>
//! </html>
//! ```
//!
//! Yielded output is already rendered markup and is inserted without escaping.
//!
//! The same lookups are available from Rust through [`could_yield`] and
//! [`yield_content`], which take the render context explicitly.

use minijinja::value::Rest;
use minijinja::{Environment, Error, ErrorKind, State, Value};

use super::content::{ContentForItems, CONTENT_FOR_ITEMS};
use crate::error::RenderError;

/// Installs `could_yield` and `yield` into a MiniJinja environment.
///
/// This is called automatically when a [`TemplateSet`](super::TemplateSet) is
/// compiled. Call it yourself only when driving an environment directly.
pub fn register_functions(env: &mut Environment<'static>) {
    env.add_function("could_yield", could_yield_fn);
    env.add_function("yield", yield_fn);
}

/// Returns whether `name` has content registered in `context`.
///
/// Returns `false` when `context` has no `ContentForItems` or when it holds
/// something else.
pub fn could_yield(name: &str, context: &Value) -> bool {
    context
        .get_attr(CONTENT_FOR_ITEMS)
        .map(|items| contains(&items, name))
        .unwrap_or(false)
}

/// Renders the content registered under `target` (`None` for the default
/// body) against `context`.
///
/// An unregistered target renders as an empty string.
///
/// # Errors
///
/// Returns [`RenderError::ContextError`] when `context` has no usable
/// `ContentForItems`, or the yielded template's own error.
pub fn yield_content(target: Option<&str>, context: &Value) -> Result<String, RenderError> {
    let items = context.get_attr(CONTENT_FOR_ITEMS).unwrap_or_default();
    yield_from(&items, target.unwrap_or(""))
}

fn contains(items: &Value, name: &str) -> bool {
    items
        .downcast_object_ref::<ContentForItems>()
        .map(|content| content.contains(name))
        .unwrap_or(false)
}

fn yield_from(items: &Value, target: &str) -> Result<String, RenderError> {
    if items.is_undefined() || items.is_none() {
        return Err(RenderError::ContextError(
            "yield requires the base render context".into(),
        ));
    }
    let content = items
        .downcast_object_ref::<ContentForItems>()
        .ok_or_else(|| RenderError::ContextError("ContentForItems was overwritten".into()))?;

    Ok(content.render_target(target, items)?.unwrap_or_default())
}

fn could_yield_fn(state: &State, name: &str) -> bool {
    state
        .lookup(CONTENT_FOR_ITEMS)
        .map(|items| contains(&items, name))
        .unwrap_or(false)
}

fn yield_fn(state: &State, args: Rest<Value>) -> Result<Value, Error> {
    let target = match args.len() {
        0 => "",
        1 => args[0].as_str().ok_or_else(|| {
            Error::new(
                ErrorKind::InvalidOperation,
                "named yields require the name as the first argument",
            )
        })?,
        n => {
            return Err(Error::new(
                ErrorKind::TooManyArguments,
                format!("yield takes at most one argument, got {}", n),
            ))
        }
    };

    let items = state.lookup(CONTENT_FOR_ITEMS).unwrap_or_default();
    match yield_from(&items, target) {
        Ok(markup) => Ok(Value::from_safe_string(markup)),
        Err(err @ RenderError::ContextError(_)) => {
            Err(Error::new(ErrorKind::InvalidOperation, err.to_string()))
        }
        Err(err) => Err(Error::new(
            ErrorKind::InvalidOperation,
            format!("error calling yield: {}", err),
        )
        .with_source(err)),
    }
}
