//! The `ContentForItems` value injected into every layout render.
//!
//! A [`ContentForItems`] maps yield names to template handles. The empty name
//! is the default body (the action's own template); other names are filled
//! by `content_for` before the render starts. It also keeps the render
//! arguments it was built from, so a yielded template renders against the
//! same variables as the layout that yields to it.
//!
//! Inside templates the value behaves like a read-only map of yield name to
//! template name:
//!
//! ```jinja
//! {% for name in ContentForItems %}{{ name }}={{ ContentForItems[name] }} {% endfor %}
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use minijinja::value::{Enumerator, Object};
use minijinja::Value;

use super::set::TemplateHandle;
use crate::context::RenderArgs;
use crate::error::RenderError;

/// Reserved render-argument key holding the [`ContentForItems`] value.
pub const CONTENT_FOR_ITEMS: &str = "ContentForItems";

/// Nested yields deeper than this fail instead of recursing further.
pub const MAX_YIELD_DEPTH: usize = 16;

/// Named content blocks available to `yield` for one render.
pub struct ContentForItems {
    items: BTreeMap<String, TemplateHandle>,
    args: RenderArgs,
    depth: AtomicUsize,
}

impl ContentForItems {
    /// Creates the content map for one render.
    ///
    /// `args` should not contain [`CONTENT_FOR_ITEMS`]; it is added back
    /// whenever a yielded template is rendered.
    pub fn new(args: RenderArgs, items: BTreeMap<String, TemplateHandle>) -> Self {
        Self {
            items,
            args,
            depth: AtomicUsize::new(0),
        }
    }

    /// Returns true if `name` has content registered.
    pub fn contains(&self, name: &str) -> bool {
        self.items.contains_key(name)
    }

    /// Wraps `self` into the root value for a render: the render arguments
    /// plus [`CONTENT_FOR_ITEMS`].
    pub fn into_render_context(self) -> Value {
        let args = self.args.clone();
        args.with_entry(CONTENT_FOR_ITEMS, Value::from_object(self))
    }

    /// Renders the content registered under `target`.
    ///
    /// `handle` must be the engine value wrapping `self`; it is passed back
    /// into the yielded template's context. Returns `Ok(None)` when nothing is
    /// registered under `target`.
    pub(crate) fn render_target(
        &self,
        target: &str,
        handle: &Value,
    ) -> Result<Option<String>, RenderError> {
        let Some(template) = self.items.get(target) else {
            return Ok(None);
        };

        let depth = self.depth.fetch_add(1, Ordering::SeqCst) + 1;
        let _guard = DepthGuard(&self.depth);
        if depth > MAX_YIELD_DEPTH {
            return Err(RenderError::OperationError(format!(
                "yield nested deeper than {} levels while rendering {}",
                MAX_YIELD_DEPTH,
                template.name()
            )));
        }

        let context = self.args.with_entry(CONTENT_FOR_ITEMS, handle.clone());
        template.render_to_string(&context).map(Some)
    }
}

struct DepthGuard<'a>(&'a AtomicUsize);

impl Drop for DepthGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl fmt::Debug for ContentForItems {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContentForItems")
            .field("items", &self.items.keys().collect::<Vec<_>>())
            .field("args", &self.args.len())
            .finish()
    }
}

impl Object for ContentForItems {
    fn get_value(self: &Arc<Self>, key: &Value) -> Option<Value> {
        self.items
            .get(key.as_str()?)
            .map(|handle| Value::from(handle.name()))
    }

    fn enumerate(self: &Arc<Self>) -> Enumerator {
        Enumerator::Values(self.items.keys().map(|k| Value::from(k.as_str())).collect())
    }
}
