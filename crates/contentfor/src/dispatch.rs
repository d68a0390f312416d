//! Running an action and applying its result.
//!
//! Actions are plain functions over a [`LayoutController`] returning an
//! [`ActionOutcome`]. Errors raised with `?` inside the action become a 500
//! error page, so actions can use `anyhow` freely:
//!
//! ```rust,ignore
//! fn index(c: &mut LayoutController) -> ActionOutcome {
//!     let hotels = db.hotels().context("loading hotels")?;
//!     Ok(c.render(RenderArgs::new().with("hotels", hotels)))
//! }
//!
//! invoke(&mut controller, index, &mut response);
//! ```

use crate::controller::LayoutController;
use crate::response::Response;
use crate::result::ActionResult;

/// What an action returns.
pub type ActionOutcome = anyhow::Result<Box<dyn ActionResult>>;

/// Runs `action` and writes its result to `resp`.
pub fn invoke<F>(controller: &mut LayoutController, action: F, resp: &mut Response)
where
    F: FnOnce(&mut LayoutController) -> ActionOutcome,
{
    tracing::debug!(
        controller = %controller.name,
        action = %controller.action,
        path = %controller.request.path,
        "invoking action"
    );
    let mut result = match action(controller) {
        Ok(result) => result,
        Err(err) => controller.render_error(&*err),
    };
    let request = controller.request.clone();
    result.apply(&request, resp);
}
