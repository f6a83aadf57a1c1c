//! # Actions
//!
//! An [`Action`] is the unit of behavior bound to a pattern. The engine calls
//! its hooks as matching elements open and close:
//!
//! | Hook | When | Order among actions of one match |
//! |------|------|----------------------------------|
//! | [`begin`](Action::begin) | element opens | registration order |
//! | [`body`](Action::body) | element closes, with its body text | registration order |
//! | [`end`](Action::end) | element closes, after `body` | reverse registration order |
//! | [`finish`](Action::finish) | once after the whole document | registration order |
//!
//! Reverse-order `end` lets an inner producer (say, an object constructor)
//! finalize its value before an outer consumer registered earlier sees it.
//!
//! All hooks default to doing nothing. An error from any hook aborts the run.

use crate::{context::Context, error::ActionError, event::Attributes};
use std::fmt::Debug;

/// Result type of action hooks.
pub type ActionResult = Result<(), ActionError>;

/// A unit of behavior fired for elements whose path matches a pattern.
///
/// Actions may keep scratch state of their own (for instance a private stack
/// so that nested matches of the same action stay independent), which is why
/// hooks take `&mut self`.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not an `Action`",
    label = "missing `Action` implementation",
    note = "Actions implement any of `begin`, `body`, `end` and `finish`; all default to no-ops."
)]
pub trait Action: Debug {
    /// The matched element opened. `attributes` are already substituted.
    fn begin(
        &mut self,
        ctx: &mut Context,
        namespace: &str,
        name: &str,
        attributes: &Attributes,
    ) -> ActionResult {
        let _ = (ctx, namespace, name, attributes);
        Ok(())
    }

    /// The matched element closed; `text` is its accumulated body text.
    fn body(&mut self, ctx: &mut Context, namespace: &str, name: &str, text: &str) -> ActionResult {
        let _ = (ctx, namespace, name, text);
        Ok(())
    }

    /// The matched element closed, after every `body` hook.
    fn end(&mut self, ctx: &mut Context, namespace: &str, name: &str) -> ActionResult {
        let _ = (ctx, namespace, name);
        Ok(())
    }

    /// The document has been fully consumed. Fires once per run whether or
    /// not this action ever matched.
    fn finish(&mut self, ctx: &mut Context) -> ActionResult {
        let _ = ctx;
        Ok(())
    }
}

impl<A: Action + ?Sized> Action for Box<A> {
    fn begin(
        &mut self,
        ctx: &mut Context,
        namespace: &str,
        name: &str,
        attributes: &Attributes,
    ) -> ActionResult {
        (**self).begin(ctx, namespace, name, attributes)
    }

    fn body(&mut self, ctx: &mut Context, namespace: &str, name: &str, text: &str) -> ActionResult {
        (**self).body(ctx, namespace, name, text)
    }

    fn end(&mut self, ctx: &mut Context, namespace: &str, name: &str) -> ActionResult {
        (**self).end(ctx, namespace, name)
    }

    fn finish(&mut self, ctx: &mut Context) -> ActionResult {
        (**self).finish(ctx)
    }
}

/// A boxed action, as stored by pattern registries.
pub type BoxAction = Box<dyn Action>;
