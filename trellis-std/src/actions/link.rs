//! Parent/child linking actions.
//!
//! A link is recorded on the top object's stack frame when the matched
//! element closes, and carried out when the constructing action pops the
//! object with [`Context::pop_and_settle`]. Register linking actions after
//! the constructing action on the same pattern: `end` hooks run in reverse,
//! so the link is in place by the time the object is popped.

use trellis_core::{Action, ActionError, ActionResult, Context, LinkTarget};

/// Hands the top object to its parent by calling `method` on the parent.
///
/// `SetNext::new("add_service")` on `config/service` ends up calling
/// `config.add_service(service)`.
#[derive(Debug, Clone)]
pub struct SetNext {
    method: String,
}

impl SetNext {
    /// Links through `method` on the parent.
    pub fn new(method: &str) -> Self {
        Self {
            method: method.to_owned(),
        }
    }
}

impl Action for SetNext {
    fn end(&mut self, ctx: &mut Context, _namespace: &str, _name: &str) -> ActionResult {
        if ctx.depth() < 2 {
            return Err(ActionError::MissingObject("set-next"));
        }
        ctx.defer_link(LinkTarget::Parent, self.method.as_str());
        Ok(())
    }
}

/// Hands the top object to the root object by calling `method` on the root.
#[derive(Debug, Clone)]
pub struct SetRoot {
    method: String,
}

impl SetRoot {
    /// Links through `method` on the root.
    pub fn new(method: &str) -> Self {
        Self {
            method: method.to_owned(),
        }
    }
}

impl Action for SetRoot {
    fn end(&mut self, ctx: &mut Context, _namespace: &str, _name: &str) -> ActionResult {
        if ctx.depth() < 2 {
            return Err(ActionError::MissingObject("set-root"));
        }
        ctx.defer_link(LinkTarget::Root, self.method.as_str());
        Ok(())
    }
}
