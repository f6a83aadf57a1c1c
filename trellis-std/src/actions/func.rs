use std::fmt;
use trellis_core::{Action, ActionResult, Attributes, Context};

type BeginFn = Box<dyn FnMut(&mut Context, &Attributes) -> ActionResult>;
type BodyFn = Box<dyn FnMut(&mut Context, &str) -> ActionResult>;
type EndFn = Box<dyn FnMut(&mut Context) -> ActionResult>;

/// An action assembled from closures, for one-off behavior that does not
/// deserve its own type.
///
/// ```rust,ignore
/// let action = FnAction::new()
///     .on_begin(|ctx, attrs| {
///         ctx.push_named("ids", Value::from(attrs.get("id").unwrap_or_default()));
///         Ok(())
///     })
///     .on_end(|ctx| {
///         ctx.pop_named("ids");
///         Ok(())
///     });
/// ```
#[derive(Default)]
pub struct FnAction {
    begin: Option<BeginFn>,
    body: Option<BodyFn>,
    end: Option<EndFn>,
    finish: Option<EndFn>,
}

impl FnAction {
    /// An action with no hooks.
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `f` when the matched element opens.
    pub fn on_begin<F>(mut self, f: F) -> Self
    where
        F: FnMut(&mut Context, &Attributes) -> ActionResult + 'static,
    {
        self.begin = Some(Box::new(f));
        self
    }

    /// Runs `f` with the body text when the matched element closes.
    pub fn on_body<F>(mut self, f: F) -> Self
    where
        F: FnMut(&mut Context, &str) -> ActionResult + 'static,
    {
        self.body = Some(Box::new(f));
        self
    }

    /// Runs `f` when the matched element closes.
    pub fn on_end<F>(mut self, f: F) -> Self
    where
        F: FnMut(&mut Context) -> ActionResult + 'static,
    {
        self.end = Some(Box::new(f));
        self
    }

    /// Runs `f` once after the document.
    pub fn on_finish<F>(mut self, f: F) -> Self
    where
        F: FnMut(&mut Context) -> ActionResult + 'static,
    {
        self.finish = Some(Box::new(f));
        self
    }
}

impl fmt::Debug for FnAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnAction")
            .field("begin", &self.begin.is_some())
            .field("body", &self.body.is_some())
            .field("end", &self.end.is_some())
            .field("finish", &self.finish.is_some())
            .finish()
    }
}

impl Action for FnAction {
    fn begin(
        &mut self,
        ctx: &mut Context,
        _namespace: &str,
        _name: &str,
        attributes: &Attributes,
    ) -> ActionResult {
        match &mut self.begin {
            Some(f) => f(ctx, attributes),
            None => Ok(()),
        }
    }

    fn body(&mut self, ctx: &mut Context, _namespace: &str, _name: &str, text: &str) -> ActionResult {
        match &mut self.body {
            Some(f) => f(ctx, text),
            None => Ok(()),
        }
    }

    fn end(&mut self, ctx: &mut Context, _namespace: &str, _name: &str) -> ActionResult {
        match &mut self.end {
            Some(f) => f(ctx),
            None => Ok(()),
        }
    }

    fn finish(&mut self, ctx: &mut Context) -> ActionResult {
        match &mut self.finish {
            Some(f) => f(ctx),
            None => Ok(()),
        }
    }
}
