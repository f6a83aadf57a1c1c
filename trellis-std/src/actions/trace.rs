use std::fmt;
use trellis_core::{Action, ActionResult, Attributes, Context};

/// An action wrapper that instruments every hook with a `tracing` span.
///
/// The span carries the wrapper's name, the hook, the current path and the
/// element being processed, so the log lines of the inner action (and of the
/// context operations it performs) are attributed to the element.
pub struct Traced<A> {
    inner: A,
    name: &'static str,
}

impl<A> Traced<A> {
    /// Wraps `inner`, labelling its spans with `name`.
    pub const fn new(inner: A, name: &'static str) -> Self {
        Self { inner, name }
    }

    /// The wrapped action.
    pub fn inner(&self) -> &A {
        &self.inner
    }

    /// Unwraps the inner action.
    pub fn into_inner(self) -> A {
        self.inner
    }
}

impl<A: Clone> Clone for Traced<A> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            name: self.name,
        }
    }
}

impl<A: fmt::Debug> fmt::Debug for Traced<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Traced")
            .field("name", &self.name)
            .field("inner", &self.inner)
            .finish()
    }
}

impl<A: Action> Action for Traced<A> {
    fn begin(
        &mut self,
        ctx: &mut Context,
        namespace: &str,
        name: &str,
        attributes: &Attributes,
    ) -> ActionResult {
        let span = tracing::info_span!(
            "action",
            action = %self.name,
            hook = "begin",
            path = %ctx.path(),
            element = name,
            attributes = attributes.len()
        );
        let _guard = span.enter();
        let result = self.inner.begin(ctx, namespace, name, attributes);
        if let Err(err) = &result {
            tracing::debug!(error = %err, "hook failed");
        }
        result
    }

    fn body(&mut self, ctx: &mut Context, namespace: &str, name: &str, text: &str) -> ActionResult {
        let span = tracing::info_span!(
            "action",
            action = %self.name,
            hook = "body",
            path = %ctx.path(),
            element = name,
            text_len = text.len()
        );
        let _guard = span.enter();
        self.inner.body(ctx, namespace, name, text)
    }

    fn end(&mut self, ctx: &mut Context, namespace: &str, name: &str) -> ActionResult {
        let span = tracing::info_span!(
            "action",
            action = %self.name,
            hook = "end",
            path = %ctx.path(),
            element = name
        );
        let _guard = span.enter();
        let result = self.inner.end(ctx, namespace, name);
        if let Err(err) = &result {
            tracing::debug!(error = %err, "hook failed");
        }
        result
    }

    fn finish(&mut self, ctx: &mut Context) -> ActionResult {
        let span = tracing::info_span!("action", action = %self.name, hook = "finish");
        let _guard = span.enter();
        self.inner.finish(ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{HookCall, RecordingAction};

    #[test]
    fn traced_delegates_every_hook() {
        let recorder = RecordingAction::new("inner");
        let mut traced = Traced::new(recorder.clone(), "traced");
        let mut ctx = Context::default();

        traced.begin(&mut ctx, "", "a", &Attributes::new()).unwrap();
        traced.body(&mut ctx, "", "a", "text").unwrap();
        traced.end(&mut ctx, "", "a").unwrap();
        traced.finish(&mut ctx).unwrap();

        assert_eq!(
            recorder.calls(),
            vec![
                HookCall::Begin("inner".into(), "a".into()),
                HookCall::Body("inner".into(), "text".into()),
                HookCall::End("inner".into(), "a".into()),
                HookCall::Finish("inner".into()),
            ]
        );
    }
}
