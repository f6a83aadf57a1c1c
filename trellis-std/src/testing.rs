//! Testing utilities for Trellis.
//!
//! # Features
//!
//! - [`RecordingAction`]: an action that records every hook call into a log
//!   shareable between several recorders, to assert dispatch order
//! - [`FailingAction`]: an action that fails at a chosen hook

use std::sync::{Arc, Mutex, PoisonError};
use trellis_core::{Action, ActionError, ActionResult, Attributes, Context};

// ============================================================================
// Recording Action
// ============================================================================

/// One recorded hook invocation, labelled with the recorder that saw it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HookCall {
    /// `begin` fired for the element with this name.
    Begin(String, String),
    /// `body` fired with this text.
    Body(String, String),
    /// `end` fired for the element with this name.
    End(String, String),
    /// `finish` fired.
    Finish(String),
}

impl HookCall {
    /// Label of the recorder that saw the call.
    pub fn label(&self) -> &str {
        match self {
            HookCall::Begin(label, _)
            | HookCall::Body(label, _)
            | HookCall::End(label, _)
            | HookCall::Finish(label) => label,
        }
    }
}

/// Shared, ordered log of hook calls.
pub type CallLog = Arc<Mutex<Vec<HookCall>>>;

/// An action that records every hook it receives.
///
/// Clones share the log, so a test can keep a handle while the engine owns
/// the registered copy.
///
/// # Example
///
/// ```rust,ignore
/// let first = RecordingAction::new("A1");
/// let second = first.sibling("A2");
/// registry.register("a", first.clone());
/// registry.register("a", second);
///
/// // run the engine...
///
/// let order: Vec<_> = first.calls().iter().map(|c| c.label().to_owned()).collect();
/// ```
#[derive(Debug, Clone)]
pub struct RecordingAction {
    label: String,
    calls: CallLog,
}

impl RecordingAction {
    /// Creates a recorder with its own log.
    pub fn new(label: &str) -> Self {
        Self::with_log(label, CallLog::default())
    }

    /// Creates a recorder writing into `log`.
    pub fn with_log(label: &str, log: CallLog) -> Self {
        Self {
            label: label.to_owned(),
            calls: log,
        }
    }

    /// Creates another recorder labelled `label` sharing this one's log.
    pub fn sibling(&self, label: &str) -> Self {
        Self::with_log(label, self.calls.clone())
    }

    /// The shared log.
    pub fn log(&self) -> CallLog {
        self.calls.clone()
    }

    /// A copy of the recorded calls.
    pub fn calls(&self) -> Vec<HookCall> {
        self.lock().clone()
    }

    /// Number of recorded calls.
    pub fn count(&self) -> usize {
        self.lock().len()
    }

    /// Forgets every recorded call.
    pub fn clear(&self) {
        self.lock().clear();
    }

    fn record(&self, call: HookCall) {
        self.lock().push(call);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<HookCall>> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Action for RecordingAction {
    fn begin(
        &mut self,
        _ctx: &mut Context,
        _namespace: &str,
        name: &str,
        _attributes: &Attributes,
    ) -> ActionResult {
        self.record(HookCall::Begin(self.label.clone(), name.to_owned()));
        Ok(())
    }

    fn body(&mut self, _ctx: &mut Context, _namespace: &str, _name: &str, text: &str) -> ActionResult {
        self.record(HookCall::Body(self.label.clone(), text.to_owned()));
        Ok(())
    }

    fn end(&mut self, _ctx: &mut Context, _namespace: &str, name: &str) -> ActionResult {
        self.record(HookCall::End(self.label.clone(), name.to_owned()));
        Ok(())
    }

    fn finish(&mut self, _ctx: &mut Context) -> ActionResult {
        self.record(HookCall::Finish(self.label.clone()));
        Ok(())
    }
}

// ============================================================================
// Failing Action
// ============================================================================

/// The hook at which a [`FailingAction`] fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailAt {
    /// Fail when the element opens.
    Begin,
    /// Fail on the body text.
    Body,
    /// Fail when the element closes.
    End,
    /// Fail after the document.
    Finish,
}

/// An action that returns an error from one hook.
#[derive(Debug, Clone)]
pub struct FailingAction {
    at: FailAt,
    message: String,
}

impl FailingAction {
    /// Fails at `at` with `message`.
    pub fn new(at: FailAt, message: &str) -> Self {
        Self {
            at,
            message: message.to_owned(),
        }
    }

    fn check(&self, hook: FailAt) -> ActionResult {
        if self.at == hook {
            Err(ActionError::Custom(self.message.clone().into()))
        } else {
            Ok(())
        }
    }
}

impl Action for FailingAction {
    fn begin(
        &mut self,
        _ctx: &mut Context,
        _namespace: &str,
        _name: &str,
        _attributes: &Attributes,
    ) -> ActionResult {
        self.check(FailAt::Begin)
    }

    fn body(&mut self, _ctx: &mut Context, _namespace: &str, _name: &str, _text: &str) -> ActionResult {
        self.check(FailAt::Body)
    }

    fn end(&mut self, _ctx: &mut Context, _namespace: &str, _name: &str) -> ActionResult {
        self.check(FailAt::End)
    }

    fn finish(&mut self, _ctx: &mut Context) -> ActionResult {
        self.check(FailAt::Finish)
    }
}
