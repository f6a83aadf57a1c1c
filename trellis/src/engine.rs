//! # Engine
//!
//! [`Engine`] is the state machine that turns an event stream into an object
//! graph. It owns the [`Registry`] of actions, the per-run [`Context`], and
//! the text buffer stack (one accumulator per open element).
//!
//! ```text
//!   Idle ──start_document──▶ InDocument ──end_document──▶ Finished
//!                                │
//!                         hook error / bad event
//!                                ▼
//!                             Failed          (reset() ──▶ Idle from any state)
//! ```
//!
//! Per element, matched actions are dispatched as follows:
//!
//! | Event | Dispatch |
//! |-------|----------|
//! | open | `begin`, registration order |
//! | close | `body` in registration order, then `end` in reverse |
//! | end of document | `finish` on every registered action, registration order |

use crate::{builder::EngineBuilder, substitute::BoxSubstitutor};
use trellis_core::{
    ActionError, Attributes, Bindable, Context, Event, Location, Options, RunState,
    TrellisError,
};
use trellis_std::{
    registry::Registry,
    rules::{ActionId, Rules, RulesBase},
};

/// Interprets one event stream at a time against a registry of actions.
///
/// Registrations survive [`reset`](Self::reset), so one configured engine can
/// process many documents in sequence.
#[derive(Debug)]
pub struct Engine<R: Rules = RulesBase> {
    registry: Registry<R>,
    ctx: Context,
    texts: Vec<String>,
    matched: Vec<Vec<ActionId>>,
    state: RunState,
    substitutor: Option<BoxSubstitutor>,
}

impl Engine<RulesBase> {
    /// Creates an engine with an empty registry and default options.
    pub fn new() -> Self {
        Self::with_registry(Registry::new(), Options::default())
    }

    /// Starts configuring an engine.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::new()
    }
}

impl Default for Engine<RulesBase> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rules> Engine<R> {
    /// Creates an engine over an already populated registry.
    pub fn with_registry(registry: Registry<R>, options: Options) -> Self {
        Self {
            registry,
            ctx: Context::new(options),
            texts: Vec::new(),
            matched: Vec::new(),
            state: RunState::Idle,
            substitutor: None,
        }
    }

    pub(crate) fn seed(&mut self, object: Box<dyn Bindable>) {
        self.ctx.push(object);
    }

    pub(crate) fn set_substitutor(&mut self, substitutor: Option<BoxSubstitutor>) {
        self.substitutor = substitutor;
    }

    /// The registry.
    pub fn registry(&self) -> &Registry<R> {
        &self.registry
    }

    /// The registry, for registering more actions between runs.
    pub fn registry_mut(&mut self) -> &mut Registry<R> {
        &mut self.registry
    }

    /// The execution state of the current run.
    pub fn context(&self) -> &Context {
        &self.ctx
    }

    /// Active options.
    pub fn options(&self) -> Options {
        self.ctx.options()
    }

    /// Lifecycle state.
    pub fn state(&self) -> RunState {
        self.state
    }

    /// Seeds the object stack before a run, typically with the object that
    /// should become the result root.
    pub fn push(&mut self, object: Box<dyn Bindable>) -> Result<(), TrellisError> {
        if self.state != RunState::Idle {
            return Err(TrellisError::State {
                state: self.state,
                event: "push",
            });
        }
        self.ctx.push(object);
        Ok(())
    }

    /// Records the source position of the next event, for error reports.
    pub fn set_location(&mut self, location: Option<Location>) {
        self.ctx.set_location(location);
    }

    /// Clears every stack, the current path and the run state so the engine
    /// can take another document. Registrations are kept.
    pub fn reset(&mut self) {
        tracing::debug!(state = %self.state, "resetting engine");
        self.ctx.clear();
        self.texts.clear();
        self.matched.clear();
        self.state = RunState::Idle;
    }

    /// Removes and returns the result root.
    pub fn take_root(&mut self) -> Option<Box<dyn Bindable>> {
        self.ctx.take_root()
    }

    /// Removes and returns the result root as a `T`.
    ///
    /// Returns `None`, dropping the root, if it is something else.
    pub fn take_root_as<T: Bindable>(&mut self) -> Option<T> {
        self.take_root()?.downcast::<T>().map(|root| *root)
    }

    // ------------------------------------------------------------------
    // Event entry points
    // ------------------------------------------------------------------

    /// Begins a document.
    pub fn start_document(&mut self) -> Result<(), TrellisError> {
        if self.state != RunState::Idle {
            return Err(self.reject("start-document"));
        }
        tracing::debug!("start document");
        self.state = RunState::InDocument;
        Ok(())
    }

    /// Brings `prefix` into scope, bound to `uri`.
    pub fn start_prefix_mapping(&mut self, prefix: &str, uri: &str) -> Result<(), TrellisError> {
        self.expect_in_document("start-prefix-mapping")?;
        self.ctx.namespaces_mut().enter_scope(prefix, uri);
        Ok(())
    }

    /// Takes `prefix` out of scope.
    pub fn end_prefix_mapping(&mut self, prefix: &str) -> Result<(), TrellisError> {
        self.expect_in_document("end-prefix-mapping")?;
        self.ctx.namespaces_mut().exit_scope(prefix);
        Ok(())
    }

    /// Opens an element: extends the path, resolves matching actions and
    /// fires their `begin` hooks.
    pub fn start_element(
        &mut self,
        namespace: &str,
        local_name: &str,
        qname: &str,
        mut attributes: Attributes,
    ) -> Result<(), TrellisError> {
        self.expect_in_document("start-element")?;

        let namespace = self.resolve_namespace(namespace, qname);
        let name = self.element_name(local_name, qname);
        if let Some(substitutor) = &self.substitutor {
            substitutor.0.attributes(&mut attributes);
        }

        self.texts.push(String::new());
        self.ctx.enter_element(name);

        let filter = self.options().namespace_aware().then_some(namespace.as_str());
        let ids = self.registry.matches(filter, self.ctx.path());
        if ids.is_empty() {
            if self.options().strict() {
                tracing::warn!(path = %self.ctx.path(), "no actions match element");
            }
        } else {
            tracing::debug!(path = %self.ctx.path(), matched = ids.len(), "matched actions");
        }

        self.matched.push(ids.clone());
        for id in ids {
            let Some(action) = self.registry.action_mut(id) else {
                continue;
            };
            tracing::debug!(path = %self.ctx.path(), ?id, hook = "begin", "dispatch");
            if let Err(source) = action.begin(&mut self.ctx, &namespace, name, &attributes) {
                return Err(self.fail(source));
            }
        }
        Ok(())
    }

    /// Appends character data to the innermost open element.
    pub fn characters(&mut self, text: &str) -> Result<(), TrellisError> {
        self.expect_in_document("characters")?;
        match self.texts.last_mut() {
            Some(buffer) => {
                tracing::trace!(path = %self.ctx.path(), len = text.len(), "characters");
                buffer.push_str(text);
            }
            None if text.trim().is_empty() => {}
            None => tracing::debug!(len = text.len(), "ignoring text outside the root element"),
        }
        Ok(())
    }

    /// Closes the innermost element: fires `body` then `end` on the actions
    /// matched when it opened, and shortens the path.
    pub fn end_element(
        &mut self,
        namespace: &str,
        local_name: &str,
        qname: &str,
    ) -> Result<(), TrellisError> {
        self.expect_in_document("end-element")?;

        let (Some(text), Some(ids)) = (self.texts.pop(), self.matched.pop()) else {
            self.state = RunState::Failed;
            return Err(TrellisError::Unbalanced {
                path: format!("</{qname}>"),
            });
        };

        let namespace = self.resolve_namespace(namespace, qname);
        let name = self.element_name(local_name, qname);
        if !self.ctx.path().rsplit('/').next().is_some_and(|last| last == name) {
            tracing::warn!(path = %self.ctx.path(), element = name, "close does not match the open element");
        }

        let text = if self.options().contains(Options::PRESERVE_WHITESPACE) {
            text.as_str()
        } else {
            text.trim()
        };
        let text = match &self.substitutor {
            Some(substitutor) => substitutor.0.text(text),
            None => text.into(),
        };

        for &id in &ids {
            let Some(action) = self.registry.action_mut(id) else {
                continue;
            };
            tracing::debug!(path = %self.ctx.path(), ?id, hook = "body", "dispatch");
            if let Err(source) = action.body(&mut self.ctx, &namespace, name, &text) {
                return Err(self.fail(source));
            }
        }
        for &id in ids.iter().rev() {
            let Some(action) = self.registry.action_mut(id) else {
                continue;
            };
            tracing::debug!(path = %self.ctx.path(), ?id, hook = "end", "dispatch");
            if let Err(source) = action.end(&mut self.ctx, &namespace, name) {
                return Err(self.fail(source));
            }
        }

        self.ctx.leave_element();
        Ok(())
    }

    /// Ends the document: fires `finish` on every registered action and
    /// leaves the result root ready for [`take_root`](Self::take_root).
    pub fn end_document(&mut self) -> Result<(), TrellisError> {
        self.expect_in_document("end-document")?;

        if !self.texts.is_empty() {
            self.state = RunState::Failed;
            return Err(TrellisError::Unbalanced {
                path: self.ctx.path().to_owned(),
            });
        }

        for id in self.registry.ids() {
            let Some(action) = self.registry.action_mut(id) else {
                continue;
            };
            tracing::debug!(?id, hook = "finish", "dispatch");
            if let Err(source) = action.finish(&mut self.ctx) {
                return Err(self.fail(source));
            }
        }

        if self.ctx.params_depth() > 0 {
            tracing::warn!(left = self.ctx.params_depth(), "parameter arrays left at end of document");
        }
        tracing::debug!(objects = self.ctx.depth(), "end document");
        self.state = RunState::Finished;
        Ok(())
    }

    /// Dispatches one event to its entry point.
    pub fn feed(&mut self, event: Event) -> Result<(), TrellisError> {
        match event {
            Event::StartDocument => self.start_document(),
            Event::StartPrefixMapping { prefix, uri } => self.start_prefix_mapping(&prefix, &uri),
            Event::EndPrefixMapping { prefix } => self.end_prefix_mapping(&prefix),
            Event::StartElement {
                namespace,
                local_name,
                qname,
                attributes,
            } => self.start_element(&namespace, &local_name, &qname, attributes),
            Event::Characters(text) => self.characters(&text),
            Event::EndElement {
                namespace,
                local_name,
                qname,
            } => self.end_element(&namespace, &local_name, &qname),
            Event::EndDocument => self.end_document(),
        }
    }

    /// Feeds a whole event stream and returns the result root.
    ///
    /// The stream must run from `StartDocument` to `EndDocument`.
    pub fn run<I>(&mut self, events: I) -> Result<Option<Box<dyn Bindable>>, TrellisError>
    where
        I: IntoIterator<Item = Event>,
    {
        for event in events {
            self.feed(event)?;
        }
        if self.state != RunState::Finished {
            return Err(self.reject("end of input"));
        }
        Ok(self.take_root())
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn expect_in_document(&mut self, event: &'static str) -> Result<(), TrellisError> {
        if self.state == RunState::InDocument {
            Ok(())
        } else {
            Err(self.reject(event))
        }
    }

    fn reject(&mut self, event: &'static str) -> TrellisError {
        let err = TrellisError::State {
            state: self.state,
            event,
        };
        if self.state == RunState::InDocument {
            self.state = RunState::Failed;
        }
        err
    }

    fn fail(&mut self, source: ActionError) -> TrellisError {
        self.state = RunState::Failed;
        let err = TrellisError::Action {
            path: self.ctx.path().to_owned(),
            location: self.ctx.location(),
            source,
        };
        tracing::debug!(error = %err, "run failed");
        err
    }

    /// The namespace URI of an element: as reported, or resolved from its
    /// prefix when matching is namespace-aware and the producer left it empty.
    fn resolve_namespace(&self, namespace: &str, qname: &str) -> String {
        if !namespace.is_empty() || !self.options().namespace_aware() {
            return namespace.to_owned();
        }
        let prefix = qname.split_once(':').map_or("", |(prefix, _)| prefix);
        self.ctx
            .namespaces()
            .resolve(prefix)
            .unwrap_or_default()
            .to_owned()
    }

    /// The path segment of an element: its local name when matching is
    /// namespace-aware, its name as written otherwise.
    fn element_name<'a>(&self, local_name: &'a str, qname: &'a str) -> &'a str {
        let aware = self.options().namespace_aware();
        match (aware, local_name.is_empty(), qname.is_empty()) {
            (true, false, _) | (false, false, true) => local_name,
            (true, true, _) => qname.rsplit(':').next().unwrap_or(qname),
            (false, _, false) => qname,
            (false, true, true) => "",
        }
    }
}
