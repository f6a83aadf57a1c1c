//! # Execution state shared with actions
//!
//! [`Context`] owns the stacks an engine run manipulates while it walks a
//! document:
//!
//! - the **object stack**, holding objects under construction;
//! - the **parameter stack**, holding argument arrays being collected for a
//!   pending method call;
//! - **named stacks**, scratch channels cooperating actions agree on;
//! - the **namespace scopes** of the document.
//!
//! It also tracks the current element path and the source location reported
//! by the event producer. Per-element body text is kept by the engine itself.
//!
//! # Ownership of popped objects
//!
//! Every object pushed here is owned by the stack until popped. Actions that
//! construct objects pop them with [`Context::pop_and_settle`], which hands
//! the object to whoever claimed it: a pending link recorded by a linking
//! action moves it into its parent (or the root), an unclaimed bottom-most
//! object becomes the retained result root, and anything else is dropped.
//!
//! # Underflow
//!
//! Popping or peeking an empty stack is not fatal. It logs a warning and
//! yields `None`, so a misconfigured action degrades instead of aborting.

use crate::{
    bindable::Bindable,
    error::{ActionError, BindError},
    event::Location,
    namespace::NamespaceScopes,
    options::Options,
    value::Value,
};
use std::collections::HashMap;

/// Where a deferred link delivers the object it is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkTarget {
    /// The object directly beneath it on the stack.
    Parent,
    /// The bottom-most object on the stack.
    Root,
}

#[derive(Debug)]
struct Link {
    target: LinkTarget,
    method: String,
}

#[derive(Debug)]
struct Frame {
    object: Box<dyn Bindable>,
    links: Vec<Link>,
}

/// An argument array being collected for one method call.
#[derive(Debug, Default)]
pub struct Params {
    slots: Vec<Option<Value>>,
}

impl Params {
    /// Creates `count` empty slots.
    pub fn new(count: usize) -> Self {
        Self {
            slots: (0..count).map(|_| None).collect(),
        }
    }

    /// Fills slot `index`. Returns `false` when the index is out of range.
    pub fn set(&mut self, index: usize, value: Value) -> bool {
        match self.slots.get_mut(index) {
            Some(slot) => {
                *slot = Some(value);
                true
            }
            None => false,
        }
    }

    /// Borrows slot `index`, if filled.
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.slots.get(index).and_then(Option::as_ref)
    }

    /// Number of slots.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether there are no slots.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Whether at least one slot has been filled.
    pub fn any_filled(&self) -> bool {
        self.slots.iter().any(Option::is_some)
    }

    /// Consumes the array; unfilled slots become [`Value::Null`].
    pub fn into_values(self) -> Vec<Value> {
        self.slots
            .into_iter()
            .map(Option::unwrap_or_default)
            .collect()
    }
}

/// The stack machine state of one engine run.
#[derive(Debug, Default)]
pub struct Context {
    options: Options,
    path: String,
    objects: Vec<Frame>,
    params: Vec<Params>,
    named: HashMap<String, Vec<Value>>,
    root: Option<Box<dyn Bindable>>,
    namespaces: NamespaceScopes,
    location: Option<Location>,
}

impl Context {
    /// Creates an empty context running with `options`.
    pub fn new(options: Options) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    /// Active options.
    pub fn options(&self) -> Options {
        self.options
    }

    /// The `/`-joined names of the currently open elements.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Number of currently open elements.
    pub fn nesting(&self) -> usize {
        if self.path.is_empty() {
            0
        } else {
            self.path.matches('/').count() + 1
        }
    }

    /// Appends an element name to the current path. Called by the engine on open.
    pub fn enter_element(&mut self, name: &str) {
        if !self.path.is_empty() {
            self.path.push('/');
        }
        self.path.push_str(name);
    }

    /// Removes the trailing element name from the current path. Called by the engine on close.
    pub fn leave_element(&mut self) {
        match self.path.rfind('/') {
            Some(slash) => self.path.truncate(slash),
            None => self.path.clear(),
        }
    }

    /// Last reported source position.
    pub fn location(&self) -> Option<Location> {
        self.location
    }

    /// Records the source position of the event being processed.
    pub fn set_location(&mut self, location: Option<Location>) {
        self.location = location;
    }

    /// Live namespace bindings.
    pub fn namespaces(&self) -> &NamespaceScopes {
        &self.namespaces
    }

    /// Mutable namespace bindings. Called by the engine on prefix-mapping events.
    pub fn namespaces_mut(&mut self) -> &mut NamespaceScopes {
        &mut self.namespaces
    }

    // ------------------------------------------------------------------
    // Object stack
    // ------------------------------------------------------------------

    /// Pushes an object under construction.
    pub fn push(&mut self, object: Box<dyn Bindable>) {
        tracing::debug!(path = %self.path, object = object.type_name(), "push object");
        self.objects.push(Frame {
            object,
            links: Vec::new(),
        });
    }

    /// Pops the top object and hands ownership to the caller.
    ///
    /// Links pending on the popped frame are discarded.
    pub fn pop(&mut self) -> Option<Box<dyn Bindable>> {
        let Some(frame) = self.objects.pop() else {
            tracing::warn!(path = %self.path, "pop on empty object stack");
            return None;
        };
        if !frame.links.is_empty() {
            tracing::debug!(
                path = %self.path,
                object = frame.object.type_name(),
                "discarding pending links of popped object"
            );
        }
        Some(frame.object)
    }

    /// The top object.
    pub fn peek(&self) -> Option<&dyn Bindable> {
        self.peek_at(0)
    }

    /// The top object, mutably.
    pub fn peek_mut(&mut self) -> Option<&mut dyn Bindable> {
        self.peek_at_mut(0)
    }

    /// The object `n` entries below the top (0 is the top).
    pub fn peek_at(&self, n: usize) -> Option<&dyn Bindable> {
        let found = self
            .objects
            .len()
            .checked_sub(n + 1)
            .and_then(|i| self.objects.get(i));
        match found {
            Some(frame) => Some(&*frame.object),
            None => {
                tracing::warn!(path = %self.path, n, "peek beyond object stack");
                None
            }
        }
    }

    /// The object `n` entries below the top, mutably.
    pub fn peek_at_mut(&mut self, n: usize) -> Option<&mut dyn Bindable> {
        let index = self.objects.len().checked_sub(n + 1);
        match index {
            Some(i) => Some(&mut *self.objects[i].object),
            None => {
                tracing::warn!(path = %self.path, n, "peek beyond object stack");
                None
            }
        }
    }

    /// Number of objects on the stack.
    pub fn depth(&self) -> usize {
        self.objects.len()
    }

    /// The result root: the bottom-most object, or the retained root once it has been popped.
    pub fn root(&self) -> Option<&dyn Bindable> {
        self.objects
            .first()
            .map(|frame| &*frame.object)
            .or(self.root.as_deref())
    }

    /// Removes and returns the result root, leaving the object stack empty.
    pub fn take_root(&mut self) -> Option<Box<dyn Bindable>> {
        if self.objects.is_empty() {
            return self.root.take();
        }
        let mut frames = std::mem::take(&mut self.objects).into_iter();
        let bottom = frames.next().map(|frame| frame.object);
        let leftover = frames.len();
        if leftover > 0 {
            tracing::warn!(leftover, "objects left above the root at end of document");
        }
        self.root = None;
        bottom
    }

    /// Asks for the top object to be delivered to `target` by calling `method`
    /// on it once the object is settled.
    ///
    /// Returns `false` when there is no object to attach the link to.
    pub fn defer_link(&mut self, target: LinkTarget, method: impl Into<String>) -> bool {
        match self.objects.last_mut() {
            Some(frame) => {
                frame.links.push(Link {
                    target,
                    method: method.into(),
                });
                true
            }
            None => {
                tracing::warn!(path = %self.path, "link requested on empty object stack");
                false
            }
        }
    }

    /// Pops the top object and settles its ownership.
    ///
    /// The first pending link moves the object into its target. Without a
    /// link, the bottom-most object is retained as the result root and any
    /// other object is dropped.
    pub fn pop_and_settle(&mut self) -> Result<(), ActionError> {
        let Some(Frame { object, links }) = self.objects.pop() else {
            tracing::warn!(path = %self.path, "pop on empty object stack");
            return Ok(());
        };

        let mut links = links.into_iter();
        let Some(link) = links.next() else {
            if self.objects.is_empty() && self.root.is_none() {
                tracing::debug!(object = object.type_name(), "retaining result root");
                self.root = Some(object);
            } else {
                tracing::debug!(path = %self.path, object = object.type_name(), "dropping popped object");
            }
            return Ok(());
        };
        if links.len() > 0 {
            tracing::warn!(
                path = %self.path,
                object = object.type_name(),
                "object has several pending links; only the first is applied"
            );
        }

        let target = match link.target {
            LinkTarget::Parent => self.objects.last_mut(),
            LinkTarget::Root => self.objects.first_mut(),
        };
        let Some(target) = target else {
            tracing::warn!(
                path = %self.path,
                method = %link.method,
                "link target missing from object stack"
            );
            if self.objects.is_empty() && self.root.is_none() {
                self.root = Some(object);
            }
            return Ok(());
        };

        tracing::debug!(
            path = %self.path,
            parent = target.object.type_name(),
            child = object.type_name(),
            method = %link.method,
            "linking object"
        );
        let result = target
            .object
            .invoke(&link.method, vec![Value::Object(object)]);
        self.tolerate(result).map(|_| ())
    }

    // ------------------------------------------------------------------
    // Parameter stack
    // ------------------------------------------------------------------

    /// Pushes a parameter array.
    pub fn push_params(&mut self, params: Params) {
        self.params.push(params);
    }

    /// Pops the top parameter array.
    pub fn pop_params(&mut self) -> Option<Params> {
        let popped = self.params.pop();
        if popped.is_none() {
            tracing::warn!(path = %self.path, "pop on empty parameter stack");
        }
        popped
    }

    /// The parameter array `n` entries below the top, mutably.
    pub fn peek_params_mut(&mut self, n: usize) -> Option<&mut Params> {
        let index = self.params.len().checked_sub(n + 1);
        match index {
            Some(i) => Some(&mut self.params[i]),
            None => {
                tracing::warn!(path = %self.path, n, "peek beyond parameter stack");
                None
            }
        }
    }

    /// Number of parameter arrays on the stack.
    pub fn params_depth(&self) -> usize {
        self.params.len()
    }

    // ------------------------------------------------------------------
    // Named stacks
    // ------------------------------------------------------------------

    /// Pushes onto the named stack `name`, creating it if needed.
    pub fn push_named(&mut self, name: &str, value: Value) {
        self.named.entry(name.to_owned()).or_default().push(value);
    }

    /// Pops from the named stack `name`.
    pub fn pop_named(&mut self, name: &str) -> Option<Value> {
        let popped = self.named.get_mut(name).and_then(Vec::pop);
        if popped.is_none() {
            tracing::warn!(path = %self.path, stack = name, "pop on empty named stack");
        }
        popped
    }

    /// The top of the named stack `name`.
    pub fn peek_named(&self, name: &str) -> Option<&Value> {
        self.named.get(name).and_then(|stack| stack.last())
    }

    // ------------------------------------------------------------------
    // Leniency
    // ------------------------------------------------------------------

    /// Applies the binding leniency policy to `result`.
    ///
    /// A missing property or method becomes `Ok(None)`, with a warning in
    /// strict mode. Any other failure is returned as an [`ActionError`].
    pub fn tolerate<T>(&self, result: Result<T, BindError>) -> Result<Option<T>, ActionError> {
        match result {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.is_missing_member() => {
                if self.options.strict() {
                    tracing::warn!(path = %self.path, error = %err, "bind target missing");
                }
                Ok(None)
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Whether every stack is empty and no element is open.
    pub fn is_clear(&self) -> bool {
        self.path.is_empty()
            && self.objects.is_empty()
            && self.params.is_empty()
            && self.named.values().all(Vec::is_empty)
            && self.namespaces.is_empty()
    }

    /// Clears all stacks, the path, the location and the retained root.
    /// Options survive.
    pub fn clear(&mut self) {
        self.path.clear();
        self.objects.clear();
        self.params.clear();
        self.named.clear();
        self.root = None;
        self.namespaces.clear();
        self.location = None;
    }
}
