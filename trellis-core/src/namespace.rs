//! Namespace scope tracking.
//!
//! Each prefix owns its own stack of URIs. A binding is visible from its
//! enter-scope event until the matching exit-scope event, and inner bindings
//! shadow outer ones for the same prefix.

use std::collections::HashMap;

/// Live prefix to URI bindings.
#[derive(Debug, Clone, Default)]
pub struct NamespaceScopes {
    bindings: HashMap<String, Vec<String>>,
}

impl NamespaceScopes {
    /// Creates an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Brings `uri` into scope for `prefix`. The empty prefix is the default namespace.
    pub fn enter_scope(&mut self, prefix: &str, uri: &str) {
        self.bindings
            .entry(prefix.to_owned())
            .or_default()
            .push(uri.to_owned());
    }

    /// Ends the innermost binding of `prefix`, returning its URI.
    pub fn exit_scope(&mut self, prefix: &str) -> Option<String> {
        let Some(stack) = self.bindings.get_mut(prefix) else {
            tracing::warn!(prefix, "namespace scope exited without a matching enter");
            return None;
        };
        let uri = stack.pop();
        if stack.is_empty() {
            self.bindings.remove(prefix);
        }
        uri
    }

    /// The URI currently bound to `prefix`.
    pub fn resolve(&self, prefix: &str) -> Option<&str> {
        self.bindings
            .get(prefix)
            .and_then(|stack| stack.last())
            .map(String::as_str)
    }

    /// Whether no prefix is bound.
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Drops all bindings.
    pub fn clear(&mut self) {
        self.bindings.clear();
    }
}
