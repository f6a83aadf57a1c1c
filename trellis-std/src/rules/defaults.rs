//! Fallback actions for otherwise unmatched elements.

use super::{ActionId, Rules, RulesBase};

/// Wraps another [`Rules`] and supplies default actions for any path the
/// wrapped table does not match.
///
/// Defaults registered with [`add_default`](Self::add_default) fire only when
/// nothing else matches. Patterns of the form `*` registered through
/// [`Rules::add`] are treated the same way.
#[derive(Debug, Default)]
pub struct WithDefaults<R = RulesBase> {
    inner: R,
    defaults: Vec<ActionId>,
}

impl<R: Rules> WithDefaults<R> {
    /// Wraps `inner`.
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            defaults: Vec::new(),
        }
    }

    /// Registers a default action.
    pub fn add_default(&mut self, id: ActionId) {
        self.defaults.push(id);
    }

    /// Default actions, in registration order.
    pub fn defaults(&self) -> &[ActionId] {
        &self.defaults
    }

    /// The wrapped table.
    pub fn inner(&self) -> &R {
        &self.inner
    }
}

impl<R: Rules> Rules for WithDefaults<R> {
    fn add(&mut self, pattern: &str, namespace: Option<&str>, id: ActionId) {
        if pattern == "*" {
            self.add_default(id);
        } else {
            self.inner.add(pattern, namespace, id);
        }
    }

    fn matches(&self, namespace: Option<&str>, path: &str) -> Vec<ActionId> {
        let matched = self.inner.matches(namespace, path);
        if matched.is_empty() {
            self.defaults.clone()
        } else {
            matched
        }
    }

    fn patterns(&self) -> Vec<&str> {
        let mut patterns = self.inner.patterns();
        if !self.defaults.is_empty() {
            patterns.push("*");
        }
        patterns
    }

    fn clear(&mut self) {
        self.inner.clear();
        self.defaults.clear();
    }
}
