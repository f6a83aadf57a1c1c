//! # Pattern Matching
//!
//! A [`Rules`] implementation maps element paths to the actions registered
//! for them. Actions themselves live in a [`Registry`](crate::registry::Registry)
//! arena; rules only deal in [`ActionId`]s.
//!
//! | Rules | Behavior |
//! |-------|----------|
//! | [`RulesBase`] | exact paths, then the longest matching `*/suffix` wildcard |
//! | [`WithDefaults`] | delegates, and falls back to default actions when nothing matches |

mod base;
mod defaults;

pub use base::RulesBase;
pub use defaults::WithDefaults;

use std::fmt::Debug;

/// Handle of an action inside a [`Registry`](crate::registry::Registry).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ActionId(usize);

impl ActionId {
    /// Wraps an arena index.
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    /// The arena index.
    pub const fn index(self) -> usize {
        self.0
    }
}

/// Pattern table interface.
///
/// Patterns are `/`-separated element names. A leading `*/` makes a pattern
/// match any path ending in the rest of it.
#[diagnostic::on_unimplemented(
    message = "`{Self}` cannot match element paths",
    label = "missing `Rules` implementation",
    note = "Implement `Rules` to resolve paths to registered actions."
)]
pub trait Rules: Debug {
    /// Associates `id` with `pattern`. `namespace` restricts the match to
    /// elements in that namespace when matching is namespace-aware.
    fn add(&mut self, pattern: &str, namespace: Option<&str>, id: ActionId);

    /// Actions matching `path`, in registration order.
    ///
    /// `namespace` is the element's namespace URI when matching is
    /// namespace-aware, and `None` otherwise.
    fn matches(&self, namespace: Option<&str>, path: &str) -> Vec<ActionId>;

    /// Every registered pattern.
    fn patterns(&self) -> Vec<&str>;

    /// Drops every association.
    fn clear(&mut self);
}

impl<R: Rules + ?Sized> Rules for Box<R> {
    fn add(&mut self, pattern: &str, namespace: Option<&str>, id: ActionId) {
        (**self).add(pattern, namespace, id);
    }

    fn matches(&self, namespace: Option<&str>, path: &str) -> Vec<ActionId> {
        (**self).matches(namespace, path)
    }

    fn patterns(&self) -> Vec<&str> {
        (**self).patterns()
    }

    fn clear(&mut self) {
        (**self).clear();
    }
}

/// Strips trailing `/` separators from a pattern.
pub fn normalize_pattern(pattern: &str) -> &str {
    let trimmed = pattern.trim_end_matches('/');
    if trimmed.is_empty() { pattern } else { trimmed }
}
