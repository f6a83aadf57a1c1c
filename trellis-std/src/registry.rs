//! Action registry.
//!
//! A [`Registry`] owns every registered action in an arena and a [`Rules`]
//! table that maps patterns to arena slots. Registration happens before a run;
//! during a run the pattern table is only read.

use crate::rules::{ActionId, Rules, RulesBase, WithDefaults, normalize_pattern};
use trellis_core::{Action, BoxAction};

/// Metadata recorded for each registered action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    /// Normalized pattern the action was registered under.
    pub pattern: String,
    /// Namespace qualifier, if any.
    pub namespace: Option<String>,
}

/// An action with its registration metadata.
#[derive(Debug)]
pub struct ActionEntry {
    action: BoxAction,
    registration: Registration,
}

impl ActionEntry {
    /// The action.
    pub fn action(&self) -> &dyn Action {
        &*self.action
    }

    /// The action, mutably.
    pub fn action_mut(&mut self) -> &mut dyn Action {
        &mut *self.action
    }

    /// Where the action was registered.
    pub fn registration(&self) -> &Registration {
        &self.registration
    }
}

/// Registered actions plus the pattern table selecting them.
///
/// # Example
///
/// ```rust,ignore
/// let mut registry = Registry::new();
/// registry.register("config/service", ObjectCreate::of(Service::default));
/// registry.register("config/service", SetProperties::new());
/// registry.register("config/service", SetNext::new("add_service"));
/// ```
#[derive(Debug, Default)]
pub struct Registry<R = RulesBase> {
    entries: Vec<ActionEntry>,
    rules: R,
    namespace: Option<String>,
}

impl Registry<RulesBase> {
    /// Creates an empty registry with exact/wildcard matching.
    pub fn new() -> Self {
        Self::with_rules(RulesBase::new())
    }
}

impl<R: Rules> Registry<R> {
    /// Creates an empty registry over a custom pattern table.
    pub fn with_rules(rules: R) -> Self {
        Self {
            entries: Vec::new(),
            rules,
            namespace: None,
        }
    }

    /// Registers `action` for `pattern`, after any actions already registered for it.
    ///
    /// While a namespaced [`RuleSet`] is being added, the action is restricted
    /// to that set's namespace.
    pub fn register<A: Action + 'static>(&mut self, pattern: &str, action: A) -> ActionId {
        let namespace = self.namespace.clone();
        self.register_boxed(pattern, namespace.as_deref(), Box::new(action))
    }

    /// Registers `action` for `pattern`, restricted to elements in `namespace`.
    pub fn register_ns<A: Action + 'static>(
        &mut self,
        pattern: &str,
        namespace: &str,
        action: A,
    ) -> ActionId {
        self.register_boxed(pattern, Some(namespace), Box::new(action))
    }

    /// Registers an already boxed action.
    pub fn register_boxed(
        &mut self,
        pattern: &str,
        namespace: Option<&str>,
        action: BoxAction,
    ) -> ActionId {
        let pattern = normalize_pattern(pattern);
        let id = self.push_entry(pattern, namespace, action);
        self.rules.add(pattern, namespace, id);
        id
    }

    /// Adds every registration of `set`, under the set's namespace if it names one.
    pub fn add_rule_set<S: RuleSet>(&mut self, set: &S) {
        let outer = match set.namespace() {
            Some(namespace) => self.namespace.replace(namespace.to_owned()),
            None => self.namespace.clone(),
        };
        set.add_rule_instances(self);
        self.namespace = outer;
    }

    /// Namespace applied to [`register`](Self::register) calls, if any.
    pub fn default_namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    fn push_entry(&mut self, pattern: &str, namespace: Option<&str>, action: BoxAction) -> ActionId {
        let id = ActionId::new(self.entries.len());
        tracing::debug!(pattern, ?namespace, ?action, "registering action");
        self.entries.push(ActionEntry {
            action,
            registration: Registration {
                pattern: pattern.to_owned(),
                namespace: namespace.map(str::to_owned),
            },
        });
        id
    }

    /// Moves every action into a registry over `rules`, replaying the
    /// registrations in order so action ids are preserved.
    pub fn rebind<R2: Rules>(self, rules: R2) -> Registry<R2> {
        let mut registry = Registry::with_rules(rules);
        for ActionEntry {
            action,
            registration,
        } in self.entries
        {
            registry.register_boxed(
                &registration.pattern,
                registration.namespace.as_deref(),
                action,
            );
        }
        registry
    }

    /// Actions matching `path`, in registration order.
    pub fn matches(&self, namespace: Option<&str>, path: &str) -> Vec<ActionId> {
        self.rules.matches(namespace, path)
    }

    /// The action behind `id`.
    pub fn action_mut(&mut self, id: ActionId) -> Option<&mut dyn Action> {
        self.entries.get_mut(id.index()).map(ActionEntry::action_mut)
    }

    /// The entry behind `id`.
    pub fn entry(&self, id: ActionId) -> Option<&ActionEntry> {
        self.entries.get(id.index())
    }

    /// Every action id, in registration order.
    pub fn ids(&self) -> impl Iterator<Item = ActionId> + use<R> {
        (0..self.entries.len()).map(ActionId::new)
    }

    /// The pattern table.
    pub fn rules(&self) -> &R {
        &self.rules
    }

    /// Number of registered actions.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drops every action and pattern.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.rules.clear();
    }
}

impl<R: Rules> Registry<WithDefaults<R>> {
    /// Registers an action that fires for elements no pattern matches.
    pub fn register_default<A: Action + 'static>(&mut self, action: A) -> ActionId {
        let id = self.push_entry("*", None, Box::new(action));
        self.rules.add_default(id);
        id
    }
}

/// A reusable bundle of registrations.
///
/// Groups the rules for one document vocabulary so they can be added to any
/// registry in one call.
pub trait RuleSet {
    /// Namespace URI the bundled rules apply to, if any.
    fn namespace(&self) -> Option<&str> {
        None
    }

    /// Registers the bundled actions into `registry`.
    fn add_rule_instances<R: Rules>(&self, registry: &mut Registry<R>);
}
