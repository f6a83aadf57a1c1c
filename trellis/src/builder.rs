//! Engine configuration.

use crate::{
    engine::Engine,
    substitute::{BoxSubstitutor, Substitutor},
};
use trellis_core::{Action, Bindable, Options};
use trellis_std::{
    registry::{Registry, RuleSet},
    rules::{Rules, RulesBase, WithDefaults},
};

/// Fluent configuration for an [`Engine`].
///
/// # Example
///
/// ```rust,ignore
/// let mut engine = Engine::builder()
///     .strict(true)
///     .register("config", ObjectCreate::of(Config::default))
///     .register("config/service", ObjectCreate::of(Service::default))
///     .register("config/service", SetProperties::new())
///     .register("config/service", SetNext::new("add_service"))
///     .build();
/// ```
pub struct EngineBuilder<R: Rules = RulesBase> {
    registry: Registry<R>,
    options: Options,
    substitutor: Option<BoxSubstitutor>,
    root: Option<Box<dyn Bindable>>,
}

impl EngineBuilder<RulesBase> {
    /// Starts with an empty registry and default options.
    pub fn new() -> Self {
        Self {
            registry: Registry::new(),
            options: Options::default(),
            substitutor: None,
            root: None,
        }
    }
}

impl Default for EngineBuilder<RulesBase> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rules> EngineBuilder<R> {
    /// Replaces all option flags.
    pub fn options(mut self, options: Options) -> Self {
        self.options = options;
        self
    }

    /// Turns namespace-qualified matching on or off.
    pub fn namespace_aware(mut self, on: bool) -> Self {
        self.options.set(Options::NAMESPACE_AWARE, on);
        self
    }

    /// Turns strict-validation warnings on or off.
    pub fn strict(mut self, on: bool) -> Self {
        self.options.set(Options::STRICT, on);
        self
    }

    /// Keeps body text untrimmed.
    pub fn preserve_whitespace(mut self, on: bool) -> Self {
        self.options.set(Options::PRESERVE_WHITESPACE, on);
        self
    }

    /// Rewrites attribute values and body text with `substitutor` before dispatch.
    pub fn substitutor<S: Substitutor + 'static>(mut self, substitutor: S) -> Self {
        self.substitutor = Some(BoxSubstitutor(Box::new(substitutor)));
        self
    }

    /// Switches to another pattern table. Registrations made so far are
    /// carried over.
    pub fn rules<R2: Rules>(self, rules: R2) -> EngineBuilder<R2> {
        EngineBuilder {
            registry: self.registry.rebind(rules),
            options: self.options,
            substitutor: self.substitutor,
            root: self.root,
        }
    }

    /// Registers `action` for `pattern`.
    pub fn register<A: Action + 'static>(mut self, pattern: &str, action: A) -> Self {
        self.registry.register(pattern, action);
        self
    }

    /// Registers `action` for `pattern` within namespace `uri`.
    pub fn register_ns<A: Action + 'static>(mut self, pattern: &str, uri: &str, action: A) -> Self {
        self.registry.register_ns(pattern, uri, action);
        self
    }

    /// Adds every registration of `set`.
    pub fn rule_set<S: RuleSet>(mut self, set: &S) -> Self {
        self.registry.add_rule_set(set);
        self
    }

    /// Seeds the object stack of the first run with `object`, which then
    /// becomes the result root.
    pub fn root<T: Bindable>(mut self, object: T) -> Self {
        self.root = Some(Box::new(object));
        self
    }

    /// Direct access to the registry, e.g. to keep the returned action ids.
    pub fn registry_mut(&mut self) -> &mut Registry<R> {
        &mut self.registry
    }

    /// Builds the engine.
    pub fn build(self) -> Engine<R> {
        let mut engine = Engine::with_registry(self.registry, self.options);
        engine.set_substitutor(self.substitutor);
        if let Some(root) = self.root {
            engine.seed(root);
        }
        engine
    }
}

impl<R: Rules> EngineBuilder<WithDefaults<R>> {
    /// Registers an action for elements that no pattern matches.
    pub fn register_default<A: Action + 'static>(mut self, action: A) -> Self {
        self.registry.register_default(action);
        self
    }
}

impl<R: Rules> std::fmt::Debug for EngineBuilder<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineBuilder")
            .field("registry", &self.registry)
            .field("options", &self.options)
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trellis_core::RunState;
    use trellis_std::testing::RecordingAction;

    #[test]
    fn flags_toggle_individually() {
        let engine = EngineBuilder::new()
            .options(Options::PRESERVE_WHITESPACE)
            .strict(true)
            .namespace_aware(true)
            .namespace_aware(false)
            .build();
        assert_eq!(engine.options(), Options::PRESERVE_WHITESPACE | Options::STRICT);
        assert_eq!(engine.state(), RunState::Idle);
    }

    #[test]
    fn switching_rules_keeps_registrations() {
        let engine = EngineBuilder::new()
            .register("a", RecordingAction::new("a"))
            .rules(WithDefaults::new(RulesBase::new()))
            .register_default(RecordingAction::new("fallback"))
            .build();
        assert_eq!(engine.registry().len(), 2);
        assert_eq!(engine.registry().matches(None, "zzz").len(), 1);
    }
}
