//! Exact and tail-wildcard pattern matching.

use super::{ActionId, Rules, normalize_pattern};
use std::collections::HashMap;

#[derive(Debug, Clone)]
struct Bound {
    id: ActionId,
    namespace: Option<String>,
}

/// The default [`Rules`] implementation.
///
/// Resolution for a path:
///
/// 1. An exact pattern wins, after namespace filtering, if any action survives.
/// 2. Otherwise the longest `*/suffix` pattern whose suffix ends the path wins.
/// 3. Otherwise nothing matches.
///
/// An exact match outranks every wildcard regardless of length.
#[derive(Debug, Default)]
pub struct RulesBase {
    patterns: HashMap<String, Vec<Bound>>,
    wildcards: Vec<String>,
}

impl RulesBase {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    fn filtered(bound: &[Bound], namespace: Option<&str>) -> Vec<ActionId> {
        bound
            .iter()
            .filter(|b| match (namespace, b.namespace.as_deref()) {
                (Some(wanted), Some(own)) => wanted == own,
                _ => true,
            })
            .map(|b| b.id)
            .collect()
    }

    fn longest_wildcard(&self, path: &str) -> Option<&str> {
        self.wildcards
            .iter()
            .map(String::as_str)
            .filter(|key| {
                let suffix = &key[2..];
                path.strip_suffix(suffix)
                    .is_some_and(|rest| rest.is_empty() || rest.ends_with('/'))
            })
            .max_by_key(|key| key.len())
    }
}

impl Rules for RulesBase {
    fn add(&mut self, pattern: &str, namespace: Option<&str>, id: ActionId) {
        let pattern = normalize_pattern(pattern);
        let bound = self.patterns.entry(pattern.to_owned()).or_default();
        if bound.is_empty() && pattern.starts_with("*/") {
            self.wildcards.push(pattern.to_owned());
        }
        bound.push(Bound {
            id,
            namespace: namespace.map(str::to_owned),
        });
    }

    fn matches(&self, namespace: Option<&str>, path: &str) -> Vec<ActionId> {
        if let Some(bound) = self.patterns.get(path) {
            let ids = Self::filtered(bound, namespace);
            if !ids.is_empty() {
                return ids;
            }
        }

        match self.longest_wildcard(path) {
            Some(key) => {
                tracing::trace!(path, pattern = key, "wildcard match");
                self.patterns
                    .get(key)
                    .map(|bound| Self::filtered(bound, namespace))
                    .unwrap_or_default()
            }
            None => Vec::new(),
        }
    }

    fn patterns(&self) -> Vec<&str> {
        self.patterns.keys().map(String::as_str).collect()
    }

    fn clear(&mut self) {
        self.patterns.clear();
        self.wildcards.clear();
    }
}
