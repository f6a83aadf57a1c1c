//! # trellis-std
//!
//! Standard implementations for the Trellis binding engine.
//!
//! This crate provides:
//! - **Pattern tables**: the [`Rules`](rules::Rules) trait, exact/wildcard
//!   matching in [`RulesBase`](rules::RulesBase) and fallback actions in
//!   [`WithDefaults`](rules::WithDefaults)
//! - **Registry**: [`Registry`](registry::Registry), the owner of registered
//!   actions, and [`RuleSet`](registry::RuleSet) bundles
//! - **Standard actions**: object creation, property assignment, method
//!   calls, linking (see [`actions`])
//! - **Testing utilities**: [`testing`]

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

// Re-export core traits
pub use trellis_core;

pub mod actions;
pub mod registry;
pub mod rules;
pub mod testing;
