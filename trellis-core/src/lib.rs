//! # trellis-core
//!
//! Core traits and execution state for the Trellis object-graph binding engine.
//!
//! Trellis turns a stream of hierarchical markup events into an object graph.
//! Patterns select [`Action`]s; actions build and wire objects through the
//! stacks of a [`Context`]. This crate holds the pieces every action and every
//! pattern registry depends on, and nothing else:
//!
//! - [`Action`] - the four-hook behavior contract
//! - [`Bindable`] and [`Value`] - bind-by-name access to constructed objects
//! - [`Context`] - the object, parameter and named stacks plus namespace scopes
//! - [`Event`] and [`Attributes`] - what a markup producer feeds in
//! - [`Options`] - run flags
//!
//! # Error Types
//!
//! - [`TrellisError`] - terminal error of a run
//! - [`ActionError`] - failure of a single hook
//! - [`BindError`] - failure to bind a property or method

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

mod action;
mod bindable;
mod context;
mod error;
mod event;
mod namespace;
mod options;
mod value;

pub use action::{Action, ActionResult, BoxAction};
pub use bindable::{Bindable, single_arg};
pub use context::{Context, LinkTarget, Params};
pub use error::{ActionError, BindError, BoxError, RunState, TrellisError};
pub use event::{Attribute, Attributes, Event, Location};
pub use namespace::NamespaceScopes;
pub use options::Options;
pub use value::{FromValue, Value, object_from_value};
