//! # trellis - Event-Driven Object-Graph Binding
//!
//! `trellis` builds object graphs from hierarchical markup. Path patterns
//! select [`Action`]s; as events arrive, the [`Engine`] fires the matched
//! actions, which construct objects, assign their properties, call their
//! methods and link children to parents through a shared object stack.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use trellis::prelude::*;
//!
//! #[derive(Debug, Default, Bindable)]
//! struct Config {
//!     #[bind(adder = "add_service")]
//!     services: Vec<Service>,
//! }
//!
//! #[derive(Debug, Default, Bindable)]
//! struct Service {
//!     name: String,
//!     port: u16,
//! }
//!
//! let mut engine = Engine::builder()
//!     .register("config", ObjectCreate::of(Config::default))
//!     .register("config/service", ObjectCreate::of(Service::default))
//!     .register("config/service", SetProperties::new())
//!     .register("config/service", SetNext::new("add_service"))
//!     .build();
//!
//! engine.parse_str(r#"<config><service name="api" port="8080"/></config>"#)?;
//! ```
//!
//! ## Matching
//!
//! | Pattern | Matches |
//! |---------|---------|
//! | `config/service` | exactly that path |
//! | `*/service` | any path ending in `service` |
//!
//! An exact match always wins; among wildcards, the longest suffix wins.
//!
//! ## Features
//!
//! | Feature | Default | Provides |
//! |---------|---------|----------|
//! | `macros` | yes | `#[derive(Bindable)]` |
//! | `xml` | yes | [`xml::parse_str`] over `quick-xml` |

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

extern crate self as trellis;

mod builder;
mod engine;
mod substitute;
#[cfg(feature = "xml")]
pub mod xml;

pub use builder::EngineBuilder;
pub use engine::Engine;
pub use substitute::Substitutor;

pub use trellis_core::{
    // Actions
    Action,
    // Errors
    ActionError,
    ActionResult,
    // Events
    Attribute,
    Attributes,
    BindError,
    // Binding
    Bindable,
    BoxAction,
    BoxError,
    // Execution state
    Context,
    Event,
    FromValue,
    LinkTarget,
    Location,
    NamespaceScopes,
    // Configuration
    Options,
    Params,
    RunState,
    TrellisError,
    Value,
    object_from_value,
    single_arg,
};

pub use trellis_std::{
    registry::{ActionEntry, Registration, Registry, RuleSet},
    rules::{ActionId, Rules, RulesBase, WithDefaults},
};

#[cfg(feature = "macros")]
pub use trellis_macros::Bindable;

/// Standard actions.
pub mod actions {
    #![allow(clippy::wildcard_imports)]
    pub use trellis_std::actions::*;
}

/// Testing utilities.
pub mod testing {
    #![allow(clippy::wildcard_imports)]
    pub use trellis_std::testing::*;
}

/// Prelude module - common imports for Trellis.
///
/// # Usage
///
/// ```rust,ignore
/// use trellis::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        Action, ActionError, ActionResult, Attributes, BindError, Bindable, Context, Engine,
        EngineBuilder, FromValue, Options, Registry, TrellisError, Value,
        actions::{
            BodyProperty, CallMethod, CallParam, FactoryCreate, FnAction, ObjectCreate,
            ObjectParam, SetNext, SetProperties, SetProperty, SetRoot,
        },
    };
}
