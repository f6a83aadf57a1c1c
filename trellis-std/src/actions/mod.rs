//! # Standard actions
//!
//! | Action | Hook(s) | Effect |
//! |--------|---------|--------|
//! | [`ObjectCreate`] | begin / end | push a new object, settle it on close |
//! | [`FactoryCreate`] | begin / end | same, built by a [`CreationFactory`] from the attributes |
//! | [`SetProperties`] | begin | attributes to same-named properties of the top object |
//! | [`SetProperty`] | begin | one property named by an attribute |
//! | [`BodyProperty`] | body / end | body text to a property of the top object |
//! | [`CallMethod`] | begin / end | call a method with collected arguments |
//! | [`CallParam`] | begin or body / end | fill an argument slot from an attribute or body text |
//! | [`ObjectParam`] | begin | fill an argument slot with a fixed value |
//! | [`SetNext`] | end | link the top object to its parent |
//! | [`SetRoot`] | end | link the top object to the root |
//! | [`FnAction`] | any | closures |
//! | [`Traced`] | any | wrap another action in tracing spans |
//!
//! A typical binding for `<config><service name="api"/></config>`:
//!
//! ```rust,ignore
//! registry.register("config", ObjectCreate::of(Config::default));
//! registry.register("config/service", ObjectCreate::of(Service::default));
//! registry.register("config/service", SetProperties::new());
//! registry.register("config/service", SetNext::new("add_service"));
//! ```

mod call;
mod create;
mod func;
mod link;
mod properties;
mod trace;

pub use call::{CallMethod, CallParam, ObjectParam};
pub use create::{CreateError, CreationFactory, FactoryCreate, ObjectCreate, ObjectFactory};
pub use func::FnAction;
pub use link::{SetNext, SetRoot};
pub use properties::{BodyProperty, SetProperties, SetProperty};
pub use trace::Traced;
