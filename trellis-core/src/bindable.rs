//! Bind-by-name capability for objects built by the engine.
//!
//! Actions address properties and methods of the objects they construct by
//! string name, as written in the rule configuration. Instead of run-time
//! reflection, each target type implements [`Bindable`], either by hand or
//! through `#[derive(Bindable)]`.

use crate::{error::BindError, value::Value};
use std::any::Any;
use std::fmt::Debug;

/// An object whose properties and methods can be addressed by name.
///
/// Both methods default to reporting the member as missing, so a type only
/// implements what it exposes. Missing members are tolerated by the engine
/// unless strict mode is on.
///
/// # Example
///
/// ```rust,ignore
/// #[derive(Debug, Default)]
/// struct Server { port: u16 }
///
/// impl Bindable for Server {
///     fn set_property(&mut self, name: &str, value: Value) -> Result<(), BindError> {
///         match name {
///             "port" => self.port = value.convert()?,
///             _ => return Err(self.unknown_property(name)),
///         }
///         Ok(())
///     }
/// }
/// ```
pub trait Bindable: Any + Debug {
    /// Name used in diagnostics.
    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Assigns `value` to the property `name`.
    fn set_property(&mut self, name: &str, value: Value) -> Result<(), BindError> {
        let _ = value;
        Err(BindError::UnknownProperty {
            target: self.type_name(),
            name: name.to_owned(),
        })
    }

    /// Invokes `method` with `args`, returning its result if it has one.
    fn invoke(&mut self, method: &str, args: Vec<Value>) -> Result<Option<Value>, BindError> {
        let _ = args;
        Err(BindError::UnknownMethod {
            target: self.type_name(),
            method: method.to_owned(),
        })
    }

    /// Builds the error for an absent property, for use in hand-written impls.
    fn unknown_property(&self, name: &str) -> BindError {
        BindError::UnknownProperty {
            target: self.type_name(),
            name: name.to_owned(),
        }
    }

    /// Builds the error for an absent method, for use in hand-written impls.
    fn unknown_method(&self, method: &str) -> BindError {
        BindError::UnknownMethod {
            target: self.type_name(),
            method: method.to_owned(),
        }
    }
}

impl dyn Bindable {
    /// Whether the concrete type is `T`.
    pub fn is<T: Bindable>(&self) -> bool {
        let any: &dyn Any = self;
        any.is::<T>()
    }

    /// Borrows the concrete `T`, if that is what this is.
    pub fn downcast_ref<T: Bindable>(&self) -> Option<&T> {
        let any: &dyn Any = self;
        any.downcast_ref::<T>()
    }

    /// Mutably borrows the concrete `T`, if that is what this is.
    pub fn downcast_mut<T: Bindable>(&mut self) -> Option<&mut T> {
        let any: &mut dyn Any = self;
        any.downcast_mut::<T>()
    }

    /// Takes ownership of the concrete `T`. The object is dropped on mismatch,
    /// so check with [`is`](Self::is) first when it must survive.
    pub fn downcast<T: Bindable>(self: Box<Self>) -> Option<Box<T>> {
        let any: Box<dyn Any> = self;
        any.downcast::<T>().ok()
    }
}

/// Invokes a single-argument method, checking the arity first.
///
/// Helper for hand-written [`Bindable::invoke`] implementations.
pub fn single_arg(method: &str, args: Vec<Value>) -> Result<Value, BindError> {
    let found = args.len();
    let mut args = args.into_iter();
    match (args.next(), args.next()) {
        (Some(arg), None) => Ok(arg),
        _ => Err(BindError::Arity {
            method: method.to_owned(),
            expected: 1,
            found,
        }),
    }
}
