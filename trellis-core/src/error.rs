//! Error types for Trellis.
//!
//! The hierarchy mirrors the recovery tiers of the engine:
//!
//! - [`BindError`] - a dynamic property or method binding failed
//! - [`ActionError`] - an action hook failed
//! - [`TrellisError`] - the single terminal error handed back to the caller

use crate::event::Location;
use thiserror::Error;

/// A boxed error type for dynamic error handling.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors raised while binding values to a [`Bindable`](crate::Bindable) target.
#[derive(Error, Debug)]
pub enum BindError {
    /// The target has no property with this name.
    #[error("`{target}` has no property `{name}`")]
    UnknownProperty {
        /// Type name of the target object.
        target: &'static str,
        /// Requested property name.
        name: String,
    },

    /// The target has no method with this name.
    #[error("`{target}` has no method `{method}`")]
    UnknownMethod {
        /// Type name of the target object.
        target: &'static str,
        /// Requested method name.
        method: String,
    },

    /// A value could not be converted to the type the target expects.
    #[error("cannot convert {found} to {expected}")]
    Conversion {
        /// Name of the expected type.
        expected: &'static str,
        /// Short description of the offending value.
        found: String,
    },

    /// A method was invoked with the wrong number of arguments.
    #[error("method `{method}` takes {expected} argument(s), got {found}")]
    Arity {
        /// Method name.
        method: String,
        /// Declared argument count.
        expected: usize,
        /// Supplied argument count.
        found: usize,
    },

    /// A custom binding error.
    #[error(transparent)]
    Custom(BoxError),
}

impl BindError {
    /// Creates a conversion error for `found` that was expected to be `expected`.
    pub fn conversion(expected: &'static str, found: impl Into<String>) -> Self {
        BindError::Conversion {
            expected,
            found: found.into(),
        }
    }

    /// Whether this error only reports an absent property or method.
    ///
    /// These are tolerated: the engine logs them in strict mode and ignores
    /// them otherwise.
    pub fn is_missing_member(&self) -> bool {
        matches!(
            self,
            BindError::UnknownProperty { .. } | BindError::UnknownMethod { .. }
        )
    }
}

/// Errors returned from action hooks.
#[derive(Error, Debug)]
pub enum ActionError {
    /// Binding a value to an object failed.
    #[error(transparent)]
    Bind(#[from] BindError),

    /// An object factory could not produce an instance.
    #[error("object factory failed: {0}")]
    Factory(String),

    /// The action expected an object on the stack and found none.
    #[error("no object available for {0}")]
    MissingObject(&'static str),

    /// A parameter slot outside the collected argument array was addressed.
    #[error("parameter index {index} out of range for {len} parameter(s)")]
    ParamIndex {
        /// Requested slot.
        index: usize,
        /// Size of the argument array.
        len: usize,
    },

    /// A custom action error.
    #[error(transparent)]
    Custom(BoxError),
}

impl From<BoxError> for ActionError {
    fn from(err: BoxError) -> Self {
        ActionError::Custom(err)
    }
}

/// Lifecycle state of an engine, reported by [`TrellisError::State`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// No document in progress.
    Idle,
    /// Events are being consumed.
    InDocument,
    /// The document ended successfully.
    Finished,
    /// A previous event failed; the run is unusable until reset.
    Failed,
}

impl std::fmt::Display for RunState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RunState::Idle => "idle",
            RunState::InDocument => "in-document",
            RunState::Finished => "finished",
            RunState::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Terminal error for a document interpretation.
#[derive(Error, Debug)]
pub enum TrellisError {
    /// An action hook failed while processing the element at `path`.
    #[error("{}at `{path}`: {source}", fmt_location(.location))]
    Action {
        /// Current path when the hook failed.
        path: String,
        /// Source position, if the event producer reported one.
        location: Option<Location>,
        /// The hook's error.
        #[source]
        source: ActionError,
    },

    /// An event arrived while the engine was in a state that cannot accept it.
    #[error("cannot accept {event} while {state}")]
    State {
        /// Engine state at the time.
        state: RunState,
        /// The rejected event kind.
        event: &'static str,
    },

    /// The document ended with elements still open.
    #[error("document ended with open elements at `{path}`")]
    Unbalanced {
        /// Path still open at end of document.
        path: String,
    },

    /// The markup driver rejected the input.
    #[error("{}malformed markup: {message}", fmt_location(.location))]
    Markup {
        /// Position of the failure, if known.
        location: Option<Location>,
        /// Parser message.
        message: String,
    },
}

fn fmt_location(location: &Option<Location>) -> String {
    match location {
        Some(loc) => format!("{loc}: "),
        None => String::new(),
    }
}
