//! Text substitution hook.
//!
//! Attribute values and body text pass through a [`Substitutor`] before any
//! action sees them. The engine only defines where substitution happens; what
//! it does (expanding `${name}` references, say) is up to the implementation.

use std::borrow::Cow;
use std::fmt;
use trellis_core::Attributes;

/// Rewrites attribute values and body text before dispatch.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a `Substitutor`",
    note = "Closures `Fn(&str) -> Option<String>` implement `Substitutor` for both attributes and body text."
)]
pub trait Substitutor {
    /// Rewrites every attribute value in place.
    fn attributes(&self, attributes: &mut Attributes) {
        for attribute in attributes.iter_mut() {
            let replaced = match self.text(&attribute.value) {
                Cow::Owned(value) => Some(value),
                Cow::Borrowed(_) => None,
            };
            if let Some(value) = replaced {
                attribute.value = value;
            }
        }
    }

    /// Rewrites body text, borrowing when nothing changes.
    fn text<'a>(&self, text: &'a str) -> Cow<'a, str>;
}

impl<F> Substitutor for F
where
    F: Fn(&str) -> Option<String>,
{
    fn text<'a>(&self, text: &'a str) -> Cow<'a, str> {
        match self(text) {
            Some(replaced) => Cow::Owned(replaced),
            None => Cow::Borrowed(text),
        }
    }
}

/// Boxed substitutor as held by an engine.
pub(crate) struct BoxSubstitutor(pub(crate) Box<dyn Substitutor>);

impl fmt::Debug for BoxSubstitutor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Substitutor")
    }
}
