//! Method invocation actions.
//!
//! [`CallMethod`] collects arguments on the parameter stack while its element
//! is open; [`CallParam`] and [`ObjectParam`] fill the slots from nested
//! elements; the call happens when the element closes.

use std::fmt;
use trellis_core::{Action, ActionError, ActionResult, Attributes, Context, Params, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Arguments {
    None,
    Body,
    Collected(usize),
}

/// Invokes a method on an object of the stack when the matched element closes.
///
/// - [`CallMethod::new`] with a count of `0` passes the element's body text as
///   the single argument.
/// - A positive count pushes an argument array in `begin`, to be filled by
///   [`CallParam`]/[`ObjectParam`] actions on nested elements. The call is
///   skipped when no slot was filled.
/// - [`CallMethod::no_args`] calls without arguments.
#[derive(Debug)]
pub struct CallMethod {
    method: String,
    arguments: Arguments,
    target_offset: usize,
    bodies: Vec<String>,
}

impl CallMethod {
    /// Calls `method` with `param_count` collected arguments, or with the
    /// body text when `param_count` is zero.
    pub fn new(method: &str, param_count: usize) -> Self {
        let arguments = if param_count == 0 {
            Arguments::Body
        } else {
            Arguments::Collected(param_count)
        };
        Self {
            method: method.to_owned(),
            arguments,
            target_offset: 0,
            bodies: Vec::new(),
        }
    }

    /// Calls `method` without arguments.
    pub fn no_args(method: &str) -> Self {
        Self {
            arguments: Arguments::None,
            ..Self::new(method, 0)
        }
    }

    /// Targets the object `offset` entries below the top instead of the top.
    pub fn target_offset(mut self, offset: usize) -> Self {
        self.target_offset = offset;
        self
    }
}

impl Action for CallMethod {
    fn begin(
        &mut self,
        ctx: &mut Context,
        _namespace: &str,
        _name: &str,
        _attributes: &Attributes,
    ) -> ActionResult {
        if let Arguments::Collected(count) = self.arguments {
            ctx.push_params(Params::new(count));
        }
        Ok(())
    }

    fn body(&mut self, _ctx: &mut Context, _namespace: &str, _name: &str, text: &str) -> ActionResult {
        if self.arguments == Arguments::Body {
            self.bodies.push(text.to_owned());
        }
        Ok(())
    }

    fn end(&mut self, ctx: &mut Context, _namespace: &str, _name: &str) -> ActionResult {
        let args = match self.arguments {
            Arguments::None => Vec::new(),
            Arguments::Body => match self.bodies.pop() {
                Some(text) => vec![Value::Str(text)],
                None => return Ok(()),
            },
            Arguments::Collected(_) => match ctx.pop_params() {
                Some(params) if params.any_filled() => params.into_values(),
                Some(_) => {
                    tracing::debug!(path = %ctx.path(), method = %self.method, "no arguments supplied, skipping call");
                    return Ok(());
                }
                None => return Ok(()),
            },
        };

        let Some(target) = ctx.peek_at_mut(self.target_offset) else {
            return Ok(());
        };
        tracing::debug!(object = target.type_name(), method = %self.method, args = args.len(), "invoking");
        let result = target.invoke(&self.method, args);
        if let Some(Some(returned)) = ctx.tolerate(result)? {
            tracing::trace!(method = %self.method, %returned, "discarding return value");
        }
        Ok(())
    }

    fn finish(&mut self, _ctx: &mut Context) -> ActionResult {
        self.bodies.clear();
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum ParamSource {
    Attribute(String),
    Body,
}

/// Fills one argument slot of a pending [`CallMethod`] from the matched
/// element, either from an attribute or from its body text.
#[derive(Debug)]
pub struct CallParam {
    index: usize,
    source: ParamSource,
    stack_index: usize,
    bodies: Vec<String>,
}

impl CallParam {
    /// Fills slot `index` with the element's body text.
    pub fn body(index: usize) -> Self {
        Self {
            index,
            source: ParamSource::Body,
            stack_index: 0,
            bodies: Vec::new(),
        }
    }

    /// Fills slot `index` with the value of `attribute`, when present.
    pub fn attribute(index: usize, attribute: &str) -> Self {
        Self {
            source: ParamSource::Attribute(attribute.to_owned()),
            ..Self::body(index)
        }
    }

    /// Addresses the argument array `stack_index` entries below the top.
    pub fn stack_index(mut self, stack_index: usize) -> Self {
        self.stack_index = stack_index;
        self
    }
}

fn fill(ctx: &mut Context, stack_index: usize, index: usize, value: Value) -> ActionResult {
    let Some(params) = ctx.peek_params_mut(stack_index) else {
        return Ok(());
    };
    if params.set(index, value) {
        Ok(())
    } else {
        Err(ActionError::ParamIndex {
            index,
            len: params.len(),
        })
    }
}

impl Action for CallParam {
    fn begin(
        &mut self,
        ctx: &mut Context,
        _namespace: &str,
        _name: &str,
        attributes: &Attributes,
    ) -> ActionResult {
        match &self.source {
            ParamSource::Attribute(attribute) => match attributes.get(attribute) {
                Some(value) => fill(ctx, self.stack_index, self.index, Value::from(value)),
                None => Ok(()),
            },
            ParamSource::Body => Ok(()),
        }
    }

    fn body(&mut self, _ctx: &mut Context, _namespace: &str, _name: &str, text: &str) -> ActionResult {
        if self.source == ParamSource::Body {
            self.bodies.push(text.to_owned());
        }
        Ok(())
    }

    fn end(&mut self, ctx: &mut Context, _namespace: &str, _name: &str) -> ActionResult {
        match self.bodies.pop() {
            Some(text) => fill(ctx, self.stack_index, self.index, Value::Str(text)),
            None => Ok(()),
        }
    }

    fn finish(&mut self, _ctx: &mut Context) -> ActionResult {
        self.bodies.clear();
        Ok(())
    }
}

/// Fills one argument slot with a fixed value.
pub struct ObjectParam {
    index: usize,
    value: Box<dyn Fn() -> Value>,
    attribute: Option<String>,
    stack_index: usize,
}

impl ObjectParam {
    /// Fills slot `index` with whatever `value` produces.
    pub fn new<F>(index: usize, value: F) -> Self
    where
        F: Fn() -> Value + 'static,
    {
        Self {
            index,
            value: Box::new(value),
            attribute: None,
            stack_index: 0,
        }
    }

    /// Fills slot `index` with a fixed string.
    pub fn str(index: usize, value: &str) -> Self {
        let value = value.to_owned();
        Self::new(index, move || Value::Str(value.clone()))
    }

    /// Only fills the slot when the element carries `attribute`.
    pub fn when_attribute(mut self, attribute: &str) -> Self {
        self.attribute = Some(attribute.to_owned());
        self
    }

    /// Addresses the argument array `stack_index` entries below the top.
    pub fn stack_index(mut self, stack_index: usize) -> Self {
        self.stack_index = stack_index;
        self
    }
}

impl fmt::Debug for ObjectParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectParam")
            .field("index", &self.index)
            .field("attribute", &self.attribute)
            .field("stack_index", &self.stack_index)
            .finish_non_exhaustive()
    }
}

impl Action for ObjectParam {
    fn begin(
        &mut self,
        ctx: &mut Context,
        _namespace: &str,
        _name: &str,
        attributes: &Attributes,
    ) -> ActionResult {
        if let Some(attribute) = &self.attribute {
            if attributes.get(attribute).is_none() {
                return Ok(());
            }
        }
        fill(ctx, self.stack_index, self.index, (self.value)())
    }
}
