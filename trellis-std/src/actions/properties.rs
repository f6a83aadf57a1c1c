//! Property assignment actions.

use std::collections::{HashMap, HashSet};
use trellis_core::{Action, ActionResult, Attributes, Context, Value};

/// Copies every attribute of the matched element to the same-named property
/// of the top object.
///
/// Attributes can be renamed with [`alias`](Self::alias) or skipped with
/// [`ignore`](Self::ignore). Properties the object does not have are
/// tolerated (and reported in strict mode).
#[derive(Debug, Default)]
pub struct SetProperties {
    aliases: HashMap<String, String>,
    ignored: HashSet<String>,
}

impl SetProperties {
    /// Copies every attribute verbatim.
    pub fn new() -> Self {
        Self::default()
    }

    /// Assigns `attribute` to `property` instead of a same-named property.
    pub fn alias(mut self, attribute: &str, property: &str) -> Self {
        self.aliases
            .insert(attribute.to_owned(), property.to_owned());
        self
    }

    /// Never assigns `attribute`.
    pub fn ignore(mut self, attribute: &str) -> Self {
        self.ignored.insert(attribute.to_owned());
        self
    }
}

impl Action for SetProperties {
    fn begin(
        &mut self,
        ctx: &mut Context,
        _namespace: &str,
        _name: &str,
        attributes: &Attributes,
    ) -> ActionResult {
        for attribute in attributes {
            let name = attribute.name();
            if self.ignored.contains(name) {
                continue;
            }
            let property = self.aliases.get(name).map_or(name, String::as_str);
            let Some(top) = ctx.peek_mut() else {
                return Ok(());
            };
            let result = top.set_property(property, Value::from(attribute.value.as_str()));
            ctx.tolerate(result)?;
        }
        Ok(())
    }
}

/// Sets one property whose name and value are both taken from attributes.
///
/// `<set-property name="timeout" value="30"/>` with the default attribute
/// names assigns `30` to `timeout` on the top object.
#[derive(Debug)]
pub struct SetProperty {
    name_attribute: String,
    value_attribute: String,
}

impl SetProperty {
    /// Reads the property name from `name_attribute` and its value from `value_attribute`.
    pub fn new(name_attribute: &str, value_attribute: &str) -> Self {
        Self {
            name_attribute: name_attribute.to_owned(),
            value_attribute: value_attribute.to_owned(),
        }
    }
}

impl Default for SetProperty {
    fn default() -> Self {
        Self::new("name", "value")
    }
}

impl Action for SetProperty {
    fn begin(
        &mut self,
        ctx: &mut Context,
        _namespace: &str,
        name: &str,
        attributes: &Attributes,
    ) -> ActionResult {
        let (Some(property), Some(value)) = (
            attributes.get(&self.name_attribute),
            attributes.get(&self.value_attribute),
        ) else {
            tracing::warn!(
                path = %ctx.path(),
                element = name,
                "set-property needs both `{}` and `{}` attributes",
                self.name_attribute,
                self.value_attribute
            );
            return Ok(());
        };
        let Some(top) = ctx.peek_mut() else {
            return Ok(());
        };
        let result = top.set_property(property, Value::from(value));
        ctx.tolerate(result).map(|_| ())
    }
}

/// Assigns the body text of the matched element to a property of the top
/// object. The property defaults to the element's own name.
///
/// `<port>8080</port>` under a `server` object sets `server.port`.
#[derive(Debug, Default)]
pub struct BodyProperty {
    property: Option<String>,
    pending: Vec<(String, String)>,
}

impl BodyProperty {
    /// Uses the element name as the property name.
    pub fn new() -> Self {
        Self::default()
    }

    /// Assigns to `property` regardless of the element name.
    pub fn named(property: &str) -> Self {
        Self {
            property: Some(property.to_owned()),
            pending: Vec::new(),
        }
    }
}

impl Action for BodyProperty {
    fn body(&mut self, _ctx: &mut Context, _namespace: &str, name: &str, text: &str) -> ActionResult {
        let property = self.property.clone().unwrap_or_else(|| name.to_owned());
        self.pending.push((property, text.to_owned()));
        Ok(())
    }

    fn end(&mut self, ctx: &mut Context, _namespace: &str, _name: &str) -> ActionResult {
        let Some((property, text)) = self.pending.pop() else {
            return Ok(());
        };
        let Some(top) = ctx.peek_mut() else {
            return Ok(());
        };
        let result = top.set_property(&property, Value::Str(text));
        ctx.tolerate(result).map(|_| ())
    }

    fn finish(&mut self, _ctx: &mut Context) -> ActionResult {
        self.pending.clear();
        Ok(())
    }
}
