#![allow(dead_code)]

use trellis::{Attributes, BindError, Bindable, Event, Value};

// ============================================================================
// Test Object Types
// ============================================================================

#[derive(Debug, Default, PartialEq, Bindable)]
pub struct Config {
    pub name: String,
    #[bind(adder = "add_service")]
    pub services: Vec<Service>,
    #[bind(skip)]
    pub notes: Vec<String>,
}

#[derive(Debug, Default, Clone, PartialEq, Bindable)]
pub struct Service {
    pub name: String,
    pub port: u16,
    #[bind(rename = "log-level")]
    pub log_level: Option<String>,
    #[bind(adder = "add_alias")]
    pub aliases: Vec<String>,
}

/// A recursive type for patterns that match at several depths.
#[derive(Debug, Default, PartialEq, Bindable)]
pub struct Node {
    pub name: String,
    pub label: String,
    #[bind(adder = "add_child")]
    pub children: Vec<Node>,
}

/// A hand-written bindable with a two-argument method.
#[derive(Debug, Default, PartialEq)]
pub struct Catalog {
    pub entries: Vec<(String, String)>,
    pub title: String,
}

impl Bindable for Catalog {
    fn set_property(&mut self, name: &str, value: Value) -> Result<(), BindError> {
        match name {
            "title" => self.title = value.convert()?,
            _ => return Err(self.unknown_property(name)),
        }
        Ok(())
    }

    fn invoke(&mut self, method: &str, args: Vec<Value>) -> Result<Option<Value>, BindError> {
        match method {
            "add_entry" => {
                let [key, value]: [Value; 2] =
                    args.try_into().map_err(|args: Vec<Value>| BindError::Arity {
                        method: method.to_owned(),
                        expected: 2,
                        found: args.len(),
                    })?;
                self.entries.push((key.convert()?, value.convert()?));
                Ok(None)
            }
            "len" => Ok(Some(Value::from(self.entries.len() as i64))),
            _ => Err(self.unknown_method(method)),
        }
    }
}

// ============================================================================
// Event Helpers
// ============================================================================

/// Wraps `body` in start/end document events.
pub fn document(body: Vec<Event>) -> Vec<Event> {
    let mut events = vec![Event::StartDocument];
    events.extend(body);
    events.push(Event::EndDocument);
    events
}

pub fn open(name: &str) -> Event {
    Event::open(name, Attributes::new())
}

pub fn open_with(name: &str, attributes: &[(&str, &str)]) -> Event {
    Event::open(name, attributes.iter().copied().collect())
}

pub fn close(name: &str) -> Event {
    Event::close(name)
}

pub fn text(text: &str) -> Event {
    Event::text(text)
}

/// `<name attrs/>`: an open immediately followed by its close.
pub fn empty(name: &str, attributes: &[(&str, &str)]) -> Vec<Event> {
    vec![open_with(name, attributes), close(name)]
}
