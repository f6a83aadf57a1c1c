//! Markup events consumed by the engine.
//!
//! A markup parser (or any other producer) turns a document into a stream of
//! [`Event`]s. The engine never sees raw bytes.

use std::fmt;

/// A position in the source document, 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Location {
    /// Line number.
    pub line: u32,
    /// Column number.
    pub column: u32,
}

impl Location {
    /// Creates a location.
    pub const fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// A single resolved attribute of an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Namespace URI of the attribute, empty when unqualified.
    pub namespace: String,
    /// Local name without any prefix.
    pub local_name: String,
    /// Qualified name as written in the document.
    pub qname: String,
    /// Attribute value.
    pub value: String,
}

impl Attribute {
    /// Creates an unqualified attribute.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            namespace: String::new(),
            local_name: name.clone(),
            qname: name,
            value: value.into(),
        }
    }

    /// The name actions should bind by: the local name, or the qualified name
    /// when the producer supplied no local name.
    pub fn name(&self) -> &str {
        if self.local_name.is_empty() {
            &self.qname
        } else {
            &self.local_name
        }
    }
}

/// The ordered attribute list of an element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes(Vec<Attribute>);

impl Attributes {
    /// An empty attribute list.
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Appends an attribute.
    pub fn push(&mut self, attribute: Attribute) {
        self.0.push(attribute);
    }

    /// Looks up a value by local (or qualified) name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|a| a.name() == name || a.qname == name)
            .map(|a| a.value.as_str())
    }

    /// Looks up a value by namespace URI and local name.
    pub fn get_ns(&self, namespace: &str, local_name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|a| a.namespace == namespace && a.local_name == local_name)
            .map(|a| a.value.as_str())
    }

    /// Iterates attributes in document order.
    pub fn iter(&self) -> std::slice::Iter<'_, Attribute> {
        self.0.iter()
    }

    /// Mutable iteration, used to apply text substitution in place.
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Attribute> {
        self.0.iter_mut()
    }

    /// Number of attributes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no attributes.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| Attribute::new(k, v))
                .collect(),
        )
    }
}

impl FromIterator<Attribute> for Attributes {
    fn from_iter<I: IntoIterator<Item = Attribute>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Attributes {
    type Item = &'a Attribute;
    type IntoIter = std::slice::Iter<'a, Attribute>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// One event of a hierarchical markup stream.
///
/// A well-formed stream is
/// `StartDocument, { StartPrefixMapping*, StartElement, (Characters | nested)*, EndElement, EndPrefixMapping* }+, EndDocument`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Beginning of the document.
    StartDocument,
    /// A namespace prefix comes into scope.
    StartPrefixMapping {
        /// Prefix; empty for the default namespace.
        prefix: String,
        /// Namespace URI.
        uri: String,
    },
    /// A namespace prefix goes out of scope.
    EndPrefixMapping {
        /// Prefix; empty for the default namespace.
        prefix: String,
    },
    /// An element opens.
    StartElement {
        /// Namespace URI, empty when unqualified.
        namespace: String,
        /// Local name.
        local_name: String,
        /// Qualified name as written.
        qname: String,
        /// Attributes in document order.
        attributes: Attributes,
    },
    /// Character data inside the current element.
    Characters(String),
    /// An element closes.
    EndElement {
        /// Namespace URI, empty when unqualified.
        namespace: String,
        /// Local name.
        local_name: String,
        /// Qualified name as written.
        qname: String,
    },
    /// End of the document.
    EndDocument,
}

impl Event {
    /// Start of an unqualified element.
    pub fn open(name: impl Into<String>, attributes: Attributes) -> Self {
        let name = name.into();
        Event::StartElement {
            namespace: String::new(),
            local_name: name.clone(),
            qname: name,
            attributes,
        }
    }

    /// End of an unqualified element.
    pub fn close(name: impl Into<String>) -> Self {
        let name = name.into();
        Event::EndElement {
            namespace: String::new(),
            local_name: name.clone(),
            qname: name,
        }
    }

    /// Character data.
    pub fn text(text: impl Into<String>) -> Self {
        Event::Characters(text.into())
    }

    /// Short kind label used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Event::StartDocument => "start-document",
            Event::StartPrefixMapping { .. } => "start-prefix-mapping",
            Event::EndPrefixMapping { .. } => "end-prefix-mapping",
            Event::StartElement { .. } => "start-element",
            Event::Characters(_) => "characters",
            Event::EndElement { .. } => "end-element",
            Event::EndDocument => "end-document",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attribute_lookup_by_local_and_qualified_name() {
        let mut attrs: Attributes = [("name", "x")].into_iter().collect();
        attrs.push(Attribute {
            namespace: "urn:a".into(),
            local_name: "id".into(),
            qname: "a:id".into(),
            value: "7".into(),
        });

        assert_eq!(attrs.get("name"), Some("x"));
        assert_eq!(attrs.get("id"), Some("7"));
        assert_eq!(attrs.get("a:id"), Some("7"));
        assert_eq!(attrs.get_ns("urn:a", "id"), Some("7"));
        assert_eq!(attrs.get_ns("", "id"), None);
        assert_eq!(attrs.len(), 2);
    }

    #[test]
    fn attribute_name_falls_back_to_qname() {
        let attr = Attribute {
            namespace: String::new(),
            local_name: String::new(),
            qname: "x:y".into(),
            value: String::new(),
        };
        assert_eq!(attr.name(), "x:y");
    }
}
