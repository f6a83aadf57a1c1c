//! A thin XML driver over `quick-xml`.
//!
//! The driver reads markup and notifies an [`Engine`] of each event. It adds
//! what a streaming XML reader leaves to its caller:
//!
//! - `xmlns` attributes become prefix-mapping events and are resolved into
//!   element and attribute namespace URIs;
//! - empty elements (`<a/>`) are expanded into an open and a close;
//! - byte offsets are turned into line/column locations for error reports.

use crate::engine::Engine;
use quick_xml::{
    Reader,
    events::{BytesStart, Event as XmlEvent},
    name::PrefixDeclaration,
};
use std::fmt::Display;
use trellis_core::{Attribute, Attributes, Bindable, Location, NamespaceScopes, TrellisError};
use trellis_std::rules::Rules;

/// Interprets the XML document `xml` with `engine` and returns its result root.
///
/// The engine must be idle. After an error, [`reset`](Engine::reset) it
/// before reuse.
pub fn parse_str<R: Rules>(
    engine: &mut Engine<R>,
    xml: &str,
) -> Result<Option<Box<dyn Bindable>>, TrellisError> {
    Driver::new(xml).run(engine)?;
    Ok(engine.take_root())
}

impl<R: Rules> Engine<R> {
    /// Interprets the XML document `xml`; see [`parse_str`].
    pub fn parse_str(&mut self, xml: &str) -> Result<Option<Box<dyn Bindable>>, TrellisError> {
        parse_str(self, xml)
    }
}

struct Driver<'a> {
    lines: LineIndex<'a>,
    scopes: NamespaceScopes,
    declared: Vec<Vec<String>>,
}

impl<'a> Driver<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            lines: LineIndex::new(source),
            scopes: NamespaceScopes::new(),
            declared: Vec::new(),
        }
    }

    fn run<R: Rules>(&mut self, engine: &mut Engine<R>) -> Result<(), TrellisError> {
        let mut reader = Reader::from_str(self.lines.source);
        reader.config_mut().trim_text(false);

        engine.start_document()?;
        loop {
            let offset = usize::try_from(reader.buffer_position()).unwrap_or(usize::MAX);
            let location = self.lines.locate(offset);
            engine.set_location(Some(location));

            match reader.read_event().map_err(|err| markup(location, err))? {
                XmlEvent::Start(start) => self.open(engine, &start, location)?,
                XmlEvent::Empty(start) => {
                    self.open(engine, &start, location)?;
                    self.close(engine, start.name().as_ref(), location)?;
                }
                XmlEvent::End(end) => self.close(engine, end.name().as_ref(), location)?,
                XmlEvent::Text(text) => {
                    let text = text.unescape().map_err(|err| markup(location, err))?;
                    engine.characters(&text)?;
                }
                XmlEvent::CData(cdata) => {
                    let text = std::str::from_utf8(&cdata).map_err(|err| markup(location, err))?;
                    engine.characters(text)?;
                }
                XmlEvent::Eof => break,
                _ => {}
            }
        }
        engine.end_document()
    }

    fn open<R: Rules>(
        &mut self,
        engine: &mut Engine<R>,
        start: &BytesStart<'_>,
        location: Location,
    ) -> Result<(), TrellisError> {
        let mut declared = Vec::new();
        let mut plain = Vec::new();
        for attribute in start.attributes() {
            let attribute = attribute.map_err(|err| markup(location, err))?;
            let value = attribute
                .unescape_value()
                .map_err(|err| markup(location, err))?
                .into_owned();
            match attribute.key.as_namespace_binding() {
                Some(PrefixDeclaration::Default) => declared.push((String::new(), value)),
                Some(PrefixDeclaration::Named(prefix)) => {
                    declared.push((utf8(prefix, location)?.to_owned(), value));
                }
                None => plain.push((utf8(attribute.key.as_ref(), location)?.to_owned(), value)),
            }
        }

        for (prefix, uri) in &declared {
            self.scopes.enter_scope(prefix, uri);
            engine.start_prefix_mapping(prefix, uri)?;
        }
        self.declared
            .push(declared.into_iter().map(|(prefix, _)| prefix).collect());

        let attributes: Attributes = plain
            .into_iter()
            .map(|(qname, value)| {
                let (prefix, local_name) = split_qname(&qname);
                // Unprefixed attributes are in no namespace.
                let namespace = match prefix {
                    "" => String::new(),
                    prefix => self.scopes.resolve(prefix).unwrap_or_default().to_owned(),
                };
                Attribute {
                    namespace,
                    local_name: local_name.to_owned(),
                    qname: qname.clone(),
                    value,
                }
            })
            .collect();

        let qname = utf8(start.name().into_inner(), location)?;
        let (prefix, local_name) = split_qname(qname);
        let namespace = self.scopes.resolve(prefix).unwrap_or_default().to_owned();
        engine.start_element(&namespace, local_name, qname, attributes)
    }

    fn close<R: Rules>(
        &mut self,
        engine: &mut Engine<R>,
        qname: &[u8],
        location: Location,
    ) -> Result<(), TrellisError> {
        let qname = utf8(qname, location)?;
        let (prefix, local_name) = split_qname(qname);
        let namespace = self.scopes.resolve(prefix).unwrap_or_default().to_owned();
        engine.end_element(&namespace, local_name, qname)?;

        for prefix in self.declared.pop().unwrap_or_default().iter().rev() {
            self.scopes.exit_scope(prefix);
            engine.end_prefix_mapping(prefix)?;
        }
        Ok(())
    }
}

fn split_qname(qname: &str) -> (&str, &str) {
    qname.split_once(':').unwrap_or(("", qname))
}

fn utf8(bytes: &[u8], location: Location) -> Result<&str, TrellisError> {
    std::str::from_utf8(bytes).map_err(|err| markup(location, err))
}

fn markup(location: Location, err: impl Display) -> TrellisError {
    TrellisError::Markup {
        location: Some(location),
        message: err.to_string(),
    }
}

/// Converts increasing byte offsets into 1-based line/column positions.
struct LineIndex<'a> {
    source: &'a str,
    offset: usize,
    line: u32,
    column: u32,
}

impl<'a> LineIndex<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            offset: 0,
            line: 1,
            column: 1,
        }
    }

    fn locate(&mut self, offset: usize) -> Location {
        let end = offset.min(self.source.len());
        if let Some(scanned) = self.source.as_bytes().get(self.offset..end) {
            for &byte in scanned {
                if byte == b'\n' {
                    self.line = self.line.saturating_add(1);
                    self.column = 1;
                } else if byte & 0xC0 != 0x80 {
                    // utf-8 continuation bytes do not start a column
                    self.column = self.column.saturating_add(1);
                }
            }
            self.offset = end;
        }
        Location::new(self.line, self.column)
    }
}
