use std::{borrow::Cow, io};

use xml::{
    attribute::OwnedAttribute,
    common::XmlVersion,
    name::OwnedName,
    namespace::Namespace,
    reader::{self, EventReader},
    writer::{self, EmitterConfig, EventWriter, XmlEvent},
};

use crate::{
    types::{EwsWrite, MESSAGES_NS_URI, REQUEST_SERVER_VERSION, SOAP_NS_URI, TYPES_NS_URI},
    Error,
};

/// Writes a struct as the body of a SOAP request.
pub fn write_request<W: io::Write, X: EwsWrite<W>>(
    sink: W,
    body: &X,
) -> Result<(), writer::Error> {
    let mut writer = EmitterConfig::new().create_writer(sink);

    write_envelope(&mut writer, body)
}

/// Builds the complete SOAP envelope for a request.
///
/// The output carries no indentation, so the same request always produces
/// the same bytes.
pub fn build_request<X: EwsWrite<Vec<u8>>>(body: &X) -> Result<String, Error> {
    let mut writer = EmitterConfig::new().create_writer(Vec::new());
    write_envelope(&mut writer, body)?;

    // The emitter only ever produces UTF-8.
    Ok(String::from_utf8_lossy(&writer.into_inner()).into_owned())
}

fn write_envelope<W: io::Write, X: EwsWrite<W>>(
    writer: &mut EventWriter<W>,
    body: &X,
) -> Result<(), writer::Error> {
    writer.write(XmlEvent::StartDocument {
        version: XmlVersion::Version10,
        encoding: Some("utf-8"),
        standalone: None,
    })?;

    writer.write(
        XmlEvent::start_element("soap:Envelope")
            .ns("m", MESSAGES_NS_URI)
            .ns("soap", SOAP_NS_URI)
            .ns("t", TYPES_NS_URI),
    )?;

    writer.write(XmlEvent::start_element("soap:Header"))?;
    writer.write(
        XmlEvent::start_element("t:RequestServerVersion").attr("Version", REQUEST_SERVER_VERSION),
    )?;
    writer.write(XmlEvent::end_element())?;
    writer.write(XmlEvent::end_element())?;

    writer.write(XmlEvent::start_element("soap:Body"))?;
    body.write(writer)?;
    writer.write(XmlEvent::end_element())?;

    writer.write(XmlEvent::end_element())
}

/// A node in a parsed document.
#[derive(Clone, Debug)]
pub enum Node {
    Element(Element),
    Text(String),
}

/// An element of a parsed XML document, owning all of its content.
#[derive(Clone, Debug)]
pub struct Element {
    name: OwnedName,
    attributes: Vec<OwnedAttribute>,
    namespace: Namespace,
    children: Vec<Node>,
}

impl Element {
    pub fn local_name(&self) -> &str {
        &self.name.local_name
    }

    pub fn namespace_uri(&self) -> Option<&str> {
        self.name.namespace.as_deref()
    }

    /// Whether this element has the given namespace-qualified name.
    pub fn is(&self, namespace_uri: &str, local_name: &str) -> bool {
        self.local_name() == local_name && self.namespace_uri() == Some(namespace_uri)
    }

    pub fn attribute(&self, local_name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|attribute| attribute.name.local_name == local_name)
            .map(|attribute| attribute.value.as_str())
    }

    /// The element's direct child elements.
    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(element) => Some(element),
            Node::Text(_) => None,
        })
    }

    /// All elements below this one, in document order.
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants {
            stack: vec![self.children.iter()],
        }
    }

    /// All elements below this one with the given namespace-qualified name,
    /// in document order.
    pub fn descendants_named<'a>(
        &'a self,
        namespace_uri: &'a str,
        local_name: &'a str,
    ) -> impl Iterator<Item = &'a Element> + 'a {
        self.descendants()
            .filter(move |element| element.is(namespace_uri, local_name))
    }

    /// The concatenated text content of this element and its descendants.
    pub fn text(&self) -> String {
        let mut text = String::new();
        self.collect_text(&mut text);

        text
    }

    fn collect_text(&self, buf: &mut String) {
        for node in &self.children {
            match node {
                Node::Element(element) => element.collect_text(buf),
                Node::Text(text) => buf.push_str(text),
            }
        }
    }

    /// Serializes the element as an indented document, for display.
    pub fn to_pretty_string(&self) -> Result<String, Error> {
        let mut writer = EmitterConfig::new()
            .perform_indent(true)
            .create_writer(Vec::new());
        self.write_to(&mut writer)?;

        Ok(String::from_utf8_lossy(&writer.into_inner()).into_owned())
    }

    fn write_to<W: io::Write>(&self, writer: &mut EventWriter<W>) -> Result<(), writer::Error> {
        let attributes: Vec<_> = self.attributes.iter().map(|attr| attr.borrow()).collect();
        writer.write(XmlEvent::StartElement {
            name: self.name.borrow(),
            attributes: Cow::Owned(attributes),
            namespace: Cow::Borrowed(&self.namespace),
        })?;

        for node in &self.children {
            match node {
                Node::Element(element) => element.write_to(writer)?,
                Node::Text(text) => writer.write(XmlEvent::characters(text))?,
            }
        }

        writer.write(XmlEvent::EndElement {
            name: Some(self.name.borrow()),
        })
    }
}

/// Iterator over the descendants of an [`Element`], in document order.
pub struct Descendants<'a> {
    stack: Vec<std::slice::Iter<'a, Node>>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Element;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let siblings = self.stack.last_mut()?;
            match siblings.next() {
                Some(Node::Element(element)) => {
                    self.stack.push(element.children.iter());
                    return Some(element);
                }
                Some(Node::Text(_)) => continue,
                None => {
                    self.stack.pop();
                }
            }
        }
    }
}

/// The deepest element nesting accepted in a parsed document.
///
/// The tree is walked recursively when its text is collected, when it is
/// re-serialized and when it is dropped.
pub const MAX_DEPTH: usize = 256;

/// Parses a complete XML document into a tree, returning its root element.
///
/// Documents nested deeper than [`MAX_DEPTH`] elements are rejected.
pub fn parse_envelope<R: io::Read>(source: R) -> Result<Element, reader::Error> {
    let mut open: Vec<Element> = Vec::new();
    let mut root = None;

    for event in EventReader::new(source) {
        match event? {
            reader::XmlEvent::StartElement {
                name,
                attributes,
                namespace,
            } => {
                if open.len() >= MAX_DEPTH {
                    return Err(io::Error::new(
                        io::ErrorKind::InvalidData,
                        format!("elements nested deeper than {MAX_DEPTH} levels"),
                    )
                    .into());
                }

                open.push(Element {
                    name,
                    attributes,
                    namespace,
                    children: Vec::new(),
                });
            }
            reader::XmlEvent::EndElement { .. } => {
                if let Some(element) = open.pop() {
                    match open.last_mut() {
                        Some(parent) => parent.children.push(Node::Element(element)),
                        None => root = Some(element),
                    }
                }
            }
            reader::XmlEvent::Characters(text) | reader::XmlEvent::CData(text) => {
                if let Some(current) = open.last_mut() {
                    current.children.push(Node::Text(text));
                }
            }
            _ => {}
        }
    }

    root.ok_or_else(|| {
        io::Error::new(io::ErrorKind::UnexpectedEof, "document has no root element").into()
    })
}
