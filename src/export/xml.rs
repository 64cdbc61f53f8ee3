//! Structured XML element tree and its single escaping-aware writer.
//!
//! Exporters build [`XmlElement`] trees and never format markup themselves;
//! all escaping of text and attribute values happens in [`write_document`].

use std::io::Cursor;

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};

use super::ExportError;

/// Content of an element.
#[derive(Clone, Debug, PartialEq)]
pub enum XmlNode {
    Element(XmlElement),
    Text(String),
}

/// An XML element with attributes and ordered content.
#[derive(Clone, Debug, PartialEq)]
pub struct XmlElement {
    pub name: &'static str,
    pub attributes: Vec<(&'static str, String)>,
    pub content: Vec<XmlNode>,
}

impl XmlElement {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            attributes: Vec::new(),
            content: Vec::new(),
        }
    }

    pub fn attr(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.attributes.push((key, value.into()));
        self
    }

    pub fn child(mut self, element: XmlElement) -> Self {
        self.content.push(XmlNode::Element(element));
        self
    }

    pub fn children(mut self, elements: impl IntoIterator<Item = XmlElement>) -> Self {
        self.content
            .extend(elements.into_iter().map(XmlNode::Element));
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.content.push(XmlNode::Text(text.into()));
        self
    }

    /// Append `<name>text</name>`.
    pub fn text_child(self, name: &'static str, text: impl Into<String>) -> Self {
        self.child(XmlElement::new(name).text(text))
    }
}

/// Serialize `root` as a UTF-8 document with an XML declaration.
pub fn write_document(root: &XmlElement) -> Result<Vec<u8>, ExportError> {
    let mut buffer = Cursor::new(Vec::new());
    let mut writer = Writer::new_with_indent(&mut buffer, b' ', 2);

    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
        .map_err(|e| ExportError::xml(format!("Write error: {e}")))?;
    write_element(&mut writer, root)?;

    let mut output = buffer.into_inner();
    output.push(b'\n');
    Ok(output)
}

fn write_element<W: std::io::Write>(
    writer: &mut Writer<W>,
    element: &XmlElement,
) -> Result<(), ExportError> {
    let mut start = BytesStart::new(element.name);
    for (key, value) in &element.attributes {
        start.push_attribute((*key, value.as_str()));
    }

    if element.content.is_empty() {
        return writer
            .write_event(Event::Empty(start))
            .map_err(|e| ExportError::xml(format!("Write error: {e}")));
    }

    writer
        .write_event(Event::Start(start))
        .map_err(|e| ExportError::xml(format!("Write error: {e}")))?;
    for node in &element.content {
        match node {
            XmlNode::Element(child) => write_element(writer, child)?,
            XmlNode::Text(text) => writer
                .write_event(Event::Text(BytesText::new(text)))
                .map_err(|e| ExportError::xml(format!("Write error: {e}")))?,
        }
    }
    writer
        .write_event(Event::End(BytesEnd::new(element.name)))
        .map_err(|e| ExportError::xml(format!("Write error: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_and_attributes_are_escaped() {
        let doc = XmlElement::new("Document")
            .attr("id", "a\"b")
            .text_child("name", "Rocks & <Dunes>");

        let out = String::from_utf8(write_document(&doc).expect("write")).expect("utf8");
        assert!(out.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(out.contains("<name>Rocks &amp; &lt;Dunes&gt;</name>"));
        assert!(out.contains("id=\"a&quot;b\""));
    }

    #[test]
    fn test_empty_element_is_self_closing() {
        let doc = XmlElement::new("kml").child(XmlElement::new("Document"));
        let out = String::from_utf8(write_document(&doc).expect("write")).expect("utf8");
        assert!(out.contains("<Document/>"));
    }
}
