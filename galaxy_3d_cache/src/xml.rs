//! Owned XML document model.
//!
//! Resource files and aggregate documents are small, so they are parsed into a
//! tree of `XmlNode`s with `quick-xml` and written back from that tree. Load
//! and save jobs work on nodes, never on the raw event stream.

use std::str::FromStr;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use crate::error::{Error, Result};
use crate::engine_bail;

/// One element: tag, ordered attributes, child elements and text content
#[derive(Debug, Clone, Default, PartialEq)]
pub struct XmlNode {
    tag: String,
    attributes: Vec<(String, String)>,
    children: Vec<XmlNode>,
    text: String,
}

impl XmlNode {
    /// Create an empty element
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Default::default()
        }
    }

    /// Builder-style attribute setter
    pub fn with_attribute(mut self, key: &str, value: impl ToString) -> Self {
        self.set_attribute(key, value);
        self
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    // ===== ATTRIBUTES =====

    /// Set an attribute, replacing an existing value with the same key
    pub fn set_attribute(&mut self, key: &str, value: impl ToString) {
        let value = value.to_string();
        match self.attributes.iter_mut().find(|(k, _)| k == key) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((key.to_string(), value)),
        }
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Attributes in document order
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Get an attribute that the document format requires
    ///
    /// # Errors
    ///
    /// `MalformedDocument` when the attribute is missing.
    pub fn required_attribute(&self, key: &str) -> Result<&str> {
        match self.attribute(key) {
            Some(value) => Ok(value),
            None => engine_bail!(MalformedDocument => "galaxy3d::Xml",
                "<{}> is missing required attribute '{}'", self.tag, key),
        }
    }

    /// Parse an optional attribute
    ///
    /// # Errors
    ///
    /// `MalformedDocument` when the attribute is present but does not parse.
    pub fn parse_attribute<T: FromStr>(&self, key: &str) -> Result<Option<T>> {
        match self.attribute(key) {
            None => Ok(None),
            Some(raw) => match raw.trim().parse::<T>() {
                Ok(value) => Ok(Some(value)),
                Err(_) => engine_bail!(MalformedDocument => "galaxy3d::Xml",
                    "<{}> attribute '{}' has invalid value '{}'", self.tag, key, raw),
            },
        }
    }

    // ===== CHILDREN =====

    pub fn children(&self) -> &[XmlNode] {
        &self.children
    }

    /// Iterate over direct children with the given tag
    pub fn children_named<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a XmlNode> + 'a {
        self.children.iter().filter(move |c| c.tag == tag)
    }

    /// First direct child with the given tag
    pub fn child(&self, tag: &str) -> Option<&XmlNode> {
        self.children.iter().find(|c| c.tag == tag)
    }

    /// First direct child with the given tag, appended when missing
    pub fn child_or_insert(&mut self, tag: &str) -> &mut XmlNode {
        match self.children.iter().position(|c| c.tag == tag) {
            Some(index) => &mut self.children[index],
            None => self.push_child(XmlNode::new(tag)),
        }
    }

    /// Append a child and return a mutable reference to it
    pub fn push_child(&mut self, child: XmlNode) -> &mut XmlNode {
        self.children.push(child);
        let last = self.children.len() - 1;
        &mut self.children[last]
    }

    /// Depth-first, pre-order visit of this node and all its descendants
    pub fn walk<'a>(&'a self, visit: &mut dyn FnMut(&'a XmlNode)) {
        visit(self);
        for child in &self.children {
            child.walk(visit);
        }
    }

    // ===== PARSING =====

    /// Parse a document and return its root element
    ///
    /// Declarations, comments and processing instructions are skipped.
    ///
    /// # Errors
    ///
    /// `MalformedDocument` on syntax errors, unbalanced tags, several root
    /// elements or an empty document.
    pub fn parse(source: &str) -> Result<XmlNode> {
        let mut reader = Reader::from_str(source);
        reader.config_mut().trim_text(true);

        let mut stack: Vec<XmlNode> = Vec::new();
        let mut root: Option<XmlNode> = None;

        loop {
            match reader.read_event() {
                Ok(Event::Start(start)) => stack.push(Self::from_start(&start)?),
                Ok(Event::Empty(start)) => {
                    let node = Self::from_start(&start)?;
                    Self::attach(&mut stack, &mut root, node)?;
                }
                Ok(Event::End(_)) => {
                    let node = match stack.pop() {
                        Some(node) => node,
                        None => engine_bail!(MalformedDocument => "galaxy3d::Xml",
                            "Unexpected closing tag at byte {}", reader.buffer_position()),
                    };
                    Self::attach(&mut stack, &mut root, node)?;
                }
                Ok(Event::Text(text)) => {
                    let text = text.unescape().map_err(|e| Error::MalformedDocument(e.to_string()))?;
                    if let Some(top) = stack.last_mut() {
                        top.text.push_str(&text);
                    }
                }
                Ok(Event::CData(data)) => {
                    if let Some(top) = stack.last_mut() {
                        top.text.push_str(&String::from_utf8_lossy(&data.into_inner()));
                    }
                }
                Ok(Event::Eof) => break,
                Ok(_) => {}
                Err(e) => engine_bail!(MalformedDocument => "galaxy3d::Xml",
                    "XML error at byte {}: {}", reader.buffer_position(), e),
            }
        }

        if let Some(open) = stack.last() {
            engine_bail!(MalformedDocument => "galaxy3d::Xml", "Element <{}> is never closed", open.tag);
        }
        match root {
            Some(root) => Ok(root),
            None => engine_bail!(MalformedDocument => "galaxy3d::Xml", "Document has no root element"),
        }
    }

    fn from_start(start: &BytesStart) -> Result<XmlNode> {
        let mut node = XmlNode::new(String::from_utf8_lossy(start.name().as_ref()).into_owned());
        for attribute in start.attributes() {
            let attribute = attribute.map_err(|e| Error::MalformedDocument(e.to_string()))?;
            let key = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
            let value = attribute
                .unescape_value()
                .map_err(|e| Error::MalformedDocument(e.to_string()))?;
            node.attributes.push((key, value.into_owned()));
        }
        Ok(node)
    }

    fn attach(stack: &mut [XmlNode], root: &mut Option<XmlNode>, node: XmlNode) -> Result<()> {
        if let Some(parent) = stack.last_mut() {
            parent.children.push(node);
            return Ok(());
        }
        if root.is_some() {
            engine_bail!(MalformedDocument => "galaxy3d::Xml",
                "Second root element <{}>", node.tag);
        }
        *root = Some(node);
        Ok(())
    }

    // ===== WRITING =====

    /// Serialize this node as a complete, indented document
    pub fn to_xml_string(&self) -> Result<String> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))
            .map_err(|e| Error::Io(e.to_string()))?;
        self.write_into(&mut writer)?;
        String::from_utf8(writer.into_inner()).map_err(|e| Error::Io(e.to_string()))
    }

    fn write_into(&self, writer: &mut Writer<Vec<u8>>) -> Result<()> {
        let mut start = BytesStart::new(self.tag.as_str());
        for (key, value) in &self.attributes {
            start.push_attribute((key.as_str(), value.as_str()));
        }

        if self.children.is_empty() && self.text.is_empty() {
            return writer
                .write_event(Event::Empty(start))
                .map_err(|e| Error::Io(e.to_string()));
        }

        writer.write_event(Event::Start(start)).map_err(|e| Error::Io(e.to_string()))?;
        if !self.text.is_empty() {
            writer
                .write_event(Event::Text(BytesText::new(&self.text)))
                .map_err(|e| Error::Io(e.to_string()))?;
        }
        for child in &self.children {
            child.write_into(writer)?;
        }
        writer
            .write_event(Event::End(BytesEnd::new(self.tag.as_str())))
            .map_err(|e| Error::Io(e.to_string()))
    }
}

#[cfg(test)]
#[path = "xml_tests.rs"]
mod tests;
