//! Minimal XML document tree used to build and read Jenkins job configs
//!
//! Jenkins job documents are element trees whose leaves carry text. Mixed
//! content does not occur in them, so whitespace-only text next to child
//! elements is treated as indentation and dropped on parse.

use std::fmt::Display;

use quick_xml::events::{
    BytesEnd,
    BytesStart,
    BytesText,
    Event,
};
use quick_xml::{
    Reader,
    Writer,
};

use crate::error::{
    CodecError,
    CodecResult,
};

pub const DECLARED_ENCODING: &str = "UTF-8";

const DEFAULT_VERSION: &str = "1.0";

const INDENT_WIDTH: usize = 2;

fn malformed<E: Display>(err: E) -> CodecError {
    CodecError::MalformedDocument(err.to_string())
}

fn serialization<E: Display>(err: E) -> CodecError {
    CodecError::Serialization(err.to_string())
}

/// A parsed XML document with exactly one root element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    version: String,
    root: Element,
}

impl Document {
    pub fn new(root: Element) -> Self {
        Self {
            version: DEFAULT_VERSION.to_string(),
            root,
        }
    }

    /// Parses a well-formed XML string. Comments, processing instructions
    /// and doctype declarations are skipped.
    pub fn parse(input: &str) -> CodecResult<Self> {
        let mut reader = Reader::from_str(input);
        reader.config_mut().trim_text(false);

        let mut version = DEFAULT_VERSION.to_string();
        let mut stack: Vec<Element> = Vec::new();
        let mut root: Option<Element> = None;

        loop {
            match reader.read_event().map_err(malformed)? {
                Event::Decl(decl) => {
                    let declared = decl.version().map_err(malformed)?;
                    version = String::from_utf8_lossy(&declared).into_owned();
                }
                Event::Start(start) => stack.push(Element::from_start(&start)?),
                Event::Empty(start) => {
                    let element = Element::from_start(&start)?;
                    attach(&mut stack, &mut root, element)?;
                }
                Event::End(_) => {
                    let element = stack
                        .pop()
                        .ok_or_else(|| malformed("closing tag without matching opening tag"))?;
                    attach(&mut stack, &mut root, element)?;
                }
                Event::Text(text) => {
                    let text = text.unescape().map_err(malformed)?;
                    push_text(&mut stack, &text)?;
                }
                Event::CData(cdata) => {
                    let text = String::from_utf8_lossy(&cdata).into_owned();
                    push_text(&mut stack, &text)?;
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if let Some(open) = stack.last() {
            return Err(malformed(format!("unclosed element <{}>", open.tag)));
        }

        let root = root.ok_or_else(|| malformed("document has no root element"))?;
        Ok(Self { version, root })
    }

    /// The version token from the XML declaration
    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn root(&self) -> &Element {
        &self.root
    }

    /// Returns the root element if it has the given tag
    pub fn select_root(&self, tag: &str) -> Option<&Element> {
        (self.root.tag == tag).then_some(&self.root)
    }

    pub fn select_root_mut(&mut self, tag: &str) -> Option<&mut Element> {
        if self.root.tag == tag {
            Some(&mut self.root)
        } else {
            None
        }
    }

    /// Serializes the document with a UTF-8 declaration and two-space
    /// indentation. The declaration uses single quotes like the documents
    /// Jenkins writes.
    pub fn to_xml_string(&self) -> CodecResult<String> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', INDENT_WIDTH);
        writer.get_mut().extend_from_slice(
            format!(
                "<?xml version='{}' encoding='{DECLARED_ENCODING}'?>\n",
                self.version
            )
            .as_bytes(),
        );
        self.root.write(&mut writer)?;

        String::from_utf8(writer.into_inner()).map_err(serialization)
    }
}

fn attach(
    stack: &mut [Element], root: &mut Option<Element>, mut element: Element,
) -> CodecResult<()> {
    if !element.children.is_empty() && element.text.trim().is_empty() {
        element.text.clear();
    }

    if let Some(parent) = stack.last_mut() {
        parent.children.push(element);
        return Ok(());
    }

    if root.is_some() {
        return Err(malformed(format!(
            "second root element <{}>",
            element.tag
        )));
    }
    *root = Some(element);
    Ok(())
}

fn push_text(stack: &mut [Element], text: &str) -> CodecResult<()> {
    match stack.last_mut() {
        Some(element) => {
            element.text.push_str(text);
            Ok(())
        }
        None if text.trim().is_empty() => Ok(()),
        None => Err(malformed("text content outside of the root element")),
    }
}

/// An element with ordered attributes, child elements and text
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    tag: String,
    attributes: Vec<(String, String)>,
    children: Vec<Element>,
    text: String,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Default::default()
        }
    }

    fn from_start(start: &BytesStart<'_>) -> CodecResult<Self> {
        let mut element = Self::new(String::from_utf8_lossy(start.name().as_ref()));
        for attribute in start.attributes() {
            let attribute = attribute.map_err(malformed)?;
            let key = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
            let value = attribute.unescape_value().map_err(malformed)?.into_owned();
            element.attributes.push((key, value));
        }
        Ok(element)
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) -> &mut Self {
        self.text = text.into();
        self
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Sets an attribute, replacing an existing value for the same key
    pub fn set_attr(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        let key = key.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(k, _)| *k == key) {
            Some(existing) => existing.1 = value,
            None => self.attributes.push((key, value)),
        }
        self
    }

    /// Appends a new child element and returns it
    pub fn create_element(&mut self, tag: impl Into<String>) -> &mut Element {
        self.children.push(Element::new(tag));
        let last = self.children.len() - 1;
        &mut self.children[last]
    }

    pub fn child_elements(&self) -> &[Element] {
        &self.children
    }

    pub fn select_element(&self, tag: &str) -> Option<&Element> {
        self.children.iter().find(|child| child.tag == tag)
    }

    pub fn select_element_mut(&mut self, tag: &str) -> Option<&mut Element> {
        self.children.iter_mut().find(|child| child.tag == tag)
    }

    pub fn select_elements<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |child| child.tag == tag)
    }

    /// First child whose attribute `key` equals `value`
    pub fn select_by_attr(&self, key: &str, value: &str) -> Option<&Element> {
        self.children
            .iter()
            .find(|child| child.attr(key) == Some(value))
    }

    /// Text of the first child with the given tag, empty when absent
    pub fn child_text(&self, tag: &str) -> String {
        self.select_element(tag)
            .map(|child| child.text.clone())
            .unwrap_or_default()
    }

    /// Walks a path of child tags, taking the first match at each level
    pub fn select_path(&self, path: &[&str]) -> Option<&Element> {
        path.iter()
            .try_fold(self, |element, tag| element.select_element(tag))
    }

    fn write(&self, writer: &mut Writer<Vec<u8>>) -> CodecResult<()> {
        let mut start = BytesStart::new(self.tag.as_str());
        for (key, value) in &self.attributes {
            start.push_attribute((key.as_str(), value.as_str()));
        }

        if self.children.is_empty() && self.text.is_empty() {
            return writer
                .write_event(Event::Empty(start))
                .map_err(serialization);
        }

        writer
            .write_event(Event::Start(start))
            .map_err(serialization)?;
        if !self.text.is_empty() {
            writer
                .write_event(Event::Text(BytesText::new(&self.text)))
                .map_err(serialization)?;
        }
        for child in &self.children {
            child.write(writer)?;
        }
        writer
            .write_event(Event::End(BytesEnd::new(self.tag.as_str())))
            .map_err(serialization)
    }
}
