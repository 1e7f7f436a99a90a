/*
 * xml.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Generic element tree read from template markup.
//!
//! This is the shared first stage of [`crate::parse`] and [`crate::format`]:
//! a single pass over the quick-xml event stream that keeps elements,
//! attributes, text and comments in document order. The reader is configured
//! to be forgiving: unquoted attribute values are accepted, duplicate
//! attributes are not checked, and text with unknown entities is kept verbatim
//! instead of failing.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::error::{MarkupError, Result};

/// Deepest element nesting accepted, counting the root as level 1. Every
/// later stage walks the tree recursively, so the bound is enforced here.
pub const MAX_NESTING_DEPTH: usize = 100;

/// A parsed markup document: the root element plus any top-level comments.
#[derive(Debug, Clone, PartialEq)]
pub struct XmlDocument {
    /// Top-level content in order. Exactly one entry is an element.
    pub content: Vec<XmlContent>,
}

impl XmlDocument {
    pub fn root(&self) -> Option<&XmlElement> {
        self.content.iter().find_map(|c| match c {
            XmlContent::Element(el) => Some(el),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct XmlElement {
    /// Local name (namespace prefix removed).
    pub name: String,
    pub attributes: Vec<XmlAttribute>,
    pub children: Vec<XmlContent>,
    /// Byte offset of the opening `<`.
    pub position: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlAttribute {
    /// Local name (namespace prefix removed).
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum XmlContent {
    Element(XmlElement),
    Text(String),
    CData(String),
    Comment(String),
}

impl XmlElement {
    /// Value of the first attribute among `names` that is present.
    pub fn attr(&self, names: &[&str]) -> Option<&str> {
        names.iter().find_map(|name| {
            self.attributes
                .iter()
                .find(|a| a.name == *name)
                .map(|a| a.value.as_str())
        })
    }

    /// Like [`XmlElement::attr`], but empty or whitespace-only values count as absent.
    pub fn non_empty_attr(&self, names: &[&str]) -> Option<&str> {
        names.iter().find_map(|name| {
            self.attributes
                .iter()
                .find(|a| a.name == *name && !a.value.trim().is_empty())
                .map(|a| a.value.as_str())
        })
    }

    pub fn elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(|c| match c {
            XmlContent::Element(el) => Some(el),
            _ => None,
        })
    }

    /// Concatenated text and CDATA content of the direct children.
    pub fn text(&self) -> String {
        let mut out = String::new();
        for child in &self.children {
            match child {
                XmlContent::Text(t) | XmlContent::CData(t) => out.push_str(t),
                _ => {}
            }
        }
        out
    }
}

/// Read a document from bytes. Input must be UTF-8.
pub fn read_document_bytes(bytes: &[u8]) -> Result<XmlDocument> {
    let source = std::str::from_utf8(bytes).map_err(|err| MarkupError::Syntax {
        message: format!("input is not valid UTF-8: {}", err),
        position: err.valid_up_to() as u64,
    })?;
    read_document(source)
}

/// Read a document from a string.
pub fn read_document(source: &str) -> Result<XmlDocument> {
    TreeBuilder::new(source).build()
}

struct TreeBuilder<'a> {
    reader: Reader<&'a [u8]>,
    stack: Vec<XmlElement>,
}

impl<'a> TreeBuilder<'a> {
    fn new(source: &'a str) -> Self {
        let mut reader = Reader::from_str(source);
        reader.config_mut().trim_text_start = false;
        reader.config_mut().trim_text_end = false;
        Self {
            reader,
            stack: Vec::new(),
        }
    }

    fn build(mut self) -> Result<XmlDocument> {
        let mut content = Vec::new();
        let mut have_root = false;

        loop {
            let event_start = self.reader.buffer_position();

            match self.reader.read_event() {
                Ok(Event::Start(e)) => {
                    self.check_depth(event_start)?;
                    let element = self.open_element(&e, event_start)?;
                    self.stack.push(element);
                }
                Ok(Event::End(e)) => {
                    let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                    let element = self.stack.pop().ok_or_else(|| MarkupError::Syntax {
                        message: format!("unexpected closing tag </{}>", name),
                        position: event_start,
                    })?;
                    if element.name != name {
                        return Err(MarkupError::Syntax {
                            message: format!(
                                "mismatched end tag: expected </{}>, found </{}>",
                                element.name, name
                            ),
                            position: event_start,
                        });
                    }
                    self.attach(XmlContent::Element(element), &mut content, &mut have_root)?;
                }
                Ok(Event::Empty(e)) => {
                    self.check_depth(event_start)?;
                    let element = self.open_element(&e, event_start)?;
                    self.attach(XmlContent::Element(element), &mut content, &mut have_root)?;
                }
                Ok(Event::Text(e)) => {
                    // Unknown entities are not an error here: keep the raw text.
                    let text = match e.unescape() {
                        Ok(text) => text.into_owned(),
                        Err(_) => String::from_utf8_lossy(&e).into_owned(),
                    };
                    if let Some(parent) = self.stack.last_mut() {
                        parent.children.push(XmlContent::Text(text));
                    }
                }
                Ok(Event::CData(e)) => {
                    if let Some(parent) = self.stack.last_mut() {
                        let text = String::from_utf8_lossy(e.as_ref()).into_owned();
                        parent.children.push(XmlContent::CData(text));
                    }
                }
                Ok(Event::Comment(e)) => {
                    let text = String::from_utf8_lossy(&e).into_owned();
                    match self.stack.last_mut() {
                        Some(parent) => parent.children.push(XmlContent::Comment(text)),
                        None => content.push(XmlContent::Comment(text)),
                    }
                }
                Ok(Event::Decl(_) | Event::PI(_) | Event::DocType(_)) => {}
                Ok(Event::Eof) => break,
                Err(err) => {
                    return Err(MarkupError::Syntax {
                        message: err.to_string(),
                        position: self.reader.error_position(),
                    });
                }
            }
        }

        if let Some(open) = self.stack.last() {
            return Err(MarkupError::UnexpectedEof {
                expected: format!("closing tag </{}>", open.name),
            });
        }
        if !have_root {
            return Err(MarkupError::EmptyDocument);
        }

        Ok(XmlDocument { content })
    }

    /// Fails if an element opened now would sit below the depth limit.
    fn check_depth(&self, position: u64) -> Result<()> {
        if self.stack.len() >= MAX_NESTING_DEPTH {
            return Err(MarkupError::TooDeep {
                max_depth: MAX_NESTING_DEPTH,
                position,
            });
        }
        Ok(())
    }

    fn attach(
        &mut self,
        node: XmlContent,
        content: &mut Vec<XmlContent>,
        have_root: &mut bool,
    ) -> Result<()> {
        match self.stack.last_mut() {
            Some(parent) => parent.children.push(node),
            None => {
                if *have_root {
                    return Err(MarkupError::MultipleRoots);
                }
                *have_root = true;
                content.push(node);
            }
        }
        Ok(())
    }

    fn open_element(&self, e: &BytesStart<'_>, position: u64) -> Result<XmlElement> {
        let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();

        let mut attributes = Vec::new();
        let mut attrs = e.html_attributes();
        attrs.with_checks(false);
        for attr in attrs {
            let attr = attr.map_err(|err| MarkupError::Syntax {
                message: format!("invalid attribute in <{}>: {}", name, err),
                position,
            })?;
            let value = match attr.unescape_value() {
                Ok(v) => v.into_owned(),
                Err(_) => String::from_utf8_lossy(&attr.value).into_owned(),
            };
            attributes.push(XmlAttribute {
                name: String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned(),
                value,
            });
        }

        Ok(XmlElement {
            name,
            attributes,
            children: Vec::new(),
            position,
        })
    }
}
