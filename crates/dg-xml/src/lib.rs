//! Load sensor metadata XML into an owned element tree using quick-xml.
//!
//! The tree keeps only what the metadata readers need: tag names, the text
//! directly held by each element and the ordered element children. Lookups
//! come in two flavours: [`Element::get_child`] for tags that must exist
//! (fails with [`XmlError::NotFound`]) and [`Element::child`] for tags whose
//! absence is an expected outcome.

use std::fmt::Display;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum XmlError {
    #[error("xml: {0}")]
    Xml(String),
    #[error("element <{tag}> not found under <{parent}>")]
    NotFound { parent: String, tag: String },
    #[error("invalid value {text:?} in <{tag}>: {reason}")]
    Value {
        tag: String,
        text: String,
        reason: String,
    },
    #[error("read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl XmlError {
    /// True when the error reports a missing element rather than bad content.
    pub fn is_not_found(&self) -> bool {
        matches!(self, XmlError::NotFound { .. })
    }
}

/// A parsed XML element: tag, direct text content and element children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    name: String,
    text: String,
    children: Vec<Element>,
}

impl Element {
    fn open(event: &BytesStart<'_>) -> Result<Self, XmlError> {
        let name = std::str::from_utf8(event.name().as_ref())
            .map_err(|err| XmlError::Xml(format!("invalid UTF-8 in tag name: {err}")))?
            .to_string();
        Ok(Element {
            name,
            text: String::new(),
            children: Vec::new(),
        })
    }

    fn push_text(&mut self, text: &str) {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return;
        }
        if !self.text.is_empty() {
            self.text.push(' ');
        }
        self.text.push_str(trimmed);
    }

    /// Tag name as written in the document.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Trimmed text held directly by this element.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Element children in document order.
    pub fn children(&self) -> std::slice::Iter<'_, Element> {
        self.children.iter()
    }

    /// First direct child named `tag`, if any.
    pub fn child(&self, tag: &str) -> Option<&Element> {
        self.children.iter().find(|child| child.name == tag)
    }

    /// First direct child named `tag`, failing with [`XmlError::NotFound`].
    pub fn get_child(&self, tag: &str) -> Result<&Element, XmlError> {
        self.child(tag).ok_or_else(|| XmlError::NotFound {
            parent: self.name.clone(),
            tag: tag.to_string(),
        })
    }

    /// Convert the element text into `T`.
    pub fn parse_text<T>(&self) -> Result<T, XmlError>
    where
        T: FromStr,
        T::Err: Display,
    {
        self.text.parse().map_err(|err: T::Err| XmlError::Value {
            tag: self.name.clone(),
            text: self.text.clone(),
            reason: err.to_string(),
        })
    }

    /// Convert every whitespace separated token of the element text into `T`.
    pub fn parse_list<T>(&self) -> Result<Vec<T>, XmlError>
    where
        T: FromStr,
        T::Err: Display,
    {
        self.text
            .split_whitespace()
            .map(|token| {
                token.parse().map_err(|err: T::Err| XmlError::Value {
                    tag: self.name.clone(),
                    text: token.to_string(),
                    reason: err.to_string(),
                })
            })
            .collect()
    }

    /// Shorthand for `get_child(tag)?.parse_text()`.
    pub fn child_value<T>(&self, tag: &str) -> Result<T, XmlError>
    where
        T: FromStr,
        T::Err: Display,
    {
        self.get_child(tag)?.parse_text()
    }
}

/// Parsed XML document owning its root element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    root: Element,
}

impl Document {
    /// The document element.
    pub fn root(&self) -> &Element {
        &self.root
    }

    pub fn into_root(self) -> Element {
        self.root
    }
}

/// Parse an XML string into a [`Document`].
pub fn parse_document(xml: &str) -> Result<Document, XmlError> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);
    let mut buf = Vec::new();
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                stack.push(Element::open(&e)?);
            }
            Ok(Event::Empty(e)) => {
                let element = Element::open(&e)?;
                attach(&mut stack, &mut root, element)?;
            }
            Ok(Event::End(_)) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| XmlError::Xml("unbalanced closing tag".into()))?;
                attach(&mut stack, &mut root, element)?;
            }
            Ok(Event::Text(e)) => {
                let text = e.unescape().map_err(|err| XmlError::Xml(err.to_string()))?;
                if let Some(top) = stack.last_mut() {
                    top.push_text(&text);
                }
            }
            Ok(Event::CData(e)) => {
                let raw = e.into_inner();
                if let Some(top) = stack.last_mut() {
                    top.push_text(&String::from_utf8_lossy(&raw));
                }
            }
            Ok(Event::Eof) => break,
            Err(err) => {
                return Err(XmlError::Xml(format!(
                    "at byte {}: {err}",
                    reader.buffer_position()
                )))
            }
            _ => {}
        }
        buf.clear();
    }

    if let Some(open) = stack.last() {
        return Err(XmlError::Xml(format!("unclosed element <{}>", open.name)));
    }
    let root = root.ok_or_else(|| XmlError::Xml("document has no root element".into()))?;
    debug!(root = root.name(), children = root.children.len(), "parsed xml document");
    Ok(Document { root })
}

/// Read and parse an XML file.
pub fn load_document(path: impl AsRef<Path>) -> Result<Document, XmlError> {
    let path = path.as_ref();
    let xml = fs::read_to_string(path).map_err(|source| XmlError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_document(&xml)
}

fn attach(
    stack: &mut [Element],
    root: &mut Option<Element>,
    element: Element,
) -> Result<(), XmlError> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(element);
        Ok(())
    } else if root.is_some() {
        Err(XmlError::Xml(format!(
            "second root element <{}>",
            element.name
        )))
    } else {
        *root = Some(element);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
        <isd>
            <IMD>
                <NUMROWS>1024</NUMROWS>
                <NUMCOLUMNS>2048</NUMCOLUMNS>
                <LIST>
                    <ITEM>1 2.5 -3e2</ITEM>
                    <ITEM><![CDATA[4 5]]></ITEM>
                </LIST>
                <EMPTY/>
            </IMD>
            <GEO>  text with spaces  </GEO>
        </isd>
    "#;

    #[test]
    fn builds_tree_in_document_order() {
        let doc = parse_document(FIXTURE).expect("parse fixture");
        let root = doc.root();
        assert_eq!(root.name(), "isd");
        let names: Vec<&str> = root.children().map(Element::name).collect();
        assert_eq!(names, ["IMD", "GEO"]);
        assert_eq!(root.get_child("GEO").unwrap().text(), "text with spaces");
        let imd = root.get_child("IMD").unwrap();
        assert_eq!(imd.children().count(), 4);
        assert!(imd.child("EMPTY").is_some());
        assert_eq!(imd.get_child("EMPTY").unwrap().text(), "");
    }

    #[test]
    fn typed_extraction() {
        let doc = parse_document(FIXTURE).expect("parse fixture");
        let imd = doc.root().get_child("IMD").unwrap();
        let rows: u32 = imd.child_value("NUMROWS").expect("rows");
        assert_eq!(rows, 1024);
        let items: Vec<&Element> = imd.get_child("LIST").unwrap().children().collect();
        let first: Vec<f64> = items[0].parse_list().expect("list");
        assert_eq!(first, vec![1.0, 2.5, -300.0]);
        let second: Vec<f64> = items[1].parse_list().expect("cdata list");
        assert_eq!(second, vec![4.0, 5.0]);
    }

    #[test]
    fn missing_child_is_not_found() {
        let doc = parse_document(FIXTURE).expect("parse fixture");
        let err = doc.root().get_child("ATT").unwrap_err();
        assert!(err.is_not_found());
        assert!(matches!(
            err,
            XmlError::NotFound { ref parent, ref tag } if parent == "isd" && tag == "ATT"
        ));
        assert!(doc.root().child("ATT").is_none());
    }

    #[test]
    fn malformed_value_is_reported() {
        let doc = parse_document(FIXTURE).expect("parse fixture");
        let err = doc.root().child_value::<f64>("GEO").unwrap_err();
        assert!(matches!(err, XmlError::Value { ref tag, .. } if tag == "GEO"));
        assert!(!err.is_not_found());
    }

    #[test]
    fn rejects_broken_documents() {
        assert!(matches!(
            parse_document("<a><b></a>"),
            Err(XmlError::Xml(_))
        ));
        assert!(matches!(parse_document("<a>"), Err(XmlError::Xml(_))));
        assert!(matches!(parse_document("<a/><b/>"), Err(XmlError::Xml(_))));
        assert!(matches!(parse_document("   "), Err(XmlError::Xml(_))));
    }

    #[test]
    fn load_missing_file_reports_path() {
        let err = load_document("/nonexistent/dir/meta.xml").unwrap_err();
        assert!(matches!(err, XmlError::Read { .. }));
        assert!(err.to_string().contains("meta.xml"));
    }
}
