//! Response parsing and navigation.

use std::str::FromStr;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::XmlError;

/// Name of the synthetic element every parsed response is wrapped in.
pub const ROOT: &str = "omp_envelope";

/// One element of a parsed response.
///
/// Text directly inside the element (not inside its children) is collected
/// into [`text`](Self::text), with surrounding whitespace trimmed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Element {
    name:       String,
    attributes: Vec<(String, String)>,
    children:   Vec<Element>,
    text:       String,
}

impl Element {
    /// Tag name.
    pub fn name(&self) -> &str { &self.name }

    /// Direct text content; empty when there is none.
    pub fn text(&self) -> &str { &self.text }

    /// Attribute value, if present.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Attribute value, or [`XmlError::MissingAttribute`].
    pub fn require_attr(&self, name: &str) -> Result<&str, XmlError> {
        self.attr(name).ok_or_else(|| XmlError::MissingAttribute {
            element:   self.name.clone(),
            attribute: name.to_string(),
        })
    }

    /// Parse a required attribute with [`FromStr`].
    pub fn parse_attr<T: FromStr>(&self, name: &str) -> Result<T, XmlError> {
        let raw = self.require_attr(name)?;
        raw.trim().parse().map_err(|_| XmlError::InvalidValue {
            element: self.name.clone(),
            what:    format!("`{name}` attribute"),
            value:   raw.to_string(),
        })
    }

    /// All attributes in document order.
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// All child elements in document order.
    pub fn children(&self) -> impl Iterator<Item = &Element> {
        self.children.iter()
    }

    /// Child elements called `name`.
    pub fn children_named<'a, 'n>(
        &'a self,
        name: &'n str,
    ) -> impl Iterator<Item = &'a Element> + use<'a, 'n> {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// First child element called `name`.
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Follow a `/`-separated path of child names, taking the first match
    /// at each step.
    pub fn find(&self, path: &str) -> Option<&Element> {
        path.split('/')
            .filter(|s| !s.is_empty())
            .try_fold(self, |el, step| el.child(step))
    }

    /// [`find`](Self::find), or [`XmlError::MissingElement`] naming the path.
    pub fn require(&self, path: &str) -> Result<&Element, XmlError> {
        self.find(path).ok_or_else(|| XmlError::MissingElement(path.to_string()))
    }

    /// Every element reachable by `path`, fanning out at each step.
    pub fn find_all(&self, path: &str) -> Vec<&Element> {
        let mut level = vec![self];
        for step in path.split('/').filter(|s| !s.is_empty()) {
            level = level
                .into_iter()
                .flat_map(|el| el.children.iter().filter(move |c| c.name == step))
                .collect();
        }
        level
    }

    /// Text of the element at `path`; the element must exist, its text may
    /// be empty.
    pub fn require_text(&self, path: &str) -> Result<&str, XmlError> {
        self.require(path).map(Element::text)
    }

    /// Text of the element at `path`, or `None` when the element is absent
    /// or empty.
    pub fn opt_text(&self, path: &str) -> Option<String> {
        self.find(path)
            .map(Element::text)
            .filter(|t| !t.is_empty())
            .map(str::to_owned)
    }
}

fn element_from(start: &BytesStart<'_>) -> Result<Element, XmlError> {
    let name = std::str::from_utf8(start.name().as_ref())?.to_string();
    let mut attributes = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        let key = std::str::from_utf8(attr.key.as_ref())?.to_string();
        let value = attr.unescape_value()?.into_owned();
        attributes.push((key, value));
    }
    Ok(Element { name, attributes, ..Default::default() })
}

fn attach(stack: &mut [Element], element: Element) -> Result<(), XmlError> {
    match stack.last_mut() {
        Some(parent) => {
            parent.children.push(element);
            Ok(())
        }
        None => Err(XmlError::Unbalanced(format!("<{}> outside the document", element.name))),
    }
}

/// Parse a raw response.
///
/// The bytes are wrapped in `<omp_envelope>…</omp_envelope>` first, so any
/// number of sibling top-level elements (including none) is accepted. The
/// returned element is the synthetic root.
pub fn parse(raw: &[u8]) -> Result<Element, XmlError> {
    let body = std::str::from_utf8(raw)?;
    let wrapped = format!("<{ROOT}>{body}</{ROOT}>");

    let mut reader = Reader::from_str(&wrapped);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<Element> = Vec::new();
    let mut root = None;
    loop {
        match reader.read_event()? {
            Event::Start(start) => {
                if root.is_some() {
                    return Err(XmlError::Unbalanced("content after the closing tag".into()));
                }
                stack.push(element_from(&start)?);
            }
            Event::Empty(start) => attach(&mut stack, element_from(&start)?)?,
            Event::End(_) => {
                let done = stack
                    .pop()
                    .ok_or_else(|| XmlError::Unbalanced("unexpected closing tag".into()))?;
                match stack.last_mut() {
                    Some(parent) => parent.children.push(done),
                    None => root = Some(done),
                }
            }
            Event::Text(text) => {
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&text.unescape()?);
                }
            }
            Event::CData(data) => {
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(std::str::from_utf8(&data.into_inner())?);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(XmlError::Unbalanced(format!("<{}> is never closed", open.name)));
    }
    root.ok_or_else(|| XmlError::Unbalanced("empty document".into()))
}
