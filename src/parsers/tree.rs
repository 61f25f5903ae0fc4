//! Structured tree shared by the tag-tree (HTML) and XML parsers.
//!
//! Both parsers fold a quick-xml event stream into an [`Element`] tree; they
//! differ only in how forgiving the fold is. The strict mode propagates every
//! well-formedness error, the lenient mode auto-closes HTML void elements and
//! recovers from mis-nested or stray end tags.

use crate::error::Cause;
use quick_xml::Reader;
use quick_xml::encoding::Decoder;
use quick_xml::events::{BytesStart, Event};
use std::fmt;

/// Elements HTML defines as self-closing regardless of syntax.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
}

/// One node of a parsed markup document, with ordered attributes and children.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<Node>,
}

impl Element {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Element {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Synthetic container holding a document's top-level nodes.
    pub(crate) fn document() -> Self {
        Element::new("")
    }

    pub(crate) fn set_attr(&mut self, key: String, value: String) {
        if let Some(existing) = self.attributes.iter_mut().find(|(k, _)| *k == key) {
            existing.1 = value;
        } else {
            self.attributes.push((key, value));
        }
    }

    pub(crate) fn push_child(&mut self, child: Element) {
        self.children.push(Node::Element(child));
    }

    pub(crate) fn push_text(&mut self, text: String) {
        if let Some(Node::Text(last)) = self.children.last_mut() {
            last.push_str(&text);
        } else {
            self.children.push(Node::Text(text));
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn nodes(&self) -> &[Node] {
        &self.children
    }

    /// Direct child elements, in document order.
    pub fn children(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(el) => Some(el),
            Node::Text(_) => None,
        })
    }

    /// First direct child with the given tag name.
    pub fn child(&self, tag: &str) -> Option<&Element> {
        self.children().find(|el| el.name == tag)
    }

    /// Direct children with the given tag name, in document order.
    pub fn children_named<'a>(&'a self, tag: &str) -> Vec<&'a Element> {
        self.children().filter(|el| el.name == tag).collect()
    }

    /// First descendant with the given tag name, depth-first document order.
    pub fn find(&self, tag: &str) -> Option<&Element> {
        for el in self.children() {
            if el.name == tag {
                return Some(el);
            }
            if let Some(found) = el.find(tag) {
                return Some(found);
            }
        }
        None
    }

    /// Every descendant with the given tag name, depth-first document order.
    pub fn find_all<'a>(&'a self, tag: &str) -> Vec<&'a Element> {
        let mut found = Vec::new();
        self.collect_named(tag, &mut found);
        found
    }

    fn collect_named<'a>(&'a self, tag: &str, found: &mut Vec<&'a Element>) {
        for el in self.children() {
            if el.name == tag {
                found.push(el);
            }
            el.collect_named(tag, found);
        }
    }

    /// First descendant whose `id` attribute equals the given value.
    pub fn find_by_id(&self, id: &str) -> Option<&Element> {
        for el in self.children() {
            if el.attr("id") == Some(id) {
                return Some(el);
            }
            if let Some(found) = el.find_by_id(id) {
                return Some(found);
            }
        }
        None
    }

    /// Concatenated text of this element and its descendants, document order.
    pub fn text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        for node in &self.children {
            match node {
                Node::Text(text) => out.push_str(text),
                Node::Element(el) => el.collect_text(out),
            }
        }
    }
}

/// Structural problem the underlying reader cannot express on its own.
#[derive(Debug)]
pub(crate) struct MarkupError(pub String);

impl fmt::Display for MarkupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for MarkupError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BuildMode {
    Strict,
    Lenient,
}

/// Fold raw markup into a synthetic document element holding the top-level
/// nodes. Every failure is returned as a boxed cause for the caller to wrap
/// into its format-specific error.
pub(crate) fn build_tree(content: &str, mode: BuildMode) -> std::result::Result<Element, Cause> {
    let lenient = mode == BuildMode::Lenient;
    let mut reader = Reader::from_str(content);
    if lenient {
        let config = reader.config_mut();
        config.check_end_names = false;
        config.allow_unmatched_ends = true;
    }
    let decoder = reader.decoder();

    let mut stack: Vec<Element> = vec![Element::document()];

    loop {
        match reader.read_event() {
            Err(e) => return Err(Box::new(e)),
            Ok(Event::Start(start)) => {
                let element = element_from_start(&start, decoder, lenient)?;
                if lenient && VOID_ELEMENTS.contains(&element.name()) {
                    append(&mut stack, element);
                } else {
                    stack.push(element);
                }
            }
            Ok(Event::Empty(start)) => {
                let element = element_from_start(&start, decoder, lenient)?;
                append(&mut stack, element);
            }
            Ok(Event::End(end)) => {
                let mut name = String::from_utf8_lossy(end.name().as_ref()).into_owned();
                if lenient {
                    name.make_ascii_lowercase();
                }
                // Close the innermost matching element, folding anything
                // left open above it. Stray end tags are dropped.
                if let Some(pos) = stack[1..].iter().rposition(|el| el.name() == name) {
                    while stack.len() > pos + 1 {
                        match stack.pop() {
                            Some(el) => append(&mut stack, el),
                            None => break,
                        }
                    }
                }
            }
            Ok(Event::Text(text)) => {
                let value = match text.unescape() {
                    Ok(cow) => cow.into_owned(),
                    Err(_) if lenient => String::from_utf8_lossy(text.as_ref()).into_owned(),
                    Err(e) => return Err(Box::new(e)),
                };
                if !value.is_empty()
                    && let Some(top) = stack.last_mut()
                {
                    top.push_text(value);
                }
            }
            Ok(Event::CData(cdata)) => {
                let value = String::from_utf8_lossy(&cdata.into_inner()).into_owned();
                if let Some(top) = stack.last_mut() {
                    top.push_text(value);
                }
            }
            Ok(Event::Decl(_) | Event::DocType(_) | Event::PI(_) | Event::Comment(_)) => {}
            Ok(Event::Eof) => break,
        }
    }

    if stack.len() > 1 {
        if !lenient {
            let open = stack
                .last()
                .map(|el| el.name().to_string())
                .unwrap_or_default();
            return Err(Box::new(MarkupError(format!(
                "unexpected end of document: <{open}> never closed"
            ))));
        }
        while stack.len() > 1 {
            match stack.pop() {
                Some(el) => append(&mut stack, el),
                None => break,
            }
        }
    }

    stack
        .pop()
        .ok_or_else(|| Box::new(MarkupError("empty document".to_string())) as Cause)
}

fn append(stack: &mut Vec<Element>, element: Element) {
    if let Some(parent) = stack.last_mut() {
        parent.push_child(element);
    }
}

fn element_from_start(
    start: &BytesStart<'_>,
    decoder: Decoder,
    lenient: bool,
) -> std::result::Result<Element, Cause> {
    let mut name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
    if lenient {
        name.make_ascii_lowercase();
    }
    let mut element = Element::new(name);

    for attr in start.attributes() {
        let attr = match attr {
            Ok(attr) => attr,
            Err(_) if lenient => continue,
            Err(e) => return Err(Box::new(e)),
        };

        let mut key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        if lenient {
            key.make_ascii_lowercase();
        }
        let value = match attr.decode_and_unescape_value(decoder) {
            Ok(cow) => cow.into_owned(),
            Err(_) if lenient => String::from_utf8_lossy(attr.value.as_ref()).into_owned(),
            Err(e) => return Err(Box::new(e)),
        };
        element.set_attr(key, value);
    }

    Ok(element)
}
