//! XML codec for module descriptors.
//!
//! Streams quick-xml events into the preserved tree ([`XmlNode`]) and back.
//! The writer emits exactly what the tree holds — attribute order, child
//! order, whitespace text and comments included — so a parse/serialize
//! cycle over untouched content is byte-identical for canonical-form input
//! (UTF-8, single-space attribute separation, `/>` empties).

use std::io::Cursor;

use quick_xml::Reader;
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};

use super::error::DescriptorError;
use super::tree::{XmlContent, XmlNode};

/// A fully preserved descriptor document: the root element plus everything
/// around it (XML declaration, top-level comments and whitespace).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawDocument {
    /// Declaration content without the `<?`/`?>` delimiters,
    /// e.g. `xml version="1.0" encoding="UTF-8"`.
    pub decl: Option<String>,
    pub leading: Vec<XmlContent>,
    pub root: XmlNode,
    pub trailing: Vec<XmlContent>,
}

pub fn parse_document(input: &[u8]) -> Result<RawDocument, DescriptorError> {
    let mut reader = Reader::from_reader(input);
    let mut buf = Vec::new();

    let mut decl: Option<String> = None;
    let mut leading: Vec<XmlContent> = Vec::new();
    let mut trailing: Vec<XmlContent> = Vec::new();
    let mut root: Option<XmlNode> = None;
    let mut stack: Vec<XmlNode> = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Decl(ref e)) => {
                let content = std::str::from_utf8(e)
                    .map_err(|e| DescriptorError::xml(format!("invalid UTF-8 in declaration: {e}")))?;
                decl = Some(content.to_string());
            }
            Ok(Event::Start(ref e)) => {
                let node = node_from_start(e, false)?;
                stack.push(node);
            }
            Ok(Event::Empty(ref e)) => {
                let node = node_from_start(e, true)?;
                place_node(node, &mut stack, &mut root)?;
            }
            Ok(Event::End(_)) => {
                let node = stack
                    .pop()
                    .ok_or_else(|| DescriptorError::xml("unbalanced closing tag"))?;
                place_node(node, &mut stack, &mut root)?;
            }
            Ok(Event::Text(ref t)) => {
                let raw = String::from_utf8(t.clone().into_inner().into_owned())
                    .map_err(|e| DescriptorError::xml(format!("invalid UTF-8 in text: {e}")))?;
                place_content(
                    XmlContent::Text(raw),
                    &mut stack,
                    root.is_some(),
                    &mut leading,
                    &mut trailing,
                );
            }
            Ok(Event::Comment(ref t)) => {
                let raw = String::from_utf8(t.clone().into_inner().into_owned())
                    .map_err(|e| DescriptorError::xml(format!("invalid UTF-8 in comment: {e}")))?;
                place_content(
                    XmlContent::Comment(raw),
                    &mut stack,
                    root.is_some(),
                    &mut leading,
                    &mut trailing,
                );
            }
            Ok(Event::Eof) => break,
            Ok(other) => {
                return Err(DescriptorError::xml(format!(
                    "unsupported XML construct: {other:?}"
                )));
            }
            Err(e) => {
                return Err(DescriptorError::xml(format!(
                    "parse error at position {}: {e}",
                    reader.error_position()
                )));
            }
        }
        buf.clear();
    }

    if !stack.is_empty() {
        return Err(DescriptorError::xml("unclosed element at end of input"));
    }
    let root = root.ok_or_else(|| DescriptorError::xml("no root element"))?;

    Ok(RawDocument {
        decl,
        leading,
        root,
        trailing,
    })
}

pub fn write_document(doc: &RawDocument) -> Result<Vec<u8>, DescriptorError> {
    let mut writer = Writer::new(Cursor::new(Vec::new()));

    if let Some(decl) = &doc.decl {
        let start = BytesStart::from_content(decl.as_str(), 3);
        writer
            .write_event(Event::Decl(BytesDecl::from_start(start)))
            .map_err(write_err)?;
    }
    for content in &doc.leading {
        write_content(&mut writer, content)?;
    }
    write_element(&mut writer, &doc.root)?;
    for content in &doc.trailing {
        write_content(&mut writer, content)?;
    }

    Ok(writer.into_inner().into_inner())
}

fn node_from_start(e: &BytesStart<'_>, self_closing: bool) -> Result<XmlNode, DescriptorError> {
    let name = std::str::from_utf8(e.name().as_ref())
        .map_err(|e| DescriptorError::xml(format!("invalid tag name: {e}")))?
        .to_string();

    let mut node = XmlNode::new(name);
    node.self_closing = self_closing;

    for attr in e.attributes() {
        let attr = attr.map_err(|e| DescriptorError::xml(format!("bad attribute: {e}")))?;
        let key = std::str::from_utf8(attr.key.as_ref())
            .map_err(|e| DescriptorError::xml(format!("invalid attribute name: {e}")))?
            .to_string();
        let value = attr
            .unescape_value()
            .map_err(|e| DescriptorError::xml(format!("invalid attribute value: {e}")))?
            .into_owned();
        node.attrs.push((key, value));
    }

    Ok(node)
}

/// Attach a completed element to its parent, or record it as the root.
fn place_node(
    node: XmlNode,
    stack: &mut [XmlNode],
    root: &mut Option<XmlNode>,
) -> Result<(), DescriptorError> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(XmlContent::Element(node));
        Ok(())
    } else if root.is_none() {
        *root = Some(node);
        Ok(())
    } else {
        Err(DescriptorError::xml("multiple root elements"))
    }
}

/// Attach text/comment content at the current nesting level.
fn place_content(
    content: XmlContent,
    stack: &mut [XmlNode],
    root_seen: bool,
    leading: &mut Vec<XmlContent>,
    trailing: &mut Vec<XmlContent>,
) {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(content);
    } else if root_seen {
        trailing.push(content);
    } else {
        leading.push(content);
    }
}

fn write_element<W: std::io::Write>(
    writer: &mut Writer<W>,
    node: &XmlNode,
) -> Result<(), DescriptorError> {
    let mut start = BytesStart::new(node.name.as_str());
    for (name, value) in &node.attrs {
        start.push_attribute((name.as_str(), value.as_str()));
    }

    if node.children.is_empty() && node.self_closing {
        writer.write_event(Event::Empty(start)).map_err(write_err)?;
        return Ok(());
    }

    writer.write_event(Event::Start(start)).map_err(write_err)?;
    for child in &node.children {
        write_content(writer, child)?;
    }
    writer
        .write_event(Event::End(BytesEnd::new(node.name.as_str())))
        .map_err(write_err)
}

fn write_content<W: std::io::Write>(
    writer: &mut Writer<W>,
    content: &XmlContent,
) -> Result<(), DescriptorError> {
    match content {
        XmlContent::Element(e) => write_element(writer, e),
        XmlContent::Text(raw) => writer
            .write_event(Event::Text(BytesText::from_escaped(raw.as_str())))
            .map_err(write_err),
        XmlContent::Comment(raw) => writer
            .write_event(Event::Comment(BytesText::from_escaped(raw.as_str())))
            .map_err(write_err),
    }
}

fn write_err(e: impl std::fmt::Display) -> DescriptorError {
    DescriptorError::xml(format!("write error: {e}"))
}
