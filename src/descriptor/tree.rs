//! Preserved XML tree.
//!
//! Descriptors carry arbitrary nested structure the resolver does not
//! understand (resource filters, permission grants, vendor extensions).
//! Instead of projecting descriptors onto a closed model, the codec parses
//! into this generic tree and the typed views in [`super::model`] navigate
//! and mutate it in place. Anything a mutation never touches is written
//! back exactly as it was read.

/// One piece of element content, in document order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum XmlContent {
    Element(XmlNode),
    /// Character data, stored in its raw (escaped) source form.
    Text(String),
    /// Comment body, stored verbatim without the `<!--`/`-->` delimiters.
    Comment(String),
}

/// An XML element with attributes and ordered children.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct XmlNode {
    pub name: String,
    /// Attributes in document order, values unescaped.
    pub attrs: Vec<(String, String)>,
    pub children: Vec<XmlContent>,
    /// Whether the source element was self-closing (`<x/>` vs `<x></x>`).
    /// Only consulted when `children` is empty.
    pub self_closing: bool,
}

impl XmlNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attrs: Vec::new(),
            children: Vec::new(),
            self_closing: true,
        }
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Set an attribute, replacing an existing one in place (its position
    /// in the attribute list is kept) or appending a new one.
    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        if let Some(slot) = self.attrs.iter_mut().find(|(n, _)| *n == name) {
            slot.1 = value;
        } else {
            self.attrs.push((name, value));
        }
    }

    pub fn remove_attr(&mut self, name: &str) -> Option<String> {
        let idx = self.attrs.iter().position(|(n, _)| n == name)?;
        Some(self.attrs.remove(idx).1)
    }

    pub fn child_elements(&self) -> impl Iterator<Item = &XmlNode> {
        self.children.iter().filter_map(|c| match c {
            XmlContent::Element(e) => Some(e),
            _ => None,
        })
    }

    pub fn child_elements_mut(&mut self) -> impl Iterator<Item = &mut XmlNode> {
        self.children.iter_mut().filter_map(|c| match c {
            XmlContent::Element(e) => Some(e),
            _ => None,
        })
    }

    pub fn find_child(&self, name: &str) -> Option<&XmlNode> {
        self.child_elements().find(|e| e.name == name)
    }

    pub fn find_child_mut(&mut self, name: &str) -> Option<&mut XmlNode> {
        self.child_elements_mut().find(|e| e.name == name)
    }

    /// Append a child element, keeping any trailing whitespace text node
    /// (pretty-printed indentation before the closing tag) at the end.
    pub fn append_element(&mut self, node: XmlNode) {
        let insert_at = match self.children.last() {
            Some(XmlContent::Text(t)) if t.trim().is_empty() => self.children.len() - 1,
            _ => self.children.len(),
        };
        self.children.insert(insert_at, XmlContent::Element(node));
        self.self_closing = false;
    }

    /// Remove every child element matching the predicate, along with the
    /// whitespace text node immediately preceding it (its indentation).
    pub fn retain_elements(&mut self, mut keep: impl FnMut(&XmlNode) -> bool) -> usize {
        let mut removed = 0;
        let mut i = 0;
        while i < self.children.len() {
            let drop = match &self.children[i] {
                XmlContent::Element(e) => !keep(e),
                _ => false,
            };
            if drop {
                self.children.remove(i);
                removed += 1;
                if i > 0
                    && matches!(&self.children[i - 1], XmlContent::Text(t) if t.trim().is_empty())
                {
                    self.children.remove(i - 1);
                    i -= 1;
                }
            } else {
                i += 1;
            }
        }
        removed
    }
}
