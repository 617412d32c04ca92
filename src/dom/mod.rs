//! Neutral markup node model.
//!
//! The engine only ever sees these types. A host adapter converts its own
//! tree into them (see [`crate::host`]) and decides how to print the result.
//!
//! ```text
//! Node
//! ├── Element   tag + ordered attributes + children
//! ├── Text      character data, kept exactly as written
//! └── Verbatim  comments, doctypes and other markup passed through untouched
//! ```
//!
//! Attribute values are either static text or a bound [`Expression`]. Bound
//! values are how rewritten `src`/`srcset` reach the bundler: an
//! [`Expression::Import`] is the imported module itself, an
//! [`Expression::ImportDefault`] is its `default` export.

mod imports;

pub use imports::{ImportHandle, ImportRegistry, ImportSink};

/// Byte span in the host's source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLocation {
    pub start: usize,
    pub end: usize,
}

/// Host-level expression carried by a bound attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expression {
    /// Opaque expression text written by the template author.
    Raw(String),
    /// The imported module value.
    Import(ImportHandle),
    /// The `default` member of the imported module.
    ImportDefault(ImportHandle),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrValue {
    Text(String),
    Bound(Expression),
}

impl AttrValue {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Bound(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: AttrValue,
    pub loc: Option<SourceLocation>,
}

impl Attribute {
    pub fn new(name: impl Into<String>, value: AttrValue) -> Self {
        Self {
            name: name.into(),
            value,
            loc: None,
        }
    }

    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(name, AttrValue::text(value))
    }

    pub fn bound(name: impl Into<String>, expression: Expression) -> Self {
        Self::new(name, AttrValue::Bound(expression))
    }

    pub fn at(mut self, loc: Option<SourceLocation>) -> Self {
        self.loc = loc;
        self
    }

    /// True for a static attribute (not a binding).
    pub fn is_static(&self) -> bool {
        matches!(self.value, AttrValue::Text(_))
    }
}

/// How an element's end is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Closing {
    /// `<tag>...</tag>`
    Tag,
    /// `<tag />`
    SelfClosing,
    /// `<tag>` with no end tag (HTML void elements).
    Void,
}

/// Original markup of a host-parsed element.
///
/// Printing an element that still carries this reproduces its tags byte for
/// byte. Every attribute mutation drops it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTag {
    pub start: String,
    pub end: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    tag: String,
    attrs: Vec<Attribute>,
    pub children: Vec<Node>,
    pub closing: Closing,
    pub loc: Option<SourceLocation>,
    raw: Option<RawTag>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attrs: Vec::new(),
            children: Vec::new(),
            closing: Closing::Tag,
            loc: None,
            raw: None,
        }
    }

    pub fn with_attr(mut self, attr: Attribute) -> Self {
        self.push_attr(attr);
        self
    }

    pub fn with_closing(mut self, closing: Closing) -> Self {
        self.closing = closing;
        self
    }

    pub fn with_child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// ASCII case-insensitive tag comparison.
    pub fn is_tag(&self, tag: &str) -> bool {
        self.tag.eq_ignore_ascii_case(tag)
    }

    pub fn attrs(&self) -> &[Attribute] {
        &self.attrs
    }

    /// First attribute with this exact name.
    pub fn attr(&self, name: &str) -> Option<&Attribute> {
        self.attrs.iter().find(|attr| attr.name == name)
    }

    pub fn attr_index(&self, name: &str) -> Option<usize> {
        self.attrs.iter().position(|attr| attr.name == name)
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attr(name).is_some()
    }

    /// Static value of the first attribute with this name.
    pub fn get_text(&self, name: &str) -> Option<&str> {
        self.attr(name).and_then(|attr| attr.value.as_text())
    }

    pub fn push_attr(&mut self, attr: Attribute) {
        self.raw = None;
        self.attrs.push(attr);
    }

    /// Replace the value at `index`, keeping the attribute's position.
    pub fn set_value_at(&mut self, index: usize, value: AttrValue) {
        if let Some(attr) = self.attrs.get_mut(index) {
            self.raw = None;
            attr.value = value;
        }
    }

    /// Keep only the attributes that satisfy `pred`.
    pub fn retain_attrs(&mut self, pred: impl Fn(&Attribute) -> bool) {
        let before = self.attrs.len();
        self.attrs.retain(|attr| pred(attr));
        if self.attrs.len() != before {
            self.raw = None;
        }
    }

    pub fn raw(&self) -> Option<&RawTag> {
        self.raw.as_ref()
    }

    /// Attach original markup. Only host parsers call this.
    pub fn set_raw(&mut self, raw: RawTag) {
        self.raw = Some(raw);
    }

    pub fn raw_mut(&mut self) -> Option<&mut RawTag> {
        self.raw.as_mut()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
    Verbatim(String),
}

impl Node {
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Self::Element(elem) => Some(elem),
            _ => None,
        }
    }
}

impl From<Element> for Node {
    fn from(elem: Element) -> Self {
        Self::Element(elem)
    }
}
