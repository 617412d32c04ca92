//! Template markup → neutral nodes.
//!
//! The reader runs in lenient mode: end names are not checked, unmatched end
//! tags are kept as verbatim text, and HTML void elements never open a scope.
//! Every element keeps its original tag text, so a tree nobody touched prints
//! back exactly as it was read.

use std::borrow::Cow;

use quick_xml::Reader;
use quick_xml::escape::{resolve_html5_entity, unescape_with};
use quick_xml::events::{BytesStart, Event};

use crate::dom::{AttrValue, Attribute, Closing, Element, Expression, Node, RawTag, SourceLocation};
use crate::error::{ModernizeError, Result};
use crate::utils::html::is_void_element;

/// Parse a template fragment.
pub fn parse(source: &str) -> Result<Vec<Node>> {
    let mut reader = Reader::from_str(source);
    let config = reader.config_mut();
    config.check_end_names = false;
    config.allow_unmatched_ends = true;

    let mut tree = Tree::default();

    loop {
        let start = reader.buffer_position() as usize;
        let event = reader.read_event().map_err(|err| ModernizeError::Template {
            position: reader.error_position() as usize,
            message: err.to_string(),
        })?;
        let end = reader.buffer_position() as usize;
        let raw = &source[start..end];
        let loc = SourceLocation { start, end };

        match event {
            Event::Start(tag) => {
                let mut elem = element(source, &tag, loc)?;
                elem.set_raw(RawTag {
                    start: raw.to_string(),
                    end: None,
                });
                if is_void_element(elem.tag()) {
                    elem.closing = Closing::Void;
                    tree.append(Node::Element(elem));
                } else {
                    tree.open.push(elem);
                }
            }
            Event::Empty(tag) => {
                let mut elem = element(source, &tag, loc)?.with_closing(Closing::SelfClosing);
                elem.set_raw(RawTag {
                    start: raw.to_string(),
                    end: None,
                });
                tree.append(Node::Element(elem));
            }
            Event::End(tag) => {
                let qname = tag.name();
                let name = utf8(qname.as_ref(), start)?;
                tree.close(name, raw, end);
            }
            Event::Text(_) | Event::GeneralRef(_) | Event::CData(_) => tree.text(raw),
            Event::Comment(_) | Event::Decl(_) | Event::PI(_) | Event::DocType(_) => {
                tree.append(Node::Verbatim(raw.to_string()));
            }
            Event::Eof => break,
        }
    }

    Ok(tree.finish())
}

// =============================================================================
// Tree building
// =============================================================================

#[derive(Default)]
struct Tree {
    roots: Vec<Node>,
    open: Vec<Element>,
}

impl Tree {
    fn children(&mut self) -> &mut Vec<Node> {
        match self.open.last_mut() {
            Some(parent) => &mut parent.children,
            None => &mut self.roots,
        }
    }

    fn append(&mut self, node: Node) {
        self.children().push(node);
    }

    /// Adjacent text runs (entity references split them) are merged.
    fn text(&mut self, raw: &str) {
        let children = self.children();
        match children.last_mut() {
            Some(Node::Text(text)) => text.push_str(raw),
            _ => children.push(Node::Text(raw.to_string())),
        }
    }

    /// Close the nearest open element named `name`. Elements opened after it
    /// are closed implicitly, without an end tag. An end tag nothing matches
    /// is kept as text.
    fn close(&mut self, name: &str, raw: &str, end: usize) {
        let Some(depth) = self
            .open
            .iter()
            .rposition(|elem| elem.tag().eq_ignore_ascii_case(name))
        else {
            self.append(Node::Verbatim(raw.to_string()));
            return;
        };

        while self.open.len() > depth + 1 {
            self.pop_unclosed();
        }
        if let Some(mut elem) = self.open.pop() {
            if let Some(tag) = elem.raw_mut() {
                tag.end = Some(raw.to_string());
            }
            if let Some(loc) = &mut elem.loc {
                loc.end = end;
            }
            self.append(Node::Element(elem));
        }
    }

    fn pop_unclosed(&mut self) {
        if let Some(elem) = self.open.pop() {
            self.append(Node::Element(elem));
        }
    }

    fn finish(mut self) -> Vec<Node> {
        while !self.open.is_empty() {
            self.pop_unclosed();
        }
        self.roots
    }
}

// =============================================================================
// Elements and attributes
// =============================================================================

fn element(source: &str, tag: &BytesStart<'_>, loc: SourceLocation) -> Result<Element> {
    let mut elem = Element::new(utf8(tag.name().as_ref(), loc.start)?);
    elem.loc = Some(loc);

    for attr in tag.html_attributes().with_checks(false) {
        let attr = attr.map_err(|err| ModernizeError::Template {
            position: loc.start,
            message: err.to_string(),
        })?;
        let name = utf8(attr.key.as_ref(), loc.start)?;
        let value = utf8(&attr.value, loc.start)?;
        let attr_loc = attribute_location(source, attr.key.as_ref(), &attr.value);

        let parsed = match bound_name(name) {
            Some(name) => Attribute::bound(name, Expression::Raw(unescape(value).into_owned())),
            None => Attribute::new(name, AttrValue::Text(unescape(value).into_owned())),
        };
        elem.push_attr(parsed.at(attr_loc));
    }

    Ok(elem)
}

/// `:name` and `v-bind:name` bind an expression to `name`.
fn bound_name(name: &str) -> Option<&str> {
    name.strip_prefix(':')
        .or_else(|| name.strip_prefix("v-bind:"))
        .filter(|name| !name.is_empty())
}

/// Decode character references, HTML5 named entities included.
///
/// A `&` that does not start a well-formed reference is kept as text, so
/// `a && b` survives and the other references in the value still decode.
fn unescape(value: &str) -> Cow<'_, str> {
    if let Ok(decoded) = unescape_with(value, resolve_html5_entity) {
        return decoded;
    }

    let mut out = String::with_capacity(value.len());
    let mut rest = value;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];

        let reference = tail.find(';').and_then(|semi| {
            unescape_with(&tail[..=semi], resolve_html5_entity)
                .ok()
                .map(|decoded| (decoded.into_owned(), semi + 1))
        });
        match reference {
            Some((decoded, len)) => {
                out.push_str(&decoded);
                rest = &tail[len..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    Cow::Owned(out)
}

fn utf8(bytes: &[u8], position: usize) -> Result<&str> {
    std::str::from_utf8(bytes).map_err(|err| ModernizeError::Template {
        position,
        message: err.to_string(),
    })
}

/// Byte offset of `part` when it is a slice of `source`.
fn offset_of(source: &str, part: &[u8]) -> Option<usize> {
    let base = source.as_ptr() as usize;
    let addr = part.as_ptr() as usize;
    (addr >= base && addr + part.len() <= base + source.len()).then(|| addr - base)
}

/// Span from the attribute name to the end of its value, closing quote
/// included.
fn attribute_location(source: &str, key: &[u8], value: &Cow<'_, [u8]>) -> Option<SourceLocation> {
    let start = offset_of(source, key)?;
    let mut end = start + key.len();

    if let Cow::Borrowed(value) = value
        && !value.is_empty()
        && let Some(value_start) = offset_of(source, value)
    {
        end = value_start + value.len();
        if matches!(source.as_bytes().get(end).copied(), Some(b'"' | b'\'')) {
            end += 1;
        }
    }

    Some(SourceLocation { start, end })
}
