//! Neutral nodes → template markup.

use std::fmt::Write;

use super::ImportStyle;
use crate::dom::{AttrValue, Closing, Element, Expression, Node};
use crate::utils::html::escape_attr;

pub fn render(nodes: &[Node], style: ImportStyle) -> String {
    let mut out = String::new();
    for node in nodes {
        write_node(&mut out, node, style);
    }
    out
}

fn write_node(out: &mut String, node: &Node, style: ImportStyle) {
    match node {
        Node::Text(text) | Node::Verbatim(text) => out.push_str(text),
        Node::Element(elem) => write_element(out, elem, style),
    }
}

fn write_element(out: &mut String, elem: &Element, style: ImportStyle) {
    match elem.raw() {
        Some(raw) => out.push_str(&raw.start),
        None => write_start_tag(out, elem, style),
    }

    for child in &elem.children {
        write_node(out, child, style);
    }

    match (elem.raw(), elem.closing) {
        (Some(raw), _) => {
            if let Some(end) = &raw.end {
                out.push_str(end);
            }
        }
        (None, Closing::Tag) => {
            let _ = write!(out, "</{}>", elem.tag());
        }
        (None, Closing::SelfClosing | Closing::Void) => {}
    }
}

fn write_start_tag(out: &mut String, elem: &Element, style: ImportStyle) {
    out.push('<');
    out.push_str(elem.tag());

    for attr in elem.attrs() {
        let _ = match &attr.value {
            AttrValue::Text(value) => write!(out, r#" {}="{}""#, attr.name, escape_attr(value)),
            AttrValue::Bound(expr) => write!(
                out,
                r#" :{}="{}""#,
                attr.name,
                escape_attr(&expression(expr, style))
            ),
        };
    }

    out.push_str(match elem.closing {
        Closing::SelfClosing => " />",
        Closing::Tag | Closing::Void => ">",
    });
}

/// Script text of a bound value.
pub fn expression(expr: &Expression, style: ImportStyle) -> String {
    match (expr, style) {
        (Expression::Raw(text), _) => text.clone(),
        (Expression::Import(handle), ImportStyle::Require) => {
            format!("require({})", js_string(&handle.path))
        }
        (Expression::ImportDefault(handle), ImportStyle::Require) => {
            format!("require({}).default", js_string(&handle.path))
        }
        (Expression::Import(handle), ImportStyle::Hoisted) => handle.binding(),
        (Expression::ImportDefault(handle), ImportStyle::Hoisted) => {
            format!("{}.default", handle.binding())
        }
    }
}

/// Single-quoted JavaScript string literal.
pub fn js_string(value: &str) -> String {
    let mut literal = String::with_capacity(value.len() + 2);
    literal.push('\'');
    for c in value.chars() {
        match c {
            '\\' => literal.push_str("\\\\"),
            '\'' => literal.push_str("\\'"),
            '\n' => literal.push_str("\\n"),
            '\r' => literal.push_str("\\r"),
            _ => literal.push(c),
        }
    }
    literal.push('\'');
    literal
}
