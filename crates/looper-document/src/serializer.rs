//! HTML serialization of an element tree.

use std::fmt::Write;

use crate::node::{Node, is_raw_text, is_void};

/// Serialize a document: optional doctype, root text, then top-level nodes.
pub(crate) fn serialize(doctype: Option<&str>, root: &Node) -> String {
    let mut out = String::with_capacity(4096);

    if let Some(doctype) = doctype {
        write!(out, "<!DOCTYPE {doctype}>").unwrap_or_default();
    }
    out.push_str(&escape_text(&root.text));
    for child in &root.children {
        serialize_node(child, &mut out);
    }
    out
}

/// Serialize a single node recursively, including its tail.
pub(crate) fn serialize_node(node: &Node, out: &mut String) {
    out.push('<');
    out.push_str(&node.tag);
    for (key, value) in &node.attrs {
        write!(out, r#" {key}="{}""#, escape_attr(value)).unwrap_or_default();
    }
    out.push('>');

    if !is_void(&node.tag) {
        if is_raw_text(&node.tag) {
            out.push_str(&node.text);
        } else {
            out.push_str(&escape_text(&node.text));
        }
        for child in &node.children {
            serialize_node(child, out);
        }
        write!(out, "</{}>", node.tag).unwrap_or_default();
    }

    out.push_str(&escape_text(&node.tail));
}

fn escape_text(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            _ => result.push(ch),
        }
    }
    result
}

fn escape_attr(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => result.push_str("&amp;"),
            '"' => result.push_str("&quot;"),
            _ => result.push(ch),
        }
    }
    result
}
