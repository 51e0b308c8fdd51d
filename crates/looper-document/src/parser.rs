//! Tolerant HTML parser built on `quick-xml`.
//!
//! HTML is not XML, so the input is normalized before tokenizing: the
//! doctype is split off, named entities become characters and the bodies of
//! `<script>`/`<style>` are wrapped in CDATA. While building the tree, void
//! elements never open a scope and unmatched end tags are ignored.

use std::io::BufRead;
use std::sync::LazyLock;

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use regex::Regex;

use crate::entities::{decode_reference, resolve_named_entities};
use crate::error::DocumentError;
use crate::node::{Node, is_void};

/// Tag of the synthetic element wrapping the top-level nodes.
pub(crate) const ROOT_TAG: &str = "#root";

static DOCTYPE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)^(\s*)<!doctype\s+([^>]*)>").expect("invalid doctype regex")
});

static SCRIPT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)(<script\b[^>]*>)(.*?)(</script\s*>)").expect("invalid script regex")
});

static STYLE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)(<style\b[^>]*>)(.*?)(</style\s*>)").expect("invalid style regex")
});

/// Result of parsing: optional doctype plus the root wrapper.
pub(crate) struct Parsed {
    pub doctype: Option<String>,
    pub root: Node,
}

/// Parse an HTML string into a tree under a synthetic root.
pub(crate) fn parse(html: &str) -> Result<Parsed, DocumentError> {
    let (doctype, leading, body) = split_doctype(html);
    let body = wrap_raw_text(&resolve_named_entities(body));

    let mut reader = Reader::from_str(&body);
    let config = reader.config_mut();
    config.trim_text(false);
    config.check_end_names = false;
    config.allow_unmatched_ends = true;

    let mut stack = vec![Node::new(ROOT_TAG)];
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => {
                let node = element(&reader, &e);
                if is_void(&node.tag) {
                    attach(&mut stack, node);
                } else {
                    stack.push(node);
                }
            }
            Event::Empty(e) => {
                let node = element(&reader, &e);
                attach(&mut stack, node);
            }
            Event::End(e) => {
                let tag = decode_name(&reader, e.name().as_ref());
                close(&mut stack, &tag);
            }
            Event::Text(e) => {
                let text = reader.decoder().decode(&e)?;
                append_text(&mut stack, &text);
            }
            Event::GeneralRef(e) => {
                let entity = reader.decoder().decode(&e)?;
                append_text(&mut stack, &decode_reference(&entity));
            }
            Event::CData(e) => {
                append_text(&mut stack, &String::from_utf8_lossy(&e));
            }
            Event::Eof => break,
            Event::Comment(_) | Event::Decl(_) | Event::PI(_) | Event::DocType(_) => {}
        }
        buf.clear();
    }

    // Implicitly close anything left open
    while stack.len() > 1 {
        if let Some(node) = stack.pop() {
            attach(&mut stack, node);
        }
    }
    let mut root = stack.pop().unwrap_or_else(|| Node::new(ROOT_TAG));
    root.text.insert_str(0, leading);

    Ok(Parsed { doctype, root })
}

/// Split a leading doctype off the input.
///
/// Returns the doctype body, the whitespace that preceded it, and the rest.
fn split_doctype(html: &str) -> (Option<String>, &str, &str) {
    match DOCTYPE_PATTERN.captures(html) {
        Some(caps) => {
            let leading = caps.get(1).map_or("", |m| m.as_str());
            let doctype = caps.get(2).map(|m| m.as_str().trim().to_owned());
            let end = caps.get(0).map_or(0, |m| m.end());
            (doctype, leading, &html[end..])
        }
        None => (None, "", html),
    }
}

/// Wrap `<script>` and `<style>` bodies in CDATA so `<` inside them is inert.
fn wrap_raw_text(html: &str) -> String {
    let wrap = |caps: &regex::Captures| {
        let body = &caps[2];
        if body.is_empty() || body.contains("]]>") {
            caps[0].to_owned()
        } else {
            format!("{}<![CDATA[{body}]]>{}", &caps[1], &caps[3])
        }
    };
    let html = SCRIPT_PATTERN.replace_all(html, wrap);
    STYLE_PATTERN.replace_all(&html, wrap).into_owned()
}

fn element<R: BufRead>(reader: &Reader<R>, e: &BytesStart) -> Node {
    let mut node = Node::new(decode_name(reader, e.name().as_ref()));
    for attr in e.html_attributes().flatten() {
        let key = decode_name(reader, attr.key.as_ref());
        let value = attr.unescape_value().map_or_else(
            |_| String::from_utf8_lossy(&attr.value).into_owned(),
            std::borrow::Cow::into_owned,
        );
        node.attrs.push((key, value));
    }
    node
}

fn decode_name<R: BufRead>(reader: &Reader<R>, name: &[u8]) -> String {
    reader.decoder().decode(name).map_or_else(
        |_| String::from_utf8_lossy(name).into_owned(),
        std::borrow::Cow::into_owned,
    )
}

/// Attach a finished node to the element on top of the stack.
fn attach(stack: &mut [Node], node: Node) {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(node);
    }
}

/// Close the innermost open element named `tag`, closing any elements
/// opened after it. End tags with no open match are ignored.
fn close(stack: &mut Vec<Node>, tag: &str) {
    let Some(pos) = stack
        .iter()
        .skip(1)
        .rposition(|node| node.tag.eq_ignore_ascii_case(tag))
        .map(|pos| pos + 1)
    else {
        return;
    };
    while stack.len() > pos {
        if let Some(node) = stack.pop() {
            attach(stack, node);
        }
    }
}

/// Append text to the open element's text or its last child's tail.
fn append_text(stack: &mut [Node], text: &str) {
    let Some(node) = stack.last_mut() else {
        return;
    };
    if let Some(last_child) = node.children.last_mut() {
        last_child.tail.push_str(text);
    } else {
        node.text.push_str(text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_root(html: &str) -> Node {
        parse(html).unwrap().root
    }

    #[test]
    fn test_parse_simple_element() {
        let root = parse_root("<p>Hello</p>");

        assert_eq!(root.tag, ROOT_TAG);
        assert_eq!(root.children.len(), 1);
        assert_eq!(root.children[0].tag, "p");
        assert_eq!(root.children[0].text, "Hello");
    }

    #[test]
    fn test_parse_nested_elements_with_tail() {
        let root = parse_root("<p><strong>Bold</strong> text</p>");

        let p = &root.children[0];
        assert!(p.text.is_empty());
        assert_eq!(p.children[0].tag, "strong");
        assert_eq!(p.children[0].text, "Bold");
        assert_eq!(p.children[0].tail, " text");
    }

    #[test]
    fn test_parse_void_elements_without_end_tag() {
        let root = parse_root(r#"<p>Before<br>After<img src="a.png"></p><p>Next</p>"#);

        assert_eq!(root.children.len(), 2);
        let p = &root.children[0];
        assert_eq!(p.text, "Before");
        assert_eq!(p.children[0].tag, "br");
        assert_eq!(p.children[0].tail, "After");
        assert_eq!(p.children[1].attr("src"), Some("a.png"));
        assert_eq!(root.children[1].text, "Next");
    }

    #[test]
    fn test_parse_doctype() {
        let parsed = parse("<!DOCTYPE html>\n<html><body></body></html>").unwrap();

        assert_eq!(parsed.doctype.as_deref(), Some("html"));
        assert_eq!(parsed.root.text, "\n");
        assert_eq!(parsed.root.children[0].tag, "html");
    }

    #[test]
    fn test_parse_entities() {
        let root = parse_root("<p>a &lt; b&nbsp;&amp;&#65;</p>");

        assert_eq!(root.children[0].text, "a < b\u{00a0}&A");
    }

    #[test]
    fn test_parse_script_body_is_raw() {
        let root = parse_root("<script>if (a < b && c) { run(); }</script>");

        assert_eq!(root.children[0].tag, "script");
        assert_eq!(root.children[0].text, "if (a < b && c) { run(); }");
    }

    #[test]
    fn test_parse_valueless_attribute() {
        let root = parse_root("<input disabled>");

        assert_eq!(root.children[0].attr("disabled"), Some(""));
    }

    #[test]
    fn test_unmatched_end_tag_is_ignored() {
        let root = parse_root("<div>text</span></div>");

        assert_eq!(root.children.len(), 1);
        assert_eq!(root.children[0].text, "text");
    }

    #[test]
    fn test_unclosed_elements_close_at_parent_end() {
        let root = parse_root("<ul><li>one<li>two</ul><p>after</p>");

        let ul = &root.children[0];
        assert_eq!(ul.tag, "ul");
        assert_eq!(root.children[1].tag, "p");
        assert_eq!(ul.text_content(), "onetwo");
    }
}
