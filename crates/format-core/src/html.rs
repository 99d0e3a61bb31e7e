//! Minimal HTML fragment reader/writer for inline rich text.
//!
//! Covers what inline tools produce and consume: elements with quoted or bare
//! attributes, text, the basic entities and void `br`/`hr`/`img`. Comments,
//! doctype and raw-text elements are out of scope.

use crate::dom::{Attrs, DomTree, Element, NodeId, NodeKind};
use crate::error::HtmlError;
use crate::tag::Tag;

/// Parses `source` and appends the resulting nodes to `parent`.
pub fn parse_into(tree: &mut DomTree, parent: NodeId, source: &str) -> Result<(), HtmlError> {
    let mut stack: Vec<(NodeId, Tag)> = Vec::new();
    let mut pos = 0usize;

    while pos < source.len() {
        let rest = &source[pos..];
        let current = stack.last().map(|(id, _)| *id).unwrap_or(parent);

        if !rest.starts_with('<') {
            let end = rest.find('<').unwrap_or(rest.len());
            let text = tree.create_text(decode_entities(&rest[..end]));
            tree.append_child(current, text)?;
            pos += end;
            continue;
        }

        let close = rest.find('>').ok_or(HtmlError::UnterminatedTag(pos))?;
        let inner = &rest[1..close];

        if let Some(name) = inner.strip_prefix('/') {
            let tag = Tag::from(name.trim());
            match stack.pop() {
                Some((_, open)) if open == tag => {}
                _ => {
                    return Err(HtmlError::UnexpectedClose {
                        found: tag.name().to_string(),
                        at: pos,
                    });
                }
            }
        } else {
            let self_closing = inner.trim_end().ends_with('/');
            let inner = inner.trim_end().trim_end_matches('/');
            let (name, attrs) = parse_tag(inner);
            let tag = Tag::from(name);
            let void = self_closing || tag.is_void();
            let element = tree.create_element(Element {
                tag: tag.clone(),
                attrs,
            });
            tree.append_child(current, element)?;
            if !void {
                stack.push((element, tag));
            }
        }
        pos += close + 1;
    }

    match stack.pop() {
        Some((_, tag)) => Err(HtmlError::Unclosed(tag.name().to_string())),
        None => Ok(()),
    }
}

fn parse_tag(inner: &str) -> (&str, Attrs) {
    let inner = inner.trim();
    let name_end = inner
        .find(|c: char| c.is_whitespace())
        .unwrap_or(inner.len());
    let name = &inner[..name_end];
    let mut attrs = Attrs::new();

    let mut rest = inner[name_end..].trim_start();
    while !rest.is_empty() {
        let key_end = rest
            .find(|c: char| c == '=' || c.is_whitespace())
            .unwrap_or(rest.len());
        let key = rest[..key_end].to_ascii_lowercase();
        rest = rest[key_end..].trim_start();

        let value = if let Some(after_eq) = rest.strip_prefix('=') {
            let after_eq = after_eq.trim_start();
            let (value, remaining) = match after_eq.chars().next() {
                Some(quote @ ('"' | '\'')) => {
                    let body = &after_eq[1..];
                    let end = body.find(quote).unwrap_or(body.len());
                    (&body[..end], body.get(end + 1..).unwrap_or(""))
                }
                _ => {
                    let end = after_eq
                        .find(char::is_whitespace)
                        .unwrap_or(after_eq.len());
                    (&after_eq[..end], &after_eq[end..])
                }
            };
            rest = remaining.trim_start();
            decode_entities(value)
        } else {
            String::new()
        };

        if !key.is_empty() {
            attrs.insert(key, value);
        }
    }
    (name, attrs)
}

fn decode_entities(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&nbsp;", "\u{a0}")
        .replace("&amp;", "&")
}

fn escape_text(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('\u{a0}', "&nbsp;")
}

fn escape_attr(s: &str) -> String {
    escape_text(s).replace('"', "&quot;")
}

pub fn serialize_children(tree: &DomTree, node: NodeId) -> String {
    let mut out = String::new();
    for child in tree.children(node) {
        write_node(tree, *child, &mut out);
    }
    out
}

pub fn serialize_node(tree: &DomTree, node: NodeId) -> String {
    let mut out = String::new();
    write_node(tree, node, &mut out);
    out
}

fn write_node(tree: &DomTree, node: NodeId, out: &mut String) {
    match tree.kind(node) {
        Some(NodeKind::Text(text)) => out.push_str(&escape_text(text)),
        Some(NodeKind::Element(el)) => {
            out.push('<');
            out.push_str(el.tag.name());
            for (key, value) in &el.attrs {
                out.push(' ');
                out.push_str(key);
                out.push_str("=\"");
                out.push_str(&escape_attr(value));
                out.push('"');
            }
            out.push('>');
            if el.tag.is_void() {
                return;
            }
            for child in tree.children(node) {
                write_node(tree, *child, out);
            }
            out.push_str("</");
            out.push_str(el.tag.name());
            out.push('>');
        }
        None => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip(source: &str) -> String {
        let mut tree = DomTree::new();
        let root = tree.create_element(Element::new("div"));
        parse_into(&mut tree, root, source).unwrap();
        serialize_children(&tree, root)
    }

    #[test]
    fn attributes_are_written_in_sorted_order() {
        assert_eq!(
            round_trip(r#"<p>a <a target='_blank' href="x.com">b &amp; c</a><br></p>"#),
            r#"<p>a <a href="x.com" target="_blank">b &amp; c</a><br></p>"#
        );
    }

    #[test]
    fn mismatched_close_is_an_error() {
        let mut tree = DomTree::new();
        let root = tree.create_element(Element::new("div"));
        let err = parse_into(&mut tree, root, "<b>x</i>").unwrap_err();
        assert_eq!(
            err,
            HtmlError::UnexpectedClose {
                found: "i".to_string(),
                at: 4
            }
        );
    }

    #[test]
    fn unclosed_element_is_an_error() {
        let mut tree = DomTree::new();
        let root = tree.create_element(Element::new("div"));
        assert_eq!(
            parse_into(&mut tree, root, "<p><b>x</p>").unwrap_err(),
            HtmlError::UnexpectedClose {
                found: "p".to_string(),
                at: 7
            }
        );
        assert_eq!(
            parse_into(&mut tree, root, "<p>x").unwrap_err(),
            HtmlError::Unclosed("p".to_string())
        );
    }
}
