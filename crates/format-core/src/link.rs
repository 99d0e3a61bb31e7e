use crate::config::LinkConfig;
use crate::document::Document;
use crate::dom::{Element, NodeId};
use crate::error::TreeError;
use crate::range::TextRange;
use crate::tag::{InlineFormat, InlineTag};
use crate::tool::Change;

/// A link may not contain whitespace anywhere, including around it.
pub fn validate_url(url: &str) -> bool {
    !url.chars().any(char::is_whitespace)
}

/// Trims `url` and prefixes `default_scheme` unless it already names a
/// scheme, is root-relative, an in-page anchor or protocol-relative.
pub fn normalize_url(url: &str, default_scheme: &str) -> String {
    let url = url.trim();
    if has_scheme(url) || is_root_relative(url) || url.starts_with('#') || is_protocol_relative(url)
    {
        return url.to_string();
    }
    format!("{default_scheme}{url}")
}

// `word:` optionally followed by `//`.
fn has_scheme(url: &str) -> bool {
    match url.split_once(':') {
        Some((scheme, _)) => {
            !scheme.is_empty() && scheme.chars().all(|c| c.is_alphanumeric() || c == '_')
        }
        None => false,
    }
}

fn is_root_relative(url: &str) -> bool {
    let mut chars = url.chars();
    chars.next() == Some('/') && chars.next().is_some_and(|c| c != '/' && !c.is_whitespace())
}

fn is_protocol_relative(url: &str) -> bool {
    url.strip_prefix("//")
        .and_then(|rest| rest.chars().next())
        .is_some_and(|c| c != '/' && !c.is_whitespace())
}

fn is_anchor(el: &Element) -> bool {
    InlineFormat::Link.matches(&el.tag)
}

/// The anchor around the selection anchor point, if any.
pub fn enclosing_anchor(doc: &Document) -> Option<NodeId> {
    let node = doc.anchor_node()?;
    doc.find_enclosing(node, is_anchor)
}

/// The anchor that holds both ends of the live selection.
fn anchor_around_selection(doc: &Document) -> Option<NodeId> {
    let range = doc.selection()?;
    let anchor = enclosing_anchor(doc)?;
    doc.tree()
        .is_inclusive_ancestor(anchor, range.end.node)
        .then_some(anchor)
}

/// Whether the live selection starts and ends in different blocks.
pub fn spans_blocks(doc: &Document) -> bool {
    doc.selection().is_some_and(|range| {
        doc.enclosing_block(range.start.node) != doc.enclosing_block(range.end.node)
    })
}

/// Links the live selection to `href` with a single anchor element.
///
/// A selection that already sits inside one anchor only rewrites its href.
/// A selection spanning blocks is left alone.
/// Otherwise every anchor touching the selection is unwrapped first, the
/// selected content is moved into one new anchor (keeping nested formatting)
/// and the selection ends up on the anchor's contents.
pub fn insert_link(
    doc: &mut Document,
    href: &str,
    config: &LinkConfig,
) -> Result<Option<Change>, TreeError> {
    if let Some(anchor) = anchor_around_selection(doc) {
        if let Some(el) = doc.tree_mut().element_mut(anchor) {
            el.attrs.insert("href".to_string(), href.to_string());
        }
        log::debug!("updated existing link to {href}");
        return Ok(Some(Change::LinkUpdated {
            href: href.to_string(),
        }));
    }

    if spans_blocks(doc) {
        log::debug!("selection crosses blocks, not linking");
        return Ok(None);
    }
    let Some(range) = doc.split_selection_boundaries()? else {
        return Ok(None);
    };
    if doc.selected_text().is_empty() {
        return Ok(None);
    }

    let mut existing: Vec<NodeId> = range
        .intersecting_elements(doc.tree())
        .into_iter()
        .filter(|n| doc.tree().element(*n).is_some_and(is_anchor))
        .collect();
    if let Some(outer) = range
        .common_ancestor(doc.tree())
        .and_then(|common| doc.find_enclosing(common, is_anchor))
    {
        existing.push(outer);
    }
    for anchor in &existing {
        if doc.tree().contains(*anchor) {
            doc.unwrap_element(*anchor)?;
        }
    }
    if !existing.is_empty() {
        log::debug!("unwrapped {} existing links inside the selection", existing.len());
    }

    let Some(range) = doc.split_selection_boundaries()? else {
        return Ok(None);
    };
    let tree = doc.tree_mut();
    let (fragment, insertion) = range.extract_contents(tree)?;
    if tree.children(fragment).is_empty() {
        tree.discard(fragment)?;
        return Ok(None);
    }

    let stray: Vec<NodeId> = tree
        .descendants(fragment)
        .into_iter()
        .filter(|n| tree.element(*n).is_some_and(is_anchor))
        .collect();
    for anchor in stray {
        tree.unwrap(anchor)?;
    }

    let anchor = tree.create_element(
        Element::new(InlineTag::A)
            .attr("href", href)
            .attr("target", config.target.as_str())
            .attr("rel", config.rel.as_str()),
    );
    for child in tree.children(fragment).to_vec() {
        tree.append_child(anchor, child)?;
    }
    tree.discard(fragment)?;
    tree.insert_at(insertion.node, insertion.offset, anchor)?;

    let contents = TextRange::select_node_contents(doc.tree(), anchor);
    doc.set_selection(Some(contents));
    doc.normalize_formatting(anchor)?;

    log::debug!("linked selection to {href}");
    Ok(Some(Change::Linked {
        href: href.to_string(),
    }))
}

/// Unwraps the anchor around the selection anchor point. Returns its href.
pub fn unlink(doc: &mut Document) -> Result<Option<String>, TreeError> {
    let Some(anchor) = enclosing_anchor(doc) else {
        return Ok(None);
    };
    let href = doc
        .tree()
        .element(anchor)
        .and_then(|el| el.get_attr("href"))
        .unwrap_or_default()
        .to_string();
    doc.unwrap_element(anchor)?;
    log::debug!("removed link to {href}");
    Ok(Some(href))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scheme_detection_matches_word_colon() {
        assert!(has_scheme("https://x"));
        assert!(has_scheme("mailto:me@example.com"));
        assert!(!has_scheme("example.com"));
        assert!(!has_scheme(":nope"));
        assert!(!has_scheme("a.b:8080/x"));
    }

    #[test]
    fn relative_forms_are_left_alone() {
        assert_eq!(normalize_url("/internal", "http://"), "/internal");
        assert_eq!(normalize_url("//cdn.example.com/a.js", "http://"), "//cdn.example.com/a.js");
        assert_eq!(normalize_url("#top", "http://"), "#top");
        assert_eq!(normalize_url("  example.com ", "https://"), "https://example.com");
        assert_eq!(normalize_url("///x", "http://"), "http://///x");
    }
}
