use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::dom::{DomTree, Element, NodeId, NodeKind};
use crate::error::TreeError;

/// A point in the tree with DOM semantics: a char offset inside a text node,
/// or a child index inside an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Boundary {
    pub node: NodeId,
    pub offset: usize,
}

impl Boundary {
    pub fn new(node: NodeId, offset: usize) -> Self {
        Self { node, offset }
    }

    pub fn before(tree: &DomTree, node: NodeId) -> Result<Self, TreeError> {
        let parent = tree.parent(node).ok_or(TreeError::Detached(node))?;
        let ix = tree.index_of(node).ok_or(TreeError::Detached(node))?;
        Ok(Self::new(parent, ix))
    }

    pub fn after(tree: &DomTree, node: NodeId) -> Result<Self, TreeError> {
        let before = Self::before(tree, node)?;
        Ok(Self::new(before.node, before.offset + 1))
    }
}

/// Document-order comparison of two boundary points of the same tree.
pub fn compare_boundaries(tree: &DomTree, a: Boundary, b: Boundary) -> Ordering {
    if a.node == b.node {
        return a.offset.cmp(&b.offset);
    }
    let path_a = tree.path(a.node);
    let path_b = tree.path(b.node);

    if path_a.len() < path_b.len() && path_b.starts_with(&path_a) {
        let child_ix = path_b[path_a.len()];
        return if a.offset > child_ix {
            Ordering::Greater
        } else {
            Ordering::Less
        };
    }
    if path_b.len() < path_a.len() && path_a.starts_with(&path_b) {
        let child_ix = path_a[path_b.len()];
        return if b.offset > child_ix {
            Ordering::Less
        } else {
            Ordering::Greater
        };
    }
    path_a
        .iter()
        .zip(path_b.iter())
        .find(|(x, y)| x != y)
        .map(|(x, y)| x.cmp(y))
        .unwrap_or(Ordering::Equal)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeFilter {
    Text,
    Element,
}

/// Which way a char offset resolves when it sits between two text nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Affinity {
    Forward,
    Backward,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextRange {
    pub start: Boundary,
    pub end: Boundary,
}

impl TextRange {
    /// Builds a range, swapping the points if they arrive in reverse order.
    pub fn new(tree: &DomTree, a: Boundary, b: Boundary) -> Self {
        if compare_boundaries(tree, a, b) == Ordering::Greater {
            Self { start: b, end: a }
        } else {
            Self { start: a, end: b }
        }
    }

    pub fn collapsed(at: Boundary) -> Self {
        Self { start: at, end: at }
    }

    pub fn select_node(tree: &DomTree, node: NodeId) -> Result<Self, TreeError> {
        Ok(Self {
            start: Boundary::before(tree, node)?,
            end: Boundary::after(tree, node)?,
        })
    }

    pub fn select_node_contents(tree: &DomTree, node: NodeId) -> Self {
        Self {
            start: Boundary::new(node, 0),
            end: Boundary::new(node, tree.node_len(node)),
        }
    }

    pub fn is_collapsed(&self, tree: &DomTree) -> bool {
        self.start == self.end || compare_boundaries(tree, self.start, self.end) == Ordering::Equal
    }

    pub fn collapse_to_end(&self) -> Self {
        Self::collapsed(self.end)
    }

    pub fn common_ancestor(&self, tree: &DomTree) -> Option<NodeId> {
        let mut candidate = Some(self.start.node);
        while let Some(node) = candidate {
            if tree.is_inclusive_ancestor(node, self.end.node) {
                return Some(node);
            }
            candidate = tree.parent(node);
        }
        None
    }

    /// True when `node` lies entirely between the two boundary points.
    pub fn contains_node(&self, tree: &DomTree, node: NodeId) -> bool {
        let (Ok(before), Ok(after)) = (Boundary::before(tree, node), Boundary::after(tree, node))
        else {
            return false;
        };
        compare_boundaries(tree, self.start, before) != Ordering::Greater
            && compare_boundaries(tree, after, self.end) != Ordering::Greater
    }

    /// An inclusive ancestor of exactly one of the two boundary containers.
    pub fn partially_contains_node(&self, tree: &DomTree, node: NodeId) -> bool {
        tree.is_inclusive_ancestor(node, self.start.node)
            != tree.is_inclusive_ancestor(node, self.end.node)
    }

    /// Fully contained nodes of the requested kind, in document order.
    pub fn contained_nodes(&self, tree: &DomTree, filter: NodeFilter) -> Vec<NodeId> {
        let Some(common) = self.common_ancestor(tree) else {
            return Vec::new();
        };
        tree.descendants(common)
            .into_iter()
            .filter(|node| matches_filter(tree, *node, filter))
            .filter(|node| self.contains_node(tree, *node))
            .collect()
    }

    /// Elements that are contained or partially contained, in document order.
    pub fn intersecting_elements(&self, tree: &DomTree) -> Vec<NodeId> {
        let Some(common) = self.common_ancestor(tree) else {
            return Vec::new();
        };
        tree.descendants(common)
            .into_iter()
            .filter(|node| tree.element(*node).is_some())
            .filter(|node| {
                self.contains_node(tree, *node) || self.partially_contains_node(tree, *node)
            })
            .collect()
    }

    /// The selected characters.
    pub fn to_text(&self, tree: &DomTree) -> String {
        let Some(common) = self.common_ancestor(tree) else {
            return String::new();
        };
        let mut candidates = vec![common];
        candidates.extend(tree.descendants(common));

        let mut out = String::new();
        for node in candidates {
            let Some(text) = tree.text(node) else {
                continue;
            };
            let len = text.chars().count();
            let from = if node == self.start.node {
                self.start.offset.min(len)
            } else {
                0
            };
            let to = if node == self.end.node {
                self.end.offset.min(len)
            } else {
                len
            };
            let touches_edge = node == self.start.node || node == self.end.node;
            if touches_edge || self.contains_node(tree, node) {
                if from < to {
                    out.extend(text.chars().skip(from).take(to - from));
                }
            }
        }
        out
    }

    /// Moves the selected content into a detached container element, DOM
    /// `extractContents` style: partially selected ancestors are shallow
    /// copied into the fragment. Returns the fragment and the point where the
    /// content used to start. Text boundaries must already be split.
    pub fn extract_contents(&self, tree: &mut DomTree) -> Result<(NodeId, Boundary), TreeError> {
        let fragment = tree.create_element(Element::new("div"));
        let common = self
            .common_ancestor(tree)
            .ok_or(TreeError::Detached(self.start.node))?;
        if tree.element(common).is_none() {
            return Err(TreeError::NotAContainer(common));
        }

        let start_child = child_towards(tree, common, self.start.node);
        let end_child = child_towards(tree, common, self.end.node);

        let first_ix = match start_child {
            Some(child) => tree.index_of(child).ok_or(TreeError::Detached(child))? + 1,
            None => self.start.offset,
        };
        let last_ix = match end_child {
            Some(child) => tree.index_of(child).ok_or(TreeError::Detached(child))?,
            None => self.end.offset,
        };
        let middle: Vec<NodeId> = tree
            .children(common)
            .get(first_ix.min(last_ix)..last_ix)
            .map(<[NodeId]>::to_vec)
            .unwrap_or_default();

        if start_child.is_some() {
            let clone = clone_tail(tree, self.start, common)?;
            tree.append_child(fragment, clone)?;
        }
        for node in middle {
            tree.append_child(fragment, node)?;
        }
        if end_child.is_some() {
            let clone = clone_head(tree, self.end, common)?;
            tree.append_child(fragment, clone)?;
        }

        let insertion = match start_child {
            Some(child) => Boundary::after(tree, child)?,
            None => Boundary::new(common, self.start.offset),
        };
        Ok((fragment, insertion))
    }
}

fn matches_filter(tree: &DomTree, node: NodeId, filter: NodeFilter) -> bool {
    match (tree.kind(node), filter) {
        (Some(NodeKind::Text(_)), NodeFilter::Text) => true,
        (Some(NodeKind::Element(_)), NodeFilter::Element) => true,
        _ => false,
    }
}

/// The child of `ancestor` on the path to `node`, or `None` if they are the same node.
fn child_towards(tree: &DomTree, ancestor: NodeId, node: NodeId) -> Option<NodeId> {
    if ancestor == node {
        return None;
    }
    let mut current = node;
    while let Some(parent) = tree.parent(current) {
        if parent == ancestor {
            return Some(current);
        }
        current = parent;
    }
    None
}

/// Shallow copies of every element from the boundary container up to (but
/// excluding) `stop`, each holding the children that follow the boundary.
fn clone_tail(tree: &mut DomTree, at: Boundary, stop: NodeId) -> Result<NodeId, TreeError> {
    let mut container = at.node;
    let mut clone = tree.clone_shallow(container)?;
    for child in tree.children(container)[at.offset.min(tree.node_len(container))..].to_vec() {
        tree.append_child(clone, child)?;
    }
    while let Some(parent) = tree.parent(container) {
        if parent == stop {
            break;
        }
        let ix = tree.index_of(container).ok_or(TreeError::Detached(container))?;
        let outer = tree.clone_shallow(parent)?;
        tree.append_child(outer, clone)?;
        for child in tree.children(parent)[ix + 1..].to_vec() {
            tree.append_child(outer, child)?;
        }
        clone = outer;
        container = parent;
    }
    Ok(clone)
}

/// Mirror of [`clone_tail`] for the end boundary: children before the point.
fn clone_head(tree: &mut DomTree, at: Boundary, stop: NodeId) -> Result<NodeId, TreeError> {
    let mut container = at.node;
    let mut clone = tree.clone_shallow(container)?;
    for child in tree.children(container)[..at.offset.min(tree.node_len(container))].to_vec() {
        tree.append_child(clone, child)?;
    }
    while let Some(parent) = tree.parent(container) {
        if parent == stop {
            break;
        }
        let ix = tree.index_of(container).ok_or(TreeError::Detached(container))?;
        let outer = tree.clone_shallow(parent)?;
        for child in tree.children(parent)[..ix].to_vec() {
            tree.append_child(outer, child)?;
        }
        tree.append_child(outer, clone)?;
        clone = outer;
        container = parent;
    }
    Ok(clone)
}

/// Number of characters of text under `root` that precede `boundary`.
pub fn char_offset(tree: &DomTree, root: NodeId, boundary: Boundary) -> usize {
    let mut total = 0usize;
    for node in tree.descendants(root) {
        let Some(text) = tree.text(node) else {
            continue;
        };
        let len = text.chars().count();
        if node == boundary.node {
            return total + boundary.offset.min(len);
        }
        let before = Boundary::before(tree, node);
        match before {
            Ok(before) if compare_boundaries(tree, before, boundary) == Ordering::Less => {
                total += len;
            }
            _ => break,
        }
    }
    total
}

/// Resolves a char offset under `root` back to a point inside a text node.
pub fn boundary_at_char(
    tree: &DomTree,
    root: NodeId,
    offset: usize,
    affinity: Affinity,
) -> Boundary {
    let texts: Vec<(NodeId, usize)> = tree
        .descendants(root)
        .into_iter()
        .filter_map(|n| tree.text(n).map(|t| (n, t.chars().count())))
        .filter(|(_, len)| *len > 0)
        .collect();

    let mut total = 0usize;
    for (ix, (node, len)) in texts.iter().enumerate() {
        let start = total;
        let end = total + len;
        let hit = match affinity {
            Affinity::Forward => offset < end || ix + 1 == texts.len(),
            Affinity::Backward => offset <= end && (offset > start || ix == 0),
        };
        if hit {
            return Boundary::new(*node, offset.saturating_sub(start).min(*len));
        }
        total = end;
    }
    Boundary::new(root, 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tag::InlineTag;

    // <p>foo<b>bar</b>baz</p>
    fn sample() -> (DomTree, NodeId, [NodeId; 4]) {
        let mut tree = DomTree::new();
        let p = tree.create_element(Element::new("p"));
        let foo = tree.create_text("foo");
        let b = tree.create_element(Element::new(InlineTag::B));
        let bar = tree.create_text("bar");
        let baz = tree.create_text("baz");
        tree.append_child(p, foo).unwrap();
        tree.append_child(p, b).unwrap();
        tree.append_child(b, bar).unwrap();
        tree.append_child(p, baz).unwrap();
        (tree, p, [foo, b, bar, baz])
    }

    #[test]
    fn boundaries_compare_in_document_order() {
        let (tree, p, [foo, _b, bar, baz]) = sample();
        let in_foo = Boundary::new(foo, 1);
        let in_bar = Boundary::new(bar, 0);
        let before_baz = Boundary::new(p, 2);
        let in_baz = Boundary::new(baz, 2);

        assert_eq!(compare_boundaries(&tree, in_foo, in_bar), Ordering::Less);
        assert_eq!(compare_boundaries(&tree, in_bar, before_baz), Ordering::Less);
        assert_eq!(compare_boundaries(&tree, before_baz, in_baz), Ordering::Less);
        assert_eq!(compare_boundaries(&tree, in_baz, in_foo), Ordering::Greater);
    }

    #[test]
    fn freed_and_root_nodes_compare_without_panicking() {
        let (mut tree, p, [foo, _b, _bar, baz]) = sample();
        tree.discard(baz).unwrap();

        assert_eq!(
            compare_boundaries(&tree, Boundary::new(baz, 0), Boundary::new(p, 0)),
            Ordering::Equal
        );
        assert_eq!(
            compare_boundaries(&tree, Boundary::new(p, 0), Boundary::new(baz, 2)),
            Ordering::Equal
        );
        assert_eq!(
            compare_boundaries(&tree, Boundary::new(p, 0), Boundary::new(foo, 1)),
            Ordering::Less
        );
    }

    #[test]
    fn to_text_reads_across_nodes() {
        let (tree, _p, [foo, _b, _bar, baz]) = sample();
        let range = TextRange::new(&tree, Boundary::new(baz, 1), Boundary::new(foo, 2));
        assert_eq!(range.to_text(&tree), "obarb");
    }

    #[test]
    fn contained_nodes_skips_partially_selected_text() {
        let (tree, p, [foo, b, bar, baz]) = sample();
        let range = TextRange::new(&tree, Boundary::new(foo, 1), Boundary::new(p, 3));
        assert_eq!(range.contained_nodes(&tree, NodeFilter::Text), vec![bar, baz]);
        assert_eq!(range.contained_nodes(&tree, NodeFilter::Element), vec![b]);
    }

    #[test]
    fn char_offsets_round_trip_through_boundaries() {
        let (tree, p, [_foo, _b, bar, baz]) = sample();
        assert_eq!(char_offset(&tree, p, Boundary::new(bar, 2)), 5);
        assert_eq!(char_offset(&tree, p, Boundary::new(p, 2)), 6);
        assert_eq!(boundary_at_char(&tree, p, 6, Affinity::Forward), Boundary::new(baz, 0));
        assert_eq!(boundary_at_char(&tree, p, 6, Affinity::Backward), Boundary::new(bar, 3));
    }
}
