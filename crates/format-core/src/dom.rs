use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TreeError;
use crate::tag::Tag;

pub type Attrs = BTreeMap<String, String>;

/// Index of a node inside a [`DomTree`]. Ids are never reused once a node is freed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Element {
    pub tag: Tag,
    #[serde(default)]
    pub attrs: Attrs,
}

impl Element {
    pub fn new(tag: impl Into<Tag>) -> Self {
        Self {
            tag: tag.into(),
            attrs: Attrs::new(),
        }
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(name.into(), value.into());
        self
    }

    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.get_attr("class")
            .is_some_and(|classes| classes.split_whitespace().any(|c| c == class))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone)]
struct NodeData {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Arena-backed document tree. The tree owns every node; moving a node only
/// rewrites its parent link and the affected child lists.
#[derive(Debug, Clone, Default)]
pub struct DomTree {
    nodes: Vec<Option<NodeData>>,
}

impl DomTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_element(&mut self, element: Element) -> NodeId {
        self.push(NodeKind::Element(element))
    }

    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.push(NodeKind::Text(text.into()))
    }

    fn push(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Some(NodeData {
            kind,
            parent: None,
            children: Vec::new(),
        }));
        id
    }

    fn data(&self, id: NodeId) -> Result<&NodeData, TreeError> {
        self.nodes
            .get(id.0)
            .and_then(Option::as_ref)
            .ok_or(TreeError::UnknownNode(id))
    }

    fn data_mut(&mut self, id: NodeId) -> Result<&mut NodeData, TreeError> {
        self.nodes
            .get_mut(id.0)
            .and_then(Option::as_mut)
            .ok_or(TreeError::UnknownNode(id))
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.data(id).is_ok()
    }

    pub fn kind(&self, id: NodeId) -> Option<&NodeKind> {
        self.data(id).ok().map(|d| &d.kind)
    }

    pub fn element(&self, id: NodeId) -> Option<&Element> {
        match self.kind(id)? {
            NodeKind::Element(el) => Some(el),
            NodeKind::Text(_) => None,
        }
    }

    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut Element> {
        match &mut self.data_mut(id).ok()?.kind {
            NodeKind::Element(el) => Some(el),
            NodeKind::Text(_) => None,
        }
    }

    pub fn tag(&self, id: NodeId) -> Option<&Tag> {
        self.element(id).map(|el| &el.tag)
    }

    pub fn text(&self, id: NodeId) -> Option<&str> {
        match self.kind(id)? {
            NodeKind::Text(text) => Some(text),
            NodeKind::Element(_) => None,
        }
    }

    pub fn is_text(&self, id: NodeId) -> bool {
        self.text(id).is_some()
    }

    pub fn set_text(&mut self, id: NodeId, value: impl Into<String>) -> Result<(), TreeError> {
        match &mut self.data_mut(id)?.kind {
            NodeKind::Text(text) => {
                *text = value.into();
                Ok(())
            }
            NodeKind::Element(_) => Err(TreeError::NotText(id)),
        }
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.data(id).ok()?.parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.data(id).map(|d| d.children.as_slice()).unwrap_or(&[])
    }

    pub fn child(&self, parent: NodeId, index: usize) -> Option<NodeId> {
        self.children(parent).get(index).copied()
    }

    pub fn index_of(&self, id: NodeId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.children(parent).iter().position(|c| *c == id)
    }

    pub fn previous_sibling(&self, id: NodeId) -> Option<NodeId> {
        let ix = self.index_of(id)?;
        let parent = self.parent(id)?;
        ix.checked_sub(1).and_then(|ix| self.child(parent, ix))
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let ix = self.index_of(id)?;
        self.child(self.parent(id)?, ix + 1)
    }

    /// DOM "length": chars for text nodes, child count for elements.
    pub fn node_len(&self, id: NodeId) -> usize {
        match self.data(id) {
            Ok(NodeData {
                kind: NodeKind::Text(text),
                ..
            }) => text.chars().count(),
            Ok(data) => data.children.len(),
            Err(_) => 0,
        }
    }

    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            tree: self,
            next: self.parent(id),
        }
    }

    pub fn is_inclusive_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        ancestor == node || self.ancestors(node).any(|a| a == ancestor)
    }

    /// Descendants of `id` in document (pre-)order, excluding `id` itself.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(self.children(node).iter().rev().copied());
        }
        out
    }

    pub fn text_content(&self, id: NodeId) -> String {
        if let Some(text) = self.text(id) {
            return text.to_string();
        }
        self.descendants(id)
            .into_iter()
            .filter_map(|n| self.text(n))
            .collect()
    }

    /// Child indices leading from the topmost ancestor down to `id`.
    pub fn path(&self, id: NodeId) -> Vec<usize> {
        let mut path = Vec::new();
        let mut node = id;
        while let Some(ix) = self.index_of(node) {
            path.push(ix);
            match self.parent(node) {
                Some(parent) => node = parent,
                None => break,
            }
        }
        path.reverse();
        path
    }

    pub fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        reference: Option<NodeId>,
    ) -> Result<(), TreeError> {
        if !matches!(self.data(parent)?.kind, NodeKind::Element(_)) {
            return Err(TreeError::NotAContainer(parent));
        }
        self.data(child)?;
        if self.is_inclusive_ancestor(child, parent) {
            return Err(TreeError::HierarchyRequest { parent, child });
        }
        if let Some(reference) = reference {
            if reference == child {
                return Ok(());
            }
            if self.parent(reference) != Some(parent) {
                return Err(TreeError::NotAChild {
                    parent,
                    child: reference,
                });
            }
        }

        self.detach(child)?;
        let index = match reference {
            Some(reference) => self
                .children(parent)
                .iter()
                .position(|c| *c == reference)
                .ok_or(TreeError::NotAChild {
                    parent,
                    child: reference,
                })?,
            None => self.children(parent).len(),
        };
        self.data_mut(parent)?.children.insert(index, child);
        self.data_mut(child)?.parent = Some(parent);
        Ok(())
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), TreeError> {
        self.insert_before(parent, child, None)
    }

    /// Inserts `child` so that it ends up at `index` among `parent`'s current children.
    pub fn insert_at(&mut self, parent: NodeId, index: usize, child: NodeId) -> Result<(), TreeError> {
        let reference = self.child(parent, index);
        self.insert_before(parent, child, reference)
    }

    /// Detaches `id` from its parent. The node stays addressable.
    pub fn remove(&mut self, id: NodeId) -> Result<(), TreeError> {
        self.detach(id)
    }

    fn detach(&mut self, id: NodeId) -> Result<(), TreeError> {
        let Some(parent) = self.data(id)?.parent else {
            return Ok(());
        };
        self.data_mut(parent)?.children.retain(|c| *c != id);
        self.data_mut(id)?.parent = None;
        Ok(())
    }

    /// Detaches `id` and frees it together with its whole subtree.
    pub fn discard(&mut self, id: NodeId) -> Result<(), TreeError> {
        self.detach(id)?;
        let mut doomed = self.descendants(id);
        doomed.push(id);
        for node in doomed {
            if let Some(slot) = self.nodes.get_mut(node.0) {
                *slot = None;
            }
        }
        Ok(())
    }

    pub fn clone_shallow(&mut self, id: NodeId) -> Result<NodeId, TreeError> {
        let kind = self.data(id)?.kind.clone();
        Ok(self.push(kind))
    }

    /// Splits a text node at a char offset. The node keeps the head; the
    /// returned node holds the tail and is inserted right after it.
    pub fn split_text(&mut self, id: NodeId, offset: usize) -> Result<NodeId, TreeError> {
        let text = self.text(id).ok_or(TreeError::NotText(id))?;
        let len = text.chars().count();
        if offset > len {
            return Err(TreeError::OffsetOutOfBounds {
                node: id,
                offset,
                len,
            });
        }
        let at = byte_offset(text, offset);
        let head = text[..at].to_string();
        let tail = text[at..].to_string();

        self.set_text(id, head)?;
        let tail = self.create_text(tail);
        if let Some(parent) = self.parent(id) {
            let reference = self.next_sibling(id);
            self.insert_before(parent, tail, reference)?;
        }
        Ok(tail)
    }

    /// Appends the text of `next` to `prev` and frees `next`.
    pub fn merge_text(&mut self, prev: NodeId, next: NodeId) -> Result<(), TreeError> {
        let tail = self.text(next).ok_or(TreeError::NotText(next))?.to_string();
        match &mut self.data_mut(prev)?.kind {
            NodeKind::Text(text) => text.push_str(&tail),
            NodeKind::Element(_) => return Err(TreeError::NotText(prev)),
        }
        self.discard(next)
    }

    /// Wraps `node` in a new element placed where `node` used to be.
    pub fn wrap(&mut self, node: NodeId, element: Element) -> Result<NodeId, TreeError> {
        let parent = self.parent(node).ok_or(TreeError::Detached(node))?;
        let wrapper = self.create_element(element);
        self.insert_before(parent, wrapper, Some(node))?;
        self.append_child(wrapper, node)?;
        Ok(wrapper)
    }

    /// Splices `id` out of the tree, moving its children into its place.
    pub fn unwrap(&mut self, id: NodeId) -> Result<(), TreeError> {
        let parent = self.parent(id).ok_or(TreeError::Detached(id))?;
        for child in self.children(id).to_vec() {
            self.insert_before(parent, child, Some(id))?;
        }
        self.discard(id)
    }

    /// Splits every element between `node` and `ancestor` (inclusive) so that
    /// `ancestor` ends up holding only the branch leading to `node`. Preceding
    /// and following siblings move into shallow copies placed around it.
    pub fn isolate(&mut self, node: NodeId, ancestor: NodeId) -> Result<(), TreeError> {
        if node == ancestor || !self.is_inclusive_ancestor(ancestor, node) {
            return Err(TreeError::NotAChild {
                parent: ancestor,
                child: node,
            });
        }

        let mut child = node;
        loop {
            let parent = self.parent(child).ok_or(TreeError::Detached(child))?;
            let grand = self.parent(parent).ok_or(TreeError::Detached(parent))?;
            let siblings = self.children(parent).to_vec();
            let ix = siblings
                .iter()
                .position(|c| *c == child)
                .ok_or(TreeError::NotAChild { parent, child })?;

            if ix > 0 {
                let left = self.clone_shallow(parent)?;
                self.insert_before(grand, left, Some(parent))?;
                for sibling in &siblings[..ix] {
                    self.append_child(left, *sibling)?;
                }
            }
            if ix + 1 < siblings.len() {
                let right = self.clone_shallow(parent)?;
                let reference = self.next_sibling(parent);
                self.insert_before(grand, right, reference)?;
                for sibling in &siblings[ix + 1..] {
                    self.append_child(right, *sibling)?;
                }
            }

            if parent == ancestor {
                return Ok(());
            }
            child = parent;
        }
    }
}

pub struct Ancestors<'a> {
    tree: &'a DomTree,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.tree.parent(current);
        Some(current)
    }
}

pub(crate) fn byte_offset(text: &str, chars: usize) -> usize {
    text.char_indices()
        .nth(chars)
        .map(|(ix, _)| ix)
        .unwrap_or(text.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tag::InlineTag;

    fn paragraph(tree: &mut DomTree, parts: &[&str]) -> (NodeId, Vec<NodeId>) {
        let p = tree.create_element(Element::new("p"));
        let texts = parts
            .iter()
            .map(|part| {
                let t = tree.create_text(*part);
                tree.append_child(p, t).unwrap();
                t
            })
            .collect();
        (p, texts)
    }

    #[test]
    fn split_text_counts_chars_not_bytes() {
        let mut tree = DomTree::new();
        let (p, texts) = paragraph(&mut tree, &["héllo"]);
        let tail = tree.split_text(texts[0], 2).unwrap();
        assert_eq!(tree.text(texts[0]), Some("hé"));
        assert_eq!(tree.text(tail), Some("llo"));
        assert_eq!(tree.children(p), &[texts[0], tail]);
    }

    #[test]
    fn insert_rejects_cycles() {
        let mut tree = DomTree::new();
        let outer = tree.create_element(Element::new(InlineTag::B));
        let inner = tree.create_element(Element::new(InlineTag::I));
        tree.append_child(outer, inner).unwrap();
        assert_eq!(
            tree.append_child(inner, outer),
            Err(TreeError::HierarchyRequest {
                parent: inner,
                child: outer
            })
        );
    }

    #[test]
    fn unwrap_keeps_children_in_place() {
        let mut tree = DomTree::new();
        let (p, texts) = paragraph(&mut tree, &["a", "b", "c"]);
        let b = tree.wrap(texts[1], Element::new(InlineTag::B)).unwrap();
        assert_eq!(tree.children(p), &[texts[0], b, texts[2]]);
        tree.unwrap(b).unwrap();
        assert_eq!(tree.children(p), &[texts[0], texts[1], texts[2]]);
        assert!(!tree.contains(b));
    }

    #[test]
    fn isolate_splits_each_level_up_to_the_ancestor() {
        let mut tree = DomTree::new();
        let p = tree.create_element(Element::new("p"));
        let b = tree.create_element(Element::new(InlineTag::B));
        let i = tree.create_element(Element::new(InlineTag::I));
        tree.append_child(p, b).unwrap();
        tree.append_child(b, i).unwrap();
        let parts: Vec<_> = ["x", "y", "z"]
            .iter()
            .map(|s| {
                let t = tree.create_text(*s);
                tree.append_child(i, t).unwrap();
                t
            })
            .collect();

        tree.isolate(parts[1], b).unwrap();

        let top = tree.children(p).to_vec();
        assert_eq!(top.len(), 3);
        assert_eq!(top[1], b);
        assert_eq!(tree.text_content(b), "y");
        assert_eq!(tree.text_content(top[0]), "x");
        assert_eq!(tree.text_content(top[2]), "z");
        assert_eq!(tree.tag(top[0]), Some(&Tag::Inline(InlineTag::B)));
    }
}
