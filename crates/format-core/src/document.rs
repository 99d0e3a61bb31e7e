use crate::config::BlockRules;
use crate::dom::{DomTree, Element, NodeId};
use crate::error::{HtmlError, TreeError};
use crate::html;
use crate::range::{Affinity, Boundary, TextRange, boundary_at_char, char_offset};
use crate::tag::Tag;

/// The editable document: the node tree, its editor root and the live
/// selection, which stands in for the host's native selection.
#[derive(Debug, Clone)]
pub struct Document {
    tree: DomTree,
    root: NodeId,
    blocks: BlockRules,
    selection: Option<TextRange>,
    marker_seq: u64,
}

impl Default for Document {
    fn default() -> Self {
        Self::new(BlockRules::default())
    }
}

impl Document {
    pub fn new(blocks: BlockRules) -> Self {
        let mut tree = DomTree::new();
        let root = tree.create_element(Element::new("div").attr("contenteditable", "true"));
        Self {
            tree,
            root,
            blocks,
            selection: None,
            marker_seq: 0,
        }
    }

    pub fn from_html(source: &str) -> Result<Self, HtmlError> {
        Self::from_html_with(source, BlockRules::default())
    }

    pub fn from_html_with(source: &str, blocks: BlockRules) -> Result<Self, HtmlError> {
        let mut doc = Self::new(blocks);
        html::parse_into(&mut doc.tree, doc.root, source)?;
        Ok(doc)
    }

    /// Inner HTML of the editor root.
    pub fn to_html(&self) -> String {
        html::serialize_children(&self.tree, self.root)
    }

    pub fn tree(&self) -> &DomTree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut DomTree {
        &mut self.tree
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn blocks(&self) -> &BlockRules {
        &self.blocks
    }

    pub fn text(&self) -> String {
        self.tree.text_content(self.root)
    }

    pub fn selection(&self) -> Option<TextRange> {
        self.selection
    }

    pub fn set_selection(&mut self, range: Option<TextRange>) {
        self.selection = range.map(|r| TextRange::new(&self.tree, r.start, r.end));
    }

    /// Focus moved away from the document; the native selection is gone.
    pub fn blur(&mut self) {
        self.selection = None;
    }

    pub fn selected_text(&self) -> String {
        self.selection
            .map(|r| r.to_text(&self.tree))
            .unwrap_or_default()
    }

    /// Selects the first occurrence of `needle` in the document text.
    pub fn select_text(&mut self, needle: &str) -> bool {
        if needle.is_empty() {
            return false;
        }
        let text = self.text();
        let Some(at) = text.find(needle) else {
            return false;
        };
        let start = text[..at].chars().count();
        let end = start + needle.chars().count();
        self.selection = Some(TextRange {
            start: boundary_at_char(&self.tree, self.root, start, Affinity::Forward),
            end: boundary_at_char(&self.tree, self.root, end, Affinity::Backward),
        });
        true
    }

    pub fn is_block_boundary(&self, node: NodeId) -> bool {
        node == self.root
            || self
                .tree
                .element(node)
                .is_some_and(|el| self.blocks.is_block(el))
    }

    pub fn enclosing_block(&self, node: NodeId) -> NodeId {
        let mut current = Some(node);
        while let Some(n) = current {
            if self.is_block_boundary(n) {
                return n;
            }
            current = self.tree.parent(n);
        }
        self.root
    }

    /// Nearest element (starting at `node` itself) matching `pred`, without
    /// crossing the enclosing block boundary.
    pub fn find_enclosing(&self, node: NodeId, pred: impl Fn(&Element) -> bool) -> Option<NodeId> {
        let mut current = if self.tree.is_text(node) {
            self.tree.parent(node)
        } else {
            Some(node)
        };
        while let Some(n) = current {
            if self.is_block_boundary(n) {
                return None;
            }
            if self.tree.element(n).is_some_and(&pred) {
                return Some(n);
            }
            current = self.tree.parent(n);
        }
        None
    }

    /// The node the selection starts in, descending into the child an element
    /// boundary points at.
    pub fn anchor_node(&self) -> Option<NodeId> {
        let start = self.selection?.start;
        if self.tree.is_text(start.node) {
            return Some(start.node);
        }
        let Some(child) = self.tree.child(start.node, start.offset) else {
            return Some(start.node);
        };
        let first_text = self
            .tree
            .descendants(child)
            .into_iter()
            .find(|n| self.tree.is_text(*n));
        Some(first_text.unwrap_or(child))
    }

    /// Splits text nodes straddling the selection edges so both edges fall on
    /// node boundaries, and re-expresses the selection as element boundaries.
    pub fn split_selection_boundaries(&mut self) -> Result<Option<TextRange>, TreeError> {
        enum Edge {
            Before(NodeId),
            After(NodeId),
            At(Boundary),
        }

        let Some(range) = self.selection else {
            return Ok(None);
        };
        let tree = &mut self.tree;
        let text_len = |tree: &DomTree, node: NodeId| tree.text(node).map(|t| t.chars().count());

        let mut end = match text_len(tree, range.end.node) {
            Some(_) if range.end.offset == 0 => Edge::Before(range.end.node),
            Some(len) if range.end.offset >= len => Edge::After(range.end.node),
            Some(_) => {
                tree.split_text(range.end.node, range.end.offset)?;
                Edge::After(range.end.node)
            }
            None => Edge::At(range.end),
        };

        let start = match text_len(tree, range.start.node) {
            Some(_) if range.start.offset == 0 => Edge::Before(range.start.node),
            Some(len) if range.start.offset >= len => Edge::After(range.start.node),
            Some(_) => {
                let node = range.start.node;
                let tail = tree.split_text(node, range.start.offset)?;
                match &mut end {
                    Edge::After(end_node) if *end_node == node => *end_node = tail,
                    Edge::At(b) if tree.parent(node) == Some(b.node) => {
                        if tree.index_of(node).is_some_and(|ix| ix < b.offset) {
                            b.offset += 1;
                        }
                    }
                    _ => {}
                }
                Edge::Before(tail)
            }
            None => Edge::At(range.start),
        };

        let resolve = |tree: &DomTree, edge: Edge| match edge {
            Edge::Before(node) => Boundary::before(tree, node),
            Edge::After(node) => Boundary::after(tree, node),
            Edge::At(b) => Ok(b),
        };
        let split = TextRange {
            start: resolve(tree, start)?,
            end: resolve(tree, end)?,
        };
        self.selection = Some(split);
        Ok(Some(split))
    }

    pub(crate) fn next_marker_seq(&mut self) -> u64 {
        self.marker_seq += 1;
        self.marker_seq
    }

    /// Removes `node` and re-joins the text nodes it separated, keeping the
    /// live selection on the same characters.
    pub(crate) fn remove_tracked(&mut self, node: NodeId) -> Result<(), TreeError> {
        let parent = self.tree.parent(node).ok_or(TreeError::Detached(node))?;
        let ix = self.tree.index_of(node).ok_or(TreeError::Detached(node))?;

        let tree = &self.tree;
        adjust_selection(&mut self.selection, |b| {
            if tree.is_inclusive_ancestor(node, b.node) {
                *b = Boundary::new(parent, ix);
            } else if b.node == parent && b.offset > ix {
                b.offset -= 1;
            }
        });
        self.tree.discard(node)?;

        let Some(prev_ix) = ix.checked_sub(1) else {
            return Ok(());
        };
        let (Some(prev), Some(next)) = (self.tree.child(parent, prev_ix), self.tree.child(parent, ix))
        else {
            return Ok(());
        };
        if !(self.tree.is_text(prev) && self.tree.is_text(next)) {
            return Ok(());
        }
        let prev_len = self.tree.node_len(prev);
        adjust_selection(&mut self.selection, |b| {
            if b.node == next {
                *b = Boundary::new(prev, prev_len + b.offset);
            } else if b.node == parent && b.offset == ix {
                *b = Boundary::new(prev, prev_len);
            } else if b.node == parent && b.offset > ix {
                b.offset -= 1;
            }
        });
        self.tree.merge_text(prev, next)
    }

    /// Splices `node` out (keeping its children) while the live selection
    /// keeps pointing at the same positions.
    pub fn unwrap_element(&mut self, node: NodeId) -> Result<(), TreeError> {
        let parent = self.tree.parent(node).ok_or(TreeError::Detached(node))?;
        let ix = self.tree.index_of(node).ok_or(TreeError::Detached(node))?;
        let count = self.tree.children(node).len();

        adjust_selection(&mut self.selection, |b| {
            if b.node == node {
                *b = Boundary::new(parent, ix + b.offset);
            } else if b.node == parent && b.offset > ix {
                b.offset = b.offset + count - 1;
            }
        });
        self.tree.unwrap(node)
    }

    /// Tidies the block around `container`: drops empty text and empty inline
    /// elements, merges adjacent text nodes and adjacent identical mergeable
    /// tags. The live selection keeps covering the same characters.
    pub fn normalize_formatting(&mut self, container: NodeId) -> Result<(), TreeError> {
        let block = self.enclosing_block(container);
        let offsets = self.selection.map(|r| {
            (
                char_offset(&self.tree, self.root, r.start),
                char_offset(&self.tree, self.root, r.end),
            )
        });

        normalize_node(&mut self.tree, block)?;

        if let Some((start, end)) = offsets {
            let start_point = boundary_at_char(&self.tree, self.root, start, Affinity::Forward);
            let end_point = if start == end {
                start_point
            } else {
                boundary_at_char(&self.tree, self.root, end, Affinity::Backward)
            };
            self.selection = Some(TextRange {
                start: start_point,
                end: end_point,
            });
        }
        Ok(())
    }
}

fn adjust_selection(selection: &mut Option<TextRange>, mut f: impl FnMut(&mut Boundary)) {
    if let Some(range) = selection {
        f(&mut range.start);
        f(&mut range.end);
    }
}

fn normalize_node(tree: &mut DomTree, node: NodeId) -> Result<(), TreeError> {
    for child in tree.children(node).to_vec() {
        if tree.element(child).is_some() {
            normalize_node(tree, child)?;
        }
    }

    let mut ix = 0;
    while let Some(child) = tree.child(node, ix) {
        if is_disposable(tree, child) {
            tree.discard(child)?;
            continue;
        }
        if let Some(prev) = ix.checked_sub(1).and_then(|p| tree.child(node, p)) {
            if tree.is_text(prev) && tree.is_text(child) {
                tree.merge_text(prev, child)?;
                continue;
            }
            if is_mergeable_pair(tree, prev, child) {
                for grandchild in tree.children(child).to_vec() {
                    tree.append_child(prev, grandchild)?;
                }
                tree.discard(child)?;
                normalize_node(tree, prev)?;
                continue;
            }
        }
        ix += 1;
    }
    Ok(())
}

fn is_disposable(tree: &DomTree, node: NodeId) -> bool {
    match tree.text(node) {
        Some(text) => text.is_empty(),
        None => {
            tree.children(node).is_empty()
                && tree.tag(node).and_then(Tag::inline).is_some()
        }
    }
}

fn is_mergeable_pair(tree: &DomTree, a: NodeId, b: NodeId) -> bool {
    let (Some(a), Some(b)) = (tree.element(a), tree.element(b)) else {
        return false;
    };
    a.tag == b.tag && a.tag.inline().is_some_and(|t| t.is_mergeable()) && a.attrs == b.attrs
}
