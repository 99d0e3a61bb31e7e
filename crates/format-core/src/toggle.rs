use crate::document::Document;
use crate::dom::{Element, NodeId};
use crate::error::TreeError;
use crate::range::NodeFilter;
use crate::tag::InlineFormat;
use crate::tool::Change;

/// All-or-nothing wrap/unwrap of the live selection in one inline format.
#[derive(Debug, Clone)]
pub struct FormatToggle {
    format: InlineFormat,
    wrapper: Element,
}

impl FormatToggle {
    pub fn new(format: InlineFormat) -> Self {
        Self {
            format,
            wrapper: Element::new(format.wrap_tag()),
        }
    }

    /// Uses `wrapper` (tag and attributes) for newly created elements.
    pub fn with_wrapper(format: InlineFormat, wrapper: Element) -> Self {
        Self { format, wrapper }
    }

    pub fn format(&self) -> InlineFormat {
        self.format
    }

    /// Nearest element carrying the format, up to the enclosing block.
    pub fn tagged_ancestor(&self, doc: &Document, node: NodeId) -> Option<NodeId> {
        doc.find_enclosing(node, |el| self.format.matches(&el.tag))
    }

    pub fn is_tagged(&self, doc: &Document, node: NodeId) -> bool {
        self.tagged_ancestor(doc, node).is_some()
    }

    /// State at the selection anchor.
    pub fn is_active(&self, doc: &Document) -> bool {
        doc.anchor_node()
            .is_some_and(|node| self.is_tagged(doc, node))
    }

    /// Toggles the live selection. Returns `None` when it holds no text.
    pub fn apply(&self, doc: &mut Document) -> Result<Option<Change>, TreeError> {
        if doc.split_selection_boundaries()?.is_none() {
            return Ok(None);
        }
        let Some(snapshot) = doc.save_selection()? else {
            return Ok(None);
        };

        let texts = selected_texts(doc);
        if texts.is_empty() {
            doc.restore_selection(&snapshot)?;
            return Ok(None);
        }

        let all_tagged = texts.iter().all(|n| self.is_tagged(doc, *n));
        let mut blocks: Vec<NodeId> = Vec::new();
        for node in &texts {
            let block = doc.enclosing_block(*node);
            if !blocks.contains(&block) {
                blocks.push(block);
            }
        }

        let change = if all_tagged {
            for node in &texts {
                while let Some(tagged) = self.tagged_ancestor(doc, *node) {
                    let tree = doc.tree_mut();
                    tree.isolate(*node, tagged)?;
                    tree.unwrap(tagged)?;
                }
            }
            log::debug!("removed {:?} from {} text nodes", self.format, texts.len());
            Change::Unwrapped {
                format: self.format,
                nodes: texts.len(),
            }
        } else {
            let mut wrapped = 0;
            for node in &texts {
                if !self.is_tagged(doc, *node) {
                    doc.tree_mut().wrap(*node, self.wrapper.clone())?;
                    wrapped += 1;
                }
            }
            log::debug!("applied {:?} to {wrapped} text nodes", self.format);
            Change::Wrapped {
                format: self.format,
                nodes: wrapped,
            }
        };

        doc.restore_selection(&snapshot)?;
        for block in blocks {
            doc.normalize_formatting(block)?;
        }
        Ok(Some(change))
    }
}

/// Non-empty text nodes fully inside the live selection.
pub(crate) fn selected_texts(doc: &Document) -> Vec<NodeId> {
    let Some(range) = doc.selection() else {
        return Vec::new();
    };
    let tree = doc.tree();
    range
        .contained_nodes(tree, NodeFilter::Text)
        .into_iter()
        .filter(|n| tree.text(*n).is_some_and(|t| !t.is_empty()))
        .collect()
}
