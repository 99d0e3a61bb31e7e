use serde::{Deserialize, Serialize};

use crate::document::Document;
use crate::dom::{Element, NodeId};
use crate::error::TreeError;
use crate::range::{Boundary, TextRange};
use crate::tag::Tag;

/// Class carried by every selection boundary marker element.
pub const MARKER_CLASS: &str = "selection-boundary";

/// A saved selection, remembered as the ids of the marker elements inserted at
/// its boundaries. Survives focus changes because it lives in the tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionSnapshot {
    start_marker: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    end_marker: Option<String>,
}

impl SelectionSnapshot {
    pub fn marker_ids(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.start_marker.as_str()).chain(self.end_marker.as_deref())
    }
}

impl Document {
    /// Inserts boundary markers around the live selection. The live selection
    /// is moved to sit between the markers.
    pub fn save_selection(&mut self) -> Result<Option<SelectionSnapshot>, TreeError> {
        let Some(range) = self.selection() else {
            return Ok(None);
        };
        let seq = self.next_marker_seq();
        let collapsed = range.is_collapsed(self.tree());

        let end = if collapsed {
            None
        } else {
            let id = format!("{MARKER_CLASS}-{seq}-end");
            let node = self.insert_marker(range.end, &id)?;
            Some((id, node))
        };
        let start_id = format!("{MARKER_CLASS}-{seq}-start");
        let start_node = self.insert_marker(range.start, &start_id)?;

        let after_start = Boundary::after(self.tree(), start_node)?;
        let before_end = match &end {
            Some((_, node)) => Boundary::before(self.tree(), *node)?,
            None => after_start,
        };
        self.set_selection(Some(TextRange {
            start: after_start,
            end: before_end,
        }));

        log::trace!("inserted selection markers {start_id} (collapsed: {collapsed})");
        Ok(Some(SelectionSnapshot {
            start_marker: start_id,
            end_marker: end.map(|(id, _)| id),
        }))
    }

    /// Re-applies a snapshot to the live selection and removes its markers.
    /// Returns `false` when the markers are no longer in the document.
    pub fn restore_selection(&mut self, snapshot: &SelectionSnapshot) -> Result<bool, TreeError> {
        let start = self.find_marker(&snapshot.start_marker);
        let end = match &snapshot.end_marker {
            Some(id) => self.find_marker(id).map(Some),
            None => Some(None),
        };
        let (Some(start), Some(end)) = (start, end) else {
            log::warn!(
                "selection markers for {} vanished, snapshot cannot be restored",
                snapshot.start_marker
            );
            self.remove_markers(snapshot)?;
            return Ok(false);
        };

        let after_start = Boundary::after(self.tree(), start)?;
        let before_end = match end {
            Some(node) => Boundary::before(self.tree(), node)?,
            None => after_start,
        };
        self.set_selection(Some(TextRange {
            start: after_start,
            end: before_end,
        }));

        if let Some(end) = end {
            self.remove_tracked(end)?;
        }
        self.remove_tracked(start)?;
        Ok(true)
    }

    /// Drops a snapshot's markers without touching the live selection's meaning.
    pub fn remove_markers(&mut self, snapshot: &SelectionSnapshot) -> Result<(), TreeError> {
        for id in snapshot.marker_ids() {
            if let Some(node) = self.find_marker(id) {
                self.remove_tracked(node)?;
            }
        }
        Ok(())
    }

    /// Removes every marker element in the document, whoever left it behind.
    pub fn sweep_markers(&mut self) -> Result<usize, TreeError> {
        let markers = self.markers();
        for node in &markers {
            self.remove_tracked(*node)?;
        }
        if !markers.is_empty() {
            log::debug!("swept {} leftover selection markers", markers.len());
        }
        Ok(markers.len())
    }

    pub fn marker_count(&self) -> usize {
        self.markers().len()
    }

    fn markers(&self) -> Vec<NodeId> {
        let tree = self.tree();
        tree.descendants(self.root())
            .into_iter()
            .filter(|n| tree.element(*n).is_some_and(|el| el.has_class(MARKER_CLASS)))
            .collect()
    }

    fn find_marker(&self, id: &str) -> Option<NodeId> {
        let tree = self.tree();
        tree.descendants(self.root()).into_iter().find(|n| {
            tree.element(*n)
                .is_some_and(|el| el.has_class(MARKER_CLASS) && el.get_attr("id") == Some(id))
        })
    }

    fn insert_marker(&mut self, at: Boundary, id: &str) -> Result<NodeId, TreeError> {
        let tree = self.tree_mut();
        let marker = tree.create_element(
            Element::new(Tag::Span)
                .attr("id", id)
                .attr("class", MARKER_CLASS),
        );

        let Some(text) = tree.text(at.node) else {
            tree.insert_at(at.node, at.offset, marker)?;
            return Ok(marker);
        };
        let len = text.chars().count();
        let parent = tree.parent(at.node).ok_or(TreeError::Detached(at.node))?;
        if at.offset == 0 {
            tree.insert_before(parent, marker, Some(at.node))?;
        } else if at.offset >= len {
            let reference = tree.next_sibling(at.node);
            tree.insert_before(parent, marker, reference)?;
        } else {
            let tail = tree.split_text(at.node, at.offset)?;
            tree.insert_before(parent, marker, Some(tail))?;
        }
        Ok(marker)
    }
}
