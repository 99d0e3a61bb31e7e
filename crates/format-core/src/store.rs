use std::cell::RefCell;
use std::rc::Rc;

use crate::config::SavePolicy;
use crate::document::Document;
use crate::error::TreeError;
use crate::range::TextRange;
use crate::snapshot::SelectionSnapshot;

/// Handle every tool receives at construction. Tools run on one thread and
/// never hold the borrow across calls.
pub type SharedSelectionStore = Rc<RefCell<SelectionStore>>;

/// Single slot holding the selection the user meant, across focus changes.
///
/// `EMPTY` when no snapshot is held, `HELD` otherwise. At most one snapshot's
/// markers exist in the document at any time.
#[derive(Debug, Default)]
pub struct SelectionStore {
    policy: SavePolicy,
    snapshot: Option<SelectionSnapshot>,
}

impl SelectionStore {
    pub fn new(policy: SavePolicy) -> Self {
        Self {
            policy,
            snapshot: None,
        }
    }

    pub fn shared(policy: SavePolicy) -> SharedSelectionStore {
        Rc::new(RefCell::new(Self::new(policy)))
    }

    pub fn policy(&self) -> SavePolicy {
        self.policy
    }

    pub fn has_saved(&self) -> bool {
        self.snapshot.is_some()
    }

    pub fn snapshot(&self) -> Option<&SelectionSnapshot> {
        self.snapshot.as_ref()
    }

    /// Captures the live selection. Does nothing for an absent or collapsed
    /// selection, and under [`SavePolicy::KeepExisting`] while a snapshot is held.
    pub fn try_save(&mut self, doc: &mut Document) -> Result<bool, TreeError> {
        let Some(range) = doc.selection() else {
            return Ok(false);
        };
        if range.is_collapsed(doc.tree()) {
            return Ok(false);
        }

        if let Some(held) = self.snapshot.take() {
            match self.policy {
                SavePolicy::KeepExisting => {
                    log::debug!("selection already saved, keeping it");
                    self.snapshot = Some(held);
                    return Ok(false);
                }
                SavePolicy::Replace => {
                    log::debug!("disposing previously saved selection before saving a new one");
                    doc.remove_markers(&held)?;
                }
            }
        }

        log::debug!("saving selection");
        self.snapshot = doc.save_selection()?;
        Ok(self.snapshot.is_some())
    }

    /// Applies the held snapshot to the live selection and empties the slot.
    pub fn try_restore(&mut self, doc: &mut Document) -> Result<bool, TreeError> {
        let Some(snapshot) = self.snapshot.take() else {
            log::error!("no saved selection to restore");
            return Ok(false);
        };
        log::debug!("restoring selection");
        doc.restore_selection(&snapshot)
    }

    /// Picks the range a command should act on and makes it the live
    /// selection: a fresh non-collapsed `range` wins (any held snapshot is
    /// dropped), otherwise the held snapshot is restored.
    pub fn resolve(
        &mut self,
        doc: &mut Document,
        range: Option<TextRange>,
    ) -> Result<bool, TreeError> {
        let fresh = range.filter(|r| is_usable(doc, r));
        let resolved = match fresh {
            Some(range) => {
                doc.set_selection(Some(range));
                self.clear(doc)?;
                true
            }
            None => self.try_restore(doc)?,
        };
        Ok(resolved && !doc.selected_text().is_empty())
    }

    /// Empties the slot and removes every marker left in the document.
    pub fn clear(&mut self, doc: &mut Document) -> Result<(), TreeError> {
        if let Some(snapshot) = self.snapshot.take() {
            log::debug!("clearing saved selection");
            doc.remove_markers(&snapshot)?;
        }
        doc.sweep_markers()?;
        Ok(())
    }
}

/// Both ends still attached under the root, and the range not collapsed.
pub(crate) fn is_usable(doc: &Document, range: &TextRange) -> bool {
    let tree = doc.tree();
    let attached = |node| tree.contains(node) && tree.is_inclusive_ancestor(doc.root(), node);
    attached(range.start.node) && attached(range.end.node) && !range.is_collapsed(tree)
}
