use crate::document::Document;
use crate::error::ToolError;
use crate::range::TextRange;
use crate::store::SharedSelectionStore;
use crate::toggle::FormatToggle;
use crate::tool::{Outcome, SkipReason, ToolButton};

/// Shared body of the toggle tools: resolves the range through the store,
/// runs the toggle and reports button state.
pub struct FormatTool {
    toggle: FormatToggle,
    store: SharedSelectionStore,
    active: bool,
}

impl FormatTool {
    pub fn new(toggle: FormatToggle, store: SharedSelectionStore) -> Self {
        Self {
            toggle,
            store,
            active: false,
        }
    }

    pub fn button(&self, id: &str, title: &str, icon: &str) -> ToolButton {
        let mut button = ToolButton::new(id, title, icon);
        button.active = self.active;
        button
    }

    pub fn surround(
        &mut self,
        doc: &mut Document,
        range: Option<TextRange>,
    ) -> Result<Outcome, ToolError> {
        let mut store = self.store.borrow_mut();
        if !store.resolve(doc, range)? {
            log::debug!("{:?}: no selection available", self.toggle.format());
            return Ok(Outcome::skipped(SkipReason::NoSelection));
        }

        let change = self.toggle.apply(doc)?;
        store.clear(doc)?;
        Ok(match change {
            Some(change) => Outcome::Applied(change),
            None => Outcome::skipped(SkipReason::EmptySelection),
        })
    }

    /// Saves the selection for a later command, then reports whether the
    /// anchor sits inside the format.
    pub fn check_state(&mut self, doc: &mut Document) -> Result<bool, ToolError> {
        self.store.borrow_mut().try_save(doc)?;
        self.active = self.toggle.is_active(doc);
        Ok(self.active)
    }

    /// Drops the saved selection unless the user still has text selected.
    pub fn clear(&mut self, doc: &mut Document) -> Result<(), ToolError> {
        let selecting = doc
            .selection()
            .is_some_and(|range| !range.is_collapsed(doc.tree()));
        if !selecting {
            self.store.borrow_mut().clear(doc)?;
        }
        Ok(())
    }
}
