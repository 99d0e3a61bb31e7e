use crate::clear_format::clear_formatting;
use crate::config::LinkConfig;
use crate::document::Document;
use crate::error::ToolError;
use crate::range::TextRange;
use crate::store::SharedSelectionStore;
use crate::tag::InlineTag;
use crate::tool::{AttrRule, InlineTool, Outcome, SanitizeConfig, SkipReason, ToolButton};

pub struct ClearFormatTool {
    store: SharedSelectionStore,
    link: LinkConfig,
}

impl ClearFormatTool {
    pub const ID: &'static str = "clear_format";

    pub fn new(store: SharedSelectionStore, link: LinkConfig) -> Self {
        Self { store, link }
    }
}

impl InlineTool for ClearFormatTool {
    fn id(&self) -> &'static str {
        Self::ID
    }

    fn title(&self) -> &'static str {
        "Clear Format"
    }

    fn shortcut(&self) -> Option<&'static str> {
        Some("CMD+\\")
    }

    /// Clearing keeps links, so their attributes stay allowed.
    fn sanitize(&self) -> SanitizeConfig {
        let mut config = InlineTag::ALL
            .iter()
            .filter(|tag| tag.is_clearable())
            .fold(SanitizeConfig::new(), |config, tag| config.bare(tag.as_str()));
        config.merge(&SanitizeConfig::new().with_attrs(
            InlineTag::A.as_str(),
            [
                ("href", AttrRule::Keep(true)),
                ("target", AttrRule::Value(self.link.target.clone())),
                ("rel", AttrRule::Value(self.link.rel.clone())),
            ],
        ));
        config
    }

    fn render(&self) -> ToolButton {
        ToolButton::new(Self::ID, self.title(), "clear-format")
    }

    fn surround(
        &mut self,
        doc: &mut Document,
        range: Option<TextRange>,
    ) -> Result<Outcome, ToolError> {
        let mut store = self.store.borrow_mut();
        if !store.resolve(doc, range)? {
            log::debug!("clear format: no selection available");
            return Ok(Outcome::skipped(SkipReason::NoSelection));
        }

        let change = clear_formatting(doc)?;
        store.clear(doc)?;
        Ok(match change {
            Some(change) => Outcome::Applied(change),
            None => Outcome::skipped(SkipReason::EmptySelection),
        })
    }

    /// Never shown as active; only keeps the selection for a later click.
    fn check_state(&mut self, doc: &mut Document) -> Result<bool, ToolError> {
        self.store.borrow_mut().try_save(doc)?;
        Ok(false)
    }

    fn clear(&mut self, doc: &mut Document) -> Result<(), ToolError> {
        let selecting = doc
            .selection()
            .is_some_and(|range| !range.is_collapsed(doc.tree()));
        if !selecting {
            self.store.borrow_mut().clear(doc)?;
        }
        Ok(())
    }
}
