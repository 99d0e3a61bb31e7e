use crate::document::Document;
use crate::error::ToolError;
use crate::range::TextRange;
use crate::store::SharedSelectionStore;
use crate::tag::InlineFormat;
use crate::toggle::FormatToggle;
use crate::tool::{InlineTool, Outcome, SanitizeConfig, ToolButton};
use crate::tools::FormatTool;

pub struct BoldTool {
    inner: FormatTool,
}

impl BoldTool {
    pub const ID: &'static str = "bold";

    pub fn new(store: SharedSelectionStore) -> Self {
        Self {
            inner: FormatTool::new(FormatToggle::new(InlineFormat::Bold), store),
        }
    }
}

impl InlineTool for BoldTool {
    fn id(&self) -> &'static str {
        Self::ID
    }

    fn title(&self) -> &'static str {
        "Bold"
    }

    fn shortcut(&self) -> Option<&'static str> {
        Some("CMD+B")
    }

    fn sanitize(&self) -> SanitizeConfig {
        SanitizeConfig::new().bare("b").bare("strong")
    }

    fn render(&self) -> ToolButton {
        self.inner.button(Self::ID, self.title(), "bold")
    }

    fn surround(
        &mut self,
        doc: &mut Document,
        range: Option<TextRange>,
    ) -> Result<Outcome, ToolError> {
        self.inner.surround(doc, range)
    }

    fn check_state(&mut self, doc: &mut Document) -> Result<bool, ToolError> {
        self.inner.check_state(doc)
    }

    fn clear(&mut self, doc: &mut Document) -> Result<(), ToolError> {
        self.inner.clear(doc)
    }
}
