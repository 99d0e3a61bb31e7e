use crate::document::Document;
use crate::error::ToolError;
use crate::range::TextRange;
use crate::store::SharedSelectionStore;
use crate::tag::InlineFormat;
use crate::toggle::FormatToggle;
use crate::tool::{InlineTool, Outcome, SanitizeConfig, ToolButton};
use crate::tools::FormatTool;

pub struct ItalicTool {
    inner: FormatTool,
}

impl ItalicTool {
    pub const ID: &'static str = "italic";

    pub fn new(store: SharedSelectionStore) -> Self {
        Self {
            inner: FormatTool::new(FormatToggle::new(InlineFormat::Italic), store),
        }
    }
}

impl InlineTool for ItalicTool {
    fn id(&self) -> &'static str {
        Self::ID
    }

    fn title(&self) -> &'static str {
        "Italic"
    }

    fn shortcut(&self) -> Option<&'static str> {
        Some("CMD+I")
    }

    fn sanitize(&self) -> SanitizeConfig {
        SanitizeConfig::new().bare("i").bare("em")
    }

    fn render(&self) -> ToolButton {
        self.inner.button(Self::ID, self.title(), "italic")
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
