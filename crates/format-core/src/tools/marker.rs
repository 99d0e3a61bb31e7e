use crate::document::Document;
use crate::dom::Element;
use crate::error::ToolError;
use crate::range::TextRange;
use crate::store::SharedSelectionStore;
use crate::tag::InlineFormat;
use crate::toggle::FormatToggle;
use crate::tool::{AttrRule, InlineTool, Outcome, SanitizeConfig, ToolButton};
use crate::tools::FormatTool;

/// Highlights text with `<mark class="...">`.
pub struct MarkerTool {
    inner: FormatTool,
    class: String,
}

impl MarkerTool {
    pub const ID: &'static str = "marker";

    pub fn new(store: SharedSelectionStore, class: impl Into<String>) -> Self {
        let class = class.into();
        let wrapper = Element::new(InlineFormat::Marker.wrap_tag()).attr("class", class.as_str());
        Self {
            inner: FormatTool::new(
                FormatToggle::with_wrapper(InlineFormat::Marker, wrapper),
                store,
            ),
            class,
        }
    }
}

impl InlineTool for MarkerTool {
    fn id(&self) -> &'static str {
        Self::ID
    }

    fn title(&self) -> &'static str {
        "Marker"
    }

    fn shortcut(&self) -> Option<&'static str> {
        Some("CMD+SHIFT+M")
    }

    fn sanitize(&self) -> SanitizeConfig {
        SanitizeConfig::new().with_attrs("mark", [("class", AttrRule::Value(self.class.clone()))])
    }

    fn render(&self) -> ToolButton {
        self.inner.button(Self::ID, self.title(), "marker")
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
