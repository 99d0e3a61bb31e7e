use crate::config::LinkConfig;
use crate::document::Document;
use crate::error::ToolError;
use crate::link::{
    enclosing_anchor, insert_link, normalize_url, spans_blocks, unlink, validate_url,
};
use crate::range::TextRange;
use crate::store::{SharedSelectionStore, is_usable};
use crate::tag::InlineTag;
use crate::tool::{
    ActionEvent, AttrRule, Change, InlineTool, LinkActions, Notification, Outcome, SanitizeConfig,
    SharedEditorApi, SkipReason, ToolButton,
};

pub const INVALID_LINK_MESSAGE: &str = "Pasted link is not valid.";

/// Link tool. Activation only opens the URL input; the link is created when
/// the input is applied, and removed through its unlink action.
pub struct LinkTool {
    store: SharedSelectionStore,
    api: SharedEditorApi,
    config: LinkConfig,
    actions: LinkActions,
    active: bool,
}

impl LinkTool {
    pub const ID: &'static str = "link";

    pub fn new(store: SharedSelectionStore, api: SharedEditorApi, config: LinkConfig) -> Self {
        let placeholder = api.translate("Add a link");
        Self {
            store,
            api,
            config,
            actions: LinkActions {
                open: false,
                value: String::new(),
                placeholder,
            },
            active: false,
        }
    }

    pub fn actions(&self) -> &LinkActions {
        &self.actions
    }

    pub fn set_input_value(&mut self, value: impl Into<String>) {
        self.actions.value = value.into();
    }

    /// Opening with focus moves focus into the input, so the document loses
    /// its live selection.
    fn open_actions(&mut self, doc: &mut Document, focus: bool) {
        self.actions.open = true;
        if focus {
            doc.blur();
        }
    }

    fn close_actions(&mut self) {
        self.actions.open = false;
        self.actions.value.clear();
    }

    /// Enter in the input, or the apply button.
    pub fn apply(&mut self, doc: &mut Document) -> Result<Outcome, ToolError> {
        let value = self.actions.value.clone();

        if value.trim().is_empty() {
            self.store.borrow_mut().try_restore(doc)?;
            if let Some(anchor) = enclosing_anchor(doc) {
                let whole = TextRange::select_node(doc.tree(), anchor)?;
                doc.set_selection(Some(whole));
            }
            let removed = unlink(doc)?;
            self.close_actions();
            return Ok(match removed {
                Some(_) => Outcome::Applied(Change::Unlinked),
                None => Outcome::skipped(SkipReason::NoLinkToRemove),
            });
        }

        if !validate_url(&value) {
            log::debug!("rejected link input {value:?}");
            self.api.notify(Notification::error(INVALID_LINK_MESSAGE));
            return Ok(Outcome::Rejected {
                message: INVALID_LINK_MESSAGE.to_string(),
            });
        }

        let href = normalize_url(&value, &self.config.default_scheme);
        let mut store = self.store.borrow_mut();
        store.try_restore(doc)?;
        if doc.selection().is_none() {
            return Ok(Outcome::skipped(SkipReason::NoSelection));
        }
        if spans_blocks(doc) {
            drop(store);
            self.close_actions();
            return Ok(Outcome::skipped(SkipReason::CrossesBlocks));
        }

        let Some(change) = insert_link(doc, &href, &self.config)? else {
            return Ok(Outcome::skipped(SkipReason::EmptySelection));
        };
        if matches!(change, Change::Linked { .. }) {
            // The next toggle tool acts on the new anchor's contents.
            store.clear(doc)?;
            store.try_save(doc)?;
        }
        drop(store);

        if let Some(range) = doc.selection() {
            doc.set_selection(Some(range.collapse_to_end()));
        }
        self.close_actions();
        self.api.close_inline_toolbar();
        Ok(Outcome::Applied(change))
    }

    /// The X button: unlinks the whole anchor around the selection.
    pub fn remove_link(&mut self, doc: &mut Document) -> Result<Outcome, ToolError> {
        if doc.selection().is_none() {
            self.store.borrow_mut().try_restore(doc)?;
        }
        let Some(anchor) = enclosing_anchor(doc) else {
            return Ok(Outcome::skipped(SkipReason::NoLinkToRemove));
        };

        let expanded = TextRange::select_node(doc.tree(), anchor)?;
        doc.set_selection(Some(expanded));
        doc.unwrap_element(anchor)?;
        log::debug!("removed link around the selection");

        self.close_actions();
        self.check_state(doc)?;
        self.api.close_toolbar();
        Ok(Outcome::Applied(Change::Unlinked))
    }
}

impl InlineTool for LinkTool {
    fn id(&self) -> &'static str {
        Self::ID
    }

    fn title(&self) -> &'static str {
        "Link"
    }

    fn shortcut(&self) -> Option<&'static str> {
        Some("CMD+K")
    }

    fn sanitize(&self) -> SanitizeConfig {
        let config = SanitizeConfig::new().with_attrs(
            InlineTag::A.as_str(),
            [
                ("href", AttrRule::Keep(true)),
                ("target", AttrRule::Value(self.config.target.clone())),
                ("rel", AttrRule::Value(self.config.rel.clone())),
            ],
        );
        ["b", "strong", "i", "em", "mark", "u", "code"]
            .into_iter()
            .fold(config, |config, tag| config.allow(tag))
    }

    fn render(&self) -> ToolButton {
        let mut button = ToolButton::new(Self::ID, self.title(), "link");
        if self.active {
            button.icon = "unlink".to_string();
            button.active = true;
            button.unlink = true;
        }
        button
    }

    fn render_actions(&self) -> Option<LinkActions> {
        Some(self.actions.clone())
    }

    /// Keeps the selection in the store while the input holds focus.
    fn surround(
        &mut self,
        doc: &mut Document,
        range: Option<TextRange>,
    ) -> Result<Outcome, ToolError> {
        if let Some(range) = range.filter(|r| is_usable(doc, r)) {
            doc.set_selection(Some(range));
        }
        self.store.borrow_mut().try_save(doc)?;

        if self.actions.open {
            self.close_actions();
            Ok(Outcome::Applied(Change::InputClosed))
        } else {
            self.open_actions(doc, true);
            Ok(Outcome::Applied(Change::InputOpened))
        }
    }

    /// Inside a link the input opens without focus, prefilled with the href.
    fn check_state(&mut self, doc: &mut Document) -> Result<bool, ToolError> {
        let anchor = enclosing_anchor(doc);
        self.active = anchor.is_some();
        if let Some(anchor) = anchor {
            self.open_actions(doc, false);
            let href = doc
                .tree()
                .element(anchor)
                .and_then(|el| el.get_attr("href"))
                .filter(|href| *href != "null")
                .unwrap_or_default();
            self.actions.value = href.to_string();
        }
        Ok(self.active)
    }

    /// Only closes the input; the store is left for whoever needs it next.
    fn clear(&mut self, _doc: &mut Document) -> Result<(), ToolError> {
        self.close_actions();
        Ok(())
    }

    fn handle_action(
        &mut self,
        doc: &mut Document,
        event: ActionEvent,
    ) -> Result<Outcome, ToolError> {
        match event {
            ActionEvent::SetValue(value) => {
                self.set_input_value(value);
                Ok(Outcome::Applied(Change::InputChanged))
            }
            ActionEvent::Apply => self.apply(doc),
            ActionEvent::Remove => self.remove_link(doc),
        }
    }
}
