use std::collections::HashMap;

use crate::config::ToolsConfig;
use crate::document::Document;
use crate::error::ToolError;
use crate::range::TextRange;
use crate::store::{SelectionStore, SharedSelectionStore};
use crate::tool::{ActionEvent, InlineTool, Outcome, SanitizeConfig, SharedEditorApi, ToolButton};
use crate::tools::{BoldTool, ClearFormatTool, ItalicTool, LinkTool, MarkerTool};

/// The inline tools of one editor, sharing one selection store.
pub struct ToolRegistry {
    store: SharedSelectionStore,
    tools: Vec<Box<dyn InlineTool>>,
    by_id: HashMap<&'static str, usize>,
}

impl ToolRegistry {
    pub fn new(store: SharedSelectionStore) -> Self {
        Self {
            store,
            tools: Vec::new(),
            by_id: HashMap::new(),
        }
    }

    /// Bold, italic, marker, link and clear-format wired to a fresh store.
    pub fn standard(config: &ToolsConfig, api: SharedEditorApi) -> Result<Self, ToolError> {
        let store = SelectionStore::shared(config.save_policy);
        let tools: Vec<Box<dyn InlineTool>> = vec![
            Box::new(BoldTool::new(store.clone())),
            Box::new(ItalicTool::new(store.clone())),
            Box::new(MarkerTool::new(store.clone(), config.marker_class.as_str())),
            Box::new(LinkTool::new(store.clone(), api, config.link.clone())),
            Box::new(ClearFormatTool::new(store.clone(), config.link.clone())),
        ];
        let mut registry = Self::new(store);
        for tool in tools {
            registry.register(tool)?;
        }
        Ok(registry)
    }

    pub fn register(&mut self, tool: Box<dyn InlineTool>) -> Result<(), ToolError> {
        let id = tool.id();
        if self.by_id.contains_key(id) {
            return Err(ToolError::DuplicateTool(id.to_string()));
        }
        self.by_id.insert(id, self.tools.len());
        self.tools.push(tool);
        Ok(())
    }

    pub fn store(&self) -> &SharedSelectionStore {
        &self.store
    }

    pub fn ids(&self) -> Vec<&'static str> {
        self.tools.iter().map(|tool| tool.id()).collect()
    }

    pub fn tool(&self, id: &str) -> Option<&dyn InlineTool> {
        let ix = *self.by_id.get(id)?;
        self.tools.get(ix).map(|tool| tool.as_ref())
    }

    fn tool_mut(&mut self, id: &str) -> Result<&mut Box<dyn InlineTool>, ToolError> {
        let ix = *self
            .by_id
            .get(id)
            .ok_or_else(|| ToolError::UnknownTool(id.to_string()))?;
        self.tools
            .get_mut(ix)
            .ok_or_else(|| ToolError::UnknownTool(id.to_string()))
    }

    /// Tool id bound to a shortcut such as `CMD+B`. Matching ignores case
    /// and spaces.
    pub fn tool_for_shortcut(&self, shortcut: &str) -> Option<&'static str> {
        let wanted = canonical_shortcut(shortcut);
        self.tools
            .iter()
            .find(|tool| tool.shortcut().map(canonical_shortcut).as_deref() == Some(wanted.as_str()))
            .map(|tool| tool.id())
    }

    pub fn surround(
        &mut self,
        id: &str,
        doc: &mut Document,
        range: Option<TextRange>,
    ) -> Result<Outcome, ToolError> {
        log::trace!("surround {id}");
        self.tool_mut(id)?.surround(doc, range)
    }

    pub fn check_state(&mut self, id: &str, doc: &mut Document) -> Result<bool, ToolError> {
        self.tool_mut(id)?.check_state(doc)
    }

    /// Polls every tool, in registration order, as the host does when the
    /// inline toolbar opens.
    pub fn check_states(&mut self, doc: &mut Document) -> Result<Vec<(&'static str, bool)>, ToolError> {
        let mut states = Vec::with_capacity(self.tools.len());
        for tool in &mut self.tools {
            states.push((tool.id(), tool.check_state(doc)?));
        }
        Ok(states)
    }

    pub fn clear(&mut self, id: &str, doc: &mut Document) -> Result<(), ToolError> {
        self.tool_mut(id)?.clear(doc)
    }

    /// Tears down every tool context, as when the inline toolbar closes.
    pub fn clear_all(&mut self, doc: &mut Document) -> Result<(), ToolError> {
        for tool in &mut self.tools {
            tool.clear(doc)?;
        }
        Ok(())
    }

    pub fn handle_action(
        &mut self,
        id: &str,
        doc: &mut Document,
        event: ActionEvent,
    ) -> Result<Outcome, ToolError> {
        self.tool_mut(id)?.handle_action(doc, event)
    }

    pub fn buttons(&self) -> Vec<ToolButton> {
        self.tools.iter().map(|tool| tool.render()).collect()
    }

    pub fn sanitize(&self) -> SanitizeConfig {
        let mut merged = SanitizeConfig::new();
        for tool in &self.tools {
            merged.merge(&tool.sanitize());
        }
        merged
    }
}

fn canonical_shortcut(shortcut: &str) -> String {
    shortcut
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_ascii_uppercase()
}
