use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::document::Document;
use crate::error::ToolError;
use crate::range::TextRange;
use crate::tag::InlineFormat;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationStyle {
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub message: String,
    pub style: NotificationStyle,
}

impl Notification {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            style: NotificationStyle::Error,
        }
    }
}

/// What the hosting editor lends to its inline tools.
pub trait EditorApi {
    fn notify(&self, notification: Notification);
    fn close_toolbar(&self);
    fn close_inline_toolbar(&self);
    fn translate(&self, key: &str) -> String {
        key.to_string()
    }
}

pub type SharedEditorApi = Rc<dyn EditorApi>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ApiEvent {
    Notified(Notification),
    ToolbarClosed,
    InlineToolbarClosed,
}

/// An [`EditorApi`] with no chrome behind it; remembers every call.
#[derive(Debug, Default)]
pub struct RecordingApi {
    events: RefCell<Vec<ApiEvent>>,
}

impl RecordingApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ApiEvent> {
        self.events.borrow().clone()
    }

    pub fn take_events(&self) -> Vec<ApiEvent> {
        std::mem::take(&mut *self.events.borrow_mut())
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.events
            .borrow()
            .iter()
            .filter_map(|event| match event {
                ApiEvent::Notified(n) => Some(n.clone()),
                _ => None,
            })
            .collect()
    }
}

impl EditorApi for RecordingApi {
    fn notify(&self, notification: Notification) {
        log::debug!("notify ({:?}): {}", notification.style, notification.message);
        self.events
            .borrow_mut()
            .push(ApiEvent::Notified(notification));
    }

    fn close_toolbar(&self) {
        self.events.borrow_mut().push(ApiEvent::ToolbarClosed);
    }

    fn close_inline_toolbar(&self) {
        self.events.borrow_mut().push(ApiEvent::InlineToolbarClosed);
    }
}

/// Toolbar control state handed to the host by `render` and `check_state`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolButton {
    pub id: String,
    pub title: String,
    pub icon: String,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub unlink: bool,
}

impl ToolButton {
    pub fn new(id: impl Into<String>, title: impl Into<String>, icon: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            icon: icon.into(),
            active: false,
            unlink: false,
        }
    }
}

/// The auxiliary input shown beneath the toolbar.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkActions {
    pub open: bool,
    pub value: String,
    pub placeholder: String,
}

/// Input the host forwards from a tool's action surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", content = "value", rename_all = "snake_case")]
pub enum ActionEvent {
    SetValue(String),
    Apply,
    Remove,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// No range was supplied and nothing was saved.
    NoSelection,
    /// The range holds no text.
    EmptySelection,
    NoLinkToRemove,
    /// A link cannot hold more than one block.
    CrossesBlocks,
    /// The tool has no action surface.
    NoActions,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "change", rename_all = "snake_case")]
pub enum Change {
    Wrapped { format: InlineFormat, nodes: usize },
    Unwrapped { format: InlineFormat, nodes: usize },
    Linked { href: String },
    LinkUpdated { href: String },
    Unlinked,
    Cleared { elements: usize },
    InputOpened,
    InputClosed,
    InputChanged,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    Applied(Change),
    Skipped { reason: SkipReason },
    /// User input was refused; the host has already been notified.
    Rejected { message: String },
}

impl Outcome {
    pub fn skipped(reason: SkipReason) -> Self {
        Outcome::Skipped { reason }
    }

    pub fn is_applied(&self) -> bool {
        matches!(self, Outcome::Applied(_))
    }
}

/// Attribute policy inside a [`TagRule`]: keep whatever value is present, or
/// force a fixed value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrRule {
    Keep(bool),
    Value(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TagRule {
    /// `true` keeps the tag with all its attributes.
    Allow(bool),
    Attrs(BTreeMap<String, AttrRule>),
}

/// Descriptor telling the host which tags survive output. Not enforced here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SanitizeConfig {
    pub tags: BTreeMap<String, TagRule>,
}

impl SanitizeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allow(mut self, tag: &str) -> Self {
        self.tags.insert(tag.to_string(), TagRule::Allow(true));
        self
    }

    /// Tag kept, attributes stripped.
    pub fn bare(mut self, tag: &str) -> Self {
        self.tags
            .insert(tag.to_string(), TagRule::Attrs(BTreeMap::new()));
        self
    }

    pub fn with_attrs<'a>(
        mut self,
        tag: &str,
        attrs: impl IntoIterator<Item = (&'a str, AttrRule)>,
    ) -> Self {
        let attrs = attrs
            .into_iter()
            .map(|(name, rule)| (name.to_string(), rule))
            .collect();
        self.tags.insert(tag.to_string(), TagRule::Attrs(attrs));
        self
    }

    /// Union of two descriptors. `true` beats an attribute list; attribute
    /// lists are merged key by key with `other` winning conflicts.
    pub fn merge(&mut self, other: &SanitizeConfig) {
        for (tag, rule) in &other.tags {
            let merged = match (self.tags.remove(tag), rule) {
                (None, rule) => rule.clone(),
                (Some(TagRule::Allow(true)), _) | (_, TagRule::Allow(true)) => TagRule::Allow(true),
                (Some(TagRule::Attrs(mut mine)), TagRule::Attrs(theirs)) => {
                    mine.extend(theirs.iter().map(|(k, v)| (k.clone(), v.clone())));
                    TagRule::Attrs(mine)
                }
                (Some(mine), TagRule::Allow(false)) => mine,
                (Some(TagRule::Allow(false)), theirs) => theirs.clone(),
            };
            self.tags.insert(tag.clone(), merged);
        }
    }

    pub fn allows(&self, tag: &str) -> bool {
        match self.tags.get(tag) {
            Some(TagRule::Allow(allowed)) => *allowed,
            Some(TagRule::Attrs(_)) => true,
            None => false,
        }
    }
}

/// Lifecycle every inline formatting tool implements for the host editor.
pub trait InlineTool {
    fn id(&self) -> &'static str;
    fn title(&self) -> &'static str;
    fn shortcut(&self) -> Option<&'static str> {
        None
    }
    fn sanitize(&self) -> SanitizeConfig;
    fn render(&self) -> ToolButton;
    fn render_actions(&self) -> Option<LinkActions> {
        None
    }

    /// Runs the tool on `range`, the host's best guess at the current range.
    fn surround(
        &mut self,
        doc: &mut Document,
        range: Option<TextRange>,
    ) -> Result<Outcome, ToolError>;

    /// Whether the selection sits inside this tool's formatting.
    fn check_state(&mut self, doc: &mut Document) -> Result<bool, ToolError>;

    fn clear(&mut self, doc: &mut Document) -> Result<(), ToolError>;

    fn handle_action(
        &mut self,
        _doc: &mut Document,
        _event: ActionEvent,
    ) -> Result<Outcome, ToolError> {
        Ok(Outcome::skipped(SkipReason::NoActions))
    }
}
