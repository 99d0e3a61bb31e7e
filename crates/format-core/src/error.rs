use crate::dom::NodeId;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TreeError {
    #[error("node {0} does not exist")]
    UnknownNode(NodeId),
    #[error("node {0} has no parent")]
    Detached(NodeId),
    #[error("node {0} cannot hold children")]
    NotAContainer(NodeId),
    #[error("node {child} is not a child of {parent}")]
    NotAChild { parent: NodeId, child: NodeId },
    #[error("inserting {child} under {parent} would create a cycle")]
    HierarchyRequest { parent: NodeId, child: NodeId },
    #[error("offset {offset} is out of bounds for node {node} (length {len})")]
    OffsetOutOfBounds {
        node: NodeId,
        offset: usize,
        len: usize,
    },
    #[error("expected a text node, got {0}")]
    NotText(NodeId),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HtmlError {
    #[error("unterminated tag starting at byte {0}")]
    UnterminatedTag(usize),
    #[error("unexpected closing tag </{found}> at byte {at}")]
    UnexpectedClose { found: String, at: usize },
    #[error("unclosed element <{0}>")]
    Unclosed(String),
    #[error(transparent)]
    Tree(#[from] TreeError),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ToolError {
    #[error("unknown tool: {0}")]
    UnknownTool(String),
    #[error("duplicate tool id: {0}")]
    DuplicateTool(String),
    #[error("document tree is inconsistent: {0}")]
    Tree(#[from] TreeError),
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid tools config: {0}")]
    Json(#[from] serde_json::Error),
}
