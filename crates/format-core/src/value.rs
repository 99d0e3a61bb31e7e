use serde::{Deserialize, Serialize};

use crate::config::BlockRules;
use crate::document::Document;
use crate::dom::{Attrs, DomTree, Element, NodeId, NodeKind};
use crate::error::TreeError;
use crate::tag::Tag;

const DEFAULT_SCHEMA: &str = "inline-format";
const DEFAULT_VERSION: u32 = 1;

fn default_schema() -> String {
    DEFAULT_SCHEMA.to_string()
}

fn default_version() -> u32 {
    DEFAULT_VERSION
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NodeValue {
    Element {
        tag: Tag,
        #[serde(default, skip_serializing_if = "Attrs::is_empty")]
        attrs: Attrs,
        #[serde(default)]
        children: Vec<NodeValue>,
    },
    Text {
        text: String,
    },
}

impl NodeValue {
    pub fn text(text: impl Into<String>) -> Self {
        NodeValue::Text { text: text.into() }
    }

    pub fn element(tag: impl Into<Tag>, children: Vec<NodeValue>) -> Self {
        NodeValue::Element {
            tag: tag.into(),
            attrs: Attrs::new(),
            children,
        }
    }

    fn from_tree(tree: &DomTree, node: NodeId) -> Option<Self> {
        match tree.kind(node)? {
            NodeKind::Text(text) => Some(NodeValue::text(text.as_str())),
            NodeKind::Element(el) => Some(NodeValue::Element {
                tag: el.tag.clone(),
                attrs: el.attrs.clone(),
                children: tree
                    .children(node)
                    .iter()
                    .filter_map(|child| Self::from_tree(tree, *child))
                    .collect(),
            }),
        }
    }

    fn build(&self, tree: &mut DomTree, parent: NodeId) -> Result<(), TreeError> {
        match self {
            NodeValue::Text { text } => {
                let node = tree.create_text(text.as_str());
                tree.append_child(parent, node)
            }
            NodeValue::Element {
                tag,
                attrs,
                children,
            } => {
                let node = tree.create_element(Element {
                    tag: tag.clone(),
                    attrs: attrs.clone(),
                });
                tree.append_child(parent, node)?;
                for child in children {
                    child.build(tree, node)?;
                }
                Ok(())
            }
        }
    }
}

/// Versioned JSON form of a document's contents. The live selection is not
/// part of the value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentValue {
    #[serde(default = "default_schema")]
    pub schema: String,
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub children: Vec<NodeValue>,
}

impl DocumentValue {
    pub fn from_document(doc: &Document) -> Self {
        let tree = doc.tree();
        Self {
            schema: default_schema(),
            version: default_version(),
            children: tree
                .children(doc.root())
                .iter()
                .filter_map(|child| NodeValue::from_tree(tree, *child))
                .collect(),
        }
    }

    pub fn to_document(&self, blocks: BlockRules) -> Result<Document, TreeError> {
        let mut doc = Document::new(blocks);
        let root = doc.root();
        for child in &self.children {
            child.build(doc.tree_mut(), root)?;
        }
        Ok(doc)
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json_str(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}
