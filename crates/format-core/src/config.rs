use serde::{Deserialize, Serialize};

use crate::dom::Element;
use crate::error::ConfigError;
use crate::tag::{BlockTag, Tag};

/// What the selection store does when asked to save while it already holds a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SavePolicy {
    /// Dispose the held snapshot's markers and save the fresh selection.
    #[default]
    Replace,
    /// Ignore the request until the held snapshot is restored or cleared.
    KeepExisting,
}

/// Elements that stop upward ancestor walks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlockRules {
    pub tags: Vec<BlockTag>,
    pub classes: Vec<String>,
}

impl Default for BlockRules {
    fn default() -> Self {
        Self {
            tags: BlockTag::ALL.to_vec(),
            classes: vec!["ce-paragraph".to_string()],
        }
    }
}

impl BlockRules {
    pub fn is_block(&self, element: &Element) -> bool {
        let by_tag = matches!(element.tag, Tag::Block(tag) if self.tags.contains(&tag));
        by_tag || self.classes.iter().any(|class| element.has_class(class))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkConfig {
    pub target: String,
    pub rel: String,
    /// Prepended to links that carry no scheme and are not relative.
    pub default_scheme: String,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            target: "_blank".to_string(),
            rel: "nofollow".to_string(),
            default_scheme: "http://".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    pub save_policy: SavePolicy,
    pub blocks: BlockRules,
    pub marker_class: String,
    pub link: LinkConfig,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            save_policy: SavePolicy::default(),
            blocks: BlockRules::default(),
            marker_class: "cdx-marker".to_string(),
            link: LinkConfig::default(),
        }
    }
}

impl ToolsConfig {
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn to_json_pretty(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config = ToolsConfig::from_json_str(
            r#"{ "save_policy": "keep_existing", "link": { "rel": "noopener" } }"#,
        )
        .unwrap();
        assert_eq!(config.save_policy, SavePolicy::KeepExisting);
        assert_eq!(config.link.rel, "noopener");
        assert_eq!(config.link.target, "_blank");
        assert_eq!(config.marker_class, "cdx-marker");
        assert!(config.blocks.tags.contains(&BlockTag::P));
    }

    #[test]
    fn block_rules_match_tags_and_classes() {
        let rules = BlockRules::default();
        assert!(rules.is_block(&Element::new("div")));
        assert!(rules.is_block(&Element::new("span").attr("class", "x ce-paragraph")));
        assert!(!rules.is_block(&Element::new("b")));
    }
}
