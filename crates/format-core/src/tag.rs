use std::fmt;

use serde::{Deserialize, Serialize};

/// Inline formatting tags the tools know how to create, recognise or strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InlineTag {
    B,
    Strong,
    I,
    Em,
    Mark,
    U,
    Code,
    S,
    Del,
    Ins,
    Sub,
    Sup,
    A,
}

impl InlineTag {
    pub const ALL: [InlineTag; 13] = [
        InlineTag::B,
        InlineTag::Strong,
        InlineTag::I,
        InlineTag::Em,
        InlineTag::Mark,
        InlineTag::U,
        InlineTag::Code,
        InlineTag::S,
        InlineTag::Del,
        InlineTag::Ins,
        InlineTag::Sub,
        InlineTag::Sup,
        InlineTag::A,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            InlineTag::B => "b",
            InlineTag::Strong => "strong",
            InlineTag::I => "i",
            InlineTag::Em => "em",
            InlineTag::Mark => "mark",
            InlineTag::U => "u",
            InlineTag::Code => "code",
            InlineTag::S => "s",
            InlineTag::Del => "del",
            InlineTag::Ins => "ins",
            InlineTag::Sub => "sub",
            InlineTag::Sup => "sup",
            InlineTag::A => "a",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.to_ascii_lowercase();
        Self::ALL.into_iter().find(|tag| tag.as_str() == name)
    }

    /// Adjacent siblings with this tag and identical attributes collapse into one.
    pub fn is_mergeable(self) -> bool {
        matches!(
            self,
            InlineTag::B
                | InlineTag::Strong
                | InlineTag::I
                | InlineTag::Em
                | InlineTag::Mark
                | InlineTag::U
                | InlineTag::Code
        )
    }

    /// Removed by clear-format. Links survive.
    pub fn is_clearable(self) -> bool {
        self != InlineTag::A
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockTag {
    Div,
    P,
    H1,
    H2,
    H3,
    H4,
    H5,
    H6,
    Li,
    Blockquote,
    Pre,
}

impl BlockTag {
    pub const ALL: [BlockTag; 11] = [
        BlockTag::Div,
        BlockTag::P,
        BlockTag::H1,
        BlockTag::H2,
        BlockTag::H3,
        BlockTag::H4,
        BlockTag::H5,
        BlockTag::H6,
        BlockTag::Li,
        BlockTag::Blockquote,
        BlockTag::Pre,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            BlockTag::Div => "div",
            BlockTag::P => "p",
            BlockTag::H1 => "h1",
            BlockTag::H2 => "h2",
            BlockTag::H3 => "h3",
            BlockTag::H4 => "h4",
            BlockTag::H5 => "h5",
            BlockTag::H6 => "h6",
            BlockTag::Li => "li",
            BlockTag::Blockquote => "blockquote",
            BlockTag::Pre => "pre",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.to_ascii_lowercase();
        Self::ALL.into_iter().find(|tag| tag.as_str() == name)
    }
}

/// Element tag. Names outside the known vocabulary are kept verbatim (lowercased).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Tag {
    Inline(InlineTag),
    Block(BlockTag),
    Span,
    Other(String),
}

impl Tag {
    pub fn name(&self) -> &str {
        match self {
            Tag::Inline(tag) => tag.as_str(),
            Tag::Block(tag) => tag.as_str(),
            Tag::Span => "span",
            Tag::Other(name) => name,
        }
    }

    pub fn inline(&self) -> Option<InlineTag> {
        match self {
            Tag::Inline(tag) => Some(*tag),
            _ => None,
        }
    }

    pub fn is_void(&self) -> bool {
        matches!(self, Tag::Other(name) if name == "br" || name == "hr" || name == "img")
    }
}

impl From<&str> for Tag {
    fn from(name: &str) -> Self {
        if let Some(tag) = InlineTag::from_name(name) {
            return Tag::Inline(tag);
        }
        if let Some(tag) = BlockTag::from_name(name) {
            return Tag::Block(tag);
        }
        if name.eq_ignore_ascii_case("span") {
            return Tag::Span;
        }
        Tag::Other(name.to_ascii_lowercase())
    }
}

impl From<String> for Tag {
    fn from(name: String) -> Self {
        Tag::from(name.as_str())
    }
}

impl From<Tag> for String {
    fn from(tag: Tag) -> Self {
        tag.name().to_string()
    }
}

impl From<InlineTag> for Tag {
    fn from(tag: InlineTag) -> Self {
        Tag::Inline(tag)
    }
}

impl From<BlockTag> for Tag {
    fn from(tag: BlockTag) -> Self {
        Tag::Block(tag)
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The formats a tool can own. Each maps to exactly one tag it creates and the
/// set of tags it treats as "already formatted".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InlineFormat {
    Bold,
    Italic,
    Marker,
    Link,
}

impl InlineFormat {
    pub fn wrap_tag(self) -> InlineTag {
        match self {
            InlineFormat::Bold => InlineTag::B,
            InlineFormat::Italic => InlineTag::I,
            InlineFormat::Marker => InlineTag::Mark,
            InlineFormat::Link => InlineTag::A,
        }
    }

    pub fn recognised_tags(self) -> &'static [InlineTag] {
        match self {
            InlineFormat::Bold => &[InlineTag::B, InlineTag::Strong],
            InlineFormat::Italic => &[InlineTag::I, InlineTag::Em],
            InlineFormat::Marker => &[InlineTag::Mark],
            InlineFormat::Link => &[InlineTag::A],
        }
    }

    pub fn matches(self, tag: &Tag) -> bool {
        tag.inline()
            .is_some_and(|tag| self.recognised_tags().contains(&tag))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_names_parse_case_insensitively() {
        assert_eq!(Tag::from("STRONG"), Tag::Inline(InlineTag::Strong));
        assert_eq!(Tag::from("P"), Tag::Block(BlockTag::P));
        assert_eq!(Tag::from("Span"), Tag::Span);
        assert_eq!(Tag::from("Section"), Tag::Other("section".to_string()));
    }

    #[test]
    fn bold_recognises_strong_but_wraps_with_b() {
        assert!(InlineFormat::Bold.matches(&Tag::from("strong")));
        assert!(!InlineFormat::Bold.matches(&Tag::from("em")));
        assert_eq!(InlineFormat::Bold.wrap_tag(), InlineTag::B);
    }

    #[test]
    fn links_are_never_clearable() {
        let kept: Vec<_> = InlineTag::ALL
            .into_iter()
            .filter(|tag| !tag.is_clearable())
            .collect();
        assert_eq!(kept, vec![InlineTag::A]);
    }
}
