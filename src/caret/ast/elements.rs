//! Block and inline node types
//!
//! Every node is a tagged variant; only [`Text`] is a leaf carrying
//! characters. Attribute values are plain JSON values, decoded and encoded
//! with `serde_json` — the notation does not define its own value grammar
//! beyond the surface forms.

use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// Attribute map for a node. A `BTreeMap` keyed by name gives the canonical
/// code-point key order for free; on duplicate keys in the input the last
/// value wins.
pub type Attributes = BTreeMap<String, Value>;

/// A top-level or nested structural unit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Block {
    Text(TextBlock),
    Container(ContainerBlock),
    Raw(RawBlock),
    Object(BlockObject),
}

impl Block {
    pub fn block_type(&self) -> &str {
        match self {
            Block::Text(b) => &b.block_type,
            Block::Container(b) => &b.block_type,
            Block::Raw(b) => &b.block_type,
            Block::Object(b) => &b.block_type,
        }
    }

    pub fn as_text_block(&self) -> Option<&TextBlock> {
        match self {
            Block::Text(b) => Some(b),
            _ => None,
        }
    }

    /// True when this block or anything below it is a raw block. Raw blocks
    /// have no single-line form, so their presence pins the serializer to
    /// the multiline layout.
    pub fn contains_raw(&self) -> bool {
        match self {
            Block::Raw(_) => true,
            Block::Container(c) => c.children.iter().any(Block::contains_raw),
            Block::Text(_) | Block::Object(_) => false,
        }
    }
}

/// A block holding inline content, e.g. `P: hello [strong:world]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextBlock {
    pub block_type: String,
    pub attrs: Attributes,
    pub children: Vec<InlineNode>,
}

impl TextBlock {
    pub fn new(block_type: impl Into<String>, children: Vec<InlineNode>) -> Self {
        Self {
            block_type: block_type.into(),
            attrs: Attributes::new(),
            children,
        }
    }

    pub fn with_attrs(
        block_type: impl Into<String>,
        attrs: Attributes,
        children: Vec<InlineNode>,
    ) -> Self {
        Self {
            block_type: block_type.into(),
            attrs,
            children,
        }
    }

    /// The block's text with all mark structure flattened away.
    pub fn concat_text(&self) -> String {
        concat_inline_text(&self.children)
    }
}

/// A block holding child blocks, e.g. `UL:` with indented children. Never
/// empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContainerBlock {
    pub block_type: String,
    pub attrs: Attributes,
    pub children: Vec<Block>,
}

impl ContainerBlock {
    pub fn new(block_type: impl Into<String>, children: Vec<Block>) -> Self {
        Self {
            block_type: block_type.into(),
            attrs: Attributes::new(),
            children,
        }
    }
}

/// A block whose body is opaque lines, denoted `TYPE!`. Lines may be empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RawBlock {
    pub block_type: String,
    pub attrs: Attributes,
    pub lines: Vec<String>,
}

impl RawBlock {
    pub fn new(block_type: impl Into<String>, lines: Vec<String>) -> Self {
        Self {
            block_type: block_type.into(),
            attrs: Attributes::new(),
            lines,
        }
    }
}

/// An atomic block, e.g. `{IMG src="x.png"}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlockObject {
    pub block_type: String,
    pub attrs: Attributes,
}

impl BlockObject {
    pub fn new(block_type: impl Into<String>, attrs: Attributes) -> Self {
        Self {
            block_type: block_type.into(),
            attrs,
        }
    }
}

/// Inline content of a text block or mark.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum InlineNode {
    Text(Text),
    Mark(Mark),
    Object(InlineObject),
}

impl InlineNode {
    pub fn text(value: impl Into<String>) -> Self {
        InlineNode::Text(Text {
            text: value.into(),
        })
    }

    pub fn as_text(&self) -> Option<&Text> {
        match self {
            InlineNode::Text(t) => Some(t),
            _ => None,
        }
    }
}

/// The character leaf.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Text {
    pub text: String,
}

/// How a mark relates to the text it spans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MarkMode {
    /// Plain formatting, `[strong:...]`.
    Decorator,
    /// A reference to something else, `[@link:...]`.
    Annotation,
    /// An editorial overlay, `[~comment:...]`.
    Overlay,
}

/// An inline formatting span with typed attributes and nested content.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Mark {
    pub mark_type: String,
    pub mode: MarkMode,
    pub attrs: Attributes,
    pub children: Vec<InlineNode>,
}

impl Mark {
    pub fn new(mark_type: impl Into<String>, mode: MarkMode, children: Vec<InlineNode>) -> Self {
        Self {
            mark_type: mark_type.into(),
            mode,
            attrs: Attributes::new(),
            children,
        }
    }

    pub fn concat_text(&self) -> String {
        concat_inline_text(&self.children)
    }
}

/// An atomic inline leaf, e.g. `{img src="x.png"}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InlineObject {
    pub object_type: String,
    pub attrs: Attributes,
}

impl InlineObject {
    pub fn new(object_type: impl Into<String>, attrs: Attributes) -> Self {
        Self {
            object_type: object_type.into(),
            attrs,
        }
    }
}

/// Concatenated descendant text of a run of inline nodes, marks flattened,
/// objects contributing nothing.
pub fn concat_inline_text(children: &[InlineNode]) -> String {
    let mut out = String::new();
    for child in children {
        match child {
            InlineNode::Text(t) => out.push_str(&t.text),
            InlineNode::Mark(m) => out.push_str(&concat_inline_text(&m.children)),
            InlineNode::Object(_) => {}
        }
    }
    out
}
