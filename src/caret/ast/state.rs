//! The document root and path-based lookup

use serde::Serialize;

use crate::caret::ast::elements::{Block, InlineNode};
use crate::caret::ast::selection::{Point, Selection};
use crate::caret::ast::text_content::utf16_len;

/// A parsed editor state: the block tree plus an optional selection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EditorState {
    pub blocks: Vec<Block>,
    pub selection: Option<Selection>,
}

impl EditorState {
    pub fn new(blocks: Vec<Block>, selection: Option<Selection>) -> Self {
        Self { blocks, selection }
    }

    /// Resolve a child-index path to the node it names. Returns `None` for
    /// paths that address a between-children boundary (one past the last
    /// child) rather than a node.
    pub fn node_at_path(&self, path: &[usize]) -> Option<NodeRef<'_>> {
        let (first, rest) = path.split_first()?;
        descend_block(self.blocks.get(*first)?, rest)
    }

    /// Whether a point addresses a boundary this tree actually has, under
    /// the offset interpretation the serializer uses.
    pub fn is_valid_point(&self, point: &Point) -> bool {
        match self.node_at_path(&point.path) {
            Some(NodeRef::Inline(InlineNode::Text(t))) => point.offset <= utf16_len(&t.text),
            Some(NodeRef::RawLine(line)) => point.offset <= utf16_len(line),
            Some(NodeRef::Inline(InlineNode::Object(_))) => point.offset <= 1,
            Some(NodeRef::Block(Block::Object(_))) => point.offset <= 1,
            // Before-mark form: the path of the mark itself, offset 0.
            Some(NodeRef::Inline(InlineNode::Mark(_))) => point.offset == 0,
            Some(NodeRef::Block(_)) => false,
            // One past the last child of a text block or mark.
            None => point.offset == 0 && self.is_end_boundary(&point.path),
        }
    }

    fn is_end_boundary(&self, path: &[usize]) -> bool {
        let Some((last, parent)) = path.split_last() else {
            return false;
        };
        if parent.is_empty() {
            return false;
        }
        match self.node_at_path(parent) {
            Some(NodeRef::Block(Block::Text(b))) => *last == b.children.len(),
            Some(NodeRef::Inline(InlineNode::Mark(m))) => *last == m.children.len(),
            _ => false,
        }
    }
}

/// A borrowed node named by a path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NodeRef<'a> {
    Block(&'a Block),
    Inline(&'a InlineNode),
    RawLine(&'a str),
}

fn descend_block<'a>(block: &'a Block, path: &[usize]) -> Option<NodeRef<'a>> {
    let Some((index, rest)) = path.split_first() else {
        return Some(NodeRef::Block(block));
    };
    match block {
        Block::Container(c) => descend_block(c.children.get(*index)?, rest),
        Block::Text(t) => descend_inline(t.children.get(*index)?, rest),
        Block::Raw(r) => {
            if rest.is_empty() {
                Some(NodeRef::RawLine(r.lines.get(*index)?))
            } else {
                None
            }
        }
        Block::Object(_) => None,
    }
}

fn descend_inline<'a>(node: &'a InlineNode, path: &[usize]) -> Option<NodeRef<'a>> {
    let Some((index, rest)) = path.split_first() else {
        return Some(NodeRef::Inline(node));
    };
    match node {
        InlineNode::Mark(m) => descend_inline(m.children.get(*index)?, rest),
        InlineNode::Text(_) | InlineNode::Object(_) => None,
    }
}
