//! Fluent assertion API for editor states
//!
//! Test helpers for deep structure verification: start from
//! [`assert_state`], descend with the typed `assert_*` methods, and every
//! failure panics with the path context that produced it.

use serde_json::Value;

use crate::caret::ast::elements::{
    Block, ContainerBlock, InlineNode, Mark, MarkMode, RawBlock, TextBlock,
};
use crate::caret::ast::selection::Point;
use crate::caret::ast::state::EditorState;

/// Create an assertion builder for an editor state.
pub fn assert_state(state: &EditorState) -> StateAssertion<'_> {
    StateAssertion { state }
}

pub struct StateAssertion<'a> {
    state: &'a EditorState,
}

impl<'a> StateAssertion<'a> {
    pub fn block_count(self, expected: usize) -> Self {
        assert_eq!(
            self.state.blocks.len(),
            expected,
            "expected {} top-level blocks, found {}",
            expected,
            self.state.blocks.len()
        );
        self
    }

    pub fn block(self, index: usize, f: impl FnOnce(BlockAssertion<'a>)) -> Self {
        let block = self
            .state
            .blocks
            .get(index)
            .unwrap_or_else(|| panic!("no block at index {}", index));
        f(BlockAssertion {
            block,
            context: format!("block[{}]", index),
        });
        self
    }

    pub fn no_selection(self) -> Self {
        assert!(
            self.state.selection.is_none(),
            "expected no selection, found {:?}",
            self.state.selection
        );
        self
    }

    pub fn collapsed_at(self, path: &[usize], offset: usize) -> Self {
        let selection = self
            .state
            .selection
            .as_ref()
            .unwrap_or_else(|| panic!("expected a selection, found none"));
        assert!(
            selection.is_collapsed(),
            "expected a collapsed selection, found {:?}",
            selection
        );
        assert_eq!(selection.focus, Point::new(path.to_vec(), offset));
        self
    }

    pub fn selection_between(
        self,
        anchor: (&[usize], usize),
        focus: (&[usize], usize),
    ) -> Self {
        let selection = self
            .state
            .selection
            .as_ref()
            .unwrap_or_else(|| panic!("expected a selection, found none"));
        assert_eq!(selection.anchor, Point::new(anchor.0.to_vec(), anchor.1));
        assert_eq!(selection.focus, Point::new(focus.0.to_vec(), focus.1));
        self
    }
}

pub struct BlockAssertion<'a> {
    block: &'a Block,
    context: String,
}

impl<'a> BlockAssertion<'a> {
    pub fn assert_text(self) -> TextBlockAssertion<'a> {
        match self.block {
            Block::Text(b) => TextBlockAssertion {
                block: b,
                context: self.context,
            },
            other => panic!("{}: expected text block, found {:?}", self.context, other),
        }
    }

    pub fn assert_container(self) -> ContainerAssertion<'a> {
        match self.block {
            Block::Container(c) => ContainerAssertion {
                block: c,
                context: self.context,
            },
            other => panic!("{}: expected container, found {:?}", self.context, other),
        }
    }

    pub fn assert_raw(self) -> RawAssertion<'a> {
        match self.block {
            Block::Raw(r) => RawAssertion {
                block: r,
                context: self.context,
            },
            other => panic!("{}: expected raw block, found {:?}", self.context, other),
        }
    }

    pub fn assert_object(self, block_type: &str) {
        match self.block {
            Block::Object(o) => assert_eq!(
                o.block_type, block_type,
                "{}: object type mismatch",
                self.context
            ),
            other => panic!("{}: expected block object, found {:?}", self.context, other),
        }
    }
}

pub struct TextBlockAssertion<'a> {
    block: &'a TextBlock,
    context: String,
}

impl<'a> TextBlockAssertion<'a> {
    pub fn type_name(self, expected: &str) -> Self {
        assert_eq!(
            self.block.block_type, expected,
            "{}: block type mismatch",
            self.context
        );
        self
    }

    pub fn text(self, expected: &str) -> Self {
        assert_eq!(
            self.block.concat_text(),
            expected,
            "{}: flattened text mismatch",
            self.context
        );
        self
    }

    pub fn child_count(self, expected: usize) -> Self {
        assert_eq!(
            self.block.children.len(),
            expected,
            "{}: child count mismatch",
            self.context
        );
        self
    }

    pub fn attr(self, key: &str, expected: Value) -> Self {
        assert_eq!(
            self.block.attrs.get(key),
            Some(&expected),
            "{}: attribute {:?} mismatch",
            self.context,
            key
        );
        self
    }

    pub fn mark(self, index: usize, f: impl FnOnce(MarkAssertion<'a>)) -> Self {
        match self.block.children.get(index) {
            Some(InlineNode::Mark(mark)) => f(MarkAssertion {
                mark,
                context: format!("{}.child[{}]", self.context, index),
            }),
            other => panic!(
                "{}: expected mark at child {}, found {:?}",
                self.context, index, other
            ),
        }
        self
    }
}

pub struct MarkAssertion<'a> {
    mark: &'a Mark,
    context: String,
}

impl<'a> MarkAssertion<'a> {
    pub fn type_name(self, expected: &str) -> Self {
        assert_eq!(
            self.mark.mark_type, expected,
            "{}: mark type mismatch",
            self.context
        );
        self
    }

    pub fn mode(self, expected: MarkMode) -> Self {
        assert_eq!(self.mark.mode, expected, "{}: mark mode mismatch", self.context);
        self
    }

    pub fn text(self, expected: &str) -> Self {
        assert_eq!(
            self.mark.concat_text(),
            expected,
            "{}: mark text mismatch",
            self.context
        );
        self
    }

    pub fn attr(self, key: &str, expected: Value) -> Self {
        assert_eq!(
            self.mark.attrs.get(key),
            Some(&expected),
            "{}: attribute {:?} mismatch",
            self.context,
            key
        );
        self
    }
}

pub struct ContainerAssertion<'a> {
    block: &'a ContainerBlock,
    context: String,
}

impl<'a> ContainerAssertion<'a> {
    pub fn type_name(self, expected: &str) -> Self {
        assert_eq!(
            self.block.block_type, expected,
            "{}: container type mismatch",
            self.context
        );
        self
    }

    pub fn child_count(self, expected: usize) -> Self {
        assert_eq!(
            self.block.children.len(),
            expected,
            "{}: container child count mismatch",
            self.context
        );
        self
    }

    pub fn child(self, index: usize, f: impl FnOnce(BlockAssertion<'a>)) -> Self {
        let child = self
            .block
            .children
            .get(index)
            .unwrap_or_else(|| panic!("{}: no child at index {}", self.context, index));
        f(BlockAssertion {
            block: child,
            context: format!("{}.child[{}]", self.context, index),
        });
        self
    }
}

pub struct RawAssertion<'a> {
    block: &'a RawBlock,
    context: String,
}

impl<'a> RawAssertion<'a> {
    pub fn type_name(self, expected: &str) -> Self {
        assert_eq!(
            self.block.block_type, expected,
            "{}: raw type mismatch",
            self.context
        );
        self
    }

    pub fn lines(self, expected: &[&str]) -> Self {
        let actual: Vec<&str> = self.block.lines.iter().map(String::as_str).collect();
        assert_eq!(actual, expected, "{}: raw lines mismatch", self.context);
        self
    }
}
