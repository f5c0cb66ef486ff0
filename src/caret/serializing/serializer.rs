//! The caret serializer
//!
//! A tree walk that mirrors the parser: it maintains the same live path the
//! parser maintained while building, and at every position a selection
//! endpoint could address (character boundaries of text and raw lines, the
//! 0/1 sides of atomic objects, between-children boundaries) it checks the
//! state's selection and re-inserts `^`/`|`. A collapsed selection is
//! written as a bare `|`, which re-parses to collapsed.

use serde_json::Value;

use crate::caret::ast::elements::{Attributes, Block, InlineNode, MarkMode};
use crate::caret::ast::state::EditorState;
use crate::caret::serializing::options::SerializeOptions;

/// Serialize an editor state to its canonical notation.
pub fn serialize(state: &EditorState, options: &SerializeOptions) -> String {
    Serializer::new(state, options).run()
}

struct Serializer<'a> {
    state: &'a EditorState,
    single_line: bool,
    out: String,
    path: Vec<usize>,
}

impl<'a> Serializer<'a> {
    fn new(state: &'a EditorState, options: &SerializeOptions) -> Self {
        let single_line =
            options.single_line && !state.blocks.iter().any(Block::contains_raw);
        Self {
            state,
            single_line,
            out: String::new(),
            path: Vec::new(),
        }
    }

    fn run(mut self) -> String {
        for (i, block) in self.state.blocks.iter().enumerate() {
            if i > 0 {
                self.out.push_str(if self.single_line { ";;" } else { "\n" });
            }
            self.path.push(i);
            self.emit_block(block, 0);
            self.path.pop();
        }
        self.out
    }

    /// Write `^`/`|` if a selection endpoint addresses the current path at
    /// the given offset.
    fn emit_markers(&mut self, offset: usize) {
        let state = self.state;
        let Some(selection) = state.selection.as_ref() else {
            return;
        };
        if selection.is_collapsed() {
            if selection.focus.path == self.path && selection.focus.offset == offset {
                self.out.push('|');
            }
            return;
        }
        if selection.anchor.path == self.path && selection.anchor.offset == offset {
            self.out.push('^');
        }
        if selection.focus.path == self.path && selection.focus.offset == offset {
            self.out.push('|');
        }
    }

    fn indent(&mut self, level: usize) {
        for _ in 0..level {
            self.out.push_str("  ");
        }
    }

    fn emit_block(&mut self, block: &Block, level: usize) {
        match block {
            Block::Text(b) => {
                self.out.push_str(&b.block_type);
                self.emit_attrs(&b.attrs);
                self.out.push_str(": ");
                self.emit_inline_children(&b.children);
            }
            Block::Container(c) => {
                self.out.push_str(&c.block_type);
                self.emit_attrs(&c.attrs);
                self.out.push(':');
                if self.single_line {
                    self.out.push('{');
                    for (i, child) in c.children.iter().enumerate() {
                        if i > 0 {
                            self.out.push_str(";;");
                        }
                        self.path.push(i);
                        self.emit_block(child, level);
                        self.path.pop();
                    }
                    self.out.push('}');
                } else {
                    for (i, child) in c.children.iter().enumerate() {
                        self.out.push('\n');
                        self.indent(level + 1);
                        self.path.push(i);
                        self.emit_block(child, level + 1);
                        self.path.pop();
                    }
                }
            }
            Block::Raw(r) => {
                self.out.push_str(&r.block_type);
                self.out.push('!');
                self.emit_attrs(&r.attrs);
                self.out.push(':');
                for (i, line) in r.lines.iter().enumerate() {
                    self.out.push('\n');
                    self.indent(level + 1);
                    self.path.push(i);
                    self.emit_raw_line(line);
                    self.path.pop();
                }
            }
            Block::Object(o) => {
                self.emit_markers(0);
                self.out.push('{');
                self.out.push_str(&o.block_type);
                self.emit_attrs(&o.attrs);
                self.out.push('}');
                self.emit_markers(1);
            }
        }
    }

    fn emit_inline_children(&mut self, children: &[InlineNode]) {
        for (i, child) in children.iter().enumerate() {
            self.path.push(i);
            match child {
                InlineNode::Text(t) => self.emit_text(&t.text),
                InlineNode::Mark(m) => {
                    self.emit_markers(0);
                    self.out.push('[');
                    match m.mode {
                        MarkMode::Decorator => {}
                        MarkMode::Annotation => self.out.push('@'),
                        MarkMode::Overlay => self.out.push('~'),
                    }
                    self.out.push_str(&m.mark_type);
                    self.emit_attrs(&m.attrs);
                    self.out.push(':');
                    self.emit_inline_children(&m.children);
                    self.out.push(']');
                }
                InlineNode::Object(o) => {
                    self.emit_markers(0);
                    self.out.push('{');
                    self.out.push_str(&o.object_type);
                    self.emit_attrs(&o.attrs);
                    self.out.push('}');
                    self.emit_markers(1);
                }
            }
            self.path.pop();
        }
        // The boundary after the last child.
        self.path.push(children.len());
        self.emit_markers(0);
        self.path.pop();
    }

    /// Characters interleaved with marker checks: the marker at offset `i`
    /// lands before the character at index `i`, offsets in UTF-16 units.
    fn emit_text(&mut self, text: &str) {
        let mut offset = 0;
        for ch in text.chars() {
            self.emit_markers(offset);
            if matches!(ch, '\\' | '[' | ']' | '{' | '}' | '|' | '^' | ';') {
                self.out.push('\\');
            }
            self.out.push(ch);
            offset += ch.len_utf16();
        }
        self.emit_markers(offset);
    }

    /// Raw lines escape exactly the two marker characters; everything else,
    /// backslashes included, is literal.
    fn emit_raw_line(&mut self, line: &str) {
        let mut offset = 0;
        for ch in line.chars() {
            self.emit_markers(offset);
            if matches!(ch, '|' | '^') {
                self.out.push('\\');
            }
            self.out.push(ch);
            offset += ch.len_utf16();
        }
        self.emit_markers(offset);
    }

    /// Attributes in code-point key order, `key=value`, one space before
    /// each.
    fn emit_attrs(&mut self, attrs: &Attributes) {
        for (key, value) in attrs {
            self.out.push(' ');
            self.out.push_str(key);
            self.out.push('=');
            self.emit_attr_value(value);
        }
    }

    fn emit_attr_value(&mut self, value: &Value) {
        match value {
            Value::Null => self.out.push_str("null"),
            Value::Bool(b) => self.out.push_str(if *b { "true" } else { "false" }),
            Value::Number(n) => {
                let rendered = n.to_string();
                self.out.push_str(&rendered);
            }
            Value::String(s) => {
                self.out.push('"');
                for ch in s.chars() {
                    match ch {
                        '"' => self.out.push_str("\\\""),
                        '\\' => self.out.push_str("\\\\"),
                        '\n' => self.out.push_str("\\n"),
                        '\t' => self.out.push_str("\\t"),
                        '\r' => self.out.push_str("\\r"),
                        _ => self.out.push(ch),
                    }
                }
                self.out.push('"');
            }
            Value::Array(_) | Value::Object(_) => {
                let encoded =
                    serde_json::to_string(value).unwrap_or_else(|_| "null".to_string());
                self.out.push_str(&encoded);
            }
        }
    }
}
