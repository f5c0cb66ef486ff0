//! Treeviz formatter for editor states
//!
//! Debug rendering only; the canonical form is the serializer's output.

use crate::caret::ast::elements::{Block, InlineNode};
use crate::caret::ast::state::EditorState;

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() > max_chars {
        let mut truncated = s.chars().take(max_chars).collect::<String>();
        truncated.push_str("...");
        truncated
    } else {
        s.to_string()
    }
}

pub fn to_treeviz_str(state: &EditorState) -> String {
    let mut result = String::new();
    for (i, block) in state.blocks.iter().enumerate() {
        let is_last = i == state.blocks.len() - 1;
        append_block(&mut result, block, "", is_last);
    }
    result
}

fn append_block(result: &mut String, block: &Block, prefix: &str, is_last: bool) {
    let connector = if is_last { "└─" } else { "├─" };
    let label = match block {
        Block::Text(b) => format!("text({}): {:?}", b.block_type, truncate(&b.concat_text(), 30)),
        Block::Container(b) => format!("container({})", b.block_type),
        Block::Raw(b) => format!("raw({}): {} line(s)", b.block_type, b.lines.len()),
        Block::Object(b) => format!("object({})", b.block_type),
    };
    result.push_str(&format!("{}{} {}\n", prefix, connector, label));

    let new_prefix = format!("{}{}", prefix, if is_last { "  " } else { "│ " });
    match block {
        Block::Container(c) => {
            for (i, child) in c.children.iter().enumerate() {
                append_block(result, child, &new_prefix, i == c.children.len() - 1);
            }
        }
        Block::Text(t) => {
            for (i, child) in t.children.iter().enumerate() {
                append_inline(result, child, &new_prefix, i == t.children.len() - 1);
            }
        }
        Block::Raw(_) | Block::Object(_) => {}
    }
}

fn append_inline(result: &mut String, node: &InlineNode, prefix: &str, is_last: bool) {
    let connector = if is_last { "└─" } else { "├─" };
    match node {
        InlineNode::Text(t) => {
            result.push_str(&format!(
                "{}{} text {:?}\n",
                prefix,
                connector,
                truncate(&t.text, 30)
            ));
        }
        InlineNode::Mark(m) => {
            result.push_str(&format!(
                "{}{} mark({}, {:?})\n",
                prefix, connector, m.mark_type, m.mode
            ));
            let new_prefix = format!("{}{}", prefix, if is_last { "  " } else { "│ " });
            for (i, child) in m.children.iter().enumerate() {
                append_inline(result, child, &new_prefix, i == m.children.len() - 1);
            }
        }
        InlineNode::Object(o) => {
            result.push_str(&format!(
                "{}{} object({})\n",
                prefix, connector, o.object_type
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::caret::ast::elements::{ContainerBlock, Mark, MarkMode, TextBlock};

    #[test]
    fn test_treeviz_shape() {
        let state = EditorState::new(
            vec![Block::Container(ContainerBlock::new(
                "UL",
                vec![Block::Text(TextBlock::new(
                    "LI",
                    vec![
                        InlineNode::text("foo "),
                        InlineNode::Mark(Mark::new(
                            "strong",
                            MarkMode::Decorator,
                            vec![InlineNode::text("bar")],
                        )),
                    ],
                ))],
            ))],
            None,
        );
        let viz = to_treeviz_str(&state);
        assert!(viz.contains("└─ container(UL)"));
        assert!(viz.contains("└─ text(LI)"));
        assert!(viz.contains("mark(strong, Decorator)"));
        assert!(viz.contains("text \"bar\""));
    }

    #[test]
    fn test_long_text_is_truncated() {
        let state = EditorState::new(
            vec![Block::Text(TextBlock::new(
                "P",
                vec![InlineNode::text("x".repeat(50))],
            ))],
            None,
        );
        let viz = to_treeviz_str(&state);
        assert!(viz.contains("..."));
    }
}
