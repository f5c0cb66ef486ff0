//! The caret matcher
//!
//! Patterns go through the same front-end as documents: a fragment that
//! does not already read as block syntax is wrapped in a throwaway `P: `
//! block and parsed, and the parsed blocks drive a structural search over
//! the document's top-level text blocks. Pattern attributes are matched as
//! a subset — a key the pattern omits matches any value in the document.

use crate::caret::ast::elements::{
    Attributes, Block, InlineNode, InlineObject, Mark, TextBlock,
};
use crate::caret::ast::selection::{Point, Selection};
use crate::caret::ast::state::EditorState;
use crate::caret::ast::text_content::utf16_len;
use crate::caret::parsing::parse;

/// Find the leftmost occurrence of `pattern` in `state` and return it as a
/// selection range. A pattern that does not parse matches nothing.
pub fn get_range(state: &EditorState, pattern: &str) -> Option<Selection> {
    let normalized = normalize_pattern(pattern);
    let parsed = parse(&normalized).ok()?;
    if parsed.blocks.len() == 1 {
        single_block_search(state, &parsed.blocks[0])
    } else {
        multi_block_search(state, &parsed.blocks)
    }
}

/// The start of the located range.
pub fn get_point_before(state: &EditorState, pattern: &str) -> Option<Point> {
    get_range(state, pattern).map(|selection| selection.anchor)
}

/// The end of the located range.
pub fn get_point_after(state: &EditorState, pattern: &str) -> Option<Point> {
    get_range(state, pattern).map(|selection| selection.focus)
}

/// A pattern already in block syntax (uppercase-initial type name, optional
/// `!`, then `:`) or block-object syntax is parsed as-is; anything else is
/// inline content and gets wrapped.
fn normalize_pattern(pattern: &str) -> String {
    if starts_with_block_header(pattern) || is_block_object_pattern(pattern) {
        pattern.to_string()
    } else {
        format!("P: {}", pattern)
    }
}

fn starts_with_block_header(pattern: &str) -> bool {
    let bytes = pattern.as_bytes();
    if bytes.is_empty() || !bytes[0].is_ascii_uppercase() {
        return false;
    }
    let mut i = 1;
    while i < bytes.len()
        && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_' || bytes[i] == b'-')
    {
        i += 1;
    }
    if i < bytes.len() && bytes[i] == b'!' {
        i += 1;
    }
    i < bytes.len() && bytes[i] == b':'
}

fn is_block_object_pattern(pattern: &str) -> bool {
    let bytes = pattern.as_bytes();
    bytes.len() >= 2 && bytes[0] == b'{' && bytes[1].is_ascii_uppercase() && !pattern.contains(':')
}

/// Every pattern key must be present in the candidate with an equal value.
fn attrs_superset(candidate: &Attributes, pattern: &Attributes) -> bool {
    pattern.iter().all(|(key, value)| candidate.get(key) == Some(value))
}

fn single_block_search(state: &EditorState, pattern: &Block) -> Option<Selection> {
    match pattern {
        Block::Text(pattern_block) => {
            for (i, block) in state.blocks.iter().enumerate() {
                let Block::Text(doc_block) = block else {
                    continue;
                };
                if let Some(found) = search_text_block(doc_block, &[i], pattern_block) {
                    return Some(found);
                }
            }
            None
        }
        Block::Object(pattern_object) => {
            for (i, block) in state.blocks.iter().enumerate() {
                if let Block::Object(object) = block {
                    if object.block_type == pattern_object.block_type
                        && attrs_superset(&object.attrs, &pattern_object.attrs)
                    {
                        return Some(Selection::new(
                            Point::new(vec![i], 0),
                            Point::new(vec![i], 1),
                        ));
                    }
                }
            }
            None
        }
        Block::Container(_) | Block::Raw(_) => None,
    }
}

fn search_text_block(block: &TextBlock, base: &[usize], pattern: &TextBlock) -> Option<Selection> {
    match pattern.children.as_slice() {
        [InlineNode::Text(t)] => find_text(&block.children, base, &t.text),
        [InlineNode::Mark(m), ..] => find_mark(&block.children, base, m),
        [InlineNode::Object(o), ..] => find_object(&block.children, base, o),
        _ => None,
    }
}

/// Substring search over text leaves, descending into marks, earliest hit
/// first.
fn find_text(children: &[InlineNode], base: &[usize], needle: &str) -> Option<Selection> {
    for (i, child) in children.iter().enumerate() {
        let mut path = base.to_vec();
        path.push(i);
        match child {
            InlineNode::Text(t) => {
                if let Some(byte_index) = t.text.find(needle) {
                    let start = utf16_len(&t.text[..byte_index]);
                    let len = utf16_len(needle);
                    return Some(Selection::new(
                        Point::new(path.clone(), start),
                        Point::new(path, start + len),
                    ));
                }
            }
            InlineNode::Mark(m) => {
                if let Some(found) = find_text(&m.children, &path, needle) {
                    return Some(found);
                }
            }
            InlineNode::Object(_) => {}
        }
    }
    None
}

/// Mark pattern: type and mode equal, attributes a subset, and the
/// candidate's flattened text starting with the pattern's. The range spans
/// the matched sibling: from the end of a preceding text sibling (or the
/// mark's own start) to the following sibling boundary.
fn find_mark(children: &[InlineNode], base: &[usize], pattern: &Mark) -> Option<Selection> {
    let pattern_text = pattern.concat_text();
    for (i, child) in children.iter().enumerate() {
        let InlineNode::Mark(mark) = child else {
            continue;
        };
        if mark.mark_type == pattern.mark_type
            && mark.mode == pattern.mode
            && attrs_superset(&mark.attrs, &pattern.attrs)
            && mark.concat_text().starts_with(&pattern_text)
        {
            let anchor = match i.checked_sub(1).and_then(|prev| children.get(prev)) {
                Some(InlineNode::Text(prev_text)) => {
                    let mut path = base.to_vec();
                    path.push(i - 1);
                    Point::new(path, utf16_len(&prev_text.text))
                }
                _ => {
                    let mut path = base.to_vec();
                    path.push(i);
                    Point::new(path, 0)
                }
            };
            let mut focus_path = base.to_vec();
            focus_path.push(i + 1);
            return Some(Selection::new(anchor, Point::new(focus_path, 0)));
        }
        let mut path = base.to_vec();
        path.push(i);
        if let Some(found) = find_mark(&mark.children, &path, pattern) {
            return Some(found);
        }
    }
    None
}

/// Inline-object pattern: type equal and attributes a subset; the range is
/// the 0/1 span around the object.
fn find_object(children: &[InlineNode], base: &[usize], pattern: &InlineObject) -> Option<Selection> {
    for (i, child) in children.iter().enumerate() {
        let mut path = base.to_vec();
        path.push(i);
        match child {
            InlineNode::Object(object) => {
                if object.object_type == pattern.object_type
                    && attrs_superset(&object.attrs, &pattern.attrs)
                {
                    return Some(Selection::new(
                        Point::new(path.clone(), 0),
                        Point::new(path, 1),
                    ));
                }
            }
            InlineNode::Mark(m) => {
                if let Some(found) = find_object(&m.children, &path, pattern) {
                    return Some(found);
                }
            }
            InlineNode::Text(_) => {}
        }
    }
    None
}

/// Multi-block pattern: a run of document text blocks whose first block
/// ends with the pattern's first text, whose last starts with the
/// pattern's last text, and whose middles match exactly.
fn multi_block_search(state: &EditorState, patterns: &[Block]) -> Option<Selection> {
    let pattern_blocks: Vec<&TextBlock> = patterns
        .iter()
        .map(|block| block.as_text_block())
        .collect::<Option<Vec<_>>>()?;
    let n = pattern_blocks.len();
    let pattern_texts: Vec<String> = pattern_blocks.iter().map(|b| b.concat_text()).collect();
    if state.blocks.len() < n {
        return None;
    }
    'windows: for s in 0..=(state.blocks.len() - n) {
        let mut window = Vec::with_capacity(n);
        for block in &state.blocks[s..s + n] {
            match block {
                Block::Text(b) => window.push(b),
                _ => continue 'windows,
            }
        }
        let first_text = window[0].concat_text();
        let last_text = window[n - 1].concat_text();
        if !first_text.ends_with(&pattern_texts[0])
            || !last_text.starts_with(&pattern_texts[n - 1])
        {
            continue;
        }
        let middles_match =
            (1..n - 1).all(|k| window[k].concat_text() == pattern_texts[k]);
        if !middles_match {
            continue;
        }
        let anchor_offset = utf16_len(&first_text) - utf16_len(&pattern_texts[0]);
        let anchor = point_at_text_offset(window[0], &[s], anchor_offset)?;
        let focus =
            point_at_text_offset(window[n - 1], &[s + n - 1], utf16_len(&pattern_texts[n - 1]))?;
        return Some(Selection::new(anchor, focus));
    }
    None
}

/// Translate an offset into a block's flattened text to a concrete
/// path/offset, walking text descendants left to right. Boundary offsets
/// resolve to the end of the earlier leaf.
fn point_at_text_offset(block: &TextBlock, base: &[usize], target: usize) -> Option<Point> {
    let mut consumed = 0;
    walk_text(&block.children, base, target, &mut consumed)
}

fn walk_text(
    children: &[InlineNode],
    base: &[usize],
    target: usize,
    consumed: &mut usize,
) -> Option<Point> {
    for (i, child) in children.iter().enumerate() {
        let mut path = base.to_vec();
        path.push(i);
        match child {
            InlineNode::Text(t) => {
                let len = utf16_len(&t.text);
                if target <= *consumed + len {
                    return Some(Point::new(path, target - *consumed));
                }
                *consumed += len;
            }
            InlineNode::Mark(m) => {
                if let Some(point) = walk_text(&m.children, &path, target, consumed) {
                    return Some(point);
                }
            }
            InlineNode::Object(_) => {}
        }
    }
    None
}
