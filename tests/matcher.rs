//! Integration tests for the pattern matcher

use caret_parser::caret::{
    get_point_after, get_point_before, get_range, parse, serialize, Point, SerializeOptions,
};
use rstest::rstest;

fn doc() -> caret_parser::caret::EditorState {
    parse(concat!(
        "H1: The caret notation\n",
        "P: It encodes [em:rich] text with [@link href=\"https://example.com\":references].\n",
        "P: Objects too: {img src=\"shot.png\" width=800}\n",
        "CODE!:\n",
        "  parse(input)\n",
        "P: The end",
    ))
    .unwrap()
}

#[rstest]
#[case("caret", Some((vec![0, 0], 4, vec![0, 0], 9)))]
#[case("rich", Some((vec![1, 1, 0], 0, vec![1, 1, 0], 4)))]
#[case("absent entirely", None)]
fn test_text_patterns(
    #[case] pattern: &str,
    #[case] expected: Option<(Vec<usize>, usize, Vec<usize>, usize)>,
) {
    let state = doc();
    let found = get_range(&state, pattern);
    match expected {
        None => assert!(found.is_none(), "{:?} unexpectedly matched", pattern),
        Some((anchor_path, anchor_offset, focus_path, focus_offset)) => {
            let selection = found.unwrap_or_else(|| panic!("{:?} did not match", pattern));
            assert_eq!(selection.anchor, Point::new(anchor_path, anchor_offset));
            assert_eq!(selection.focus, Point::new(focus_path, focus_offset));
        }
    }
}

#[test]
fn test_mark_range_spans_from_previous_text() {
    let state = parse("P: foo [strong:bar] baz").unwrap();
    let selection = get_range(&state, "[strong:bar]").unwrap();
    assert_eq!(selection.anchor, Point::new(vec![0, 0], 4));
    assert_eq!(selection.focus, Point::new(vec![0, 2], 0));
}

#[test]
fn test_mark_pattern_attr_subset() {
    let state = doc();
    // Omitting href matches any link.
    assert!(get_range(&state, "[@link:references]").is_some());
    assert!(get_range(&state, "[@link href=\"https://example.com\":references]").is_some());
    assert!(get_range(&state, "[@link href=\"https://elsewhere\":references]").is_none());
}

#[test]
fn test_inline_object_subset() {
    let state = doc();
    let selection = get_range(&state, "{img width=800}").unwrap();
    assert_eq!(selection.anchor, Point::new(vec![2, 1], 0));
    assert_eq!(selection.focus, Point::new(vec![2, 1], 1));
    assert!(get_range(&state, "{img width=801}").is_none());
}

#[test]
fn test_point_views_are_range_ends() {
    let state = doc();
    let range = get_range(&state, "caret").unwrap();
    assert_eq!(get_point_before(&state, "caret"), Some(range.anchor));
    assert_eq!(get_point_after(&state, "caret"), Some(range.focus));
    assert_eq!(get_point_before(&state, "nope"), None);
}

#[test]
fn test_matched_range_is_a_valid_selection() {
    // Install the matched range as the document selection and round-trip it.
    let mut state = doc();
    let selection = get_range(&state, "rich").unwrap();
    state.selection = Some(selection);
    let serialized = serialize(&state, &SerializeOptions::default());
    let reparsed = parse(&serialized).unwrap();
    assert_eq!(reparsed, state);
}

#[test]
fn test_block_pattern_syntax() {
    let state = doc();
    // A block-syntax pattern still searches text blocks by content.
    assert!(get_range(&state, "P: The end").is_some());
}

#[test]
fn test_multi_block_range() {
    let state = parse("P: alpha beta\nP: gamma\nP: delta epsilon").unwrap();
    let selection = get_range(&state, "P: beta;;P: gamma;;P: delta").unwrap();
    assert_eq!(selection.anchor, Point::new(vec![0, 0], 6));
    assert_eq!(selection.focus, Point::new(vec![2, 0], 5));
}

#[test]
fn test_matcher_ignores_nested_blocks() {
    // Search iterates top-level blocks only.
    let state = parse("UL:\n  LI: needle").unwrap();
    assert!(get_range(&state, "needle").is_none());
}
