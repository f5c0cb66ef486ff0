//! Error taxonomy tests
//!
//! Every rejected input must fail with its stable code at the exact line
//! and column of the offending token.

use caret_parser::caret::{parse, ErrorCode};
use rstest::rstest;

#[rstest]
#[case("", ErrorCode::EmptyDocument)]
#[case("\n\n", ErrorCode::EmptyDocument)]
#[case(";;", ErrorCode::EmptyDocument)]
#[case("UL:\n\tLI: x", ErrorCode::TabsInIndentation)]
#[case("UL:\n   LI: x", ErrorCode::IndentationNotMultipleOfTwo)]
#[case("UL:\n  LI:\n   P: x", ErrorCode::IndentationNotMultipleOfTwo)]
#[case("UL:\n    LI: x", ErrorCode::IndentationSkipsLevel)]
#[case("A:\n  B:\n      C: x", ErrorCode::IndentationSkipsLevel)]
#[case("P: a|b|c", ErrorCode::MultipleFocus)]
#[case("P: a^b^c", ErrorCode::MultipleAnchor)]
#[case("P: [b:x\nQ: y", ErrorCode::UnbalancedBracket)]
#[case("P: [b:x", ErrorCode::UnbalancedBracket)]
#[case("P: {img", ErrorCode::UnbalancedBrace)]
#[case("UL:{LI: a", ErrorCode::UnbalancedBrace)]
#[case("P: [b x=1 y]", ErrorCode::MalformedAttribute)]
#[case("P: [b]", ErrorCode::MissingColonInMark)]
#[case("P: [b=x]", ErrorCode::MissingColonInMark)]
#[case("P: foo\n  Q: bar", ErrorCode::InvalidChildUnderTextBlock)]
#[case("UL:\nP: x", ErrorCode::EmptyContainer)]
#[case("UL:", ErrorCode::EmptyContainer)]
#[case("UL:{}", ErrorCode::EmptyContainer)]
#[case("P:foo", ErrorCode::MissingSpaceAfterColon)]
#[case("P x: v", ErrorCode::MalformedAttribute)]
#[case("P x=: v", ErrorCode::MalformedAttribute)]
#[case("P : v", ErrorCode::MalformedAttribute)]
#[case("P k=\"abc", ErrorCode::UnclosedQuote)]
#[case("P k=\"ab\nc\": v", ErrorCode::UnclosedQuote)]
#[case("P j={\"a\":}: v", ErrorCode::InvalidJson)]
#[case("P j={\"a\": v", ErrorCode::InvalidJson)]
#[case("9: x", ErrorCode::InvalidIdentifier)]
#[case("{9}", ErrorCode::InvalidIdentifier)]
#[case("}", ErrorCode::InvalidIdentifier)]
#[case("P: \\q", ErrorCode::InvalidEscapeSequence)]
#[case("P: \\u12", ErrorCode::InvalidEscapeSequence)]
#[case("P: \\uD800", ErrorCode::InvalidEscapeSequence)]
fn test_error_codes(#[case] input: &str, #[case] expected: ErrorCode) {
    let err = parse(input).unwrap_err();
    assert_eq!(err.code, expected, "input {:?} gave {:?}", input, err);
}

#[rstest]
#[case("UL:\n\tLI: x", 2, 1)]
#[case("UL:\n   LI: x", 2, 1)]
#[case("UL:\n    LI: x", 2, 1)]
#[case("P: a|b|c", 1, 7)]
#[case("P: a^b^c", 1, 7)]
#[case("P:foo", 1, 3)]
fn test_error_positions(#[case] input: &str, #[case] line: usize, #[case] column: usize) {
    let err = parse(input).unwrap_err();
    assert_eq!(
        (err.line, err.column),
        (line, column),
        "input {:?} gave {:?}",
        input,
        err
    );
}

#[test]
fn test_error_carries_json_detail() {
    let err = parse("P j={\"a\":}: v").unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidJson);
    assert!(err.detail.is_some());
}

#[test]
fn test_document_without_markers_is_fine() {
    let state = parse("P: no markers here").unwrap();
    assert!(state.selection.is_none());
}

#[test]
fn test_tab_inside_content_is_allowed() {
    // Tabs are only an indentation error; inline they are plain text.
    let state = parse("P: a\tb").unwrap();
    assert_eq!(state.blocks.len(), 1);
}
