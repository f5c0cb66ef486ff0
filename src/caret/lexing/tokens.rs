//! Token definitions for the caret notation

use serde::Serialize;

/// All token kinds the lexer can produce.
///
/// `Indent` and `Dedent` are synthetic: they are derived from indentation
/// changes at line starts and carry an empty value. Every other token's
/// `value` is its source text, except `String` (decoded string contents)
/// and escape-produced `Text` tokens (the decoded character).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TokenKind {
    Newline,
    Indent,
    Dedent,
    /// `;;`
    BlockSep,
    Eof,
    Colon,
    Bang,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    /// `|`
    Focus,
    /// `^`
    Anchor,
    At,
    Tilde,
    Ident,
    Equals,
    String,
    Number,
    Boolean,
    /// A balanced `{...}`/`[...]` attribute value, captured raw for a JSON
    /// decoder.
    Json,
    Text,
    Space,
}

/// A token with its decoded value and 1-based source position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    pub value: String,
    pub line: usize,
    pub column: usize,
}

impl Token {
    pub fn new(kind: TokenKind, value: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            kind,
            value: value.into(),
            line,
            column,
        }
    }

    /// True for the synthetic tokens that never carry source text.
    pub fn is_synthetic(&self) -> bool {
        matches!(self.kind, TokenKind::Indent | TokenKind::Dedent)
    }
}
