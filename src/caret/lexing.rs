//! Lexing for the caret notation
//!
//! The lexer is a hand-rolled character scanner rather than a table-driven
//! one: the token boundaries depend on parser state (attribute position,
//! raw blocks), so tokens are pulled one at a time and the parser flips the
//! lexer's mode flags between pulls.
//!
//! Indentation handling
//!
//! Nesting is indentation-based, two spaces per level. The lexer keeps a
//! stack of established indent widths and converts changes at line starts
//! into synthetic `Indent`/`Dedent` tokens, which map onto brace tokens in
//! more conventional syntaxes and keep the parser a plain recursive
//! descent. A dedent across several levels yields one `Dedent` per level,
//! drained over successive calls. Raw-mode lines consume exactly the
//! established width; anything deeper is text, so code samples keep their
//! own indentation.

pub mod lexer;
pub mod tokens;

pub use lexer::Lexer;
pub use tokens::{Token, TokenKind};
