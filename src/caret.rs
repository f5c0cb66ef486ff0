//! The caret notation pipeline
//!
//! Parsing runs in two cooperating stages. The lexer scans characters into
//! tokens, tracking an indentation stack so that nesting arrives as
//! synthetic `Indent`/`Dedent` tokens. The parser drives the lexer through
//! three mode flags (`expect_ident`, `raw_mode`, `expect_attr_value`)
//! because the grammar is context-sensitive: whether a letter starts a type
//! name or plain text, and whether `{` opens an object or a JSON attribute
//! value, depends on where the parser currently stands. Each grammar
//! position determines the flags uniquely, so the flags replace
//! backtracking.
//!
//! The parser also threads a live `current_path`/`current_offset` pair
//! through tree construction, which lets it resolve the free-floating
//! selection markers `^` and `|` into tree coordinates the moment they are
//! encountered, without a second pass.
//!
//! Serialization is the mirror image: a tree walk that re-derives the same
//! candidate positions and re-inserts the markers, producing the canonical
//! form of the document. The matcher reuses the whole front-end to parse a
//! pattern fragment and then searches the document tree for it.

pub mod ast;
pub mod error;
pub mod lexing;
pub mod matching;
pub mod parsing;
pub mod serializing;
pub mod testing;

pub use ast::{
    Attributes, Block, BlockObject, ContainerBlock, EditorState, InlineNode, InlineObject, Mark,
    MarkMode, Point, RawBlock, Selection, Text, TextBlock,
};
pub use error::{ErrorCode, ParseError};
pub use matching::{get_point_after, get_point_before, get_range};
pub use parsing::parse;
pub use serializing::{serialize, SerializeOptions};
