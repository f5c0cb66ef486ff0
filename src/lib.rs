//! # caret-parser
//!
//! A parser, serializer and pattern matcher for the caret notation: a flat
//! textual encoding of a rich-text editor state. A caret document is a tree
//! of blocks and inline nodes with typed attributes, plus an optional
//! selection whose endpoints (`^` for the anchor, `|` for the focus) are
//! embedded directly in the content.
//!
//! The crate exposes three pure operations over that notation:
//!
//! - [`caret::parse`] — text to [`caret::EditorState`]
//! - [`caret::serialize`] — [`caret::EditorState`] back to canonical text
//! - [`caret::get_range`] (and the point views) — locate a notation
//!   fragment inside a document
//!
//! ```
//! use caret_parser::caret;
//!
//! let state = caret::parse("P: hello|").unwrap();
//! assert_eq!(state.blocks.len(), 1);
//! let out = caret::serialize(&state, &caret::SerializeOptions::default());
//! assert_eq!(out, "P: hello|");
//! ```

pub mod caret;
