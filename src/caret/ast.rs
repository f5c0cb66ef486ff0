//! The caret document tree
//!
//! An [`EditorState`] owns an ordered sequence of blocks plus an optional
//! [`Selection`]. The tree is immutable after parsing; the serializer and
//! matcher only read it.

pub mod elements;
pub mod selection;
pub mod state;
pub mod text_content;
pub mod treeviz;

pub use elements::{
    Attributes, Block, BlockObject, ContainerBlock, InlineNode, InlineObject, Mark, MarkMode,
    RawBlock, Text, TextBlock,
};
pub use selection::{Point, Selection};
pub use state::{EditorState, NodeRef};
pub use text_content::utf16_len;
pub use treeviz::to_treeviz_str;
