//! Serialization back to caret notation
//!
//! The serializer produces the canonical form: one specific string per
//! tree/selection pair, which re-parses to an equal state.

pub mod options;
pub mod serializer;

pub use options::SerializeOptions;
pub use serializer::serialize;
