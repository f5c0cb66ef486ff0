//! Pattern location inside a document

pub mod matcher;

pub use matcher::{get_point_after, get_point_before, get_range};
