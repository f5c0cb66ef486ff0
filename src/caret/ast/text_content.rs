//! Text measurement helpers
//!
//! Selection offsets are counted in UTF-16 code units, the unit a
//! JavaScript-hosted editor counts `string.length` in. Text is stored as
//! UTF-8 `String`s, so offsets are measured rather than indexed.

/// UTF-16 length of a string.
pub fn utf16_len(s: &str) -> usize {
    s.encode_utf16().count()
}
