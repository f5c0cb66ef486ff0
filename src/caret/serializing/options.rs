//! Serializer options

/// Controls the layout of the serialized document.
///
/// `single_line` joins blocks with `;;` and renders containers in their
/// brace form instead of indentation. Raw blocks have no single-line form;
/// when any block in the document contains one, the serializer stays in
/// multiline layout regardless of this option.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SerializeOptions {
    pub single_line: bool,
}
