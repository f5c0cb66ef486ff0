//! The caret parser
//!
//! A recursive descent over the token stream. The parser owns the lexer and
//! arms its mode flags right before pulling the token each flag governs:
//! `expect_ident` ahead of every position where a type or attribute name can
//! start, `expect_attr_value` ahead of an attribute value, `raw_mode` for
//! the body of a raw block.
//!
//! Selection markers are resolved inline. The parser keeps `current_path`
//! (child-index path to the node under construction) and `current_offset`
//! (UTF-16 length of the text accumulated so far, or 0/1 around atomic
//! objects) up to date, so a `^` or `|` anywhere snapshots straight into
//! tree coordinates. The path recorded for a marker inside pending text
//! names the child index that text will occupy once flushed.

use serde_json::Value;

use crate::caret::ast::elements::{
    Attributes, Block, BlockObject, ContainerBlock, InlineNode, InlineObject, Mark, MarkMode,
    RawBlock, TextBlock,
};
use crate::caret::ast::selection::{Point, Selection};
use crate::caret::ast::state::EditorState;
use crate::caret::ast::text_content::utf16_len;
use crate::caret::error::{ErrorCode, ParseError};
use crate::caret::lexing::{Lexer, Token, TokenKind};

/// Parse a caret document into an editor state.
pub fn parse(input: &str) -> Result<EditorState, ParseError> {
    Parser::new(input).parse_document()
}

struct Parser {
    lexer: Lexer,
    peeked: Option<Token>,
    current_path: Vec<usize>,
    current_offset: usize,
    anchor: Option<Point>,
    focus: Option<Point>,
}

impl Parser {
    fn new(input: &str) -> Self {
        Self {
            lexer: Lexer::new(input),
            peeked: None,
            current_path: Vec::new(),
            current_offset: 0,
            anchor: None,
            focus: None,
        }
    }

    fn fill(&mut self) -> Result<(), ParseError> {
        if self.peeked.is_none() {
            self.peeked = Some(self.lexer.next_token()?);
        }
        Ok(())
    }

    fn peek_kind(&mut self) -> Result<TokenKind, ParseError> {
        self.fill()?;
        Ok(self
            .peeked
            .as_ref()
            .map(|t| t.kind)
            .unwrap_or(TokenKind::Eof))
    }

    fn advance(&mut self) -> Result<Token, ParseError> {
        self.fill()?;
        Ok(self
            .peeked
            .take()
            .unwrap_or_else(|| Token::new(TokenKind::Eof, "", 0, 0)))
    }

    fn expect_ident_token(&mut self) -> Result<Token, ParseError> {
        let token = self.advance()?;
        if token.kind != TokenKind::Ident {
            return Err(ParseError::new(
                ErrorCode::InvalidIdentifier,
                token.line,
                token.column,
            ));
        }
        Ok(token)
    }

    fn expect_colon(&mut self) -> Result<Token, ParseError> {
        let token = self.advance()?;
        if token.kind != TokenKind::Colon {
            return Err(ParseError::new(
                ErrorCode::MalformedAttribute,
                token.line,
                token.column,
            ));
        }
        Ok(token)
    }

    fn record_marker(&mut self, token: &Token) -> Result<(), ParseError> {
        let point = Point::new(self.current_path.clone(), self.current_offset);
        match token.kind {
            TokenKind::Anchor => {
                if self.anchor.is_some() {
                    return Err(ParseError::new(
                        ErrorCode::MultipleAnchor,
                        token.line,
                        token.column,
                    ));
                }
                self.anchor = Some(point);
            }
            TokenKind::Focus => {
                if self.focus.is_some() {
                    return Err(ParseError::new(
                        ErrorCode::MultipleFocus,
                        token.line,
                        token.column,
                    ));
                }
                self.focus = Some(point);
            }
            _ => {}
        }
        Ok(())
    }

    fn parse_document(mut self) -> Result<EditorState, ParseError> {
        let mut blocks = Vec::new();
        loop {
            self.lexer.expect_ident = true;
            match self.peek_kind()? {
                TokenKind::Newline | TokenKind::BlockSep => {
                    self.advance()?;
                }
                TokenKind::Eof => break,
                TokenKind::Indent => {
                    let token = self.advance()?;
                    return Err(ParseError::new(
                        ErrorCode::InvalidChildUnderTextBlock,
                        token.line,
                        token.column,
                    ));
                }
                _ => {
                    self.current_path = vec![blocks.len()];
                    let block = self.parse_block()?;
                    blocks.push(block);
                }
            }
        }
        if blocks.is_empty() {
            return Err(ParseError::new(ErrorCode::EmptyDocument, 1, 1));
        }
        let selection = match (self.anchor.take(), self.focus.take()) {
            (None, None) => None,
            (Some(anchor), None) => Some(Selection::collapsed(anchor)),
            (None, Some(focus)) => Some(Selection::collapsed(focus)),
            (Some(anchor), Some(focus)) => Some(Selection::new(anchor, focus)),
        };
        Ok(EditorState::new(blocks, selection))
    }

    fn parse_block(&mut self) -> Result<Block, ParseError> {
        match self.peek_kind()? {
            TokenKind::Anchor | TokenKind::Focus | TokenKind::LBrace => self.parse_block_object(),
            TokenKind::Ident => self.parse_typed_block(),
            _ => {
                let token = self.advance()?;
                Err(ParseError::new(
                    ErrorCode::InvalidIdentifier,
                    token.line,
                    token.column,
                ))
            }
        }
    }

    /// `{TYPE attrs}`, optionally wrapped in selection markers: offset 0
    /// before the opening brace, offset 1 after the closing one.
    fn parse_block_object(&mut self) -> Result<Block, ParseError> {
        while matches!(self.peek_kind()?, TokenKind::Anchor | TokenKind::Focus) {
            let token = self.advance()?;
            self.current_offset = 0;
            self.record_marker(&token)?;
        }
        let open = self.advance()?;
        if open.kind != TokenKind::LBrace {
            return Err(ParseError::new(
                ErrorCode::InvalidIdentifier,
                open.line,
                open.column,
            ));
        }
        self.lexer.expect_ident = true;
        let name = self.expect_ident_token()?;
        let attrs = self.parse_attrs()?;
        let close = self.advance()?;
        if close.kind != TokenKind::RBrace {
            return Err(ParseError::new(
                ErrorCode::UnbalancedBrace,
                close.line,
                close.column,
            ));
        }
        while matches!(self.peek_kind()?, TokenKind::Anchor | TokenKind::Focus) {
            let token = self.advance()?;
            self.current_offset = 1;
            self.record_marker(&token)?;
        }
        Ok(Block::Object(BlockObject::new(name.value, attrs)))
    }

    fn parse_typed_block(&mut self) -> Result<Block, ParseError> {
        let name = self.expect_ident_token()?;
        if self.peek_kind()? == TokenKind::Bang {
            self.advance()?;
            let attrs = self.parse_attrs()?;
            self.expect_colon()?;
            return self.parse_raw_block(name.value, attrs);
        }
        let attrs = self.parse_attrs()?;
        self.expect_colon()?;
        match self.peek_kind()? {
            TokenKind::Newline | TokenKind::Eof => self.parse_container_block(name.value, attrs),
            TokenKind::LBrace => self.parse_inline_container(name.value, attrs),
            TokenKind::Space => {
                self.advance()?;
                let base = self.current_path.clone();
                let children = self.parse_inline_content(&base)?;
                Ok(Block::Text(TextBlock::with_attrs(
                    name.value, attrs, children,
                )))
            }
            _ => {
                let token = self.advance()?;
                Err(ParseError::new(
                    ErrorCode::MissingSpaceAfterColon,
                    token.line,
                    token.column,
                ))
            }
        }
    }

    /// Multiline container: children live one indent level deeper.
    fn parse_container_block(
        &mut self,
        block_type: String,
        attrs: Attributes,
    ) -> Result<Block, ParseError> {
        while self.peek_kind()? == TokenKind::Newline {
            self.advance()?;
        }
        if self.peek_kind()? != TokenKind::Indent {
            let token = self.advance()?;
            return Err(ParseError::new(
                ErrorCode::EmptyContainer,
                token.line,
                token.column,
            ));
        }
        let indent = self.advance()?;
        let base = self.current_path.clone();
        let mut children = Vec::new();
        loop {
            self.lexer.expect_ident = true;
            match self.peek_kind()? {
                TokenKind::Newline | TokenKind::BlockSep => {
                    self.advance()?;
                }
                TokenKind::Dedent | TokenKind::Eof => break,
                TokenKind::Indent => {
                    let token = self.advance()?;
                    return Err(ParseError::new(
                        ErrorCode::InvalidChildUnderTextBlock,
                        token.line,
                        token.column,
                    ));
                }
                _ => {
                    self.current_path = base.clone();
                    self.current_path.push(children.len());
                    let block = self.parse_block()?;
                    children.push(block);
                }
            }
        }
        if self.peek_kind()? == TokenKind::Dedent {
            self.advance()?;
        }
        if children.is_empty() {
            return Err(ParseError::new(
                ErrorCode::EmptyContainer,
                indent.line,
                indent.column,
            ));
        }
        Ok(Block::Container(ContainerBlock {
            block_type,
            attrs,
            children,
        }))
    }

    /// Single-line container: `TYPE:{child;;child}`.
    fn parse_inline_container(
        &mut self,
        block_type: String,
        attrs: Attributes,
    ) -> Result<Block, ParseError> {
        let open = self.advance()?;
        let base = self.current_path.clone();
        let mut children = Vec::new();
        loop {
            self.lexer.expect_ident = true;
            match self.peek_kind()? {
                TokenKind::RBrace => {
                    self.advance()?;
                    break;
                }
                TokenKind::BlockSep => {
                    self.advance()?;
                }
                TokenKind::Eof | TokenKind::Newline => {
                    let token = self.advance()?;
                    return Err(ParseError::new(
                        ErrorCode::UnbalancedBrace,
                        token.line,
                        token.column,
                    ));
                }
                _ => {
                    self.current_path = base.clone();
                    self.current_path.push(children.len());
                    let block = self.parse_block()?;
                    children.push(block);
                }
            }
        }
        if children.is_empty() {
            return Err(ParseError::new(
                ErrorCode::EmptyContainer,
                open.line,
                open.column,
            ));
        }
        Ok(Block::Container(ContainerBlock {
            block_type,
            attrs,
            children,
        }))
    }

    /// Raw content: an indented run of lines with structure suppressed.
    /// Each line is a path target of its own, so markers inside raw lines
    /// record `(raw_path + [line_index], offset_in_line)`.
    fn parse_raw_block(
        &mut self,
        block_type: String,
        attrs: Attributes,
    ) -> Result<Block, ParseError> {
        // An empty raw body means the token after the newline already
        // belongs to a sibling block; arm the ident flag before looking.
        self.lexer.expect_ident = true;
        while self.peek_kind()? == TokenKind::Newline {
            self.advance()?;
        }
        if self.peek_kind()? != TokenKind::Indent {
            return Ok(Block::Raw(RawBlock {
                block_type,
                attrs,
                lines: Vec::new(),
            }));
        }
        self.advance()?;
        let base = self.current_path.clone();
        self.lexer.raw_mode = true;
        let mut lines: Vec<String> = Vec::new();
        let mut current_line = String::new();
        let mut in_line = false;
        loop {
            match self.peek_kind()? {
                TokenKind::Newline => {
                    self.advance()?;
                    lines.push(std::mem::take(&mut current_line));
                    in_line = false;
                }
                TokenKind::Dedent => {
                    self.advance()?;
                    break;
                }
                TokenKind::Eof => break,
                TokenKind::Focus | TokenKind::Anchor => {
                    let token = self.advance()?;
                    in_line = true;
                    self.current_path = base.clone();
                    self.current_path.push(lines.len());
                    self.current_offset = utf16_len(&current_line);
                    self.record_marker(&token)?;
                }
                _ => {
                    let token = self.advance()?;
                    in_line = true;
                    current_line.push_str(&token.value);
                }
            }
        }
        if in_line {
            lines.push(current_line);
        }
        self.lexer.raw_mode = false;
        Ok(Block::Raw(RawBlock {
            block_type,
            attrs,
            lines,
        }))
    }

    /// Inline content of a text block or mark, up to (not consuming) the
    /// enclosing terminator.
    fn parse_inline_content(&mut self, base: &[usize]) -> Result<Vec<InlineNode>, ParseError> {
        let mut children: Vec<InlineNode> = Vec::new();
        let mut current_text = String::new();
        loop {
            match self.peek_kind()? {
                TokenKind::Newline
                | TokenKind::Eof
                | TokenKind::RBracket
                | TokenKind::RBrace
                | TokenKind::Dedent
                | TokenKind::BlockSep => break,
                TokenKind::Anchor | TokenKind::Focus => {
                    let token = self.advance()?;
                    self.current_offset = utf16_len(&current_text);
                    self.current_path = base.to_vec();
                    self.current_path.push(children.len());
                    self.record_marker(&token)?;
                }
                TokenKind::LBracket => {
                    flush_text(&mut children, &mut current_text);
                    self.current_path = base.to_vec();
                    self.current_path.push(children.len());
                    let mark = self.parse_mark()?;
                    children.push(InlineNode::Mark(mark));
                }
                TokenKind::LBrace => {
                    flush_text(&mut children, &mut current_text);
                    self.current_path = base.to_vec();
                    self.current_path.push(children.len());
                    let object = self.parse_inline_object()?;
                    children.push(InlineNode::Object(object));
                }
                _ => {
                    let token = self.advance()?;
                    current_text.push_str(&token.value);
                }
            }
        }
        flush_text(&mut children, &mut current_text);
        coalesce_text(&mut children);
        Ok(children)
    }

    /// `'[' ('@'|'~')? IDENT attrs ':' inline_content ']'`
    fn parse_mark(&mut self) -> Result<Mark, ParseError> {
        self.advance()?; // [
        self.lexer.expect_ident = true;
        let mode = match self.peek_kind()? {
            TokenKind::At => {
                self.advance()?;
                self.lexer.expect_ident = true;
                MarkMode::Annotation
            }
            TokenKind::Tilde => {
                self.advance()?;
                self.lexer.expect_ident = true;
                MarkMode::Overlay
            }
            _ => MarkMode::Decorator,
        };
        let name = self.expect_ident_token()?;
        let attrs = self.parse_attrs()?;
        let colon = self.advance()?;
        if colon.kind != TokenKind::Colon {
            return Err(ParseError::new(
                ErrorCode::MissingColonInMark,
                colon.line,
                colon.column,
            ));
        }
        let base = self.current_path.clone();
        let children = self.parse_inline_content(&base)?;
        let close = self.advance()?;
        if close.kind != TokenKind::RBracket {
            return Err(ParseError::new(
                ErrorCode::UnbalancedBracket,
                close.line,
                close.column,
            ));
        }
        Ok(Mark {
            mark_type: name.value,
            mode,
            attrs,
            children,
        })
    }

    fn parse_inline_object(&mut self) -> Result<InlineObject, ParseError> {
        self.advance()?; // {
        self.lexer.expect_ident = true;
        let name = self.expect_ident_token()?;
        let attrs = self.parse_attrs()?;
        let close = self.advance()?;
        if close.kind != TokenKind::RBrace {
            return Err(ParseError::new(
                ErrorCode::UnbalancedBrace,
                close.line,
                close.column,
            ));
        }
        Ok(InlineObject::new(name.value, attrs))
    }

    /// `(SPACE IDENT '=' value)*`. The ident flag is armed before the
    /// leading space is consumed so it survives into the key.
    fn parse_attrs(&mut self) -> Result<Attributes, ParseError> {
        let mut attrs = Attributes::new();
        while self.peek_kind()? == TokenKind::Space {
            self.lexer.expect_ident = true;
            self.advance()?; // Space
            let key = self.advance()?;
            if key.kind != TokenKind::Ident {
                return Err(ParseError::new(
                    ErrorCode::MalformedAttribute,
                    key.line,
                    key.column,
                ));
            }
            let equals = self.advance()?;
            if equals.kind != TokenKind::Equals {
                return Err(ParseError::new(
                    ErrorCode::MalformedAttribute,
                    equals.line,
                    equals.column,
                ));
            }
            self.lexer.expect_ident = true;
            self.lexer.expect_attr_value = true;
            let value_token = self.advance()?;
            let value = self.attr_value(value_token)?;
            attrs.insert(key.value, value);
        }
        Ok(attrs)
    }

    fn attr_value(&mut self, token: Token) -> Result<Value, ParseError> {
        match token.kind {
            TokenKind::Json => serde_json::from_str(&token.value).map_err(|e| {
                ParseError::with_detail(
                    ErrorCode::InvalidJson,
                    token.line,
                    token.column,
                    e.to_string(),
                )
            }),
            TokenKind::String => Ok(Value::String(token.value)),
            TokenKind::Number => token.value.parse::<i64>().map(Value::from).map_err(|e| {
                ParseError::with_detail(
                    ErrorCode::MalformedAttribute,
                    token.line,
                    token.column,
                    e.to_string(),
                )
            }),
            TokenKind::Boolean => Ok(Value::Bool(token.value == "true")),
            TokenKind::Ident => Ok(Value::String(token.value)),
            _ => Err(ParseError::new(
                ErrorCode::MalformedAttribute,
                token.line,
                token.column,
            )),
        }
    }
}

fn flush_text(children: &mut Vec<InlineNode>, current_text: &mut String) {
    if !current_text.is_empty() {
        children.push(InlineNode::text(std::mem::take(current_text)));
    }
}

/// Merge adjacent text leaves. The flush discipline above should never
/// produce adjacency, but hand-assembled token sequences must not either.
fn coalesce_text(children: &mut Vec<InlineNode>) {
    let mut i = 1;
    while i < children.len() {
        let both_text = children[i].as_text().is_some() && children[i - 1].as_text().is_some();
        if both_text {
            if let InlineNode::Text(tail) = children.remove(i) {
                if let Some(InlineNode::Text(head)) = children.get_mut(i - 1) {
                    head.text.push_str(&tail.text);
                }
            }
        } else {
            i += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn text_block(state: &EditorState, i: usize) -> &TextBlock {
        match &state.blocks[i] {
            Block::Text(b) => b,
            other => panic!("expected text block, got {:?}", other),
        }
    }

    #[test]
    fn test_simple_text_block_with_cursor() {
        let state = parse("P: foo|").unwrap();
        assert_eq!(state.blocks.len(), 1);
        let block = text_block(&state, 0);
        assert_eq!(block.block_type, "P");
        assert_eq!(block.children, vec![InlineNode::text("foo")]);
        let selection = state.selection.unwrap();
        assert!(selection.is_collapsed());
        assert_eq!(selection.focus, Point::new(vec![0, 0], 3));
    }

    #[test]
    fn test_mark_with_annotation_mode_and_attrs() {
        let state = parse("P: [@link href=\"https://example.com\":foo]|").unwrap();
        let block = text_block(&state, 0);
        assert_eq!(block.children.len(), 1);
        match &block.children[0] {
            InlineNode::Mark(mark) => {
                assert_eq!(mark.mark_type, "link");
                assert_eq!(mark.mode, MarkMode::Annotation);
                assert_eq!(mark.attrs.get("href"), Some(&json!("https://example.com")));
                assert_eq!(mark.children, vec![InlineNode::text("foo")]);
            }
            other => panic!("expected mark, got {:?}", other),
        }
        let selection = state.selection.unwrap();
        assert_eq!(selection.focus, Point::new(vec![0, 1], 0));
        assert!(selection.is_collapsed());
    }

    #[test]
    fn test_container_with_nested_cursor() {
        let state = parse("UL:\n  LI: foo\n  LI: bar|").unwrap();
        match &state.blocks[0] {
            Block::Container(c) => {
                assert_eq!(c.block_type, "UL");
                assert_eq!(c.children.len(), 2);
                assert_eq!(c.children[1].block_type(), "LI");
            }
            other => panic!("expected container, got {:?}", other),
        }
        let selection = state.selection.unwrap();
        assert_eq!(selection.focus, Point::new(vec![0, 1, 0], 3));
    }

    #[test]
    fn test_raw_block_with_cursor() {
        let state = parse("CODE!:\n  const arr = [1, 2, 3]|").unwrap();
        match &state.blocks[0] {
            Block::Raw(raw) => {
                assert_eq!(raw.block_type, "CODE");
                assert_eq!(raw.lines, vec!["const arr = [1, 2, 3]".to_string()]);
            }
            other => panic!("expected raw block, got {:?}", other),
        }
        let selection = state.selection.unwrap();
        assert_eq!(selection.focus, Point::new(vec![0, 0], 21));
    }

    #[test]
    fn test_escaped_semicolons_stay_text() {
        let state = parse("P: foo\\;\\;bar|").unwrap();
        let block = text_block(&state, 0);
        assert_eq!(block.children, vec![InlineNode::text("foo;;bar")]);
        let selection = state.selection.unwrap();
        assert_eq!(selection.focus, Point::new(vec![0, 0], 8));
    }

    #[test]
    fn test_block_sep_splits_blocks() {
        let state = parse("P: a;;Q: b").unwrap();
        assert_eq!(state.blocks.len(), 2);
        assert_eq!(text_block(&state, 0).concat_text(), "a");
        assert_eq!(text_block(&state, 1).concat_text(), "b");
    }

    #[test]
    fn test_single_line_container() {
        let state = parse("UL:{LI: a;;LI: b}").unwrap();
        match &state.blocks[0] {
            Block::Container(c) => {
                assert_eq!(c.children.len(), 2);
            }
            other => panic!("expected container, got {:?}", other),
        }
    }

    #[test]
    fn test_nested_single_line_containers() {
        let state = parse("A:{B:{C: x}}").unwrap();
        match &state.blocks[0] {
            Block::Container(a) => match &a.children[0] {
                Block::Container(b) => {
                    assert_eq!(b.children[0].block_type(), "C");
                }
                other => panic!("expected inner container, got {:?}", other),
            },
            other => panic!("expected container, got {:?}", other),
        }
    }

    #[test]
    fn test_block_object_with_markers() {
        let state = parse("^{IMG src=\"x.png\"}|").unwrap();
        match &state.blocks[0] {
            Block::Object(obj) => {
                assert_eq!(obj.block_type, "IMG");
                assert_eq!(obj.attrs.get("src"), Some(&json!("x.png")));
            }
            other => panic!("expected block object, got {:?}", other),
        }
        let selection = state.selection.unwrap();
        assert_eq!(selection.anchor, Point::new(vec![0], 0));
        assert_eq!(selection.focus, Point::new(vec![0], 1));
    }

    #[test]
    fn test_inline_object_between_text() {
        let state = parse("P: a{img}|b").unwrap();
        let block = text_block(&state, 0);
        assert_eq!(block.children.len(), 3);
        assert!(matches!(&block.children[1], InlineNode::Object(o) if o.object_type == "img"));
        let selection = state.selection.unwrap();
        assert_eq!(selection.focus, Point::new(vec![0, 2], 0));
    }

    #[test]
    fn test_attr_forms() {
        let state = parse("P n=42 b=true s=\"quoted\" w=bare j={\"k\":[1,2]}: x").unwrap();
        let block = text_block(&state, 0);
        assert_eq!(block.attrs.get("n"), Some(&json!(42)));
        assert_eq!(block.attrs.get("b"), Some(&json!(true)));
        assert_eq!(block.attrs.get("s"), Some(&json!("quoted")));
        assert_eq!(block.attrs.get("w"), Some(&json!("bare")));
        assert_eq!(block.attrs.get("j"), Some(&json!({"k": [1, 2]})));
    }

    #[test]
    fn test_duplicate_attr_keys_last_wins() {
        let state = parse("P a=1 a=2: x").unwrap();
        assert_eq!(text_block(&state, 0).attrs.get("a"), Some(&json!(2)));
    }

    #[test]
    fn test_selection_order_determines_anchor() {
        let state = parse("P: |foo^").unwrap();
        let selection = state.selection.unwrap();
        assert_eq!(selection.focus, Point::new(vec![0, 0], 0));
        assert_eq!(selection.anchor, Point::new(vec![0, 0], 3));
    }

    #[test]
    fn test_anchor_only_collapses() {
        let state = parse("P: fo^o").unwrap();
        let selection = state.selection.unwrap();
        assert!(selection.is_collapsed());
        assert_eq!(selection.anchor, Point::new(vec![0, 0], 2));
    }

    #[test]
    fn test_no_selection_is_none() {
        let state = parse("P: foo").unwrap();
        assert!(state.selection.is_none());
    }

    #[test]
    fn test_marker_inside_mark() {
        let state = parse("P: [strong:ba|r]").unwrap();
        let selection = state.selection.unwrap();
        assert_eq!(selection.focus, Point::new(vec![0, 0, 0], 2));
    }

    #[test]
    fn test_empty_mark_children() {
        let state = parse("P: [strong:]").unwrap();
        let block = text_block(&state, 0);
        match &block.children[0] {
            InlineNode::Mark(mark) => assert!(mark.children.is_empty()),
            other => panic!("expected mark, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_raw_block() {
        let state = parse("CODE!:;;P: x").unwrap();
        match &state.blocks[0] {
            Block::Raw(raw) => assert!(raw.lines.is_empty()),
            other => panic!("expected raw block, got {:?}", other),
        }
    }

    #[test]
    fn test_raw_block_keeps_deeper_indentation() {
        let state = parse("CODE!:\n  if x:\n      deep\n  done").unwrap();
        match &state.blocks[0] {
            Block::Raw(raw) => {
                assert_eq!(
                    raw.lines,
                    vec![
                        "if x:".to_string(),
                        "    deep".to_string(),
                        "done".to_string(),
                    ]
                );
            }
            other => panic!("expected raw block, got {:?}", other),
        }
    }

    #[test]
    fn test_raw_mode_escapes() {
        let state = parse("CODE!:\n  a\\|b\\^c\\d").unwrap();
        match &state.blocks[0] {
            Block::Raw(raw) => assert_eq!(raw.lines, vec!["a|b^c\\d".to_string()]),
            other => panic!("expected raw block, got {:?}", other),
        }
    }

    #[test]
    fn test_errors() {
        assert_eq!(parse("").unwrap_err().code, ErrorCode::EmptyDocument);
        assert_eq!(parse("\n\n").unwrap_err().code, ErrorCode::EmptyDocument);
        assert_eq!(parse("UL:\nP: x").unwrap_err().code, ErrorCode::EmptyContainer);
        assert_eq!(parse("UL:{}").unwrap_err().code, ErrorCode::EmptyContainer);
        assert_eq!(parse("P:foo").unwrap_err().code, ErrorCode::MissingSpaceAfterColon);
        assert_eq!(parse("P: a|b|c").unwrap_err().code, ErrorCode::MultipleFocus);
        assert_eq!(parse("P: a^b^c").unwrap_err().code, ErrorCode::MultipleAnchor);
        assert_eq!(parse("P: [strong bar]").unwrap_err().code, ErrorCode::MalformedAttribute);
        assert_eq!(parse("P: [strong:bar").unwrap_err().code, ErrorCode::UnbalancedBracket);
        assert_eq!(parse("P: {img").unwrap_err().code, ErrorCode::UnbalancedBrace);
        assert_eq!(parse("P: foo\n  Q: bar").unwrap_err().code, ErrorCode::InvalidChildUnderTextBlock);
        assert_eq!(parse("P a: x").unwrap_err().code, ErrorCode::MalformedAttribute);
        assert_eq!(parse("P a=: x").unwrap_err().code, ErrorCode::MalformedAttribute);
        assert_eq!(parse("P j={\"a\":}: x").unwrap_err().code, ErrorCode::InvalidJson);
        assert_eq!(parse("9: x").unwrap_err().code, ErrorCode::InvalidIdentifier);
    }

    #[test]
    fn test_error_positions() {
        let err = parse("P: a|b|c").unwrap_err();
        assert_eq!((err.line, err.column), (1, 7));
        let err = parse("UL:\n\tLI: x").unwrap_err();
        assert_eq!(err.code, ErrorCode::TabsInIndentation);
        assert_eq!((err.line, err.column), (2, 1));
    }

    #[test]
    fn test_unicode_offsets_are_utf16() {
        let state = parse("P: a😀|b").unwrap();
        let selection = state.selection.clone().unwrap();
        // The emoji is two UTF-16 units.
        assert_eq!(selection.focus, Point::new(vec![0, 0], 3));
        assert_eq!(text_block(&state, 0).concat_text(), "a😀b");
    }

    #[test]
    fn test_coalesce_merges_adjacent_text() {
        let mut children = vec![InlineNode::text("a"), InlineNode::text("b")];
        coalesce_text(&mut children);
        assert_eq!(children, vec![InlineNode::text("ab")]);
    }
}
