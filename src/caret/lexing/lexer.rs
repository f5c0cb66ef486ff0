//! The caret lexer
//!
//! A pull lexer: the parser requests one token at a time and may flip the
//! mode flags between requests. Pulling lazily matters, because a flag set
//! after token N must govern the scan of token N+1.
//!
//! Line endings are normalized (CRLF to LF) before scanning. Lines and
//! columns are 1-based and counted in code points.

use crate::caret::error::{ErrorCode, ParseError};
use crate::caret::lexing::tokens::{Token, TokenKind};

/// Characters that end a plain text run outside raw mode.
fn ends_text_run(c: char, expect_attr_value: bool) -> bool {
    if c.is_ascii_digit() {
        return true;
    }
    match c {
        '\n' | ' ' | '\\' | ';' | ':' | '!' | '[' | ']' | '{' | '}' | '|' | '^' | '@' | '~'
        | '=' => true,
        '"' => expect_attr_value,
        _ => false,
    }
}

pub struct Lexer {
    chars: Vec<char>,
    pos: usize,
    line: usize,
    column: usize,
    indent_stack: Vec<usize>,
    pending_dedents: usize,
    at_line_start: bool,
    /// When set, a letter starts an `Ident` (or `Boolean`) instead of text.
    /// Cleared after any emitted token except `Newline`, `Indent`, `Dedent`
    /// and `Space`, so the parser can arm it before the separating space of
    /// an attribute is consumed.
    pub expect_ident: bool,
    /// Raw-block body: structure is suppressed, only `\n`, `|`, `^` and the
    /// two escapes `\|`/`\^` keep their meaning.
    pub raw_mode: bool,
    /// Attribute-value position: `"` opens a string and `{`/`[` open a
    /// balanced JSON capture. Off everywhere else so those characters stay
    /// plain text in inline content.
    pub expect_attr_value: bool,
}

impl Lexer {
    pub fn new(source: &str) -> Self {
        let normalized = source.replace("\r\n", "\n");
        Self {
            chars: normalized.chars().collect(),
            pos: 0,
            line: 1,
            column: 1,
            indent_stack: vec![0],
            pending_dedents: 0,
            at_line_start: true,
            expect_ident: false,
            raw_mode: false,
            expect_attr_value: false,
        }
    }

    fn peek_char(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_char_at(&self, ahead: usize) -> Option<char> {
        self.chars.get(self.pos + ahead).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek_char()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn indent_top(&self) -> usize {
        self.indent_stack.last().copied().unwrap_or(0)
    }

    /// Pull the next token. Synthetic `Indent`/`Dedent` tokens are produced
    /// at line starts; once the input is exhausted, any still-open levels
    /// dedent before the final `Eof`.
    pub fn next_token(&mut self) -> Result<Token, ParseError> {
        loop {
            if self.pending_dedents > 0 {
                self.pending_dedents -= 1;
                return Ok(Token::new(TokenKind::Dedent, "", self.line, self.column));
            }
            if self.at_line_start {
                if let Some(token) = self.handle_line_start()? {
                    return Ok(token);
                }
                continue;
            }
            if self.pos >= self.chars.len() {
                if self.indent_stack.len() > 1 {
                    self.indent_stack.pop();
                    return Ok(Token::new(TokenKind::Dedent, "", self.line, self.column));
                }
                return Ok(Token::new(TokenKind::Eof, "", self.line, self.column));
            }
            let token = if self.raw_mode {
                self.scan_raw()?
            } else {
                self.scan_normal()?
            };
            if !matches!(token.kind, TokenKind::Newline | TokenKind::Space) {
                self.expect_ident = false;
                self.expect_attr_value = false;
            }
            return Ok(token);
        }
    }

    /// Process the start of a line: skip blank lines, then turn the leading
    /// indentation into `Indent`/`Dedent` tokens per the off-side rules.
    /// Returns `None` when the line continues at the established level.
    fn handle_line_start(&mut self) -> Result<Option<Token>, ParseError> {
        // Blank lines (whitespace only) establish nothing and are skipped,
        // in raw mode as well.
        loop {
            let mut i = self.pos;
            while matches!(self.chars.get(i), Some(' ') | Some('\t')) {
                i += 1;
            }
            match self.chars.get(i) {
                Some('\n') => {
                    self.pos = i + 1;
                    self.line += 1;
                    self.column = 1;
                }
                None => {
                    self.pos = i;
                    self.at_line_start = false;
                    return Ok(None);
                }
                Some(_) => break,
            }
        }

        let top = self.indent_top();

        if self.raw_mode {
            let mut spaces = 0;
            while self.peek_char_at(spaces) == Some(' ') {
                spaces += 1;
            }
            if spaces >= top {
                // A raw line at (or deeper than) the block's level: consume
                // exactly the established width, the rest is line text.
                self.pos += top;
                self.column += top;
                self.at_line_start = false;
                return Ok(None);
            }
            // Shallower: the raw block ends here; fall through to the
            // ordinary dedent handling.
        }

        let mut width = 0;
        while let Some(c) = self.peek_char() {
            match c {
                ' ' => {
                    self.bump();
                    width += 1;
                }
                '\t' => {
                    return Err(ParseError::new(
                        ErrorCode::TabsInIndentation,
                        self.line,
                        self.column,
                    ));
                }
                _ => break,
            }
        }
        self.at_line_start = false;

        if width % 2 != 0 {
            return Err(ParseError::new(
                ErrorCode::IndentationNotMultipleOfTwo,
                self.line,
                1,
            ));
        }

        let top = self.indent_top();
        if width > top {
            if width != top + 2 {
                return Err(ParseError::new(ErrorCode::IndentationSkipsLevel, self.line, 1));
            }
            self.indent_stack.push(width);
            return Ok(Some(Token::new(TokenKind::Indent, "", self.line, 1)));
        }
        if width < top {
            let mut pops = 0;
            while self.indent_top() > width {
                self.indent_stack.pop();
                pops += 1;
            }
            if self.indent_top() != width {
                return Err(ParseError::with_detail(
                    ErrorCode::IndentationNotMultipleOfTwo,
                    self.line,
                    1,
                    "dedent to invalid level",
                ));
            }
            self.pending_dedents = pops - 1;
            return Ok(Some(Token::new(TokenKind::Dedent, "", self.line, 1)));
        }
        Ok(None)
    }

    fn scan_normal(&mut self) -> Result<Token, ParseError> {
        let (line, column) = (self.line, self.column);
        let c = match self.peek_char() {
            Some(c) => c,
            None => return Ok(Token::new(TokenKind::Eof, "", line, column)),
        };
        match c {
            '\n' => {
                self.bump();
                self.at_line_start = true;
                Ok(Token::new(TokenKind::Newline, "\n", line, column))
            }
            ' ' => {
                self.bump();
                Ok(Token::new(TokenKind::Space, " ", line, column))
            }
            ';' => {
                self.bump();
                if self.peek_char() == Some(';') {
                    self.bump();
                    Ok(Token::new(TokenKind::BlockSep, ";;", line, column))
                } else {
                    Ok(Token::new(TokenKind::Text, ";", line, column))
                }
            }
            ':' => self.single(TokenKind::Colon, ":", line, column),
            '!' => self.single(TokenKind::Bang, "!", line, column),
            '[' | '{' if self.expect_attr_value => self.scan_json(line, column),
            '[' => self.single(TokenKind::LBracket, "[", line, column),
            ']' => self.single(TokenKind::RBracket, "]", line, column),
            '{' => self.single(TokenKind::LBrace, "{", line, column),
            '}' => self.single(TokenKind::RBrace, "}", line, column),
            '|' => self.single(TokenKind::Focus, "|", line, column),
            '^' => self.single(TokenKind::Anchor, "^", line, column),
            '@' => self.single(TokenKind::At, "@", line, column),
            '~' => self.single(TokenKind::Tilde, "~", line, column),
            '=' => self.single(TokenKind::Equals, "=", line, column),
            '"' if self.expect_attr_value => self.scan_string(line, column),
            '"' => self.single(TokenKind::Text, "\"", line, column),
            '\\' => self.scan_escape(line, column),
            c if c.is_ascii_digit() => {
                let mut value = String::new();
                while matches!(self.peek_char(), Some(d) if d.is_ascii_digit()) {
                    value.push(self.bump().unwrap_or_default());
                }
                Ok(Token::new(TokenKind::Number, value, line, column))
            }
            c if self.expect_ident && c.is_ascii_alphabetic() => {
                let mut value = String::new();
                while matches!(
                    self.peek_char(),
                    Some(d) if d.is_ascii_alphanumeric() || d == '_' || d == '-'
                ) {
                    value.push(self.bump().unwrap_or_default());
                }
                let kind = if value == "true" || value == "false" {
                    TokenKind::Boolean
                } else {
                    TokenKind::Ident
                };
                Ok(Token::new(kind, value, line, column))
            }
            _ => {
                let mut value = String::new();
                while let Some(d) = self.peek_char() {
                    if ends_text_run(d, self.expect_attr_value) {
                        break;
                    }
                    value.push(d);
                    self.bump();
                }
                Ok(Token::new(TokenKind::Text, value, line, column))
            }
        }
    }

    fn single(
        &mut self,
        kind: TokenKind,
        value: &str,
        line: usize,
        column: usize,
    ) -> Result<Token, ParseError> {
        self.bump();
        Ok(Token::new(kind, value, line, column))
    }

    /// Decode a backslash escape outside raw mode. The result is a `Text`
    /// token carrying the decoded character, so escaped structure never
    /// re-triggers the grammar.
    fn scan_escape(&mut self, line: usize, column: usize) -> Result<Token, ParseError> {
        self.bump(); // backslash
        let c = self
            .bump()
            .ok_or_else(|| ParseError::new(ErrorCode::InvalidEscapeSequence, line, column))?;
        let decoded = match c {
            's' => ' ',
            't' => '\t',
            'n' => '\n',
            'r' => '\r',
            '\\' | '"' | '[' | ']' | '{' | '}' | '|' | '^' | ';' => c,
            'u' => self.scan_unicode_escape(line, column)?,
            _ => return Err(ParseError::new(ErrorCode::InvalidEscapeSequence, line, column)),
        };
        Ok(Token::new(
            TokenKind::Text,
            decoded.to_string(),
            line,
            column,
        ))
    }

    /// `\uXXXX`: exactly four hex digits naming a UTF-16 code unit. A lone
    /// surrogate has no `char` representation and is rejected.
    fn scan_unicode_escape(&mut self, line: usize, column: usize) -> Result<char, ParseError> {
        let mut code = 0u32;
        for _ in 0..4 {
            let d = self
                .bump()
                .and_then(|c| c.to_digit(16))
                .ok_or_else(|| ParseError::new(ErrorCode::InvalidEscapeSequence, line, column))?;
            code = code * 16 + d;
        }
        char::from_u32(code)
            .ok_or_else(|| ParseError::new(ErrorCode::InvalidEscapeSequence, line, column))
    }

    fn scan_string(&mut self, line: usize, column: usize) -> Result<Token, ParseError> {
        self.bump(); // opening quote
        let mut value = String::new();
        loop {
            match self.peek_char() {
                None | Some('\n') => {
                    return Err(ParseError::new(ErrorCode::UnclosedQuote, line, column));
                }
                Some('"') => {
                    self.bump();
                    return Ok(Token::new(TokenKind::String, value, line, column));
                }
                Some('\\') => {
                    let (esc_line, esc_column) = (self.line, self.column);
                    self.bump();
                    let c = self.bump().ok_or_else(|| {
                        ParseError::new(ErrorCode::UnclosedQuote, line, column)
                    })?;
                    match c {
                        '"' | '\\' => value.push(c),
                        'n' => value.push('\n'),
                        't' => value.push('\t'),
                        'r' => value.push('\r'),
                        'u' => value.push(self.scan_unicode_escape(esc_line, esc_column)?),
                        _ => {
                            return Err(ParseError::new(
                                ErrorCode::InvalidEscapeSequence,
                                esc_line,
                                esc_column,
                            ));
                        }
                    }
                }
                Some(c) => {
                    value.push(c);
                    self.bump();
                }
            }
        }
    }

    /// Capture a balanced `{...}`/`[...]` run verbatim. Depth counting only;
    /// the substring goes to a real JSON decoder in the parser. Strings are
    /// honored so braces inside them do not count.
    fn scan_json(&mut self, line: usize, column: usize) -> Result<Token, ParseError> {
        let mut value = String::new();
        let mut depth = 0usize;
        let mut in_string = false;
        loop {
            let c = match self.peek_char() {
                Some(c) => c,
                None => {
                    return Err(ParseError::with_detail(
                        ErrorCode::InvalidJson,
                        line,
                        column,
                        "unexpected end of input in JSON value",
                    ));
                }
            };
            value.push(c);
            self.bump();
            if in_string {
                match c {
                    '\\' => {
                        if let Some(escaped) = self.bump() {
                            value.push(escaped);
                        }
                    }
                    '"' => in_string = false,
                    _ => {}
                }
                continue;
            }
            match c {
                '"' => in_string = true,
                '{' | '[' => depth += 1,
                '}' | ']' => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        return Ok(Token::new(TokenKind::Json, value, line, column));
                    }
                }
                _ => {}
            }
        }
    }

    /// Raw-mode scanning: everything is text except newlines, the selection
    /// markers, and the two escapes `\|` and `\^`. Any other backslash is a
    /// literal backslash.
    fn scan_raw(&mut self) -> Result<Token, ParseError> {
        let (line, column) = (self.line, self.column);
        let c = match self.peek_char() {
            Some(c) => c,
            None => return Ok(Token::new(TokenKind::Eof, "", line, column)),
        };
        match c {
            '\n' => {
                self.bump();
                self.at_line_start = true;
                Ok(Token::new(TokenKind::Newline, "\n", line, column))
            }
            '|' => self.single(TokenKind::Focus, "|", line, column),
            '^' => self.single(TokenKind::Anchor, "^", line, column),
            '\\' => {
                self.bump();
                match self.peek_char() {
                    Some(marker @ ('|' | '^')) => {
                        self.bump();
                        Ok(Token::new(TokenKind::Text, marker.to_string(), line, column))
                    }
                    _ => Ok(Token::new(TokenKind::Text, "\\", line, column)),
                }
            }
            _ => {
                let mut value = String::new();
                while let Some(d) = self.peek_char() {
                    if matches!(d, '\n' | '|' | '^' | '\\') {
                        break;
                    }
                    value.push(d);
                    self.bump();
                }
                Ok(Token::new(TokenKind::Text, value, line, column))
            }
        }
    }
}
