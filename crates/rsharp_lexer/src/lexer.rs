//! The scanner and the two-cursor token stream.

use std::collections::VecDeque;

use rsharp_ast::types::LiteralValue;
use rsharp_ast::TokenKind;
use rsharp_core::{Location, Span};
use rsharp_diagnostics::{messages, DiagnosticCollection};

use crate::token::Token;

/// The lexer owns the source text and produces tokens on demand.
///
/// Two cursors are maintained: the consume cursor (`current`/`lookahead`/
/// `advance`) and the peek cursor (`start_peek`/`peek`). Tokens scanned by
/// the peek cursor are buffered so that `advance` replays them; peeking
/// therefore never affects what the parser consumes.
pub struct Lexer {
    text: Vec<char>,
    pos: usize,
    line: u32,
    column: u32,
    /// The token just consumed.
    t: Token,
    /// The next unconsumed token.
    la: Token,
    /// Tokens scanned beyond `la` by the peek cursor.
    peeked: VecDeque<Token>,
    peek_index: usize,
    diagnostics: DiagnosticCollection,
}

impl Lexer {
    pub fn new(source: &str) -> Self {
        let mut lexer = Self {
            text: source.chars().collect(),
            pos: 0,
            line: 1,
            column: 1,
            t: Token::none(),
            la: Token::none(),
            peeked: VecDeque::new(),
            peek_index: 0,
            diagnostics: DiagnosticCollection::new(),
        };
        lexer.la = lexer.scan_token();
        lexer
    }

    // ========================================================================
    // The consume cursor
    // ========================================================================

    /// The token just consumed.
    #[inline]
    pub fn current(&self) -> &Token {
        &self.t
    }

    /// The next unconsumed token.
    #[inline]
    pub fn lookahead(&self) -> &Token {
        &self.la
    }

    /// Consume the lookahead token, making it current.
    pub fn advance(&mut self) {
        let next = match self.peeked.pop_front() {
            Some(tok) => tok,
            None => self.scan_token(),
        };
        self.t = std::mem::replace(&mut self.la, next);
    }

    // ========================================================================
    // The peek cursor
    // ========================================================================

    /// Reset the peek cursor to just after the lookahead token.
    #[inline]
    pub fn start_peek(&mut self) {
        self.peek_index = 0;
    }

    /// Return the token at the peek cursor and advance the peek cursor.
    /// Once the stream is exhausted this returns the EOF token on every
    /// call.
    pub fn peek(&mut self) -> Token {
        while self.peek_index >= self.peeked.len() {
            let at_eof = self
                .peeked
                .back()
                .map_or(self.la.kind == TokenKind::Eof, |t| t.kind == TokenKind::Eof);
            if at_eof {
                return self
                    .peeked
                    .back()
                    .cloned()
                    .unwrap_or_else(|| self.la.clone());
            }
            let tok = self.scan_token();
            self.peeked.push_back(tok);
        }
        let tok = self.peeked[self.peek_index].clone();
        self.peek_index += 1;
        tok
    }

    /// Fast-forward past a brace-matched body without tokenizing its
    /// interior. The lookahead token must be `{`; afterwards the current
    /// token is the matching `}` (or EOF, with a diagnostic) and the
    /// lookahead is the token after it.
    pub fn skip_current_block(&mut self) {
        debug_assert_eq!(self.la.kind, TokenKind::OpenCurly);
        self.peeked.clear();
        self.peek_index = 0;
        self.pos = self.la.end_offset;
        self.line = self.la.span.end.line;
        self.column = self.la.span.end.column;

        let mut depth = 1usize;
        let mut close = None;
        while self.pos < self.text.len() {
            let start_loc = self.location();
            match self.text[self.pos] {
                '{' => {
                    self.bump();
                    depth += 1;
                }
                '}' => {
                    self.bump();
                    depth -= 1;
                    if depth == 0 {
                        close = Some(Token::new(
                            TokenKind::CloseCurly,
                            Span::new(start_loc, self.location()),
                            self.pos,
                        ));
                        break;
                    }
                }
                '/' if self.char_at(1) == Some('/') => self.skip_line_comment(),
                '/' if self.char_at(1) == Some('*') => self.skip_block_comment(),
                '@' if self.char_at(1) == Some('"') => {
                    self.bump();
                    self.skip_verbatim_string_chars();
                }
                '"' => self.skip_string_chars(),
                '\'' => self.skip_char_chars(),
                _ => self.bump(),
            }
        }

        match close {
            Some(tok) => self.t = tok,
            None => {
                let loc = self.location();
                self.diagnostics
                    .report(loc, &messages::UNMATCHED_BLOCK, &[]);
                self.t = Token::new(TokenKind::Eof, Span::at(loc), self.pos);
            }
        }
        self.la = self.scan_token();
    }

    /// Take the accumulated lexical diagnostics.
    pub fn take_diagnostics(&mut self) -> DiagnosticCollection {
        std::mem::take(&mut self.diagnostics)
    }

    // ========================================================================
    // Raw character handling
    // ========================================================================

    #[inline]
    fn location(&self) -> Location {
        Location::new(self.line, self.column)
    }

    #[inline]
    fn ch(&self) -> Option<char> {
        self.text.get(self.pos).copied()
    }

    #[inline]
    fn char_at(&self, offset: usize) -> Option<char> {
        self.text.get(self.pos + offset).copied()
    }

    fn bump(&mut self) {
        if let Some(c) = self.ch() {
            self.pos += 1;
            if c == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
    }

    fn skip_line_comment(&mut self) {
        while let Some(c) = self.ch() {
            if c == '\n' {
                break;
            }
            self.bump();
        }
    }

    fn skip_block_comment(&mut self) {
        let start = self.location();
        self.bump(); // /
        self.bump(); // *
        loop {
            match self.ch() {
                None => {
                    self.diagnostics
                        .report(start, &messages::UNTERMINATED_COMMENT, &[]);
                    return;
                }
                Some('*') if self.char_at(1) == Some('/') => {
                    self.bump();
                    self.bump();
                    return;
                }
                _ => self.bump(),
            }
        }
    }

    fn skip_string_chars(&mut self) {
        self.bump(); // "
        while let Some(c) = self.ch() {
            match c {
                '"' => {
                    self.bump();
                    return;
                }
                '\\' => {
                    self.bump();
                    self.bump();
                }
                '\n' => return,
                _ => self.bump(),
            }
        }
    }

    fn skip_verbatim_string_chars(&mut self) {
        self.bump(); // "
        while let Some(c) = self.ch() {
            if c == '"' {
                if self.char_at(1) == Some('"') {
                    self.bump();
                    self.bump();
                } else {
                    self.bump();
                    return;
                }
            } else {
                self.bump();
            }
        }
    }

    fn skip_char_chars(&mut self) {
        self.bump(); // '
        if self.ch() == Some('\\') {
            self.bump();
            self.bump();
        } else {
            self.bump();
        }
        if self.ch() == Some('\'') {
            self.bump();
        }
    }

    // ========================================================================
    // Token scanning
    // ========================================================================

    fn scan_token(&mut self) -> Token {
        loop {
            match self.ch() {
                None => {
                    return Token::new(TokenKind::Eof, Span::at(self.location()), self.pos);
                }
                Some(c) if c.is_whitespace() => {
                    self.bump();
                }
                Some('/') if self.char_at(1) == Some('/') => self.skip_line_comment(),
                Some('/') if self.char_at(1) == Some('*') => self.skip_block_comment(),
                // Preprocessor directives are skipped as trivia; their
                // content is not interpreted.
                Some('#') => self.skip_line_comment(),
                Some(c) => {
                    let start = self.location();
                    let start_pos = self.pos;
                    if c == '_' || c.is_alphabetic() {
                        return self.scan_ident(start, start_pos, false);
                    }
                    if c == '@' {
                        match self.char_at(1) {
                            Some('"') => {
                                self.bump();
                                return self.scan_verbatim_string(start, start_pos);
                            }
                            Some(n) if n == '_' || n.is_alphabetic() => {
                                self.bump();
                                return self.scan_ident(start, self.pos, true);
                            }
                            _ => {
                                self.diagnostics
                                    .report(start, &messages::INVALID_CHARACTER, &["@"]);
                                self.bump();
                                continue;
                            }
                        }
                    }
                    if c.is_ascii_digit()
                        || (c == '.' && self.char_at(1).is_some_and(|n| n.is_ascii_digit()))
                    {
                        return self.scan_number(start, start_pos);
                    }
                    if c == '"' {
                        return self.scan_string(start, start_pos);
                    }
                    if c == '\'' {
                        return self.scan_char(start, start_pos);
                    }
                    if let Some(tok) = self.scan_operator(start) {
                        return tok;
                    }
                    self.diagnostics.report(
                        start,
                        &messages::INVALID_CHARACTER,
                        &[&c.to_string()],
                    );
                    self.bump();
                }
            }
        }
    }

    fn make(&self, kind: TokenKind, start: Location) -> Token {
        Token::new(kind, Span::new(start, self.location()), self.pos)
    }

    fn text_from(&self, start_pos: usize) -> String {
        self.text[start_pos..self.pos].iter().collect()
    }

    fn scan_ident(&mut self, start: Location, name_pos: usize, verbatim: bool) -> Token {
        while let Some(c) = self.ch() {
            if c == '_' || c.is_alphanumeric() {
                self.bump();
            } else {
                break;
            }
        }
        let name = self.text_from(name_pos);
        if !verbatim {
            if let Some(kind) = TokenKind::keyword_from_str(&name) {
                return match kind {
                    TokenKind::True => self.literal_token(start, name, LiteralValue::Bool(true), kind),
                    TokenKind::False => {
                        self.literal_token(start, name, LiteralValue::Bool(false), kind)
                    }
                    TokenKind::Null => self.literal_token(start, name, LiteralValue::Null, kind),
                    _ => self.make(kind, start),
                };
            }
        }
        let mut tok = self.make(TokenKind::Ident, start);
        tok.value = name;
        tok
    }

    /// `true`/`false`/`null` keep their keyword kind but also carry their
    /// decoded value so the primary-expression production can build the
    /// literal node without re-inspecting the spelling.
    fn literal_token(
        &self,
        start: Location,
        text: String,
        value: LiteralValue,
        kind: TokenKind,
    ) -> Token {
        let mut tok = self.make(kind, start);
        tok.value = text;
        tok.literal = Some(value);
        tok
    }

    // ------------------------------------------------------------------------
    // Numbers
    // ------------------------------------------------------------------------

    fn scan_number(&mut self, start: Location, start_pos: usize) -> Token {
        if self.ch() == Some('0')
            && matches!(self.char_at(1), Some('x') | Some('X'))
        {
            return self.scan_hex_number(start, start_pos);
        }

        let mut is_real = self.ch() == Some('.');
        if is_real {
            self.bump();
        }
        while self.ch().is_some_and(|c| c.is_ascii_digit()) {
            self.bump();
        }
        if !is_real
            && self.ch() == Some('.')
            && self.char_at(1).is_some_and(|c| c.is_ascii_digit())
        {
            is_real = true;
            self.bump();
            while self.ch().is_some_and(|c| c.is_ascii_digit()) {
                self.bump();
            }
        }
        if matches!(self.ch(), Some('e') | Some('E')) {
            let mut exp_len = 1;
            if matches!(self.char_at(1), Some('+') | Some('-')) {
                exp_len = 2;
            }
            if self.char_at(exp_len).is_some_and(|c| c.is_ascii_digit()) {
                is_real = true;
                for _ in 0..=exp_len {
                    self.bump();
                }
                while self.ch().is_some_and(|c| c.is_ascii_digit()) {
                    self.bump();
                }
            }
        }

        if is_real || matches!(self.ch(), Some('f' | 'F' | 'd' | 'D' | 'm' | 'M')) {
            let digits = self.text_from(start_pos);
            let suffix = match self.ch() {
                Some(c @ ('f' | 'F' | 'd' | 'D' | 'm' | 'M')) => {
                    self.bump();
                    Some(c.to_ascii_lowercase())
                }
                _ => None,
            };
            let raw = self.text_from(start_pos);
            let value = match digits.parse::<f64>() {
                Ok(v) => match suffix {
                    Some('f') => LiteralValue::Float(v as f32),
                    Some('m') => LiteralValue::Decimal(v),
                    _ => LiteralValue::Double(v),
                },
                Err(_) => {
                    self.diagnostics
                        .report(start, &messages::INVALID_NUMBER, &[&raw]);
                    LiteralValue::Double(0.0)
                }
            };
            return self.literal_token(start, raw, value, TokenKind::Literal);
        }

        let digits = self.text_from(start_pos);
        let (has_u, has_l) = self.scan_int_suffix();
        let raw = self.text_from(start_pos);
        let value = match digits.parse::<u128>() {
            Ok(v) => self.type_int_literal(v, has_u, has_l, start, &raw),
            Err(_) => {
                self.diagnostics
                    .report(start, &messages::INVALID_NUMBER, &[&raw]);
                LiteralValue::Int(0)
            }
        };
        self.literal_token(start, raw, value, TokenKind::Literal)
    }

    fn scan_hex_number(&mut self, start: Location, start_pos: usize) -> Token {
        self.bump(); // 0
        self.bump(); // x
        let digits_pos = self.pos;
        while self.ch().is_some_and(|c| c.is_ascii_hexdigit()) {
            self.bump();
        }
        let digits = self.text_from(digits_pos);
        let (has_u, has_l) = self.scan_int_suffix();
        let raw = self.text_from(start_pos);
        if digits.is_empty() {
            self.diagnostics
                .report(start, &messages::INVALID_NUMBER, &[&raw]);
            return self.literal_token(start, raw, LiteralValue::Int(0), TokenKind::Literal);
        }
        let value = match u128::from_str_radix(&digits, 16) {
            Ok(v) => self.type_int_literal(v, has_u, has_l, start, &raw),
            Err(_) => {
                self.diagnostics
                    .report(start, &messages::INVALID_NUMBER, &[&raw]);
                LiteralValue::Int(0)
            }
        };
        self.literal_token(start, raw, value, TokenKind::Literal)
    }

    fn scan_int_suffix(&mut self) -> (bool, bool) {
        let mut has_u = false;
        let mut has_l = false;
        for _ in 0..2 {
            match self.ch() {
                Some('u' | 'U') if !has_u => {
                    has_u = true;
                    self.bump();
                }
                Some('l' | 'L') if !has_l => {
                    has_l = true;
                    self.bump();
                }
                _ => break,
            }
        }
        (has_u, has_l)
    }

    /// Pick the first type the literal fits, per the suffix.
    fn type_int_literal(
        &mut self,
        v: u128,
        has_u: bool,
        has_l: bool,
        start: Location,
        raw: &str,
    ) -> LiteralValue {
        let value = match (has_u, has_l) {
            (false, false) => {
                if v <= i32::MAX as u128 {
                    Some(LiteralValue::Int(v as i32))
                } else if v <= i64::MAX as u128 {
                    Some(LiteralValue::Long(v as i64))
                } else if v <= u64::MAX as u128 {
                    Some(LiteralValue::ULong(v as u64))
                } else {
                    None
                }
            }
            (true, false) => {
                if v <= u32::MAX as u128 {
                    Some(LiteralValue::UInt(v as u32))
                } else if v <= u64::MAX as u128 {
                    Some(LiteralValue::ULong(v as u64))
                } else {
                    None
                }
            }
            (false, true) => {
                if v <= i64::MAX as u128 {
                    Some(LiteralValue::Long(v as i64))
                } else if v <= u64::MAX as u128 {
                    Some(LiteralValue::ULong(v as u64))
                } else {
                    None
                }
            }
            (true, true) => {
                if v <= u64::MAX as u128 {
                    Some(LiteralValue::ULong(v as u64))
                } else {
                    None
                }
            }
        };
        value.unwrap_or_else(|| {
            self.diagnostics
                .report(start, &messages::INVALID_NUMBER, &[raw]);
            LiteralValue::Int(0)
        })
    }

    // ------------------------------------------------------------------------
    // Strings and chars
    // ------------------------------------------------------------------------

    fn scan_string(&mut self, start: Location, start_pos: usize) -> Token {
        self.bump(); // "
        let mut value = String::new();
        loop {
            match self.ch() {
                None | Some('\n') => {
                    self.diagnostics
                        .report(start, &messages::UNTERMINATED_STRING_LITERAL, &[]);
                    break;
                }
                Some('"') => {
                    self.bump();
                    break;
                }
                Some('\\') => {
                    if let Some(c) = self.scan_escape() {
                        value.push(c);
                    }
                }
                Some(c) => {
                    value.push(c);
                    self.bump();
                }
            }
        }
        let raw = self.text_from(start_pos);
        self.literal_token(start, raw, LiteralValue::Str(value), TokenKind::Literal)
    }

    fn scan_verbatim_string(&mut self, start: Location, start_pos: usize) -> Token {
        self.bump(); // "
        let mut value = String::new();
        loop {
            match self.ch() {
                None => {
                    self.diagnostics
                        .report(start, &messages::UNTERMINATED_STRING_LITERAL, &[]);
                    break;
                }
                Some('"') => {
                    if self.char_at(1) == Some('"') {
                        value.push('"');
                        self.bump();
                        self.bump();
                    } else {
                        self.bump();
                        break;
                    }
                }
                Some(c) => {
                    value.push(c);
                    self.bump();
                }
            }
        }
        let raw = self.text_from(start_pos);
        self.literal_token(start, raw, LiteralValue::Str(value), TokenKind::Literal)
    }

    fn scan_char(&mut self, start: Location, start_pos: usize) -> Token {
        self.bump(); // '
        let value = match self.ch() {
            None | Some('\n') => {
                self.diagnostics
                    .report(start, &messages::UNTERMINATED_CHAR_LITERAL, &[]);
                '\0'
            }
            Some('\'') => {
                self.diagnostics
                    .report(start, &messages::EMPTY_CHAR_LITERAL, &[]);
                '\0'
            }
            Some('\\') => self.scan_escape().unwrap_or('\0'),
            Some(c) => {
                self.bump();
                c
            }
        };
        if self.ch() == Some('\'') {
            self.bump();
        } else {
            self.diagnostics
                .report(start, &messages::UNTERMINATED_CHAR_LITERAL, &[]);
        }
        let raw = self.text_from(start_pos);
        self.literal_token(start, raw, LiteralValue::Char(value), TokenKind::Literal)
    }

    /// Scan a `\`-escape; the cursor is on the backslash.
    fn scan_escape(&mut self) -> Option<char> {
        let start = self.location();
        self.bump(); // backslash
        let c = self.ch()?;
        self.bump();
        match c {
            '\'' => Some('\''),
            '"' => Some('"'),
            '\\' => Some('\\'),
            '0' => Some('\0'),
            'a' => Some('\x07'),
            'b' => Some('\x08'),
            'f' => Some('\x0c'),
            'n' => Some('\n'),
            'r' => Some('\r'),
            't' => Some('\t'),
            'v' => Some('\x0b'),
            'x' => self.scan_hex_escape(start, 1, 4),
            'u' => self.scan_hex_escape(start, 4, 4),
            'U' => self.scan_hex_escape(start, 8, 8),
            other => {
                self.diagnostics.report(
                    start,
                    &messages::INVALID_ESCAPE_SEQUENCE,
                    &[&format!("\\{}", other)],
                );
                Some(other)
            }
        }
    }

    fn scan_hex_escape(&mut self, start: Location, min: usize, max: usize) -> Option<char> {
        let mut value: u32 = 0;
        let mut count = 0;
        while count < max {
            match self.ch().and_then(|c| c.to_digit(16)) {
                Some(d) => {
                    value = value.wrapping_mul(16).wrapping_add(d);
                    self.bump();
                    count += 1;
                }
                None => break,
            }
        }
        if count < min {
            self.diagnostics
                .report(start, &messages::INVALID_ESCAPE_SEQUENCE, &["\\x"]);
            return Some('\0');
        }
        match char::from_u32(value) {
            Some(c) => Some(c),
            None => {
                self.diagnostics
                    .report(start, &messages::INVALID_ESCAPE_SEQUENCE, &["\\u"]);
                Some('\0')
            }
        }
    }

    // ------------------------------------------------------------------------
    // Operators and punctuation
    // ------------------------------------------------------------------------

    fn scan_operator(&mut self, start: Location) -> Option<Token> {
        use TokenKind::*;
        let c = self.ch()?;
        let next = self.char_at(1);
        let (kind, len) = match c {
            '=' => match next {
                Some('=') => (Equal, 2),
                _ => (Assign, 1),
            },
            '+' => match next {
                Some('+') => (Increment, 2),
                Some('=') => (PlusAssign, 2),
                _ => (Plus, 1),
            },
            '-' => match next {
                Some('-') => (Decrement, 2),
                Some('=') => (MinusAssign, 2),
                Some('>') => (Pointer, 2),
                _ => (Minus, 1),
            },
            '*' => match next {
                Some('=') => (TimesAssign, 2),
                _ => (Times, 1),
            },
            '/' => match next {
                Some('=') => (DivAssign, 2),
                _ => (Div, 1),
            },
            '%' => match next {
                Some('=') => (ModAssign, 2),
                _ => (Mod, 1),
            },
            '<' => match next {
                Some('<') if self.char_at(2) == Some('=') => (ShiftLeftAssign, 3),
                Some('<') => (ShiftLeft, 2),
                Some('=') => (LessEqual, 2),
                _ => (LessThan, 1),
            },
            // `>` is never combined into `>>`; nested generic argument
            // lists close one `>` at a time and the parser reassembles
            // shift-right where the expression grammar wants it.
            '>' => match next {
                Some('=') => (GreaterEqual, 2),
                _ => (GreaterThan, 1),
            },
            '&' => match next {
                Some('&') => (LogicalAnd, 2),
                Some('=') => (AndAssign, 2),
                _ => (BitwiseAnd, 1),
            },
            '|' => match next {
                Some('|') => (LogicalOr, 2),
                Some('=') => (OrAssign, 2),
                _ => (BitwiseOr, 1),
            },
            '^' => match next {
                Some('=') => (XorAssign, 2),
                _ => (Xor, 1),
            },
            '!' => match next {
                Some('=') => (NotEqual, 2),
                _ => (Not, 1),
            },
            '~' => (BitwiseComplement, 1),
            ':' => match next {
                Some(':') => (DoubleColon, 2),
                _ => (Colon, 1),
            },
            ';' => (Semicolon, 1),
            ',' => (Comma, 1),
            '.' => (Dot, 1),
            '?' => (Question, 1),
            '(' => (OpenParen, 1),
            ')' => (CloseParen, 1),
            '[' => (OpenSquare, 1),
            ']' => (CloseSquare, 1),
            '{' => (OpenCurly, 1),
            '}' => (CloseCurly, 1),
            _ => return None,
        };
        for _ in 0..len {
            self.bump();
        }
        Some(self.make(kind, start))
    }
}
