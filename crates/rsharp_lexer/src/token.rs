//! Tokens produced by the lexer.

use rsharp_ast::types::LiteralValue;
use rsharp_ast::TokenKind;
use rsharp_core::{Location, Span};

/// A scanned token. `value` holds the text of identifiers and the raw
/// text of literals; punctuators and keywords leave it empty since their
/// kind is all the parser needs. `literal` holds the decoded value of
/// literal tokens.
#[derive(Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub value: String,
    pub literal: Option<LiteralValue>,
    pub span: Span,
    /// Char offset just past the token, used by `skip_current_block`.
    pub(crate) end_offset: usize,
}

impl Token {
    pub(crate) fn new(kind: TokenKind, span: Span, end_offset: usize) -> Self {
        Self {
            kind,
            value: String::new(),
            literal: None,
            span,
            end_offset,
        }
    }

    /// The placeholder token in `current()` position before the first
    /// `advance()`.
    pub(crate) fn none() -> Self {
        Self {
            kind: TokenKind::Eof,
            value: String::new(),
            literal: None,
            span: Span::at(Location::new(1, 1)),
            end_offset: 0,
        }
    }

    #[inline]
    pub fn start(&self) -> Location {
        self.span.start
    }

    #[inline]
    pub fn end(&self) -> Location {
        self.span.end
    }

    /// Whether this token is the identifier with the given spelling.
    /// Contextual keywords (`yield`, `where`, `get`, ...) are matched
    /// this way.
    #[inline]
    pub fn is_ident(&self, text: &str) -> bool {
        self.kind == TokenKind::Ident && self.value == text
    }
}
