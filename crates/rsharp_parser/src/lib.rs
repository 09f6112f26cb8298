//! rsharp_parser: a recursive-descent parser for a C# 2.0-era language.
//!
//! The parser consumes tokens from [`rsharp_lexer::Lexer`] and builds an
//! arena-allocated AST ([`rsharp_ast`]). The surface grammar is deeply
//! ambiguous at fixed lookahead (cast vs. parenthesized expression,
//! generic argument list vs. comparison, declaration vs. expression
//! statement), so productions consult pure peek-cursor predicates to pick
//! alternatives without consuming tokens.
//!
//! ```
//! use bumpalo::Bump;
//!
//! let arena = Bump::new();
//! let (unit, diagnostics) = rsharp_parser::parse(&arena, "class C { int f; }");
//! assert!(diagnostics.is_empty());
//! assert_eq!(unit.members.len(), 1);
//! ```

mod assembler;
mod parser;
mod predicates;
pub mod token_sets;

pub use parser::{Parser, ParserOptions};

use bumpalo::Bump;
use rsharp_ast::node::{CompilationUnit, Expression};
use rsharp_diagnostics::DiagnosticCollection;
use rsharp_lexer::Lexer;

/// Parse a compilation unit, consuming the source until EOF. Always
/// returns a best-effort tree; errors are reported through the returned
/// diagnostics.
pub fn parse<'a>(arena: &'a Bump, source: &str) -> (CompilationUnit<'a>, DiagnosticCollection) {
    parse_with_options(arena, source, ParserOptions::default())
}

pub fn parse_with_options<'a>(
    arena: &'a Bump,
    source: &str,
    options: ParserOptions,
) -> (CompilationUnit<'a>, DiagnosticCollection) {
    let mut parser = Parser::with_options(arena, Lexer::new(source), options);
    let unit = parser.parse_unit();
    (unit, parser.finish())
}

/// Parse a single expression (no surrounding statement).
pub fn parse_expression<'a>(
    arena: &'a Bump,
    source: &str,
) -> (Expression<'a>, DiagnosticCollection) {
    let mut parser = Parser::new(arena, Lexer::new(source));
    let expr = parser.parse_expression_root();
    (expr, parser.finish())
}
