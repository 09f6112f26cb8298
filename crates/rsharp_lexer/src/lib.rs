//! rsharp_lexer: converts source text into a token stream.
//!
//! The lexer exposes the two-cursor interface the parser is written
//! against: a consume cursor (`current`/`lookahead`/`advance`) and an
//! independent peek cursor (`start_peek`/`peek`) that supports unbounded
//! lookahead without perturbing consumption. `skip_current_block`
//! fast-forwards past a brace-matched body at character level for
//! method-skeleton parsing.

pub mod lexer;
pub mod token;

pub use lexer::Lexer;
pub use token::Token;
