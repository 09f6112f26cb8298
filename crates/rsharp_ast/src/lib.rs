//! rsharp_ast: token kinds and AST node definitions for the rsharp
//! front-end.
//!
//! The AST is arena-allocated: nodes reference child nodes via `&'a`
//! references and child lists via `&'a [T]` slices, with the `bumpalo`
//! arena owned by the caller of the parser.

pub mod node;
pub mod token_kind;
pub mod types;
pub mod visitor;

pub use token_kind::TokenKind;
pub use types::{LiteralValue, ModifierList, Modifiers};
