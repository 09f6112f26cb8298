//! rsharp_core: shared primitives for the rsharp front-end.
//!
//! Currently this is the source-location model used by the lexer, the
//! parser, the AST, and diagnostics.

pub mod location;

pub use location::{Location, Span};
