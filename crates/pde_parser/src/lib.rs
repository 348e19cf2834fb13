//! Parser for Processing sketches.
//!
//! Recursive descent over the token stream of `pde_lexer`, producing the
//! closed tree of `pde_ast`. The parser accepts all three sketch shapes
//! (bare statements, top-level methods, a full `PApplet` subclass) and
//! mixtures of them; deciding the mode is left to the preprocessor.
//!
//! Parsing stops at the first syntax error. Errors carry messages in the
//! style of a generated grammar (`missing ';' at 'x'`, `mismatched input
//! 'x' expecting ...`, `no viable alternative at input '...'`) so that
//! diagnostic simplification can recognise them.

mod expr;
mod items;
pub mod parse;
mod stmt;

pub use parse::{parse_sketch, SyntaxError};
