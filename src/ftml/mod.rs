//! Reference FTML grammar
//!
//! Turns FTML text into the engine's AST. The engine only sees it through
//! the [`Parser`](crate::syntax::Parser) trait.

pub mod lexer;
pub mod parser;

pub use parser::{parse_document, FtmlParser};
