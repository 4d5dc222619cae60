//! Lexer and parser for the Flux surface language.

pub mod ast;
pub mod lexer;
pub mod parser;
pub mod token;
pub mod token_type;

pub use parser::{ParseError, parse};
