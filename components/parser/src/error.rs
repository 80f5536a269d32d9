//! Parser error types and helpers

use crate::lexer::Token;
use core_types::{ErrorKind, LuaError, SourcePosition};

/// Create a lexical error at a given position
pub fn lex_error(message: impl Into<String>, position: SourcePosition) -> LuaError {
    LuaError::new(ErrorKind::LexError, message).at(position)
}

/// Create a syntax error at a given position
pub fn parse_error(message: impl Into<String>, position: SourcePosition) -> LuaError {
    LuaError::new(ErrorKind::ParseError, message).at(position)
}

/// Create an unexpected token error describing the construct that was expected
pub fn unexpected_token(expected: &str, got: &Token) -> LuaError {
    parse_error(
        format!("expected {} near {}", expected, got.describe()),
        got.position,
    )
}
