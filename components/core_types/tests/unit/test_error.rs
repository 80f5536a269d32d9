//! Unit tests for LuaError and ErrorKind

use core_types::{ErrorKind, LuaError, SourcePosition};
use std::error::Error;

#[cfg(test)]
mod error_tests {
    use super::*;

    #[test]
    fn test_error_kind_display_names() {
        assert_eq!(ErrorKind::LexError.to_string(), "LexError");
        assert_eq!(ErrorKind::PathEscape.to_string(), "PathEscape");
        assert_eq!(ErrorKind::RenameCollision.to_string(), "RenameCollision");
    }

    #[test]
    fn test_error_carries_position() {
        let error = LuaError::new(ErrorKind::LexError, "unexpected character '`'")
            .at(SourcePosition::new(1, 5, 4));
        assert_eq!(error.line(), Some(1));
        assert_eq!(error.source_position.map(|p| p.column), Some(5));
    }

    #[test]
    fn test_error_is_std_error() {
        let error = LuaError::new(ErrorKind::Io, "permission denied");
        let boxed: Box<dyn Error> = Box::new(error);
        assert!(boxed.source().is_none());
        assert_eq!(boxed.to_string(), "Io: permission denied");
    }

    #[test]
    fn test_error_clone_equality() {
        let error = LuaError::new(ErrorKind::ParseError, "expected 'then'").in_file("a.lua");
        assert_eq!(error.clone(), error);
    }
}
