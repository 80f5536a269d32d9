//! Module resolution error helpers

use core_types::{ErrorKind, LuaError, SourcePosition};
use std::io;
use std::path::Path;

/// No search-path candidate exists for a require string
pub fn module_not_found(require_path: &str, search_path: &[String]) -> LuaError {
    LuaError::new(
        ErrorKind::ModuleNotFound,
        format!(
            "module '{}' not found; used search path '{}'",
            require_path,
            search_path.join(";")
        ),
    )
}

/// A require string or candidate leaves the starting directory
pub fn path_escape(require_path: &str) -> LuaError {
    LuaError::new(
        ErrorKind::PathEscape,
        format!(
            "require path '{}' must not be absolute or contain '.' or '..' components",
            require_path
        ),
    )
}

/// A candidate path resolved outside the starting directory
pub fn candidate_escape(candidate: &Path) -> LuaError {
    LuaError::new(
        ErrorKind::PathEscape,
        format!("'{}' is outside the starting directory", candidate.display()),
    )
}

/// A malformed `require` call
pub fn invalid_require(message: impl Into<String>, position: SourcePosition) -> LuaError {
    LuaError::new(ErrorKind::InvalidRequire, message).at(position)
}

/// Reading a module file failed
pub fn io_error(path: &Path, error: io::Error) -> LuaError {
    LuaError::new(ErrorKind::Io, error.to_string()).in_file(path)
}
