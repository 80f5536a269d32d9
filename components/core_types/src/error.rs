//! Error types shared by every stage of the toolchain.
//!
//! All stages report failures as a [`LuaError`]: a kind, a message, and
//! where known the source position and the file being processed.

use crate::SourcePosition;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// The kind of toolchain error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Malformed literal, unterminated string, or unexpected character
    LexError,
    /// Unexpected token while building the tree
    ParseError,
    /// No search-path candidate exists for a `require()` argument
    ModuleNotFound,
    /// A `require()` argument or candidate leaves the starting directory
    PathEscape,
    /// A `require()` call with arguments the build cannot expand
    InvalidRequire,
    /// Internal invariant violation in the renamer
    RenameCollision,
    /// A file could not be read
    Io,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::LexError => "LexError",
            ErrorKind::ParseError => "ParseError",
            ErrorKind::ModuleNotFound => "ModuleNotFound",
            ErrorKind::PathEscape => "PathEscape",
            ErrorKind::InvalidRequire => "InvalidRequire",
            ErrorKind::RenameCollision => "RenameCollision",
            ErrorKind::Io => "Io",
        };
        f.write_str(name)
    }
}

/// An error with kind, message and optional location.
///
/// # Examples
///
/// ```
/// use core_types::{ErrorKind, LuaError, SourcePosition};
///
/// let error = LuaError::new(ErrorKind::ParseError, "expected 'end'")
///     .at(SourcePosition::new(4, 1, 30));
///
/// assert_eq!(error.to_string(), "ParseError: expected 'end' at line 4 col 1");
/// ```
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{kind}: {message}{}", describe_location(.source_position, .file))]
pub struct LuaError {
    /// The type of error
    pub kind: ErrorKind,
    /// Human-readable error message
    pub message: String,
    /// Source position where the error occurred
    pub source_position: Option<SourcePosition>,
    /// File being processed when the error occurred
    pub file: Option<PathBuf>,
}

impl LuaError {
    /// Create an error without location information.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source_position: None,
            file: None,
        }
    }

    /// Attach a source position.
    pub fn at(mut self, position: SourcePosition) -> Self {
        self.source_position = Some(position);
        self
    }

    /// Attach the file the error belongs to, keeping any file already set.
    pub fn in_file(mut self, path: impl AsRef<Path>) -> Self {
        if self.file.is_none() {
            self.file = Some(path.as_ref().to_path_buf());
        }
        self
    }

    /// Line of the error, if known.
    pub fn line(&self) -> Option<u32> {
        self.source_position.map(|p| p.line)
    }
}

fn describe_location(position: &Option<SourcePosition>, file: &Option<PathBuf>) -> String {
    let mut location = String::new();
    if let Some(position) = position {
        location.push_str(&format!(" at {}", position));
    }
    if let Some(file) = file {
        location.push_str(&format!(" in {}", file.display()));
    }
    location
}

/// Result alias used across the toolchain.
pub type Result<T> = std::result::Result<T, LuaError>;
