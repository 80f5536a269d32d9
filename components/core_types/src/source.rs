//! Source position type shared by tokens, tree nodes and diagnostics.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Represents a position in source code.
///
/// Lines and columns are 1-based; columns count bytes, since cartridge
/// source is an 8-bit character set.
///
/// # Examples
///
/// ```
/// use core_types::SourcePosition;
///
/// let pos = SourcePosition::new(3, 7, 42);
///
/// assert_eq!(pos.line, 3);
/// assert_eq!(pos.to_string(), "line 3 col 7");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct SourcePosition {
    /// Line number (1-indexed)
    pub line: u32,
    /// Column number (1-indexed)
    pub column: u32,
    /// Byte offset from the start of the source buffer
    pub offset: usize,
}

impl SourcePosition {
    /// Create a position from its parts.
    pub fn new(line: u32, column: u32, offset: usize) -> Self {
        Self {
            line,
            column,
            offset,
        }
    }

    /// Position of the first byte of a buffer.
    pub fn start() -> Self {
        Self::new(1, 1, 0)
    }
}

impl fmt::Display for SourcePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {} col {}", self.line, self.column)
    }
}
