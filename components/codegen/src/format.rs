//! Source formatter
//!
//! Re-serializes a tree with normalized indentation and spacing, one
//! statement per line, keeping attached comments and single blank lines.

use crate::printer::Style;
use crate::writer::Writer;
use core_types::encode_source;
use parser::ast::Chunk;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Formatter configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatOptions {
    /// Spaces per block level
    pub indent_width: usize,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self { indent_width: 2 }
    }
}

/// Format `chunk` as newline-terminated source
pub fn format(chunk: &Chunk, options: &FormatOptions) -> Vec<u8> {
    let mut writer = Writer::new(
        Style::Format {
            indent_width: options.indent_width,
        },
        true,
    );
    writer.write_block(chunk);
    let formatted = encode_source(&writer.finish());
    debug!(
        statements = chunk.statements.len(),
        bytes = formatted.len(),
        "formatted chunk"
    );
    formatted
}
