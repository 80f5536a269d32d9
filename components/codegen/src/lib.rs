//! Source serializers for PICO-8 Lua syntax trees
//!
//! Two alternate serializers share one tree writer:
//!
//! - [`minify`] - Renames identifiers and strips comments and whitespace
//! - [`format`] - Re-indents and re-spaces, keeping comments
//!
//! # Example
//!
//! ```
//! use codegen::{format, minify, FormatOptions, RenameOptions};
//!
//! let chunk = parser::parse(b"local speed = 2\nprint(speed)").unwrap();
//!
//! let minified = minify(&chunk, &RenameOptions::default()).unwrap();
//! assert_eq!(minified.renamed_source, b"local a=2\nprint(a)".to_vec());
//!
//! let formatted = format(&chunk, &FormatOptions::default());
//! assert_eq!(formatted, b"local speed = 2\nprint(speed)\n".to_vec());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod error;
pub mod format;
pub mod minify;
pub mod names;
pub mod printer;
pub mod writer;

pub use format::{format, FormatOptions};
pub use minify::{minify, Namespace, RenameKey, RenameMap, RenameOptions, RenameOutput};
pub use names::NameGenerator;
pub use printer::{tokens_merge, Style};
