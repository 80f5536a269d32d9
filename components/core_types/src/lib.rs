//! Core types shared by the PICO-8 Lua toolchain.
//!
//! This crate provides the foundational types used by every stage:
//! source positions, the common error type, and the byte/text mapping
//! used for 8-bit cartridge source.
//!
//! # Overview
//!
//! - [`LuaError`] - Toolchain errors with position and file
//! - [`ErrorKind`] - Types of toolchain errors
//! - [`SourcePosition`] - Source code location
//! - [`decode_source`] / [`encode_source`] - Lossless byte/text mapping
//!
//! # Examples
//!
//! ```
//! use core_types::{decode_source, encode_source, ErrorKind, LuaError};
//!
//! let text = decode_source(b"print(\"\x80\")");
//! assert_eq!(encode_source(&text), b"print(\"\x80\")".to_vec());
//!
//! let error = LuaError::new(ErrorKind::PathEscape, "'../secret' leaves the project");
//! assert_eq!(error.kind, ErrorKind::PathEscape);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

mod error;
mod source;
mod text;

pub use error::{ErrorKind, LuaError, Result};
pub use source::SourcePosition;
pub use text::{decode_source, encode_source};
