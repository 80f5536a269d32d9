//! `require` inlining for PICO-8 Lua sources
//!
//! PICO-8 cartridges are a single code section, so a multi-file project is
//! flattened at build time. The resolver finds `require("m")` calls, reads
//! each module once from the search path and stores it as a function in a
//! small loader that evaluates every module on first use.
//!
//! # Example
//!
//! ```no_run
//! use module_resolver::{ModuleResolver, ResolverOptions};
//! use std::path::Path;
//!
//! let mut resolver = ModuleResolver::new(ResolverOptions::from_env());
//! let expansion = resolver
//!     .expand_source(b"X = require(\"mylib\")", Path::new("game/main.lua"))
//!     .unwrap();
//! for diagnostic in &expansion.diagnostics {
//!     eprintln!("{}", diagnostic.error);
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod error;
pub mod preamble;
pub mod requires;
pub mod resolver;
pub mod search_path;

pub use preamble::PRESERVED_NAMES;
pub use requires::{RequireCall, GAME_LOOP_FUNCTIONS};
pub use resolver::{
    Expansion, LoadState, ModuleRecord, ModuleResolver, ModuleTable, RequireDiagnostic,
    ResolverOptions,
};
pub use search_path::{DEFAULT_LUA_PATH, LUA_PATH_ENV};
