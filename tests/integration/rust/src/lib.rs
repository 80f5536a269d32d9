//! Integration test suite for the PICO-8 Lua toolchain
//!
//! This crate provides integration tests that verify components work
//! together correctly across component boundaries.

/// Re-export components for test convenience
pub mod components {
    pub use codegen;
    pub use core_types;
    pub use module_resolver;
    pub use parser;
    pub use pipeline;
}

/// Semantic token texts of `source`, trivia dropped
pub fn semantic_texts(source: &[u8]) -> Vec<String> {
    parser::tokenize(source)
        .map(|tokens| {
            tokens
                .into_iter()
                .filter(|t| t.is_semantic())
                .map(|t| t.raw)
                .collect()
        })
        .unwrap_or_default()
}
