//! PICO-8 Lua parser component
//!
//! Provides the lexer, token accounting, AST construction, tree traversal
//! and scope analysis for the PICO-8 dialect of Lua.
//!
//! # Overview
//!
//! - [`Lexer`] - Tokenizes source bytes, keeping comments and whitespace
//! - [`CodeStats`] - Runtime token, character and line counts
//! - [`Parser`] - Recursive descent parser producing a [`Chunk`]
//! - [`Visitor`] / [`VisitorMut`] - Tree walks shared by every pass
//! - [`ScopeResolver`] - Resolves names to bindings or globals
//!
//! # Example
//!
//! ```
//! use parser::{parse, ScopeResolver, StatementKind};
//!
//! let chunk = parse(b"t = 0\nmusic(0)").unwrap();
//! assert!(matches!(chunk.statements[1].kind, StatementKind::Call(_)));
//!
//! let scopes = ScopeResolver::new().resolve(&chunk);
//! assert!(scopes.is_global("music"));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod ast;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod scope;
pub mod token_count;
pub mod visit;

pub use ast::{Block, Chunk, Expression, ExpressionKind, Statement, StatementKind};
pub use lexer::{tokenize, Keyword, Lexer, Symbol, Token, TokenKind, TokenValue};
pub use parser::Parser;
pub use scope::{BindingId, BindingKind, Resolved, ScopeResolver, ScopeStack, ScopeTree};
pub use token_count::{count_tokens, CodeStats};
pub use visit::visit::Visitor;
pub use visit::visit_mut::VisitorMut;
pub use visit::{NameRole, ScopeKind};

use core_types::LuaError;

/// Lex and parse a complete source buffer
pub fn parse(source: &[u8]) -> Result<Chunk, LuaError> {
    Parser::from_source(source)?.parse()
}
