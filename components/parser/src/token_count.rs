//! PICO-8 token accounting
//!
//! The runtime limits cartridges by an internal token count that is not the
//! number of lexical tokens: closing brackets, separators, `end` and `local`
//! are free, and a minus sign glued to a numeric literal is part of the
//! literal. The table below approximates that accounting.

use crate::lexer::{tokenize, Keyword, Symbol, Token, TokenKind};
use core_types::LuaError;
use serde::Serialize;

/// Maximum source size in bytes accepted by the runtime
pub const CHAR_LIMIT: usize = 32768;
/// Maximum token count accepted by the runtime
pub const TOKEN_LIMIT: usize = 8192;
/// Maximum compressed code size in bytes
pub const COMPRESSED_LIMIT: usize = 15360;

/// How a semantic token contributes to the count
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenCost {
    /// Counts as one token
    Unit,
    /// Does not count
    Free,
}

/// Classify one semantic token given its semantic neighbours.
pub fn classify(token: &Token, previous: Option<&Token>, next: Option<&Token>) -> TokenCost {
    match token.kind {
        TokenKind::Punctuation(
            Symbol::RParen
            | Symbol::RBracket
            | Symbol::RBrace
            | Symbol::Comma
            | Symbol::Dot
            | Symbol::Colon
            | Symbol::Semicolon
            | Symbol::DoubleColon,
        ) => TokenCost::Free,
        TokenKind::Keyword(Keyword::End | Keyword::Local) => TokenCost::Free,
        TokenKind::Operator(Symbol::Minus)
            if next.is_some_and(|t| t.kind == TokenKind::Number) && is_unary_position(previous) =>
        {
            TokenCost::Free
        }
        _ => TokenCost::Unit,
    }
}

/// Whether an operator following `previous` is a prefix operator.
fn is_unary_position(previous: Option<&Token>) -> bool {
    let Some(previous) = previous else {
        return true;
    };
    match previous.kind {
        TokenKind::Name | TokenKind::Number | TokenKind::String => false,
        TokenKind::Keyword(keyword) => !matches!(
            keyword,
            Keyword::True | Keyword::False | Keyword::Nil | Keyword::End
        ),
        TokenKind::Punctuation(symbol) => !matches!(
            symbol,
            Symbol::RParen | Symbol::RBracket | Symbol::RBrace | Symbol::Ellipsis
        ),
        _ => true,
    }
}

/// Count tokens the way the runtime does. Trivia in `tokens` is ignored.
pub fn count_tokens(tokens: &[Token]) -> usize {
    let semantic: Vec<&Token> = tokens.iter().filter(|t| t.is_semantic()).collect();
    semantic
        .iter()
        .enumerate()
        .filter(|(i, token)| {
            let previous = i.checked_sub(1).map(|p| semantic[p]);
            let next = semantic.get(i + 1).copied();
            classify(token, previous, next) == TokenCost::Unit
        })
        .count()
}

/// Number of semantic (indexed) tokens in a stream
pub fn count_semantic(tokens: &[Token]) -> usize {
    tokens.iter().filter(|t| t.is_semantic()).count()
}

/// Size of the source in runtime characters
pub fn count_chars(source: &[u8]) -> usize {
    source.len()
}

/// Number of lines in the source; a trailing newline does not open a line
pub fn count_lines(source: &[u8]) -> usize {
    if source.is_empty() {
        return 0;
    }
    let newlines = source.iter().filter(|&&b| b == b'\n').count();
    if source.ends_with(b"\n") {
        newlines
    } else {
        newlines + 1
    }
}

/// Cartridge title: the first line, when it is a comment
pub fn title(tokens: &[Token]) -> Option<String> {
    tokens
        .first()
        .filter(|t| t.kind == TokenKind::Comment)
        .map(comment_text)
}

/// Cartridge byline: the second line, when the first two lines are comments
pub fn byline(tokens: &[Token]) -> Option<String> {
    match tokens {
        [first, newline, second, ..]
            if first.kind == TokenKind::Comment
                && newline.kind == TokenKind::Newline
                && second.kind == TokenKind::Comment =>
        {
            Some(comment_text(second))
        }
        _ => None,
    }
}

fn comment_text(token: &Token) -> String {
    token.raw.trim_start_matches('-').trim().to_string()
}

/// Size metrics of one source buffer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CodeStats {
    /// Runtime token count
    pub tokens: usize,
    /// Semantic lexical token count
    pub semantic_tokens: usize,
    /// Character count
    pub chars: usize,
    /// Line count
    pub lines: usize,
    /// Title comment
    pub title: Option<String>,
    /// Byline comment
    pub byline: Option<String>,
}

impl CodeStats {
    /// Lex `source` and measure it
    pub fn measure(source: &[u8]) -> Result<Self, LuaError> {
        let tokens = tokenize(source)?;
        Ok(Self {
            tokens: count_tokens(&tokens),
            semantic_tokens: count_semantic(&tokens),
            chars: count_chars(source),
            lines: count_lines(source),
            title: title(&tokens),
            byline: byline(&tokens),
        })
    }

    /// Whether the runtime would reject the source as too large
    pub fn exceeds_limits(&self) -> bool {
        self.tokens > TOKEN_LIMIT || self.chars > CHAR_LIMIT
    }
}
