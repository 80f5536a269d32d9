//! Line-oriented source printer
//!
//! The printer receives one lexical piece at a time and decides the spacing
//! between neighbours. Whatever the style, two pieces are separated when
//! their concatenation would lex differently.

use core_types::encode_source;
use parser::lexer::{tokenize, TokenKind};

/// Output layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    /// No indentation, minimal spacing, no trailing newline
    Minify,
    /// Indented, conventionally spaced, newline-terminated
    Format {
        /// Spaces per block level
        indent_width: usize,
    },
}

/// Spacing class of a piece
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PieceClass {
    /// Reserved word, including `not`, `nil`, `true` and `false`
    Keyword,
    /// Name, number, string or `...`
    Word,
    /// Binary operator, `=` or compound assignment
    BinOp,
    /// Prefix operator other than `not`
    Unary,
    /// `(`, `[` or `{`
    Open,
    /// `)`, `]` or `}`
    Close,
    /// `,`
    Comma,
    /// `;`
    Semicolon,
    /// `.`, `:` or `::`
    Access,
}

/// Accumulates pieces into lines
pub struct Printer {
    style: Style,
    lines: Vec<String>,
    current: String,
    last: Option<(PieceClass, String)>,
    indent: usize,
    inline: usize,
    force_space: bool,
}

impl Printer {
    /// Create an empty printer
    pub fn new(style: Style) -> Self {
        Self {
            style,
            lines: Vec::new(),
            current: String::new(),
            last: None,
            indent: 0,
            inline: 0,
            force_space: false,
        }
    }

    /// Append a piece to the current line
    pub fn piece(&mut self, class: PieceClass, text: &str) {
        if self.last.is_none() {
            if let Style::Format { indent_width } = self.style {
                self.current.push_str(&" ".repeat(self.indent * indent_width));
            }
        } else if self.force_space || self.needs_space(class, text) {
            self.current.push(' ');
        }
        self.force_space = false;
        self.current.push_str(text);
        self.last = Some((class, text.to_string()));
    }

    /// Finish the current line. Inside an inline region the next piece is
    /// separated by a space instead.
    pub fn end_line(&mut self) {
        if self.inline > 0 {
            self.force_space = self.last.is_some();
            return;
        }
        if self.last.take().is_some() {
            self.lines.push(std::mem::take(&mut self.current));
        }
        self.force_space = false;
    }

    /// Emit one empty line, collapsing runs and skipping the top of output
    pub fn blank_line(&mut self) {
        if self.inline > 0 || self.style == Style::Minify {
            return;
        }
        self.end_line();
        if self.lines.last().is_some_and(|line| !line.is_empty()) {
            self.lines.push(String::new());
        }
    }

    /// Emit a comment on its own line
    pub fn comment(&mut self, text: &str) {
        if self.inline > 0 {
            return;
        }
        self.end_line();
        let indent = match self.style {
            Style::Format { indent_width } => " ".repeat(self.indent * indent_width),
            Style::Minify => String::new(),
        };
        self.lines.push(format!("{}{}", indent, text));
    }

    /// Append a comment to the current line and finish it
    pub fn trailing_comment(&mut self, text: &str) {
        if self.inline > 0 {
            return;
        }
        if self.last.is_none() {
            self.comment(text);
            return;
        }
        self.current.push(' ');
        self.current.push_str(text);
        self.end_line();
    }

    /// Increase the block level
    pub fn indent(&mut self) {
        self.indent += 1;
    }

    /// Decrease the block level
    pub fn dedent(&mut self) {
        self.indent = self.indent.saturating_sub(1);
    }

    /// Keep everything up to the matching [`Printer::end_inline`] on one line
    pub fn begin_inline(&mut self) {
        self.inline += 1;
    }

    /// Close an inline region
    pub fn end_inline(&mut self) {
        self.inline = self.inline.saturating_sub(1);
        self.force_space = false;
    }

    /// The printed text
    pub fn finish(mut self) -> String {
        self.inline = 0;
        self.end_line();
        while self.lines.last().is_some_and(|line| line.is_empty()) {
            self.lines.pop();
        }
        let mut text = self.lines.join("\n");
        if matches!(self.style, Style::Format { .. }) && !text.is_empty() {
            text.push('\n');
        }
        text
    }

    fn needs_space(&self, class: PieceClass, text: &str) -> bool {
        let Some((last_class, last_text)) = &self.last else {
            return false;
        };
        if tokens_merge(last_text, text) || (is_number(last_text) && text.starts_with('.')) {
            return true;
        }
        match self.style {
            Style::Minify => false,
            Style::Format { .. } => format_space(*last_class, last_text, class),
        }
    }
}

/// Conventional spacing between two pieces
fn format_space(last: PieceClass, last_text: &str, next: PieceClass) -> bool {
    use PieceClass::*;
    match (last, next) {
        (_, Comma | Semicolon | Close | Access) => false,
        (Open | Access | Unary, _) => false,
        (Comma | Semicolon, _) => true,
        (BinOp, _) | (_, BinOp) => true,
        (Keyword, Open) => last_text != "function",
        (Word | Close, Open) => false,
        _ => true,
    }
}

fn is_number(text: &str) -> bool {
    let mut chars = text.chars();
    match chars.next() {
        Some(c) if c.is_ascii_digit() => true,
        Some('.') => chars.next().is_some_and(|c| c.is_ascii_digit()),
        _ => false,
    }
}

/// Lexed significant pieces of `text`, or `None` if it does not lex
fn lex_pieces(text: &str) -> Option<Vec<String>> {
    let tokens = tokenize(&encode_source(text)).ok()?;
    Some(
        tokens
            .into_iter()
            .filter(|t| t.is_semantic() || t.kind == TokenKind::Comment)
            .map(|t| t.raw)
            .collect(),
    )
}

/// Whether `left` immediately followed by `right` would lex differently
/// from the two pieces lexed apart.
pub fn tokens_merge(left: &str, right: &str) -> bool {
    let joined = format!("{}{}", left, right);
    match (lex_pieces(&joined), lex_pieces(left), lex_pieces(right)) {
        (Some(joined), Some(mut apart), Some(right)) => {
            apart.extend(right);
            joined != apart
        }
        _ => true,
    }
}
