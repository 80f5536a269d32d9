//! PICO-8 Lua lexer - splits source bytes into semantic and trivia tokens
//!
//! The lexer is lossless: every byte of the input belongs to exactly one
//! token, so concatenating the raw text of the token stream reproduces the
//! source. Comments, whitespace and newlines are kept as trivia tokens.

use crate::error::lex_error;
use core_types::{decode_source, LuaError, SourcePosition};
use serde::Serialize;

/// Placeholder substituted into a name's decoded value for bytes outside
/// the identifier character class.
pub const NAME_PLACEHOLDER: char = '_';

/// Lua keywords
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Keyword {
    /// and
    And,
    /// break
    Break,
    /// do
    Do,
    /// else
    Else,
    /// elseif
    Elseif,
    /// end
    End,
    /// false
    False,
    /// for
    For,
    /// function
    Function,
    /// goto
    Goto,
    /// if
    If,
    /// in
    In,
    /// local
    Local,
    /// nil
    Nil,
    /// not
    Not,
    /// or
    Or,
    /// repeat
    Repeat,
    /// return
    Return,
    /// then
    Then,
    /// true
    True,
    /// until
    Until,
    /// while
    While,
}

impl Keyword {
    /// Every keyword, in alphabetical order.
    pub const ALL: [Keyword; 22] = [
        Keyword::And,
        Keyword::Break,
        Keyword::Do,
        Keyword::Else,
        Keyword::Elseif,
        Keyword::End,
        Keyword::False,
        Keyword::For,
        Keyword::Function,
        Keyword::Goto,
        Keyword::If,
        Keyword::In,
        Keyword::Local,
        Keyword::Nil,
        Keyword::Not,
        Keyword::Or,
        Keyword::Repeat,
        Keyword::Return,
        Keyword::Then,
        Keyword::True,
        Keyword::Until,
        Keyword::While,
    ];

    /// Source spelling of the keyword
    pub fn as_str(self) -> &'static str {
        match self {
            Keyword::And => "and",
            Keyword::Break => "break",
            Keyword::Do => "do",
            Keyword::Else => "else",
            Keyword::Elseif => "elseif",
            Keyword::End => "end",
            Keyword::False => "false",
            Keyword::For => "for",
            Keyword::Function => "function",
            Keyword::Goto => "goto",
            Keyword::If => "if",
            Keyword::In => "in",
            Keyword::Local => "local",
            Keyword::Nil => "nil",
            Keyword::Not => "not",
            Keyword::Or => "or",
            Keyword::Repeat => "repeat",
            Keyword::Return => "return",
            Keyword::Then => "then",
            Keyword::True => "true",
            Keyword::Until => "until",
            Keyword::While => "while",
        }
    }

    /// Look up the keyword spelled `name`
    pub fn from_name(name: &str) -> Option<Keyword> {
        Self::ALL.iter().copied().find(|k| k.as_str() == name)
    }
}

/// Whether `name` is a reserved word
pub fn is_keyword(name: &str) -> bool {
    Keyword::from_name(name).is_some()
}

/// Operators and punctuation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Symbol {
    /// (
    LParen,
    /// )
    RParen,
    /// {
    LBrace,
    /// }
    RBrace,
    /// [
    LBracket,
    /// ]
    RBracket,
    /// ;
    Semicolon,
    /// :
    Colon,
    /// ::
    DoubleColon,
    /// ,
    Comma,
    /// .
    Dot,
    /// ...
    Ellipsis,
    /// +
    Plus,
    /// -
    Minus,
    /// *
    Star,
    /// /
    Slash,
    /// \ (integer division)
    Backslash,
    /// %
    Percent,
    /// ^
    Caret,
    /// #
    Hash,
    /// ..
    Concat,
    /// ==
    EqEq,
    /// ~=
    TildeEq,
    /// !=
    BangEq,
    /// <
    Lt,
    /// <=
    LtEq,
    /// >
    Gt,
    /// >=
    GtEq,
    /// =
    Assign,
    /// &
    Amp,
    /// |
    Pipe,
    /// ^^ (bitwise xor)
    CaretCaret,
    /// ~
    Tilde,
    /// <<
    Shl,
    /// >>
    Shr,
    /// >>> (logical shift right)
    LShr,
    /// <<> (rotate left)
    RotL,
    /// >>< (rotate right)
    RotR,
    /// @ (peek)
    At,
    /// $ (peek4)
    Dollar,
    /// +=
    PlusEq,
    /// -=
    MinusEq,
    /// *=
    StarEq,
    /// /=
    SlashEq,
    /// \=
    BackslashEq,
    /// %=
    PercentEq,
    /// ^=
    CaretEq,
    /// ..=
    ConcatEq,
    /// |=
    PipeEq,
    /// &=
    AmpEq,
    /// ^^=
    CaretCaretEq,
    /// <<=
    ShlEq,
    /// >>=
    ShrEq,
    /// >>>=
    LShrEq,
    /// <<>=
    RotLEq,
    /// >><=
    RotREq,
}

/// Symbols ordered so that a prefix scan finds the longest match first.
const SYMBOLS: [Symbol; 56] = [
    Symbol::LShrEq,
    Symbol::RotLEq,
    Symbol::RotREq,
    Symbol::Ellipsis,
    Symbol::ConcatEq,
    Symbol::CaretCaretEq,
    Symbol::ShlEq,
    Symbol::ShrEq,
    Symbol::LShr,
    Symbol::RotL,
    Symbol::RotR,
    Symbol::DoubleColon,
    Symbol::Concat,
    Symbol::EqEq,
    Symbol::TildeEq,
    Symbol::BangEq,
    Symbol::LtEq,
    Symbol::GtEq,
    Symbol::CaretCaret,
    Symbol::Shl,
    Symbol::Shr,
    Symbol::PlusEq,
    Symbol::MinusEq,
    Symbol::StarEq,
    Symbol::SlashEq,
    Symbol::BackslashEq,
    Symbol::PercentEq,
    Symbol::CaretEq,
    Symbol::PipeEq,
    Symbol::AmpEq,
    Symbol::LParen,
    Symbol::RParen,
    Symbol::LBrace,
    Symbol::RBrace,
    Symbol::LBracket,
    Symbol::RBracket,
    Symbol::Semicolon,
    Symbol::Colon,
    Symbol::Comma,
    Symbol::Dot,
    Symbol::Plus,
    Symbol::Minus,
    Symbol::Star,
    Symbol::Slash,
    Symbol::Backslash,
    Symbol::Percent,
    Symbol::Caret,
    Symbol::Hash,
    Symbol::Lt,
    Symbol::Gt,
    Symbol::Assign,
    Symbol::Amp,
    Symbol::Pipe,
    Symbol::Tilde,
    Symbol::At,
    Symbol::Dollar,
];

impl Symbol {
    /// Source spelling of the symbol
    pub fn as_str(self) -> &'static str {
        match self {
            Symbol::LParen => "(",
            Symbol::RParen => ")",
            Symbol::LBrace => "{",
            Symbol::RBrace => "}",
            Symbol::LBracket => "[",
            Symbol::RBracket => "]",
            Symbol::Semicolon => ";",
            Symbol::Colon => ":",
            Symbol::DoubleColon => "::",
            Symbol::Comma => ",",
            Symbol::Dot => ".",
            Symbol::Ellipsis => "...",
            Symbol::Plus => "+",
            Symbol::Minus => "-",
            Symbol::Star => "*",
            Symbol::Slash => "/",
            Symbol::Backslash => "\\",
            Symbol::Percent => "%",
            Symbol::Caret => "^",
            Symbol::Hash => "#",
            Symbol::Concat => "..",
            Symbol::EqEq => "==",
            Symbol::TildeEq => "~=",
            Symbol::BangEq => "!=",
            Symbol::Lt => "<",
            Symbol::LtEq => "<=",
            Symbol::Gt => ">",
            Symbol::GtEq => ">=",
            Symbol::Assign => "=",
            Symbol::Amp => "&",
            Symbol::Pipe => "|",
            Symbol::CaretCaret => "^^",
            Symbol::Tilde => "~",
            Symbol::Shl => "<<",
            Symbol::Shr => ">>",
            Symbol::LShr => ">>>",
            Symbol::RotL => "<<>",
            Symbol::RotR => ">><",
            Symbol::At => "@",
            Symbol::Dollar => "$",
            Symbol::PlusEq => "+=",
            Symbol::MinusEq => "-=",
            Symbol::StarEq => "*=",
            Symbol::SlashEq => "/=",
            Symbol::BackslashEq => "\\=",
            Symbol::PercentEq => "%=",
            Symbol::CaretEq => "^=",
            Symbol::ConcatEq => "..=",
            Symbol::PipeEq => "|=",
            Symbol::AmpEq => "&=",
            Symbol::CaretCaretEq => "^^=",
            Symbol::ShlEq => "<<=",
            Symbol::ShrEq => ">>=",
            Symbol::LShrEq => ">>>=",
            Symbol::RotLEq => "<<>=",
            Symbol::RotREq => ">><=",
        }
    }

    /// Whether the symbol is punctuation rather than an operator
    pub fn is_punctuation(self) -> bool {
        matches!(
            self,
            Symbol::LParen
                | Symbol::RParen
                | Symbol::LBrace
                | Symbol::RBrace
                | Symbol::LBracket
                | Symbol::RBracket
                | Symbol::Semicolon
                | Symbol::Colon
                | Symbol::DoubleColon
                | Symbol::Comma
                | Symbol::Dot
                | Symbol::Ellipsis
        )
    }

    /// Whether the symbol is a compound assignment operator such as `+=`
    pub fn is_compound_assignment(self) -> bool {
        matches!(
            self,
            Symbol::PlusEq
                | Symbol::MinusEq
                | Symbol::StarEq
                | Symbol::SlashEq
                | Symbol::BackslashEq
                | Symbol::PercentEq
                | Symbol::CaretEq
                | Symbol::ConcatEq
                | Symbol::PipeEq
                | Symbol::AmpEq
                | Symbol::CaretCaretEq
                | Symbol::ShlEq
                | Symbol::ShrEq
                | Symbol::LShrEq
                | Symbol::RotLEq
                | Symbol::RotREq
        )
    }
}

/// Token classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TokenKind {
    /// Identifier
    Name,
    /// Reserved word
    Keyword(Keyword),
    /// Numeric literal
    Number,
    /// Quoted or long-bracket string literal
    String,
    /// Operator, including `=` and compound assignments
    Operator(Symbol),
    /// Brackets, separators and `...`
    Punctuation(Symbol),
    /// Line or long comment
    Comment,
    /// Spaces, tabs and carriage returns
    Whitespace,
    /// A single `\n`
    Newline,
    /// End of the buffer
    EndOfInput,
}

/// Decoded value of a literal or name token
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum TokenValue {
    /// Name with out-of-class bytes replaced by [`NAME_PLACEHOLDER`]
    Name(String),
    /// Numeric value
    Number(f64),
    /// String contents after escape processing
    Str(String),
}

/// A lexical token
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Token {
    /// Token classification
    pub kind: TokenKind,
    /// Exact source text, one `char` per source byte
    pub raw: String,
    /// Position of the first byte
    pub position: SourcePosition,
    /// Semantic token index; `None` for trivia and end of input
    pub index: Option<usize>,
    /// Decoded value for names, numbers and strings
    pub value: Option<TokenValue>,
}

impl Token {
    /// Whether the token counts as program text rather than trivia
    pub fn is_semantic(&self) -> bool {
        !matches!(
            self.kind,
            TokenKind::Comment | TokenKind::Whitespace | TokenKind::Newline | TokenKind::EndOfInput
        )
    }

    /// Whether the token is the given keyword
    pub fn is_keyword(&self, keyword: Keyword) -> bool {
        self.kind == TokenKind::Keyword(keyword)
    }

    /// The operator or punctuation symbol, if any
    pub fn symbol(&self) -> Option<Symbol> {
        match self.kind {
            TokenKind::Operator(sym) | TokenKind::Punctuation(sym) => Some(sym),
            _ => None,
        }
    }

    /// Whether the token is the given symbol
    pub fn is_symbol(&self, symbol: Symbol) -> bool {
        self.symbol() == Some(symbol)
    }

    /// Line on which the token's last byte sits
    pub fn end_line(&self) -> u32 {
        let newlines = self.raw.matches('\n').count() as u32;
        if self.kind == TokenKind::Newline {
            self.position.line
        } else {
            self.position.line + newlines
        }
    }

    /// Short human-readable description for diagnostics
    pub fn describe(&self) -> String {
        match self.kind {
            TokenKind::EndOfInput => "end of input".to_string(),
            _ => format!("'{}'", self.raw),
        }
    }
}

/// Tokenize a complete buffer, ending with an [`TokenKind::EndOfInput`] token.
pub fn tokenize(source: &[u8]) -> Result<Vec<Token>, LuaError> {
    Lexer::new(source).tokenize()
}

/// Streaming lexer over a byte buffer
pub struct Lexer<'a> {
    source: &'a [u8],
    position: usize,
    line: u32,
    column: u32,
    next_index: usize,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the given source bytes
    pub fn new(source: &'a [u8]) -> Self {
        Self {
            source,
            position: 0,
            line: 1,
            column: 1,
            next_index: 0,
        }
    }

    /// Lex the whole buffer
    pub fn tokenize(mut self) -> Result<Vec<Token>, LuaError> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let done = token.kind == TokenKind::EndOfInput;
            tokens.push(token);
            if done {
                return Ok(tokens);
            }
        }
    }

    /// Get the next token, trivia included
    pub fn next_token(&mut self) -> Result<Token, LuaError> {
        let start = self.current_position();
        let (kind, value) = self.scan_token(start)?;
        let raw = decode_source(&self.source[start.offset..self.position]);
        let mut token = Token {
            kind,
            raw,
            position: start,
            index: None,
            value,
        };
        if token.is_semantic() {
            token.index = Some(self.next_index);
            self.next_index += 1;
        }
        Ok(token)
    }

    fn scan_token(
        &mut self,
        start: SourcePosition,
    ) -> Result<(TokenKind, Option<TokenValue>), LuaError> {
        if self.is_at_end() {
            return Ok((TokenKind::EndOfInput, None));
        }

        match self.peek() {
            b'\n' => {
                self.advance();
                Ok((TokenKind::Newline, None))
            }
            c if is_whitespace(c) => {
                while !self.is_at_end() && is_whitespace(self.peek()) {
                    self.advance();
                }
                Ok((TokenKind::Whitespace, None))
            }
            b'-' if self.peek_at(1) == Some(b'-') => {
                self.scan_comment(start)?;
                Ok((TokenKind::Comment, None))
            }
            quote @ (b'"' | b'\'') => {
                let value = self.scan_string(quote, start)?;
                Ok((TokenKind::String, Some(TokenValue::Str(value))))
            }
            b'[' if self.long_bracket_level().is_some() => {
                let value = self.scan_long_bracket(start, "unterminated long string")?;
                Ok((TokenKind::String, Some(TokenValue::Str(value))))
            }
            b'0'..=b'9' => {
                let value = self.scan_number(start)?;
                Ok((TokenKind::Number, Some(TokenValue::Number(value))))
            }
            b'.' if self.peek_at(1).is_some_and(|c| c.is_ascii_digit()) => {
                let value = self.scan_number(start)?;
                Ok((TokenKind::Number, Some(TokenValue::Number(value))))
            }
            c if is_name_start(c) => Ok(self.scan_name(start.offset)),
            _ => self.scan_symbol(start),
        }
    }

    fn scan_comment(&mut self, start: SourcePosition) -> Result<(), LuaError> {
        self.advance();
        self.advance();
        if self.peek_if(b'[') && self.long_bracket_level().is_some() {
            self.scan_long_bracket(start, "unterminated long comment")?;
            return Ok(());
        }
        while !self.is_at_end() && self.peek() != b'\n' {
            self.advance();
        }
        Ok(())
    }

    /// Number of `=` signs in a long bracket opener at the current position.
    fn long_bracket_level(&self) -> Option<usize> {
        let mut offset = 1;
        while self.peek_at(offset) == Some(b'=') {
            offset += 1;
        }
        if self.peek_at(0) == Some(b'[') && self.peek_at(offset) == Some(b'[') {
            Some(offset - 1)
        } else {
            None
        }
    }

    fn scan_long_bracket(
        &mut self,
        start: SourcePosition,
        unterminated: &str,
    ) -> Result<String, LuaError> {
        let level = self.long_bracket_level().unwrap_or(0);
        for _ in 0..level + 2 {
            self.advance();
        }
        if self.peek_if(b'\r') && self.peek_at(1) == Some(b'\n') {
            self.advance();
            self.advance();
        } else if self.peek_if(b'\n') {
            self.advance();
        }

        let mut value = String::new();
        loop {
            if self.is_at_end() {
                return Err(lex_error(unterminated, start));
            }
            if self.peek() == b']' && self.closes_long_bracket(level) {
                for _ in 0..level + 2 {
                    self.advance();
                }
                return Ok(value);
            }
            value.push(self.advance() as char);
        }
    }

    fn closes_long_bracket(&self, level: usize) -> bool {
        (1..=level).all(|i| self.peek_at(i) == Some(b'=')) && self.peek_at(level + 1) == Some(b']')
    }

    fn scan_string(&mut self, quote: u8, start: SourcePosition) -> Result<String, LuaError> {
        self.advance();
        let mut value = String::new();
        loop {
            if self.is_at_end() || self.peek() == b'\n' {
                return Err(lex_error("unterminated string", start));
            }
            let c = self.advance();
            if c == quote {
                return Ok(value);
            }
            if c == b'\\' {
                self.scan_escape(&mut value, start)?;
            } else {
                value.push(c as char);
            }
        }
    }

    fn scan_escape(&mut self, value: &mut String, start: SourcePosition) -> Result<(), LuaError> {
        if self.is_at_end() {
            return Err(lex_error("unterminated string", start));
        }
        let escape_position = self.current_position();
        let escaped = self.advance();
        let byte = match escaped {
            b'a' => 7,
            b'b' => 8,
            b't' => 9,
            b'n' | b'\n' => 10,
            b'v' => 11,
            b'f' => 12,
            b'r' => 13,
            // P8SCII control codes
            b'*' => 1,
            b'#' => 2,
            b'-' => 3,
            b'|' => 4,
            b'+' => 5,
            b'^' => 6,
            b'x' => {
                let digits: Vec<u8> = (0..2).filter_map(|i| self.peek_at(i)).collect();
                if digits.len() < 2 || !digits.iter().all(u8::is_ascii_hexdigit) {
                    return Err(lex_error("malformed hexadecimal escape", escape_position));
                }
                self.advance();
                self.advance();
                let text = decode_source(&digits);
                u8::from_str_radix(&text, 16)
                    .map_err(|_| lex_error("malformed hexadecimal escape", escape_position))?
            }
            b'z' => {
                while !self.is_at_end() && (is_whitespace(self.peek()) || self.peek() == b'\n') {
                    self.advance();
                }
                return Ok(());
            }
            d if d.is_ascii_digit() => {
                let mut code = u32::from(d - b'0');
                for _ in 0..2 {
                    match self.peek_at(0) {
                        Some(next) if next.is_ascii_digit() => {
                            self.advance();
                            code = code * 10 + u32::from(next - b'0');
                        }
                        _ => break,
                    }
                }
                u8::try_from(code)
                    .map_err(|_| lex_error("decimal escape too large", escape_position))?
            }
            other => other,
        };
        value.push(byte as char);
        Ok(())
    }

    fn scan_number(&mut self, start: SourcePosition) -> Result<f64, LuaError> {
        let radix = match (self.peek(), self.peek_at(1)) {
            (b'0', Some(b'x' | b'X')) => 16,
            (b'0', Some(b'b' | b'B')) => 2,
            _ => 10,
        };

        if radix == 10 {
            let digits_start = self.position;
            self.take_digits(10);
            if self.peek_if(b'.') && self.peek_at(1) != Some(b'.') {
                self.advance();
                self.take_digits(10);
            }
            if matches!(self.peek(), b'e' | b'E') {
                let sign = usize::from(self.peek_at(1) == Some(b'-'));
                if self.peek_at(1 + sign).is_some_and(|c| c.is_ascii_digit()) {
                    for _ in 0..=sign {
                        self.advance();
                    }
                    self.take_digits(10);
                }
            }
            let text = decode_source(&self.source[digits_start..self.position]);
            return text
                .parse::<f64>()
                .map_err(|_| lex_error(format!("malformed number '{}'", text), start));
        }

        self.advance();
        self.advance();
        let integer = self.take_digits(radix);
        let mut fraction = String::new();
        if self.peek_if(b'.') && self.peek_at(1) != Some(b'.') {
            self.advance();
            fraction = self.take_digits(radix);
        }
        if integer.is_empty() && fraction.is_empty() {
            let text = decode_source(&self.source[start.offset..self.position]);
            return Err(lex_error(format!("malformed number '{}'", text), start));
        }
        Ok(radix_value(&integer, &fraction, radix))
    }

    fn take_digits(&mut self, radix: u32) -> String {
        let mut digits = String::new();
        while !self.is_at_end() && (self.peek() as char).is_digit(radix) {
            digits.push(self.advance() as char);
        }
        digits
    }

    fn scan_name(&mut self, start: usize) -> (TokenKind, Option<TokenValue>) {
        while !self.is_at_end() && is_name_continue(self.peek()) {
            self.advance();
        }
        let raw = &self.source[start..self.position];
        let text = decode_source(raw);
        if let Some(keyword) = Keyword::from_name(&text) {
            return (TokenKind::Keyword(keyword), None);
        }
        let value = raw
            .iter()
            .map(|&b| if b.is_ascii() { b as char } else { NAME_PLACEHOLDER })
            .collect();
        (TokenKind::Name, Some(TokenValue::Name(value)))
    }

    fn scan_symbol(
        &mut self,
        start: SourcePosition,
    ) -> Result<(TokenKind, Option<TokenValue>), LuaError> {
        let rest = &self.source[self.position..];
        let symbol = SYMBOLS
            .iter()
            .copied()
            .find(|sym| rest.starts_with(sym.as_str().as_bytes()))
            .ok_or_else(|| {
                lex_error(
                    format!("unexpected character '{}'", self.peek() as char),
                    start,
                )
            })?;
        for _ in 0..symbol.as_str().len() {
            self.advance();
        }
        let kind = if symbol.is_punctuation() {
            TokenKind::Punctuation(symbol)
        } else {
            TokenKind::Operator(symbol)
        };
        Ok((kind, None))
    }

    fn is_at_end(&self) -> bool {
        self.position >= self.source.len()
    }

    fn peek(&self) -> u8 {
        self.peek_at(0).unwrap_or(0)
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.source.get(self.position + offset).copied()
    }

    fn peek_if(&self, expected: u8) -> bool {
        self.peek_at(0) == Some(expected)
    }

    fn advance(&mut self) -> u8 {
        let byte = self.source[self.position];
        self.position += 1;
        if byte == b'\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        byte
    }

    fn current_position(&self) -> SourcePosition {
        SourcePosition {
            line: self.line,
            column: self.column,
            offset: self.position,
        }
    }
}

fn radix_value(integer: &str, fraction: &str, radix: u32) -> f64 {
    let base = f64::from(radix);
    let whole = integer
        .chars()
        .filter_map(|c| c.to_digit(radix))
        .fold(0.0, |acc, d| acc * base + f64::from(d));
    let mut scale = 1.0;
    let part = fraction
        .chars()
        .filter_map(|c| c.to_digit(radix))
        .fold(0.0, |acc, d| {
            scale /= base;
            acc + f64::from(d) * scale
        });
    whole + part
}

fn is_whitespace(c: u8) -> bool {
    matches!(c, b' ' | b'\t' | b'\r' | 0x0b | 0x0c)
}

/// Whether `c` may start a name
pub fn is_name_start(c: u8) -> bool {
    c.is_ascii_alphabetic() || c == b'_' || c >= 0x80
}

/// Whether `c` may continue a name
pub fn is_name_continue(c: u8) -> bool {
    is_name_start(c) || c.is_ascii_digit()
}

/// Whether `text` is a valid, non-reserved identifier
pub fn is_identifier(text: &str) -> bool {
    let mut bytes = text.chars().map(u32::from);
    let valid_start = bytes
        .next()
        .and_then(|c| u8::try_from(c).ok())
        .is_some_and(|c| c.is_ascii_alphabetic() || c == b'_');
    valid_start
        && bytes.all(|c| u8::try_from(c).is_ok_and(|c| c.is_ascii_alphanumeric() || c == b'_'))
        && !is_keyword(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::ErrorKind;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source.as_bytes())
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    fn semantic(source: &str) -> Vec<String> {
        tokenize(source.as_bytes())
            .unwrap()
            .into_iter()
            .filter(Token::is_semantic)
            .map(|t| t.raw)
            .collect()
    }

    #[test]
    fn test_lexer_empty_source() {
        assert_eq!(kinds(""), vec![TokenKind::EndOfInput]);
    }

    #[test]
    fn test_lexer_name_and_keyword() {
        assert_eq!(
            kinds("local foo"),
            vec![
                TokenKind::Keyword(Keyword::Local),
                TokenKind::Whitespace,
                TokenKind::Name,
                TokenKind::EndOfInput,
            ]
        );
    }

    #[test]
    fn test_lexer_compound_operators() {
        assert_eq!(semantic("a+=1 b..=c d>>>=2"), vec!["a", "+=", "1", "b", "..=", "c", "d", ">>>=", "2"]);
    }

    #[test]
    fn test_lexer_pico8_operators() {
        assert_eq!(semantic("a != b ^^ c \\ d"), vec!["a", "!=", "b", "^^", "c", "\\", "d"]);
        assert_eq!(semantic("x<<>1>><2"), vec!["x", "<<>", "1", ">><", "2"]);
    }

    #[test]
    fn test_lexer_number_forms() {
        let tokens = tokenize(b"0x1f 0b101 .5 1. 0x.8").unwrap();
        let values: Vec<f64> = tokens
            .iter()
            .filter_map(|t| match t.value {
                Some(TokenValue::Number(n)) => Some(n),
                _ => None,
            })
            .collect();
        assert_eq!(values, vec![31.0, 5.0, 0.5, 1.0, 0.5]);
    }

    #[test]
    fn test_lexer_exponent_suffix() {
        assert_eq!(semantic("123.45e2 1E3 2e-1 5e"), vec!["123.45e2", "1E3", "2e-1", "5", "e"]);
        let tokens = tokenize(b"x = 1.5e2").unwrap();
        assert_eq!(tokens[4].value, Some(TokenValue::Number(150.0)));
        assert_eq!(crate::token_count::count_tokens(&tokens), 3);
    }

    #[test]
    fn test_lexer_number_before_concat() {
        assert_eq!(semantic("1..2"), vec!["1", "..", "2"]);
    }

    #[test]
    fn test_lexer_malformed_hex() {
        let err = tokenize(b"x = 0x").unwrap_err();
        assert_eq!(err.kind, ErrorKind::LexError);
        assert_eq!(err.source_position.map(|p| p.column), Some(5));
    }

    #[test]
    fn test_lexer_string_escapes() {
        let tokens = tokenize(br#""a\tb\65\x41\"""#).unwrap();
        assert_eq!(tokens[0].value, Some(TokenValue::Str("a\tbAA\"".to_string())));
    }

    #[test]
    fn test_lexer_unterminated_string() {
        let err = tokenize(b"x = \"abc\ny = 1").unwrap_err();
        assert_eq!(err.kind, ErrorKind::LexError);
        assert_eq!(err.line(), Some(1));
    }

    #[test]
    fn test_lexer_long_string_and_comment() {
        let tokens = tokenize(b"--[==[ long\ncomment ]==]\nx = [[\nabc]]").unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Comment);
        assert_eq!(tokens[0].raw, "--[==[ long\ncomment ]==]");
        let string = tokens.iter().find(|t| t.kind == TokenKind::String).unwrap();
        assert_eq!(string.value, Some(TokenValue::Str("abc".to_string())));
        assert_eq!(string.position.line, 3);
    }

    #[test]
    fn test_lexer_unterminated_long_comment() {
        let err = tokenize(b"--[[ never closed").unwrap_err();
        assert_eq!(err.message, "unterminated long comment");
    }

    #[test]
    fn test_lexer_unexpected_character() {
        let err = tokenize(b"123 ` 456").unwrap_err();
        assert_eq!(err.kind, ErrorKind::LexError);
        assert_eq!(err.source_position, Some(SourcePosition::new(1, 5, 4)));
    }

    #[test]
    fn test_lexer_high_bytes_in_names() {
        let tokens = tokenize(b"a\x80b = 1").unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Name);
        assert_eq!(tokens[0].raw.chars().count(), 3);
        assert_eq!(tokens[0].value, Some(TokenValue::Name("a_b".to_string())));
    }

    #[test]
    fn test_lexer_semantic_indices_skip_trivia() {
        let tokens = tokenize(b"a -- c\n= 1").unwrap();
        let indices: Vec<Option<usize>> = tokens.iter().map(|t| t.index).collect();
        assert_eq!(
            indices,
            vec![Some(0), None, None, None, Some(1), None, Some(2), None]
        );
    }

    #[test]
    fn test_lexer_positions() {
        let tokens = tokenize(b"a\n  bb").unwrap();
        let name = &tokens[3];
        assert_eq!(name.raw, "bb");
        assert_eq!(name.position, SourcePosition::new(2, 3, 4));
    }

    #[test]
    fn test_lexer_round_trip() {
        let source = "x = [[a\nb]] -- note\n\tif (x != 1) y += 0x10 end\r\n";
        let text: String = tokenize(source.as_bytes())
            .unwrap()
            .iter()
            .map(|t| t.raw.as_str())
            .collect();
        assert_eq!(text, source);
    }

    #[test]
    fn test_is_identifier() {
        assert!(is_identifier("foo_1"));
        assert!(!is_identifier("1foo"));
        assert!(!is_identifier("end"));
        assert!(!is_identifier("a b"));
        assert!(!is_identifier(""));
    }
}
