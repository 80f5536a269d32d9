//! Recursive descent parser for PICO-8 Lua
//!
//! The parser works on the semantic tokens of a lexed buffer and consults
//! the trivia between them only to attach comments and blank-line markers
//! to statements.

use crate::ast::*;
use crate::error::*;
use crate::lexer::{tokenize, Keyword, Symbol, Token, TokenKind, TokenValue};
use core_types::{LuaError, SourcePosition};
use tracing::trace;

/// PICO-8 Lua parser
pub struct Parser {
    tokens: Vec<Token>,
    /// Indices of the semantic tokens in `tokens`, ending with end of input
    semantic: Vec<usize>,
    current: usize,
    /// Trivia before this token index has already been attached
    claimed: usize,
    /// Parsing the body of a single-line `if`
    short_body: bool,
}

impl Parser {
    /// Create a parser over a token stream produced by the lexer
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if tokens.last().map(|t| t.kind) != Some(TokenKind::EndOfInput) {
            let position = tokens
                .last()
                .map(|t| SourcePosition::new(t.end_line(), t.position.column, t.position.offset + t.raw.len()))
                .unwrap_or_else(SourcePosition::start);
            tokens.push(Token {
                kind: TokenKind::EndOfInput,
                raw: String::new(),
                position,
                index: None,
                value: None,
            });
        }
        let semantic = tokens
            .iter()
            .enumerate()
            .filter(|(_, t)| t.is_semantic() || t.kind == TokenKind::EndOfInput)
            .map(|(i, _)| i)
            .collect();
        Self {
            tokens,
            semantic,
            current: 0,
            claimed: 0,
            short_body: false,
        }
    }

    /// Lex `source` and create a parser over it
    pub fn from_source(source: &[u8]) -> Result<Self, LuaError> {
        Ok(Self::new(tokenize(source)?))
    }

    /// Parse the token stream into the chunk's root block
    pub fn parse(mut self) -> Result<Chunk, LuaError> {
        trace!(tokens = self.semantic.len() - 1, "parsing chunk");
        let block = self.parse_block()?;
        if !self.is_at_end() {
            return Err(unexpected_token("end of input", self.peek()));
        }
        Ok(block)
    }

    // =========================================================================
    // Blocks and comment attachment
    // =========================================================================

    fn parse_block(&mut self) -> Result<Block, LuaError> {
        let outer = std::mem::replace(&mut self.short_body, false);
        let block = self.parse_statements();
        self.short_body = outer;
        block
    }

    fn parse_short_body(&mut self) -> Result<Block, LuaError> {
        let outer = std::mem::replace(&mut self.short_body, true);
        let block = self.parse_statements();
        self.short_body = outer;
        block
    }

    fn parse_statements(&mut self) -> Result<Block, LuaError> {
        let mut block = Block::default();
        loop {
            let (leading, blank_line_before) = self.collect_leading_comments();
            if self.block_follows() {
                block.trailing_comments = leading;
                return Ok(block);
            }

            if self.short_body && self.check_keyword(Keyword::Do) {
                return Err(parse_error(
                    "'do' block in single-line 'if' is not supported",
                    self.peek().position,
                ));
            }

            if self.check_symbol(Symbol::Semicolon) {
                let token = self.advance();
                match block.statements.last_mut() {
                    Some(last) if !last.semicolon && leading.is_empty() => {
                        last.semicolon = true;
                        if last.comments.trailing.is_none() {
                            last.comments.trailing = self.collect_trailing_comment();
                        }
                    }
                    _ => {
                        let mut empty = Statement::new(StatementKind::Empty, token.position);
                        empty.comments = CommentAttachment {
                            leading,
                            trailing: self.collect_trailing_comment(),
                            blank_line_before,
                        };
                        block.statements.push(empty);
                    }
                }
                continue;
            }

            let is_return = self.check_keyword(Keyword::Return);
            let mut statement = self.parse_statement()?;
            statement.semicolon = self.match_symbol(Symbol::Semicolon);
            statement.comments.leading = leading;
            statement.comments.blank_line_before = blank_line_before;
            statement.comments.trailing = self.collect_trailing_comment();
            block.statements.push(statement);

            if is_return {
                let (trailing, _) = self.collect_leading_comments();
                if !self.block_follows() {
                    return Err(unexpected_token("end of block after 'return'", self.peek()));
                }
                block.trailing_comments = trailing;
                return Ok(block);
            }
        }
    }

    fn block_follows(&self) -> bool {
        let token = self.peek();
        if self.short_body && self.current > 0 && token.position.line > self.previous().end_line() {
            return true;
        }
        matches!(
            token.kind,
            TokenKind::EndOfInput
                | TokenKind::Keyword(Keyword::End | Keyword::Else | Keyword::Elseif | Keyword::Until)
        )
    }

    fn trivia_start(&self) -> usize {
        let after_previous = match self.current {
            0 => 0,
            n => self.semantic[n - 1] + 1,
        };
        after_previous.max(self.claimed)
    }

    /// Comments between the previous statement and the current token, and
    /// whether an empty line precedes the current token.
    fn collect_leading_comments(&mut self) -> (Vec<Comment>, bool) {
        if self.short_body {
            return (Vec::new(), false);
        }
        let end = self.semantic[self.current];
        let start = self.trivia_start();
        // The start of the buffer counts as the end of a line.
        let mut newlines = usize::from(self.current == 0);
        let mut comments = Vec::new();
        for token in &self.tokens[start..end] {
            match token.kind {
                TokenKind::Newline => newlines += 1,
                TokenKind::Comment => {
                    comments.push(Comment {
                        text: token.raw.clone(),
                        position: token.position,
                        blank_line_before: newlines >= 2,
                    });
                    newlines = 0;
                }
                _ => {}
            }
        }
        self.claimed = self.claimed.max(end);
        (comments, newlines >= 2)
    }

    /// A comment on the same line as the last consumed token.
    fn collect_trailing_comment(&mut self) -> Option<Comment> {
        if self.short_body || self.current == 0 {
            return None;
        }
        let end = self.semantic[self.current];
        for index in self.trivia_start()..end {
            let token = &self.tokens[index];
            match token.kind {
                TokenKind::Whitespace => continue,
                TokenKind::Comment => {
                    self.claimed = index + 1;
                    return Some(Comment {
                        text: token.raw.clone(),
                        position: token.position,
                        blank_line_before: false,
                    });
                }
                _ => return None,
            }
        }
        None
    }

    // =========================================================================
    // Statements
    // =========================================================================

    fn parse_statement(&mut self) -> Result<Statement, LuaError> {
        let token = self.peek().clone();
        let kind = match token.kind {
            TokenKind::Keyword(Keyword::If) => self.parse_if_statement()?,
            TokenKind::Keyword(Keyword::While) => self.parse_while_statement()?,
            TokenKind::Keyword(Keyword::Do) => {
                self.advance();
                let body = self.parse_block()?;
                self.expect_end(&token)?;
                StatementKind::Do(body)
            }
            TokenKind::Keyword(Keyword::For) => self.parse_for_statement()?,
            TokenKind::Keyword(Keyword::Repeat) => {
                self.advance();
                let body = self.parse_block()?;
                self.expect_keyword(Keyword::Until, "'until' to close 'repeat'")?;
                let condition = self.parse_expression()?;
                StatementKind::Repeat { body, condition }
            }
            TokenKind::Keyword(Keyword::Function) => self.parse_function_statement()?,
            TokenKind::Keyword(Keyword::Local) => self.parse_local_statement()?,
            TokenKind::Keyword(Keyword::Return) => {
                self.advance();
                let values = if self.block_follows() || self.check_symbol(Symbol::Semicolon) {
                    Vec::new()
                } else {
                    self.parse_expression_list()?
                };
                StatementKind::Return(values)
            }
            TokenKind::Keyword(Keyword::Break) => {
                self.advance();
                StatementKind::Break
            }
            TokenKind::Keyword(Keyword::Goto) => {
                self.advance();
                StatementKind::Goto(self.expect_identifier("label name after 'goto'")?)
            }
            TokenKind::Punctuation(Symbol::DoubleColon) => {
                self.advance();
                let label = self.expect_identifier("label name")?;
                self.expect_symbol(Symbol::DoubleColon, "'::' after label name")?;
                StatementKind::Label(label)
            }
            _ => self.parse_expression_statement()?,
        };
        Ok(Statement::new(kind, token.position))
    }

    fn parse_if_statement(&mut self) -> Result<StatementKind, LuaError> {
        if self.is_short_if() {
            return self.parse_short_if();
        }
        let if_token = self.advance();
        let mut clauses = Vec::new();
        let condition = self.parse_expression()?;
        self.expect_keyword(Keyword::Then, "'then'")?;
        let block = self.parse_block()?;
        clauses.push(IfClause { condition, block });

        let mut else_block = None;
        loop {
            if self.match_keyword(Keyword::Elseif) {
                let condition = self.parse_expression()?;
                self.expect_keyword(Keyword::Then, "'then'")?;
                let block = self.parse_block()?;
                clauses.push(IfClause { condition, block });
                continue;
            }
            if self.match_keyword(Keyword::Else) {
                else_block = Some(self.parse_block()?);
            }
            self.expect_end(&if_token)?;
            break;
        }

        Ok(StatementKind::If {
            clauses,
            else_block,
            short: false,
        })
    }

    /// Decide whether the `if` at the current token is the single-line
    /// `if (cond) stmt` form: the parenthesized condition closes on the
    /// same line and is followed on that line by something other than
    /// `then` that cannot continue the condition.
    fn is_short_if(&self) -> bool {
        let if_line = self.peek().position.line;
        if !self.peek_nth(1).is_symbol(Symbol::LParen) {
            return false;
        }
        let mut depth = 0usize;
        let mut n = 1;
        loop {
            let token = self.peek_nth(n);
            if token.kind == TokenKind::EndOfInput || token.position.line != if_line {
                return false;
            }
            match token.symbol() {
                Some(Symbol::LParen | Symbol::LBracket | Symbol::LBrace) => depth += 1,
                Some(Symbol::RParen | Symbol::RBracket | Symbol::RBrace) => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        break;
                    }
                }
                _ => {}
            }
            n += 1;
        }
        let close = self.peek_nth(n);
        let next = self.peek_nth(n + 1);
        next.kind != TokenKind::EndOfInput
            && next.position.line == close.end_line()
            && !next.is_keyword(Keyword::Then)
            && !continues_expression(next)
    }

    fn parse_short_if(&mut self) -> Result<StatementKind, LuaError> {
        let if_token = self.advance();
        let condition = self.parse_expression()?;
        let block = self.parse_short_body()?;
        if block.statements.is_empty() {
            return Err(parse_error(
                "expected statement after single-line 'if' condition",
                if_token.position,
            ));
        }
        let else_block = if self.check_keyword(Keyword::Else)
            && self.peek().position.line == self.previous().end_line()
        {
            self.advance();
            Some(self.parse_short_body()?)
        } else {
            None
        };
        Ok(StatementKind::If {
            clauses: vec![IfClause { condition, block }],
            else_block,
            short: true,
        })
    }

    fn parse_while_statement(&mut self) -> Result<StatementKind, LuaError> {
        let while_token = self.advance();
        let condition = self.parse_expression()?;
        self.expect_keyword(Keyword::Do, "'do'")?;
        let body = self.parse_block()?;
        self.expect_end(&while_token)?;
        Ok(StatementKind::While { condition, body })
    }

    fn parse_for_statement(&mut self) -> Result<StatementKind, LuaError> {
        let for_token = self.advance();
        let first = self.expect_identifier("for loop variable")?;

        if self.match_symbol(Symbol::Assign) {
            let start = self.parse_expression()?;
            self.expect_symbol(Symbol::Comma, "',' in numeric for")?;
            let limit = self.parse_expression()?;
            let step = if self.match_symbol(Symbol::Comma) {
                Some(self.parse_expression()?)
            } else {
                None
            };
            self.expect_keyword(Keyword::Do, "'do'")?;
            let body = self.parse_block()?;
            self.expect_end(&for_token)?;
            return Ok(StatementKind::NumericFor {
                variable: first,
                start,
                limit,
                step,
                body,
            });
        }

        let mut names = vec![first];
        while self.match_symbol(Symbol::Comma) {
            names.push(self.expect_identifier("for loop variable")?);
        }
        self.expect_keyword(Keyword::In, "'=' or 'in'")?;
        let iterators = self.parse_expression_list()?;
        self.expect_keyword(Keyword::Do, "'do'")?;
        let body = self.parse_block()?;
        self.expect_end(&for_token)?;
        Ok(StatementKind::GenericFor {
            names,
            iterators,
            body,
        })
    }

    fn parse_function_statement(&mut self) -> Result<StatementKind, LuaError> {
        let function_token = self.advance();
        let mut path = vec![self.expect_identifier("function name")?];
        while self.match_symbol(Symbol::Dot) {
            path.push(self.expect_identifier("name after '.'")?);
        }
        let method = if self.match_symbol(Symbol::Colon) {
            Some(self.expect_identifier("method name after ':'")?)
        } else {
            None
        };
        let function = self.parse_function_body(&function_token)?;
        Ok(StatementKind::Function {
            name: FunctionName { path, method },
            function,
        })
    }

    fn parse_local_statement(&mut self) -> Result<StatementKind, LuaError> {
        self.advance();
        if self.check_keyword(Keyword::Function) {
            let function_token = self.advance();
            let name = self.expect_identifier("function name")?;
            let function = self.parse_function_body(&function_token)?;
            return Ok(StatementKind::LocalFunction { name, function });
        }

        let mut names = vec![self.expect_identifier("local name")?];
        while self.match_symbol(Symbol::Comma) {
            names.push(self.expect_identifier("local name")?);
        }
        let values = if self.match_symbol(Symbol::Assign) {
            self.parse_expression_list()?
        } else {
            Vec::new()
        };
        Ok(StatementKind::Local { names, values })
    }

    fn parse_expression_statement(&mut self) -> Result<StatementKind, LuaError> {
        let expression = self.parse_suffixed_expression()?;

        if self.check_symbol(Symbol::Assign) || self.check_symbol(Symbol::Comma) {
            let mut targets = vec![expression];
            while self.match_symbol(Symbol::Comma) {
                targets.push(self.parse_suffixed_expression()?);
            }
            if let Some(target) = targets.iter().find(|t| !t.is_assignable()) {
                return Err(parse_error("cannot assign to this expression", target.position));
            }
            self.expect_symbol(Symbol::Assign, "'='")?;
            let values = self.parse_expression_list()?;
            return Ok(StatementKind::Assignment {
                targets,
                values,
                compound: None,
            });
        }

        if let Some(op) = self.peek().symbol().and_then(BinaryOperator::from_compound) {
            if !expression.is_assignable() {
                return Err(parse_error("cannot assign to this expression", expression.position));
            }
            self.advance();
            let rhs = self.parse_expression()?;
            let position = expression.position;
            let value = Expression::new(
                ExpressionKind::Binary {
                    op,
                    lhs: Box::new(expression.clone()),
                    rhs: Box::new(rhs),
                },
                position,
            );
            return Ok(StatementKind::Assignment {
                targets: vec![expression],
                values: vec![value],
                compound: Some(op),
            });
        }

        if expression.is_call() {
            return Ok(StatementKind::Call(expression));
        }
        Err(unexpected_token("'=' or function arguments", self.peek()))
    }

    // =========================================================================
    // Expressions
    // =========================================================================

    /// Parse a full expression
    pub fn parse_expression(&mut self) -> Result<Expression, LuaError> {
        self.parse_subexpression(0)
    }

    fn parse_expression_list(&mut self) -> Result<Vec<Expression>, LuaError> {
        let mut expressions = vec![self.parse_expression()?];
        while self.match_symbol(Symbol::Comma) {
            expressions.push(self.parse_expression()?);
        }
        Ok(expressions)
    }

    /// Precedence climbing: consume binary operators that bind tighter
    /// than `limit`.
    fn parse_subexpression(&mut self, limit: u8) -> Result<Expression, LuaError> {
        let token = self.peek().clone();
        let unary = match token.kind {
            TokenKind::Keyword(Keyword::Not) => Some(UnaryOperator::Not),
            TokenKind::Operator(symbol) => UnaryOperator::from_symbol(symbol),
            _ => None,
        };

        let mut lhs = match unary {
            Some(op) => {
                self.advance();
                let operand = self.parse_subexpression(UNARY_PRECEDENCE)?;
                Expression::new(
                    ExpressionKind::Unary {
                        op,
                        operand: Box::new(operand),
                    },
                    token.position,
                )
            }
            None => self.parse_simple_expression()?,
        };

        while let Some(op) = self.peek_binary_operator() {
            let (left, right) = op.precedence();
            if left <= limit {
                break;
            }
            self.advance();
            let rhs = self.parse_subexpression(right)?;
            let position = lhs.position;
            lhs = Expression::new(
                ExpressionKind::Binary {
                    op,
                    lhs: Box::new(lhs),
                    rhs: Box::new(rhs),
                },
                position,
            );
        }
        Ok(lhs)
    }

    fn peek_binary_operator(&self) -> Option<BinaryOperator> {
        match self.peek().kind {
            TokenKind::Keyword(Keyword::And) => Some(BinaryOperator::And),
            TokenKind::Keyword(Keyword::Or) => Some(BinaryOperator::Or),
            TokenKind::Operator(symbol) => BinaryOperator::from_symbol(symbol),
            _ => None,
        }
    }

    fn parse_simple_expression(&mut self) -> Result<Expression, LuaError> {
        let token = self.peek().clone();
        let kind = match token.kind {
            TokenKind::Number => {
                self.advance();
                ExpressionKind::Number(number_literal(&token))
            }
            TokenKind::String => {
                self.advance();
                ExpressionKind::String(string_literal(&token))
            }
            TokenKind::Keyword(Keyword::Nil) => {
                self.advance();
                ExpressionKind::Nil
            }
            TokenKind::Keyword(Keyword::True) => {
                self.advance();
                ExpressionKind::True
            }
            TokenKind::Keyword(Keyword::False) => {
                self.advance();
                ExpressionKind::False
            }
            TokenKind::Punctuation(Symbol::Ellipsis) => {
                self.advance();
                ExpressionKind::Vararg
            }
            TokenKind::Punctuation(Symbol::LBrace) => ExpressionKind::Table(self.parse_table()?),
            TokenKind::Keyword(Keyword::Function) => {
                self.advance();
                ExpressionKind::Function(self.parse_function_body(&token)?)
            }
            _ => return self.parse_suffixed_expression(),
        };
        Ok(Expression::new(kind, token.position))
    }

    fn parse_primary_expression(&mut self) -> Result<Expression, LuaError> {
        let token = self.peek().clone();
        match token.kind {
            TokenKind::Name => {
                self.advance();
                let name = Identifier::new(token.raw, token.position);
                Ok(Expression::new(ExpressionKind::Name(name), token.position))
            }
            TokenKind::Punctuation(Symbol::LParen) => {
                self.advance();
                let inner = self.parse_expression()?;
                self.expect_closing(Symbol::RParen, &token)?;
                Ok(Expression::new(
                    ExpressionKind::Paren(Box::new(inner)),
                    token.position,
                ))
            }
            _ => Err(unexpected_token("expression", &token)),
        }
    }

    fn parse_suffixed_expression(&mut self) -> Result<Expression, LuaError> {
        let mut expression = self.parse_primary_expression()?;
        loop {
            let token = self.peek().clone();
            let position = expression.position;
            let kind = match token.kind {
                TokenKind::Punctuation(Symbol::Dot) => {
                    self.advance();
                    let field = self.expect_identifier("name after '.'")?;
                    ExpressionKind::Field {
                        object: Box::new(expression),
                        field,
                    }
                }
                TokenKind::Punctuation(Symbol::LBracket) => {
                    self.advance();
                    let key = self.parse_expression()?;
                    self.expect_closing(Symbol::RBracket, &token)?;
                    ExpressionKind::Index {
                        object: Box::new(expression),
                        key: Box::new(key),
                    }
                }
                TokenKind::Punctuation(Symbol::Colon) => {
                    self.advance();
                    let method = self.expect_identifier("method name after ':'")?;
                    let args = self.parse_call_args()?;
                    ExpressionKind::MethodCall {
                        object: Box::new(expression),
                        method,
                        args,
                    }
                }
                TokenKind::Punctuation(Symbol::LParen | Symbol::LBrace) | TokenKind::String => {
                    let args = self.parse_call_args()?;
                    ExpressionKind::Call {
                        callee: Box::new(expression),
                        args,
                    }
                }
                _ => return Ok(expression),
            };
            expression = Expression::new(kind, position);
        }
    }

    fn parse_call_args(&mut self) -> Result<CallArgs, LuaError> {
        let token = self.peek().clone();
        match token.kind {
            TokenKind::String => {
                self.advance();
                Ok(CallArgs::String(string_literal(&token)))
            }
            TokenKind::Punctuation(Symbol::LBrace) => Ok(CallArgs::Table(self.parse_table()?)),
            TokenKind::Punctuation(Symbol::LParen) => {
                self.advance();
                if self.match_symbol(Symbol::RParen) {
                    return Ok(CallArgs::List(Vec::new()));
                }
                let args = self.parse_expression_list()?;
                self.expect_closing(Symbol::RParen, &token)?;
                Ok(CallArgs::List(args))
            }
            _ => Err(unexpected_token("function arguments", &token)),
        }
    }

    fn parse_table(&mut self) -> Result<TableConstructor, LuaError> {
        let open = self.expect_symbol(Symbol::LBrace, "'{'")?;
        let mut table = TableConstructor::default();
        while !self.check_symbol(Symbol::RBrace) {
            table.fields.push(self.parse_table_field()?);
            table.trailing_separator =
                self.match_symbol(Symbol::Comma) || self.match_symbol(Symbol::Semicolon);
            if !table.trailing_separator {
                break;
            }
        }
        self.expect_closing(Symbol::RBrace, &open)?;
        Ok(table)
    }

    fn parse_table_field(&mut self) -> Result<TableField, LuaError> {
        if self.check_symbol(Symbol::LBracket) {
            let open = self.advance();
            let key = self.parse_expression()?;
            self.expect_closing(Symbol::RBracket, &open)?;
            self.expect_symbol(Symbol::Assign, "'=' after table key")?;
            let value = self.parse_expression()?;
            return Ok(TableField::Keyed { key, value });
        }
        if self.peek().kind == TokenKind::Name && self.peek_nth(1).is_symbol(Symbol::Assign) {
            let key = self.expect_identifier("field name")?;
            self.advance();
            let value = self.parse_expression()?;
            return Ok(TableField::Named { key, value });
        }
        Ok(TableField::Positional(self.parse_expression()?))
    }

    fn parse_function_body(&mut self, function_token: &Token) -> Result<FunctionBody, LuaError> {
        let open = self.expect_symbol(Symbol::LParen, "'(' after 'function'")?;
        let mut params = Vec::new();
        let mut is_vararg = false;
        if !self.check_symbol(Symbol::RParen) {
            loop {
                if self.match_symbol(Symbol::Ellipsis) {
                    is_vararg = true;
                    break;
                }
                params.push(self.expect_identifier("parameter name")?);
                if !self.match_symbol(Symbol::Comma) {
                    break;
                }
            }
        }
        self.expect_closing(Symbol::RParen, &open)?;
        let body = self.parse_block()?;
        self.expect_end(function_token)?;
        Ok(FunctionBody {
            params,
            is_vararg,
            body,
            position: open.position,
        })
    }

    // =========================================================================
    // Token helpers
    // =========================================================================

    fn peek(&self) -> &Token {
        &self.tokens[self.semantic[self.current]]
    }

    fn peek_nth(&self, n: usize) -> &Token {
        let index = (self.current + n).min(self.semantic.len() - 1);
        &self.tokens[self.semantic[index]]
    }

    fn previous(&self) -> &Token {
        &self.tokens[self.semantic[self.current.saturating_sub(1)]]
    }

    fn is_at_end(&self) -> bool {
        self.peek().kind == TokenKind::EndOfInput
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if self.current + 1 < self.semantic.len() {
            self.current += 1;
        }
        token
    }

    fn check_keyword(&self, keyword: Keyword) -> bool {
        self.peek().is_keyword(keyword)
    }

    fn check_symbol(&self, symbol: Symbol) -> bool {
        self.peek().is_symbol(symbol)
    }

    fn match_keyword(&mut self, keyword: Keyword) -> bool {
        if self.check_keyword(keyword) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn match_symbol(&mut self, symbol: Symbol) -> bool {
        if self.check_symbol(symbol) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect_keyword(&mut self, keyword: Keyword, expected: &str) -> Result<Token, LuaError> {
        if self.check_keyword(keyword) {
            Ok(self.advance())
        } else {
            Err(unexpected_token(expected, self.peek()))
        }
    }

    fn expect_symbol(&mut self, symbol: Symbol, expected: &str) -> Result<Token, LuaError> {
        if self.check_symbol(symbol) {
            Ok(self.advance())
        } else {
            Err(unexpected_token(expected, self.peek()))
        }
    }

    fn expect_closing(&mut self, symbol: Symbol, open: &Token) -> Result<Token, LuaError> {
        if self.check_symbol(symbol) {
            return Ok(self.advance());
        }
        let expected = format!(
            "'{}' (to close '{}' at line {})",
            symbol.as_str(),
            open.raw,
            open.position.line
        );
        Err(unexpected_token(&expected, self.peek()))
    }

    fn expect_end(&mut self, opener: &Token) -> Result<Token, LuaError> {
        if self.check_keyword(Keyword::End) {
            return Ok(self.advance());
        }
        let expected = format!(
            "'end' (to close '{}' at line {})",
            opener.raw, opener.position.line
        );
        Err(unexpected_token(&expected, self.peek()))
    }

    fn expect_identifier(&mut self, expected: &str) -> Result<Identifier, LuaError> {
        if self.peek().kind == TokenKind::Name {
            let token = self.advance();
            Ok(Identifier::new(token.raw, token.position))
        } else {
            Err(unexpected_token(expected, self.peek()))
        }
    }
}

/// Whether `token` could continue an expression that ends just before it
fn continues_expression(token: &Token) -> bool {
    match token.kind {
        TokenKind::String => true,
        TokenKind::Keyword(Keyword::And | Keyword::Or) => true,
        TokenKind::Operator(symbol) => BinaryOperator::from_symbol(symbol).is_some(),
        TokenKind::Punctuation(symbol) => matches!(
            symbol,
            Symbol::Dot | Symbol::Colon | Symbol::LBracket | Symbol::LParen | Symbol::LBrace
        ),
        _ => false,
    }
}

fn string_literal(token: &Token) -> StringLiteral {
    let value = match &token.value {
        Some(TokenValue::Str(value)) => value.clone(),
        _ => String::new(),
    };
    StringLiteral {
        raw: token.raw.clone(),
        value,
    }
}

fn number_literal(token: &Token) -> NumberLiteral {
    let value = match token.value {
        Some(TokenValue::Number(value)) => value,
        _ => 0.0,
    };
    NumberLiteral {
        raw: token.raw.clone(),
        value,
    }
}
