//! Serializes a syntax tree through a [`Printer`]

use crate::printer::{PieceClass, Printer, Style};
use parser::ast::*;

/// Walks a tree and emits its pieces in source order
pub struct Writer {
    printer: Printer,
    comments: bool,
}

impl Writer {
    /// Create a writer; `comments` controls whether attached comments and
    /// blank lines are reproduced
    pub fn new(style: Style, comments: bool) -> Self {
        Self {
            printer: Printer::new(style),
            comments,
        }
    }

    /// Emit a comment line regardless of the comment setting
    pub fn comment_line(&mut self, text: &str) {
        self.printer.comment(text);
    }

    /// Emit every statement of `block` at the current level
    pub fn write_block(&mut self, block: &Block) {
        for statement in &block.statements {
            self.write_statement_line(statement);
        }
        if self.comments {
            for comment in &block.trailing_comments {
                self.write_comment(comment);
            }
        }
    }

    /// The printed text
    pub fn finish(self) -> String {
        self.printer.finish()
    }

    fn write_comment(&mut self, comment: &Comment) {
        if comment.blank_line_before {
            self.printer.blank_line();
        }
        self.printer.comment(&comment.text);
    }

    fn write_statement_line(&mut self, statement: &Statement) {
        if self.comments {
            for comment in &statement.comments.leading {
                self.write_comment(comment);
            }
            if statement.comments.blank_line_before {
                self.printer.blank_line();
            }
        }
        self.write_statement(statement);
        if statement.semicolon {
            self.printer.piece(PieceClass::Semicolon, ";");
        }
        if self.comments {
            if let Some(comment) = &statement.comments.trailing {
                self.printer.trailing_comment(&comment.text);
            }
        }
        self.printer.end_line();
    }

    fn keyword(&mut self, text: &str) {
        self.printer.piece(PieceClass::Keyword, text);
    }

    fn word(&mut self, text: &str) {
        self.printer.piece(PieceClass::Word, text);
    }

    fn symbol(&mut self, class: PieceClass, text: &str) {
        self.printer.piece(class, text);
    }

    /// A nested block on its own lines, one level deeper
    fn write_body(&mut self, block: &Block) {
        self.printer.end_line();
        self.printer.indent();
        self.write_block(block);
        self.printer.dedent();
    }

    fn write_statement(&mut self, statement: &Statement) {
        match &statement.kind {
            StatementKind::Assignment {
                targets,
                values,
                compound,
            } => self.write_assignment(targets, values, *compound),
            StatementKind::Local { names, values } => {
                self.keyword("local");
                self.write_names(names);
                if !values.is_empty() {
                    self.symbol(PieceClass::BinOp, "=");
                    self.write_expression_list(values);
                }
            }
            StatementKind::LocalFunction { name, function } => {
                self.keyword("local");
                self.keyword("function");
                self.word(&name.name);
                self.write_function_body(function);
            }
            StatementKind::Function { name, function } => {
                self.keyword("function");
                for (i, part) in name.path.iter().enumerate() {
                    if i > 0 {
                        self.symbol(PieceClass::Access, ".");
                    }
                    self.word(&part.name);
                }
                if let Some(method) = &name.method {
                    self.symbol(PieceClass::Access, ":");
                    self.word(&method.name);
                }
                self.write_function_body(function);
            }
            StatementKind::Call(call) => self.write_expression(call),
            StatementKind::Do(body) => {
                self.keyword("do");
                self.write_body(body);
                self.keyword("end");
            }
            StatementKind::While { condition, body } => {
                self.keyword("while");
                self.write_expression(condition);
                self.keyword("do");
                self.write_body(body);
                self.keyword("end");
            }
            StatementKind::Repeat { body, condition } => {
                self.keyword("repeat");
                self.write_body(body);
                self.keyword("until");
                self.write_expression(condition);
            }
            StatementKind::If {
                clauses,
                else_block,
                short,
            } => {
                if *short {
                    self.write_short_if(clauses, else_block.as_ref());
                } else {
                    self.write_if(clauses, else_block.as_ref());
                }
            }
            StatementKind::NumericFor {
                variable,
                start,
                limit,
                step,
                body,
            } => {
                self.keyword("for");
                self.word(&variable.name);
                self.symbol(PieceClass::BinOp, "=");
                self.write_expression(start);
                self.symbol(PieceClass::Comma, ",");
                self.write_expression(limit);
                if let Some(step) = step {
                    self.symbol(PieceClass::Comma, ",");
                    self.write_expression(step);
                }
                self.keyword("do");
                self.write_body(body);
                self.keyword("end");
            }
            StatementKind::GenericFor {
                names,
                iterators,
                body,
            } => {
                self.keyword("for");
                self.write_names(names);
                self.keyword("in");
                self.write_expression_list(iterators);
                self.keyword("do");
                self.write_body(body);
                self.keyword("end");
            }
            StatementKind::Return(values) => {
                self.keyword("return");
                self.write_expression_list(values);
            }
            StatementKind::Break => self.keyword("break"),
            StatementKind::Goto(label) => {
                self.keyword("goto");
                self.word(&label.name);
            }
            StatementKind::Label(label) => {
                self.symbol(PieceClass::Access, "::");
                self.word(&label.name);
                self.symbol(PieceClass::Access, "::");
            }
            StatementKind::Empty => self.symbol(PieceClass::Semicolon, ";"),
        }
    }

    fn write_assignment(
        &mut self,
        targets: &[Expression],
        values: &[Expression],
        compound: Option<BinaryOperator>,
    ) {
        if let (Some(op), [target], [value]) = (compound, targets, values) {
            if let (ExpressionKind::Binary { rhs, .. }, Some(text)) = (&value.kind, op.compound_str()) {
                self.write_expression(target);
                self.symbol(PieceClass::BinOp, text);
                self.write_expression(rhs);
                return;
            }
        }
        self.write_expression_list(targets);
        self.symbol(PieceClass::BinOp, "=");
        self.write_expression_list(values);
    }

    fn write_if(&mut self, clauses: &[IfClause], else_block: Option<&Block>) {
        for (i, clause) in clauses.iter().enumerate() {
            self.keyword(if i == 0 { "if" } else { "elseif" });
            self.write_expression(&clause.condition);
            self.keyword("then");
            self.write_body(&clause.block);
        }
        if let Some(block) = else_block {
            self.keyword("else");
            self.write_body(block);
        }
        self.keyword("end");
    }

    fn write_short_if(&mut self, clauses: &[IfClause], else_block: Option<&Block>) {
        let Some(clause) = clauses.first() else {
            return;
        };
        self.keyword("if");
        self.write_expression(&clause.condition);
        self.printer.begin_inline();
        self.printer.end_line();
        self.write_block(&clause.block);
        if let Some(block) = else_block {
            self.keyword("else");
            self.printer.end_line();
            self.write_block(block);
        }
        self.printer.end_inline();
    }

    fn write_names(&mut self, names: &[Identifier]) {
        for (i, name) in names.iter().enumerate() {
            if i > 0 {
                self.symbol(PieceClass::Comma, ",");
            }
            self.word(&name.name);
        }
    }

    fn write_expression_list(&mut self, expressions: &[Expression]) {
        for (i, expression) in expressions.iter().enumerate() {
            if i > 0 {
                self.symbol(PieceClass::Comma, ",");
            }
            self.write_expression(expression);
        }
    }

    fn write_function_body(&mut self, function: &FunctionBody) {
        self.symbol(PieceClass::Open, "(");
        self.write_names(&function.params);
        if function.is_vararg {
            if !function.params.is_empty() {
                self.symbol(PieceClass::Comma, ",");
            }
            self.word("...");
        }
        self.symbol(PieceClass::Close, ")");
        self.write_body(&function.body);
        self.keyword("end");
    }

    fn write_expression(&mut self, expression: &Expression) {
        match &expression.kind {
            ExpressionKind::Nil => self.keyword("nil"),
            ExpressionKind::True => self.keyword("true"),
            ExpressionKind::False => self.keyword("false"),
            ExpressionKind::Number(number) => self.word(&number.raw),
            ExpressionKind::String(string) => self.word(&string.raw),
            ExpressionKind::Vararg => self.word("..."),
            ExpressionKind::Name(name) => self.word(&name.name),
            ExpressionKind::Index { object, key } => {
                self.write_expression(object);
                self.symbol(PieceClass::Open, "[");
                self.write_expression(key);
                self.symbol(PieceClass::Close, "]");
            }
            ExpressionKind::Field { object, field } => {
                self.write_expression(object);
                self.symbol(PieceClass::Access, ".");
                self.word(&field.name);
            }
            ExpressionKind::Call { callee, args } => {
                self.write_expression(callee);
                self.write_call_args(args);
            }
            ExpressionKind::MethodCall {
                object,
                method,
                args,
            } => {
                self.write_expression(object);
                self.symbol(PieceClass::Access, ":");
                self.word(&method.name);
                self.write_call_args(args);
            }
            ExpressionKind::Function(function) => {
                self.keyword("function");
                self.write_function_body(function);
            }
            ExpressionKind::Table(table) => self.write_table(table),
            ExpressionKind::Binary { op, lhs, rhs } => {
                self.write_expression(lhs);
                self.symbol(PieceClass::BinOp, op.as_str());
                self.write_expression(rhs);
            }
            ExpressionKind::Unary { op, operand } => {
                let class = match op {
                    UnaryOperator::Not => PieceClass::Keyword,
                    _ => PieceClass::Unary,
                };
                self.symbol(class, op.as_str());
                self.write_expression(operand);
            }
            ExpressionKind::Paren(inner) => {
                self.symbol(PieceClass::Open, "(");
                self.write_expression(inner);
                self.symbol(PieceClass::Close, ")");
            }
        }
    }

    fn write_call_args(&mut self, args: &CallArgs) {
        match args {
            CallArgs::List(values) => {
                self.symbol(PieceClass::Open, "(");
                self.write_expression_list(values);
                self.symbol(PieceClass::Close, ")");
            }
            CallArgs::Table(table) => self.write_table(table),
            CallArgs::String(string) => self.word(&string.raw),
        }
    }

    fn write_table(&mut self, table: &TableConstructor) {
        self.symbol(PieceClass::Open, "{");
        for (i, field) in table.fields.iter().enumerate() {
            if i > 0 {
                self.symbol(PieceClass::Comma, ",");
            }
            match field {
                TableField::Positional(value) => self.write_expression(value),
                TableField::Named { key, value } => {
                    self.word(&key.name);
                    self.symbol(PieceClass::BinOp, "=");
                    self.write_expression(value);
                }
                TableField::Keyed { key, value } => {
                    self.symbol(PieceClass::Open, "[");
                    self.write_expression(key);
                    self.symbol(PieceClass::Close, "]");
                    self.symbol(PieceClass::BinOp, "=");
                    self.write_expression(value);
                }
            }
        }
        if table.trailing_separator {
            self.symbol(PieceClass::Comma, ",");
        }
        self.symbol(PieceClass::Close, "}");
    }
}
