//! Syntax tree traversal
//!
//! [`visit::Visitor`] walks a tree by shared reference and
//! [`visit_mut::VisitorMut`] by mutable reference. Both are generated from
//! one definition so that every pass sees identifiers, strings and scope
//! boundaries in the same order.
//!
//! Each hook has a default implementation that calls the matching `walk_*`
//! function; an override that still wants the children visited calls the
//! walker itself.

use crate::scope::BindingKind;

/// How an identifier occurrence is used
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameRole {
    /// Introduces a binding in the current scope
    Declaration(BindingKind),
    /// Reads or writes a variable
    Reference,
    /// Field name, method name or named table key
    Attribute,
    /// `::name::`
    Label,
    /// Target of a `goto`
    Goto,
}

/// The kind of a lexical scope
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum ScopeKind {
    /// The top level of a chunk
    Chunk,
    /// A function body, including its parameters
    Function {
        /// Declared with `:`, so `self` is implicit
        is_method: bool,
        /// Parameter list ends with `...`
        has_varargs: bool,
    },
    /// `do`, loop and `if` bodies
    Block,
}

macro_rules! define_visitor {
    ($module:ident, $trait:ident, $iter:ident $(, $mutability:tt)?) => {
        #[allow(missing_docs)]
        pub mod $module {
            use super::{NameRole, ScopeKind};
            use crate::ast::*;
            use crate::scope::BindingKind;

            /// Hooks called during a tree walk
            pub trait $trait {
                fn visit_block(&mut self, block: & $($mutability)? Block) {
                    walk_block(self, block);
                }

                fn visit_statement(&mut self, statement: & $($mutability)? Statement) {
                    walk_statement(self, statement);
                }

                fn visit_expression(&mut self, expression: & $($mutability)? Expression) {
                    walk_expression(self, expression);
                }

                fn visit_function_body(
                    &mut self,
                    function: & $($mutability)? FunctionBody,
                    is_method: bool,
                ) {
                    walk_function_body(self, function, is_method);
                }

                fn visit_name(&mut self, _name: & $($mutability)? Identifier, _role: NameRole) {}

                fn visit_string(&mut self, _literal: & $($mutability)? StringLiteral) {}

                fn enter_scope(&mut self, _kind: ScopeKind) {}

                fn exit_scope(&mut self) {}
            }

            /// Visit every statement of a block. Scope boundaries are the
            /// caller's concern.
            pub fn walk_block<V: $trait + ?Sized>(visitor: &mut V, block: & $($mutability)? Block) {
                for statement in & $($mutability)? block.statements {
                    visitor.visit_statement(statement);
                }
            }

            fn walk_scoped_block<V: $trait + ?Sized>(visitor: &mut V, block: & $($mutability)? Block) {
                visitor.enter_scope(ScopeKind::Block);
                visitor.visit_block(block);
                visitor.exit_scope();
            }

            pub fn walk_statement<V: $trait + ?Sized>(
                visitor: &mut V,
                statement: & $($mutability)? Statement,
            ) {
                match & $($mutability)? statement.kind {
                    StatementKind::Assignment { targets, values, .. } => {
                        for target in targets {
                            visitor.visit_expression(target);
                        }
                        for value in values {
                            visitor.visit_expression(value);
                        }
                    }
                    StatementKind::Local { names, values } => {
                        // Initializers cannot see the names being declared.
                        for value in values {
                            visitor.visit_expression(value);
                        }
                        for name in names {
                            visitor.visit_name(name, NameRole::Declaration(BindingKind::Local));
                        }
                    }
                    StatementKind::LocalFunction { name, function } => {
                        visitor.visit_name(name, NameRole::Declaration(BindingKind::LocalFunction));
                        visitor.visit_function_body(function, false);
                    }
                    StatementKind::Function { name, function } => {
                        let mut path = name.path.$iter();
                        if let Some(first) = path.next() {
                            visitor.visit_name(first, NameRole::Reference);
                        }
                        for attribute in path {
                            visitor.visit_name(attribute, NameRole::Attribute);
                        }
                        let is_method = name.method.is_some();
                        if let Some(method) = & $($mutability)? name.method {
                            visitor.visit_name(method, NameRole::Attribute);
                        }
                        visitor.visit_function_body(function, is_method);
                    }
                    StatementKind::Call(call) => visitor.visit_expression(call),
                    StatementKind::Do(body) => walk_scoped_block(visitor, body),
                    StatementKind::While { condition, body } => {
                        visitor.visit_expression(condition);
                        walk_scoped_block(visitor, body);
                    }
                    StatementKind::Repeat { body, condition } => {
                        // The condition sees the body's locals.
                        visitor.enter_scope(ScopeKind::Block);
                        visitor.visit_block(body);
                        visitor.visit_expression(condition);
                        visitor.exit_scope();
                    }
                    StatementKind::If {
                        clauses,
                        else_block,
                        ..
                    } => {
                        for clause in clauses {
                            visitor.visit_expression(& $($mutability)? clause.condition);
                            walk_scoped_block(visitor, & $($mutability)? clause.block);
                        }
                        if let Some(block) = else_block {
                            walk_scoped_block(visitor, block);
                        }
                    }
                    StatementKind::NumericFor {
                        variable,
                        start,
                        limit,
                        step,
                        body,
                    } => {
                        visitor.visit_expression(start);
                        visitor.visit_expression(limit);
                        if let Some(step) = step {
                            visitor.visit_expression(step);
                        }
                        visitor.enter_scope(ScopeKind::Block);
                        visitor.visit_name(variable, NameRole::Declaration(BindingKind::ForVariable));
                        visitor.visit_block(body);
                        visitor.exit_scope();
                    }
                    StatementKind::GenericFor {
                        names,
                        iterators,
                        body,
                    } => {
                        for iterator in iterators {
                            visitor.visit_expression(iterator);
                        }
                        visitor.enter_scope(ScopeKind::Block);
                        for name in names {
                            visitor.visit_name(name, NameRole::Declaration(BindingKind::ForVariable));
                        }
                        visitor.visit_block(body);
                        visitor.exit_scope();
                    }
                    StatementKind::Return(values) => {
                        for value in values {
                            visitor.visit_expression(value);
                        }
                    }
                    StatementKind::Goto(label) => visitor.visit_name(label, NameRole::Goto),
                    StatementKind::Label(label) => visitor.visit_name(label, NameRole::Label),
                    StatementKind::Break | StatementKind::Empty => {}
                }
            }

            pub fn walk_function_body<V: $trait + ?Sized>(
                visitor: &mut V,
                function: & $($mutability)? FunctionBody,
                is_method: bool,
            ) {
                visitor.enter_scope(ScopeKind::Function {
                    is_method,
                    has_varargs: function.is_vararg,
                });
                for param in & $($mutability)? function.params {
                    visitor.visit_name(param, NameRole::Declaration(BindingKind::Parameter));
                }
                visitor.visit_block(& $($mutability)? function.body);
                visitor.exit_scope();
            }

            pub fn walk_expression<V: $trait + ?Sized>(
                visitor: &mut V,
                expression: & $($mutability)? Expression,
            ) {
                match & $($mutability)? expression.kind {
                    ExpressionKind::Nil
                    | ExpressionKind::True
                    | ExpressionKind::False
                    | ExpressionKind::Number(_)
                    | ExpressionKind::Vararg => {}
                    ExpressionKind::String(literal) => visitor.visit_string(literal),
                    ExpressionKind::Name(name) => visitor.visit_name(name, NameRole::Reference),
                    ExpressionKind::Index { object, key } => {
                        visitor.visit_expression(object);
                        visitor.visit_expression(key);
                    }
                    ExpressionKind::Field { object, field } => {
                        visitor.visit_expression(object);
                        visitor.visit_name(field, NameRole::Attribute);
                    }
                    ExpressionKind::Call { callee, args } => {
                        visitor.visit_expression(callee);
                        walk_call_args(visitor, args);
                    }
                    ExpressionKind::MethodCall {
                        object,
                        method,
                        args,
                    } => {
                        visitor.visit_expression(object);
                        visitor.visit_name(method, NameRole::Attribute);
                        walk_call_args(visitor, args);
                    }
                    ExpressionKind::Function(function) => visitor.visit_function_body(function, false),
                    ExpressionKind::Table(table) => walk_table(visitor, table),
                    ExpressionKind::Binary { lhs, rhs, .. } => {
                        visitor.visit_expression(lhs);
                        visitor.visit_expression(rhs);
                    }
                    ExpressionKind::Unary { operand, .. } => visitor.visit_expression(operand),
                    ExpressionKind::Paren(inner) => visitor.visit_expression(inner),
                }
            }

            pub fn walk_call_args<V: $trait + ?Sized>(visitor: &mut V, args: & $($mutability)? CallArgs) {
                match args {
                    CallArgs::List(values) => {
                        for value in values {
                            visitor.visit_expression(value);
                        }
                    }
                    CallArgs::Table(table) => walk_table(visitor, table),
                    CallArgs::String(literal) => visitor.visit_string(literal),
                }
            }

            pub fn walk_table<V: $trait + ?Sized>(
                visitor: &mut V,
                table: & $($mutability)? TableConstructor,
            ) {
                for field in & $($mutability)? table.fields {
                    match field {
                        TableField::Positional(value) => visitor.visit_expression(value),
                        TableField::Named { key, value } => {
                            visitor.visit_name(key, NameRole::Attribute);
                            visitor.visit_expression(value);
                        }
                        TableField::Keyed { key, value } => {
                            visitor.visit_expression(key);
                            visitor.visit_expression(value);
                        }
                    }
                }
            }
        }
    };
}

define_visitor!(visit, Visitor, iter);
define_visitor!(visit_mut, VisitorMut, iter_mut, mut);
