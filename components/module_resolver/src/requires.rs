//! Discovery and validation of `require` calls

use crate::error::invalid_require;
use core_types::{LuaError, SourcePosition};
use parser::ast::{CallArgs, Chunk, Expression, ExpressionKind, StatementKind, TableField};
use parser::visit::visit_mut::{walk_expression, VisitorMut};

/// Entry points the game loop calls by name
pub const GAME_LOOP_FUNCTIONS: &[&str] = &["_init", "_update", "_update60", "_draw"];

/// A validated `require("path")` call site
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequireCall {
    /// The literal module string
    pub path: String,
    /// Keep the module's game-loop functions
    pub use_game_loop: bool,
    /// Position of the call
    pub position: SourcePosition,
}

/// Collects `require` calls and drops their options argument
#[derive(Default)]
struct RequireScanner {
    calls: Vec<Result<RequireCall, LuaError>>,
}

impl VisitorMut for RequireScanner {
    fn visit_expression(&mut self, expression: &mut Expression) {
        if let ExpressionKind::Call { callee, args } = &mut expression.kind {
            if matches!(&callee.kind, ExpressionKind::Name(name) if name.name == "require") {
                let call = validate(args, expression.position);
                if call.is_ok() {
                    if let CallArgs::List(values) = args {
                        values.truncate(1);
                    }
                }
                self.calls.push(call);
            }
        }
        walk_expression(self, expression);
    }
}

fn validate(args: &CallArgs, position: SourcePosition) -> Result<RequireCall, LuaError> {
    let values: &[Expression] = match args {
        CallArgs::String(literal) => {
            return Ok(RequireCall {
                path: literal.value.clone(),
                use_game_loop: false,
                position,
            })
        }
        CallArgs::Table(_) => {
            return Err(invalid_require(
                "require() first argument must be a string literal",
                position,
            ))
        }
        CallArgs::List(values) => values,
    };
    if values.is_empty() || values.len() > 2 {
        return Err(invalid_require(
            format!("require() has {} args, should have 1 or 2", values.len()),
            position,
        ));
    }
    let ExpressionKind::String(literal) = &values[0].kind else {
        return Err(invalid_require(
            "require() first argument must be a string literal",
            position,
        ));
    };
    let use_game_loop = match values.get(1) {
        None => false,
        Some(options) => parse_options(options, position)?,
    };
    Ok(RequireCall {
        path: literal.value.clone(),
        use_game_loop,
        position,
    })
}

fn parse_options(options: &Expression, position: SourcePosition) -> Result<bool, LuaError> {
    let ExpressionKind::Table(table) = &options.kind else {
        return Err(invalid_require(
            "require() second argument must be a table literal",
            position,
        ));
    };
    match table.fields.as_slice() {
        [TableField::Named { key, value }] if key.name == "use_game_loop" => match value.kind {
            ExpressionKind::True => Ok(true),
            ExpressionKind::False => Ok(false),
            _ => Err(invalid_options(position)),
        },
        _ => Err(invalid_options(position)),
    }
}

fn invalid_options(position: SourcePosition) -> LuaError {
    invalid_require(
        "Invalid require() options; did you mean {use_game_loop=true} ?",
        position,
    )
}

/// Find every `require` call in `chunk`, in source order.
///
/// Valid calls lose their options table so the emitted call site is
/// `require("m")`; invalid calls are left untouched and reported.
pub fn scan_requires(chunk: &mut Chunk) -> Vec<Result<RequireCall, LuaError>> {
    let mut scanner = RequireScanner::default();
    scanner.visit_block(chunk);
    scanner.calls
}

/// Remove top-level game-loop function statements
pub fn strip_game_loop(chunk: &mut Chunk) -> usize {
    let before = chunk.statements.len();
    chunk.statements.retain(|statement| match &statement.kind {
        StatementKind::Function { name, .. } => !name
            .path
            .first()
            .is_some_and(|root| GAME_LOOP_FUNCTIONS.contains(&root.name.as_str())),
        _ => true,
    });
    before - chunk.statements.len()
}
