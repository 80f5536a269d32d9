//! Loader preamble emitted ahead of the root chunk

use core_types::{encode_source, ErrorKind, LuaError};
use parser::ast::{Chunk, ExpressionKind, Statement, StatementKind};

/// Names the loader defines or reads; renaming must leave them alone
pub const PRESERVED_NAMES: &[&str] = &["package", "loaded", "_c", "require"];

const PACKAGE_TABLE: &str = "package={loaded={},_c={}}";

const LOADER: &str = "function require(p)
local l=package.loaded
if (l[p]==nil) l[p]=package._c[p]()
if (l[p]==nil) l[p]=true
return l[p]
end";

/// A double-quoted Lua string literal holding `value`
pub fn quote(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for c in value.chars() {
        match c {
            '"' => quoted.push_str("\\\""),
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\n"),
            '\r' => quoted.push_str("\\r"),
            '\t' => quoted.push_str("\\t"),
            c if (c as u32) < 0x20 || c as u32 == 0x7f => {
                quoted.push_str(&format!("\\{:03}", c as u32))
            }
            c => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}

fn parse_text(text: &str) -> Result<Chunk, LuaError> {
    parser::parse(&encode_source(text))
}

/// `package._c["key"]=function() <body> end`
fn module_entry(key: &str, body: Chunk) -> Result<Statement, LuaError> {
    let source = format!("package._c[{}]=function() end", quote(key));
    let mut chunk = parse_text(&source)?;
    let Some(mut statement) = chunk.statements.pop() else {
        return Err(LuaError::new(
            ErrorKind::ParseError,
            format!("loader entry for '{}' produced no statement", key),
        ));
    };
    if let StatementKind::Assignment { values, .. } = &mut statement.kind {
        if let Some(ExpressionKind::Function(function)) = values.first_mut().map(|v| &mut v.kind) {
            function.body = body;
        }
    }
    Ok(statement)
}

/// Prefix `root` with the package table, one stored function per module in
/// the given order and the memoizing `require` loader.
///
/// Comments leading the first root statement (title and byline) move to the
/// top of the result.
pub fn prepend_preamble<'a>(
    mut root: Chunk,
    modules: impl IntoIterator<Item = (&'a str, &'a Chunk)>,
) -> Result<Chunk, LuaError> {
    let mut statements = parse_text(PACKAGE_TABLE)?.statements;
    if let (Some(package), Some(first)) = (statements.first_mut(), root.statements.first_mut()) {
        package.comments.leading = std::mem::take(&mut first.comments.leading);
        first.comments.blank_line_before = true;
    }
    for (key, body) in modules {
        statements.push(module_entry(key, body.clone())?);
    }
    statements.extend(parse_text(LOADER)?.statements);
    statements.append(&mut root.statements);
    Ok(Chunk {
        statements,
        trailing_comments: root.trailing_comments,
    })
}
