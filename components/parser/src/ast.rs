//! Abstract Syntax Tree node definitions
//!
//! Statement and expression kinds are closed enums; every pass matches them
//! exhaustively. Nodes keep enough surface detail (parentheses, compound
//! operators, the single-line `if` form, explicit `;` and trailing table
//! separators) for serializers to reproduce the semantic token sequence.

use crate::lexer::Symbol;
use core_types::SourcePosition;

/// The top-level block of a parsed program
pub type Chunk = Block;

/// An ordered sequence of statements
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Block {
    /// Statements in source order; a `return` can only be last
    pub statements: Vec<Statement>,
    /// Comments after the last statement, before the block terminator
    pub trailing_comments: Vec<Comment>,
}

impl Block {
    /// Create a block without comments
    pub fn new(statements: Vec<Statement>) -> Self {
        Self {
            statements,
            trailing_comments: Vec::new(),
        }
    }

    /// Expressions of the trailing `return`, if the block ends with one
    pub fn return_values(&self) -> Option<&[Expression]> {
        match self.statements.last().map(|s| &s.kind) {
            Some(StatementKind::Return(values)) => Some(values),
            _ => None,
        }
    }
}

/// A source comment, raw text including the `--` marker
#[derive(Debug, Clone, PartialEq)]
pub struct Comment {
    /// Comment text as written
    pub text: String,
    /// Source location
    pub position: SourcePosition,
    /// Whether an empty line separates the comment from what precedes it
    pub blank_line_before: bool,
}

/// Comments that belong to a statement
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CommentAttachment {
    /// Comments on the lines above the statement
    pub leading: Vec<Comment>,
    /// Comment at the end of the statement's last line
    pub trailing: Option<Comment>,
    /// Whether an empty line separates the statement from what precedes it
    pub blank_line_before: bool,
}

/// A name occurrence: variable, parameter, attribute or label
#[derive(Debug, Clone, PartialEq)]
pub struct Identifier {
    /// Name as written
    pub name: String,
    /// Source location
    pub position: SourcePosition,
}

impl Identifier {
    /// Create an identifier
    pub fn new(name: impl Into<String>, position: SourcePosition) -> Self {
        Self {
            name: name.into(),
            position,
        }
    }
}

/// A statement with its comments
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    /// Statement kind
    pub kind: StatementKind,
    /// Position of the first token
    pub position: SourcePosition,
    /// Attached comments
    pub comments: CommentAttachment,
    /// Whether an explicit `;` follows the statement
    pub semicolon: bool,
}

impl Statement {
    /// Create a statement without comments
    pub fn new(kind: StatementKind, position: SourcePosition) -> Self {
        Self {
            kind,
            position,
            comments: CommentAttachment::default(),
            semicolon: false,
        }
    }
}

/// Lua statements
#[derive(Debug, Clone, PartialEq)]
pub enum StatementKind {
    /// `a, b.c = x, y`; with `compound` set, `a += x` stored as `a = a + x`
    Assignment {
        /// Assignment targets (names, fields, indexes)
        targets: Vec<Expression>,
        /// Assigned values
        values: Vec<Expression>,
        /// Operator of a compound assignment
        compound: Option<BinaryOperator>,
    },
    /// `local a, b = x, y`
    Local {
        /// Declared names
        names: Vec<Identifier>,
        /// Initial values
        values: Vec<Expression>,
    },
    /// `local function f() ... end`
    LocalFunction {
        /// Function name
        name: Identifier,
        /// Function body
        function: FunctionBody,
    },
    /// `function a.b:c() ... end`
    Function {
        /// Function name path
        name: FunctionName,
        /// Function body
        function: FunctionBody,
    },
    /// A call used as a statement
    Call(Expression),
    /// `do ... end`
    Do(Block),
    /// `while cond do ... end`
    While {
        /// Loop condition
        condition: Expression,
        /// Loop body
        body: Block,
    },
    /// `repeat ... until cond`
    Repeat {
        /// Loop body
        body: Block,
        /// Exit condition, evaluated in the body's scope
        condition: Expression,
    },
    /// `if` with optional `elseif` and `else` branches
    If {
        /// The `if` clause followed by each `elseif` clause
        clauses: Vec<IfClause>,
        /// The `else` block
        else_block: Option<Block>,
        /// Written as the single-line `if (cond) stmt` shorthand
        short: bool,
    },
    /// `for i = start, limit, step do ... end`
    NumericFor {
        /// Control variable
        variable: Identifier,
        /// Initial value
        start: Expression,
        /// Limit
        limit: Expression,
        /// Optional step
        step: Option<Expression>,
        /// Loop body
        body: Block,
    },
    /// `for k, v in exprs do ... end`
    GenericFor {
        /// Control variables
        names: Vec<Identifier>,
        /// Iterator expressions
        iterators: Vec<Expression>,
        /// Loop body
        body: Block,
    },
    /// `return exprs`
    Return(Vec<Expression>),
    /// `break`
    Break,
    /// `goto label`
    Goto(Identifier),
    /// `::label::`
    Label(Identifier),
    /// A lone `;`
    Empty,
}

/// One condition/block pair of an `if` statement
#[derive(Debug, Clone, PartialEq)]
pub struct IfClause {
    /// Branch condition
    pub condition: Expression,
    /// Branch body
    pub block: Block,
}

/// Name path of a function statement
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionName {
    /// Variable followed by dot-syntax attributes
    pub path: Vec<Identifier>,
    /// Method name after `:`
    pub method: Option<Identifier>,
}

/// Parameters and body of a function
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionBody {
    /// Named parameters
    pub params: Vec<Identifier>,
    /// Whether the parameter list ends with `...`
    pub is_vararg: bool,
    /// Function body
    pub body: Block,
    /// Position of the parameter list
    pub position: SourcePosition,
}

/// An expression with its position
#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    /// Expression kind
    pub kind: ExpressionKind,
    /// Position of the first token
    pub position: SourcePosition,
}

impl Expression {
    /// Create an expression
    pub fn new(kind: ExpressionKind, position: SourcePosition) -> Self {
        Self { kind, position }
    }

    /// Whether the expression can be assigned to
    pub fn is_assignable(&self) -> bool {
        matches!(
            self.kind,
            ExpressionKind::Name(_) | ExpressionKind::Field { .. } | ExpressionKind::Index { .. }
        )
    }

    /// Whether the expression is a function or method call
    pub fn is_call(&self) -> bool {
        matches!(
            self.kind,
            ExpressionKind::Call { .. } | ExpressionKind::MethodCall { .. }
        )
    }
}

/// A string literal
#[derive(Debug, Clone, PartialEq)]
pub struct StringLiteral {
    /// Literal as written, quotes or brackets included
    pub raw: String,
    /// Contents after escape processing
    pub value: String,
}

/// A numeric literal
#[derive(Debug, Clone, PartialEq)]
pub struct NumberLiteral {
    /// Literal as written
    pub raw: String,
    /// Numeric value
    pub value: f64,
}

/// Lua expressions
#[derive(Debug, Clone, PartialEq)]
pub enum ExpressionKind {
    /// nil
    Nil,
    /// true
    True,
    /// false
    False,
    /// Numeric literal
    Number(NumberLiteral),
    /// String literal
    String(StringLiteral),
    /// `...`
    Vararg,
    /// Variable reference
    Name(Identifier),
    /// `object[key]`
    Index {
        /// Indexed value
        object: Box<Expression>,
        /// Key expression
        key: Box<Expression>,
    },
    /// `object.field`
    Field {
        /// Indexed value
        object: Box<Expression>,
        /// Attribute name
        field: Identifier,
    },
    /// `callee(args)`
    Call {
        /// Called value
        callee: Box<Expression>,
        /// Arguments
        args: CallArgs,
    },
    /// `object:method(args)`
    MethodCall {
        /// Receiver
        object: Box<Expression>,
        /// Method name
        method: Identifier,
        /// Arguments
        args: CallArgs,
    },
    /// `function(params) ... end`
    Function(FunctionBody),
    /// `{ fields }`
    Table(TableConstructor),
    /// `lhs op rhs`
    Binary {
        /// Operator
        op: BinaryOperator,
        /// Left operand
        lhs: Box<Expression>,
        /// Right operand
        rhs: Box<Expression>,
    },
    /// `op operand`
    Unary {
        /// Operator
        op: UnaryOperator,
        /// Operand
        operand: Box<Expression>,
    },
    /// `(expr)`
    Paren(Box<Expression>),
}

/// Call arguments in one of the three call syntaxes
#[derive(Debug, Clone, PartialEq)]
pub enum CallArgs {
    /// `f(a, b)`
    List(Vec<Expression>),
    /// `f{...}`
    Table(TableConstructor),
    /// `f"str"`
    String(StringLiteral),
}

impl CallArgs {
    /// Number of arguments passed
    pub fn len(&self) -> usize {
        match self {
            CallArgs::List(args) => args.len(),
            CallArgs::Table(_) | CallArgs::String(_) => 1,
        }
    }

    /// Whether the call passes no arguments
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A table constructor
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TableConstructor {
    /// Fields in source order
    pub fields: Vec<TableField>,
    /// Whether the last field is followed by a separator
    pub trailing_separator: bool,
}

/// A table constructor field
#[derive(Debug, Clone, PartialEq)]
pub enum TableField {
    /// `value`
    Positional(Expression),
    /// `name = value`
    Named {
        /// Attribute name
        key: Identifier,
        /// Field value
        value: Expression,
    },
    /// `[key] = value`
    Keyed {
        /// Key expression
        key: Expression,
        /// Field value
        value: Expression,
    },
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOperator {
    /// or
    Or,
    /// and
    And,
    /// <
    Lt,
    /// >
    Gt,
    /// <=
    Le,
    /// >=
    Ge,
    /// ==
    Eq,
    /// ~=
    Ne,
    /// !=
    BangNe,
    /// |
    BitOr,
    /// ^^
    BitXor,
    /// &
    BitAnd,
    /// <<
    Shl,
    /// >>
    Shr,
    /// >>>
    LShr,
    /// <<>
    RotL,
    /// >><
    RotR,
    /// ..
    Concat,
    /// +
    Add,
    /// -
    Sub,
    /// *
    Mul,
    /// /
    Div,
    /// \
    IntDiv,
    /// %
    Mod,
    /// ^
    Pow,
}

/// Binding power of unary operators
pub const UNARY_PRECEDENCE: u8 = 12;

impl BinaryOperator {
    /// Operator for a binary operator symbol
    pub fn from_symbol(symbol: Symbol) -> Option<Self> {
        let op = match symbol {
            Symbol::Lt => BinaryOperator::Lt,
            Symbol::Gt => BinaryOperator::Gt,
            Symbol::LtEq => BinaryOperator::Le,
            Symbol::GtEq => BinaryOperator::Ge,
            Symbol::EqEq => BinaryOperator::Eq,
            Symbol::TildeEq => BinaryOperator::Ne,
            Symbol::BangEq => BinaryOperator::BangNe,
            Symbol::Pipe => BinaryOperator::BitOr,
            Symbol::CaretCaret => BinaryOperator::BitXor,
            Symbol::Amp => BinaryOperator::BitAnd,
            Symbol::Shl => BinaryOperator::Shl,
            Symbol::Shr => BinaryOperator::Shr,
            Symbol::LShr => BinaryOperator::LShr,
            Symbol::RotL => BinaryOperator::RotL,
            Symbol::RotR => BinaryOperator::RotR,
            Symbol::Concat => BinaryOperator::Concat,
            Symbol::Plus => BinaryOperator::Add,
            Symbol::Minus => BinaryOperator::Sub,
            Symbol::Star => BinaryOperator::Mul,
            Symbol::Slash => BinaryOperator::Div,
            Symbol::Backslash => BinaryOperator::IntDiv,
            Symbol::Percent => BinaryOperator::Mod,
            Symbol::Caret => BinaryOperator::Pow,
            _ => return None,
        };
        Some(op)
    }

    /// Operator applied by a compound assignment symbol such as `+=`
    pub fn from_compound(symbol: Symbol) -> Option<Self> {
        let op = match symbol {
            Symbol::PlusEq => BinaryOperator::Add,
            Symbol::MinusEq => BinaryOperator::Sub,
            Symbol::StarEq => BinaryOperator::Mul,
            Symbol::SlashEq => BinaryOperator::Div,
            Symbol::BackslashEq => BinaryOperator::IntDiv,
            Symbol::PercentEq => BinaryOperator::Mod,
            Symbol::CaretEq => BinaryOperator::Pow,
            Symbol::ConcatEq => BinaryOperator::Concat,
            Symbol::PipeEq => BinaryOperator::BitOr,
            Symbol::AmpEq => BinaryOperator::BitAnd,
            Symbol::CaretCaretEq => BinaryOperator::BitXor,
            Symbol::ShlEq => BinaryOperator::Shl,
            Symbol::ShrEq => BinaryOperator::Shr,
            Symbol::LShrEq => BinaryOperator::LShr,
            Symbol::RotLEq => BinaryOperator::RotL,
            Symbol::RotREq => BinaryOperator::RotR,
            _ => return None,
        };
        Some(op)
    }

    /// Source spelling
    pub fn as_str(self) -> &'static str {
        match self {
            BinaryOperator::Or => "or",
            BinaryOperator::And => "and",
            BinaryOperator::Lt => "<",
            BinaryOperator::Gt => ">",
            BinaryOperator::Le => "<=",
            BinaryOperator::Ge => ">=",
            BinaryOperator::Eq => "==",
            BinaryOperator::Ne => "~=",
            BinaryOperator::BangNe => "!=",
            BinaryOperator::BitOr => "|",
            BinaryOperator::BitXor => "^^",
            BinaryOperator::BitAnd => "&",
            BinaryOperator::Shl => "<<",
            BinaryOperator::Shr => ">>",
            BinaryOperator::LShr => ">>>",
            BinaryOperator::RotL => "<<>",
            BinaryOperator::RotR => ">><",
            BinaryOperator::Concat => "..",
            BinaryOperator::Add => "+",
            BinaryOperator::Sub => "-",
            BinaryOperator::Mul => "*",
            BinaryOperator::Div => "/",
            BinaryOperator::IntDiv => "\\",
            BinaryOperator::Mod => "%",
            BinaryOperator::Pow => "^",
        }
    }

    /// Spelling of the compound assignment form, e.g. `+=`
    pub fn compound_str(self) -> Option<&'static str> {
        let text = match self {
            BinaryOperator::Add => "+=",
            BinaryOperator::Sub => "-=",
            BinaryOperator::Mul => "*=",
            BinaryOperator::Div => "/=",
            BinaryOperator::IntDiv => "\\=",
            BinaryOperator::Mod => "%=",
            BinaryOperator::Pow => "^=",
            BinaryOperator::Concat => "..=",
            BinaryOperator::BitOr => "|=",
            BinaryOperator::BitAnd => "&=",
            BinaryOperator::BitXor => "^^=",
            BinaryOperator::Shl => "<<=",
            BinaryOperator::Shr => ">>=",
            BinaryOperator::LShr => ">>>=",
            BinaryOperator::RotL => "<<>=",
            BinaryOperator::RotR => ">><=",
            _ => return None,
        };
        Some(text)
    }

    /// Left and right binding power; right-associative operators bind
    /// tighter on the left
    pub fn precedence(self) -> (u8, u8) {
        match self {
            BinaryOperator::Or => (1, 1),
            BinaryOperator::And => (2, 2),
            BinaryOperator::Lt
            | BinaryOperator::Gt
            | BinaryOperator::Le
            | BinaryOperator::Ge
            | BinaryOperator::Eq
            | BinaryOperator::Ne
            | BinaryOperator::BangNe => (3, 3),
            BinaryOperator::BitOr => (4, 4),
            BinaryOperator::BitXor => (5, 5),
            BinaryOperator::BitAnd => (6, 6),
            BinaryOperator::Shl
            | BinaryOperator::Shr
            | BinaryOperator::LShr
            | BinaryOperator::RotL
            | BinaryOperator::RotR => (7, 7),
            BinaryOperator::Concat => (9, 8),
            BinaryOperator::Add | BinaryOperator::Sub => (10, 10),
            BinaryOperator::Mul | BinaryOperator::Div | BinaryOperator::IntDiv | BinaryOperator::Mod => {
                (11, 11)
            }
            BinaryOperator::Pow => (14, 13),
        }
    }
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOperator {
    /// -
    Neg,
    /// not
    Not,
    /// #
    Len,
    /// ~
    BitNot,
    /// @ (peek)
    Peek,
    /// % (peek2)
    Peek2,
    /// $ (peek4)
    Peek4,
}

impl UnaryOperator {
    /// Operator for a unary operator symbol
    pub fn from_symbol(symbol: Symbol) -> Option<Self> {
        let op = match symbol {
            Symbol::Minus => UnaryOperator::Neg,
            Symbol::Hash => UnaryOperator::Len,
            Symbol::Tilde => UnaryOperator::BitNot,
            Symbol::At => UnaryOperator::Peek,
            Symbol::Percent => UnaryOperator::Peek2,
            Symbol::Dollar => UnaryOperator::Peek4,
            _ => return None,
        };
        Some(op)
    }

    /// Source spelling
    pub fn as_str(self) -> &'static str {
        match self {
            UnaryOperator::Neg => "-",
            UnaryOperator::Not => "not",
            UnaryOperator::Len => "#",
            UnaryOperator::BitNot => "~",
            UnaryOperator::Peek => "@",
            UnaryOperator::Peek2 => "%",
            UnaryOperator::Peek4 => "$",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compound_operators_round_trip() {
        for symbol in [Symbol::PlusEq, Symbol::ConcatEq, Symbol::RotREq, Symbol::BackslashEq] {
            let op = BinaryOperator::from_compound(symbol).unwrap();
            assert_eq!(op.compound_str(), Some(symbol.as_str()));
        }
    }

    #[test]
    fn test_comparison_has_no_compound_form() {
        assert_eq!(BinaryOperator::Eq.compound_str(), None);
    }

    #[test]
    fn test_right_associative_operators() {
        let (left, right) = BinaryOperator::Concat.precedence();
        assert!(left > right);
        let (left, right) = BinaryOperator::Pow.precedence();
        assert!(left > right);
        assert!(right > UNARY_PRECEDENCE);
    }

    #[test]
    fn test_return_values() {
        let pos = SourcePosition::start();
        let block = Block::new(vec![Statement::new(
            StatementKind::Return(vec![Expression::new(ExpressionKind::Nil, pos)]),
            pos,
        )]);
        assert_eq!(block.return_values().map(<[Expression]>::len), Some(1));
        assert_eq!(Block::default().return_values(), None);
    }
}
