//! Contract tests for parser API
//!
//! These tests verify the parser component implements its contract correctly.

use core_types::{ErrorKind, LuaError};
use parser::ast::{BinaryOperator, CallArgs};
use parser::{
    parse, tokenize, BindingKind, CodeStats, ExpressionKind, Keyword, Lexer, NameRole, Parser,
    ScopeKind, ScopeResolver, StatementKind, Token, TokenKind, Visitor,
};

const SCENARIO: &str = "t = 0\nmusic(0)\nfunction _update()\n t += 1\nend";

// =============================================================================
// Lexer Contract Tests
// =============================================================================

#[test]
fn test_lexer_next_token_returns_result() {
    let mut lexer = Lexer::new(b"x = 42");
    let result: Result<Token, LuaError> = lexer.next_token();
    assert_eq!(result.unwrap().kind, TokenKind::Name);
}

#[test]
fn test_tokenize_ends_with_end_of_input() {
    let tokens = tokenize(b"x").unwrap();
    assert_eq!(tokens.last().map(|t| t.kind), Some(TokenKind::EndOfInput));
}

#[test]
fn test_tokens_reproduce_source() {
    let source = "-- hi\nif (a!=b) x+=1 else y = [[long\nstring]] --[[c]]\n";
    let tokens = tokenize(source.as_bytes()).unwrap();
    let rebuilt: String = tokens.iter().map(|t| t.raw.as_str()).collect();
    assert_eq!(rebuilt, source);
}

#[test]
fn test_scenario_semantic_indices() {
    let tokens = tokenize(SCENARIO.as_bytes()).unwrap();
    let indices: Vec<usize> = tokens.iter().filter_map(|t| t.index).collect();
    assert_eq!(indices, (0..=14).collect::<Vec<_>>());
    assert_eq!(tokens.iter().find(|t| t.index == Some(10)).map(|t| t.raw.as_str()), Some(")"));
}

#[test]
fn test_keyword_token_kind() {
    let tokens = tokenize(b"while").unwrap();
    assert_eq!(tokens[0].kind, TokenKind::Keyword(Keyword::While));
}

#[test]
fn test_tokens_serialize_to_json() {
    let tokens = tokenize(b"x").unwrap();
    let json = serde_json::to_value(&tokens[0]).unwrap();
    assert_eq!(json["raw"], "x");
    assert_eq!(json["index"], 0);
    assert_eq!(json["position"]["line"], 1);
}

#[test]
fn test_unterminated_string_is_lex_error() {
    let err = tokenize(b"x = \"abc").unwrap_err();
    assert_eq!(err.kind, ErrorKind::LexError);
    assert!(err.source_position.is_some());
}

// =============================================================================
// Token Counter Contract Tests
// =============================================================================

#[test]
fn test_scenario_runtime_count() {
    let stats = CodeStats::measure(SCENARIO.as_bytes()).unwrap();
    assert_eq!(stats.semantic_tokens, 15);
    assert_eq!(stats.tokens, 12);
    assert_eq!(stats.chars, SCENARIO.len());
    assert_eq!(stats.lines, 5);
}

// =============================================================================
// Parser Contract Tests
// =============================================================================

#[test]
fn test_parse_returns_block() {
    let chunk = parse(SCENARIO.as_bytes()).unwrap();
    assert_eq!(chunk.statements.len(), 3);
    assert!(matches!(
        chunk.statements[0].kind,
        StatementKind::Assignment { .. }
    ));
    assert!(matches!(chunk.statements[1].kind, StatementKind::Call(_)));
    match &chunk.statements[2].kind {
        StatementKind::Function { name, function } => {
            assert_eq!(name.path[0].name, "_update");
            match &function.body.statements[0].kind {
                StatementKind::Assignment { compound, .. } => {
                    assert_eq!(*compound, Some(BinaryOperator::Add))
                }
                other => panic!("unexpected {:?}", other),
            }
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_parser_from_tokens() {
    let tokens = tokenize(b"print(\"hi\")").unwrap();
    let chunk = Parser::new(tokens).parse().unwrap();
    match &chunk.statements[0].kind {
        StatementKind::Call(call) => match &call.kind {
            ExpressionKind::Call { args, .. } => {
                assert!(matches!(args, CallArgs::List(list) if list.len() == 1))
            }
            other => panic!("unexpected {:?}", other),
        },
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_parse_error_has_position_and_expectation() {
    let err = parse(b"x = = 1").unwrap_err();
    assert_eq!(err.kind, ErrorKind::ParseError);
    assert_eq!(err.line(), Some(1));
    assert!(err.message.starts_with("expected expression"));
}

// =============================================================================
// Visitor and Scope Contract Tests
// =============================================================================

struct DeclarationCounter {
    declarations: usize,
    scopes: Vec<ScopeKind>,
}

impl Visitor for DeclarationCounter {
    fn visit_name(&mut self, _name: &parser::ast::Identifier, role: NameRole) {
        if let NameRole::Declaration(_) = role {
            self.declarations += 1;
        }
    }

    fn enter_scope(&mut self, kind: ScopeKind) {
        self.scopes.push(kind);
    }
}

#[test]
fn test_visitor_reports_declarations_and_scopes() {
    let chunk = parse(b"local a, b\nfunction f(x, ...) local y end").unwrap();
    let mut counter = DeclarationCounter {
        declarations: 0,
        scopes: Vec::new(),
    };
    counter.visit_block(&chunk);
    assert_eq!(counter.declarations, 4);
    assert_eq!(
        counter.scopes,
        vec![ScopeKind::Function {
            is_method: false,
            has_varargs: true
        }]
    );
}

#[test]
fn test_scope_resolver_contract() {
    let chunk = parse(b"local p = 1\nfunction obj:move(dx) self.x = p + dx end").unwrap();
    let tree = ScopeResolver::new().resolve(&chunk);
    let kinds: Vec<BindingKind> = tree.bindings.iter().map(|b| b.kind).collect();
    assert_eq!(
        kinds,
        vec![
            BindingKind::Local,
            BindingKind::SelfParameter,
            BindingKind::Parameter
        ]
    );
    assert!(tree.is_global("obj"));
    assert!(tree.attributes.contains("x"));
    assert!(tree.attributes.contains("move"));
    assert_eq!(tree.bindings[0].references, 1);
}
