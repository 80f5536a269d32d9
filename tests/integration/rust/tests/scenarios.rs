//! Full-pipeline scenario tests
//!
//! Source -> tokens -> tree -> minified or formatted source

use codegen::{format, minify, FormatOptions, RenameOptions};
use integration_tests::semantic_texts;
use parser::{count_tokens, parse, tokenize, CodeStats, StatementKind};
use pipeline::{build, BuildOptions};
use std::path::Path;

const SCENARIO: &str = "t = 0\nmusic(0)\nfunction _update()\n t += 1\nend";

#[test]
fn test_scenario_parses_to_three_statements() {
    let chunk = parse(SCENARIO.as_bytes()).unwrap();
    let kinds: Vec<&StatementKind> = chunk.statements.iter().map(|s| &s.kind).collect();
    assert_eq!(kinds.len(), 3);
    assert!(matches!(kinds[0], StatementKind::Assignment { .. }));
    assert!(matches!(kinds[1], StatementKind::Call(_)));
    assert!(matches!(kinds[2], StatementKind::Function { .. }));
}

#[test]
fn test_scenario_token_inspection() {
    let tokens = tokenize(SCENARIO.as_bytes()).unwrap();
    let last_index = tokens.iter().filter_map(|t| t.index).max();
    assert_eq!(last_index, Some(14));
    assert_eq!(count_tokens(&tokens), 12);
}

#[test]
fn test_scenario_minify() {
    let chunk = parse(SCENARIO.as_bytes()).unwrap();
    let output = minify(&chunk, &RenameOptions::default()).unwrap();
    assert_eq!(
        output.renamed_source,
        b"t=0\nmusic(0)\nfunction _update()\nt+=1\nend".to_vec()
    );
    assert_eq!(
        semantic_texts(&output.renamed_source),
        semantic_texts(SCENARIO.as_bytes())
    );

    let before = CodeStats::measure(SCENARIO.as_bytes()).unwrap();
    let after = CodeStats::measure(&output.renamed_source).unwrap();
    assert_eq!(after.tokens, before.tokens);
    assert!(after.chars < before.chars);
}

#[test]
fn test_minified_cart_keeps_title_and_parses() {
    let source = "-- space dodge\n-- by someone\n\n-- state\nlocal player = {x = 64, y = 64}\n\nfunction _update()\n  if (btn(0)) player.x -= 1\n  if (btn(1)) player.x += 1\nend\n\nfunction _draw()\n  cls()\n  spr(1, player.x, player.y)\nend\n";
    let output = build(
        source.as_bytes(),
        Path::new("dodge.lua"),
        &BuildOptions {
            rename: Some(RenameOptions::default()),
            ..BuildOptions::default()
        },
    )
    .unwrap();
    let text = String::from_utf8(output.source.clone()).unwrap();
    assert!(text.starts_with("-- space dodge\n-- by someone\n"));
    assert!(!text.contains("-- state"));
    assert!(text.contains("if(btn(0))a.a-=1"));
    assert!(parse(&output.source).is_ok());
    assert_eq!(
        output.token_count,
        count_tokens(&tokenize(source.as_bytes()).unwrap())
    );
}

#[test]
fn test_format_then_minify_equals_minify() {
    let source = "local a=1 b={a, 2; c=3}\nwhile a<10 do a+=1 end";
    let chunk = parse(source.as_bytes()).unwrap();
    let formatted = format(&chunk, &FormatOptions::default());
    let reparsed = parse(&formatted).unwrap();
    assert_eq!(
        minify(&reparsed, &RenameOptions::default()).unwrap(),
        minify(&chunk, &RenameOptions::default()).unwrap()
    );
}

#[test]
fn test_lex_error_surfaces_position() {
    let err = build(b"x = \"open", Path::new("bad.lua"), &BuildOptions::default()).unwrap_err();
    assert_eq!(err.kind, core_types::ErrorKind::LexError);
    assert_eq!(err.line(), Some(1));
}

#[test]
fn test_preserved_label_kept_distinct() {
    let chunk = parse(b"::a::\n::foo::\ngoto foo\ngoto a").unwrap();
    let options = RenameOptions {
        preserve_names: ["a".to_string()].into_iter().collect(),
        preserve_all: false,
    };
    let output = minify(&chunk, &options).unwrap();
    let text = String::from_utf8(output.renamed_source).unwrap();
    assert_eq!(text.matches("::a::").count(), 1);
    assert!(parse(text.as_bytes()).is_ok());
}
