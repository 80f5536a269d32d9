//! Contract tests for codegen API
//!
//! These tests verify the serializers implement their contract correctly.

use codegen::{
    format, minify, tokens_merge, FormatOptions, NameGenerator, Namespace, RenameKey,
    RenameOptions,
};
use parser::parse;

// =============================================================================
// Minify Contract Tests
// =============================================================================

#[test]
fn test_minify_does_not_touch_input_tree() {
    let chunk = parse(b"local speed = 1\nprint(speed)").unwrap();
    let before = chunk.clone();
    minify(&chunk, &RenameOptions::default()).unwrap();
    assert_eq!(chunk, before);
}

#[test]
fn test_rename_map_in_assignment_order() {
    let chunk = parse(b"local first, second = 1, 2\nlocal t = {field = first}").unwrap();
    let output = minify(&chunk, &RenameOptions::default()).unwrap();
    let keys: Vec<(&str, Namespace)> = output
        .rename_map
        .keys()
        .map(|k| (k.name.as_str(), k.namespace))
        .collect();
    assert_eq!(
        keys,
        vec![
            ("first", Namespace::Variable),
            ("second", Namespace::Variable),
            ("field", Namespace::Attribute),
            ("t", Namespace::Variable),
        ]
    );
    let t = RenameKey {
        name: "t".to_string(),
        namespace: Namespace::Variable,
    };
    assert_eq!(output.rename_map[&t], "c");
}

#[test]
fn test_minify_output_reparses() {
    let source = "local v = 1.5\nwhile v < 10 do v = v * 2 end\nreturn v .. \"!\"";
    let chunk = parse(source.as_bytes()).unwrap();
    let output = minify(&chunk, &RenameOptions::default()).unwrap();
    let text = String::from_utf8(output.renamed_source.clone()).unwrap();
    assert!(text.starts_with("local a=1.5\nwhile a<10"));
    assert!(text.ends_with("return a..\"!\""));
    assert!(parse(&output.renamed_source).is_ok());
}

// =============================================================================
// Format Contract Tests
// =============================================================================

#[test]
fn test_format_keeps_comments_and_blank_lines() {
    let source = "-- header\n\n\nlocal x=1 -- one\nif x then\n-- inside\ny=2\nend";
    let chunk = parse(source.as_bytes()).unwrap();
    assert_eq!(
        String::from_utf8(format(&chunk, &FormatOptions::default())).unwrap(),
        "-- header\n\nlocal x = 1 -- one\nif x then\n  -- inside\n  y = 2\nend\n"
    );
}

#[test]
fn test_format_indent_width() {
    let chunk = parse(b"do x() end").unwrap();
    assert_eq!(
        format(&chunk, &FormatOptions { indent_width: 4 }),
        b"do\n    x()\nend\n".to_vec()
    );
}

// =============================================================================
// Helpers Contract Tests
// =============================================================================

#[test]
fn test_name_generator_is_an_iterator() {
    let names: Vec<String> = NameGenerator::new().take(3).collect();
    assert_eq!(names, vec!["a", "b", "c"]);
}

#[test]
fn test_tokens_merge_is_public() {
    assert!(tokens_merge("end", "x"));
    assert!(!tokens_merge("end", ")"));
}
