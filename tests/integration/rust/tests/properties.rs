//! Property tests over generated PICO-8 Lua programs

use codegen::{format, minify, FormatOptions, RenameOptions};
use integration_tests::semantic_texts;
use parser::{count_tokens, parse, tokenize};
use proptest::prelude::*;

fn name() -> impl Strategy<Value = String> {
    prop::sample::select(vec!["x", "speed", "player", "hp", "t", "score", "dx"])
        .prop_map(str::to_string)
}

fn expression() -> impl Strategy<Value = String> {
    let leaf = prop_oneof![
        name(),
        (0u32..1000).prop_map(|n| n.to_string()),
        Just("\"hi\"".to_string()),
        Just("true".to_string()),
        Just("nil".to_string()),
        (name(), name()).prop_map(|(object, field)| format!("{}.{}", object, field)),
    ];
    leaf.prop_recursive(3, 24, 3, |inner| {
        prop_oneof![
            (
                inner.clone(),
                prop::sample::select(vec!["+", "-", "*", "..", "==", "<", "and", "or"]),
                inner.clone()
            )
                .prop_map(|(lhs, op, rhs)| format!("{} {} {}", lhs, op, rhs)),
            inner.clone().prop_map(|e| format!("({})", e)),
            inner.clone().prop_map(|e| format!("not {}", e)),
            (name(), inner.clone()).prop_map(|(f, e)| format!("{}({})", f, e)),
            (name(), inner.clone(), inner).prop_map(|(k, a, b)| format!("{{{} = {}, {}}}", k, a, b)),
        ]
    })
}

fn simple_statement() -> impl Strategy<Value = String> {
    prop_oneof![
        (name(), expression()).prop_map(|(n, e)| format!("local {} = {}", n, e)),
        (name(), expression()).prop_map(|(n, e)| format!("{} = {}", n, e)),
        (name(), expression()).prop_map(|(n, e)| format!("{} += {}", n, e)),
        (name(), name(), expression()).prop_map(|(n, f, e)| format!("{}.{} = {}", n, f, e)),
        expression().prop_map(|e| format!("print({})", e)),
        (expression(), name()).prop_map(|(c, n)| format!("if ({}) {}(1)", c, n)),
        Just("-- note".to_string()),
        prop::sample::select(vec!["hp", "skip", "again"])
            .prop_map(|label| format!("do\ngoto {0}\n::{0}::\nend", label)),
    ]
}

fn statement() -> impl Strategy<Value = String> {
    simple_statement().prop_recursive(2, 16, 3, |inner| {
        let body = prop::collection::vec(inner, 0..3).prop_map(|lines| lines.join("\n"));
        prop_oneof![
            (expression(), body.clone()).prop_map(|(c, b)| format!("if {} then\n{}\nend", c, b)),
            (name(), body.clone()).prop_map(|(v, b)| format!("for {}=1,10 do\n{}\nend", v, b)),
            (name(), name(), body.clone())
                .prop_map(|(f, p, b)| format!("function {}({})\n{}\nend", f, p, b)),
            (name(), name(), body)
                .prop_map(|(o, m, b)| format!("function {}:{}()\n{}\nreturn self\nend", o, m, b)),
        ]
    })
}

fn program() -> impl Strategy<Value = String> {
    prop::collection::vec(statement(), 1..8).prop_map(|lines| lines.join("\n"))
}

proptest! {
    #[test]
    fn prop_lex_round_trip(source in program()) {
        let tokens = tokenize(source.as_bytes()).unwrap();
        let rebuilt: String = tokens.iter().map(|t| t.raw.as_str()).collect();
        prop_assert_eq!(rebuilt, source);
    }

    #[test]
    fn prop_format_idempotent(source in program(), indent_width in 0usize..5) {
        let options = FormatOptions { indent_width };
        let once = format(&parse(source.as_bytes()).unwrap(), &options);
        let twice = format(&parse(&once).unwrap(), &options);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn prop_rename_deterministic(source in program()) {
        let chunk = parse(source.as_bytes()).unwrap();
        let first = minify(&chunk, &RenameOptions::default()).unwrap();
        let second = minify(&chunk, &RenameOptions::default()).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_rename_keeps_token_count(source in program()) {
        let chunk = parse(source.as_bytes()).unwrap();
        let renamed = minify(&chunk, &RenameOptions::default()).unwrap().renamed_source;
        prop_assert_eq!(
            semantic_texts(&renamed).len(),
            semantic_texts(source.as_bytes()).len()
        );
        prop_assert_eq!(
            count_tokens(&tokenize(&renamed).unwrap()),
            count_tokens(&tokenize(source.as_bytes()).unwrap())
        );
    }

    #[test]
    fn prop_rename_respects_preserve_set(source in program()) {
        let options = RenameOptions {
            preserve_names: ["speed", "hp"].iter().map(|n| n.to_string()).collect(),
            preserve_all: false,
        };
        let chunk = parse(source.as_bytes()).unwrap();
        let renamed = minify(&chunk, &options).unwrap().renamed_source;
        let before = semantic_texts(source.as_bytes());
        let after = semantic_texts(&renamed);
        for kept in ["speed", "hp"] {
            prop_assert_eq!(
                before.iter().filter(|t| *t == kept).count(),
                after.iter().filter(|t| *t == kept).count()
            );
        }
    }
}
