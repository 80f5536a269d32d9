//! Module expansion through the build pipeline

use codegen::{FormatOptions, RenameOptions};
use core_types::ErrorKind;
use module_resolver::{ModuleResolver, ResolverOptions};
use pipeline::{build, BuildOptions, BuildOutput};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn project(files: &[(&str, &str)]) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    for (name, contents) in files {
        let path = dir.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, contents).unwrap();
    }
    dir
}

fn resolve_options() -> ResolverOptions {
    ResolverOptions {
        search_path: vec!["?".to_string(), "?.lua".to_string()],
        base_directory: None,
    }
}

fn build_main(dir: &Path, source: &str, rename: bool) -> BuildOutput {
    let options = BuildOptions {
        resolve: Some(resolve_options()),
        rename: rename.then(RenameOptions::default),
        format: Some(FormatOptions::default()),
    };
    build(source.as_bytes(), &dir.join("main"), &options).unwrap()
}

fn text(output: &BuildOutput) -> String {
    String::from_utf8(output.source.clone()).unwrap()
}

#[test]
fn test_scenario_two_single_stored_module() {
    let dir = project(&[(
        "mylib",
        "local X={f=function(x,y) return x+y end}\nreturn X",
    )]);
    let output = build_main(dir.path(), "X=require(\"mylib\")", true);
    let minified = text(&output);

    assert!(output.diagnostics.is_empty());
    assert_eq!(minified.matches("package._c[\"mylib\"]=function()").count(), 1);
    assert!(minified.starts_with("package={loaded={},_c={}}\n"));
    assert!(minified.contains("function require("));
    assert!(minified.ends_with("X=require(\"mylib\")"));
    assert!(parser::parse(&output.source).is_ok());
}

#[test]
fn test_repeated_require_stores_one_copy() {
    let dir = project(&[("m.lua", "return {hp=3}")]);
    let output = build_main(
        dir.path(),
        "a = require(\"m\")\nfunction f() return require(\"m\") end",
        false,
    );
    assert_eq!(text(&output).matches("package._c[\"m\"]").count(), 1);
    assert_eq!(text(&output).matches("hp = 3").count(), 1);
}

#[test]
fn test_path_escape_produces_no_expansion() {
    let dir = project(&[("game/main", ""), ("secret", "return 1")]);
    let source = "s = require(\"../secret\")";
    let options = BuildOptions {
        resolve: Some(resolve_options()),
        ..BuildOptions::default()
    };
    let output = build(source.as_bytes(), &dir.path().join("game/main"), &options).unwrap();
    assert_eq!(output.diagnostics.len(), 1);
    assert_eq!(output.diagnostics[0].error.kind, ErrorKind::PathEscape);
    assert_eq!(output.source, source.as_bytes());
}

#[test]
fn test_missing_module_reported_siblings_expand() {
    let dir = project(&[("ok.lua", "return 1")]);
    let output = build_main(dir.path(), "a = require(\"gone\")\nb = require(\"ok\")", false);
    assert_eq!(output.diagnostics.len(), 1);
    assert_eq!(output.diagnostics[0].error.kind, ErrorKind::ModuleNotFound);
    assert_eq!(output.diagnostics[0].require_path.as_deref(), Some("gone"));
    assert!(text(&output).contains("package._c[\"ok\"]"));
    assert!(!text(&output).contains("package._c[\"gone\"]"));
}

#[test]
fn test_game_loop_functions_dropped_from_modules() {
    let dir = project(&[
        ("scene.lua", "function _draw() cls() end\nfunction draw_scene() end"),
        ("loop.lua", "function _draw() spr(1) end"),
    ]);
    let output = build_main(
        dir.path(),
        "require(\"scene\")\nrequire(\"loop\", {use_game_loop=true})",
        false,
    );
    let formatted = text(&output);
    assert!(!formatted.contains("cls()"));
    assert!(formatted.contains("draw_scene"));
    assert!(formatted.contains("spr(1)"));
    assert!(formatted.contains("require(\"loop\")\n"));
}

#[test]
fn test_title_moves_above_preamble() {
    let dir = project(&[("m.lua", "return 1")]);
    let output = build_main(dir.path(), "-- my game\n-- by me\nv = require(\"m\")", true);
    assert!(text(&output).starts_with("-- my game\n-- by me\npackage="));
}

#[test]
fn test_resolver_reuse_with_invalidation() {
    let dir = project(&[("m.lua", "return 1")]);
    let main = dir.path().join("main");
    let mut resolver = ModuleResolver::new(resolve_options());
    resolver.expand_source(b"require(\"m\")", &main).unwrap();

    fs::write(dir.path().join("m.lua"), "return 2").unwrap();
    let stale = resolver.expand_source(b"require(\"m\")", &main).unwrap();
    resolver.invalidate("m");
    let fresh = resolver.expand_source(b"require(\"m\")", &main).unwrap();

    let body = |chunk: &parser::ast::Chunk| {
        String::from_utf8(codegen::format(chunk, &FormatOptions::default())).unwrap()
    };
    assert!(body(&stale.chunk).contains("return 1"));
    assert!(body(&fresh.chunk).contains("return 2"));
}

#[test]
fn test_bare_root_name_cannot_reach_parent() {
    // tests run from the package directory, whose parent holds this crate
    let options = BuildOptions {
        resolve: Some(ResolverOptions {
            search_path: vec!["../rust/?.toml".to_string()],
            base_directory: None,
        }),
        ..BuildOptions::default()
    };
    let output = build(b"c = require(\"Cargo\")", Path::new("main.lua"), &options).unwrap();
    assert_eq!(output.diagnostics.len(), 1);
    assert_eq!(output.diagnostics[0].error.kind, ErrorKind::PathEscape);
    assert_eq!(output.source, b"c = require(\"Cargo\")".to_vec());
}
