//! Recursive `require` expansion
//!
//! The resolver owns a module table keyed by the require string, which is
//! the key the emitted loader caches under at run time. Each key is loaded,
//! parsed and spliced at most once; later requests for the same key only
//! reference the stored function. Parsed files are additionally cached by
//! candidate path so two keys resolving to one file are read once.

use crate::error::io_error;
use crate::preamble::prepend_preamble;
use crate::requires::{scan_requires, strip_game_loop, RequireCall};
use crate::search_path::{locate, parent_dir, search_path_from_env};
use core_types::{LuaError, SourcePosition};
use indexmap::IndexMap;
use parser::ast::{Chunk, Expression};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Module resolution configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverOptions {
    /// Candidate patterns; empty means `PICO8_LUA_PATH` or the default
    pub search_path: Vec<String>,
    /// Directory candidates must stay within; defaults to the root file's
    pub base_directory: Option<PathBuf>,
}

impl ResolverOptions {
    /// Options using the pattern list from the environment
    pub fn from_env() -> Self {
        Self {
            search_path: search_path_from_env(),
            base_directory: None,
        }
    }

    /// The pattern list actually searched
    pub fn effective_search_path(&self) -> Vec<String> {
        if self.search_path.is_empty() {
            search_path_from_env()
        } else {
            self.search_path.clone()
        }
    }
}

/// Load state of a module record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LoadState {
    /// Its own requires are being expanded
    Loading,
    /// Fully expanded
    Loaded,
    /// Must be re-read by the next expansion
    Invalidated,
}

/// A module in the table
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleRecord {
    /// Require string the module is stored under
    pub key: String,
    /// File the module was read from
    pub candidate: PathBuf,
    /// Expanded module body
    pub chunk: Chunk,
    /// Load state
    pub state: LoadState,
    /// Game-loop functions were kept
    pub use_game_loop: bool,
    /// Keys the module itself requires, in first-required order
    pub requires: Vec<String>,
}

impl ModuleRecord {
    /// Expressions the module returns, if its body ends with `return`
    pub fn return_values(&self) -> Option<&[Expression]> {
        self.chunk.return_values()
    }
}

/// Modules by key in first-required order
#[derive(Debug, Clone, Default)]
pub struct ModuleTable {
    modules: IndexMap<String, ModuleRecord>,
}

impl ModuleTable {
    /// Record stored under `key`
    pub fn get(&self, key: &str) -> Option<&ModuleRecord> {
        self.modules.get(key)
    }

    /// Whether a record exists for `key`
    pub fn contains(&self, key: &str) -> bool {
        self.modules.contains_key(key)
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    /// Whether the table is empty
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Records in first-required order
    pub fn iter(&self) -> impl Iterator<Item = &ModuleRecord> {
        self.modules.values()
    }

    fn usable(&self, key: &str) -> bool {
        self.get(key)
            .is_some_and(|record| record.state != LoadState::Invalidated)
    }
}

/// A failed `require` call
#[derive(Debug, Clone, PartialEq)]
pub struct RequireDiagnostic {
    /// What went wrong
    pub error: LuaError,
    /// File containing the call
    pub file: PathBuf,
    /// Position of the call
    pub call_site: SourcePosition,
    /// The require string, when the call had a literal one
    pub require_path: Option<String>,
}

/// Result of expanding one root chunk
#[derive(Debug, Clone, PartialEq)]
pub struct Expansion {
    /// Root chunk with the loader preamble, or unchanged without requires
    pub chunk: Chunk,
    /// Failures, one per offending call site
    pub diagnostics: Vec<RequireDiagnostic>,
    /// Keys spliced into the preamble, in emission order
    pub modules: Vec<String>,
}

/// Splices required modules into a root chunk
pub struct ModuleResolver {
    search_path: Vec<String>,
    base_directory: Option<PathBuf>,
    table: ModuleTable,
    parsed: HashMap<PathBuf, Chunk>,
}

/// Per-expansion state
struct ExpandContext {
    base: PathBuf,
    diagnostics: Vec<RequireDiagnostic>,
}

impl ModuleResolver {
    /// Create a resolver with an empty module table
    pub fn new(options: ResolverOptions) -> Self {
        Self {
            search_path: options.effective_search_path(),
            base_directory: options.base_directory,
            table: ModuleTable::default(),
            parsed: HashMap::new(),
        }
    }

    /// Patterns this resolver searches
    pub fn search_path(&self) -> &[String] {
        &self.search_path
    }

    /// The module table
    pub fn table(&self) -> &ModuleTable {
        &self.table
    }

    /// Drop the cached copy of `key`; the next expansion reads it again.
    /// Returns whether the key was known.
    pub fn invalidate(&mut self, key: &str) -> bool {
        match self.table.modules.get_mut(key) {
            Some(record) => {
                record.state = LoadState::Invalidated;
                self.parsed.remove(&record.candidate);
                debug!(module = %key, "invalidated module");
                true
            }
            None => false,
        }
    }

    /// Read, parse and expand the root file at `file`
    pub fn expand_source(&mut self, source: &[u8], file: &Path) -> Result<Expansion, LuaError> {
        let chunk = parser::parse(source).map_err(|e| e.in_file(file))?;
        self.expand(chunk, file)
    }

    /// Expand every `require` reachable from `chunk`, which was read from
    /// `file`.
    ///
    /// Failures are collected per call site; a failed module is not
    /// expanded further while its siblings are. The error result is reserved
    /// for failures building the loader itself.
    pub fn expand(&mut self, mut chunk: Chunk, file: &Path) -> Result<Expansion, LuaError> {
        let mut context = ExpandContext {
            base: self
                .base_directory
                .clone()
                .unwrap_or_else(|| parent_dir(file)),
            diagnostics: Vec::new(),
        };
        let roots = self.expand_chunk(&mut chunk, file, &mut context);

        let modules = self.emission_order(&roots);
        if modules.is_empty() {
            return Ok(Expansion {
                chunk,
                diagnostics: context.diagnostics,
                modules,
            });
        }
        let bodies = modules
            .iter()
            .filter_map(|key| self.table.get(key))
            .map(|record| (record.key.as_str(), &record.chunk));
        let chunk = prepend_preamble(chunk, bodies)?;
        debug!(
            modules = modules.len(),
            diagnostics = context.diagnostics.len(),
            "expanded requires"
        );
        Ok(Expansion {
            chunk,
            diagnostics: context.diagnostics,
            modules,
        })
    }

    /// Resolve the requires of one chunk, returning the keys it depends on
    fn expand_chunk(
        &mut self,
        chunk: &mut Chunk,
        file: &Path,
        context: &mut ExpandContext,
    ) -> Vec<String> {
        let mut requires: Vec<String> = Vec::new();
        for call in scan_requires(chunk) {
            let call = match call {
                Ok(call) => call,
                Err(error) => {
                    report(context, file, error, None);
                    continue;
                }
            };
            if self.table.usable(&call.path) {
                if !requires.contains(&call.path) {
                    requires.push(call.path);
                }
                continue;
            }
            match self.load(&call, file, &context.base) {
                Ok((candidate, mut module)) => {
                    let key = call.path.clone();
                    self.table.modules.insert(
                        key.clone(),
                        ModuleRecord {
                            key: key.clone(),
                            candidate: candidate.clone(),
                            chunk: Chunk::default(),
                            state: LoadState::Loading,
                            use_game_loop: call.use_game_loop,
                            requires: Vec::new(),
                        },
                    );
                    let nested = self.expand_chunk(&mut module, &candidate, context);
                    if let Some(record) = self.table.modules.get_mut(&key) {
                        record.chunk = module;
                        record.requires = nested;
                        record.state = LoadState::Loaded;
                    }
                    if !requires.contains(&key) {
                        requires.push(key);
                    }
                }
                Err(error) => report(context, file, error, Some(&call)),
            }
        }
        requires
    }

    /// Locate and parse the module named by `call`
    fn load(
        &mut self,
        call: &RequireCall,
        file: &Path,
        base: &Path,
    ) -> Result<(PathBuf, Chunk), LuaError> {
        let candidate = locate(&call.path, &self.search_path, file, base)?;
        let mut module = match self.parsed.get(&candidate) {
            Some(chunk) => chunk.clone(),
            None => {
                let source =
                    std::fs::read(&candidate).map_err(|e| io_error(&candidate, e))?;
                let chunk = parser::parse(&source).map_err(|e| e.in_file(&candidate))?;
                self.parsed.insert(candidate.clone(), chunk.clone());
                chunk
            }
        };
        if !call.use_game_loop {
            let stripped = strip_game_loop(&mut module);
            if stripped > 0 {
                debug!(module = %call.path, stripped, "removed game-loop functions");
            }
        }
        debug!(module = %call.path, path = %candidate.display(), "loaded module");
        Ok((candidate, module))
    }

    /// Keys reachable from `roots`, each once, dependents before their
    /// dependencies
    fn emission_order(&self, roots: &[String]) -> Vec<String> {
        let mut order: Vec<String> = Vec::new();
        let mut pending: Vec<&str> = roots.iter().rev().map(String::as_str).collect();
        while let Some(key) = pending.pop() {
            if order.iter().any(|k| k == key) {
                continue;
            }
            let Some(record) = self.table.get(key) else {
                continue;
            };
            order.push(key.to_string());
            pending.extend(record.requires.iter().rev().map(String::as_str));
        }
        order
    }
}

fn report(context: &mut ExpandContext, file: &Path, error: LuaError, call: Option<&RequireCall>) {
    let call_site = call
        .map(|c| c.position)
        .or(error.source_position)
        .unwrap_or_default();
    warn!(
        file = %file.display(),
        line = call_site.line,
        error = %error,
        "require failed"
    );
    context.diagnostics.push(RequireDiagnostic {
        error: error.in_file(file),
        file: file.to_path_buf(),
        call_site,
        require_path: call.map(|c| c.path.clone()),
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::ErrorKind;
    use std::fs;

    fn project(files: &[(&str, &str)]) -> tempfile::TempDir {
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

    fn resolver() -> ModuleResolver {
        ModuleResolver::new(ResolverOptions {
            search_path: vec!["?".to_string(), "?.lua".to_string()],
            base_directory: None,
        })
    }

    #[test]
    fn test_no_requires_leaves_chunk_alone() {
        let dir = project(&[]);
        let chunk = parser::parse(b"x = 1").unwrap();
        let expansion = resolver()
            .expand(chunk.clone(), &dir.path().join("main.lua"))
            .unwrap();
        assert_eq!(expansion.chunk, chunk);
        assert!(expansion.modules.is_empty());
    }

    #[test]
    fn test_repeated_require_stored_once() {
        let dir = project(&[("m.lua", "return 7")]);
        let mut resolver = resolver();
        let expansion = resolver
            .expand_source(
                b"a = require(\"m\")\nb = require(\"m\")",
                &dir.path().join("main.lua"),
            )
            .unwrap();
        assert_eq!(expansion.modules, vec!["m"]);
        assert!(expansion.diagnostics.is_empty());
        assert_eq!(resolver.table().len(), 1);
        let record = resolver.table().get("m").unwrap();
        assert_eq!(record.state, LoadState::Loaded);
        assert_eq!(record.candidate, dir.path().join("m.lua"));
        assert_eq!(record.return_values().map(<[_]>::len), Some(1));
        // package, one module, loader, two root statements
        assert_eq!(expansion.chunk.statements.len(), 5);
    }

    #[test]
    fn test_nested_and_cyclic_requires() {
        let dir = project(&[
            ("a.lua", "b = require(\"b\")\nreturn 1"),
            ("b.lua", "a = require(\"a\")\nc = require(\"lib/c\")\nreturn 2"),
            ("lib/c.lua", "return 3"),
        ]);
        let mut resolver = resolver();
        let expansion = resolver
            .expand_source(b"require(\"a\")", &dir.path().join("main.lua"))
            .unwrap();
        assert!(expansion.diagnostics.is_empty());
        assert_eq!(expansion.modules, vec!["a", "b", "lib/c"]);
    }

    #[test]
    fn test_nested_require_relative_to_module() {
        let dir = project(&[
            ("lib/a.lua", "return require(\"b\")"),
            ("lib/b.lua", "return 2"),
        ]);
        let expansion = resolver()
            .expand_source(b"require(\"lib/a\")", &dir.path().join("main.lua"))
            .unwrap();
        assert!(expansion.diagnostics.is_empty());
        assert_eq!(expansion.modules, vec!["lib/a", "b"]);
    }

    #[test]
    fn test_failures_become_diagnostics() {
        let dir = project(&[("good.lua", "return 1"), ("bad.lua", "x = = 1")]);
        let expansion = resolver()
            .expand_source(
                b"require(\"missing\")\nrequire(\"../secret\")\nrequire(\"bad\")\nrequire(\"good\")",
                &dir.path().join("main.lua"),
            )
            .unwrap();
        let kinds: Vec<ErrorKind> = expansion.diagnostics.iter().map(|d| d.error.kind).collect();
        assert_eq!(
            kinds,
            vec![
                ErrorKind::ModuleNotFound,
                ErrorKind::PathEscape,
                ErrorKind::ParseError
            ]
        );
        assert_eq!(expansion.diagnostics[1].call_site.line, 2);
        assert_eq!(
            expansion.diagnostics[1].require_path.as_deref(),
            Some("../secret")
        );
        assert_eq!(
            expansion.diagnostics[2].error.file.as_deref(),
            Some(dir.path().join("bad.lua").as_path())
        );
        assert_eq!(expansion.modules, vec!["good"]);
    }

    #[test]
    fn test_game_loop_stripped_unless_requested() {
        let dir = project(&[("loop.lua", "function _update() end\nfunction helper() end")]);
        let mut stripped = resolver();
        stripped
            .expand_source(b"require(\"loop\")", &dir.path().join("main.lua"))
            .unwrap();
        assert_eq!(stripped.table().get("loop").unwrap().chunk.statements.len(), 1);

        let mut kept = resolver();
        kept.expand_source(
            b"require(\"loop\", {use_game_loop=true})",
            &dir.path().join("main.lua"),
        )
        .unwrap();
        let record = kept.table().get("loop").unwrap();
        assert!(record.use_game_loop);
        assert_eq!(record.chunk.statements.len(), 2);
    }

    #[test]
    fn test_invalidate_rereads_module() {
        let dir = project(&[("m.lua", "return 1")]);
        let main = dir.path().join("main.lua");
        let mut resolver = resolver();
        resolver.expand_source(b"require(\"m\")", &main).unwrap();

        fs::write(dir.path().join("m.lua"), "local v = 2\nreturn v").unwrap();
        resolver.expand_source(b"require(\"m\")", &main).unwrap();
        assert_eq!(resolver.table().get("m").unwrap().chunk.statements.len(), 1);

        assert!(resolver.invalidate("m"));
        assert!(!resolver.invalidate("unknown"));
        let expansion = resolver.expand_source(b"require(\"m\")", &main).unwrap();
        assert_eq!(expansion.modules, vec!["m"]);
        assert_eq!(resolver.table().get("m").unwrap().chunk.statements.len(), 2);
    }

    #[test]
    fn test_options_from_json() {
        let options: ResolverOptions =
            serde_json::from_str(r#"{"search_path": ["lib/?.lua"]}"#).unwrap();
        assert_eq!(options.search_path, vec!["lib/?.lua"]);
        assert_eq!(options.base_directory, None);
        assert_eq!(
            ModuleResolver::new(options).search_path(),
            &["lib/?.lua".to_string()]
        );
    }
}
