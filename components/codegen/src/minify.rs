//! Identifier renaming and minified serialization
//!
//! Names are mapped per namespace through one map for the whole chunk, so
//! every occurrence of an original name receives the same short name. The
//! map is injective within a namespace and never produces a global name,
//! a preserved name or a fixed local, which keeps shadowing and global
//! access exactly as they were.

use crate::error::rename_collision;
use crate::names::NameGenerator;
use crate::printer::Style;
use crate::writer::Writer;
use core_types::{encode_source, LuaError};
use indexmap::IndexMap;
use parser::ast::{Chunk, Identifier};
use parser::lexer::Keyword;
use parser::{NameRole, ScopeKind, ScopeResolver, ScopeStack, VisitorMut};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use tracing::debug;

/// Table keys the runtime looks up by name
pub const METAMETHODS: &[&str] = &[
    "__index",
    "__newindex",
    "__call",
    "__tostring",
    "__len",
    "__unm",
    "__add",
    "__sub",
    "__mul",
    "__div",
    "__idiv",
    "__mod",
    "__pow",
    "__concat",
    "__eq",
    "__lt",
    "__le",
    "__band",
    "__bor",
    "__bxor",
    "__shl",
    "__shr",
    "__bnot",
    "__metatable",
    "__mode",
    "__gc",
    "__close",
    "__name",
    "__pairs",
    "__ipairs",
];

/// Variables with built-in meaning that must keep their spelling
const FIXED_VARIABLES: &[&str] = &["_ENV", "self"];

/// Renamer configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenameOptions {
    /// Names kept verbatim as variables and as attributes
    pub preserve_names: BTreeSet<String>,
    /// Strip comments and whitespace without renaming anything
    pub preserve_all: bool,
}

/// Which kind of name a rename applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Namespace {
    /// Locals and parameters
    Variable,
    /// Dot-syntax fields, method names and named table keys
    Attribute,
    /// `goto` labels
    Label,
}

/// An original name in a namespace
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RenameKey {
    /// Original name
    pub name: String,
    /// Namespace of the name
    pub namespace: Namespace,
}

/// Assigned short names in assignment order
pub type RenameMap = IndexMap<RenameKey, String>;

/// Result of minifying a chunk
#[derive(Debug, Clone, PartialEq)]
pub struct RenameOutput {
    /// Minified source
    pub renamed_source: Vec<u8>,
    /// Names that were changed
    pub rename_map: RenameMap,
}

/// Short-name allocation for one namespace
#[derive(Default)]
struct NameSpace {
    reserved: HashSet<String>,
    assigned: HashSet<String>,
    generator: NameGenerator,
}

impl NameSpace {
    fn with_reserved<'a>(names: impl IntoIterator<Item = &'a String>) -> Self {
        let mut reserved: HashSet<String> = names.into_iter().cloned().collect();
        reserved.extend(Keyword::ALL.iter().map(|k| k.as_str().to_string()));
        Self {
            reserved,
            ..Self::default()
        }
    }
}

/// Rewrites identifiers of a cloned tree
struct Renamer {
    preserved: BTreeSet<String>,
    /// Whether each visible local may be renamed
    scopes: ScopeStack<bool>,
    variables: NameSpace,
    attributes: NameSpace,
    labels: NameSpace,
    map: RenameMap,
    error: Option<LuaError>,
}

impl Renamer {
    fn new(chunk: &Chunk, options: &RenameOptions) -> Self {
        let mut preserved = options.preserve_names.clone();
        preserved.extend(FIXED_VARIABLES.iter().map(|n| n.to_string()));
        let tree = ScopeResolver::with_preserved(preserved.clone()).resolve(chunk);

        let fixed_locals = tree.fixed_local_names();
        let variables = NameSpace::with_reserved(
            preserved.iter().chain(&tree.globals).chain(&fixed_locals),
        );

        let metamethods: Vec<String> = METAMETHODS.iter().map(|n| n.to_string()).collect();
        let attributes = NameSpace::with_reserved(
            preserved
                .iter()
                .chain(&tree.identifier_strings)
                .chain(&metamethods),
        );

        debug!(
            globals = tree.globals.len(),
            bindings = tree.bindings.len(),
            attributes = tree.attributes.len(),
            "resolved scopes for renaming"
        );

        let labels = NameSpace::with_reserved(&preserved);

        Self {
            preserved,
            scopes: ScopeStack::new(),
            variables,
            attributes,
            labels,
            map: RenameMap::new(),
            error: None,
        }
    }

    fn short_name(&mut self, name: &str, namespace: Namespace) -> String {
        let key = RenameKey {
            name: name.to_string(),
            namespace,
        };
        if let Some(short) = self.map.get(&key) {
            return short.clone();
        }
        let space = match namespace {
            Namespace::Variable => &mut self.variables,
            Namespace::Attribute => &mut self.attributes,
            Namespace::Label => &mut self.labels,
        };
        let NameSpace {
            reserved,
            assigned,
            generator,
        } = space;
        let short = generator.next_available(|n| !reserved.contains(n) && !assigned.contains(n));
        if !assigned.insert(short.clone()) || reserved.contains(&short) {
            self.error.get_or_insert_with(|| {
                rename_collision(format!("'{}' assigned to '{}' is already taken", short, name))
            });
        }
        self.map.insert(key, short.clone());
        short
    }

    fn rename(&mut self, name: &mut Identifier, namespace: Namespace) {
        name.name = self.short_name(&name.name, namespace);
    }

    fn keeps_attribute(&self, name: &str) -> bool {
        self.preserved.contains(name) || METAMETHODS.contains(&name)
    }
}

impl VisitorMut for Renamer {
    fn visit_name(&mut self, name: &mut Identifier, role: NameRole) {
        match role {
            NameRole::Declaration(_) => {
                let renameable = !self.preserved.contains(&name.name);
                self.scopes.declare(&name.name, renameable);
                if renameable {
                    self.rename(name, Namespace::Variable);
                }
            }
            NameRole::Reference => {
                if self.scopes.lookup(&name.name) == Some(&true) {
                    self.rename(name, Namespace::Variable);
                }
            }
            NameRole::Attribute => {
                if !self.keeps_attribute(&name.name) {
                    self.rename(name, Namespace::Attribute);
                }
            }
            NameRole::Label | NameRole::Goto => {
                if !self.preserved.contains(&name.name) {
                    self.rename(name, Namespace::Label);
                }
            }
        }
    }

    fn enter_scope(&mut self, kind: ScopeKind) {
        self.scopes.push(kind);
        if let ScopeKind::Function { is_method: true, .. } = kind {
            self.scopes.declare("self", false);
        }
    }

    fn exit_scope(&mut self) {
        self.scopes.pop();
    }
}

/// Minify `chunk`: rename identifiers as configured and strip comments and
/// insignificant whitespace. The first two leading comments of the chunk
/// are kept as the cartridge title and byline.
pub fn minify(chunk: &Chunk, options: &RenameOptions) -> Result<RenameOutput, LuaError> {
    let mut tree = chunk.clone();
    let rename_map = if options.preserve_all {
        RenameMap::new()
    } else {
        let mut renamer = Renamer::new(chunk, options);
        renamer.enter_scope(ScopeKind::Chunk);
        renamer.visit_block(&mut tree);
        renamer.exit_scope();
        if let Some(error) = renamer.error {
            return Err(error);
        }
        renamer.map
    };

    let mut writer = Writer::new(Style::Minify, false);
    let header = match tree.statements.first() {
        Some(first) => &first.comments.leading,
        None => &tree.trailing_comments,
    };
    for comment in header.iter().take(2) {
        writer.comment_line(&comment.text);
    }
    writer.write_block(&tree);
    let renamed_source = encode_source(&writer.finish());

    debug!(
        renamed = rename_map.len(),
        bytes = renamed_source.len(),
        "minified chunk"
    );
    Ok(RenameOutput {
        renamed_source,
        rename_map,
    })
}
