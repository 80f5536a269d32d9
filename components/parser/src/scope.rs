//! Scope analysis for PICO-8 Lua syntax trees

use crate::ast::*;
use crate::lexer::is_identifier;
use crate::visit::visit::Visitor;
use crate::visit::{NameRole, ScopeKind};
use core_types::SourcePosition;
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};

/// Index of a binding in [`ScopeTree::bindings`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct BindingId(pub usize);

/// Index of a scope in [`ScopeTree::scopes`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ScopeId(pub usize);

/// What introduced a binding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum BindingKind {
    /// `local x`
    Local,
    /// `local function f`
    LocalFunction,
    /// Function parameter
    Parameter,
    /// Implicit `self` of a `function a:b()` method
    SelfParameter,
    /// Numeric or generic `for` variable
    ForVariable,
    /// `::label::`
    Label,
}

/// One declared local, parameter or label
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Binding {
    /// Binding identity
    pub id: BindingId,
    /// Original name
    pub name: String,
    /// Declaring scope
    pub scope: ScopeId,
    /// Declaration kind
    pub kind: BindingKind,
    /// Whether a renamer may change the name
    pub renameable: bool,
    /// Declaration site; `None` for the implicit `self`
    pub position: Option<SourcePosition>,
    /// Number of resolved references
    pub references: usize,
}

/// A lexical scope
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scope {
    /// Scope identity
    pub id: ScopeId,
    /// Enclosing scope
    pub parent: Option<ScopeId>,
    /// Scope kind
    pub kind: ScopeKind,
    /// Bindings declared in this scope, in declaration order
    pub bindings: Vec<BindingId>,
}

/// Outcome of resolving a name occurrence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Resolved {
    /// A local, parameter or label binding
    Local(BindingId),
    /// No enclosing declaration
    Global,
    /// A `goto` whose label is not visible
    Unresolved,
}

/// A resolved name occurrence
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reference {
    /// Name as written
    pub name: String,
    /// Occurrence site
    pub position: SourcePosition,
    /// Resolution
    pub resolved: Resolved,
}

/// Scope information for a chunk
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScopeTree {
    /// All scopes; the chunk scope is first
    pub scopes: Vec<Scope>,
    /// All bindings in declaration order
    pub bindings: Vec<Binding>,
    /// Names referenced without an enclosing declaration
    pub globals: BTreeSet<String>,
    /// Names used after `.` or `:`, as named table keys, or in function name paths
    pub attributes: BTreeSet<String>,
    /// String literal contents that are valid identifiers
    pub identifier_strings: BTreeSet<String>,
    /// Variable and label references in traversal order
    pub references: Vec<Reference>,
}

impl ScopeTree {
    /// Look up a binding
    pub fn binding(&self, id: BindingId) -> &Binding {
        &self.bindings[id.0]
    }

    /// Look up a scope
    pub fn scope(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.0]
    }

    /// Whether `name` is referenced anywhere as a global
    pub fn is_global(&self, name: &str) -> bool {
        self.globals.contains(name)
    }

    /// Names of variable bindings that must keep their spelling
    pub fn fixed_local_names(&self) -> BTreeSet<String> {
        self.bindings
            .iter()
            .filter(|b| !b.renameable && b.kind != BindingKind::Label)
            .map(|b| b.name.clone())
            .collect()
    }

    /// Resolution of the occurrence of `name` at `position`
    pub fn resolution_at(&self, name: &str, position: SourcePosition) -> Option<Resolved> {
        self.references
            .iter()
            .find(|r| r.position == position && r.name == name)
            .map(|r| r.resolved)
    }
}

/// A stack of lexical scopes mapping names to per-pass data
#[derive(Debug, Clone)]
pub struct ScopeStack<T> {
    frames: Vec<(ScopeKind, HashMap<String, T>)>,
}

impl<T> Default for ScopeStack<T> {
    fn default() -> Self {
        Self { frames: Vec::new() }
    }
}

impl<T> ScopeStack<T> {
    /// Create an empty stack
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a scope
    pub fn push(&mut self, kind: ScopeKind) {
        self.frames.push((kind, HashMap::new()));
    }

    /// Close the innermost scope
    pub fn pop(&mut self) {
        self.frames.pop();
    }

    /// Declare `name` in the innermost scope, shadowing earlier declarations
    pub fn declare(&mut self, name: &str, value: T) {
        if let Some((_, names)) = self.frames.last_mut() {
            names.insert(name.to_string(), value);
        }
    }

    /// Nearest visible declaration of `name`
    pub fn lookup(&self, name: &str) -> Option<&T> {
        self.frames.iter().rev().find_map(|(_, names)| names.get(name))
    }

    /// Kind of the innermost scope
    pub fn current_kind(&self) -> Option<ScopeKind> {
        self.frames.last().map(|(kind, _)| *kind)
    }

    /// Number of open scopes
    pub fn depth(&self) -> usize {
        self.frames.len()
    }
}

struct LabelFrame {
    scope: ScopeId,
    labels: HashMap<String, BindingId>,
    /// Gotos not yet matched, with their reference index
    pending: Vec<(String, usize)>,
}

/// Builds a [`ScopeTree`] from a block
pub struct ScopeResolver {
    preserved: BTreeSet<String>,
    tree: ScopeTree,
    variables: ScopeStack<BindingId>,
    frames: Vec<LabelFrame>,
}

impl Default for ScopeResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl ScopeResolver {
    /// Create a resolver where every local is renameable
    pub fn new() -> Self {
        Self::with_preserved(BTreeSet::new())
    }

    /// Create a resolver that marks bindings named in `preserved` as fixed
    pub fn with_preserved(preserved: BTreeSet<String>) -> Self {
        Self {
            preserved,
            tree: ScopeTree::default(),
            variables: ScopeStack::new(),
            frames: Vec::new(),
        }
    }

    /// Resolve every name in `chunk`
    pub fn resolve(mut self, chunk: &Chunk) -> ScopeTree {
        self.enter_scope(ScopeKind::Chunk);
        self.visit_block(chunk);
        self.exit_scope();
        self.tree
    }

    fn current_scope(&self) -> ScopeId {
        self.frames.last().map(|f| f.scope).unwrap_or(ScopeId(0))
    }

    fn declare(&mut self, name: &str, kind: BindingKind, position: Option<SourcePosition>) -> BindingId {
        let id = BindingId(self.tree.bindings.len());
        let scope = self.current_scope();
        let renameable = kind != BindingKind::SelfParameter && !self.preserved.contains(name);
        self.tree.bindings.push(Binding {
            id,
            name: name.to_string(),
            scope,
            kind,
            renameable,
            position,
            references: 0,
        });
        self.tree.scopes[scope.0].bindings.push(id);
        if kind == BindingKind::Label {
            if let Some(frame) = self.frames.last_mut() {
                frame.labels.insert(name.to_string(), id);
            }
        } else {
            self.variables.declare(name, id);
        }
        id
    }

    fn record(&mut self, name: &Identifier, resolved: Resolved) -> usize {
        if let Resolved::Local(id) = resolved {
            self.tree.bindings[id.0].references += 1;
        }
        self.tree.references.push(Reference {
            name: name.name.clone(),
            position: name.position,
            resolved,
        });
        self.tree.references.len() - 1
    }

    /// Labels visible from the current block, stopping at the function boundary
    fn find_label(&self, name: &str) -> Option<BindingId> {
        for frame in self.frames.iter().rev() {
            if let Some(id) = frame.labels.get(name) {
                return Some(*id);
            }
            if !matches!(self.tree.scopes[frame.scope.0].kind, ScopeKind::Block) {
                break;
            }
        }
        None
    }
}

impl Visitor for ScopeResolver {
    fn visit_name(&mut self, name: &Identifier, role: NameRole) {
        match role {
            NameRole::Declaration(kind) => {
                self.declare(&name.name, kind, Some(name.position));
            }
            NameRole::Reference => {
                let resolved = match self.variables.lookup(&name.name) {
                    Some(id) => Resolved::Local(*id),
                    None => {
                        self.tree.globals.insert(name.name.clone());
                        Resolved::Global
                    }
                };
                self.record(name, resolved);
            }
            NameRole::Attribute => {
                self.tree.attributes.insert(name.name.clone());
            }
            NameRole::Label => {
                self.declare(&name.name, BindingKind::Label, Some(name.position));
            }
            NameRole::Goto => match self.find_label(&name.name) {
                Some(id) => {
                    self.record(name, Resolved::Local(id));
                }
                None => {
                    let index = self.record(name, Resolved::Unresolved);
                    if let Some(frame) = self.frames.last_mut() {
                        frame.pending.push((name.name.clone(), index));
                    }
                }
            },
        }
    }

    fn visit_string(&mut self, literal: &StringLiteral) {
        if is_identifier(&literal.value) {
            self.tree.identifier_strings.insert(literal.value.clone());
        }
    }

    fn enter_scope(&mut self, kind: ScopeKind) {
        let id = ScopeId(self.tree.scopes.len());
        let parent = self.frames.last().map(|f| f.scope);
        self.tree.scopes.push(Scope {
            id,
            parent,
            kind,
            bindings: Vec::new(),
        });
        self.variables.push(kind);
        self.frames.push(LabelFrame {
            scope: id,
            labels: HashMap::new(),
            pending: Vec::new(),
        });
        if let ScopeKind::Function { is_method: true, .. } = kind {
            self.declare("self", BindingKind::SelfParameter, None);
        }
    }

    fn exit_scope(&mut self) {
        self.variables.pop();
        let Some(frame) = self.frames.pop() else {
            return;
        };
        let is_block = matches!(self.tree.scopes[frame.scope.0].kind, ScopeKind::Block);
        for (label, index) in frame.pending {
            if let Some(id) = frame.labels.get(&label) {
                self.tree.references[index].resolved = Resolved::Local(*id);
                self.tree.bindings[id.0].references += 1;
            } else if is_block {
                // A later label in an enclosing block of the same function.
                if let Some(parent) = self.frames.last_mut() {
                    parent.pending.push((label, index));
                }
            }
        }
    }
}
