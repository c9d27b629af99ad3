//! Checker state for one compilation unit.

use std::collections::HashMap;

use mica_common::diagnostics::{Diagnostic, DiagnosticSink};
use mica_syntax::NodeId;

use crate::constant::Value;
use crate::obj::PackageRef;
use crate::objects::{DeclKey, ObjKey, ScopeKey, SemObjects, TypeKey};
use crate::scope::{self, Scope};
use crate::target::Target;
use crate::universe::Universe;

/// Already-known packages, by import path. Used only to resolve the bound
/// name of imports without an explicit alias.
pub type KnownPackages = HashMap<String, PackageRef>;

/// Session options.
#[derive(Debug, Clone, Default)]
pub struct AnalysisOptions {
    /// Emit indented trace output (also enabled by the `MICA_TRACE`
    /// environment variable).
    pub trace: bool,
}

impl AnalysisOptions {
    pub fn from_env() -> AnalysisOptions {
        AnalysisOptions {
            trace: std::env::var_os("MICA_TRACE").is_some(),
        }
    }
}

/// Drives collection and resolution for one compilation unit.
///
/// Per-unit state (global table, redefinition table, per-node caches, the
/// unit's scope chain) lives here and is exclusively owned; the shared
/// caches (type interning tables, universes) live in [`SemObjects`], which
/// the checker owns for the session.
pub struct Checker {
    /// Semantic-object container for this session.
    pub sem: SemObjects,
    /// Accumulated diagnostics. Never thrown: callers inspect the sink.
    pub diagnostics: DiagnosticSink,

    /// The unit's package scope (child of the universe scope).
    pub(crate) scope: ScopeKey,
    /// The session universe handle.
    pub(crate) universe: Universe,
    /// Primary global table: name to pending declaration. First wins.
    pub(crate) globals: HashMap<String, DeclKey>,
    /// Names declared more than once, with every extra declaration.
    pub(crate) redefined: HashMap<String, Vec<DeclKey>>,
    /// Known packages for import-name resolution.
    pub(crate) known_packages: KnownPackages,

    /// Per-node resolved types (keyed by node identity).
    pub(crate) types: HashMap<NodeId, TypeKey>,
    /// Per-node folded constant values.
    pub(crate) values: HashMap<NodeId, Value>,

    /// Current `iota` binding; `Some` only while a constant declaration's
    /// initializer is being evaluated.
    pub(crate) iota: Option<Value>,
    /// Objects currently being resolved, for cycle detection.
    pub(crate) obj_path: Vec<ObjKey>,

    trace_enabled: bool,
    trace_indent: usize,
}

impl Checker {
    /// Creates a checker for one compilation unit on the given target.
    pub fn new(target: Target) -> Checker {
        Self::with_options(target, KnownPackages::new(), AnalysisOptions::from_env())
    }

    pub fn with_options(
        target: Target,
        known_packages: KnownPackages,
        options: AnalysisOptions,
    ) -> Checker {
        let mut sem = SemObjects::new(target);
        let universe = sem.universe().clone();
        let scope = sem
            .scopes
            .insert(Scope::new(Some(universe.scope()), "package"));
        Checker {
            sem,
            diagnostics: DiagnosticSink::new(),
            scope,
            universe,
            globals: HashMap::new(),
            redefined: HashMap::new(),
            known_packages,
            types: HashMap::new(),
            values: HashMap::new(),
            iota: None,
            obj_path: Vec::new(),
            trace_enabled: options.trace,
            trace_indent: 0,
        }
    }

    /// The unit's package scope.
    #[inline]
    pub fn package_scope(&self) -> ScopeKey {
        self.scope
    }

    /// The primary global table: one entry per distinct top-level name,
    /// pointing at the first (authoritative) declaration.
    pub fn globals(&self) -> &HashMap<String, DeclKey> {
        &self.globals
    }

    /// Names declared more than once. The first declaration is not here;
    /// it stays authoritative in [`Checker::globals`].
    pub fn redefined(&self) -> &HashMap<String, Vec<DeclKey>> {
        &self.redefined
    }

    /// Looks a name up from the package scope outward.
    pub fn lookup(&self, name: &str) -> Option<(ScopeKey, ObjKey)> {
        scope::lookup_parent(self.scope, name, &self.sem)
    }

    /// The declared object for a top-level name, if any.
    pub fn global_object(&self, name: &str) -> Option<ObjKey> {
        self.sem.scopes[self.scope].lookup(name)
    }

    pub(crate) fn error(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.emit(diagnostic);
    }

    // ------------------------------------------------------------------------
    // Tracing

    #[inline]
    pub(crate) fn trace(&self) -> bool {
        self.trace_enabled
    }

    pub(crate) fn trace_begin(&mut self, msg: &str) {
        if self.trace_enabled {
            eprintln!("{}{}", ".  ".repeat(self.trace_indent), msg);
            self.trace_indent += 1;
        }
    }

    pub(crate) fn trace_end(&mut self) {
        if self.trace_enabled {
            self.trace_indent = self.trace_indent.saturating_sub(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kind::Kind;

    #[test]
    fn test_new_checker_sees_universe() {
        let checker = Checker::new(Target::default());
        let (_, int) = checker.lookup("int").unwrap();
        assert_eq!(
            checker.sem.objs[int].typ(),
            Some(checker.universe.basic(Kind::Int))
        );
        assert!(checker.lookup("no such name").is_none());
    }

    #[test]
    fn test_package_scope_is_child_of_universe() {
        let checker = Checker::new(Target::default());
        assert_eq!(
            checker.sem.scopes[checker.package_scope()].parent(),
            Some(checker.universe.scope())
        );
    }

    #[test]
    fn test_fresh_checker_is_clean() {
        let checker = Checker::new(Target::default());
        assert!(checker.globals().is_empty());
        assert!(checker.redefined().is_empty());
        assert!(checker.diagnostics.is_empty());
    }
}
