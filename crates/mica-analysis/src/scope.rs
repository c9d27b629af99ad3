//! Lexical scopes.
//!
//! A scope maps names to declared objects and links to its enclosing scope.
//! Insertion overwrites a same-named object within the *same* scope;
//! shadowing across scope levels is intentional and never disturbs outer
//! bindings.

use std::collections::HashMap;
use std::fmt;

use crate::obj;
use crate::objects::{ObjKey, ScopeKey, SemObjects};

/// One lexical scope.
#[derive(Debug, Default)]
pub struct Scope {
    parent: Option<ScopeKey>,
    elems: HashMap<String, ObjKey>,
    comment: String,
}

impl Scope {
    pub fn new(parent: Option<ScopeKey>, comment: &str) -> Scope {
        Scope {
            parent,
            elems: HashMap::new(),
            comment: comment.to_string(),
        }
    }

    #[inline]
    pub fn parent(&self) -> Option<ScopeKey> {
        self.parent
    }

    pub fn comment(&self) -> &str {
        &self.comment
    }

    pub fn len(&self) -> usize {
        self.elems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elems.is_empty()
    }

    /// Looks a name up in this scope only.
    pub fn lookup(&self, name: &str) -> Option<ObjKey> {
        self.elems.get(name).copied()
    }

    pub fn objects(&self) -> impl Iterator<Item = ObjKey> + '_ {
        self.elems.values().copied()
    }

    /// All names in this scope, sorted for deterministic enumeration.
    pub fn sorted_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.elems.keys().cloned().collect();
        names.sort();
        names
    }

    /// Inserts an object, overwriting any same-named object in this scope.
    /// Fails fast if the object violates its class/type legality invariant.
    pub fn insert(self_key: ScopeKey, okey: ObjKey, objs: &mut SemObjects) {
        let object = &objs.objs[okey];
        if let Some(typ) = object.typ() {
            obj::check_valid_type(object, typ, &objs.types);
        }
        let name = object.name().to_string();
        objs.scopes[self_key].elems.insert(name, okey);
    }
}

/// Walks the scope chain outward from `start` looking for `name`. Returns
/// the defining scope and the object, or `None` when the chain is
/// exhausted.
pub fn lookup_parent(start: ScopeKey, name: &str, objs: &SemObjects) -> Option<(ScopeKey, ObjKey)> {
    let mut current = Some(start);
    while let Some(skey) = current {
        let scope = &objs.scopes[skey];
        if let Some(okey) = scope.lookup(name) {
            return Some((skey, okey));
        }
        current = scope.parent();
    }
    None
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} scope {{", self.comment)?;
        for name in self.sorted_names() {
            writeln!(f, "    {}", name)?;
        }
        write!(f, "}}")
    }
}
