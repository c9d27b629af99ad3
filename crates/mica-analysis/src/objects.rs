//! The semantic-object container.
//!
//! [`SemObjects`] owns every arena (objects, types, scopes, pending
//! declarations), the canonical interning tables for compound types, and
//! the per-target universe instances. It has session lifetime: one
//! container per compilation session, created with the session's compile
//! target. Because all shared state lives here and the container is owned
//! by exactly one checker at a time, no synchronization is needed.
//!
//! The `new_*` constructors are the only sanctioned way to obtain a
//! compound type: each consults a variant-specific canonical table keyed by
//! the structural signature and returns the existing shared key when
//! present, so structural equality of non-named types is key equality.
//! Entries are never evicted.

use std::collections::{HashMap, HashSet};

use crate::arena::Arena;
use crate::check::collect::Decl;
use crate::kind::Kind;
use crate::obj::{self, Object};
use crate::scope::Scope;
use crate::target::Target;
use crate::typ::{
    combine_hashes, ArrayDetail, BasicDetail, ChanDetail, ChanDir, Field, FuncDetail, HashBuilder,
    InterfaceDetail, InvalidKeyType, MapDetail, Method, NamedDetail, PointerDetail, SliceDetail,
    StructDetail, Type, TypeDetail, TypeFlags, TypeHash, TypeHeader, Verbosity,
};
use crate::universe::Universe;

crate::define_key! {
    /// Key for declared objects.
    pub struct ObjKey;

    /// Key for types. Key identity is type identity for non-named types.
    pub struct TypeKey;

    /// Key for scopes.
    pub struct ScopeKey;

    /// Key for pending declarations.
    pub struct DeclKey;
}

pub type Objects = Arena<ObjKey, Object>;
pub type Types = Arena<TypeKey, Type>;
pub type Scopes = Arena<ScopeKey, Scope>;
pub type Decls = Arena<DeclKey, Decl>;

/// Canonical signature of a function type.
type FuncSig = (Vec<TypeKey>, Vec<TypeKey>, bool);
/// Canonical signature of a struct type (field order is significant).
type StructSig = Vec<(String, TypeKey, bool)>;
/// Canonical signature of an interface type (methods sorted by name).
type IfaceSig = Vec<(String, TypeKey)>;

/// Central container for all semantic objects of one compilation session.
pub struct SemObjects {
    pub objs: Objects,
    pub types: Types,
    pub scopes: Scopes,
    pub decls: Decls,

    target: Target,
    universes: HashMap<Target, Universe>,

    slices: HashMap<TypeKey, TypeKey>,
    arrays: HashMap<(TypeKey, u64), TypeKey>,
    maps: HashMap<(TypeKey, TypeKey), TypeKey>,
    ptrs: HashMap<TypeKey, TypeKey>,
    chans: HashMap<(ChanDir, TypeKey), TypeKey>,
    funcs: HashMap<FuncSig, TypeKey>,
    structs: HashMap<StructSig, TypeKey>,
    ifaces: HashMap<IfaceSig, TypeKey>,
}

impl SemObjects {
    /// Creates an empty container for the given compile target. The
    /// universe is built lazily on first use.
    pub fn new(target: Target) -> SemObjects {
        SemObjects {
            objs: Arena::new(),
            types: Arena::new(),
            scopes: Arena::new(),
            decls: Arena::new(),
            target,
            universes: HashMap::new(),
            slices: HashMap::new(),
            arrays: HashMap::new(),
            maps: HashMap::new(),
            ptrs: HashMap::new(),
            chans: HashMap::new(),
            funcs: HashMap::new(),
            structs: HashMap::new(),
            ifaces: HashMap::new(),
        }
    }

    #[inline]
    pub fn target(&self) -> Target {
        self.target
    }

    /// The universe for the session target.
    pub fn universe(&mut self) -> &Universe {
        self.universe_for(self.target)
    }

    /// The universe for an arbitrary target, built on first request and
    /// memoized — at most one instance per distinct target.
    pub fn universe_for(&mut self, target: Target) -> &Universe {
        if !self.universes.contains_key(&target) {
            let u = Universe::build(self, target);
            self.universes.insert(target, u);
        }
        &self.universes[&target]
    }

    // ------------------------------------------------------------------------
    // Type constructors

    /// Creates a basic type record. Only the universe builder calls this;
    /// basics are canonicalized per universe rather than via an interning
    /// table.
    pub(crate) fn new_basic(&mut self, kind: Kind, target: Target) -> TypeKey {
        let size = kind.size_of(target);
        let mut h = HashBuilder::new("basic");
        h.write_str(kind.name());
        h.write_u64(size as u64);
        let header = TypeHeader {
            kind,
            size,
            align: kind.align_of(target),
            flags: TypeFlags::COMPLETE | TypeFlags::COMPARABLE,
            hash: h.finish(),
            str: kind.name().to_string(),
        };
        self.types.insert(Type::new(
            header,
            TypeDetail::Basic(BasicDetail { name: kind.name() }),
        ))
    }

    /// The canonical slice type with the given element type.
    pub fn new_slice(&mut self, elem: TypeKey) -> TypeKey {
        if let Some(&t) = self.slices.get(&elem) {
            return t;
        }
        let word = self.target.word_size();
        let eh = self.types[elem].header();
        let header = TypeHeader {
            kind: Kind::Slice,
            size: 3 * word,
            align: word,
            flags: eh.flags & TypeFlags::COMPLETE,
            hash: TypeHash::UNKNOWN,
            str: format!("[]{}", eh.str),
        };
        let t = self
            .types
            .insert(Type::new(header, TypeDetail::Slice(SliceDetail { elem })));
        self.finish_type(t);
        self.slices.insert(elem, t);
        t
    }

    /// The canonical pointer type with the given base type.
    pub fn new_ptr(&mut self, base: TypeKey) -> TypeKey {
        if let Some(&t) = self.ptrs.get(&base) {
            return t;
        }
        let word = self.target.word_size();
        let bh = self.types[base].header();
        let header = TypeHeader {
            kind: Kind::Ptr,
            size: word,
            align: word,
            flags: (bh.flags & TypeFlags::COMPLETE) | TypeFlags::COMPARABLE,
            hash: TypeHash::UNKNOWN,
            str: format!("*{}", bh.str),
        };
        let t = self
            .types
            .insert(Type::new(header, TypeDetail::Pointer(PointerDetail { base })));
        self.finish_type(t);
        self.ptrs.insert(base, t);
        t
    }

    /// The canonical array type `[len]elem`.
    pub fn new_array(&mut self, elem: TypeKey, len: u64) -> TypeKey {
        if let Some(&t) = self.arrays.get(&(elem, len)) {
            return t;
        }
        let eh = self.types[elem].header();
        let header = TypeHeader {
            kind: Kind::Array,
            size: eh.size.saturating_mul(len as u32),
            align: eh.align.max(1),
            flags: eh.flags & (TypeFlags::COMPLETE | TypeFlags::COMPARABLE),
            hash: TypeHash::UNKNOWN,
            str: format!("[{}]{}", len, eh.str),
        };
        let t = self
            .types
            .insert(Type::new(header, TypeDetail::Array(ArrayDetail { elem, len })));
        self.finish_type(t);
        self.arrays.insert((elem, len), t);
        t
    }

    /// The canonical map type `map[key]elem`. Fails when the key type is
    /// not comparable (slices, maps, funcs, structs containing them).
    pub fn new_map(&mut self, key: TypeKey, elem: TypeKey) -> Result<TypeKey, InvalidKeyType> {
        if !self.types[key].is_comparable() {
            return Err(InvalidKeyType { key });
        }
        if let Some(&t) = self.maps.get(&(key, elem)) {
            return Ok(t);
        }
        let word = self.target.word_size();
        let kh = self.types[key].header();
        let eh = self.types[elem].header();
        let header = TypeHeader {
            kind: Kind::Map,
            size: word,
            align: word,
            flags: kh.flags & eh.flags & TypeFlags::COMPLETE,
            hash: TypeHash::UNKNOWN,
            str: format!("map[{}]{}", kh.str, eh.str),
        };
        let t = self
            .types
            .insert(Type::new(header, TypeDetail::Map(MapDetail { key, elem })));
        self.finish_type(t);
        self.maps.insert((key, elem), t);
        Ok(t)
    }

    /// The canonical channel type.
    pub fn new_chan(&mut self, dir: ChanDir, elem: TypeKey) -> TypeKey {
        if let Some(&t) = self.chans.get(&(dir, elem)) {
            return t;
        }
        let word = self.target.word_size();
        let eh = self.types[elem].header();
        let header = TypeHeader {
            kind: Kind::Chan,
            size: word,
            align: word,
            flags: (eh.flags & TypeFlags::COMPLETE) | TypeFlags::COMPARABLE,
            hash: TypeHash::UNKNOWN,
            str: format!("{} {}", dir.tag(), eh.str),
        };
        let t = self
            .types
            .insert(Type::new(header, TypeDetail::Chan(ChanDetail { dir, elem })));
        self.finish_type(t);
        self.chans.insert((dir, elem), t);
        t
    }

    /// The canonical function type with the given signature.
    pub fn new_func(
        &mut self,
        params: Vec<TypeKey>,
        results: Vec<TypeKey>,
        variadic: bool,
    ) -> TypeKey {
        let sig = (params.clone(), results.clone(), variadic);
        if let Some(&t) = self.funcs.get(&sig) {
            return t;
        }
        let word = self.target.word_size();
        let mut flags = TypeFlags::COMPLETE;
        for &child in params.iter().chain(results.iter()) {
            flags = flags & self.types[child].header().flags;
        }
        let str = self.func_str(&params, &results, variadic);
        let header = TypeHeader {
            kind: Kind::Func,
            size: word,
            align: word,
            flags: flags & TypeFlags::COMPLETE,
            hash: TypeHash::UNKNOWN,
            str,
        };
        let t = self.types.insert(Type::new(
            header,
            TypeDetail::Func(FuncDetail {
                params,
                results,
                variadic,
            }),
        ));
        self.finish_type(t);
        self.funcs.insert(sig, t);
        t
    }

    /// The canonical struct type with the given fields (order significant).
    pub fn new_struct(&mut self, fields: Vec<Field>) -> TypeKey {
        let sig: StructSig = fields
            .iter()
            .map(|f| (f.name.clone(), f.typ, f.embedded))
            .collect();
        if let Some(&t) = self.structs.get(&sig) {
            return t;
        }
        let mut size = 0u32;
        let mut align = 1u32;
        let mut flags = TypeFlags::COMPLETE | TypeFlags::COMPARABLE;
        let mut str = String::from("struct {");
        for (i, f) in fields.iter().enumerate() {
            let fh = self.types[f.typ].header();
            size = align_up(size, fh.align.max(1)) + fh.size;
            align = align.max(fh.align);
            flags = flags & fh.flags;
            if i > 0 {
                str.push(';');
            }
            str.push(' ');
            str.push_str(&f.name);
            str.push(' ');
            str.push_str(&fh.str);
        }
        str.push_str(" }");
        let header = TypeHeader {
            kind: Kind::Struct,
            size: align_up(size, align),
            align,
            flags,
            hash: TypeHash::UNKNOWN,
            str: if fields.is_empty() { "struct {}".into() } else { str },
        };
        let t = self
            .types
            .insert(Type::new(header, TypeDetail::Struct(StructDetail { fields })));
        self.finish_type(t);
        self.structs.insert(sig, t);
        t
    }

    /// The canonical interface type with the given method set. Methods are
    /// sorted by name, so declaration order does not affect identity.
    pub fn new_interface(&mut self, mut methods: Vec<Method>) -> TypeKey {
        methods.sort_by(|a, b| a.name.cmp(&b.name));
        let sig: IfaceSig = methods.iter().map(|m| (m.name.clone(), m.typ)).collect();
        if let Some(&t) = self.ifaces.get(&sig) {
            return t;
        }
        let word = self.target.word_size();
        let mut flags = TypeFlags::COMPLETE | TypeFlags::COMPARABLE;
        let mut str = String::from("interface {");
        for (i, m) in methods.iter().enumerate() {
            let mh = self.types[m.typ].header();
            flags = flags & (mh.flags | TypeFlags::COMPARABLE);
            if i > 0 {
                str.push(';');
            }
            str.push(' ');
            str.push_str(&m.name);
            // Method form drops the leading `func`.
            str.push_str(mh.str.strip_prefix("func").unwrap_or(&mh.str));
        }
        str.push_str(" }");
        let header = TypeHeader {
            kind: Kind::Interface,
            size: 2 * word,
            align: word,
            flags,
            hash: TypeHash::UNKNOWN,
            str: if methods.is_empty() { "interface {}".into() } else { str },
        };
        let t = self.types.insert(Type::new(
            header,
            TypeDetail::Interface(InterfaceDetail { methods }),
        ));
        self.finish_type(t);
        self.ifaces.insert(sig, t);
        t
    }

    /// Creates a named type. Never interned: every call makes a new,
    /// nominally distinct type. The underlying type may be supplied later
    /// (recursive definitions) via [`SemObjects::set_named_underlying`].
    pub fn new_named(
        &mut self,
        name: impl Into<String>,
        pkg: Option<String>,
        underlying: Option<TypeKey>,
    ) -> TypeKey {
        let name = name.into();
        let (kind, size, align, flags) = match underlying {
            Some(u) => {
                let uh = self.types[u].header();
                (uh.kind, uh.size, uh.align, uh.flags & TypeFlags::COMPARABLE)
            }
            // Optimistically comparable until the underlying type says
            // otherwise.
            None => (Kind::Invalid, 0, 1, TypeFlags::COMPARABLE),
        };
        let header = TypeHeader {
            kind,
            size,
            align,
            flags,
            hash: TypeHash::UNKNOWN,
            str: name.clone(),
        };
        let t = self.types.insert(Type::new(
            header,
            TypeDetail::Named(NamedDetail {
                name,
                pkg,
                underlying,
            }),
        ));
        self.finish_type(t);
        t
    }

    /// Fills in a named type's underlying type. Panics if it was already
    /// set; a declaration defines its type exactly once.
    pub fn set_named_underlying(&mut self, named: TypeKey, underlying: TypeKey) {
        let uh = self.types[underlying].header().clone();
        let t = &mut self.types[named];
        match &mut t.detail {
            TypeDetail::Named(n) => {
                assert!(
                    n.underlying.is_none(),
                    "underlying of named type `{}` is already set",
                    n.name
                );
                n.underlying = Some(underlying);
            }
            _ => panic!("set_named_underlying on non-named type"),
        }
        t.header.kind = uh.kind;
        t.header.size = uh.size;
        t.header.align = uh.align;
        t.header.flags = uh.flags & TypeFlags::COMPARABLE;
        self.finish_type(named);
    }

    // ------------------------------------------------------------------------
    // Derived queries

    /// The underlying type: identity for all but named types, which chase
    /// their definition chain. Stops at an incomplete named type (returns
    /// it) and is cycle-guarded.
    pub fn underlying(&self, tkey: TypeKey) -> TypeKey {
        let mut current = tkey;
        let mut seen: Vec<TypeKey> = Vec::new();
        loop {
            match &self.types[current].detail {
                TypeDetail::Named(n) => match n.underlying {
                    Some(u) if !seen.contains(&u) => {
                        seen.push(current);
                        current = u;
                    }
                    _ => return current,
                },
                _ => return current,
            }
        }
    }

    /// The short canonical string form of a type.
    pub fn type_str(&self, tkey: TypeKey) -> String {
        self.types[tkey].str().to_string()
    }

    /// Writes a type's textual form. `Short` is the package-local form;
    /// `Full` qualifies named types with their package path and rebuilds
    /// compound forms from fully-qualified children.
    pub fn write_type(&self, tkey: TypeKey, out: &mut String, verbosity: Verbosity) {
        let t = &self.types[tkey];
        if verbosity == Verbosity::Short {
            out.push_str(t.str());
            return;
        }
        match &t.detail {
            TypeDetail::Basic(b) => out.push_str(b.name),
            TypeDetail::Named(n) => {
                if let Some(pkg) = &n.pkg {
                    out.push_str(pkg);
                    out.push('.');
                }
                out.push_str(&n.name);
            }
            TypeDetail::Slice(s) => {
                out.push_str("[]");
                self.write_type(s.elem, out, verbosity);
            }
            TypeDetail::Array(a) => {
                out.push('[');
                out.push_str(&a.len.to_string());
                out.push(']');
                self.write_type(a.elem, out, verbosity);
            }
            TypeDetail::Map(m) => {
                out.push_str("map[");
                self.write_type(m.key, out, verbosity);
                out.push(']');
                self.write_type(m.elem, out, verbosity);
            }
            TypeDetail::Pointer(p) => {
                out.push('*');
                self.write_type(p.base, out, verbosity);
            }
            TypeDetail::Chan(c) => {
                out.push_str(c.dir.tag());
                out.push(' ');
                self.write_type(c.elem, out, verbosity);
            }
            TypeDetail::Func(f) => {
                let (params, results, variadic) = (f.params.clone(), f.results.clone(), f.variadic);
                out.push_str("func(");
                for (i, p) in params.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    if variadic && i == params.len() - 1 {
                        out.push_str("...");
                    }
                    self.write_type(*p, out, verbosity);
                }
                out.push(')');
                match results.len() {
                    0 => {}
                    1 => {
                        out.push(' ');
                        self.write_type(results[0], out, verbosity);
                    }
                    _ => {
                        out.push_str(" (");
                        for (i, r) in results.iter().enumerate() {
                            if i > 0 {
                                out.push_str(", ");
                            }
                            self.write_type(*r, out, verbosity);
                        }
                        out.push(')');
                    }
                }
            }
            TypeDetail::Struct(_) | TypeDetail::Interface(_) => {
                // The short form of structs and interfaces is already
                // structural.
                out.push_str(t.str());
            }
        }
    }

    // ------------------------------------------------------------------------
    // Two-phase completion

    /// Completes a type: if its structural hash is still unknown and all
    /// children are now complete, computes and caches the hash (and the
    /// `COMPLETE` flag). Idempotent; no-op while children are incomplete.
    /// Walks children first, so completing the root of a recursive type
    /// graph completes the whole component.
    pub fn complete_type(&mut self, tkey: TypeKey) {
        let mut seen = HashSet::new();
        self.complete_rec(tkey, &mut seen);
    }

    fn complete_rec(&mut self, tkey: TypeKey, seen: &mut HashSet<TypeKey>) {
        if !seen.insert(tkey) {
            return;
        }
        // Children first: a named type's own hash is nominal and may be
        // known before the compounds built over it are, so the walk cannot
        // stop at the first known hash.
        for child in self.child_keys(tkey) {
            self.complete_rec(child, seen);
        }
        self.finish_type(tkey);
    }

    /// Computes and stores the hash if it is currently computable.
    fn finish_type(&mut self, tkey: TypeKey) {
        if self.types[tkey].header().hash.is_known() {
            return;
        }
        let hash = self.compute_hash(tkey);
        if hash.is_known() {
            let t = &mut self.types[tkey];
            t.header.hash = hash;
            t.header.flags = t.header.flags | TypeFlags::COMPLETE;
        }
    }

    fn compute_hash(&self, tkey: TypeKey) -> TypeHash {
        let t = &self.types[tkey];
        match &t.detail {
            TypeDetail::Basic(_) => t.header.hash,
            TypeDetail::Slice(s) => combine_hashes("slice", &[self.hash_of(s.elem)]),
            TypeDetail::Pointer(p) => combine_hashes("ptr", &[self.hash_of(p.base)]),
            TypeDetail::Map(m) => {
                combine_hashes("map", &[self.hash_of(m.key), self.hash_of(m.elem)])
            }
            TypeDetail::Array(a) => {
                let elem = self.hash_of(a.elem);
                if !elem.is_known() {
                    return TypeHash::UNKNOWN;
                }
                let mut h = HashBuilder::new("array");
                h.write_u64(a.len);
                h.write_hash(elem);
                h.finish()
            }
            TypeDetail::Chan(c) => combine_hashes(c.dir.tag(), &[self.hash_of(c.elem)]),
            TypeDetail::Func(f) => {
                let children: Vec<TypeHash> = f
                    .params
                    .iter()
                    .chain(f.results.iter())
                    .map(|&c| self.hash_of(c))
                    .collect();
                if children.iter().any(|h| !h.is_known()) {
                    return TypeHash::UNKNOWN;
                }
                let mut h = HashBuilder::new("func");
                h.write_u64(f.variadic as u64);
                h.write_u64(f.params.len() as u64);
                for child in children {
                    h.write_hash(child);
                }
                h.finish()
            }
            TypeDetail::Struct(s) => {
                let mut h = HashBuilder::new("struct");
                for f in &s.fields {
                    let fh = self.hash_of(f.typ);
                    if !fh.is_known() {
                        return TypeHash::UNKNOWN;
                    }
                    h.write_str(&f.name);
                    h.write_u64(f.embedded as u64);
                    h.write_hash(fh);
                }
                h.finish()
            }
            TypeDetail::Interface(i) => {
                let mut h = HashBuilder::new("interface");
                for m in &i.methods {
                    let mh = self.hash_of(m.typ);
                    if !mh.is_known() {
                        return TypeHash::UNKNOWN;
                    }
                    h.write_str(&m.name);
                    h.write_hash(mh);
                }
                h.finish()
            }
            // Nominal identity: the hash covers the name and package, not
            // the underlying structure, so recursive definitions terminate.
            TypeDetail::Named(n) => {
                if n.underlying.is_none() {
                    return TypeHash::UNKNOWN;
                }
                let mut h = HashBuilder::new("named");
                h.write_str(&n.name);
                if let Some(pkg) = &n.pkg {
                    h.write_str(pkg);
                }
                h.finish()
            }
        }
    }

    #[inline]
    fn hash_of(&self, tkey: TypeKey) -> TypeHash {
        self.types[tkey].header().hash
    }

    fn child_keys(&self, tkey: TypeKey) -> Vec<TypeKey> {
        match &self.types[tkey].detail {
            TypeDetail::Basic(_) => Vec::new(),
            TypeDetail::Slice(s) => vec![s.elem],
            TypeDetail::Pointer(p) => vec![p.base],
            TypeDetail::Array(a) => vec![a.elem],
            TypeDetail::Map(m) => vec![m.key, m.elem],
            TypeDetail::Chan(c) => vec![c.elem],
            TypeDetail::Func(f) => f.params.iter().chain(f.results.iter()).copied().collect(),
            TypeDetail::Struct(s) => s.fields.iter().map(|f| f.typ).collect(),
            TypeDetail::Interface(i) => i.methods.iter().map(|m| m.typ).collect(),
            TypeDetail::Named(n) => n.underlying.into_iter().collect(),
        }
    }

    fn func_str(&self, params: &[TypeKey], results: &[TypeKey], variadic: bool) -> String {
        let mut s = String::from("func(");
        for (i, p) in params.iter().enumerate() {
            if i > 0 {
                s.push_str(", ");
            }
            if variadic && i == params.len() - 1 {
                s.push_str("...");
            }
            s.push_str(self.types[*p].str());
        }
        s.push(')');
        match results.len() {
            0 => {}
            1 => {
                s.push(' ');
                s.push_str(self.types[results[0]].str());
            }
            _ => {
                s.push_str(" (");
                for (i, r) in results.iter().enumerate() {
                    if i > 0 {
                        s.push_str(", ");
                    }
                    s.push_str(self.types[*r].str());
                }
                s.push(')');
            }
        }
        s
    }

    // ------------------------------------------------------------------------
    // Object mutation

    /// Sets an object's resolved type, enforcing the class/type legality
    /// invariant. Panics on double-set or an illegal combination; both are
    /// internal bugs, not user errors.
    pub fn set_obj_type(&mut self, okey: ObjKey, tkey: TypeKey) {
        obj::check_valid_type(&self.objs[okey], tkey, &self.types);
        self.objs[okey].set_type_raw(tkey);
    }
}

fn align_up(n: u32, align: u32) -> u32 {
    debug_assert!(align > 0);
    (n + align - 1) / align * align
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::target::{Arch, Os};

    fn new_sem() -> SemObjects {
        SemObjects::new(Target::default())
    }

    fn int_key(sem: &mut SemObjects) -> TypeKey {
        sem.universe().basic(Kind::Int)
    }

    #[test]
    fn test_slice_interning_idempotent() {
        let mut sem = new_sem();
        let elem = int_key(&mut sem);
        let a = sem.new_slice(elem);
        let b = sem.new_slice(elem);
        assert_eq!(a, b);

        let hash = sem.types[a].header().hash;
        assert!(hash.is_known());
        let c = sem.new_slice(elem);
        assert_eq!(sem.types[c].header().hash, hash);
    }

    #[test]
    fn test_distinct_shapes_distinct_keys() {
        let mut sem = new_sem();
        let int = int_key(&mut sem);
        let string = sem.universe().basic(Kind::String);

        let si = sem.new_slice(int);
        let ss = sem.new_slice(string);
        assert_ne!(si, ss);

        let pi = sem.new_ptr(int);
        assert_ne!(si, pi);
        assert_ne!(sem.types[si].header().hash, sem.types[pi].header().hash);
    }

    #[test]
    fn test_map_interning_and_sizes() {
        let mut sem = new_sem();
        let int = int_key(&mut sem);
        let string = sem.universe().basic(Kind::String);

        let a = sem.new_map(string, int).unwrap();
        let b = sem.new_map(string, int).unwrap();
        assert_eq!(a, b);
        assert_eq!(sem.type_str(a), "map[string]int");
        // A map value is one pointer word; a slice is three.
        assert_eq!(sem.types[a].header().size, 8);
        let s = sem.new_slice(int);
        assert_eq!(sem.types[s].header().size, 24);
    }

    #[test]
    fn test_map_rejects_uncomparable_key() {
        let mut sem = new_sem();
        let int = int_key(&mut sem);
        let slice = sem.new_slice(int);

        let err = sem.new_map(slice, int).unwrap_err();
        assert_eq!(err.key, slice);

        // A struct containing a slice is equally invalid.
        let bad_struct = sem.new_struct(vec![Field {
            name: "xs".into(),
            typ: slice,
            embedded: false,
        }]);
        assert!(sem.new_map(bad_struct, int).is_err());

        // But a comparable struct works.
        let ok_struct = sem.new_struct(vec![Field {
            name: "n".into(),
            typ: int,
            embedded: false,
        }]);
        assert!(sem.new_map(ok_struct, int).is_ok());
    }

    #[test]
    fn test_struct_layout() {
        let mut sem = new_sem();
        let u = sem.universe();
        let int8 = u.basic(Kind::Int8);
        let int64 = u.basic(Kind::Int64);
        let s = sem.new_struct(vec![
            Field { name: "a".into(), typ: int8, embedded: false },
            Field { name: "b".into(), typ: int64, embedded: false },
        ]);
        // a at 0, b aligned to 8, total 16.
        assert_eq!(sem.types[s].header().size, 16);
        assert_eq!(sem.types[s].header().align, 8);
    }

    #[test]
    fn test_func_interning_respects_variadic() {
        let mut sem = new_sem();
        let int = int_key(&mut sem);
        let f1 = sem.new_func(vec![int], vec![int], false);
        let f2 = sem.new_func(vec![int], vec![int], false);
        let f3 = sem.new_func(vec![int], vec![int], true);
        assert_eq!(f1, f2);
        assert_ne!(f1, f3);
        assert_eq!(sem.type_str(f1), "func(int) int");
        assert_eq!(sem.type_str(f3), "func(...int) int");
    }

    #[test]
    fn test_interface_method_order_irrelevant() {
        let mut sem = new_sem();
        let int = int_key(&mut sem);
        let f = sem.new_func(vec![], vec![int], false);
        let a = sem.new_interface(vec![
            Method { name: "A".into(), typ: f },
            Method { name: "B".into(), typ: f },
        ]);
        let b = sem.new_interface(vec![
            Method { name: "B".into(), typ: f },
            Method { name: "A".into(), typ: f },
        ]);
        assert_eq!(a, b);
    }

    #[test]
    fn test_named_types_are_nominal() {
        let mut sem = new_sem();
        let int = int_key(&mut sem);
        let a = sem.new_named("Celsius", None, Some(int));
        let b = sem.new_named("Fahrenheit", None, Some(int));
        assert_ne!(a, b);
        assert_eq!(sem.underlying(a), int);
        assert_eq!(sem.underlying(b), int);
        // Same underlying, still nominally distinct.
        let c = sem.new_named("Celsius", None, Some(int));
        assert_ne!(a, c);
    }

    #[test]
    fn test_recursive_named_through_pointer() {
        let mut sem = new_sem();
        let int = int_key(&mut sem);
        // type List struct { value int; next *List }
        let list = sem.new_named("List", None, None);
        assert!(!sem.types[list].header().hash.is_known());

        let next = sem.new_ptr(list);
        assert!(!sem.types[next].header().hash.is_known());

        let body = sem.new_struct(vec![
            Field { name: "value".into(), typ: int, embedded: false },
            Field { name: "next".into(), typ: next, embedded: false },
        ]);
        sem.set_named_underlying(list, body);
        sem.complete_type(list);

        assert!(sem.types[list].header().hash.is_known());
        assert!(sem.types[next].header().hash.is_known());
        assert!(sem.types[body].header().hash.is_known());
        assert!(sem.types[list].is_complete());
        assert_eq!(sem.underlying(list), body);
        assert_eq!(sem.types[list].kind(), Kind::Struct);
    }

    #[test]
    fn test_complete_type_idempotent() {
        let mut sem = new_sem();
        let int = int_key(&mut sem);
        let s = sem.new_slice(int);
        let before = sem.types[s].header().hash;
        sem.complete_type(s);
        sem.complete_type(s);
        assert_eq!(sem.types[s].header().hash, before);
    }

    #[test]
    fn test_underlying_chases_named_chain() {
        let mut sem = new_sem();
        let int = int_key(&mut sem);
        let a = sem.new_named("A", None, Some(int));
        let b = sem.new_named("B", None, Some(a));
        assert_eq!(sem.underlying(b), int);
    }

    #[test]
    fn test_write_type_full_qualifies() {
        let mut sem = new_sem();
        let int = int_key(&mut sem);
        let named = sem.new_named("Temp", Some("units".into()), Some(int));
        let slice = sem.new_slice(named);

        let mut short = String::new();
        sem.write_type(slice, &mut short, Verbosity::Short);
        assert_eq!(short, "[]Temp");

        let mut full = String::new();
        sem.write_type(slice, &mut full, Verbosity::Full);
        assert_eq!(full, "[]units.Temp");
    }

    #[test]
    fn test_word_size_follows_session_target() {
        let mut sem32 = SemObjects::new(Target::new(Os::Linux, Arch::I386));
        let int = sem32.universe().basic(Kind::Int);
        let s = sem32.new_slice(int);
        assert_eq!(sem32.types[s].header().size, 12);
        let m = sem32.new_map(int, int).unwrap();
        assert_eq!(sem32.types[m].header().size, 4);
    }
}
