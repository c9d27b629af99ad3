//! The universe scope: predeclared identifiers, built per target.
//!
//! Word size and one alignment quirk vary with the compile target, so the
//! predeclared basic types (and everything built from them) do too. The
//! container memoizes one universe per distinct target actually requested;
//! two targets get two distinct scope instances with distinct basic type
//! records.

use std::collections::HashMap;

use crate::kind::Kind;
use crate::obj::{BuiltinInfo, ObjClass, Object};
use crate::objects::{ScopeKey, SemObjects, TypeKey};
use crate::scope::Scope;
use crate::target::Target;
use crate::typ::Method;

/// Every basic kind gets a canonical per-universe type record, including
/// the untyped kinds (used as the types of untyped constant expressions)
/// and `Invalid` (the designated result for out-of-range queries).
const BASIC_KINDS: &[Kind] = &[
    Kind::Invalid,
    Kind::Bool,
    Kind::Int,
    Kind::Int8,
    Kind::Int16,
    Kind::Int32,
    Kind::Int64,
    Kind::Uint,
    Kind::Uint8,
    Kind::Uint16,
    Kind::Uint32,
    Kind::Uint64,
    Kind::Uintptr,
    Kind::Float32,
    Kind::Float64,
    Kind::Complex64,
    Kind::Complex128,
    Kind::String,
    Kind::UntypedBool,
    Kind::UntypedInt,
    Kind::UntypedRune,
    Kind::UntypedFloat,
    Kind::UntypedComplex,
    Kind::UntypedString,
    Kind::UntypedNil,
];

/// The typed basics that appear in the universe scope under their own name.
const NAMED_BASIC_KINDS: &[Kind] = &[
    Kind::Bool,
    Kind::Int,
    Kind::Int8,
    Kind::Int16,
    Kind::Int32,
    Kind::Int64,
    Kind::Uint,
    Kind::Uint8,
    Kind::Uint16,
    Kind::Uint32,
    Kind::Uint64,
    Kind::Uintptr,
    Kind::Float32,
    Kind::Float64,
    Kind::Complex64,
    Kind::Complex128,
    Kind::String,
];

/// Shapes of the predeclared builtin functions.
const BUILTINS: &[BuiltinInfo] = &[
    BuiltinInfo { name: "append", args_in: 2, args_out: 1, variadic: true },
    BuiltinInfo { name: "cap", args_in: 1, args_out: 1, variadic: false },
    BuiltinInfo { name: "close", args_in: 1, args_out: 0, variadic: false },
    BuiltinInfo { name: "complex", args_in: 2, args_out: 1, variadic: false },
    BuiltinInfo { name: "copy", args_in: 2, args_out: 1, variadic: false },
    BuiltinInfo { name: "delete", args_in: 2, args_out: 0, variadic: false },
    BuiltinInfo { name: "imag", args_in: 1, args_out: 1, variadic: false },
    BuiltinInfo { name: "len", args_in: 1, args_out: 1, variadic: false },
    BuiltinInfo { name: "make", args_in: 2, args_out: 1, variadic: true },
    BuiltinInfo { name: "new", args_in: 1, args_out: 1, variadic: false },
    BuiltinInfo { name: "panic", args_in: 1, args_out: 0, variadic: false },
    BuiltinInfo { name: "print", args_in: 1, args_out: 0, variadic: true },
    BuiltinInfo { name: "println", args_in: 1, args_out: 0, variadic: true },
    BuiltinInfo { name: "real", args_in: 1, args_out: 1, variadic: false },
    BuiltinInfo { name: "recover", args_in: 0, args_out: 1, variadic: false },
];

/// One target's predeclared scope and basic-type table.
#[derive(Clone, Debug)]
pub struct Universe {
    target: Target,
    scope: ScopeKey,
    basics: HashMap<Kind, TypeKey>,
    error_type: TypeKey,
}

impl Universe {
    /// Builds the universe for a target. Called once per target by
    /// `SemObjects::universe_for`.
    pub(crate) fn build(sem: &mut SemObjects, target: Target) -> Universe {
        let scope = sem.scopes.insert(Scope::new(None, "universe"));

        let mut basics = HashMap::new();
        for &kind in BASIC_KINDS {
            basics.insert(kind, sem.new_basic(kind, target));
        }

        for &kind in NAMED_BASIC_KINDS {
            let okey = sem
                .objs
                .insert(Object::with_type(ObjClass::Type, kind.name(), basics[&kind]));
            Scope::insert(scope, okey, sem);
        }

        // Aliases for two of the basics.
        for (alias, kind) in [("byte", Kind::Uint8), ("rune", Kind::Int32)] {
            let okey = sem
                .objs
                .insert(Object::with_type(ObjClass::Type, alias, basics[&kind]));
            Scope::insert(scope, okey, sem);
        }

        // The predeclared `error` interface: interface { Error() string }.
        let err_sig = sem.new_func(Vec::new(), vec![basics[&Kind::String]], false);
        let err_iface = sem.new_interface(vec![Method {
            name: "Error".into(),
            typ: err_sig,
        }]);
        let error_type = sem.new_named("error", None, Some(err_iface));
        let okey = sem
            .objs
            .insert(Object::with_type(ObjClass::Type, "error", error_type));
        Scope::insert(scope, okey, sem);

        // Predeclared constants. `iota`'s value is transient: it is bound
        // by the resolver for the duration of one constant initializer.
        let mut true_obj = Object::with_type(ObjClass::Const, "true", basics[&Kind::UntypedBool]);
        true_obj.set_const_value(crate::constant::make_bool(true));
        let mut false_obj = Object::with_type(ObjClass::Const, "false", basics[&Kind::UntypedBool]);
        false_obj.set_const_value(crate::constant::make_bool(false));
        let iota_obj = Object::with_type(ObjClass::Const, "iota", basics[&Kind::UntypedInt]);
        let nil_obj = Object::with_type(ObjClass::Const, "nil", basics[&Kind::UntypedNil]);
        for o in [true_obj, false_obj, iota_obj, nil_obj] {
            let okey = sem.objs.insert(o);
            Scope::insert(scope, okey, sem);
        }

        for &info in BUILTINS {
            let mut o = Object::new(ObjClass::Builtin, info.name);
            o.set_builtin(info);
            let okey = sem.objs.insert(o);
            Scope::insert(scope, okey, sem);
        }

        Universe {
            target,
            scope,
            basics,
            error_type,
        }
    }

    #[inline]
    pub fn target(&self) -> Target {
        self.target
    }

    #[inline]
    pub fn scope(&self) -> ScopeKey {
        self.scope
    }

    /// The canonical type record for a basic kind. Unknown kinds map to
    /// the `Invalid` record.
    pub fn basic(&self, kind: Kind) -> TypeKey {
        self.basics
            .get(&kind)
            .copied()
            .unwrap_or_else(|| self.basics[&Kind::Invalid])
    }

    /// The predeclared `error` interface type.
    #[inline]
    pub fn error_type(&self) -> TypeKey {
        self.error_type
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scope;
    use crate::target::{Arch, Os};

    #[test]
    fn test_predeclared_names_present() {
        let mut sem = SemObjects::new(Target::default());
        let u = sem.universe().clone();
        for name in ["bool", "int", "string", "byte", "rune", "error", "true", "iota", "nil", "len", "append"] {
            assert!(
                sem.scopes[u.scope()].lookup(name).is_some(),
                "universe is missing `{}`",
                name
            );
        }
    }

    #[test]
    fn test_universe_is_memoized() {
        let mut sem = SemObjects::new(Target::default());
        let a = sem.universe().scope();
        let b = sem.universe().scope();
        assert_eq!(a, b);
        assert_eq!(sem.universe_for(Target::default()).scope(), a);
    }

    #[test]
    fn test_targets_get_distinct_universes() {
        let t64 = Target::new(Os::Linux, Arch::Amd64);
        let t32 = Target::new(Os::Linux, Arch::I386);
        let mut sem = SemObjects::new(t64);

        let u64 = sem.universe_for(t64).clone();
        let u32 = sem.universe_for(t32).clone();

        assert_ne!(u64.scope(), u32.scope());
        let int64 = u64.basic(Kind::Int);
        let int32 = u32.basic(Kind::Int);
        assert_ne!(int64, int32);
        assert_eq!(sem.types[int64].header().size, 8);
        assert_eq!(sem.types[int32].header().size, 4);
        assert!(sem.types[int64].header().size > sem.types[int32].header().size);
    }

    #[test]
    fn test_byte_is_uint8() {
        let mut sem = SemObjects::new(Target::default());
        let u = sem.universe().clone();
        let byte = sem.scopes[u.scope()].lookup("byte").unwrap();
        assert_eq!(sem.objs[byte].typ(), Some(u.basic(Kind::Uint8)));
    }

    #[test]
    fn test_error_is_named_interface() {
        let mut sem = SemObjects::new(Target::default());
        let u = sem.universe().clone();
        let err = u.error_type();
        assert!(sem.types[err].is_named());
        let under = sem.underlying(err);
        assert_eq!(sem.types[under].kind(), Kind::Interface);
        assert_eq!(sem.type_str(under), "interface { Error() string }");
    }

    #[test]
    fn test_true_const_has_value() {
        let mut sem = SemObjects::new(Target::default());
        let u = sem.universe().clone();
        let (_, t) = scope::lookup_parent(u.scope(), "true", &sem).unwrap();
        assert_eq!(
            sem.objs[t].const_value(),
            Some(&crate::constant::make_bool(true))
        );
    }

    #[test]
    fn test_unknown_kind_maps_to_invalid() {
        let mut sem = SemObjects::new(Target::default());
        let u = sem.universe().clone();
        let inv = u.basic(Kind::Slice);
        assert_eq!(sem.types[inv].kind(), Kind::Invalid);
    }
}
