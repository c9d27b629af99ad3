//! Declared objects.
//!
//! An [`Object`] represents one declared name: its class, optional resolved
//! type, and a class-specific payload. Objects are created empty by the
//! declaration collector and filled in exactly once by the resolver; the
//! type is immutable after it is set, and setting it twice is a programming
//! error, not a user error.

use std::fmt;

use mica_syntax::NodeId;

use crate::constant::Value;
use crate::kind::Kind;
use crate::objects::{DeclKey, TypeKey, Types};
use crate::typ::TypeDetail;

/// Classes of declared objects.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum ObjClass {
    Builtin,
    Const,
    Func,
    Import,
    Type,
    Var,
    GenericFunc,
    GenericType,
}

impl fmt::Display for ObjClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ObjClass::Builtin => "builtin",
            ObjClass::Const => "const",
            ObjClass::Func => "func",
            ObjClass::Import => "import",
            ObjClass::Type => "type",
            ObjClass::Var => "var",
            ObjClass::GenericFunc => "generic func",
            ObjClass::GenericType => "generic type",
        };
        f.write_str(s)
    }
}

/// A reference to an imported package: its bound name and import path.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct PackageRef {
    pub name: String,
    pub path: String,
}

/// Shape of a predeclared builtin function.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct BuiltinInfo {
    pub name: &'static str,
    pub args_in: u8,
    pub args_out: u8,
    pub variadic: bool,
}

/// Class-specific payload of an object. Each class legalizes exactly one
/// payload shape, so misuse is unrepresentable rather than a runtime
/// type-assertion failure.
#[derive(Clone, Debug, Default)]
pub enum ObjPayload {
    #[default]
    None,
    /// A constant's folded value.
    Const(Value),
    /// An import's package reference.
    Import(PackageRef),
    /// A builtin function's shape.
    Builtin(BuiltinInfo),
    /// The syntax node backing a function body.
    Body(NodeId),
}

/// One declared name.
#[derive(Debug)]
pub struct Object {
    class: ObjClass,
    name: String,
    typ: Option<TypeKey>,
    payload: ObjPayload,
    decl: Option<DeclKey>,
}

impl Object {
    pub fn new(class: ObjClass, name: impl Into<String>) -> Object {
        let name = name.into();
        assert!(!name.is_empty(), "object has empty name");
        Object {
            class,
            name,
            typ: None,
            payload: ObjPayload::None,
            decl: None,
        }
    }

    pub fn with_type(class: ObjClass, name: impl Into<String>, typ: TypeKey) -> Object {
        let mut obj = Object::new(class, name);
        obj.typ = Some(typ);
        obj
    }

    #[inline]
    pub fn class(&self) -> ObjClass {
        self.class
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn typ(&self) -> Option<TypeKey> {
        self.typ
    }

    #[inline]
    pub fn payload(&self) -> &ObjPayload {
        &self.payload
    }

    #[inline]
    pub fn decl(&self) -> Option<DeclKey> {
        self.decl
    }

    pub fn set_decl(&mut self, decl: DeclKey) {
        self.decl = Some(decl);
    }

    /// The constant value, for `Const` objects that have one.
    pub fn const_value(&self) -> Option<&Value> {
        match &self.payload {
            ObjPayload::Const(v) => Some(v),
            _ => None,
        }
    }

    /// Attaches a constant value: the value of a `Const`, or the constant
    /// initial value of a `Var`.
    pub fn set_const_value(&mut self, value: Value) {
        debug_assert!(matches!(self.class, ObjClass::Const | ObjClass::Var));
        self.payload = ObjPayload::Const(value);
    }

    pub fn set_import(&mut self, pkg: PackageRef) {
        debug_assert!(matches!(self.class, ObjClass::Import));
        self.payload = ObjPayload::Import(pkg);
    }

    pub fn set_builtin(&mut self, info: BuiltinInfo) {
        debug_assert!(matches!(self.class, ObjClass::Builtin));
        self.payload = ObjPayload::Builtin(info);
    }

    pub fn set_body(&mut self, body: NodeId) {
        debug_assert!(matches!(self.class, ObjClass::Func | ObjClass::Var));
        self.payload = ObjPayload::Body(body);
    }

    /// Sets the type. Panics if it was already set; resolution fills each
    /// object in at most once.
    pub(crate) fn set_type_raw(&mut self, typ: TypeKey) {
        assert!(
            self.typ.is_none(),
            "type of {} `{}` is already set",
            self.class,
            self.name
        );
        self.typ = Some(typ);
    }
}

impl fmt::Display for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.class, self.name)
    }
}

/// Checks the class/type legality invariant. Panics on violation: callers
/// only reach this through resolver paths whose inputs were validated, so a
/// failure is an internal bug.
pub(crate) fn check_valid_type(obj: &Object, typ: TypeKey, types: &Types) {
    let t = &types[typ];
    match obj.class() {
        ObjClass::Builtin => panic!("builtin `{}` cannot be given a type", obj.name()),
        ObjClass::Const => {
            assert!(
                t.kind().is_basic(),
                "type of const `{}` must be basic, got {}",
                obj.name(),
                t.kind()
            );
        }
        ObjClass::Func | ObjClass::GenericFunc => {
            assert!(
                matches!(t.detail(), TypeDetail::Func(_)),
                "type of func `{}` must be an unnamed function type",
                obj.name()
            );
        }
        ObjClass::Import => panic!("import `{}` cannot be given a type", obj.name()),
        ObjClass::Type | ObjClass::GenericType => {}
        ObjClass::Var => {
            assert!(
                t.kind() != Kind::Invalid && !t.kind().is_untyped(),
                "type of var `{}` cannot be {}",
                obj.name(),
                t.kind()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_object_is_empty() {
        let obj = Object::new(ObjClass::Var, "x");
        assert_eq!(obj.class(), ObjClass::Var);
        assert_eq!(obj.name(), "x");
        assert!(obj.typ().is_none());
        assert!(obj.decl().is_none());
        assert!(matches!(obj.payload(), ObjPayload::None));
    }

    #[test]
    #[should_panic(expected = "empty name")]
    fn test_empty_name_panics() {
        let _ = Object::new(ObjClass::Var, "");
    }

    #[test]
    fn test_const_payload() {
        let mut obj = Object::new(ObjClass::Const, "c");
        obj.set_const_value(Value::Int64(7));
        assert_eq!(obj.const_value(), Some(&Value::Int64(7)));
    }

    #[test]
    fn test_display() {
        let obj = Object::new(ObjClass::Func, "main");
        assert_eq!(obj.to_string(), "func main");
    }
}
