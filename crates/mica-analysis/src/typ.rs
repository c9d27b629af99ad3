//! Type representation.
//!
//! Every type is a record in the type arena: a common header (kind, size,
//! alignment, flags, structural hash, canonical string) plus a
//! variant-specific detail. Compound types are interned by the container in
//! `objects.rs`, so two structurally equal non-named types always share one
//! `TypeKey` and equality degenerates to key comparison. Named types have
//! nominal identity and are never interned.
//!
//! Structural hashes are computed in two phases: constructors fill the hash
//! in directly when all children already have known hashes, and leave the
//! `UNKNOWN` sentinel otherwise (recursive named types reference themselves
//! before their definition is finished). `SemObjects::complete_type`
//! finishes the deferred cases once the children are complete.

use std::fmt;

use crate::kind::Kind;
use crate::objects::TypeKey;

/// A structural hash. `UNKNOWN` is the sentinel for types whose children
/// are not yet complete.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct TypeHash(pub u64);

impl TypeHash {
    pub const UNKNOWN: TypeHash = TypeHash(0);

    #[inline]
    pub const fn is_known(self) -> bool {
        self.0 != 0
    }
}

/// FNV-1a accumulator for structural hashes.
pub(crate) struct HashBuilder(u64);

impl HashBuilder {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;

    pub fn new(tag: &str) -> Self {
        let mut h = Self(Self::OFFSET);
        h.write_str(tag);
        h
    }

    pub fn write_u64(&mut self, v: u64) {
        for b in v.to_le_bytes() {
            self.0 = (self.0 ^ b as u64).wrapping_mul(Self::PRIME);
        }
    }

    pub fn write_str(&mut self, s: &str) {
        for b in s.bytes() {
            self.0 = (self.0 ^ b as u64).wrapping_mul(Self::PRIME);
        }
        // Terminator so "ab","c" and "a","bc" differ.
        self.0 = (self.0 ^ 0xff).wrapping_mul(Self::PRIME);
    }

    pub fn write_hash(&mut self, h: TypeHash) {
        self.write_u64(h.0);
    }

    /// Finishes, mapping the (astronomically unlikely) zero result away
    /// from the sentinel.
    pub fn finish(self) -> TypeHash {
        TypeHash(if self.0 == 0 { 1 } else { self.0 })
    }
}

/// Combines child hashes under a discriminating tag. Returns `UNKNOWN` when
/// any child hash is still unknown.
pub(crate) fn combine_hashes(tag: &str, parts: &[TypeHash]) -> TypeHash {
    if parts.iter().any(|p| !p.is_known()) {
        return TypeHash::UNKNOWN;
    }
    let mut h = HashBuilder::new(tag);
    for p in parts {
        h.write_hash(*p);
    }
    h.finish()
}

/// Per-type flag set.
#[derive(Clone, Copy, PartialEq, Eq, Default, Debug)]
pub struct TypeFlags(u8);

impl TypeFlags {
    /// All children (transitively) constructed; size and hash are final.
    pub const COMPLETE: TypeFlags = TypeFlags(1 << 0);
    /// Values of this type can be compared with `==` (and used as map
    /// keys).
    pub const COMPARABLE: TypeFlags = TypeFlags(1 << 1);

    #[inline]
    pub const fn empty() -> TypeFlags {
        TypeFlags(0)
    }

    #[inline]
    pub const fn contains(self, other: TypeFlags) -> bool {
        self.0 & other.0 == other.0
    }

    #[inline]
    pub const fn union(self, other: TypeFlags) -> TypeFlags {
        TypeFlags(self.0 | other.0)
    }

    #[inline]
    pub const fn intersect(self, other: TypeFlags) -> TypeFlags {
        TypeFlags(self.0 & other.0)
    }

    #[inline]
    pub const fn without(self, other: TypeFlags) -> TypeFlags {
        TypeFlags(self.0 & !other.0)
    }
}

impl std::ops::BitOr for TypeFlags {
    type Output = TypeFlags;
    fn bitor(self, rhs: TypeFlags) -> TypeFlags {
        self.union(rhs)
    }
}

impl std::ops::BitAnd for TypeFlags {
    type Output = TypeFlags;
    fn bitand(self, rhs: TypeFlags) -> TypeFlags {
        self.intersect(rhs)
    }
}

/// The header every type variant carries.
#[derive(Clone, Debug)]
pub struct TypeHeader {
    pub kind: Kind,
    /// Size in bytes (0 when not yet determined).
    pub size: u32,
    /// Alignment in bytes.
    pub align: u32,
    pub flags: TypeFlags,
    pub hash: TypeHash,
    /// Canonical short (package-local) string form.
    pub str: String,
}

impl TypeHeader {
    #[inline]
    pub fn is_complete(&self) -> bool {
        self.flags.contains(TypeFlags::COMPLETE)
    }

    #[inline]
    pub fn is_comparable(&self) -> bool {
        self.flags.contains(TypeFlags::COMPARABLE)
    }
}

/// Channel direction.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum ChanDir {
    Both,
    Send,
    Recv,
}

impl ChanDir {
    pub(crate) const fn tag(self) -> &'static str {
        match self {
            ChanDir::Both => "chan",
            ChanDir::Send => "chan<-",
            ChanDir::Recv => "<-chan",
        }
    }
}

/// One struct field.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct Field {
    pub name: String,
    pub typ: TypeKey,
    pub embedded: bool,
}

/// One interface method.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct Method {
    pub name: String,
    pub typ: TypeKey,
}

#[derive(Clone, Debug)]
pub struct BasicDetail {
    pub name: &'static str,
}

#[derive(Clone, Debug)]
pub struct ArrayDetail {
    pub elem: TypeKey,
    pub len: u64,
}

#[derive(Clone, Debug)]
pub struct SliceDetail {
    pub elem: TypeKey,
}

#[derive(Clone, Debug)]
pub struct MapDetail {
    pub key: TypeKey,
    pub elem: TypeKey,
}

#[derive(Clone, Debug)]
pub struct StructDetail {
    pub fields: Vec<Field>,
}

#[derive(Clone, Debug)]
pub struct FuncDetail {
    pub params: Vec<TypeKey>,
    pub results: Vec<TypeKey>,
    pub variadic: bool,
}

#[derive(Clone, Debug)]
pub struct InterfaceDetail {
    pub methods: Vec<Method>,
}

#[derive(Clone, Debug)]
pub struct ChanDetail {
    pub dir: ChanDir,
    pub elem: TypeKey,
}

#[derive(Clone, Debug)]
pub struct PointerDetail {
    pub base: TypeKey,
}

#[derive(Clone, Debug)]
pub struct NamedDetail {
    pub name: String,
    /// Qualifying package path, if the type is not predeclared or local.
    pub pkg: Option<String>,
    /// Filled in exactly once, possibly after construction (recursive
    /// definitions).
    pub underlying: Option<TypeKey>,
}

/// Variant-specific payload of a type record.
#[derive(Clone, Debug)]
pub enum TypeDetail {
    Basic(BasicDetail),
    Array(ArrayDetail),
    Slice(SliceDetail),
    Map(MapDetail),
    Struct(StructDetail),
    Func(FuncDetail),
    Interface(InterfaceDetail),
    Chan(ChanDetail),
    Pointer(PointerDetail),
    Named(NamedDetail),
}

/// A type record: common header plus variant detail.
#[derive(Clone, Debug)]
pub struct Type {
    pub(crate) header: TypeHeader,
    pub(crate) detail: TypeDetail,
}

impl Type {
    pub(crate) fn new(header: TypeHeader, detail: TypeDetail) -> Type {
        Type { header, detail }
    }

    #[inline]
    pub fn header(&self) -> &TypeHeader {
        &self.header
    }

    #[inline]
    pub fn kind(&self) -> Kind {
        self.header.kind
    }

    #[inline]
    pub fn detail(&self) -> &TypeDetail {
        &self.detail
    }

    #[inline]
    pub fn is_named(&self) -> bool {
        matches!(self.detail, TypeDetail::Named(_))
    }

    #[inline]
    pub fn is_comparable(&self) -> bool {
        self.header.is_comparable()
    }

    #[inline]
    pub fn is_complete(&self) -> bool {
        self.header.is_complete()
    }

    /// The type's canonical short string form.
    pub fn str(&self) -> &str {
        &self.header.str
    }

    pub fn as_named(&self) -> Option<&NamedDetail> {
        match &self.detail {
            TypeDetail::Named(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_func(&self) -> Option<&FuncDetail> {
        match &self.detail {
            TypeDetail::Func(f) => Some(f),
            _ => None,
        }
    }
}

/// Verbosity of textual type forms: `Short` is the package-local form,
/// `Full` qualifies named types with their package path.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Verbosity {
    Short,
    Full,
}

/// Error returned by the map constructor when the proposed key type is not
/// comparable.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct InvalidKeyType {
    pub key: TypeKey,
}

impl fmt::Display for InvalidKeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid map key type {:?}: not comparable", self.key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_builder_nonzero() {
        let h = HashBuilder::new("").finish();
        assert!(h.is_known());
    }

    #[test]
    fn test_hash_tag_discriminates() {
        let parts = [TypeHash(42)];
        let slice = combine_hashes("slice", &parts);
        let ptr = combine_hashes("ptr", &parts);
        assert!(slice.is_known());
        assert_ne!(slice, ptr);
    }

    #[test]
    fn test_hash_propagates_unknown() {
        let h = combine_hashes("slice", &[TypeHash::UNKNOWN]);
        assert!(!h.is_known());
        let h = combine_hashes("map", &[TypeHash(1), TypeHash::UNKNOWN]);
        assert!(!h.is_known());
    }

    #[test]
    fn test_hash_deterministic() {
        let a = combine_hashes("map", &[TypeHash(1), TypeHash(2)]);
        let b = combine_hashes("map", &[TypeHash(1), TypeHash(2)]);
        assert_eq!(a, b);
        let c = combine_hashes("map", &[TypeHash(2), TypeHash(1)]);
        assert_ne!(a, c);
    }

    #[test]
    fn test_flags() {
        let f = TypeFlags::COMPLETE | TypeFlags::COMPARABLE;
        assert!(f.contains(TypeFlags::COMPLETE));
        assert!(f.contains(TypeFlags::COMPARABLE));
        assert!(!TypeFlags::empty().contains(TypeFlags::COMPLETE));
        assert!(!f.without(TypeFlags::COMPARABLE).contains(TypeFlags::COMPARABLE));
        assert!((f & TypeFlags::COMPLETE).contains(TypeFlags::COMPLETE));
    }
}
