//! The kind taxonomy: primitive value categories and aggregate shape tags.
//!
//! Every type has exactly one kind. The untyped kinds appear only on
//! constant expressions that have not yet assumed a default or declared
//! type. All operations here are total: out-of-family queries return the
//! designated invalid result instead of failing.

use std::fmt;

use crate::target::Target;

/// Primitive value category or aggregate shape tag.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Kind {
    Invalid,

    Bool,
    Int,
    Int8,
    Int16,
    Int32,
    Int64,
    Uint,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Uintptr,
    Float32,
    Float64,
    Complex64,
    Complex128,
    String,

    // Aggregate shape tags
    Array,
    Chan,
    Func,
    Interface,
    Map,
    Ptr,
    Slice,
    Struct,

    // Kinds of untyped constant expressions
    UntypedBool,
    UntypedInt,
    UntypedRune,
    UntypedFloat,
    UntypedComplex,
    UntypedString,
    UntypedNil,
}

impl Kind {
    /// Size in bytes. Depends on the target for the machine-word kinds;
    /// `0` for `Invalid`, for the untyped kinds, and for the aggregates
    /// whose size is not determined by kind alone.
    pub const fn size_of(self, target: Target) -> u32 {
        let word = target.word_size();
        match self {
            Kind::Bool | Kind::Int8 | Kind::Uint8 => 1,
            Kind::Int16 | Kind::Uint16 => 2,
            Kind::Int32 | Kind::Uint32 | Kind::Float32 => 4,
            Kind::Int64 | Kind::Uint64 | Kind::Float64 | Kind::Complex64 => 8,
            Kind::Complex128 => 16,
            Kind::Int | Kind::Uint | Kind::Uintptr => word,
            Kind::Ptr | Kind::Map | Kind::Chan | Kind::Func => word,
            Kind::String | Kind::Interface => 2 * word,
            Kind::Slice => 3 * word,
            _ => 0,
        }
    }

    /// Alignment in bytes; at least 1 for every sized kind.
    pub const fn align_of(self, target: Target) -> u32 {
        match self {
            Kind::Bool | Kind::Int8 | Kind::Uint8 => 1,
            Kind::Int16 | Kind::Uint16 => 2,
            Kind::Int32 | Kind::Uint32 | Kind::Float32 | Kind::Complex64 => 4,
            Kind::Int64 | Kind::Uint64 | Kind::Float64 | Kind::Complex128 => target.align64(),
            Kind::Int | Kind::Uint | Kind::Uintptr => target.word_size(),
            Kind::Ptr | Kind::Map | Kind::Chan | Kind::Func => target.word_size(),
            Kind::String | Kind::Interface | Kind::Slice => target.word_size(),
            _ => 1,
        }
    }

    /// Collapses a family of related kinds to one representative, for use
    /// in dispatch tables: signed integers to `Int`, unsigned to `Uint`,
    /// floats to `Float64`, complex to `Complex128`. Everything else is its
    /// own category.
    pub const fn category(self) -> Kind {
        match self {
            Kind::Int | Kind::Int8 | Kind::Int16 | Kind::Int32 | Kind::Int64 => Kind::Int,
            Kind::Uint
            | Kind::Uint8
            | Kind::Uint16
            | Kind::Uint32
            | Kind::Uint64
            | Kind::Uintptr => Kind::Uint,
            Kind::Float32 | Kind::Float64 => Kind::Float64,
            Kind::Complex64 | Kind::Complex128 => Kind::Complex128,
            k => k,
        }
    }

    /// True for everything except `Invalid` and the aggregate tags: the
    /// typed scalars, `String`, and the untyped kinds.
    pub const fn is_basic(self) -> bool {
        !matches!(
            self,
            Kind::Invalid
                | Kind::Array
                | Kind::Chan
                | Kind::Func
                | Kind::Interface
                | Kind::Map
                | Kind::Ptr
                | Kind::Slice
                | Kind::Struct
        )
    }

    pub const fn is_signed(self) -> bool {
        matches!(
            self,
            Kind::Int | Kind::Int8 | Kind::Int16 | Kind::Int32 | Kind::Int64
        )
    }

    pub const fn is_unsigned(self) -> bool {
        matches!(
            self,
            Kind::Uint | Kind::Uint8 | Kind::Uint16 | Kind::Uint32 | Kind::Uint64 | Kind::Uintptr
        )
    }

    /// Typed and untyped integer kinds.
    pub const fn is_integer(self) -> bool {
        self.is_signed() || self.is_unsigned() || matches!(self, Kind::UntypedInt | Kind::UntypedRune)
    }

    pub const fn is_float(self) -> bool {
        matches!(self, Kind::Float32 | Kind::Float64 | Kind::UntypedFloat)
    }

    pub const fn is_complex(self) -> bool {
        matches!(self, Kind::Complex64 | Kind::Complex128 | Kind::UntypedComplex)
    }

    pub const fn is_numeric(self) -> bool {
        self.is_integer() || self.is_float() || self.is_complex()
    }

    pub const fn is_boolean(self) -> bool {
        matches!(self, Kind::Bool | Kind::UntypedBool)
    }

    pub const fn is_string(self) -> bool {
        matches!(self, Kind::String | Kind::UntypedString)
    }

    pub const fn is_untyped(self) -> bool {
        matches!(
            self,
            Kind::UntypedBool
                | Kind::UntypedInt
                | Kind::UntypedRune
                | Kind::UntypedFloat
                | Kind::UntypedComplex
                | Kind::UntypedString
                | Kind::UntypedNil
        )
    }

    /// True for kinds whose values are ordered by `<`.
    pub const fn is_ordered(self) -> bool {
        (self.is_numeric() && !self.is_complex()) || self.is_string()
    }

    /// The default typed kind an untyped constant assumes on first use.
    /// Identity for already-typed kinds; `Invalid` for `UntypedNil`, which
    /// has no default.
    pub const fn default_kind(self) -> Kind {
        match self {
            Kind::UntypedBool => Kind::Bool,
            Kind::UntypedInt => Kind::Int,
            Kind::UntypedRune => Kind::Int32,
            Kind::UntypedFloat => Kind::Float64,
            Kind::UntypedComplex => Kind::Complex128,
            Kind::UntypedString => Kind::String,
            Kind::UntypedNil => Kind::Invalid,
            k => k,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Kind::Invalid => "invalid",
            Kind::Bool => "bool",
            Kind::Int => "int",
            Kind::Int8 => "int8",
            Kind::Int16 => "int16",
            Kind::Int32 => "int32",
            Kind::Int64 => "int64",
            Kind::Uint => "uint",
            Kind::Uint8 => "uint8",
            Kind::Uint16 => "uint16",
            Kind::Uint32 => "uint32",
            Kind::Uint64 => "uint64",
            Kind::Uintptr => "uintptr",
            Kind::Float32 => "float32",
            Kind::Float64 => "float64",
            Kind::Complex64 => "complex64",
            Kind::Complex128 => "complex128",
            Kind::String => "string",
            Kind::Array => "array",
            Kind::Chan => "chan",
            Kind::Func => "func",
            Kind::Interface => "interface",
            Kind::Map => "map",
            Kind::Ptr => "ptr",
            Kind::Slice => "slice",
            Kind::Struct => "struct",
            Kind::UntypedBool => "untyped bool",
            Kind::UntypedInt => "untyped int",
            Kind::UntypedRune => "untyped rune",
            Kind::UntypedFloat => "untyped float",
            Kind::UntypedComplex => "untyped complex",
            Kind::UntypedString => "untyped string",
            Kind::UntypedNil => "untyped nil",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
