//! Diagnostic definitions for the semantic core.
//!
//! All error codes of the collector and resolver are defined here.
//!
//! Error code ranges:
//! - 3000-3099: type and assignment errors
//! - 3100-3199: expression and constant-folding errors
//! - 3200-3299: declaration and scope errors
//! - 3300-3399: type expression errors
//! - 3400-3499: import errors

use mica_common::diagnostics::{Diagnostic, Label};
use mica_common::span::Span;

/// Semantic error codes (3xxx range).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum TypeError {
    // === Type/Assignment (3000-3099) ===
    /// Operand types of an expression do not combine.
    TypeMismatch = 3000,
    /// An inferred type cannot be assigned to the declared type.
    NotAssignable = 3001,
    /// A constant does not fit in its target type.
    ConstantOverflow = 3002,
    /// A constant's category does not match its target type.
    ConstantTypeMismatch = 3003,
    /// A const initializer is not a constant expression.
    NotConstant = 3004,
    /// Use of untyped nil where a concrete type is required.
    UseOfUntypedNil = 3005,

    // === Expression (3100-3199) ===
    /// A construct is recognized by shape but unimplemented here.
    UnsupportedExpression = 3100,
    /// Type conversion of a constant via a call is unimplemented here.
    UnsupportedConstantCall = 3101,
    /// A literal token's lexical form does not parse.
    InvalidLiteral = 3102,
    /// An identifier in expression position names a non-value object.
    NotAnExpression = 3103,
    /// A shift count is negative or too large.
    InvalidShiftCount = 3104,

    // === Declaration/Scope (3200-3299) ===
    /// Undeclared name.
    Undeclared = 3200,
    /// Redeclared top-level name (the first declaration stays
    /// authoritative).
    Redeclared = 3201,
    /// An object's resolution recursively requires itself.
    CyclicDeclaration = 3202,
    /// An object has no usable backing declaration.
    MissingDeclaration = 3203,
    /// A structural invariant the parser should have guaranteed is
    /// violated; an upstream contract bug, not a user error.
    MalformedDeclaration = 3204,
    /// `iota` used outside a constant declaration.
    IotaOutsideConst = 3205,

    // === Type Expression (3300-3399) ===
    /// The named object is not a type.
    NotAType = 3300,
    /// A map key type is not comparable.
    InvalidMapKey = 3301,
    /// An array length is not a constant expression.
    ArrayLenNotConstant = 3302,
    /// An array length is not a non-negative integer.
    ArrayLenNotInteger = 3303,
    /// A type expression was expected.
    ExpectedType = 3304,

    // === Import (3400-3499) ===
    /// An import path contains invalid characters or is empty.
    InvalidImportPath = 3400,
}

impl TypeError {
    /// The numeric error code.
    #[inline]
    pub fn code(self) -> u16 {
        self as u16
    }

    /// The default message for this code.
    pub fn message(self) -> &'static str {
        match self {
            TypeError::TypeMismatch => "mismatched types",
            TypeError::NotAssignable => "cannot assign inferred type to declared type",
            TypeError::ConstantOverflow => "constant overflows target type",
            TypeError::ConstantTypeMismatch => "constant cannot be converted to target type",
            TypeError::NotConstant => "initializer is not a constant",
            TypeError::UseOfUntypedNil => "use of untyped nil",
            TypeError::UnsupportedExpression => "unsupported expression",
            TypeError::UnsupportedConstantCall => {
                "unimplemented: type conversion on constant"
            }
            TypeError::InvalidLiteral => "invalid literal",
            TypeError::NotAnExpression => "not an expression",
            TypeError::InvalidShiftCount => "invalid shift count",
            TypeError::Undeclared => "undeclared name",
            TypeError::Redeclared => "redeclared in this compilation unit",
            TypeError::CyclicDeclaration => "illegal cycle in declaration",
            TypeError::MissingDeclaration => "missing declaration",
            TypeError::MalformedDeclaration => "malformed declaration",
            TypeError::IotaOutsideConst => "cannot use iota outside constant declaration",
            TypeError::NotAType => "not a type",
            TypeError::InvalidMapKey => "invalid map key type: not comparable",
            TypeError::ArrayLenNotConstant => "array length must be constant",
            TypeError::ArrayLenNotInteger => "array length must be a non-negative integer",
            TypeError::ExpectedType => "expected a type expression",
            TypeError::InvalidImportPath => "invalid import path",
        }
    }

    /// A diagnostic with this code and its default message.
    pub fn diagnostic(self) -> Diagnostic {
        Diagnostic::error(self.message()).with_code(self.code())
    }

    /// A diagnostic with this code and a custom message.
    pub fn with_message(self, message: impl Into<String>) -> Diagnostic {
        Diagnostic::error(message).with_code(self.code())
    }

    /// A diagnostic with this code at a source location.
    pub fn at(self, span: impl Into<Span>) -> Diagnostic {
        self.diagnostic().with_label(Label::primary(span))
    }

    /// A diagnostic with this code, custom message, and source location.
    pub fn at_with_message(self, span: impl Into<Span>, message: impl Into<String>) -> Diagnostic {
        self.with_message(message).with_label(Label::primary(span))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_ranges() {
        assert_eq!(TypeError::TypeMismatch.code(), 3000);
        assert_eq!(TypeError::UnsupportedExpression.code(), 3100);
        assert_eq!(TypeError::Undeclared.code(), 3200);
        assert_eq!(TypeError::NotAType.code(), 3300);
        assert_eq!(TypeError::InvalidImportPath.code(), 3400);
    }

    #[test]
    fn test_all_codes_have_messages() {
        let errors = [
            TypeError::TypeMismatch,
            TypeError::NotAssignable,
            TypeError::ConstantOverflow,
            TypeError::ConstantTypeMismatch,
            TypeError::NotConstant,
            TypeError::UseOfUntypedNil,
            TypeError::UnsupportedExpression,
            TypeError::UnsupportedConstantCall,
            TypeError::InvalidLiteral,
            TypeError::NotAnExpression,
            TypeError::InvalidShiftCount,
            TypeError::Undeclared,
            TypeError::Redeclared,
            TypeError::CyclicDeclaration,
            TypeError::MissingDeclaration,
            TypeError::MalformedDeclaration,
            TypeError::IotaOutsideConst,
            TypeError::NotAType,
            TypeError::InvalidMapKey,
            TypeError::ArrayLenNotConstant,
            TypeError::ArrayLenNotInteger,
            TypeError::ExpectedType,
            TypeError::InvalidImportPath,
        ];
        for err in errors {
            assert!(!err.message().is_empty(), "{:?} has no message", err);
        }
    }

    #[test]
    fn test_diagnostic_helpers() {
        let d = TypeError::Undeclared.at_with_message(2u32..5u32, "undeclared name: foo");
        assert_eq!(d.code, Some(3200));
        assert_eq!(d.message, "undeclared name: foo");
        assert_eq!(d.labels.len(), 1);
        assert!(d.is_error());

        let d = TypeError::InvalidMapKey.at(0u32..1u32);
        assert_eq!(d.message, TypeError::InvalidMapKey.message());
    }
}
