//! Operator kinds of the generic syntax tree.
//!
//! One closed enumeration covers everything the semantic core needs to
//! recognize: structural grouping nodes, literal token kinds, expression
//! operators, and type-expression shapes.

use std::fmt;

/// The operator kind of a syntax-tree node.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Op {
    // Structure
    /// One source file; children are top-level declarations.
    File,
    /// Import group; children are `ImportSpec` nodes.
    Import,
    /// One import: `[alias-ident?, path-string]`.
    ImportSpec,
    /// Type declaration group; children are `Define`/`Assign` specs.
    Type,
    /// Type definition spec: `type T U`; `[name, type-expr]`.
    Define,
    /// Type alias spec: `type T = U`; `[name, type-expr]`.
    Assign,
    /// Var declaration group; children are `ValueSpec` nodes.
    Var,
    /// Const declaration group; children are `ValueSpec` nodes.
    Const,
    /// One var/const spec: `[names, type-expr?, exprs?]`.
    ValueSpec,
    /// Function declaration: `[receiver?, name, type, body?]`.
    Func,
    /// List of declared names (idents).
    Names,
    /// List of expressions.
    Exprs,
    /// Function parameter types.
    Params,
    /// Function result types.
    Results,

    // Literal tokens (atoms)
    /// Identifier.
    Ident,
    /// Integer literal.
    IntLit,
    /// Floating-point literal.
    FloatLit,
    /// Imaginary literal.
    ImagLit,
    /// Character literal (quoted).
    CharLit,
    /// String literal (quoted).
    StringLit,

    // Operators (unary and binary by arity)
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/`
    Quo,
    /// `%`
    Rem,
    /// `&`
    And,
    /// `|`
    Or,
    /// `^` (binary xor, unary complement)
    Xor,
    /// `&^`
    AndNot,
    /// `<<`
    Shl,
    /// `>>`
    Shr,
    /// `&&`
    LogAnd,
    /// `||`
    LogOr,
    /// `!`
    Not,
    /// `==`
    Eq,
    /// `!=`
    NotEq,
    /// `<`
    Lt,
    /// `<=`
    LtEq,
    /// `>`
    Gt,
    /// `>=`
    GtEq,

    // Recognized-but-deferred expression shapes
    /// Call or conversion: `[callee, args...]`.
    Call,
    /// Composite literal: `[type-expr, elements...]`.
    CompositeLit,
    /// Selector: `[operand, name]`.
    Selector,
    /// Index: `[operand, index]`.
    Index,

    // Type expressions
    /// `[]E`: `[elem]`.
    SliceType,
    /// `[N]E`: `[len-expr, elem]`.
    ArrayType,
    /// `map[K]E`: `[key, elem]`.
    MapType,
    /// `chan E` (direction in the atom literal of child 0 is not modeled;
    /// plain bidirectional channels only): `[elem]`.
    ChanType,
    /// `*E`: `[base]`.
    PointerType,
    /// `func(...) (...)`: `[params, results]`.
    FuncType,
    /// `struct { ... }`; children are `Field` nodes.
    StructType,
    /// `interface { ... }`; children are `Method` nodes.
    InterfaceType,
    /// One struct field: `[name, type-expr]`.
    Field,
    /// One interface method: `[name, func-type]`.
    Method,
}

impl Op {
    /// True for token kinds that appear as leaf atoms carrying literal text.
    #[inline]
    pub fn is_literal(self) -> bool {
        matches!(
            self,
            Op::Ident | Op::IntLit | Op::FloatLit | Op::ImagLit | Op::CharLit | Op::StringLit
        )
    }

    /// True for expression operators (unary or binary).
    #[inline]
    pub fn is_operator(self) -> bool {
        matches!(
            self,
            Op::Add
                | Op::Sub
                | Op::Mul
                | Op::Quo
                | Op::Rem
                | Op::And
                | Op::Or
                | Op::Xor
                | Op::AndNot
                | Op::Shl
                | Op::Shr
                | Op::LogAnd
                | Op::LogOr
                | Op::Not
                | Op::Eq
                | Op::NotEq
                | Op::Lt
                | Op::LtEq
                | Op::Gt
                | Op::GtEq
        )
    }

    /// True for comparison operators, whose result is always boolean.
    #[inline]
    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            Op::Eq | Op::NotEq | Op::Lt | Op::LtEq | Op::Gt | Op::GtEq
        )
    }

    /// True for the shift operators.
    #[inline]
    pub fn is_shift(self) -> bool {
        matches!(self, Op::Shl | Op::Shr)
    }

    /// True for type-expression node kinds.
    #[inline]
    pub fn is_type_expr(self) -> bool {
        matches!(
            self,
            Op::SliceType
                | Op::ArrayType
                | Op::MapType
                | Op::ChanType
                | Op::PointerType
                | Op::FuncType
                | Op::StructType
                | Op::InterfaceType
        )
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Op::File => "file",
            Op::Import => "import",
            Op::ImportSpec => "import-spec",
            Op::Type => "type",
            Op::Define => "define",
            Op::Assign => "assign",
            Op::Var => "var",
            Op::Const => "const",
            Op::ValueSpec => "value-spec",
            Op::Func => "func",
            Op::Names => "names",
            Op::Exprs => "exprs",
            Op::Params => "params",
            Op::Results => "results",
            Op::Ident => "ident",
            Op::IntLit => "int",
            Op::FloatLit => "float",
            Op::ImagLit => "imag",
            Op::CharLit => "char",
            Op::StringLit => "string",
            Op::Add => "+",
            Op::Sub => "-",
            Op::Mul => "*",
            Op::Quo => "/",
            Op::Rem => "%",
            Op::And => "&",
            Op::Or => "|",
            Op::Xor => "^",
            Op::AndNot => "&^",
            Op::Shl => "<<",
            Op::Shr => ">>",
            Op::LogAnd => "&&",
            Op::LogOr => "||",
            Op::Not => "!",
            Op::Eq => "==",
            Op::NotEq => "!=",
            Op::Lt => "<",
            Op::LtEq => "<=",
            Op::Gt => ">",
            Op::GtEq => ">=",
            Op::Call => "call",
            Op::CompositeLit => "composite-lit",
            Op::Selector => "selector",
            Op::Index => "index",
            Op::SliceType => "slice-type",
            Op::ArrayType => "array-type",
            Op::MapType => "map-type",
            Op::ChanType => "chan-type",
            Op::PointerType => "pointer-type",
            Op::FuncType => "func-type",
            Op::StructType => "struct-type",
            Op::InterfaceType => "interface-type",
            Op::Field => "field",
            Op::Method => "method",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_predicate() {
        assert!(Op::IntLit.is_literal());
        assert!(Op::Ident.is_literal());
        assert!(!Op::Add.is_literal());
        assert!(!Op::ValueSpec.is_literal());
    }

    #[test]
    fn test_operator_predicate() {
        assert!(Op::Add.is_operator());
        assert!(Op::Xor.is_operator());
        assert!(Op::Not.is_operator());
        assert!(!Op::Call.is_operator());
        assert!(!Op::Ident.is_operator());
    }

    #[test]
    fn test_comparison_and_shift() {
        assert!(Op::Eq.is_comparison());
        assert!(Op::GtEq.is_comparison());
        assert!(!Op::Add.is_comparison());
        assert!(Op::Shl.is_shift());
        assert!(!Op::Lt.is_shift());
    }

    #[test]
    fn test_type_expr_predicate() {
        assert!(Op::MapType.is_type_expr());
        assert!(Op::SliceType.is_type_expr());
        assert!(!Op::Ident.is_type_expr());
    }

    #[test]
    fn test_display() {
        assert_eq!(Op::Add.to_string(), "+");
        assert_eq!(Op::MapType.to_string(), "map-type");
        assert_eq!(Op::AndNot.to_string(), "&^");
    }
}
