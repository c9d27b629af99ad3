//! Semantic core of the Mica compiler front end.
//!
//! Three cooperating pieces turn a parsed syntax tree into typed,
//! constant-folded declarations:
//!
//! - a structural type system with hash-consed identity ([`objects`],
//!   [`typ`], [`kind`]): every structurally-identical non-named type is
//!   one shared arena record, so type equality is key comparison;
//! - a lexical scope/object model ([`scope`], [`obj`], [`universe`]) with
//!   a per-target predeclared universe;
//! - a declaration collector and lazy resolver ([`check`]) that handles
//!   order-independent globals, folds constants with untyped-constant
//!   semantics, and reports duplicate declarations without aborting.
//!
//! Everything lives in one owned [`objects::SemObjects`] container with
//! session lifetime; nothing is process-global.

pub mod arena;
pub mod check;
pub mod constant;
pub mod kind;
pub mod obj;
pub mod objects;
pub mod scope;
pub mod target;
pub mod typ;
pub mod universe;

pub use check::{AnalysisOptions, Checker, KnownPackages, TypeError};
pub use kind::Kind;
pub use objects::{DeclKey, ObjKey, ScopeKey, SemObjects, TypeKey};
pub use target::{Arch, Os, Target};
