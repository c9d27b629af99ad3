//! Shared infrastructure for the Mica compiler front end.
//!
//! This crate carries the pieces every other compiler crate needs:
//! byte-position spans, the source map that resolves them back to files,
//! and the diagnostic types used to accumulate and render errors.

pub mod diagnostics;
pub mod source;
pub mod span;
