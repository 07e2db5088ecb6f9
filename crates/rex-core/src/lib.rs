#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Shared primitives for the rex regex engine.
//!
//! Everything in this crate is compile-time and runtime agnostic: the arena
//! allocator backing the parser, the code point and category predicates the
//! parser and matcher both consult, and the error taxonomy both sides raise.

pub mod arena;
pub mod error;
pub mod predicate;

pub use arena::Arena;
pub use error::Error;

/// A single Unicode scalar value, widened to `u32` the way the rest of the
/// pipeline (pattern, subject, instruction operands) stores code points.
pub type CodePoint = u32;
