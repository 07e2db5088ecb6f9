#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Parses a pattern string (as a code point slice) and lowers it to a
//! `rex_bytecode::Program`. The two stages are kept in separate modules —
//! [`parser`] builds an arena-allocated tree, [`compile`] walks it into the
//! flat instruction stream — so each can be tested against the other's
//! output independently of `rex-vm` actually running anything.

pub mod compile;
pub mod error;
pub mod options;
pub mod parser;

pub use compile::{compile, dump_tree};
pub use error::{CompileError, CompileResult};
pub use options::CompileOptions;
use rex_core::Arena;

/// Parses `pattern` and renders its tree without lowering it, for
/// `rex-cli`'s `dump --tree` and for eyeballing how a pattern parsed
/// independently of how it later compiles.
pub fn parse_tree(pattern: &[u32], ignore_case: bool) -> CompileResult<String> {
    let arena = Arena::new();
    let out = parser::parse(&arena, pattern, ignore_case)?;
    Ok(parser::dump::dump_node(out.root))
}
