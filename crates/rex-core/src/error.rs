//! Error kinds shared between the parser and the compiled-program container.
//! Matcher-only failures (`ILLEGAL_OPCODE`, step-budget exhaustion) live in
//! `rex_vm::RuntimeError` instead, since they can only occur once a program
//! exists.

/// Failures that can occur while building a parse tree, before a program
/// has been lowered.
#[derive(Debug, thiserror::Error, PartialEq, Eq, Clone)]
pub enum Error {
    #[error("out of memory")]
    OutOfMemory,

    #[error("invalid node: {tag}")]
    InvalidNode { tag: &'static str },
}
