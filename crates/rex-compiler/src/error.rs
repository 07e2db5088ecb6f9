//! Errors the parser and lowering pass can raise. Runtime-only failures
//! live in `rex_vm::RuntimeError` since they require a program to exist
//! first.

#[derive(Debug, thiserror::Error, PartialEq, Eq, Clone)]
pub enum CompileError {
    #[error(transparent)]
    Core(#[from] rex_core::Error),

    #[error("bad character range: {lo:#x}-{hi:#x}")]
    BadRange { lo: u32, hi: u32 },

    #[error("bogus escape at offset {at}")]
    BogusEscape { at: usize },

    #[error("unmatched '(' at offset {at}")]
    UnmatchedOpenParen { at: usize },

    #[error("unmatched ')' at offset {at}")]
    UnmatchedCloseParen { at: usize },

    #[error("invalid backreference \\{group} at offset {at}")]
    InvalidBackreference { group: u16, at: usize },
}

pub type CompileResult<T> = Result<T, CompileError>;
