//! Errors raised while (de)serializing a [`crate::program::Program`].

#[derive(Debug, thiserror::Error, PartialEq, Eq, Clone)]
pub enum ModuleError {
    #[error("invalid magic: expected RXG1")]
    InvalidMagic,

    #[error("unsupported version: {0}")]
    UnsupportedVersion(u32),

    #[error("file too small: {0} bytes")]
    FileTooSmall(usize),

    #[error("corrupt module body")]
    Corrupt,
}
