//! Errors the matcher itself can raise. Compile-time failures live in
//! `rex_compiler::CompileError`; by the time a `Program` reaches this
//! crate it's assumed well-formed, so these are the matcher's own
//! exhaustion/corruption conditions.

#[derive(Debug, thiserror::Error, PartialEq, Eq, Clone)]
pub enum RuntimeError {
    #[error("illegal opcode word {word} at instruction {at}")]
    IllegalOpcode { word: u32, at: u32 },

    /// The dispatch loop's step budget ran out before reaching `SUCCESS` or
    /// exhausting every backtrack choice. Guards against pathological
    /// patterns (catastrophic backtracking) running forever.
    #[error("step budget exhausted")]
    StepBudgetExhausted,
}

pub type RuntimeResult<T> = Result<T, RuntimeError>;
