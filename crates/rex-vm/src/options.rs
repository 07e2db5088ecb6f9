//! Options that influence how an already-compiled [`rex_bytecode::Program`]
//! is executed, as opposed to `rex_compiler::CompileOptions`, which
//! influences how it was lowered in the first place.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchOptions {
    /// Collects a human-readable trace of every dispatched instruction and
    /// backtrack via [`crate::engine::trace::PrintTracer`] instead of the
    /// zero-cost `NoopTracer`.
    pub debug: bool,
    /// Upper bound on dispatched instructions before giving up with
    /// [`crate::error::RuntimeError::StepBudgetExhausted`]. `0` disables
    /// the budget (runs until success or exhaustion).
    pub fuel: u64,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self { debug: false, fuel: 10_000_000 }
    }
}
