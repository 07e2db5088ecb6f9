//! Compile-time switches. The two flags spec.md's options bitset names
//! (`IGNORE_CASE`, `DEBUG`) become ordinary `bool` fields here rather than a
//! raw bitmask — this is an idiomatic-Rust rewrite, not a binary-compatible
//! reimplementation of the C option bits.

/// Options that influence lowering itself (as opposed to [`rex_vm::MatchOptions`],
/// which only influences how the already-compiled program is executed).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CompileOptions {
    /// Folds every literal/range/backreference comparison the parser emits
    /// to lowercase on both sides, selecting the `_IGNORE` opcode variants.
    pub ignore_case: bool,
    /// Emits verbose tracing hooks; purely a hint consumed by callers that
    /// want to pair compilation with `MatchOptions::debug` — lowering itself
    /// doesn't branch on this beyond making it available to `dump_tree`.
    pub debug: bool,
    /// Supplemental: selects whether `.` lowers to `ANY` (default, rejects
    /// linebreaks) or `ANY_ALL` (matches any code point). Not named in
    /// spec.md's options table, but spec.md's own Testable Properties (§8)
    /// require both `.` behaviors to be reachable, and this is the natural
    /// place to select between them.
    pub dot_all: bool,
}
