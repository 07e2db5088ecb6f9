//! Execution tracing. `NoopTracer`'s methods are all empty and `#[inline]`,
//! so a build that never asks for `--debug` pays nothing for the trace
//! points scattered through `vm.rs`; `PrintTracer` collects a line per
//! dispatched instruction and per backtrack for `MatchOptions::debug`.

use rex_bytecode::Opcode;

/// Hook points the dispatch loop calls on every instruction fetch and
/// every backtrack. Implement against this trait (not a concrete type)
/// so `NoopTracer`'s empty bodies can be inlined away entirely.
pub trait Tracer {
    fn trace_instruction(&mut self, _ip: u32, _op: Opcode) {}
    fn trace_backtrack(&mut self, _ip: u32) {}
    fn trace_match(&mut self, _start: u32, _end: u32) {}
    fn trace_fail(&mut self) {}
}

/// The zero-cost default: every method is an empty inline stub.
pub struct NoopTracer;

impl Tracer for NoopTracer {}

/// Collects one line per traced event, joined by `\n` on request. Used by
/// `rex-cli`'s `--debug` flag and by tests that want to assert on the
/// shape of an execution trace without re-deriving it from `Program`.
#[derive(Default)]
pub struct PrintTracer {
    lines: Vec<String>,
}

impl PrintTracer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn render(&self) -> String {
        self.lines.join("\n")
    }
}

impl Tracer for PrintTracer {
    fn trace_instruction(&mut self, ip: u32, op: Opcode) {
        self.lines.push(format!("{ip:5}: {op:?}"));
    }

    fn trace_backtrack(&mut self, ip: u32) {
        self.lines.push(format!("      backtrack -> {ip}"));
    }

    fn trace_match(&mut self, start: u32, end: u32) {
        self.lines.push(format!("      match [{start}, {end})"));
    }

    fn trace_fail(&mut self) {
        self.lines.push("      fail".to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noop_tracer_accepts_all_hooks() {
        let mut t = NoopTracer;
        t.trace_instruction(0, Opcode::Success);
        t.trace_backtrack(0);
        t.trace_match(0, 1);
        t.trace_fail();
    }

    #[test]
    fn print_tracer_renders_lines_in_order() {
        let mut t = PrintTracer::new();
        t.trace_instruction(0, Opcode::Literal);
        t.trace_match(0, 1);
        let out = t.render();
        assert!(out.contains("Literal"));
        assert!(out.contains("match"));
    }
}
