//! The matcher engine, split the way the teacher splits its own VM: pure
//! per-character tests (`atom`), the undo log (`effect`), the repeat-frame
//! arena (`frame`), the mutable run state and choice-point stack shapes
//! (`state`), execution tracing (`trace`), and the dispatch loop itself
//! (`vm`).

pub mod atom;
pub mod effect;
pub mod frame;
pub mod state;
pub mod trace;
pub mod vm;

pub use state::State;
pub use trace::{NoopTracer, PrintTracer, Tracer};
pub use vm::run;
