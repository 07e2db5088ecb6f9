//! `rex match PATTERN SUBJECT`: compiles `PATTERN` and attempts a single
//! match anchored at `--anchor` (default `0`), per spec.md §6's
//! `match(subject_begin, subject_end, anchor)` contract.

use crate::cli::MatchArgs;

use super::common::{compile_options, match_options, print_match, print_no_match, widen};

/// Exit code convention: `0` matched, `1` no match, `2` a compile or
/// runtime error. Mirrors the teacher's `std::process::exit` discipline in
/// its own command modules rather than propagating a `Result` out of `main`.
pub fn run(args: MatchArgs) {
    let pattern = widen(&args.pattern);
    let subject = widen(&args.subject);

    let program = match rex_compiler::compile(&pattern, compile_options(&args.compile)) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("compile error: {e}");
            std::process::exit(2);
        }
    };

    match rex_vm::run_match(&program, &subject, args.anchor, match_options(&args.run)) {
        Ok(Some(m)) => {
            print_match(&m, args.run.json);
        }
        Ok(None) => {
            print_no_match(args.run.json);
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("runtime error: {e}");
            std::process::exit(2);
        }
    }
}
