//! `rex search PATTERN SUBJECT`: compiles `PATTERN` and scans forward from
//! `--start` (default `0`) for the first position it matches, per spec.md
//! §6's `search(subject_begin, subject_end, cursor)` contract.

use crate::cli::SearchArgs;

use super::common::{compile_options, match_options, print_match, print_no_match, widen};

pub fn run(args: SearchArgs) {
    let pattern = widen(&args.pattern);
    let subject = widen(&args.subject);

    let program = match rex_compiler::compile(&pattern, compile_options(&args.compile)) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("compile error: {e}");
            std::process::exit(2);
        }
    };

    match rex_vm::run_search(&program, &subject, args.start, match_options(&args.run)) {
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
