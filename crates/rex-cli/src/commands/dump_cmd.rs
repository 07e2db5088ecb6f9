//! `rex dump PATTERN [--tree]`: either the parsed tree (`--tree`) or the
//! compiled instruction stream's disassembly, per spec.md §6's `dump`/
//! `disassemble` operations.

use crate::cli::DumpArgs;

use super::common::{compile_options, widen};

pub fn run(args: DumpArgs) {
    let pattern = widen(&args.pattern);
    let opts = compile_options(&args.compile);

    let text = if args.tree {
        rex_compiler::parse_tree(&pattern, opts.ignore_case)
    } else {
        rex_compiler::dump_tree(&pattern, opts)
    };

    match text {
        Ok(text) => print!("{text}"),
        Err(e) => {
            eprintln!("compile error: {e}");
            std::process::exit(2);
        }
    }
}
