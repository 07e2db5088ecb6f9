//! Shared plumbing between the three subcommands: the trivial
//! `char`-to-`u32` widening named in spec.md §1 (this is not a general
//! transcoding layer — it's exactly the "library accepts `&str` and widens
//! at the boundary" trick described there), plus the options structs every
//! subcommand builds from its flattened [`crate::cli::CompileFlags`]/
//! [`crate::cli::RunFlags`].

use rex_compiler::CompileOptions;
use rex_vm::MatchOptions;

use crate::cli::{CompileFlags, RunFlags};

pub fn widen(s: &str) -> Vec<u32> {
    s.chars().map(|c| c as u32).collect()
}

pub fn compile_options(flags: &CompileFlags) -> CompileOptions {
    CompileOptions {
        ignore_case: flags.ignore_case,
        debug: false,
        dot_all: flags.dot_all,
    }
}

pub fn match_options(flags: &RunFlags) -> MatchOptions {
    MatchOptions {
        debug: flags.debug,
        fuel: flags.fuel,
    }
}

/// What a successful `match`/`search` prints, shared by both subcommands so
/// `--json` behaves identically from either one.
pub fn print_match(m: &rex_bytecode::Match, json: bool) {
    if json {
        let groups: Vec<Option<(u32, u32)>> = m.groups.clone();
        let payload = serde_json::json!({
            "start": m.start,
            "end": m.end,
            "groups": groups,
        });
        println!("{payload}");
    } else {
        println!("match [{}, {})", m.start, m.end);
        for (i, g) in m.groups.iter().enumerate() {
            match g {
                Some((b, e)) => println!("  group {}: [{b}, {e})", i + 1),
                None => println!("  group {}: <unset>", i + 1),
            }
        }
    }
}

pub fn print_no_match(json: bool) {
    if json {
        println!("{}", serde_json::json!({ "matched": false }));
    } else {
        println!("no match");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn widen_collects_code_points_not_utf16_units() {
        assert_eq!(widen("a\u{1F600}b"), vec!['a' as u32, 0x1F600, 'b' as u32]);
    }
}
