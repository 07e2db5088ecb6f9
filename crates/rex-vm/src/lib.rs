#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! The backtracking matcher: takes a [`rex_bytecode::Program`] and a
//! subject and either runs it anchored at one position (`run_match`) or
//! scans forward for the first position it matches (`run_search`), using
//! the leading `INFO` block to skip subject positions the pattern cannot
//! possibly start a match at.

pub mod engine;
pub mod error;
pub mod options;
mod search;

pub use error::{RuntimeError, RuntimeResult};
pub use options::MatchOptions;
pub use rex_bytecode::program::{Match, Program};

use engine::state::State;
use engine::trace::{NoopTracer, PrintTracer};

/// Attempts a match anchored exactly at `anchor`; does not scan forward on
/// failure. Used both directly (callers who've already found a candidate
/// position) and by [`run_search`]'s per-position probe.
pub fn run_match(prog: &Program, subject: &[u32], anchor: u32, opts: MatchOptions) -> RuntimeResult<Option<Match>> {
    let mut state = State::new(subject, anchor, prog.groups_num, opts.fuel);
    state.ip = rex_bytecode::decode_info(&prog.code).body_start;
    let matched = if opts.debug {
        let mut tracer = PrintTracer::new();
        let result = engine::vm::run(&prog.code, &mut state, &mut tracer);
        eprintln!("{}", tracer.render());
        result?
    } else {
        engine::vm::run(&prog.code, &mut state, &mut NoopTracer)?
    };
    Ok(matched.then(|| build_match(&state, prog.groups_num)))
}

/// Scans forward from `start`, trying [`run_match`] at each candidate
/// position the `INFO` block's prefilter allows, and returns the first
/// success. Positions past `subject.len() - min_len` are never tried: the
/// pattern structurally cannot fit there.
pub fn run_search(prog: &Program, subject: &[u32], start: u32, opts: MatchOptions) -> RuntimeResult<Option<Match>> {
    let info = rex_bytecode::decode_info(&prog.code);
    let min_len = info.min_len as usize;
    if subject.len() < min_len {
        return Ok(None);
    }
    let last_start = (subject.len() - min_len) as u32;
    let mut pos = start;
    while pos <= last_start {
        match search::next_candidate(&info, subject, pos, last_start) {
            Some(candidate) => {
                if let Some(m) = run_match(prog, subject, candidate, opts)? {
                    return Ok(Some(m));
                }
                pos = candidate + 1;
            }
            None => return Ok(None),
        }
    }
    Ok(None)
}

fn build_match(state: &State, groups_num: u16) -> Match {
    let groups = (0..groups_num as usize)
        .map(|g| {
            let slot = 2 * g;
            state.marks[slot].zip(state.marks[slot + 1])
        })
        .collect();
    Match {
        start: state.anchor,
        end: state.cursor,
        groups,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rex_compiler::{CompileOptions, compile};

    fn cps(s: &str) -> Vec<u32> {
        s.chars().map(|c| c as u32).collect()
    }

    #[test]
    fn matches_plain_literal() {
        let prog = compile(&cps("abc"), CompileOptions::default()).unwrap();
        let subject = cps("abc");
        let m = run_match(&prog, &subject, 0, MatchOptions::default()).unwrap().unwrap();
        assert_eq!((m.start, m.end), (0, 3));
    }

    #[test]
    fn run_match_does_not_scan_forward() {
        let prog = compile(&cps("b"), CompileOptions::default()).unwrap();
        let subject = cps("ab");
        assert!(run_match(&prog, &subject, 0, MatchOptions::default()).unwrap().is_none());
    }

    #[test]
    fn run_search_finds_first_occurrence() {
        let prog = compile(&cps("b"), CompileOptions::default()).unwrap();
        let subject = cps("ab");
        let m = run_search(&prog, &subject, 0, MatchOptions::default()).unwrap().unwrap();
        assert_eq!((m.start, m.end), (1, 2));
    }

    #[test]
    fn captures_group_span() {
        let prog = compile(&cps("a(b+)c"), CompileOptions::default()).unwrap();
        let subject = cps("abbbc");
        let m = run_match(&prog, &subject, 0, MatchOptions::default()).unwrap().unwrap();
        assert_eq!(m.group(1), Some((1, 4)));
    }

    #[test]
    fn greedy_then_backtracks_to_let_tail_match() {
        let prog = compile(&cps("a.*c"), CompileOptions::default()).unwrap();
        let subject = cps("axxcxxc");
        let m = run_match(&prog, &subject, 0, MatchOptions::default()).unwrap().unwrap();
        // greedy .* consumes to the last `c`, then nothing follows to
        // backtrack for, so the match spans the whole string.
        assert_eq!((m.start, m.end), (0, 7));
    }

    #[test]
    fn lazy_quantifier_takes_shortest_match() {
        let prog = compile(&cps("a.*?c"), CompileOptions::default()).unwrap();
        let subject = cps("axxcxxc");
        let m = run_match(&prog, &subject, 0, MatchOptions::default()).unwrap().unwrap();
        assert_eq!((m.start, m.end), (0, 4));
    }

    #[test]
    fn backreference_requires_identical_text() {
        let prog = compile(&cps(r"(\w+)-\1"), CompileOptions::default()).unwrap();
        let subject = cps("ab-ab");
        assert!(run_match(&prog, &subject, 0, MatchOptions::default()).unwrap().is_some());
        let subject2 = cps("ab-ac");
        assert!(run_search(&prog, &subject2, 0, MatchOptions::default()).unwrap().is_none());
    }

    #[test]
    fn negative_lookahead_rejects_match() {
        let prog = compile(&cps("foo(?!bar)"), CompileOptions::default()).unwrap();
        let rejected = cps("foobar");
        assert!(run_match(&prog, &rejected, 0, MatchOptions::default()).unwrap().is_none());
        let accepted = cps("foobaz");
        let m = run_match(&prog, &accepted, 0, MatchOptions::default()).unwrap().unwrap();
        assert_eq!((m.start, m.end), (0, 3));
    }

    #[test]
    fn positive_lookahead_keeps_captures_without_consuming() {
        let prog = compile(&cps("foo(?=(bar))"), CompileOptions::default()).unwrap();
        let subject = cps("foobar");
        let m = run_match(&prog, &subject, 0, MatchOptions::default()).unwrap().unwrap();
        assert_eq!((m.start, m.end), (0, 3));
        assert_eq!(m.group(1), Some((3, 6)));
    }

    #[test]
    fn end_of_string_anchor_matches_before_trailing_newline() {
        let prog = compile(&cps("c$"), CompileOptions::default()).unwrap();
        let subject = cps("abc\n");
        let m = run_search(&prog, &subject, 0, MatchOptions::default()).unwrap().unwrap();
        assert_eq!((m.start, m.end), (2, 3));
    }

    #[test]
    fn end_string_anchor_rejects_trailing_newline() {
        let prog = compile(&cps(r"c\Z"), CompileOptions::default()).unwrap();
        let subject = cps("abc\n");
        assert!(run_search(&prog, &subject, 0, MatchOptions::default()).unwrap().is_none());
    }

    // The six concrete scenarios.
    #[test]
    fn scenario_plain_literal() {
        let prog = compile(&cps("a"), CompileOptions::default()).unwrap();
        let m = run_match(&prog, &cps("a"), 0, MatchOptions::default()).unwrap().unwrap();
        assert_eq!((m.start, m.end), (0, 1));
    }

    #[test]
    fn scenario_star_repeat_is_greedy() {
        let prog = compile(&cps("a*"), CompileOptions::default()).unwrap();
        let m = run_match(&prog, &cps("aaab"), 0, MatchOptions::default()).unwrap().unwrap();
        assert_eq!((m.start, m.end), (0, 3));
    }

    #[test]
    fn scenario_alternation_picks_matching_branch() {
        let prog = compile(&cps("a|b"), CompileOptions::default()).unwrap();
        let m = run_match(&prog, &cps("b"), 0, MatchOptions::default()).unwrap().unwrap();
        assert_eq!((m.start, m.end), (0, 1));
    }

    #[test]
    fn scenario_range_class() {
        let prog = compile(&cps("[a-c]"), CompileOptions::default()).unwrap();
        let m = run_match(&prog, &cps("c"), 0, MatchOptions::default()).unwrap().unwrap();
        assert_eq!((m.start, m.end), (0, 1));
    }

    #[test]
    fn scenario_negated_class() {
        let prog = compile(&cps("[^a]"), CompileOptions::default()).unwrap();
        let m = run_match(&prog, &cps("b"), 0, MatchOptions::default()).unwrap().unwrap();
        assert_eq!((m.start, m.end), (0, 1));
        assert!(run_match(&prog, &cps("a"), 0, MatchOptions::default()).unwrap().is_none());
    }

    #[test]
    fn scenario_space_then_word() {
        let prog = compile(&cps(r"\s*\w+"), CompileOptions::default()).unwrap();
        let subject = cps("  hello");
        let m = run_match(&prog, &subject, 0, MatchOptions::default()).unwrap().unwrap();
        assert_eq!((m.start, m.end), (0, 7));
    }

    // Empty-subject boundary properties.
    #[test]
    fn empty_subject_beginning_and_end_anchors_match() {
        let prog = compile(&cps("^"), CompileOptions::default()).unwrap();
        assert!(run_match(&prog, &[], 0, MatchOptions::default()).unwrap().is_some());
        let prog = compile(&cps("$"), CompileOptions::default()).unwrap();
        assert!(run_match(&prog, &[], 0, MatchOptions::default()).unwrap().is_some());
    }

    #[test]
    fn empty_subject_word_boundary_never_matches() {
        let prog = compile(&cps(r"\b"), CompileOptions::default()).unwrap();
        assert!(run_match(&prog, &[], 0, MatchOptions::default()).unwrap().is_none());
    }

    #[test]
    fn greedy_repeat_one_exceeds_unbounded_sentinel() {
        let prog = compile(&cps("a*"), CompileOptions::default()).unwrap();
        let subject: Vec<u32> = std::iter::repeat('a' as u32).take(70_000).collect();
        let m = run_match(&prog, &subject, 0, MatchOptions::default()).unwrap().unwrap();
        assert_eq!((m.start, m.end), (0, 70_000));
    }

    #[test]
    fn lazy_repeat_one_grows_past_unbounded_sentinel() {
        let prog = compile(&cps("a*?z"), CompileOptions::default()).unwrap();
        let mut subject: Vec<u32> = std::iter::repeat('a' as u32).take(70_000).collect();
        subject.push('z' as u32);
        let m = run_match(&prog, &subject, 0, MatchOptions::default()).unwrap().unwrap();
        assert_eq!((m.start, m.end), (0, 70_001));
    }

    #[test]
    fn dot_rejects_linebreak_but_any_all_accepts_it() {
        let prog = compile(&cps("."), CompileOptions::default()).unwrap();
        assert!(run_match(&prog, &cps("\n"), 0, MatchOptions::default()).unwrap().is_none());

        let prog = compile(&cps("."), CompileOptions { dot_all: true, ..Default::default() }).unwrap();
        let m = run_match(&prog, &cps("\n"), 0, MatchOptions::default()).unwrap().unwrap();
        assert_eq!((m.start, m.end), (0, 1));
    }
}
