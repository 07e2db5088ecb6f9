//! The dispatch loop: fetch an instruction word at `state.ip`, execute its
//! effect, and either fall through to the next word, jump, or signal a
//! failure that `backtrack` resolves by popping the most recent choice
//! point. Grounded directly on the teacher's `VM::execute_with` shape (a
//! `loop { fetch; dispatch; match result { ... } }` with backtracking
//! surfaced as a distinct outcome rather than a language-level exception) —
//! `Step::Backtrack` here plays the role the teacher's `RuntimeError::Backtracked`
//! plays in `execute_with`.
//!
//! `REPEAT`/`MAX_UNTIL`/`MIN_UNTIL`, `BRANCH`, `ASSERT`/`ASSERT_NOT`, and the
//! `REPEAT_ONE`/`MIN_REPEAT_ONE` fast paths are all implemented without
//! native recursion: every speculative continuation is a [`super::state::MatchContext`]
//! pushed onto `state.contexts`, popped and restored by [`backtrack`].

use rex_bytecode::opcode::{Code, Opcode, UNBOUNDED};
use rex_bytecode::{AtCode, CategoryCode};
use rex_core::predicate::{fold_case, is_linebreak};

use crate::error::{RuntimeError, RuntimeResult};

use super::atom::{at_matches, atom_matches, category_matches, eval_in};
use super::frame::RepeatFrame;
use super::state::{AssertFrame, MatchContext, State};
use super::trace::Tracer;

/// Runs `code` from `state.ip` to either a match or exhaustion.
///
/// `Ok(true)`: `state.cursor` is the match end and `state.marks` holds the
/// capture group bounds. `Ok(false)`: every choice point was exhausted
/// without reaching `SUCCESS`. `Err`: a corrupt program or a fuel exhaustion.
pub fn run(code: &[Code], state: &mut State, tracer: &mut impl Tracer) -> RuntimeResult<bool> {
    loop {
        if let Some(result) = resolve_pending_assert(state) {
            if !result && !backtrack(code, state) {
                tracer.trace_fail();
                return Ok(false);
            }
            continue;
        }

        if state.fuel == 0 {
            return Err(RuntimeError::StepBudgetExhausted);
        }
        state.fuel -= 1;

        let ip = state.ip as usize;
        let word = *code.get(ip).ok_or(RuntimeError::IllegalOpcode { word: 0, at: state.ip })?;
        let Some(op) = Opcode::from_code(word) else {
            return Err(RuntimeError::IllegalOpcode { word, at: state.ip });
        };
        tracer.trace_instruction(state.ip, op);

        let outcome = dispatch(code, state, op)?;
        match outcome {
            Outcome::Continue => {}
            Outcome::Success => {
                tracer.trace_match(state.anchor, state.cursor);
                return Ok(true);
            }
            Outcome::Fail => {
                if !backtrack(code, state) {
                    tracer.trace_fail();
                    return Ok(false);
                }
                tracer.trace_backtrack(state.ip);
            }
        }
    }
}

enum Outcome {
    Continue,
    Success,
    Fail,
}

/// If the active assertion's body just fell through to its resume point
/// (forward execution reached `resume_ip` without failing), resolves it:
/// `Some(true)` if the assertion as a whole holds (continue executing at
/// `resume_ip`), `Some(false)` if it doesn't (the caller must backtrack).
/// `None` means no assertion is pending resolution right now.
fn resolve_pending_assert(state: &mut State) -> Option<bool> {
    let af = *state.asserts.last()?;
    if state.ip != af.resume_ip {
        return None;
    }
    state.asserts.pop();
    state.current_repeat = af.saved_repeat;
    state.cursor = af.restore_cursor;
    if af.negate {
        // The body matched, so ASSERT_NOT fails; discard whatever it captured
        // along with every choice point the body pushed while exploring
        // alternatives — none of them are reachable once the assertion as a
        // whole is known to fail, and leaving them on `contexts` would let
        // `backtrack` wrongly resume execution back inside the dead body.
        state.contexts.truncate(af.context_floor);
        state.effects.unwind_to(af.effect_watermark, &mut state.marks);
        state.lastmark = af.saved_lastmark;
        state.lastindex = af.saved_lastindex;
        Some(false)
    } else {
        // ASSERT succeeds; keep the body's captures, resume right where we are.
        Some(true)
    }
}

fn dispatch(code: &[Code], state: &mut State, op: Opcode) -> RuntimeResult<Outcome> {
    let ip = state.ip;
    match op {
        Opcode::Failure => Ok(Outcome::Fail),
        Opcode::Success => Ok(Outcome::Success),
        Opcode::Any => step_one_char_len(state, ip, 1, |cp| !is_linebreak(cp)),
        Opcode::AnyAll => step_one_char_len(state, ip, 1, |_| true),
        Opcode::At => {
            let Some(at) = AtCode::from_code(code[ip as usize + 1]) else {
                return Err(RuntimeError::IllegalOpcode { word: code[ip as usize + 1], at: ip });
            };
            if at_matches(state, at) {
                state.ip = ip + 2;
                Ok(Outcome::Continue)
            } else {
                Ok(Outcome::Fail)
            }
        }
        Opcode::Category => {
            let Some(cat) = CategoryCode::from_code(code[ip as usize + 1]) else {
                return Err(RuntimeError::IllegalOpcode { word: code[ip as usize + 1], at: ip });
            };
            step_one_char_len(state, ip, 2, move |cp| category_matches(cp, cat))
        }
        Opcode::Literal => {
            let want = code[ip as usize + 1];
            step_one_char_len(state, ip, 2, move |cp| cp == want)
        }
        Opcode::LiteralIgnore => {
            let want = code[ip as usize + 1];
            step_one_char_len(state, ip, 2, move |cp| fold_case(cp) == want)
        }
        Opcode::NotLiteral => {
            let want = code[ip as usize + 1];
            step_one_char_len(state, ip, 2, move |cp| cp != want)
        }
        Opcode::NotLiteralIgnore => {
            let want = code[ip as usize + 1];
            step_one_char_len(state, ip, 2, move |cp| fold_case(cp) != want)
        }
        Opcode::Range => {
            let lo = code[ip as usize + 1];
            let hi = code[ip as usize + 2];
            step_one_char_len(state, ip, 3, move |cp| lo <= cp && cp <= hi)
        }
        Opcode::In => {
            let skip = code[ip as usize + 1];
            let set_start = ip + 2;
            step_set(state, ip, skip, move |cp| eval_in(code, set_start, cp))
        }
        Opcode::InIgnore => {
            let skip = code[ip as usize + 1];
            let set_start = ip + 2;
            step_set(state, ip, skip, move |cp| eval_in(code, set_start, fold_case(cp)))
        }
        Opcode::Charset | Opcode::BigCharset | Opcode::Negate => {
            // Only ever reached as part of an `IN`/`IN_IGNORE` set, which
            // `eval_in` walks directly without stepping the main dispatch
            // loop through it.
            Err(RuntimeError::IllegalOpcode { word: code[ip as usize], at: ip })
        }
        Opcode::Mark => {
            state.mark(code[ip as usize + 1] as usize);
            state.ip = ip + 2;
            Ok(Outcome::Continue)
        }
        Opcode::GroupRef => exec_group_ref(code, state, ip, false),
        Opcode::GroupRefIgnore => exec_group_ref(code, state, ip, true),
        Opcode::GroupRefExists => {
            let g = code[ip as usize + 1] as usize;
            let skip = code[ip as usize + 2];
            let set = state.marks.get(2 * g).copied().flatten().is_some()
                && state.marks.get(2 * g + 1).copied().flatten().is_some();
            state.ip = if set { ip + 3 } else { ip + skip };
            Ok(Outcome::Continue)
        }
        Opcode::Jump => {
            state.ip = ip + code[ip as usize + 1];
            Ok(Outcome::Continue)
        }
        Opcode::Branch => {
            if enter_branch_from(code, state, ip + 1) {
                Ok(Outcome::Continue)
            } else {
                Ok(Outcome::Fail)
            }
        }
        Opcode::Repeat => exec_repeat_start(code, state, ip),
        Opcode::RepeatOne => exec_repeat_one_start(code, state, ip, true),
        Opcode::MinRepeatOne => exec_repeat_one_start(code, state, ip, false),
        Opcode::MaxUntil => exec_max_until(state),
        Opcode::MinUntil => exec_min_until(state),
        Opcode::Assert => exec_assert_start(code, state, ip, false),
        Opcode::AssertNot => exec_assert_start(code, state, ip, true),
        Opcode::Info => Err(RuntimeError::IllegalOpcode { word: code[ip as usize], at: ip }),
    }
}

/// Tests `pred` against the current subject character, advancing the
/// cursor by one code point and `ip` past the instruction's full `words`
/// (opcode word plus operands) on success.
fn step_one_char_len(state: &mut State, ip: u32, words: u32, pred: impl FnOnce(u32) -> bool) -> RuntimeResult<Outcome> {
    match state.current_char() {
        Some(cp) if pred(cp) => {
            state.cursor += 1;
            state.ip = ip + words;
            Ok(Outcome::Continue)
        }
        _ => Ok(Outcome::Fail),
    }
}

fn step_set(state: &mut State, ip: u32, skip: u32, pred: impl FnOnce(u32) -> bool) -> RuntimeResult<Outcome> {
    match state.current_char() {
        Some(cp) if pred(cp) => {
            state.cursor += 1;
            state.ip = ip + skip;
            Ok(Outcome::Continue)
        }
        _ => Ok(Outcome::Fail),
    }
}

fn exec_group_ref(code: &[Code], state: &mut State, ip: u32, ignore_case: bool) -> RuntimeResult<Outcome> {
    let g = code[ip as usize + 1] as usize;
    let slot = 2 * g;
    let Some((Some(begin), Some(end))) = state.marks.get(slot).zip(state.marks.get(slot + 1)).map(|(a, b)| (*a, *b))
    else {
        return Ok(Outcome::Fail);
    };
    let len = end - begin;
    if state.cursor as usize + len as usize > state.subject.len() {
        return Ok(Outcome::Fail);
    }
    for i in 0..len {
        let pat_cp = state.subject[(begin + i) as usize];
        let subj_cp = state.subject[(state.cursor + i) as usize];
        let matches = if ignore_case { fold_case(pat_cp) == fold_case(subj_cp) } else { pat_cp == subj_cp };
        if !matches {
            return Ok(Outcome::Fail);
        }
    }
    state.cursor += len;
    state.ip = ip + 2;
    Ok(Outcome::Continue)
}

/// Walks a `BRANCH`'s alternatives starting at the offset word `alt_header`,
/// applying the fast literal/`IN` prefilter (spec.md §4.4) before paying for
/// a choice point: an alternative whose first opcode cannot possibly match
/// the current character is skipped without being entered at all. Returns
/// `false` once every alternative (including the terminating `0`) has been
/// ruled out.
fn enter_branch_from(code: &[Code], state: &mut State, mut alt_header: u32) -> bool {
    loop {
        let offset = code[alt_header as usize];
        if offset == 0 {
            return false;
        }
        let next_alt = alt_header + offset;
        let body_start = alt_header + 1;
        if prefilter_rejects(code, body_start, state.current_char()) {
            alt_header = next_alt;
            continue;
        }
        state.contexts.push(MatchContext::Branch {
            next_header: next_alt,
            cursor: state.cursor,
            watermark: state.effects.watermark(),
            saved_lastmark: state.lastmark,
            saved_lastindex: state.lastindex,
            saved_repeat: state.current_repeat,
        });
        state.ip = body_start;
        return true;
    }
}

/// `true` if `cp` (or its absence, at end of subject) makes it structurally
/// impossible for the alternative starting at `body_start` to match —
/// narrow on purpose: only `LITERAL`/`LITERAL_IGNORE` and `IN`/`IN_IGNORE`
/// are checked, matching spec.md's "first effective opcode is LITERAL or IN"
/// fast path. Anything else falls through to an ordinary attempt.
fn prefilter_rejects(code: &[Code], body_start: u32, cp: Option<u32>) -> bool {
    let Some(cp) = cp else { return false };
    let ip = body_start as usize;
    match Opcode::from_code(code[ip]) {
        Some(Opcode::Literal) => code[ip + 1] != cp,
        Some(Opcode::LiteralIgnore) => code[ip + 1] != fold_case(cp),
        Some(Opcode::In) => !eval_in(code, body_start + 2, cp),
        Some(Opcode::InIgnore) => !eval_in(code, body_start + 2, fold_case(cp)),
        _ => false,
    }
}

fn exec_repeat_start(code: &[Code], state: &mut State, ip: u32) -> RuntimeResult<Outcome> {
    let skip = code[ip as usize + 1];
    let min = code[ip as usize + 2];
    let max = code[ip as usize + 3];
    let body_ip = ip + 4;
    let tail_ip = ip + skip;
    // `greedy` is recovered from which trailer opcode the body reaches
    // (MAX_UNTIL vs MIN_UNTIL); until then, a placeholder — filled in
    // before the frame is ever read by MAX_UNTIL/MIN_UNTIL, since those
    // are the only readers.
    let frame = RepeatFrame {
        min,
        max,
        greedy: trailer_is_greedy(code, tail_ip),
        body_ip,
        tail_ip,
        count: 0,
        last_cursor: None,
        parent: state.current_repeat,
    };
    let idx = state.repeats.push(frame);
    if min == 0 {
        if frame_is_greedy(&state.repeats, idx) {
            state.contexts.push(MatchContext::RepeatTail {
                frame: idx,
                cursor: state.cursor,
                watermark: state.effects.watermark(),
                count: 0,
                saved_lastmark: state.lastmark,
                saved_lastindex: state.lastindex,
            });
        } else {
            state.contexts.push(MatchContext::RepeatBody {
                frame: idx,
                cursor: state.cursor,
                watermark: state.effects.watermark(),
                count: 0,
                saved_lastmark: state.lastmark,
                saved_lastindex: state.lastindex,
            });
            state.enter_repeat_tail(idx);
            return Ok(Outcome::Continue);
        }
    }
    state.enter_repeat_body(idx);
    Ok(Outcome::Continue)
}

/// The trailer immediately preceding `tail_ip` (`MAX_UNTIL` or `MIN_UNTIL`)
/// tells greedy from lazy, per spec.md's "the matcher tells greedy from
/// lazy by which trailer it lands on" lowering contract.
fn trailer_is_greedy(code: &[Code], tail_ip: u32) -> bool {
    Opcode::from_code(code[tail_ip as usize - 1]) == Some(Opcode::MaxUntil)
}

fn frame_is_greedy(repeats: &super::frame::RepeatArena, idx: u32) -> bool {
    repeats.get(idx).greedy
}

fn exec_max_until(state: &mut State) -> RuntimeResult<Outcome> {
    let Some(idx) = state.current_repeat else {
        return Err(RuntimeError::IllegalOpcode { word: Opcode::MaxUntil as Code, at: state.ip });
    };
    let prev_last_cursor = state.repeats.get(idx).last_cursor;
    let cursor = state.cursor;
    let frame = state.repeats.get_mut(idx);
    frame.count += 1;
    let count = frame.count;
    let min = frame.min;
    let max = frame.max;

    if count < min {
        state.repeats.get_mut(idx).last_cursor = Some(cursor);
        state.enter_repeat_body(idx);
        return Ok(Outcome::Continue);
    }
    let more_allowed = count < max || max == UNBOUNDED;
    let made_progress = prev_last_cursor != Some(cursor);
    if more_allowed && made_progress {
        state.contexts.push(MatchContext::RepeatTail {
            frame: idx,
            cursor,
            watermark: state.effects.watermark(),
            count,
            saved_lastmark: state.lastmark,
            saved_lastindex: state.lastindex,
        });
        state.repeats.get_mut(idx).last_cursor = Some(cursor);
        state.enter_repeat_body(idx);
    } else {
        state.enter_repeat_tail(idx);
    }
    Ok(Outcome::Continue)
}

fn exec_min_until(state: &mut State) -> RuntimeResult<Outcome> {
    let Some(idx) = state.current_repeat else {
        return Err(RuntimeError::IllegalOpcode { word: Opcode::MinUntil as Code, at: state.ip });
    };
    let prev_last_cursor = state.repeats.get(idx).last_cursor;
    let cursor = state.cursor;
    let frame = state.repeats.get_mut(idx);
    frame.count += 1;
    let count = frame.count;
    let min = frame.min;
    let max = frame.max;

    if count < min {
        state.repeats.get_mut(idx).last_cursor = Some(cursor);
        state.enter_repeat_body(idx);
        return Ok(Outcome::Continue);
    }
    let more_allowed = count < max || max == UNBOUNDED;
    let made_progress = prev_last_cursor != Some(cursor);
    if more_allowed && made_progress {
        state.contexts.push(MatchContext::RepeatBody {
            frame: idx,
            cursor,
            watermark: state.effects.watermark(),
            count,
            saved_lastmark: state.lastmark,
            saved_lastindex: state.lastindex,
        });
    }
    state.repeats.get_mut(idx).last_cursor = Some(cursor);
    state.enter_repeat_tail(idx);
    Ok(Outcome::Continue)
}

fn exec_repeat_one_start(code: &[Code], state: &mut State, ip: u32, greedy: bool) -> RuntimeResult<Outcome> {
    let skip = code[ip as usize + 1];
    let min = code[ip as usize + 2];
    let max = code[ip as usize + 3];
    let atom_ip = ip + 4;
    let tail_ip = ip + skip;
    let base_cursor = state.cursor;

    if greedy {
        let remaining = state.subject.len() - base_cursor as usize;
        let available = if max == UNBOUNDED { remaining } else { (max as usize).min(remaining) };
        let mut count = 0u32;
        while (count as usize) < available && atom_matches(code, atom_ip, state.subject[(base_cursor + count) as usize]) {
            count += 1;
        }
        if count < min {
            return Ok(Outcome::Fail);
        }
        if count > min {
            state.contexts.push(MatchContext::RepeatOne {
                base_cursor,
                count: count - 1,
                min,
                tail_ip,
                watermark: state.effects.watermark(),
                saved_lastmark: state.lastmark,
                saved_lastindex: state.lastindex,
                saved_repeat: state.current_repeat,
            });
        }
        state.cursor = base_cursor + count;
        state.ip = tail_ip;
    } else {
        let mut count = 0u32;
        while count < min {
            let Some(cp) = state.subject.get((base_cursor + count) as usize) else {
                return Ok(Outcome::Fail);
            };
            if !atom_matches(code, atom_ip, *cp) {
                return Ok(Outcome::Fail);
            }
            count += 1;
        }
        state.contexts.push(MatchContext::MinRepeatOne {
            base_cursor,
            count,
            max,
            atom_ip,
            tail_ip,
            watermark: state.effects.watermark(),
            saved_lastmark: state.lastmark,
            saved_lastindex: state.lastindex,
            saved_repeat: state.current_repeat,
        });
        state.cursor = base_cursor + count;
        state.ip = tail_ip;
    }
    Ok(Outcome::Continue)
}

fn exec_assert_start(code: &[Code], state: &mut State, ip: u32, negate: bool) -> RuntimeResult<Outcome> {
    let skip = code[ip as usize + 1];
    let back = code[ip as usize + 2];
    let resume_ip = ip + skip;
    let body_ip = ip + 3;

    let Some(look_start) = state.cursor.checked_sub(back) else {
        // Can't look behind the start of the subject: the body structurally
        // cannot match, so a positive assertion fails and a negative one
        // vacuously holds.
        return if negate {
            state.ip = resume_ip;
            Ok(Outcome::Continue)
        } else {
            Ok(Outcome::Fail)
        };
    };

    state.asserts.push(AssertFrame {
        resume_ip,
        restore_cursor: state.cursor,
        negate,
        context_floor: state.contexts.len(),
        effect_watermark: state.effects.watermark(),
        saved_lastmark: state.lastmark,
        saved_lastindex: state.lastindex,
        saved_repeat: state.current_repeat,
    });
    state.cursor = look_start;
    state.ip = body_ip;
    Ok(Outcome::Continue)
}

/// Pops the most recent choice point and restores the state it captured,
/// cascading through exhausted `ASSERT` bodies and `BRANCH` alternatives
/// until either a retry is found (`true`, `state.ip` is set to resume at)
/// or every choice point has been exhausted (`false`, no match).
fn backtrack(code: &[Code], state: &mut State) -> bool {
    loop {
        if let Some(af) = state.asserts.last().copied() {
            if state.contexts.len() <= af.context_floor {
                state.asserts.pop();
                state.effects.unwind_to(af.effect_watermark, &mut state.marks);
                state.lastmark = af.saved_lastmark;
                state.lastindex = af.saved_lastindex;
                state.current_repeat = af.saved_repeat;
                state.cursor = af.restore_cursor;
                if af.negate {
                    // The body never matched at all: ASSERT_NOT holds.
                    state.ip = af.resume_ip;
                    return true;
                }
                // The body never matched: ASSERT fails, keep unwinding.
                continue;
            }
        }

        let Some(ctx) = state.contexts.pop() else { return false };
        match ctx {
            MatchContext::Branch { next_header, cursor, watermark, saved_lastmark, saved_lastindex, saved_repeat } => {
                state.cursor = cursor;
                state.effects.unwind_to(watermark, &mut state.marks);
                state.lastmark = saved_lastmark;
                state.lastindex = saved_lastindex;
                state.current_repeat = saved_repeat;
                if enter_branch_from(code, state, next_header) {
                    return true;
                }
            }
            MatchContext::RepeatTail { frame, cursor, watermark, count, saved_lastmark, saved_lastindex } => {
                state.cursor = cursor;
                state.effects.unwind_to(watermark, &mut state.marks);
                state.lastmark = saved_lastmark;
                state.lastindex = saved_lastindex;
                state.repeats.get_mut(frame).count = count;
                state.enter_repeat_tail(frame);
                return true;
            }
            MatchContext::RepeatBody { frame, cursor, watermark, count, saved_lastmark, saved_lastindex } => {
                state.cursor = cursor;
                state.effects.unwind_to(watermark, &mut state.marks);
                state.lastmark = saved_lastmark;
                state.lastindex = saved_lastindex;
                state.repeats.get_mut(frame).count = count;
                state.enter_repeat_body(frame);
                return true;
            }
            MatchContext::RepeatOne {
                base_cursor,
                count,
                min,
                tail_ip,
                watermark,
                saved_lastmark,
                saved_lastindex,
                saved_repeat,
            } => {
                state.effects.unwind_to(watermark, &mut state.marks);
                state.lastmark = saved_lastmark;
                state.lastindex = saved_lastindex;
                state.current_repeat = saved_repeat;
                if count < min {
                    continue;
                }
                if count > min {
                    state.contexts.push(MatchContext::RepeatOne {
                        base_cursor,
                        count: count - 1,
                        min,
                        tail_ip,
                        watermark,
                        saved_lastmark,
                        saved_lastindex,
                        saved_repeat,
                    });
                }
                state.cursor = base_cursor + count;
                state.ip = tail_ip;
                return true;
            }
            MatchContext::MinRepeatOne {
                base_cursor,
                count,
                max,
                atom_ip,
                tail_ip,
                watermark,
                saved_lastmark,
                saved_lastindex,
                saved_repeat,
            } => {
                state.effects.unwind_to(watermark, &mut state.marks);
                state.lastmark = saved_lastmark;
                state.lastindex = saved_lastindex;
                state.current_repeat = saved_repeat;
                let cursor = base_cursor + count;
                let more_allowed = count < max || max == UNBOUNDED;
                let can_grow = more_allowed && state.subject.get(cursor as usize).is_some_and(|&cp| atom_matches(code, atom_ip, cp));
                if !can_grow {
                    continue;
                }
                state.contexts.push(MatchContext::MinRepeatOne {
                    base_cursor,
                    count: count + 1,
                    max,
                    atom_ip,
                    tail_ip,
                    watermark,
                    saved_lastmark,
                    saved_lastindex,
                    saved_repeat,
                });
                state.cursor = cursor + 1;
                state.ip = tail_ip;
                return true;
            }
        }
    }
}
