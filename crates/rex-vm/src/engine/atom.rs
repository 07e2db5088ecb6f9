//! Pure, state-free tests of a single code point against a single-atom
//! instruction or an `IN`/`IN_IGNORE` set. Shared by the ordinary dispatch
//! loop (`vm.rs`) and the `REPEAT_ONE`/`MIN_REPEAT_ONE` fast path, which
//! needs to test the same atoms in a tight counting loop without going
//! through the full instruction-stepping machinery.

use rex_bytecode::charset::{BIGCHARSET_BLOCKS, CHARSET_WORDS, bigcharset_contains, charset_contains};
use rex_bytecode::opcode::{Code, Opcode};
use rex_bytecode::{AtCode, CategoryCode};
use rex_core::predicate::{Mode, fold_case, is_digit, is_linebreak, is_space, is_word};

use super::state::State;

pub fn category_matches(cp: u32, cat: CategoryCode) -> bool {
    use CategoryCode::*;
    match cat {
        Digit => is_digit(cp, Mode::Ascii),
        NotDigit => !is_digit(cp, Mode::Ascii),
        Space => is_space(cp, Mode::Ascii),
        NotSpace => !is_space(cp, Mode::Ascii),
        Word => is_word(cp, Mode::Ascii),
        NotWord => !is_word(cp, Mode::Ascii),
        Linebreak => is_linebreak(cp),
        NotLinebreak => !is_linebreak(cp),
        LocWord => is_word(cp, Mode::Loc),
        LocNotWord => !is_word(cp, Mode::Loc),
        UniDigit => is_digit(cp, Mode::Uni),
        UniNotDigit => !is_digit(cp, Mode::Uni),
        UniSpace => is_space(cp, Mode::Uni),
        UniNotSpace => !is_space(cp, Mode::Uni),
        UniWord => is_word(cp, Mode::Uni),
        UniNotWord => !is_word(cp, Mode::Uni),
        UniLinebreak => is_linebreak(cp),
        UniNotLinebreak => !is_linebreak(cp),
    }
}

/// Walks an `IN`/`IN_IGNORE` set's items (the instructions following its
/// `skip` word), honoring a leading `NEGATE` marker, and reports whether
/// `cp` (already folded by the caller when the set is case-insensitive) is
/// a member.
pub fn eval_in(code: &[Code], set_start: u32, cp: u32) -> bool {
    let mut p = set_start as usize;
    let mut negate = false;
    if Opcode::from_code(code[p]) == Some(Opcode::Negate) {
        negate = true;
        p += 1;
    }
    let mut matched = false;
    loop {
        match Opcode::from_code(code[p]) {
            Some(Opcode::Failure) => break,
            Some(Opcode::Literal) => {
                if code[p + 1] == cp {
                    matched = true;
                }
                p += 2;
            }
            Some(Opcode::Range) => {
                if code[p + 1] <= cp && cp <= code[p + 2] {
                    matched = true;
                }
                p += 3;
            }
            Some(Opcode::Category) => {
                if let Some(cat) = CategoryCode::from_code(code[p + 1]) {
                    if category_matches(cp, cat) {
                        matched = true;
                    }
                }
                p += 2;
            }
            Some(Opcode::Charset) => {
                if charset_contains(&code[p + 1..p + 1 + CHARSET_WORDS], cp) {
                    matched = true;
                }
                p += 1 + CHARSET_WORDS;
            }
            Some(Opcode::BigCharset) => {
                let n_blocks = code[p + 1] as usize;
                let block_index_start = p + 2;
                let blocks_start = block_index_start + BIGCHARSET_BLOCKS;
                let block_index: Vec<u8> = code[block_index_start..block_index_start + BIGCHARSET_BLOCKS]
                    .iter()
                    .map(|&w| w as u8)
                    .collect();
                if bigcharset_contains(&block_index, &code[blocks_start..blocks_start + n_blocks * CHARSET_WORDS], cp) {
                    matched = true;
                }
                p = blocks_start + n_blocks * CHARSET_WORDS;
            }
            _ => break,
        }
    }
    if negate { !matched } else { matched }
}

/// Tests `cp` against the single-instruction atom at `atom_ip`: the body of
/// a `REPEAT_ONE`/`MIN_REPEAT_ONE` construct, guaranteed by the lowering
/// pass to be exactly one of the variants matched below.
pub fn atom_matches(code: &[Code], atom_ip: u32, cp: u32) -> bool {
    let ip = atom_ip as usize;
    match Opcode::from_code(code[ip]) {
        Some(Opcode::Any) => !is_linebreak(cp),
        Some(Opcode::AnyAll) => true,
        Some(Opcode::Literal) => code[ip + 1] == cp,
        Some(Opcode::LiteralIgnore) => code[ip + 1] == fold_case(cp),
        Some(Opcode::NotLiteral) => code[ip + 1] != cp,
        Some(Opcode::NotLiteralIgnore) => code[ip + 1] != fold_case(cp),
        Some(Opcode::Category) => CategoryCode::from_code(code[ip + 1]).is_some_and(|cat| category_matches(cp, cat)),
        Some(Opcode::Range) => code[ip + 1] <= cp && cp <= code[ip + 2],
        Some(Opcode::Charset) => charset_contains(&code[ip + 1..ip + 1 + CHARSET_WORDS], cp),
        Some(Opcode::BigCharset) => {
            let n_blocks = code[ip + 1] as usize;
            let block_index_start = ip + 2;
            let blocks_start = block_index_start + BIGCHARSET_BLOCKS;
            let block_index: Vec<u8> = code[block_index_start..block_index_start + BIGCHARSET_BLOCKS]
                .iter()
                .map(|&w| w as u8)
                .collect();
            bigcharset_contains(&block_index, &code[blocks_start..blocks_start + n_blocks * CHARSET_WORDS], cp)
        }
        Some(Opcode::In) => eval_in(code, atom_ip + 2, cp),
        Some(Opcode::InIgnore) => eval_in(code, atom_ip + 2, fold_case(cp)),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use rex_bytecode::charset::build_charset;

    use super::*;

    /// `eval_in` is fed a hand-assembled `IN` body here because the
    /// compiler never lowers a charclass into `CHARSET`/`BIGCHARSET`
    /// items — but the opcode table advertises them as supported `IN`
    /// members, so the evaluator must honor them regardless.
    #[test]
    fn eval_in_evaluates_charset_item() {
        let bitmap = build_charset(&['a' as u32, 'c' as u32]);
        let mut code = vec![Opcode::Charset as Code];
        code.extend_from_slice(&bitmap);
        code.push(Opcode::Failure as Code);
        assert!(eval_in(&code, 0, 'a' as u32));
        assert!(eval_in(&code, 0, 'c' as u32));
        assert!(!eval_in(&code, 0, 'b' as u32));
    }

    #[test]
    fn eval_in_evaluates_bigcharset_item() {
        let sub = build_charset(&[5]);
        let mut code = vec![Opcode::BigCharset as Code, 1];
        let mut block_index = vec![u8::MAX as u32; BIGCHARSET_BLOCKS];
        block_index[0x20] = 0;
        code.extend_from_slice(&block_index);
        code.extend_from_slice(&sub);
        code.push(Opcode::Failure as Code);
        let cp = (0x20 << 8) | 5;
        assert!(eval_in(&code, 0, cp));
        assert!(!eval_in(&code, 0, (0x20 << 8) | 6));
    }
}

fn mode_for(at: AtCode) -> Mode {
    use AtCode::*;
    match at {
        LocBoundary | LocNonBoundary => Mode::Loc,
        UniBoundary | UniNonBoundary => Mode::Uni,
        _ => Mode::Ascii,
    }
}

fn is_word_boundary(state: &State, mode: Mode) -> bool {
    let before = if state.cursor == 0 {
        false
    } else {
        state
            .subject
            .get((state.cursor - 1) as usize)
            .is_some_and(|&cp| is_word(cp, mode))
    };
    let after = state.current_char().is_some_and(|cp| is_word(cp, mode));
    before != after
}

pub fn at_matches(state: &State, at: AtCode) -> bool {
    use AtCode::*;
    match at {
        Beginning | BeginningString => state.cursor == 0,
        BeginningLine => {
            state.cursor == 0
                || state
                    .subject
                    .get((state.cursor - 1) as usize)
                    .is_some_and(|&cp| is_linebreak(cp))
        }
        // `$` (bare, non-multiline): end of string, or just before a single
        // trailing linebreak — the position a final `\n` leaves a line at.
        // `\Z`/`AT_END_STRING` has no such exception.
        End => {
            state.cursor as usize == state.subject.len()
                || (state.cursor as usize + 1 == state.subject.len()
                    && state.current_char().is_some_and(is_linebreak))
        }
        EndString => state.cursor as usize == state.subject.len(),
        EndLine => state.cursor as usize == state.subject.len() || state.current_char().is_some_and(is_linebreak),
        Boundary | LocBoundary | UniBoundary => is_word_boundary(state, mode_for(at)),
        NonBoundary | LocNonBoundary | UniNonBoundary => !is_word_boundary(state, mode_for(at)),
    }
}
