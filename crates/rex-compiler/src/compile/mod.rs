//! Lowers a parsed [`Node`] tree into the flat instruction stream `rex-vm`
//! executes. One function per grammar shape, each writing through the
//! shared [`Emitter`] rather than building and patching a tree of its own —
//! the label mechanism already gives forward jumps (`BRANCH`'s next
//! alternative, `REPEAT`'s tail, `ASSERT`'s resume point) without a second
//! pass over the emitted words.

mod emit;
mod info;

use rex_bytecode::opcode::{Code, Opcode, info_flag};
use rex_bytecode::program::Program;
use rex_core::predicate::fold_case;

use crate::error::CompileResult;
use crate::options::CompileOptions;
use crate::parser::node::{CharClass, ClassItem, Node};
use crate::parser::{self, ParseOutput};
use emit::Emitter;
use info::{analyze, kmp_overlap};

use rex_core::Arena;

/// Parses `pattern` and lowers it straight to a [`Program`]. The arena
/// backing the intermediate parse tree is local to this call and dropped
/// once lowering finishes — nothing from it escapes into the returned
/// program, which owns its instruction stream outright.
pub fn compile(pattern: &[u32], opts: CompileOptions) -> CompileResult<Program> {
    let arena = Arena::new();
    let ParseOutput { root, groups_num } = parser::parse(&arena, pattern, opts.ignore_case)?;
    let code = lower(root, &opts);
    Ok(Program::new(code, groups_num))
}

/// Renders the instruction stream's disassembly without a serialization
/// round trip: parses `pattern`, lowers it, and hands the in-memory
/// program straight to [`rex_bytecode::dump::disassemble`].
pub fn dump_tree(pattern: &[u32], opts: CompileOptions) -> CompileResult<String> {
    let program = compile(pattern, opts)?;
    Ok(rex_bytecode::dump::disassemble(&program))
}

fn lower(root: &Node, opts: &CompileOptions) -> Box<[Code]> {
    let mut em = Emitter::new();
    emit_info_block(&mut em, root);
    compile_node(&mut em, root, opts);
    em.emit(Opcode::Success as Code);
    em.finish()
}

/// Emits the leading `INFO` block: a lower bound on match length (so the
/// search driver can skip subject positions too short to ever match) and,
/// when the pattern starts simply enough, either a literal prefix run (with
/// its KMP overlap table) or a one-code-point membership charset.
fn emit_info_block(em: &mut Emitter, root: &Node) {
    let info = analyze(root);
    let mut flags = 0 as Code;
    if !info.prefix.is_empty() {
        flags |= info_flag::PREFIX;
    }
    if info.charset.is_some() {
        flags |= info_flag::CHARSET;
    }
    em.emit(Opcode::Info as Code);
    em.emit(flags);
    em.emit(info.min_len);
    em.emit(info.max_len);
    if !info.prefix.is_empty() {
        let overlap = kmp_overlap(&info.prefix);
        em.emit(info.prefix.len() as Code);
        for (cp, ov) in info.prefix.iter().zip(overlap.iter()) {
            em.emit(*cp);
            em.emit(*ov);
        }
    }
    if let Some(bitmap) = info.charset {
        em.emit_slice(&bitmap);
    }
}

/// Emits `node`'s instructions into `em`, falling through in sequence on
/// success. Callers that need a shared exit (`BRANCH`'s jump to the
/// instruction after the last alternative) emit that jump themselves —
/// `compile_node` never emits control transfer on its own behalf.
fn compile_node(em: &mut Emitter, node: &Node, opts: &CompileOptions) {
    match node {
        Node::Empty => {}
        Node::Literal { cp, ignore_case } => {
            let op = if *ignore_case { Opcode::LiteralIgnore } else { Opcode::Literal };
            let operand = if *ignore_case { fold_case(*cp) } else { *cp };
            em.emit(op as Code);
            em.emit(operand);
        }
        Node::Any => {
            let op = if opts.dot_all { Opcode::AnyAll } else { Opcode::Any };
            em.emit(op as Code);
        }
        Node::Category(cat) => {
            em.emit(Opcode::Category as Code);
            em.emit(*cat as Code);
        }
        Node::CharClass(class) => compile_charclass(em, class),
        Node::Concat(items) => {
            for item in items.iter() {
                compile_node(em, item, opts);
            }
        }
        Node::Alternation(branches) => compile_alternation(em, branches, opts),
        Node::Repeat { min, max, greedy, body } => compile_repeat(em, *min, *max, *greedy, body, opts),
        Node::Group { number, body } => {
            let slot = 2 * (*number as u32 - 1);
            em.emit(Opcode::Mark as Code);
            em.emit(slot);
            compile_node(em, body, opts);
            em.emit(Opcode::Mark as Code);
            em.emit(slot + 1);
        }
        Node::NonCapturing(body) => compile_node(em, body, opts),
        Node::At(code) => {
            em.emit(Opcode::At as Code);
            em.emit(*code as Code);
        }
        Node::GroupRef { number, ignore_case } => {
            let op = if *ignore_case { Opcode::GroupRefIgnore } else { Opcode::GroupRef };
            em.emit(op as Code);
            em.emit(*number as Code - 1);
        }
        Node::Assert { negate, body } => compile_assert(em, *negate, body, opts),
    }
}

/// A character class's members are emitted inline as a small self-describing
/// set: an optional leading `NEGATE` marker, then one `LITERAL`/`RANGE`/
/// `CATEGORY` instruction per member, terminated by `FAILURE`. `skip` lets
/// the matcher jump straight past the whole set on a successful test
/// without re-walking it. Ignore-case classes fold each literal/range bound
/// once here; the matcher folds the lone subject character to match.
fn compile_charclass(em: &mut Emitter, class: &CharClass) {
    let op = if class.ignore_case { Opcode::InIgnore } else { Opcode::In };
    let header = em.emit(op as Code);
    let skip_label = em.new_label();
    em.emit_rel(header, skip_label);
    if class.negate {
        em.emit(Opcode::Negate as Code);
    }
    for item in class.items {
        match item {
            ClassItem::Literal(cp) => {
                let c = if class.ignore_case { fold_case(*cp) } else { *cp };
                em.emit(Opcode::Literal as Code);
                em.emit(c);
            }
            ClassItem::Range(lo, hi) => {
                let (l, h) = if class.ignore_case {
                    (fold_case(*lo), fold_case(*hi))
                } else {
                    (*lo, *hi)
                };
                em.emit(Opcode::Range as Code);
                em.emit(l);
                em.emit(h);
            }
            ClassItem::Category(cat) => {
                em.emit(Opcode::Category as Code);
                em.emit(*cat as Code);
            }
        }
    }
    em.emit(Opcode::Failure as Code);
    em.place_label(skip_label);
}

/// `BRANCH (offset, code...)+ 0`: each alternative's offset word points at
/// the *next* alternative's own offset word (or, for the last alternative,
/// at the terminating `0`), so backtracking re-enters the same stepping
/// logic the matcher used to try the first one. A successful alternative
/// jumps past the rest of the construct instead of falling into the next
/// offset word.
fn compile_alternation(em: &mut Emitter, branches: &[&Node], opts: &CompileOptions) {
    em.emit(Opcode::Branch as Code);
    let end_label = em.new_label();
    for branch in branches.iter() {
        let offset_origin = em.pos();
        let next_label = em.new_label();
        em.emit_rel(offset_origin, next_label);
        compile_node(em, branch, opts);
        let jump_origin = em.emit(Opcode::Jump as Code);
        em.emit_rel(jump_origin, end_label);
        em.place_label(next_label);
    }
    em.emit(0);
    em.place_label(end_label);
}

/// A repeat whose body is a single fixed-width, choicepoint-free atom
/// lowers to the `REPEAT_ONE`/`MIN_REPEAT_ONE` fast path: the matcher
/// counts matching repetitions in a tight loop rather than pushing one
/// `BRANCH`-style choice point per character. Anything else (captures,
/// alternation, nested repeats, zero-width assertions) takes the general
/// `REPEAT` path.
fn compile_repeat(em: &mut Emitter, min: u32, max: u32, greedy: bool, body: &Node, opts: &CompileOptions) {
    if is_single_atom(body) {
        compile_repeat_one(em, min, max, greedy, body, opts);
    } else {
        compile_repeat_general(em, min, max, greedy, body, opts);
    }
}

fn is_single_atom(node: &Node) -> bool {
    matches!(node, Node::Literal { .. } | Node::Any | Node::Category(_) | Node::CharClass(_))
}

fn compile_repeat_one(em: &mut Emitter, min: u32, max: u32, greedy: bool, body: &Node, opts: &CompileOptions) {
    let op = if greedy { Opcode::RepeatOne } else { Opcode::MinRepeatOne };
    let header = em.emit(op as Code);
    let tail_label = em.new_label();
    em.emit_rel(header, tail_label);
    em.emit(min);
    em.emit(max);
    compile_node(em, body, opts);
    em.place_label(tail_label);
}

/// The general path appends a `MAX_UNTIL`/`MIN_UNTIL` trailer after the
/// body; the matcher tells greedy from lazy by which trailer it lands on
/// (mirroring the two opcodes' own names) rather than a separate flag word.
fn compile_repeat_general(em: &mut Emitter, min: u32, max: u32, greedy: bool, body: &Node, opts: &CompileOptions) {
    let header = em.emit(Opcode::Repeat as Code);
    let tail_label = em.new_label();
    em.emit_rel(header, tail_label);
    em.emit(min);
    em.emit(max);
    compile_node(em, body, opts);
    em.emit(if greedy { Opcode::MaxUntil as Code } else { Opcode::MinUntil as Code });
    em.place_label(tail_label);
}

/// `ASSERT`/`ASSERT_NOT skip back body...`. `back` is always `0`: this
/// lowering pass only reaches `Node::Assert` from `(?=...)`/`(?!...)`,
/// neither of which moves the cursor backward before testing the body.
/// `skip` is where the matcher resumes once it detects (by instruction
/// pointer, not a trailer opcode) that the body ran to completion.
fn compile_assert(em: &mut Emitter, negate: bool, body: &Node, opts: &CompileOptions) {
    let op = if negate { Opcode::AssertNot } else { Opcode::Assert };
    let header = em.emit(op as Code);
    let skip_label = em.new_label();
    em.emit_rel(header, skip_label);
    em.emit(0);
    compile_node(em, body, opts);
    em.place_label(skip_label);
}

#[cfg(test)]
mod tests {
    use super::*;
    use rex_bytecode::Opcode;

    fn cps(s: &str) -> Vec<u32> {
        s.chars().map(|c| c as u32).collect()
    }

    #[test]
    fn compiles_plain_literal_to_literal_then_success() {
        let prog = compile(&cps("a"), CompileOptions::default()).unwrap();
        let info = rex_bytecode::decode_info(&prog.code);
        assert_eq!(Opcode::from_code(prog.code[info.body_start as usize]), Some(Opcode::Literal));
    }

    #[test]
    fn literal_plus_uses_repeat_one_fast_path() {
        let prog = compile(&cps("a+"), CompileOptions::default()).unwrap();
        let info = rex_bytecode::decode_info(&prog.code);
        assert_eq!(Opcode::from_code(prog.code[info.body_start as usize]), Some(Opcode::RepeatOne));
    }

    #[test]
    fn group_ref_plus_uses_general_repeat() {
        let prog = compile(&cps("(a)\\1+"), CompileOptions::default()).unwrap();
        let info = rex_bytecode::decode_info(&prog.code);
        let text = rex_bytecode::dump::disassemble(&prog);
        assert!(text.contains("Repeat "));
        let _ = info;
    }

    #[test]
    fn alternation_dumps_two_branches() {
        let prog = compile(&cps("a|b"), CompileOptions::default()).unwrap();
        let text = rex_bytecode::dump::disassemble(&prog);
        assert!(text.contains("BRANCH"));
        assert!(text.contains("alt offset"));
    }

    #[test]
    fn info_block_carries_literal_prefix() {
        let prog = compile(&cps("abc.*"), CompileOptions::default()).unwrap();
        let info = rex_bytecode::decode_info(&prog.code);
        assert_eq!(info.prefix.len(), 3);
        assert_eq!(info.prefix[0].cp, 'a' as u32);
    }

    #[test]
    fn capturing_group_emits_paired_marks() {
        let prog = compile(&cps("(a)"), CompileOptions::default()).unwrap();
        let text = rex_bytecode::dump::disassemble(&prog);
        assert_eq!(text.matches("MARK").count(), 2);
    }

    #[test]
    fn dump_tree_snapshot_plain_literal() {
        let text = dump_tree(&cps("a"), CompileOptions::default()).unwrap();
        insta::assert_snapshot!(text, @r###"
            0: INFO flags=0x1 min=1 max=1
            5:   prefix[0]='a' overlap=0
            7: Literal 0x61 'a'
            9: Success
        "###);
    }
}
