//! Renders a compiled [`crate::Program`] back to readable text: one line
//! per instruction word, annotated with decoded operands. Used by
//! `rex-cli`'s `dump` subcommand and by snapshot tests that pin down how a
//! given pattern compiles.

use crate::charset::CHARSET_WORDS;
use crate::opcode::{AtCode, CategoryCode, Code, Opcode};
use crate::program::Program;

pub fn disassemble(prog: &Program) -> String {
    let mut out = String::new();
    let code = &prog.code;
    let mut pos = 0usize;
    while pos < code.len() {
        let consumed = decode_instruction(code, pos, 0, &mut out);
        pos += consumed.max(1);
    }
    out
}

fn push_line(out: &mut String, pos: usize, indent: usize, text: &str) {
    out.push_str(&format!("{pos:5}: {:indent$}{text}\n", "", indent = indent * 2));
}

/// Decodes the instruction starting at `pos`, appending its rendering to
/// `out`, and returns how many words it (and, for set-wrapping opcodes,
/// its inline set) occupies.
fn decode_instruction(code: &[Code], pos: usize, indent: usize, out: &mut String) -> usize {
    let Some(op) = Opcode::from_code(code[pos]) else {
        push_line(out, pos, indent, &format!("UNKNOWN({})", code[pos]));
        return 1;
    };
    match op {
        Opcode::Failure
        | Opcode::Success
        | Opcode::Any
        | Opcode::AnyAll
        | Opcode::Negate
        | Opcode::MaxUntil
        | Opcode::MinUntil => {
            push_line(out, pos, indent, &format!("{op:?}"));
            1
        }
        Opcode::At => {
            let code_word = code[pos + 1];
            let at = AtCode::from_code(code_word);
            push_line(out, pos, indent, &format!("AT {at:?}"));
            2
        }
        Opcode::Category => {
            let cat = CategoryCode::from_code(code[pos + 1]);
            push_line(out, pos, indent, &format!("CATEGORY {cat:?}"));
            2
        }
        Opcode::Literal | Opcode::LiteralIgnore | Opcode::NotLiteral | Opcode::NotLiteralIgnore => {
            let cp = code[pos + 1];
            let ch = char::from_u32(cp).unwrap_or('\u{fffd}');
            push_line(out, pos, indent, &format!("{op:?} {cp:#x} {ch:?}"));
            2
        }
        Opcode::Range => {
            push_line(
                out,
                pos,
                indent,
                &format!("RANGE {:#x}-{:#x}", code[pos + 1], code[pos + 2]),
            );
            3
        }
        Opcode::Charset => {
            push_line(out, pos, indent, "CHARSET");
            1 + CHARSET_WORDS
        }
        Opcode::BigCharset => {
            let n_blocks = code[pos + 1] as usize;
            push_line(out, pos, indent, &format!("BIGCHARSET n_blocks={n_blocks}"));
            2 + 64 + n_blocks * CHARSET_WORDS
        }
        Opcode::In | Opcode::InIgnore => {
            let skip = code[pos + 1];
            push_line(out, pos, indent, &format!("{op:?} skip={skip}"));
            let mut p = pos + 2;
            loop {
                if Opcode::from_code(code[p]) == Some(Opcode::Failure) {
                    push_line(out, p, indent + 1, "FAILURE (end of set)");
                    p += 1;
                    break;
                }
                let consumed = decode_instruction(code, p, indent + 1, out);
                p += consumed.max(1);
            }
            p - pos
        }
        Opcode::Branch => {
            push_line(out, pos, indent, "BRANCH");
            let mut p = pos + 1;
            loop {
                let offset = code[p] as usize;
                if offset == 0 {
                    push_line(out, p, indent + 1, "(end of alternatives)");
                    p += 1;
                    break;
                }
                push_line(out, p, indent + 1, &format!("alt offset={offset}"));
                let next = p + offset;
                let mut q = p + 1;
                while q < next {
                    let consumed = decode_instruction(code, q, indent + 2, out);
                    q += consumed.max(1);
                }
                p = next;
            }
            p - pos
        }
        Opcode::Jump => {
            push_line(out, pos, indent, &format!("JUMP offset={}", code[pos + 1]));
            2
        }
        Opcode::Mark => {
            push_line(out, pos, indent, &format!("MARK {}", code[pos + 1]));
            2
        }
        Opcode::GroupRef | Opcode::GroupRefIgnore => {
            push_line(out, pos, indent, &format!("{op:?} {}", code[pos + 1]));
            2
        }
        Opcode::GroupRefExists => {
            push_line(
                out,
                pos,
                indent,
                &format!("GROUPREF_EXISTS {} offset_to_else={}", code[pos + 1], code[pos + 2]),
            );
            3
        }
        Opcode::Repeat | Opcode::RepeatOne | Opcode::MinRepeatOne => {
            let offset_to_tail = code[pos + 1] as usize;
            push_line(
                out,
                pos,
                indent,
                &format!(
                    "{op:?} offset_to_tail={} min={} max={}",
                    offset_to_tail,
                    code[pos + 2],
                    code[pos + 3]
                ),
            );
            let tail = pos + offset_to_tail;
            let mut p = pos + 4;
            while p < tail {
                let consumed = decode_instruction(code, p, indent + 1, out);
                p += consumed.max(1);
            }
            offset_to_tail
        }
        Opcode::Assert | Opcode::AssertNot => {
            push_line(
                out,
                pos,
                indent,
                &format!("{op:?} skip={} back={}", code[pos + 1], code[pos + 2]),
            );
            3
        }
        Opcode::Info => {
            let flags = code[pos + 1];
            let min_len = code[pos + 2];
            let max_len = code[pos + 3];
            push_line(
                out,
                pos,
                indent,
                &format!("INFO flags={flags:#x} min={min_len} max={max_len}"),
            );
            let mut consumed = 4;
            if flags & crate::opcode::info_flag::PREFIX != 0 {
                let prefix_len = code[pos + consumed] as usize;
                consumed += 1;
                for i in 0..prefix_len {
                    let cp = code[pos + consumed + i * 2];
                    let overlap = code[pos + consumed + i * 2 + 1];
                    let ch = char::from_u32(cp).unwrap_or('\u{fffd}');
                    push_line(out, pos + consumed + i * 2, indent + 1, &format!("prefix[{i}]={ch:?} overlap={overlap}"));
                }
                consumed += prefix_len * 2;
            }
            if flags & crate::opcode::info_flag::CHARSET != 0 {
                consumed += CHARSET_WORDS;
            }
            consumed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::opcode::Opcode;

    #[test]
    fn disassembles_literal_then_success() {
        let code: Box<[Code]> = vec![Opcode::Literal as Code, 'a' as Code, Opcode::Success as Code]
            .into_boxed_slice();
        let prog = Program::new(code, 0);
        let text = disassemble(&prog);
        assert!(text.contains("Literal"));
        assert!(text.contains("Success"));
    }

    #[test]
    fn disassemble_snapshot_literal_then_success() {
        let code: Box<[Code]> = vec![Opcode::Literal as Code, 'a' as Code, Opcode::Success as Code]
            .into_boxed_slice();
        let prog = Program::new(code, 0);
        insta::assert_snapshot!(disassemble(&prog), @r###"
            0: Literal 0x61 'a'
            2: Success
        "###);
    }
}
