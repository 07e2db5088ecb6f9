//! The instruction stream builder: a forward-only word sequence with
//! label-addressed fixups for `offset`/`skip` operands whose target isn't
//! known yet when the operand is written (every backward reference, and
//! most forward ones). Labels are plain integers indexing into a table of
//! word positions; a label is *created* before its position is known and
//! *placed* once emission reaches it, exactly mirroring the teacher's
//! `fresh_label`/label-patching discipline in its own lowering pass.

use rex_bytecode::Code;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Label(usize);

enum Word {
    Imm(Code),
    /// Resolves to `label_pos - origin` once `label`'s position is known.
    Rel { origin: u32, label: Label },
}

pub struct Emitter {
    words: Vec<Word>,
    label_pos: Vec<Option<u32>>,
}

impl Emitter {
    pub fn new() -> Self {
        Self {
            words: Vec::new(),
            label_pos: Vec::new(),
        }
    }

    pub fn pos(&self) -> u32 {
        self.words.len() as u32
    }

    pub fn new_label(&mut self) -> Label {
        self.label_pos.push(None);
        Label(self.label_pos.len() - 1)
    }

    pub fn place_label(&mut self, label: Label) {
        self.label_pos[label.0] = Some(self.pos());
    }

    pub fn emit(&mut self, word: Code) -> u32 {
        let pos = self.pos();
        self.words.push(Word::Imm(word));
        pos
    }

    pub fn emit_slice(&mut self, slice: &[Code]) {
        self.words.extend(slice.iter().copied().map(Word::Imm));
    }

    /// Emits a relative offset operand pointing at `label`, computed
    /// against the opcode word at `origin` (the instruction's own start
    /// position, not this operand's position).
    pub fn emit_rel(&mut self, origin: u32, label: Label) {
        self.words.push(Word::Rel { origin, label });
    }

    pub fn finish(self) -> Box<[Code]> {
        let label_pos = self.label_pos;
        self.words
            .into_iter()
            .map(|w| match w {
                Word::Imm(c) => c,
                Word::Rel { origin, label } => {
                    let target = label_pos[label.0].expect("label referenced but never placed");
                    target - origin
                }
            })
            .collect()
    }
}

impl Default for Emitter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_label_resolves_to_positive_offset() {
        let mut e = Emitter::new();
        let origin = e.emit(99);
        let target = e.new_label();
        e.emit_rel(origin, target);
        e.emit(1);
        e.place_label(target);
        e.emit(2);
        let code = e.finish();
        assert_eq!(code[0], 99);
        assert_eq!(code[1], 2); // target at word index 2, origin at 0
        assert_eq!(code[2], 1);
        assert_eq!(code[3], 2);
    }
}
