//! An append-only undo log for mark-register writes, truncated back to a
//! watermark on backtrack. Grounded on the same "checkpoint stores a
//! watermark, backtrack truncates" discipline as a generic effect log:
//! every `MARK` write pushes the slot's previous value here instead of a
//! full register-file snapshot, so choice points only need to remember
//! how long the log was when they were created.

#[derive(Debug, Clone, Copy)]
struct MarkEdit {
    slot: usize,
    previous: Option<u32>,
}

#[derive(Default)]
pub struct EffectLog {
    edits: Vec<MarkEdit>,
}

impl EffectLog {
    pub fn new() -> Self {
        Self { edits: Vec::new() }
    }

    pub fn watermark(&self) -> usize {
        self.edits.len()
    }

    pub fn record(&mut self, slot: usize, previous: Option<u32>) {
        self.edits.push(MarkEdit { slot, previous });
    }

    /// Undoes every edit recorded since `watermark`, applying marks
    /// mutations in LIFO order, and drops the log back to that length.
    pub fn unwind_to(&mut self, watermark: usize, marks: &mut [Option<u32>]) {
        while self.edits.len() > watermark {
            let edit = self.edits.pop().expect("checked len above");
            marks[edit.slot] = edit.previous;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unwind_restores_previous_values_in_order() {
        let mut marks = vec![None, None];
        let mut log = EffectLog::new();
        let wm = log.watermark();
        log.record(0, marks[0]);
        marks[0] = Some(3);
        log.record(0, marks[0]);
        marks[0] = Some(7);
        log.unwind_to(wm, &mut marks);
        assert_eq!(marks[0], None);
    }
}
