//! The instruction word contract: opcode numbering, `AT`/`CATEGORY`
//! sub-codes, and `INFO` flag bits. This table is the one piece of the
//! workspace every other crate treats as a stable, binary interface —
//! the parser and lowering pass (`rex-compiler`) write it, the matcher
//! (`rex-vm`) reads it, and `dump`/`disassemble` below render it back to
//! text.
//!
//! Operand layout per opcode (word 0 is always the opcode itself):
//!
//! ```text
//! FAILURE, SUCCESS, ANY, ANY_ALL, NEGATE        []
//! AT                                            [atcode]
//! CATEGORY                                      [catcode]
//! LITERAL, LITERAL_IGNORE                       [cp]
//! NOT_LITERAL, NOT_LITERAL_IGNORE               [cp]
//! RANGE                                         [lo, hi]
//! CHARSET                                        [bitmap x 8]
//! BIGCHARSET                                    [n_blocks, block_index x 64, blocks x n_blocks*8]
//! IN, IN_IGNORE                                 [skip, set-items..., FAILURE]
//! BRANCH                                        [(offset, code...)+, 0]
//! JUMP                                          [offset]
//! MARK                                          [group_slot]
//! GROUPREF, GROUPREF_IGNORE                     [group]
//! GROUPREF_EXISTS                               [group, offset_to_else]
//! REPEAT, REPEAT_ONE, MIN_REPEAT_ONE            [offset_to_tail, min, max, body..., MAX_UNTIL|MIN_UNTIL]
//! MAX_UNTIL, MIN_UNTIL                          []
//! ASSERT, ASSERT_NOT                            [skip, back, body...]
//! INFO                                          [flags, min_len, max_len, prefix?, charset?]
//! ```
//!
//! Every `offset`/`skip` operand is relative to the position of the
//! opcode word it appears in: `target_pos = op_pos + offset`.

/// A single compiled instruction word. Programs are `Box<[Code]>`; operands
/// follow the opcode word inline, exactly as described per-opcode below.
pub type Code = u32;

macro_rules! opcode_enum {
    ($(($name:ident, $val:expr)),* $(,)?) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[repr(u32)]
        pub enum Opcode {
            $($name = $val),*
        }

        impl Opcode {
            pub fn from_code(code: Code) -> Option<Self> {
                match code {
                    $($val => Some(Opcode::$name),)*
                    _ => None,
                }
            }
        }
    };
}

opcode_enum! {
    (Failure, 0),
    (Success, 1),
    (Any, 2),
    (AnyAll, 3),
    (At, 4),
    (Branch, 5),
    (Category, 6),
    (Charset, 7),
    (BigCharset, 8),
    (GroupRef, 9),
    (GroupRefIgnore, 10),
    (GroupRefExists, 11),
    (In, 12),
    (InIgnore, 13),
    (Info, 14),
    (Jump, 15),
    (Literal, 16),
    (LiteralIgnore, 17),
    (NotLiteral, 18),
    (NotLiteralIgnore, 19),
    (Mark, 20),
    (MaxUntil, 21),
    (MinUntil, 22),
    (Negate, 23),
    (Range, 24),
    (Repeat, 25),
    (RepeatOne, 26),
    (MinRepeatOne, 27),
    (Assert, 28),
    (AssertNot, 29),
}

/// `AT` sub-codes: zero-width position assertions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum AtCode {
    Beginning = 0,
    BeginningLine = 1,
    BeginningString = 2,
    Boundary = 3,
    NonBoundary = 4,
    End = 5,
    EndLine = 6,
    EndString = 7,
    LocBoundary = 8,
    LocNonBoundary = 9,
    UniBoundary = 10,
    UniNonBoundary = 11,
}

impl AtCode {
    pub fn from_code(code: Code) -> Option<Self> {
        use AtCode::*;
        Some(match code {
            0 => Beginning,
            1 => BeginningLine,
            2 => BeginningString,
            3 => Boundary,
            4 => NonBoundary,
            5 => End,
            6 => EndLine,
            7 => EndString,
            8 => LocBoundary,
            9 => LocNonBoundary,
            10 => UniBoundary,
            11 => UniNonBoundary,
            _ => return None,
        })
    }
}

/// `CATEGORY` sub-codes: the `\d \D \s \S \w \W` families plus the
/// linebreak category `.` consults when matching without `ANY_ALL`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum CategoryCode {
    Digit = 0,
    NotDigit = 1,
    Space = 2,
    NotSpace = 3,
    Word = 4,
    NotWord = 5,
    Linebreak = 6,
    NotLinebreak = 7,
    LocWord = 8,
    LocNotWord = 9,
    UniDigit = 10,
    UniNotDigit = 11,
    UniSpace = 12,
    UniNotSpace = 13,
    UniWord = 14,
    UniNotWord = 15,
    UniLinebreak = 16,
    UniNotLinebreak = 17,
}

impl CategoryCode {
    pub fn from_code(code: Code) -> Option<Self> {
        use CategoryCode::*;
        Some(match code {
            0 => Digit,
            1 => NotDigit,
            2 => Space,
            3 => NotSpace,
            4 => Word,
            5 => NotWord,
            6 => Linebreak,
            7 => NotLinebreak,
            8 => LocWord,
            9 => LocNotWord,
            10 => UniDigit,
            11 => UniNotDigit,
            12 => UniSpace,
            13 => UniNotSpace,
            14 => UniWord,
            15 => UniNotWord,
            16 => UniLinebreak,
            17 => UniNotLinebreak,
            _ => return None,
        })
    }
}

/// Bits packed into the flags word of an `INFO` block.
pub mod info_flag {
    use super::Code;

    pub const PREFIX: Code = 1 << 0;
    pub const LITERAL: Code = 1 << 1;
    pub const CHARSET: Code = 1 << 2;
}

/// Sentinel used by `REPEAT`/`MAX_UNTIL` operands for an unbounded upper
/// bound (mirrors the quantifier's own "no cap" encoding).
pub const UNBOUNDED: u32 = 65535;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opcode_round_trips_through_code() {
        assert_eq!(Opcode::from_code(Opcode::Literal as Code), Some(Opcode::Literal));
        assert_eq!(Opcode::from_code(9999), None);
    }

    #[test]
    fn at_code_round_trips() {
        assert_eq!(AtCode::from_code(AtCode::Boundary as Code), Some(AtCode::Boundary));
        assert_eq!(AtCode::from_code(99), None);
    }

    #[test]
    fn category_code_round_trips() {
        assert_eq!(
            CategoryCode::from_code(CategoryCode::UniWord as Code),
            Some(CategoryCode::UniWord)
        );
    }
}
