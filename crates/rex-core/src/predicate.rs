//! Character classification backing the `CATEGORY` opcode and `\d \s \w`
//! escapes. Each classifier comes in three variants, matching the `AT`/
//! `CATEGORY` sub-code table: `Ascii` only ever looks at the ASCII
//! subrange, `Loc` is defined to behave like `Ascii` (this crate has no
//! C-locale equivalent to defer to), and `Uni` delegates to `char`'s own
//! Unicode-aware classification.

/// One of the three classification modes a `CATEGORY` sub-code selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Ascii,
    /// Behaves identically to `Ascii`; kept distinct so call sites read the
    /// same as the opcode table rather than silently aliasing the variant.
    Loc,
    Uni,
}

fn code_point_to_char(cp: u32) -> Option<char> {
    char::from_u32(cp)
}

pub fn is_digit(cp: u32, mode: Mode) -> bool {
    match mode {
        Mode::Ascii | Mode::Loc => (b'0' as u32..=b'9' as u32).contains(&cp),
        Mode::Uni => code_point_to_char(cp).is_some_and(|c| c.is_numeric()),
    }
}

pub fn is_space(cp: u32, mode: Mode) -> bool {
    match mode {
        Mode::Ascii | Mode::Loc => matches!(cp, 0x09..=0x0d | 0x20),
        Mode::Uni => code_point_to_char(cp).is_some_and(|c| c.is_whitespace()),
    }
}

pub fn is_word(cp: u32, mode: Mode) -> bool {
    match mode {
        Mode::Ascii | Mode::Loc => {
            cp == b'_' as u32
                || (b'0' as u32..=b'9' as u32).contains(&cp)
                || (b'a' as u32..=b'z' as u32).contains(&cp)
                || (b'A' as u32..=b'Z' as u32).contains(&cp)
        }
        Mode::Uni => cp == b'_' as u32 || code_point_to_char(cp).is_some_and(|c| c.is_alphanumeric()),
    }
}

pub fn is_alnum(cp: u32, mode: Mode) -> bool {
    match mode {
        Mode::Ascii | Mode::Loc => {
            (b'0' as u32..=b'9' as u32).contains(&cp)
                || (b'a' as u32..=b'z' as u32).contains(&cp)
                || (b'A' as u32..=b'Z' as u32).contains(&cp)
        }
        Mode::Uni => code_point_to_char(cp).is_some_and(|c| c.is_alphanumeric()),
    }
}

/// Code points `ANY` (without the `ANY_ALL` flag) and `AT_END`/`AT_END_LINE`
/// treat as line terminators.
pub fn is_linebreak(cp: u32) -> bool {
    matches!(cp, 0x0a | 0x0d | 0x0b | 0x0c | 0x85 | 0x2028 | 0x2029)
}

/// Case-folds a single code point the way `_IGNORE` opcodes compare: the
/// first code point of its Unicode lowercase mapping, or itself if it has
/// none. Used on both sides of an `_IGNORE` comparison — once by the
/// compiler when it lowers the pattern's own literal operand, and once by
/// the matcher on every subject character it compares against it.
pub fn fold_case(cp: u32) -> u32 {
    match char::from_u32(cp) {
        Some(c) => c.to_lowercase().next().map(|c| c as u32).unwrap_or(cp),
        None => cp,
    }
}

#[cfg(test)]
mod fold_tests {
    use super::fold_case;

    #[test]
    fn folds_ascii_upper_to_lower() {
        assert_eq!(fold_case('A' as u32), 'a' as u32);
    }

    #[test]
    fn leaves_lowercase_and_non_letters_alone() {
        assert_eq!(fold_case('a' as u32), 'a' as u32);
        assert_eq!(fold_case('7' as u32), '7' as u32);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_digit_rejects_non_ascii_digits() {
        assert!(is_digit('7' as u32, Mode::Ascii));
        assert!(!is_digit('٧' as u32, Mode::Ascii));
    }

    #[test]
    fn unicode_digit_accepts_other_scripts() {
        assert!(is_digit('٧' as u32, Mode::Uni));
    }

    #[test]
    fn loc_matches_ascii_for_word() {
        for cp in 0u32..128 {
            assert_eq!(is_word(cp, Mode::Loc), is_word(cp, Mode::Ascii));
        }
    }

    #[test]
    fn linebreak_includes_unicode_separators() {
        assert!(is_linebreak(0x2028));
        assert!(!is_linebreak('a' as u32));
    }
}
