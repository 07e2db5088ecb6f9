//! Decodes the `INFO` block every compiled [`crate::Program`] begins with.
//! Shipped as a shared helper so the search driver (`rex-vm`) and the
//! disassembler (`dump`) agree on the block's layout without either one
//! re-deriving it from the opcode table.

use crate::charset::CHARSET_WORDS;
use crate::opcode::{Code, Opcode, UNBOUNDED, info_flag};

/// One entry of the literal-prefix run: a code point and its KMP overlap
/// count (how far to rewind the prefix match on a mismatch here).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrefixEntry {
    pub cp: u32,
    pub overlap: u32,
}

pub struct InfoBlock<'c> {
    pub min_len: u32,
    pub max_len: u32,
    pub prefix: Vec<PrefixEntry>,
    pub charset: Option<&'c [Code]>,
    /// Word offset of the first instruction after this block, i.e. where
    /// the matcher should point its instruction pointer to actually run
    /// the pattern.
    pub body_start: u32,
}

/// Parses the block at `code[0]`. A program that (unusually) doesn't start
/// with `INFO` is treated as carrying no hints at all, with the body
/// starting at word 0.
pub fn decode_info(code: &[Code]) -> InfoBlock<'_> {
    if code.first().copied().and_then(Opcode::from_code) != Some(Opcode::Info) {
        return InfoBlock {
            min_len: 0,
            max_len: UNBOUNDED,
            prefix: Vec::new(),
            charset: None,
            body_start: 0,
        };
    }
    let flags = code[1];
    let min_len = code[2];
    let max_len = code[3];
    let mut consumed = 4usize;
    let mut prefix = Vec::new();
    if flags & info_flag::PREFIX != 0 {
        let prefix_len = code[consumed] as usize;
        consumed += 1;
        for i in 0..prefix_len {
            prefix.push(PrefixEntry {
                cp: code[consumed + i * 2],
                overlap: code[consumed + i * 2 + 1],
            });
        }
        consumed += prefix_len * 2;
    }
    let charset = if flags & info_flag::CHARSET != 0 {
        let block = &code[consumed..consumed + CHARSET_WORDS];
        consumed += CHARSET_WORDS;
        Some(block)
    } else {
        None
    };
    InfoBlock {
        min_len,
        max_len,
        prefix,
        charset,
        body_start: consumed as u32,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charset::build_charset;

    #[test]
    fn decodes_prefix_and_charset() {
        let mut code = vec![Opcode::Info as Code, info_flag::PREFIX | info_flag::CHARSET, 2, 5];
        code.push(2); // prefix_len
        code.push('a' as Code);
        code.push(0);
        code.push('b' as Code);
        code.push(1);
        code.extend_from_slice(&build_charset(&['a' as u32]));
        let info = decode_info(&code);
        assert_eq!(info.min_len, 2);
        assert_eq!(info.max_len, 5);
        assert_eq!(info.prefix.len(), 2);
        assert_eq!(info.prefix[0].cp, 'a' as u32);
        assert!(info.charset.is_some());
        assert_eq!(info.body_start as usize, code.len());
    }

    #[test]
    fn missing_info_block_yields_body_start_zero() {
        let code = [Opcode::Success as Code];
        let info = decode_info(&code);
        assert_eq!(info.body_start, 0);
    }
}
