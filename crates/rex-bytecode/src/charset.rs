//! Bitmap helpers shared by the `CHARSET`/`BIGCHARSET` emitter (in
//! `rex-compiler`) and evaluator (in `rex-vm`), so both sides agree on the
//! exact bit layout without duplicating the arithmetic.

use crate::opcode::Code;

/// Number of `Code` words a `CHARSET` block occupies: one bit per code
/// point in `0..256`.
pub const CHARSET_WORDS: usize = 256 / 32;

/// Number of subblocks a `BIGCHARSET` block index can select among.
pub const BIGCHARSET_BLOCKS: usize = 64;

/// Tests whether `cp` is set in a 256-entry `CHARSET` bitmap. Code points
/// at or above 256 are never members of a plain `CHARSET` (a `BIGCHARSET`
/// is required for those).
pub fn charset_contains(bitmap: &[Code], cp: u32) -> bool {
    if cp >= 256 {
        return false;
    }
    let word = bitmap[(cp / 32) as usize];
    (word >> (cp % 32)) & 1 != 0
}

/// Builds a 256-entry bitmap from an explicit sorted list of member code
/// points, all of which must be `< 256`.
pub fn build_charset(members: &[u32]) -> [Code; CHARSET_WORDS] {
    let mut bitmap = [0u32; CHARSET_WORDS];
    for &cp in members {
        debug_assert!(cp < 256);
        bitmap[(cp / 32) as usize] |= 1 << (cp % 32);
    }
    bitmap
}

/// `BIGCHARSET` trades a single dense 2^21-bit bitmap for a two-level
/// structure: `cp >> 8` selects one of up to 256 top-level entries, each
/// of which names one of `blocks`' 256-bit subblocks (or none, via the
/// sentinel `u8::MAX`), tested the same way `charset_contains` tests a
/// plain `CHARSET`.
pub fn bigcharset_contains(block_index: &[u8], blocks: &[Code], cp: u32) -> bool {
    let high = (cp >> 8) as usize;
    let Some(&block) = block_index.get(high) else {
        return false;
    };
    if block as usize >= BIGCHARSET_BLOCKS {
        return false;
    }
    let low = cp & 0xff;
    let start = block as usize * CHARSET_WORDS;
    charset_contains(&blocks[start..start + CHARSET_WORDS], low)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn charset_round_trips_membership() {
        let bitmap = build_charset(&[0, 31, 32, 255]);
        assert!(charset_contains(&bitmap, 0));
        assert!(charset_contains(&bitmap, 31));
        assert!(charset_contains(&bitmap, 32));
        assert!(charset_contains(&bitmap, 255));
        assert!(!charset_contains(&bitmap, 33));
        assert!(!charset_contains(&bitmap, 300));
    }

    #[test]
    fn bigcharset_looks_up_through_block_index() {
        let mut blocks = vec![0u32; CHARSET_WORDS * 2];
        let sub = build_charset(&[5, 200]);
        blocks[CHARSET_WORDS..2 * CHARSET_WORDS].copy_from_slice(&sub);
        let mut block_index = vec![u8::MAX; 256];
        block_index[0x20] = 1;
        let cp = (0x20 << 8) | 5;
        assert!(bigcharset_contains(&block_index, &blocks, cp));
        assert!(!bigcharset_contains(&block_index, &blocks, (0x20 << 8) | 6));
        assert!(!bigcharset_contains(&block_index, &blocks, (0x21 << 8) | 5));
    }
}
