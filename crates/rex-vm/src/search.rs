//! Turns the `INFO` block's hints into subject positions actually worth
//! trying. Three strategies, most to least specific, mirroring the block's
//! own `PREFIX`/`CHARSET`/neither cases:
//!
//! - a literal prefix: a KMP scan for the prefix itself, since any match
//!   must begin with it;
//! - a one-code-point charset: scan for a subject character the pattern's
//!   first atom could possibly accept;
//! - neither: every position in range is a candidate, tried in order.

use rex_bytecode::charset::charset_contains;
use rex_bytecode::info::InfoBlock;

/// The next subject offset at or after `pos` (and at or before
/// `last_start`) worth attempting a full match from, or `None` if the
/// remaining hint-eligible positions are exhausted.
pub fn next_candidate(info: &InfoBlock<'_>, subject: &[u32], pos: u32, last_start: u32) -> Option<u32> {
    if !info.prefix.is_empty() {
        return kmp_find(info, subject, pos, last_start);
    }
    if let Some(charset) = info.charset {
        let mut p = pos;
        while p <= last_start {
            if charset_contains(charset, subject[p as usize]) {
                return Some(p);
            }
            p += 1;
        }
        return None;
    }
    (pos <= last_start).then_some(pos)
}

/// Knuth-Morris-Pratt search for `info.prefix`'s code points in `subject`,
/// using each entry's precomputed overlap count to skip ahead on a mismatch
/// without rescanning already-matched prefix characters.
fn kmp_find(info: &InfoBlock<'_>, subject: &[u32], pos: u32, last_start: u32) -> Option<u32> {
    let prefix = &info.prefix;
    let mut text_pos = pos as usize;
    let mut matched = 0usize;
    while text_pos < subject.len() {
        if subject[text_pos] == prefix[matched].cp {
            matched += 1;
            text_pos += 1;
            if matched == prefix.len() {
                let start = (text_pos - matched) as u32;
                if start > last_start {
                    return None;
                }
                return Some(start);
            }
        } else if matched == 0 {
            text_pos += 1;
        } else {
            matched = prefix[matched - 1].overlap as usize;
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use rex_bytecode::info::PrefixEntry;

    fn info_with_prefix(s: &str) -> InfoBlock<'static> {
        let cps: Vec<u32> = s.chars().map(|c| c as u32).collect();
        let mut overlaps = vec![0u32; cps.len()];
        for i in 1..cps.len() {
            let mut k = overlaps[i - 1];
            while k > 0 && cps[k as usize] != cps[i] {
                k = overlaps[k as usize - 1];
            }
            if cps[k as usize] == cps[i] {
                k += 1;
            }
            overlaps[i] = k;
        }
        InfoBlock {
            min_len: cps.len() as u32,
            max_len: rex_bytecode::UNBOUNDED,
            prefix: cps
                .into_iter()
                .zip(overlaps)
                .map(|(cp, overlap)| PrefixEntry { cp, overlap })
                .collect(),
            charset: None,
            body_start: 0,
        }
    }

    #[test]
    fn kmp_finds_prefix_past_a_false_start() {
        let info = info_with_prefix("aab");
        let subject: Vec<u32> = "aaaab".chars().map(|c| c as u32).collect();
        let found = next_candidate(&info, &subject, 0, subject.len() as u32 - 1);
        assert_eq!(found, Some(2));
    }

    #[test]
    fn kmp_returns_none_when_absent() {
        let info = info_with_prefix("xyz");
        let subject: Vec<u32> = "aaaab".chars().map(|c| c as u32).collect();
        assert_eq!(next_candidate(&info, &subject, 0, subject.len() as u32 - 1), None);
    }
}
