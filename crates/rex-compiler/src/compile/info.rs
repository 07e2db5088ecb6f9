//! Static analysis over the parse tree feeding the `INFO` block's search
//! hints (spec.md §4.5): a lower bound on how many code points a match must
//! consume, and — when the pattern's very first atom is simple enough to
//! say something useful about it — either a fixed literal prefix (with its
//! KMP overlap table, so the search driver can skip ahead on a partial
//! mismatch the way a textbook string search would) or a one-code-point
//! membership charset.
//!
//! This is a deliberately narrower analysis than a production regex engine
//! would carry (no multi-branch prefix intersection, no charset first-set
//! across alternations): it covers the common "pattern starts with a run of
//! plain characters" and "pattern starts with one character class" cases
//! spec.md's search driver names, and falls back to `flags = 0` (no hint,
//! `match` tried at every position) otherwise. Recorded as a deliberate
//! trim in DESIGN.md, not a silent omission.

use rex_bytecode::charset::build_charset;
use rex_bytecode::opcode::UNBOUNDED;

use crate::parser::node::{ClassItem, Node};

pub struct PatternInfo {
    pub min_len: u32,
    pub max_len: u32,
    pub prefix: Vec<u32>,
    pub charset: Option<[u32; 8]>,
}

pub fn analyze(root: &Node) -> PatternInfo {
    let (min_len, max_len) = length_bounds(root);
    let prefix = literal_prefix(root);
    let charset = if prefix.is_empty() { first_charset(root) } else { None };
    PatternInfo {
        min_len,
        max_len,
        prefix,
        charset,
    }
}

/// `(min, max)` code points a match of `node` must/may consume. `max` uses
/// [`UNBOUNDED`] once any unbounded repeat is reachable from `node`.
fn length_bounds(node: &Node) -> (u32, u32) {
    match node {
        Node::Empty | Node::At(_) | Node::Assert { .. } => (0, 0),
        Node::Literal { .. } | Node::Any | Node::Category(_) | Node::CharClass(_) => (1, 1),
        // A backreference's length depends on a group this static pass
        // doesn't evaluate; `0` is a safe (if loose) lower bound, and its
        // upper bound is left unbounded.
        Node::GroupRef { .. } => (0, UNBOUNDED),
        Node::Concat(items) => items.iter().fold((0, 0), |(lo, hi), n| {
            let (l, h) = length_bounds(n);
            (lo + l, add_saturating(hi, h))
        }),
        Node::Alternation(branches) => branches.iter().map(|n| length_bounds(n)).fold(
            (UNBOUNDED, 0),
            |(lo, hi), (l, h)| (lo.min(l), hi.max(h)),
        ),
        Node::Repeat { min, max, body, .. } => {
            let (l, h) = length_bounds(body);
            let lo = min.saturating_mul(l);
            let hi = if *max == UNBOUNDED || h == UNBOUNDED {
                UNBOUNDED
            } else {
                max.saturating_mul(h)
            };
            (lo, hi)
        }
        Node::Group { body, .. } | Node::NonCapturing(body) => length_bounds(body),
    }
}

fn add_saturating(a: u32, b: u32) -> u32 {
    if a == UNBOUNDED || b == UNBOUNDED {
        UNBOUNDED
    } else {
        a.saturating_add(b)
    }
}

/// Walks through the nodes that don't themselves consume a code point
/// (non-capturing groups, a capturing group's body, the first element of a
/// concatenation) to find the run of fixed, case-sensitive literals the
/// pattern must start with.
fn literal_prefix(node: &Node) -> Vec<u32> {
    let mut out = Vec::new();
    collect_prefix(node, &mut out);
    out
}

fn collect_prefix(node: &Node, out: &mut Vec<u32>) -> bool {
    match node {
        Node::Literal { cp, ignore_case: false } => {
            out.push(*cp);
            true
        }
        Node::Group { body, .. } | Node::NonCapturing(body) => collect_prefix(body, out),
        Node::Concat(items) => {
            for item in items.iter() {
                if !collect_prefix(item, out) {
                    return false;
                }
            }
            true
        }
        _ => false,
    }
}

/// If the pattern's first atom is a non-negated, case-sensitive character
/// class whose members are all plain literals below `0x100`, builds the
/// `CHARSET` bitmap the search driver can test a candidate start position
/// against without invoking the matcher.
fn first_charset(node: &Node) -> Option<[u32; 8]> {
    match node {
        Node::Group { body, .. } | Node::NonCapturing(body) => first_charset(body),
        Node::Concat(items) => items.first().and_then(|n| first_charset(n)),
        Node::CharClass(class) if !class.negate && !class.ignore_case => {
            let mut members = Vec::new();
            for item in class.items {
                match item {
                    ClassItem::Literal(cp) if *cp < 0x100 => members.push(*cp),
                    _ => return None,
                }
            }
            Some(build_charset(&members))
        }
        _ => None,
    }
}

/// Classic KMP failure function: `overlap[i]` is the length of the longest
/// proper prefix of `prefix[..=i]` that is also a suffix of it.
pub fn kmp_overlap(prefix: &[u32]) -> Vec<u32> {
    let mut overlap = vec![0u32; prefix.len()];
    let mut k = 0u32;
    for i in 1..prefix.len() {
        while k > 0 && prefix[i] != prefix[k as usize] {
            k = overlap[(k - 1) as usize];
        }
        if prefix[i] == prefix[k as usize] {
            k += 1;
        }
        overlap[i] = k;
    }
    overlap
}

#[cfg(test)]
mod tests {
    use super::*;
    use rex_core::Arena;

    fn cps(s: &str) -> Vec<u32> {
        s.chars().map(|c| c as u32).collect()
    }

    #[test]
    fn kmp_overlap_of_aaab() {
        let prefix: Vec<u32> = "aaab".chars().map(|c| c as u32).collect();
        assert_eq!(kmp_overlap(&prefix), vec![0, 1, 2, 0]);
    }

    #[test]
    fn length_bounds_of_literal_repeat() {
        let arena = Arena::new();
        let out = crate::parser::parse(&arena, &cps("a*"), false).unwrap();
        let (lo, hi) = length_bounds(out.root);
        assert_eq!(lo, 0);
        assert_eq!(hi, UNBOUNDED);
    }

    #[test]
    fn literal_prefix_stops_at_first_non_literal() {
        let arena = Arena::new();
        let out = crate::parser::parse(&arena, &cps("abc.def"), false).unwrap();
        let info = analyze(out.root);
        assert_eq!(info.prefix, vec!['a' as u32, 'b' as u32, 'c' as u32]);
    }
}
