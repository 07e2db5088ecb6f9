//! Renders a parsed [`Node`] tree back to readable text, one line per node,
//! indented by nesting depth. This is the "dump" half of spec.md §6's
//! `dump` operation — the pre-serialization instruction listing spec.md
//! names is, in this crate, actually a tree printer: there is no
//! intermediate `InstructionIr` worth rendering separately from either the
//! tree above it or the serialized `Code[]` below it (see
//! [`crate::compile::dump_tree`] for the latter), so this is the one
//! genuinely distinct "before serialisation" view spec.md's table asks for.

use std::fmt::Write as _;

use super::node::{ClassItem, Node};

pub fn dump_node(root: &Node) -> String {
    let mut out = String::new();
    write_node(&mut out, root, 0);
    out
}

fn indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str("  ");
    }
}

fn write_node(out: &mut String, node: &Node, depth: usize) {
    indent(out, depth);
    match node {
        Node::Empty => {
            let _ = writeln!(out, "Empty");
        }
        Node::Literal { cp, ignore_case } => {
            let ch = char::from_u32(*cp).unwrap_or('\u{fffd}');
            let _ = writeln!(out, "Literal {ch:?} ignore_case={ignore_case}");
        }
        Node::Any => {
            let _ = writeln!(out, "Any");
        }
        Node::Category(cat) => {
            let _ = writeln!(out, "Category {cat:?}");
        }
        Node::CharClass(class) => {
            let _ = writeln!(out, "CharClass negate={} ignore_case={}", class.negate, class.ignore_case);
            for item in class.items {
                indent(out, depth + 1);
                match item {
                    ClassItem::Literal(cp) => {
                        let ch = char::from_u32(*cp).unwrap_or('\u{fffd}');
                        let _ = writeln!(out, "{ch:?}");
                    }
                    ClassItem::Range(lo, hi) => {
                        let lo_ch = char::from_u32(*lo).unwrap_or('\u{fffd}');
                        let hi_ch = char::from_u32(*hi).unwrap_or('\u{fffd}');
                        let _ = writeln!(out, "{lo_ch:?}-{hi_ch:?}");
                    }
                    ClassItem::Category(cat) => {
                        let _ = writeln!(out, "{cat:?}");
                    }
                }
            }
        }
        Node::Concat(items) => {
            let _ = writeln!(out, "Concat");
            for item in items.iter() {
                write_node(out, item, depth + 1);
            }
        }
        Node::Alternation(branches) => {
            let _ = writeln!(out, "Alternation");
            for branch in branches.iter() {
                write_node(out, branch, depth + 1);
            }
        }
        Node::Repeat { min, max, greedy, body } => {
            let _ = writeln!(out, "Repeat min={min} max={max} greedy={greedy}");
            write_node(out, body, depth + 1);
        }
        Node::Group { number, body } => {
            let _ = writeln!(out, "Group #{number}");
            write_node(out, body, depth + 1);
        }
        Node::NonCapturing(body) => {
            let _ = writeln!(out, "NonCapturing");
            write_node(out, body, depth + 1);
        }
        Node::At(code) => {
            let _ = writeln!(out, "At {code:?}");
        }
        Node::GroupRef { number, ignore_case } => {
            let _ = writeln!(out, "GroupRef #{number} ignore_case={ignore_case}");
        }
        Node::Assert { negate, body } => {
            let _ = writeln!(out, "Assert negate={negate}");
            write_node(out, body, depth + 1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use rex_core::Arena;

    #[test]
    fn dumps_nested_repeat_over_group() {
        let arena = Arena::new();
        let cps: Vec<u32> = "(ab)+".chars().map(|c| c as u32).collect();
        let out = parse(&arena, &cps, false).unwrap();
        let text = dump_node(out.root);
        assert!(text.starts_with("Repeat"));
        assert!(text.contains("Group #1"));
        assert!(text.contains("Concat"));
    }

    #[test]
    fn dumps_plain_literal() {
        let arena = Arena::new();
        let cps: Vec<u32> = "a".chars().map(|c| c as u32).collect();
        let out = parse(&arena, &cps, false).unwrap();
        assert_eq!(dump_node(out.root), "Literal 'a' ignore_case=false\n");
    }
}
