//! The owned, compiled form of a pattern: a flat `Code[]` word stream plus
//! the bookkeeping the matcher needs but the instruction stream itself
//! doesn't carry (how many capturing groups exist).

use crate::opcode::Code;

/// Magic bytes stamped at the front of a serialized [`Program`]. Only
/// consulted by the optional `postcard` round-trip below; the in-memory
/// `Program` itself carries no header.
pub const MAGIC: [u8; 4] = *b"RXG1";
pub const VERSION: u16 = 1;

/// A fully compiled, ready-to-execute pattern.
///
/// `code[code.len() - 1]` is always `Opcode::Success`; the matcher relies
/// on this as its final fallback rather than bounds-checking every fetch.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Program {
    pub code: Box<[Code]>,
    pub groups_num: u16,
    /// Reserved for named-group lookup; this parser never assigns names,
    /// so every entry is `None`. Kept so `group_id_by_name` has a real
    /// field to consult rather than being permanently unimplemented.
    pub group_names: Vec<Option<Box<str>>>,
}

impl Program {
    pub fn new(code: Box<[Code]>, groups_num: u16) -> Self {
        let group_names = vec![None; groups_num as usize];
        Self {
            code,
            groups_num,
            group_names,
        }
    }

    pub fn group_id_by_name(&self, name: &str) -> Option<u16> {
        self.group_names
            .iter()
            .position(|n| n.as_deref() == Some(name))
            .map(|i| i as u16)
    }

    /// Serializes to the crate's portable wire format: a fixed header
    /// followed by a `postcard`-encoded body. Purely an ambient
    /// "persist a compiled program" capability; the matcher never reads
    /// this format directly, only the in-memory `Program`.
    pub fn to_bytes(&self) -> Result<Vec<u8>, crate::error::ModuleError> {
        let mut out = Vec::with_capacity(8);
        out.extend_from_slice(&MAGIC);
        out.extend_from_slice(&VERSION.to_le_bytes());
        out.extend_from_slice(&0u16.to_le_bytes());
        let body = postcard::to_allocvec(self).map_err(|_| crate::error::ModuleError::Corrupt)?;
        out.extend_from_slice(&body);
        Ok(out)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, crate::error::ModuleError> {
        if bytes.len() < 8 {
            return Err(crate::error::ModuleError::FileTooSmall(bytes.len()));
        }
        if bytes[0..4] != MAGIC {
            return Err(crate::error::ModuleError::InvalidMagic);
        }
        let version = u16::from_le_bytes([bytes[4], bytes[5]]);
        if version != VERSION {
            return Err(crate::error::ModuleError::UnsupportedVersion(version as u32));
        }
        postcard::from_bytes(&bytes[8..]).map_err(|_| crate::error::ModuleError::Corrupt)
    }
}

/// A successful match against a subject: the overall span plus each
/// capturing group's span, indexed by group number starting at 1 (group 0
/// is the overall span, available separately as `start`/`end`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    pub start: u32,
    pub end: u32,
    pub groups: Vec<Option<(u32, u32)>>,
}

impl Match {
    /// Group 0 is the whole match; groups 1..=groups_num are the
    /// capturing groups in left-paren order.
    pub fn group(&self, index: usize) -> Option<(u32, u32)> {
        if index == 0 {
            Some((self.start, self.end))
        } else {
            self.groups.get(index - 1).copied().flatten()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::opcode::Opcode;

    #[test]
    fn round_trips_through_bytes() {
        let code: Box<[Code]> = vec![Opcode::Success as Code].into_boxed_slice();
        let prog = Program::new(code, 0);
        let bytes = prog.to_bytes().unwrap();
        let back = Program::from_bytes(&bytes).unwrap();
        assert_eq!(prog, back);
    }

    #[test]
    fn rejects_bad_magic() {
        let err = Program::from_bytes(&[0, 0, 0, 0, 1, 0, 0, 0]).unwrap_err();
        assert!(matches!(err, crate::error::ModuleError::InvalidMagic));
    }

    #[test]
    fn group_zero_is_overall_span() {
        let m = Match {
            start: 0,
            end: 4,
            groups: vec![Some((1, 2))],
        };
        assert_eq!(m.group(0), Some((0, 4)));
        assert_eq!(m.group(1), Some((1, 2)));
        assert_eq!(m.group(2), None);
    }
}
