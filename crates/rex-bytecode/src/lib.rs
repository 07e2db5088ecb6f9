#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! The binary instruction format shared by the compiler and the matcher,
//! plus the owned, disposable `Program`/`Match` types built on top of it.

pub mod charset;
pub mod dump;
pub mod error;
pub mod info;
pub mod opcode;
pub mod program;

pub use error::ModuleError;
pub use info::{InfoBlock, PrefixEntry, decode_info};
pub use opcode::{AtCode, CategoryCode, Code, Opcode, UNBOUNDED, info_flag};
pub use program::{MAGIC, Match, Program, VERSION};
