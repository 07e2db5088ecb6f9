pub mod common;
pub mod dump_cmd;
pub mod match_cmd;
pub mod search_cmd;
