//! Argument parsing: one [`clap`] derive tree, `match`/`search`/`dump`
//! subcommands sharing the handful of flags that influence how a pattern
//! compiles (`--ignore-case`, `--dot-all`) or how a match attempt runs
//! (`--fuel`, `--debug`).

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "rex", about = "A Unicode backtracking regex engine", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Test whether `pattern` matches `subject` anchored at a fixed position.
    Match(MatchArgs),
    /// Scan `subject` for the first position `pattern` matches.
    Search(SearchArgs),
    /// Compile `pattern` and print its parse tree or disassembled bytecode.
    Dump(DumpArgs),
}

#[derive(clap::Args)]
pub struct CompileFlags {
    /// Fold ASCII/Unicode case when comparing literals and classes.
    #[arg(short = 'i', long)]
    pub ignore_case: bool,
    /// Let `.` match linebreak code points too.
    #[arg(short = 's', long)]
    pub dot_all: bool,
}

#[derive(clap::Args)]
pub struct RunFlags {
    /// Print a line per dispatched instruction and backtrack to stderr.
    #[arg(long)]
    pub debug: bool,
    /// Dispatched-instruction budget before giving up; `0` disables it.
    #[arg(long, default_value_t = 10_000_000)]
    pub fuel: u64,
    /// Print the match as a JSON object instead of plain text.
    #[arg(long)]
    pub json: bool,
}

#[derive(clap::Args)]
pub struct MatchArgs {
    pub pattern: String,
    pub subject: String,
    /// Code-point offset the match must start at.
    #[arg(long, default_value_t = 0)]
    pub anchor: u32,
    #[command(flatten)]
    pub compile: CompileFlags,
    #[command(flatten)]
    pub run: RunFlags,
}

#[derive(clap::Args)]
pub struct SearchArgs {
    pub pattern: String,
    pub subject: String,
    /// Code-point offset to start scanning from.
    #[arg(long, default_value_t = 0)]
    pub start: u32,
    #[command(flatten)]
    pub compile: CompileFlags,
    #[command(flatten)]
    pub run: RunFlags,
}

#[derive(clap::Args)]
pub struct DumpArgs {
    pub pattern: String,
    /// Print the parsed tree instead of the compiled instruction stream.
    #[arg(long)]
    pub tree: bool,
    #[command(flatten)]
    pub compile: CompileFlags,
}
