mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();
    match cli.command {
        Commands::Match(args) => commands::match_cmd::run(args),
        Commands::Search(args) => commands::search_cmd::run(args),
        Commands::Dump(args) => commands::dump_cmd::run(args),
    }
}
