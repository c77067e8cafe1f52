//! BlockDupe - Block-Incremental Duplicate File Finder
//!
//! Entry point for the BlockDupe CLI application.

use clap::Parser;

use blockdupe::cli::Cli;
use blockdupe::error::ExitCode;

fn main() {
    let cli = Cli::parse();

    match blockdupe::run_app(cli) {
        Ok(code) => std::process::exit(code.as_i32()),
        Err(err) => {
            eprintln!("[{}] Error: {:#}", ExitCode::GeneralError.code_prefix(), err);
            std::process::exit(ExitCode::GeneralError.as_i32());
        }
    }
}
