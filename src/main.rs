//! # Clouds Generator CLI
//!
//! Binary entry point for `clouds-gen`. Parses arguments with `clap`, runs
//! the selected mode and maps failures onto the documented exit codes. The
//! generation logic itself lives in the `clouds_gen` library crate.

mod cli;

use clap::Parser;

fn main() {
    let cli = cli::Cli::parse();
    let code = cli.execute();
    std::process::exit(code);
}
