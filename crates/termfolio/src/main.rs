#![forbid(unsafe_code)]

//! termfolio binary entry point.

use clap::Parser;
use termfolio::cli::{self, Cli};

fn main() {
    let cli = Cli::parse();
    if let Err(err) = cli::run(&cli) {
        eprintln!("termfolio: {err}");
        std::process::exit(1);
    }
}
