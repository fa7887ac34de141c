//! Empacar CLI — script packaging for Rust workflows.

use clap::Parser;

fn main() {
    let cli = empacar::cli::Cli::parse();
    if let Err(e) = empacar::cli::dispatch(cli.command) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
