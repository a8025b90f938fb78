#![warn(clippy::all)]

use clap::Parser;
use cli::Cli;
use tracing_subscriber::EnvFilter;

mod cli;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let program = match Cli::try_parse() {
        Ok(program) => program,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };
    if let Err(e) = program.run() {
        eprintln!("{e}");
        std::process::exit(1);
    }
}
