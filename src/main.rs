use clap::Parser;
use indexboard::cli::{run, Cli};

fn main() -> std::process::ExitCode {
    run(Cli::parse())
}
