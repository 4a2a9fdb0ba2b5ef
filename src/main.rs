use clap::Parser;
use quantdsl::cli::{run, Cli};

fn main() -> std::process::ExitCode {
    run(Cli::parse())
}
