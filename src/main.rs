use clap::Parser;
use stockdash::cli::{run, Cli};

fn main() -> std::process::ExitCode {
    stockdash::logging::init();
    run(Cli::parse())
}
