use clap::Parser;
use stocksig::cli::{Cli, run};
use stocksig::logging::init_logging;

fn main() -> std::process::ExitCode {
    init_logging();
    run(Cli::parse())
}
