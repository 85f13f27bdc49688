//! repol: inventory every repository and branch of a GitHub organization
//! and write the result to stdout as a YAML or JSON document.

use clap::Parser;
use std::process::ExitCode;

use repol::cli::{run, Cli};
use repol::utils::init_logging;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.debug);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e:#}");
            ExitCode::FAILURE
        }
    }
}
