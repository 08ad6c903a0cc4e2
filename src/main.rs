//! tdd - scenario mining and test running for TDD agents
//!
//! Mines describe/it scenarios out of a TypeScript test suite and runs the
//! suite, reporting results in a form an agent can act on.

use clap::Parser;
use commands::Commands;
use tdd::cli::Outcome;
use tdd::common::logging;
use tdd::{cli, commands};

#[derive(Parser)]
#[command(name = "tdd", about = "Scenario mining and test runs for TDD workflows")]
#[command(version, long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::init_cli(cli.verbose);

    match cli::dispatch(cli.command).await {
        Ok(Outcome::Success) => {}
        Ok(Outcome::TestsFailed) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}
