use std::process::ExitCode;

use clap::Parser;
use lorekeep_cli::{CliArgs, LorekeepCli};

#[tokio::main]
async fn main() -> ExitCode {
    let args = CliArgs::parse();

    let result = match LorekeepCli::from_args(&args) {
        Ok(cli) => cli.run(args).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
