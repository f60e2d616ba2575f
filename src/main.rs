use std::process::ExitCode;

use clap::Parser;
use serverstarter_lib::cli::Cli;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    serverstarter_lib::run(Cli::parse()).await
}
