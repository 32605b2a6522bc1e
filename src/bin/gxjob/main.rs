mod cli;
mod commands;

use clap::Parser;
use gxjob::error::CliError;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let args = cli::GxJob::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(args.verbosity.tracing_level_filter())
        .init();

    match commands::handle_commands(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => match err.downcast_ref::<CliError>() {
            Some(cli_err) => {
                println!("ERROR: {cli_err}");
                ExitCode::from(cli_err.exit_code())
            }
            None => {
                eprintln!("{err:?}");
                ExitCode::from(1)
            }
        },
    }
}
