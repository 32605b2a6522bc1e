use crate::cli::{Commands, GxJob};
use gxjob::client::Client;
use gxjob::config::Config;
use std::time::Duration;

pub mod cancel;
pub mod completion;
pub mod list;
pub mod metrics;
pub mod problems;
pub mod rerun;
pub mod show;
pub mod wait;

#[cfg(test)]
pub mod testing;

pub async fn handle_commands(args: GxJob) -> anyhow::Result<()> {
    if let Commands::Completion { shell } = args.command {
        return completion::handle_completion(shell);
    }

    args.command.validate()?;

    let config = gxjob::config::load_config(args.config.as_ref())?;
    let client = connect(&config, args.profile.as_deref())?;
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match args.command {
        Commands::List(list_args) => list::handle_list(&client, list_args, &mut out).await,
        Commands::Show(show_args) => show::handle_show(&client, show_args, &mut out).await,
        Commands::Wait(wait_args) => {
            let interval = Duration::from_secs(config.wait.interval_secs);
            let mut pacer = wait::WallClock::start();
            wait::handle_wait(&client, wait_args, interval, &mut pacer, &mut out).await
        }
        Commands::Metrics(metrics_args) => {
            metrics::handle_metrics(&client, metrics_args, &mut out).await
        }
        Commands::Cancel(cancel_args) => {
            cancel::handle_cancel(&client, cancel_args, &mut out).await
        }
        Commands::Problems(problems_args) => {
            problems::handle_problems(&client, problems_args, &mut out).await
        }
        Commands::Rerun(rerun_args) => rerun::handle_rerun(&client, rerun_args, &mut out).await,
        Commands::Completion { .. } => Ok(()),
    }
}

fn connect(config: &Config, profile: Option<&str>) -> anyhow::Result<Client> {
    let context = config.context(profile)?;
    tracing::debug!("Connecting to the Galaxy server at {}", context.url);
    Client::build(&context)
}
