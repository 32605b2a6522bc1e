use crate::cli::ListArgs;
use anyhow::Result;
use gxjob::client::{JobApi, JobFilter};
use gxjob::error::CliError;
use gxjob::utils::find_history;
use std::io::Write;

pub async fn handle_list<A: JobApi>(api: &A, args: ListArgs, out: &mut dyn Write) -> Result<()> {
    match &args.state {
        Some(state) => tracing::debug!("Getting jobs with state {}", state),
        None => tracing::debug!("Getting full job list"),
    }

    let history_id = match &args.history {
        Some(history) => match find_history(api, history).await? {
            Some(id) => Some(id),
            None => return Err(CliError::not_found("No such history").into()),
        },
        None => None,
    };

    let filter = JobFilter {
        state: args.state,
        history_id,
        user_id: args.user,
    };
    let jobs = api.get_jobs(&filter).await?;

    tracing::debug!("Iterating over job list with {} items", jobs.len());
    for job in &jobs {
        writeln!(out, "{}", job.summary_line())?;
    }
    Ok(())
}
