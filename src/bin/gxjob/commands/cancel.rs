use crate::cli::{CancelArgs, CancelTarget};
use anyhow::Result;
use gxjob::client::{JobApi, JobFilter};
use gxjob::error::CliError;
use gxjob::utils::find_history;
use std::io::Write;

pub async fn handle_cancel<A: JobApi>(
    api: &A,
    args: CancelArgs,
    out: &mut dyn Write,
) -> Result<()> {
    let job_ids = match args.target()? {
        CancelTarget::Jobs(job_ids) => job_ids,
        CancelTarget::Filter { state, history } => {
            let history_id = match history {
                Some(history) => match find_history(api, &history).await? {
                    Some(id) => Some(id),
                    None => return Err(CliError::not_found("No such history").into()),
                },
                None => None,
            };
            let filter = JobFilter {
                state,
                history_id,
                user_id: None,
            };
            api.get_jobs(&filter)
                .await?
                .into_iter()
                .map(|job| job.id)
                .collect()
        }
    };

    for job_id in &job_ids {
        if api.cancel_job(job_id).await? {
            writeln!(out, "Job {job_id} canceled")?;
        } else {
            writeln!(
                out,
                "ERROR: Unable to cancel {job_id}, job was already in a terminal state."
            )?;
        }
    }
    Ok(())
}
