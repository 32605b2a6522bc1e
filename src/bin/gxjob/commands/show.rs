use crate::cli::ShowArgs;
use anyhow::Result;
use gxjob::client::JobApi;
use gxjob::error::CliError;
use gxjob::utils::write_json;
use std::io::Write;

pub async fn handle_show<A: JobApi>(api: &A, args: ShowArgs, out: &mut dyn Write) -> Result<()> {
    let job_id = args.job_id()?;
    let job = api
        .show_job(job_id, true)
        .await?
        .ok_or_else(|| CliError::not_found(format!("Job {job_id} not found.")))?;
    write_json(out, &job)
}
