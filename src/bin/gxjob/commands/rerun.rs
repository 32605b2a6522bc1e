use crate::cli::RerunArgs;
use anyhow::Result;
use gxjob::client::JobApi;
use gxjob::utils::write_json;
use std::io::Write;

pub async fn handle_rerun<A: JobApi>(api: &A, args: RerunArgs, out: &mut dyn Write) -> Result<()> {
    let job_id = args.job_id()?;
    let result = api.rerun_job(job_id, args.remap).await?;
    write_json(out, &result)
}
