use crate::cli::ProblemsArgs;
use anyhow::Result;
use gxjob::client::JobApi;
use gxjob::utils::write_json;
use std::io::Write;

pub async fn handle_problems<A: JobApi>(
    api: &A,
    args: ProblemsArgs,
    out: &mut dyn Write,
) -> Result<()> {
    let job_id = args.job_id()?;
    let problems = api.get_common_problems(job_id).await?;
    write_json(out, &problems)
}
