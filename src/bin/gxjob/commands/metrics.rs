use crate::cli::{MetricsArgs, MetricsTarget};
use anyhow::Result;
use gxjob::client::{JobApi, JobFilter};
use gxjob::core::job::MetricsBundle;
use gxjob::error::CliError;
use gxjob::utils::write_json;
use serde_json::Value;
use std::io::Write;

const SUMMARY_METRICS: [&str; 3] = ["galaxy_slots", "galaxy_memory_mb", "runtime_seconds"];

pub async fn handle_metrics<A: JobApi>(
    api: &A,
    args: MetricsArgs,
    out: &mut dyn Write,
) -> Result<()> {
    let bundles = match args.target()? {
        MetricsTarget::Job(job_id) => {
            let job = api
                .show_job(&job_id, false)
                .await?
                .ok_or_else(|| CliError::not_found(format!("Job {job_id} not found.")))?;
            vec![MetricsBundle::new(&job, api.get_metrics(&job_id).await?)]
        }
        MetricsTarget::History(history_id) => {
            tracing::debug!("Getting metrics for jobs from history {}", history_id);
            let jobs = api.get_jobs(&JobFilter::history(history_id)).await?;
            let mut bundles = Vec::with_capacity(jobs.len());
            for job in &jobs {
                bundles.push(MetricsBundle::new(job, api.get_metrics(&job.id).await?));
            }
            bundles
        }
    };

    if args.summary {
        write_summary(out, &bundles)
    } else {
        write_json(out, &bundles)
    }
}

/// One CSV row per job with the resources it used.
fn write_summary(out: &mut dyn Write, bundles: &[MetricsBundle]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(out);
    wtr.write_record(std::iter::once("job_id").chain(SUMMARY_METRICS))?;
    for bundle in bundles {
        let mut record = vec![bundle.job_id.clone()];
        record.extend(SUMMARY_METRICS.iter().map(|name| {
            bundle
                .metric(name)
                .map(|m| cell(m.value()))
                .unwrap_or_default()
        }));
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}

fn cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
