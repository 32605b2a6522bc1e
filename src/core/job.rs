use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use strum::EnumString;

/// Job state as reported by the Galaxy server.
///
/// States the server introduces later are kept verbatim in [`JobState::Other`].
#[derive(Debug, Clone, PartialEq, Eq, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(from = "String", into = "String")]
pub enum JobState {
    New,
    Resubmitted,
    Upload,
    Waiting,
    Queued,
    Running,
    Ok,
    Error,
    Failed,
    Paused,
    Deleting,
    Deleted,
    DeletedNew,
    Stop,
    Stopped,
    Skipped,
    #[strum(default)]
    Other(String),
}

impl JobState {
    pub fn as_str(&self) -> &str {
        match self {
            JobState::New => "new",
            JobState::Resubmitted => "resubmitted",
            JobState::Upload => "upload",
            JobState::Waiting => "waiting",
            JobState::Queued => "queued",
            JobState::Running => "running",
            JobState::Ok => "ok",
            JobState::Error => "error",
            JobState::Failed => "failed",
            JobState::Paused => "paused",
            JobState::Deleting => "deleting",
            JobState::Deleted => "deleted",
            JobState::DeletedNew => "deleted_new",
            JobState::Stop => "stop",
            JobState::Stopped => "stopped",
            JobState::Skipped => "skipped",
            JobState::Other(state) => state,
        }
    }

    /// `ok` and `error` are the only states `wait` stops on.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Ok | JobState::Error)
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for JobState {
    fn from(state: String) -> Self {
        state.parse().unwrap_or(JobState::Other(state))
    }
}

impl From<JobState> for String {
    fn from(state: JobState) -> Self {
        state.as_str().to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: String,
    pub state: JobState,
    #[serde(default)]
    pub update_time: String,
    #[serde(default)]
    pub tool_id: String,

    /// Everything else the server sent (create_time, history_id, inputs, ...)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Job {
    /// Tab separated `id, state, update_time, tool_id`, the `list` line format.
    pub fn summary_line(&self) -> String {
        format!(
            "{}\t{}\t{}\t{}",
            self.id, self.state, self.update_time, self.tool_id
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobMetric {
    pub name: String,
    /// Human readable value, e.g. "2 minutes"
    #[serde(default)]
    pub value: Value,
    #[serde(default)]
    pub raw_value: Value,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl JobMetric {
    /// The value worth reporting: `runtime_seconds` is only useful as the raw
    /// number, everything else uses the formatted value.
    pub fn value(&self) -> &Value {
        if self.name == "runtime_seconds" {
            &self.raw_value
        } else {
            &self.value
        }
    }
}

/// Metrics for a single job together with enough of the job to identify it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsBundle {
    pub job_id: String,
    pub job_state: JobState,
    pub tool_id: String,
    pub job_metrics: Vec<JobMetric>,
}

impl MetricsBundle {
    pub fn new(job: &Job, job_metrics: Vec<JobMetric>) -> Self {
        Self {
            job_id: job.id.clone(),
            job_state: job.state.clone(),
            tool_id: job.tool_id.clone(),
            job_metrics,
        }
    }

    pub fn metric(&self, name: &str) -> Option<&JobMetric> {
        self.job_metrics.iter().find(|m| m.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct History {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
