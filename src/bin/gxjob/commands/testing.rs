//! In-memory stand-in for a Galaxy server used by the command tests.

use crate::cli::{Commands, GxJob};
use clap::Parser;
use gxjob::client::{JobApi, JobFilter};
use gxjob::core::job::{History, Job, JobMetric, JobState};
use serde_json::{json, Map, Value};
use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};

pub fn job(id: &str, state: JobState, tool_id: &str) -> Job {
    Job {
        id: id.to_string(),
        state,
        update_time: "2024-05-01T10:00:00".to_string(),
        tool_id: tool_id.to_string(),
        extra: Map::new(),
    }
}

pub fn job_in(id: &str, state: JobState, tool_id: &str, history_id: &str) -> Job {
    let mut job = job(id, state, tool_id);
    job.extra
        .insert("history_id".to_string(), Value::from(history_id));
    job
}

pub fn history(id: &str, name: &str) -> History {
    History {
        id: id.to_string(),
        name: name.to_string(),
        extra: Map::new(),
    }
}

pub fn metric(name: &str, value: &str, raw_value: &str) -> JobMetric {
    JobMetric {
        name: name.to_string(),
        value: Value::from(value),
        raw_value: Value::from(raw_value),
        extra: Map::new(),
    }
}

pub fn parse(argv: &[&str]) -> Commands {
    GxJob::try_parse_from(argv).unwrap().command
}

#[derive(Default)]
pub struct FakeGalaxy {
    pub jobs: RefCell<Vec<Job>>,
    pub histories: Vec<History>,
    pub metrics: HashMap<String, Vec<JobMetric>>,
    /// States handed out by successive `show_job` calls, per job
    pub scripted_states: RefCell<HashMap<String, VecDeque<JobState>>>,
    pub show_calls: Cell<usize>,
    pub cancel_calls: RefCell<Vec<String>>,
    pub rerun_calls: RefCell<Vec<(String, bool)>>,
}

impl FakeGalaxy {
    pub fn with_jobs(jobs: Vec<Job>) -> Self {
        Self {
            jobs: RefCell::new(jobs),
            ..Default::default()
        }
    }

    pub fn script_states(&self, job_id: &str, states: Vec<JobState>) {
        self.scripted_states
            .borrow_mut()
            .insert(job_id.to_string(), states.into());
    }
}

impl JobApi for FakeGalaxy {
    async fn get_jobs(&self, filter: &JobFilter) -> anyhow::Result<Vec<Job>> {
        Ok(self
            .jobs
            .borrow()
            .iter()
            .filter(|j| filter.state.as_ref().is_none_or(|s| &j.state == s))
            .filter(|j| {
                filter
                    .history_id
                    .as_ref()
                    .is_none_or(|h| j.extra.get("history_id") == Some(&json!(h)))
            })
            .filter(|j| {
                filter
                    .user_id
                    .as_ref()
                    .is_none_or(|u| j.extra.get("user_id") == Some(&json!(u)))
            })
            .cloned()
            .collect())
    }

    async fn show_job(&self, job_id: &str, _full_details: bool) -> anyhow::Result<Option<Job>> {
        self.show_calls.set(self.show_calls.get() + 1);
        let next_state = self
            .scripted_states
            .borrow_mut()
            .get_mut(job_id)
            .and_then(|states| states.pop_front());

        let mut jobs = self.jobs.borrow_mut();
        let Some(job) = jobs.iter_mut().find(|j| j.id == job_id) else {
            return Ok(None);
        };
        if let Some(state) = next_state {
            job.state = state;
        }
        Ok(Some(job.clone()))
    }

    async fn get_metrics(&self, job_id: &str) -> anyhow::Result<Vec<JobMetric>> {
        Ok(self.metrics.get(job_id).cloned().unwrap_or_default())
    }

    async fn cancel_job(&self, job_id: &str) -> anyhow::Result<bool> {
        self.cancel_calls.borrow_mut().push(job_id.to_string());
        let mut jobs = self.jobs.borrow_mut();
        match jobs.iter_mut().find(|j| j.id == job_id) {
            Some(job) if !job.state.is_terminal() && job.state != JobState::Deleted => {
                job.state = JobState::Deleting;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn get_common_problems(&self, job_id: &str) -> anyhow::Result<Value> {
        Ok(json!({
            "has_duplicate_inputs": false,
            "has_empty_inputs": job_id == "empty",
        }))
    }

    async fn rerun_job(&self, job_id: &str, remap: bool) -> anyhow::Result<Value> {
        self.rerun_calls
            .borrow_mut()
            .push((job_id.to_string(), remap));
        Ok(json!({"jobs": [{"id": format!("{job_id}-rerun"), "state": "new"}]}))
    }

    async fn show_history(&self, history_id: &str) -> anyhow::Result<Option<History>> {
        Ok(self.histories.iter().find(|h| h.id == history_id).cloned())
    }

    async fn find_histories(&self, name: &str) -> anyhow::Result<Vec<History>> {
        Ok(self
            .histories
            .iter()
            .filter(|h| h.name == name)
            .cloned()
            .collect())
    }
}
