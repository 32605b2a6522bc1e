use crate::config::ServerContext;
use crate::core::job::{History, Job, JobMetric, JobState};
use anyhow::{bail, Context};
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client as ReqwestClient, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};

/// Filters accepted by the job index endpoint. Unset fields are not sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobFilter {
    pub state: Option<JobState>,
    pub history_id: Option<String>,
    pub user_id: Option<String>,
}

impl JobFilter {
    pub fn history(history_id: impl Into<String>) -> Self {
        Self {
            history_id: Some(history_id.into()),
            ..Default::default()
        }
    }
}

/// The remote operations the command handlers rely on.
#[allow(async_fn_in_trait)]
pub trait JobApi {
    async fn get_jobs(&self, filter: &JobFilter) -> anyhow::Result<Vec<Job>>;

    /// `None` when the server does not know the job.
    async fn show_job(&self, job_id: &str, full_details: bool) -> anyhow::Result<Option<Job>>;

    async fn get_metrics(&self, job_id: &str) -> anyhow::Result<Vec<JobMetric>>;

    /// `false` when the job was already in a terminal state.
    async fn cancel_job(&self, job_id: &str) -> anyhow::Result<bool>;

    async fn get_common_problems(&self, job_id: &str) -> anyhow::Result<Value>;

    async fn rerun_job(&self, job_id: &str, remap: bool) -> anyhow::Result<Value>;

    async fn show_history(&self, history_id: &str) -> anyhow::Result<Option<History>>;

    async fn find_histories(&self, name: &str) -> anyhow::Result<Vec<History>>;
}

#[derive(Debug, Clone)]
pub struct Client {
    client: ReqwestClient,
    base_url: String,
}

/// Subset of the `build_for_rerun` response needed to resubmit a job.
#[derive(Debug, Deserialize)]
struct RerunParams {
    /// Tool ID
    id: String,
    history_id: String,
    #[serde(default)]
    job_remap: Option<Value>,
    #[serde(default)]
    state_inputs: Map<String, Value>,
}

impl RerunParams {
    fn remappable(&self) -> bool {
        match &self.job_remap {
            Some(Value::Bool(b)) => *b,
            Some(Value::String(s)) => !s.is_empty(),
            _ => false,
        }
    }
}

/// Tool request that runs the job again with its original inputs.
fn rerun_payload(params: RerunParams, job_id: &str, remap: bool) -> anyhow::Result<Value> {
    let remappable = params.remappable();
    let mut inputs = params.state_inputs;
    if remap {
        if !remappable {
            bail!("Remap was requested, but job {job_id} is not remappable");
        }
        inputs.insert("rerun_remap_job_id".to_string(), Value::from(job_id));
    }

    Ok(serde_json::json!({
        "history_id": params.history_id,
        "tool_id": params.id,
        "inputs": inputs,
        "input_format": "legacy",
    }))
}

impl Client {
    pub fn build(server: &ServerContext) -> anyhow::Result<Self> {
        crate::tls::ensure_rustls_provider_installed();

        let mut headers = HeaderMap::new();
        if let Some(key) = &server.key {
            let mut value = HeaderValue::from_str(key).context("Invalid API key")?;
            value.set_sensitive(true);
            headers.insert("x-api-key", value);
        }

        let client = ReqwestClient::builder()
            .user_agent(format!("gxjob/{}", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .build()
            .context("Failed to build HTTP client")?;
        let base_url = format!("{}/api", server.url.trim_end_matches('/'));
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn read_json<T: DeserializeOwned>(response: Response, what: &str) -> anyhow::Result<T> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            bail!("Failed to {what}: HTTP {status}: {body}");
        }
        response
            .json::<T>()
            .await
            .with_context(|| format!("Failed to parse response to {what}"))
    }

    /// Like `read_json`, but treats the statuses Galaxy uses for unknown or
    /// malformed IDs as "not there".
    async fn read_optional_json<T: DeserializeOwned>(
        response: Response,
        what: &str,
    ) -> anyhow::Result<Option<T>> {
        match response.status() {
            StatusCode::NOT_FOUND | StatusCode::BAD_REQUEST => Ok(None),
            _ => Self::read_json(response, what).await.map(Some),
        }
    }
}

impl JobApi for Client {
    async fn get_jobs(&self, filter: &JobFilter) -> anyhow::Result<Vec<Job>> {
        tracing::debug!("Listing jobs with {:?}", filter);
        let mut query = vec![];
        if let Some(state) = &filter.state {
            query.push(("state", state.to_string()));
        }
        if let Some(history_id) = &filter.history_id {
            query.push(("history_id", history_id.clone()));
        }
        if let Some(user_id) = &filter.user_id {
            query.push(("user_id", user_id.clone()));
        }

        let response = self
            .client
            .get(format!("{}/jobs", self.base_url))
            .query(&query)
            .send()
            .await
            .context("Failed to send list jobs request")?;
        Self::read_json(response, "list jobs").await
    }

    async fn show_job(&self, job_id: &str, full_details: bool) -> anyhow::Result<Option<Job>> {
        tracing::debug!("Getting job {} (full={})", job_id, full_details);
        let response = self
            .client
            .get(format!("{}/jobs/{}", self.base_url, job_id))
            .query(&[("full", full_details)])
            .send()
            .await
            .context("Failed to send get job request")?;
        Self::read_optional_json(response, "get job").await
    }

    async fn get_metrics(&self, job_id: &str) -> anyhow::Result<Vec<JobMetric>> {
        tracing::debug!("Getting metrics for job {}", job_id);
        let response = self
            .client
            .get(format!("{}/jobs/{}/metrics", self.base_url, job_id))
            .send()
            .await
            .context("Failed to send get metrics request")?;
        Self::read_json(response, "get job metrics").await
    }

    async fn cancel_job(&self, job_id: &str) -> anyhow::Result<bool> {
        tracing::debug!("Cancelling job {}", job_id);
        let response = self
            .client
            .delete(format!("{}/jobs/{}", self.base_url, job_id))
            .send()
            .await
            .context("Failed to send cancel job request")?;
        Self::read_json(response, "cancel job").await
    }

    async fn get_common_problems(&self, job_id: &str) -> anyhow::Result<Value> {
        tracing::debug!("Getting common problems for job {}", job_id);
        let response = self
            .client
            .get(format!("{}/jobs/{}/common_problems", self.base_url, job_id))
            .send()
            .await
            .context("Failed to send common problems request")?;
        Self::read_json(response, "get common problems").await
    }

    async fn rerun_job(&self, job_id: &str, remap: bool) -> anyhow::Result<Value> {
        tracing::debug!("Rerunning job {} (remap={})", job_id, remap);
        let response = self
            .client
            .get(format!("{}/jobs/{}/build_for_rerun", self.base_url, job_id))
            .send()
            .await
            .context("Failed to send build for rerun request")?;
        let params: RerunParams = Self::read_json(response, "build job for rerun").await?;

        let payload = rerun_payload(params, job_id, remap)?;
        let response = self
            .client
            .post(format!("{}/tools", self.base_url))
            .json(&payload)
            .send()
            .await
            .context("Failed to send rerun request")?;
        Self::read_json(response, "rerun job").await
    }

    async fn show_history(&self, history_id: &str) -> anyhow::Result<Option<History>> {
        let response = self
            .client
            .get(format!("{}/histories/{}", self.base_url, history_id))
            .send()
            .await
            .context("Failed to send get history request")?;
        Self::read_optional_json(response, "get history").await
    }

    async fn find_histories(&self, name: &str) -> anyhow::Result<Vec<History>> {
        let response = self
            .client
            .get(format!("{}/histories", self.base_url))
            .query(&[("q", "name"), ("qv", name)])
            .send()
            .await
            .context("Failed to send find histories request")?;
        Self::read_json(response, "find histories").await
    }
}
