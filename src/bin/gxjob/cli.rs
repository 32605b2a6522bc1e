use clap::{ArgAction, Parser};
use clap_complete::Shell;
use clap_verbosity_flag::{Verbosity, WarnLevel};
use gxjob::core::job::JobState;
use gxjob::error::CliError;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Parser)]
#[command(
    name = "gxjob",
    author,
    version = gxjob::core::version(),
    about = "Lists, inspects and controls jobs on a Galaxy server."
)]
#[command(styles = gxjob::utils::STYLES)]
pub struct GxJob {
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    #[arg(long, global = true, help = "Path to the config file", hide = true)]
    pub config: Option<PathBuf>,

    /// Named server profile from the config file
    #[arg(long, global = true, value_name = "NAME")]
    pub profile: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Parser)]
pub enum Commands {
    /// List jobs, one tab separated line per job
    #[command(visible_alias = "ls")]
    List(ListArgs),

    /// Show the full details of a job as JSON
    Show(ShowArgs),

    /// Wait for a job to reach the ok or error state
    Wait(WaitArgs),

    /// Print job metrics as JSON
    #[command(disable_help_flag = true)]
    Metrics(MetricsArgs),

    /// Cancel jobs by ID, or every job matching a state or history
    #[command(disable_help_flag = true)]
    Cancel(CancelArgs),

    /// Print the common problems the server detected for a job
    Problems(ProblemsArgs),

    /// Run a job again with the same inputs
    Rerun(RerunArgs),

    /// Generate shell completion scripts
    Completion {
        /// The shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

impl Commands {
    /// Rejects malformed arguments without touching the server.
    pub fn validate(&self) -> Result<(), CliError> {
        match self {
            Commands::Show(args) => args.job_id().map(drop),
            Commands::Wait(args) => args.job_id().map(drop),
            Commands::Metrics(args) => args.target().map(drop),
            Commands::Cancel(args) => args.target().map(drop),
            Commands::Problems(args) => args.job_id().map(drop),
            Commands::Rerun(args) => args.job_id().map(drop),
            Commands::List(_) | Commands::Completion { .. } => Ok(()),
        }
    }
}

#[derive(Debug, Parser)]
pub struct ListArgs {
    #[arg(short, long, help = "List jobs in this state")]
    pub state: Option<JobState>,

    #[arg(long, help = "Show jobs in the given history (name or ID)")]
    pub history: Option<String>,

    #[arg(short, long, help = "Show jobs for this user")]
    pub user: Option<String>,
}

#[derive(Debug, Parser)]
pub struct ShowArgs {
    /// Job ID
    pub job_ids: Vec<String>,
}

impl ShowArgs {
    pub fn job_id(&self) -> Result<&str, CliError> {
        match self.job_ids.as_slice() {
            [job_id] => Ok(job_id),
            _ => Err(CliError::usage("Invalid parameters. Job ID is required")),
        }
    }
}

#[derive(Debug, Parser)]
pub struct WaitArgs {
    /// Job ID
    pub job_id: Option<String>,

    #[arg(
        short,
        long,
        help = "Give up after this many seconds (0 or negative: wait forever)",
        allow_negative_numbers = true,
        default_value = "-1"
    )]
    pub timeout: i64,
}

impl WaitArgs {
    pub fn job_id(&self) -> Result<&str, CliError> {
        self.job_id
            .as_deref()
            .ok_or_else(|| CliError::usage("no job ID provided"))
    }

    pub fn timeout(&self) -> Option<Duration> {
        u64::try_from(self.timeout)
            .ok()
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }
}

#[derive(Debug, Parser)]
pub struct MetricsArgs {
    /// Job ID
    pub job_id: Option<String>,

    #[arg(short = 'h', long, help = "Report every job in this history ID")]
    pub history: Option<String>,

    #[arg(
        long,
        help = "Print galaxy_slots, galaxy_memory_mb and runtime_seconds as CSV"
    )]
    pub summary: bool,

    #[arg(long, action = ArgAction::Help, help = "Print help")]
    pub help: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetricsTarget {
    Job(String),
    History(String),
}

impl MetricsArgs {
    pub fn target(&self) -> Result<MetricsTarget, CliError> {
        match (&self.job_id, &self.history) {
            (None, None) => Err(CliError::usage("no job ID provided")),
            (Some(job_id), None) => Ok(MetricsTarget::Job(job_id.clone())),
            (None, Some(history_id)) => Ok(MetricsTarget::History(history_id.clone())),
            (Some(job_id), Some(_)) => Err(CliError::usage(format!(
                "Unrecognized argument {job_id}"
            ))),
        }
    }
}

#[derive(Debug, Parser)]
pub struct CancelArgs {
    /// Job IDs to cancel
    pub job_ids: Vec<String>,

    #[arg(short, long, help = "Cancel every job in this state")]
    pub state: Option<JobState>,

    #[arg(short = 'h', long, help = "Cancel every job in this history (name or ID)")]
    pub history: Option<String>,

    #[arg(long, action = ArgAction::Help, help = "Print help")]
    pub help: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CancelTarget {
    Jobs(Vec<String>),
    Filter {
        state: Option<JobState>,
        history: Option<String>,
    },
}

impl CancelArgs {
    pub fn target(&self) -> Result<CancelTarget, CliError> {
        let filtered = self.state.is_some() || self.history.is_some();
        match (filtered, self.job_ids.is_empty()) {
            (false, true) => Err(CliError::usage("no job ID provided.")),
            (false, false) => Ok(CancelTarget::Jobs(self.job_ids.clone())),
            (true, true) => Ok(CancelTarget::Filter {
                state: self.state.clone(),
                history: self.history.clone(),
            }),
            (true, false) => Err(CliError::usage(
                "Too many parameters. Either filter by state or history, or list job IDs",
            )),
        }
    }
}

#[derive(Debug, Parser)]
pub struct ProblemsArgs {
    /// Job ID
    pub job_id: Option<String>,
}

impl ProblemsArgs {
    pub fn job_id(&self) -> Result<&str, CliError> {
        self.job_id
            .as_deref()
            .ok_or_else(|| CliError::usage("no job ID provided."))
    }
}

#[derive(Debug, Parser)]
pub struct RerunArgs {
    /// Job ID
    pub job_id: Option<String>,

    #[arg(
        short,
        long,
        help = "Redirect downstream references to the new job's outputs"
    )]
    pub remap: bool,
}

impl RerunArgs {
    pub fn job_id(&self) -> Result<&str, CliError> {
        self.job_id
            .as_deref()
            .ok_or_else(|| CliError::usage("no job ID provided"))
    }
}
