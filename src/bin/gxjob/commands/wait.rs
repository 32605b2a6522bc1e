use crate::cli::WaitArgs;
use anyhow::Result;
use gxjob::client::JobApi;
use gxjob::core::job::Job;
use gxjob::error::CliError;
use gxjob::utils::write_json;
use std::io::Write;
use std::time::{Duration, Instant};

/// Source of elapsed time and sleeps for the polling loop.
#[allow(async_fn_in_trait)]
pub trait Pacer {
    fn elapsed(&self) -> Duration;
    async fn pause(&mut self, interval: Duration);
}

pub struct WallClock {
    start: Instant,
}

impl WallClock {
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Pacer for WallClock {
    fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    async fn pause(&mut self, interval: Duration) {
        tokio::time::sleep(interval).await;
    }
}

pub async fn handle_wait<A: JobApi, P: Pacer>(
    api: &A,
    args: WaitArgs,
    interval: Duration,
    pacer: &mut P,
    out: &mut dyn Write,
) -> Result<()> {
    let job_id = args.job_id()?;
    let job = poll_until_done(api, job_id, args.timeout(), interval, pacer).await?;
    write_json(out, &job)
}

/// Polls the job until it is `ok` or `error`, or until `timeout` has passed.
///
/// The first poll happens immediately. There is always a full `interval`
/// between two polls, even when the timeout is shorter than that.
pub async fn poll_until_done<A: JobApi, P: Pacer>(
    api: &A,
    job_id: &str,
    timeout: Option<Duration>,
    interval: Duration,
    pacer: &mut P,
) -> Result<Job> {
    loop {
        let job = api
            .show_job(job_id, false)
            .await?
            .ok_or_else(|| CliError::not_found(format!("Job {job_id} not found.")))?;

        let timed_out = timeout.is_some_and(|timeout| pacer.elapsed() >= timeout);
        if timed_out {
            tracing::info!("Timed out waiting for job {} ({})", job_id, job.state);
            return Ok(job);
        }
        if job.state.is_terminal() {
            return Ok(job);
        }

        tracing::debug!(
            "Job {} is {}, checking again in {}s",
            job_id,
            job.state,
            interval.as_secs()
        );
        pacer.pause(interval).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Commands;
    use crate::commands::testing::{job, parse, FakeGalaxy};
    use gxjob::core::job::JobState;

    const INTERVAL: Duration = Duration::from_secs(15);

    /// Advances time only when asked to pause.
    #[derive(Default)]
    struct SimulatedClock {
        now: Duration,
        pauses: usize,
    }

    impl Pacer for SimulatedClock {
        fn elapsed(&self) -> Duration {
            self.now
        }

        async fn pause(&mut self, interval: Duration) {
            self.now += interval;
            self.pauses += 1;
        }
    }

    fn running_forever(polls: usize) -> Vec<JobState> {
        vec![JobState::Running; polls]
    }

    #[tokio::test]
    async fn terminal_state_stops_without_sleeping_again() {
        for terminal in [JobState::Ok, JobState::Error] {
            let api = FakeGalaxy::with_jobs(vec![job("j1", JobState::Queued, "cat1")]);
            api.script_states(
                "j1",
                vec![JobState::Queued, JobState::Running, terminal.clone()],
            );
            let mut clock = SimulatedClock::default();

            let done = poll_until_done(&api, "j1", None, INTERVAL, &mut clock)
                .await
                .unwrap();
            assert_eq!(done.state, terminal);
            assert_eq!(api.show_calls.get(), 3);
            assert_eq!(clock.pauses, 2);
        }
    }

    #[tokio::test]
    async fn already_finished_job_returns_immediately() {
        let api = FakeGalaxy::with_jobs(vec![job("j1", JobState::Ok, "cat1")]);
        let mut clock = SimulatedClock::default();
        poll_until_done(&api, "j1", Some(Duration::from_secs(1)), INTERVAL, &mut clock)
            .await
            .unwrap();
        assert_eq!(api.show_calls.get(), 1);
        assert_eq!(clock.pauses, 0);
    }

    #[tokio::test]
    async fn no_timeout_keeps_polling() {
        let api = FakeGalaxy::with_jobs(vec![job("j1", JobState::Running, "cat1")]);
        let mut states = running_forever(1000);
        states.push(JobState::Ok);
        api.script_states("j1", states);
        let mut clock = SimulatedClock::default();

        let done = poll_until_done(&api, "j1", None, INTERVAL, &mut clock)
            .await
            .unwrap();
        assert_eq!(done.state, JobState::Ok);
        assert_eq!(clock.pauses, 1000);
        assert_eq!(clock.now, INTERVAL * 1000);
    }

    #[tokio::test]
    async fn timeout_stops_on_first_poll_at_or_after_deadline() {
        let api = FakeGalaxy::with_jobs(vec![job("j1", JobState::Running, "cat1")]);
        api.script_states("j1", running_forever(100));
        let mut clock = SimulatedClock::default();

        let done = poll_until_done(
            &api,
            "j1",
            Some(Duration::from_secs(40)),
            INTERVAL,
            &mut clock,
        )
        .await
        .unwrap();
        assert_eq!(done.state, JobState::Running);
        // Polls at 0, 15, 30 are before the deadline, 45 is the first after it.
        assert_eq!(api.show_calls.get(), 4);
        assert_eq!(clock.now, Duration::from_secs(45));
    }

    #[tokio::test]
    async fn short_timeout_still_waits_one_full_interval() {
        let api = FakeGalaxy::with_jobs(vec![job("j1", JobState::Running, "cat1")]);
        let mut clock = SimulatedClock::default();

        poll_until_done(&api, "j1", Some(Duration::from_secs(5)), INTERVAL, &mut clock)
            .await
            .unwrap();
        assert_eq!(api.show_calls.get(), 2);
        assert_eq!(clock.now, INTERVAL);
    }

    #[tokio::test]
    async fn missing_job_is_reported_without_polling() {
        let api = FakeGalaxy::default();
        let Commands::Wait(args) = parse(&["gxjob", "wait", "ghost"]) else {
            panic!("expected wait");
        };
        let mut clock = SimulatedClock::default();
        let mut out = Vec::new();

        let err = handle_wait(&api, args, INTERVAL, &mut clock, &mut out)
            .await
            .unwrap_err();
        assert_eq!(
            err.downcast_ref::<CliError>(),
            Some(&CliError::not_found("Job ghost not found."))
        );
        assert_eq!(clock.pauses, 0);
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn prints_final_job() {
        let api = FakeGalaxy::with_jobs(vec![job("j1", JobState::Running, "cat1")]);
        api.script_states("j1", vec![JobState::Running, JobState::Ok]);
        let Commands::Wait(args) = parse(&["gxjob", "wait", "j1", "-t", "0"]) else {
            panic!("expected wait");
        };
        let mut clock = SimulatedClock::default();
        let mut out = Vec::new();

        handle_wait(&api, args, INTERVAL, &mut clock, &mut out)
            .await
            .unwrap();
        let printed: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(printed["id"], "j1");
        assert_eq!(printed["state"], "ok");
    }
}
