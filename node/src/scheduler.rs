//! Periodic execution of the governance tasks.
//!
//! One loop, one task at a time: every tick runs each ready task to
//! completion in registration order, then sleeps for the loop quantum.
//! A failing task is logged and the remaining tasks of the tick still run.

use std::time::Duration;

use tokio::sync::broadcast;
use tracing::Instrument;

use sentinel_chain::ChainClient;
use sentinel_governance::{GovernanceError, Sentinel, SuperblockOutcome};
use sentinel_store::Store;
use sentinel_types::{Clock, Timestamp};

use crate::config::SchedulerConfig;
use crate::tracing_spans::{task_span, tick_span};

/// A single governance operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    Ingest,
    BuildSuperblock,
    AutoVote,
    ProcessEvents,
}

/// What a scheduled task runs when it is ready.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Job {
    Single(Step),
    /// Runs every step in order on each invocation. The sequence stops at
    /// the first step that fails.
    Sequence(Vec<Step>),
}

impl Job {
    fn steps(&self) -> &[Step] {
        match self {
            Self::Single(step) => std::slice::from_ref(step),
            Self::Sequence(steps) => steps,
        }
    }
}

/// A job with a minimum re-run interval.
#[derive(Clone, Debug)]
pub struct ScheduledTask {
    pub name: &'static str,
    pub job: Job,
    /// Seconds between runs; 0 means ready on every tick.
    pub period_secs: u64,
    pub last_run: Option<Timestamp>,
}

impl ScheduledTask {
    pub fn new(name: &'static str, job: Job, period_secs: u64) -> Self {
        Self {
            name,
            job,
            period_secs,
            last_run: None,
        }
    }

    pub fn is_ready(&self, now: Timestamp) -> bool {
        self.period_secs == 0
            || self
                .last_run
                .is_none_or(|last| last.elapsed_since(now) >= self.period_secs)
    }
}

/// Names of the tasks that ran and failed during one tick.
#[derive(Debug, Default)]
pub struct TickReport {
    pub ran: Vec<&'static str>,
    pub failed: Vec<(&'static str, GovernanceError)>,
}

/// The cooperative task loop.
pub struct Scheduler<K> {
    tasks: Vec<ScheduledTask>,
    clock: K,
    quantum: Duration,
    ticks: u64,
}

impl<K: Clock> Scheduler<K> {
    pub fn new(clock: K, quantum: Duration) -> Self {
        Self {
            tasks: Vec::new(),
            clock,
            quantum,
            ticks: 0,
        }
    }

    /// The standard task set: the governance sequence (ingest, build
    /// superblock, auto-vote) followed by the outbox.
    pub fn from_config(config: &SchedulerConfig, clock: K) -> Self {
        let mut scheduler = Self::new(clock, Duration::from_secs(config.loop_quantum_secs));
        scheduler.register(ScheduledTask::new(
            "governance",
            Job::Sequence(vec![Step::Ingest, Step::BuildSuperblock, Step::AutoVote]),
            config.governance_period_secs,
        ));
        scheduler.register(ScheduledTask::new(
            "outbox",
            Job::Single(Step::ProcessEvents),
            config.election_period_secs,
        ));
        scheduler
    }

    pub fn register(&mut self, task: ScheduledTask) {
        self.tasks.push(task);
    }

    pub fn tasks(&self) -> &[ScheduledTask] {
        &self.tasks
    }

    pub fn clock(&self) -> &K {
        &self.clock
    }

    /// Run every ready task once.
    pub async fn tick<S: Store, C: ChainClient>(&mut self, sentinel: &Sentinel<S, C>) -> TickReport {
        let now = self.clock.now();
        self.ticks += 1;
        let mut report = TickReport::default();

        let span = tick_span(self.ticks, now.as_secs());
        for task in &mut self.tasks {
            if !task.is_ready(now) {
                continue;
            }
            task.last_run = Some(now);
            report.ran.push(task.name);

            let result = run_job(sentinel, &task.job, now)
                .instrument(task_span(task.name))
                .instrument(span.clone())
                .await;
            if let Err(e) = result {
                tracing::error!(task = task.name, error = %e, "task failed");
                report.failed.push((task.name, e));
            }
        }
        report
    }

    /// Tick until `shutdown` fires. Shutdown is only observed between ticks.
    pub async fn run<S: Store, C: ChainClient>(
        &mut self,
        sentinel: &Sentinel<S, C>,
        mut shutdown: broadcast::Receiver<()>,
    ) {
        tracing::info!(
            tasks = self.tasks.len(),
            quantum_secs = self.quantum.as_secs(),
            "scheduler started"
        );
        loop {
            self.tick(sentinel).await;
            tokio::select! {
                biased;
                _ = shutdown.recv() => {
                    tracing::info!(ticks = self.ticks, "scheduler shutting down");
                    break;
                }
                _ = tokio::time::sleep(self.quantum) => {}
            }
        }
    }
}

async fn run_job<S: Store, C: ChainClient>(
    sentinel: &Sentinel<S, C>,
    job: &Job,
    now: Timestamp,
) -> Result<(), GovernanceError> {
    for step in job.steps() {
        tracing::debug!(?step, "running step");
        run_step(sentinel, *step, now).await?;
    }
    Ok(())
}

async fn run_step<S: Store, C: ChainClient>(
    sentinel: &Sentinel<S, C>,
    step: Step,
    now: Timestamp,
) -> Result<(), GovernanceError> {
    match step {
        Step::Ingest => {
            let report = sentinel.ingest(now).await?;
            tracing::debug!(
                inserted = report.inserted,
                refreshed = report.refreshed,
                undecodable = report.undecodable,
                "ingest pass complete"
            );
        }
        Step::BuildSuperblock => match sentinel.build_superblock(now).await? {
            SuperblockOutcome::NotDue { height, blocks_left } => {
                tracing::debug!(height, blocks_left, "superblock not due");
            }
            outcome => tracing::debug!(?outcome, "superblock pass complete"),
        },
        Step::AutoVote => {
            let report = sentinel.auto_vote().await?;
            tracing::debug!(
                voted = report.voted.len(),
                failed = report.failed.len(),
                "vote pass complete"
            );
        }
        Step::ProcessEvents => {
            let report = sentinel.process_events(now).await?;
            tracing::debug!(
                prepared = report.prepared,
                submitted = report.submitted,
                errored = report.errored,
                waiting = report.waiting,
                "outbox pass complete"
            );
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sentinel_governance::GovernanceParams;
    use sentinel_nullables::{NullChain, NullClock, NullStore};
    use sentinel_types::NetworkId;

    const START: u64 = 1_700_000_000;

    fn sentinel() -> Sentinel<NullStore, NullChain> {
        Sentinel::new(
            NullStore::new(),
            NullChain::new(),
            GovernanceParams::default(),
            NetworkId::Test,
        )
        .unwrap()
    }

    fn scheduler(governance: u64, outbox: u64) -> Scheduler<NullClock> {
        let config = SchedulerConfig {
            loop_quantum_secs: 1,
            governance_period_secs: governance,
            election_period_secs: outbox,
        };
        Scheduler::from_config(&config, NullClock::new(START))
    }

    #[test]
    fn zero_period_is_always_ready() {
        let mut task = ScheduledTask::new("t", Job::Single(Step::AutoVote), 0);
        let now = Timestamp::new(START);
        assert!(task.is_ready(now));
        task.last_run = Some(now);
        assert!(task.is_ready(now));
    }

    #[test]
    fn task_is_ready_once_period_elapsed() {
        let mut task = ScheduledTask::new("t", Job::Single(Step::AutoVote), 30);
        assert!(task.is_ready(Timestamp::new(START)));
        task.last_run = Some(Timestamp::new(START));
        assert!(!task.is_ready(Timestamp::new(START + 29)));
        assert!(task.is_ready(Timestamp::new(START + 30)));
    }

    #[test]
    fn default_task_order() {
        let s = scheduler(30, 0);
        let names: Vec<&str> = s.tasks().iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["governance", "outbox"]);
        assert_eq!(
            s.tasks()[0].job,
            Job::Sequence(vec![Step::Ingest, Step::BuildSuperblock, Step::AutoVote])
        );
    }

    #[tokio::test]
    async fn periods_gate_runs_and_last_run_advances() {
        let s = sentinel();
        let mut sched = scheduler(30, 0);

        let first = sched.tick(&s).await;
        assert_eq!(first.ran, vec!["governance", "outbox"]);
        assert!(first.failed.is_empty());
        assert_eq!(sched.tasks()[0].last_run, Some(Timestamp::new(START)));

        sched.clock().advance(10);
        let second = sched.tick(&s).await;
        assert_eq!(second.ran, vec!["outbox"]);

        sched.clock().advance(20);
        let third = sched.tick(&s).await;
        assert_eq!(third.ran, vec!["governance", "outbox"]);
        assert_eq!(sched.tasks()[0].last_run, Some(Timestamp::new(START + 30)));
    }

    #[tokio::test]
    async fn failing_task_does_not_stop_the_tick() {
        let s = sentinel();
        s.chain().set_offline(true);
        let mut sched = scheduler(0, 0);
        sched.register(ScheduledTask::new("after", Job::Single(Step::ProcessEvents), 0));

        let report = sched.tick(&s).await;
        assert_eq!(report.ran, vec!["governance", "outbox", "after"]);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, "governance");
        assert!(matches!(report.failed[0].1, GovernanceError::Chain(_)));
    }

    #[tokio::test]
    async fn run_stops_on_shutdown() {
        let s = sentinel();
        let mut sched = scheduler(0, 0);
        let controller = crate::ShutdownController::new();
        let rx = controller.subscribe();
        controller.shutdown();
        sched.run(&s, rx).await;
        assert!(sched.tasks()[0].last_run.is_some());
    }
}
