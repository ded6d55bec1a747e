//! Periodic driver that re-runs the program from its start nodes.
//!
//! Every tick clears the dataflow cache and then runs one control-flow pass
//! per registered start node, in registration order. Ticks never overlap:
//! the driver runs on a single task, and ticks that come due while a slow
//! pass is still running collapse into one tick fired as soon as it ends.

use crate::engine::{ControlFlowEngine, DataflowEngine};
use crate::error::EngineError;
use crate::graph::NodeId;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};

mod config;

pub use config::SchedulerConfig;

/// Host callback told about every failed pass.
pub type ErrorReporter = Arc<dyn Fn(NodeId, &EngineError) + Send + Sync>;

/// Outcome of one tick.
#[derive(Debug, Default)]
pub struct TickReport {
    /// Number of passes run, one per start node.
    pub passes: usize,
    /// The start nodes whose pass failed, with the error that aborted it.
    pub failures: Vec<(NodeId, EngineError)>,
}

impl TickReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Totals accumulated by a scheduler since it was created.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SchedulerStats {
    pub ticks: u64,
    pub passes: u64,
    pub failures: u64,
}

#[derive(Default)]
struct Counters {
    ticks: AtomicU64,
    passes: AtomicU64,
    failures: AtomicU64,
}

impl Counters {
    fn record(&self, report: &TickReport) {
        self.ticks.fetch_add(1, Ordering::Relaxed);
        self.passes
            .fetch_add(report.passes as u64, Ordering::Relaxed);
        self.failures
            .fetch_add(report.failures.len() as u64, Ordering::Relaxed);
    }

    fn snapshot(&self) -> SchedulerStats {
        SchedulerStats {
            ticks: self.ticks.load(Ordering::Relaxed),
            passes: self.passes.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
        }
    }
}

pub struct Scheduler {
    dataflow: Arc<DataflowEngine>,
    control: Arc<ControlFlowEngine>,
    start_nodes: Vec<NodeId>,
    config: SchedulerConfig,
    counters: Arc<Counters>,
    reporter: Option<ErrorReporter>,
}

impl Scheduler {
    pub fn new(
        dataflow: Arc<DataflowEngine>,
        control: Arc<ControlFlowEngine>,
        config: SchedulerConfig,
    ) -> Self {
        Self {
            dataflow,
            control,
            start_nodes: Vec::new(),
            config,
            counters: Arc::new(Counters::default()),
            reporter: None,
        }
    }

    pub fn with_start_node(mut self, node_id: NodeId) -> Self {
        self.add_start_node(node_id);
        self
    }

    pub fn add_start_node(&mut self, node_id: NodeId) {
        if !self.start_nodes.contains(&node_id) {
            self.start_nodes.push(node_id);
        }
    }

    pub fn with_error_reporter<F>(mut self, reporter: F) -> Self
    where
        F: Fn(NodeId, &EngineError) + Send + Sync + 'static,
    {
        self.reporter = Some(Arc::new(reporter));
        self
    }

    pub fn start_nodes(&self) -> &[NodeId] {
        &self.start_nodes
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    pub fn stats(&self) -> SchedulerStats {
        self.counters.snapshot()
    }

    /// Runs one reset-then-execute round.
    ///
    /// A failing pass is logged and reported, and the remaining start nodes
    /// still run.
    pub async fn tick(&self) -> TickReport {
        self.dataflow.reset();

        let mut report = TickReport::default();
        for &start in &self.start_nodes {
            report.passes += 1;
            if let Err(e) = self.control.execute(start).await {
                error!(start = %start, error = %e, "Control-flow pass failed");
                if let Some(reporter) = &self.reporter {
                    reporter(start, &e);
                }
                report.failures.push((start, e));
            }
        }

        self.counters.record(&report);
        debug!(
            passes = report.passes,
            failures = report.failures.len(),
            "Tick finished"
        );
        report
    }

    /// Spawns the periodic driver on the current tokio runtime.
    ///
    /// The first tick fires one period after the call. Dropping the returned
    /// handle stops the driver as well.
    pub fn start(self) -> SchedulerHandle {
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();
        let counters = self.counters.clone();
        let period = self.config.period();

        let task = tokio::spawn(async move {
            let mut ticker = time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            info!(
                period_ms = period.as_millis() as u64,
                start_nodes = self.start_nodes.len(),
                "Scheduler started"
            );

            loop {
                tokio::select! {
                    biased;
                    _ = &mut shutdown_rx => {
                        info!("Scheduler shutting down");
                        break;
                    }
                    _ = ticker.tick() => {
                        let report = self.tick().await;
                        if self.config.stop_on_error && !report.is_clean() {
                            warn!(
                                failures = report.failures.len(),
                                "Stopping scheduler after a failed tick"
                            );
                            break;
                        }
                    }
                }
            }
        });

        SchedulerHandle {
            shutdown: Some(shutdown_tx),
            task,
            counters,
        }
    }
}

/// Controls a running scheduler.
pub struct SchedulerHandle {
    shutdown: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
    counters: Arc<Counters>,
}

impl SchedulerHandle {
    pub fn stats(&self) -> SchedulerStats {
        self.counters.snapshot()
    }

    /// Whether the driver has exited, either through [`stop`](Self::stop)
    /// or because `stop_on_error` ended it.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Stops the driver. A pass already in progress runs to completion
    /// first; no further tick starts afterwards.
    pub async fn stop(mut self) -> SchedulerStats {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Err(e) = (&mut self.task).await {
            error!(error = %e, "Scheduler task ended abnormally");
        }
        self.counters.snapshot()
    }
}
