// src/engine/runtime.rs

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior, interval};
use tracing::{debug, error, info, warn};

use crate::dag::{Dag, JobState};
use crate::jslog::JobStateRecord;

/// Events sent into the monitor from the log reader and signal handler.
#[derive(Debug)]
pub enum MonitorEvent {
    /// One parsed jobstate record, delivered in log order.
    Record(JobStateRecord),
    /// The reader reached end of input (replay-only mode).
    LogClosed,
    ShutdownRequested,
}

/// Options that influence how the monitor behaves.
#[derive(Debug, Clone)]
pub struct MonitorOptions {
    /// How often to log the aggregate workflow state.
    pub report_interval: Duration,
    /// How long the log may stay silent with POSTSCRIPT jobs outstanding
    /// before they are reported as stuck.
    pub stuck_after: Duration,
}

impl Default for MonitorOptions {
    fn default() -> Self {
        Self {
            report_interval: Duration::from_secs(60),
            stuck_after: Duration::from_secs(300),
        }
    }
}

/// The monitor event loop.
///
/// A single consumer applies records to the shared DAG strictly in arrival
/// order, which is what preserves the per-job causal ordering the state
/// machine relies on. Any `DagError` is fatal: the loop stops, the error
/// propagates, and the DAG instance must be considered invalid.
///
/// Snapshot/reporting consumers hold their own `Arc<Dag>` clone and are
/// serialized against this loop only by the DAG's internal mutex.
pub struct Monitor {
    dag: Arc<Dag>,
    options: MonitorOptions,
    events_rx: mpsc::Receiver<MonitorEvent>,
    records_applied: u64,
    last_record_at: Instant,
}

impl Monitor {
    pub fn new(
        dag: Arc<Dag>,
        options: MonitorOptions,
        events_rx: mpsc::Receiver<MonitorEvent>,
    ) -> Self {
        Self {
            dag,
            options,
            events_rx,
            records_applied: 0,
            last_record_at: Instant::now(),
        }
    }

    /// Main event loop.
    pub async fn run(mut self) -> Result<()> {
        info!("shadowdag monitor started");

        let mut report = interval(self.options.report_interval);
        report.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                event = self.events_rx.recv() => {
                    match event {
                        Some(MonitorEvent::Record(record)) => self.handle_record(record)?,
                        Some(MonitorEvent::LogClosed) => {
                            info!(records = self.records_applied, "end of jobstate log");
                            break;
                        }
                        Some(MonitorEvent::ShutdownRequested) | None => {
                            info!("shutdown requested, stopping monitor");
                            break;
                        }
                    }
                }
                _ = report.tick() => self.report(),
            }
        }

        self.report();
        info!("shadowdag monitor exiting");
        Ok(())
    }

    fn handle_record(&mut self, record: JobStateRecord) -> Result<()> {
        debug!(
            job = %record.job,
            event = %record.event,
            ts = record.timestamp,
            "applying jobstate record"
        );

        if let Err(err) = self.dag.apply_record(&record) {
            error!(
                job = %record.job,
                event = %record.event,
                error = %err,
                "fatal consistency error; the workflow view is no longer valid"
            );
            return Err(err.into());
        }

        self.records_applied += 1;
        self.last_record_at = Instant::now();
        Ok(())
    }

    /// Log aggregate workflow state, plus a stuck-postscript warning when
    /// the log has gone quiet with POSTSCRIPT jobs outstanding.
    fn report(&self) {
        let stats = self.dag.aggregate_state();
        let ready = stats.get(&JobState::Ready).copied().unwrap_or(0);
        let summary: Vec<String> = stats.iter().map(|(s, n)| format!("{s}={n}")).collect();

        info!(
            total = self.dag.job_count(),
            ready,
            remaining_runtime = self.dag.remaining_runtime(),
            states = %summary.join(" "),
            "workflow state"
        );

        let postscript = stats.get(&JobState::Postscript).copied().unwrap_or(0);
        if postscript > 0 && self.last_record_at.elapsed() >= self.options.stuck_after {
            // Accepted upstream behavior: a job whose postscript outcome
            // never arrives stays POSTSCRIPT forever. Surface it, don't fix it.
            warn!(
                jobs = postscript,
                quiet_for = ?self.last_record_at.elapsed(),
                "jobs possibly stuck in POSTSCRIPT; no outcome events arriving"
            );
        }
    }
}
