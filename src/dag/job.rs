// src/dag/job.rs

use tracing::debug;

use crate::errors::DagError;
use crate::jslog::JobEvent;

/// Execution state of a single workflow job.
///
/// `Successful` and `Failed` are terminal: the engine never revives a job,
/// and delivering any further event to a terminal job is a fatal
/// consistency error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum JobState {
    Unready,
    Ready,
    Prescript,
    Queued,
    Running,
    Postscript,
    Successful,
    Failed,
}

impl JobState {
    pub fn is_terminal(self) -> bool {
        matches!(self, JobState::Successful | JobState::Failed)
    }

    /// Upper-case name as it appears in logs and reports.
    pub fn as_str(self) -> &'static str {
        match self {
            JobState::Unready => "UNREADY",
            JobState::Ready => "READY",
            JobState::Prescript => "PRESCRIPT",
            JobState::Queued => "QUEUED",
            JobState::Running => "RUNNING",
            JobState::Postscript => "POSTSCRIPT",
            JobState::Successful => "SUCCESSFUL",
            JobState::Failed => "FAILED",
        }
    }
}

impl std::fmt::Display for JobState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single node of the workflow graph.
///
/// `parents` and `children` hold job *names*: non-owning handles into the
/// DAG's job table, kept mutually consistent by construction. Identity and
/// topology are fixed at load time; only `state` mutates afterwards.
#[derive(Debug, Clone)]
pub struct Job {
    pub name: String,
    /// Estimated execution duration in seconds; 0.0 when unknown.
    pub runtime: f64,
    pub state: JobState,
    pub has_prescript: bool,
    pub has_postscript: bool,
    pub parents: Vec<String>,
    pub children: Vec<String>,
}

impl Job {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            runtime: 0.0,
            state: JobState::Unready,
            has_prescript: false,
            has_postscript: false,
            parents: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Apply one lifecycle event to this job and return the resulting state.
    ///
    /// Events not in the transition table are informational markers and
    /// leave the state unchanged. When the job has a postscript, the main
    /// execution's success/failure events are swallowed: the postscript's
    /// outcome finalizes the job instead.
    pub fn apply_event(&mut self, event: JobEvent) -> Result<JobState, DagError> {
        if self.state.is_terminal() {
            return Err(DagError::TerminalJob {
                job: self.name.clone(),
                state: self.state,
                event,
            });
        }

        let next = match event {
            JobEvent::PreScriptStarted => JobState::Prescript,
            JobEvent::PreScriptFailure => JobState::Failed,
            JobEvent::Submit => JobState::Queued,
            JobEvent::Execute => JobState::Running,
            JobEvent::JobSuccess if !self.has_postscript => JobState::Successful,
            JobEvent::JobFailure if !self.has_postscript => JobState::Failed,
            JobEvent::PostScriptStarted => JobState::Postscript,
            JobEvent::PostScriptSuccess => JobState::Successful,
            JobEvent::PostScriptFailure => JobState::Failed,
            // Informational markers, plus main-job outcomes deferred to the
            // postscript: no state change.
            JobEvent::PreScriptTerminated
            | JobEvent::PreScriptSuccess
            | JobEvent::JobTerminated
            | JobEvent::PostScriptTerminated
            | JobEvent::JobSuccess
            | JobEvent::JobFailure => self.state,
        };

        if next != self.state {
            debug!(job = %self.name, from = %self.state, to = %next, "job state transition");
            self.state = next;
        }

        Ok(self.state)
    }
}
