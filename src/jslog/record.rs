// src/jslog/record.rs

use std::str::FromStr;

use crate::errors::DagError;

/// One lifecycle event kind as reported by the execution system's
/// jobstate log.
///
/// This is the closed set the engine recognizes. Unrecognized kinds only
/// exist at the text boundary and are fatal there; once parsed, every
/// value is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobEvent {
    PreScriptStarted,
    PreScriptTerminated,
    PreScriptSuccess,
    PreScriptFailure,
    Submit,
    Execute,
    JobTerminated,
    JobSuccess,
    JobFailure,
    PostScriptStarted,
    PostScriptTerminated,
    PostScriptSuccess,
    PostScriptFailure,
}

impl JobEvent {
    /// Upper-snake name as it appears in the log.
    pub fn as_str(self) -> &'static str {
        match self {
            JobEvent::PreScriptStarted => "PRE_SCRIPT_STARTED",
            JobEvent::PreScriptTerminated => "PRE_SCRIPT_TERMINATED",
            JobEvent::PreScriptSuccess => "PRE_SCRIPT_SUCCESS",
            JobEvent::PreScriptFailure => "PRE_SCRIPT_FAILURE",
            JobEvent::Submit => "SUBMIT",
            JobEvent::Execute => "EXECUTE",
            JobEvent::JobTerminated => "JOB_TERMINATED",
            JobEvent::JobSuccess => "JOB_SUCCESS",
            JobEvent::JobFailure => "JOB_FAILURE",
            JobEvent::PostScriptStarted => "POST_SCRIPT_STARTED",
            JobEvent::PostScriptTerminated => "POST_SCRIPT_TERMINATED",
            JobEvent::PostScriptSuccess => "POST_SCRIPT_SUCCESS",
            JobEvent::PostScriptFailure => "POST_SCRIPT_FAILURE",
        }
    }
}

impl std::fmt::Display for JobEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobEvent {
    type Err = DagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PRE_SCRIPT_STARTED" => Ok(JobEvent::PreScriptStarted),
            "PRE_SCRIPT_TERMINATED" => Ok(JobEvent::PreScriptTerminated),
            "PRE_SCRIPT_SUCCESS" => Ok(JobEvent::PreScriptSuccess),
            "PRE_SCRIPT_FAILURE" => Ok(JobEvent::PreScriptFailure),
            "SUBMIT" => Ok(JobEvent::Submit),
            "EXECUTE" => Ok(JobEvent::Execute),
            "JOB_TERMINATED" => Ok(JobEvent::JobTerminated),
            "JOB_SUCCESS" => Ok(JobEvent::JobSuccess),
            "JOB_FAILURE" => Ok(JobEvent::JobFailure),
            "POST_SCRIPT_STARTED" => Ok(JobEvent::PostScriptStarted),
            "POST_SCRIPT_TERMINATED" => Ok(JobEvent::PostScriptTerminated),
            "POST_SCRIPT_SUCCESS" => Ok(JobEvent::PostScriptSuccess),
            "POST_SCRIPT_FAILURE" => Ok(JobEvent::PostScriptFailure),
            other => Err(DagError::UnknownEvent(other.to_string())),
        }
    }
}

/// One parsed jobstate-log line: a (job, event) observation.
#[derive(Debug, Clone)]
pub struct JobStateRecord {
    pub timestamp: u64,
    pub job: String,
    pub event: JobEvent,
}

impl JobStateRecord {
    pub fn new(job: impl Into<String>, event: JobEvent) -> Self {
        Self {
            timestamp: 0,
            job: job.into(),
            event,
        }
    }

    /// Parse one jobstate-log line.
    ///
    /// Format: `<unix-ts> <job-name> <EVENT> [extra fields...]`. Trailing
    /// fields carry scheduler bookkeeping this engine does not use.
    ///
    /// Returns `Ok(None)` for blank lines and for the log's own INTERNAL
    /// bookkeeping lines; a truncated line or an unknown event kind is
    /// fatal.
    pub fn parse(line: &str) -> Result<Option<Self>, DagError> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }

        let mut fields = line.split_whitespace();
        let (Some(ts), Some(job), Some(event)) = (fields.next(), fields.next(), fields.next())
        else {
            return Err(DagError::MalformedRecord(line.to_string()));
        };

        if job == "INTERNAL" {
            return Ok(None);
        }

        let timestamp = ts
            .parse::<u64>()
            .map_err(|_| DagError::MalformedRecord(line.to_string()))?;

        Ok(Some(Self {
            timestamp,
            job: job.to_string(),
            event: event.parse()?,
        }))
    }
}
