// src/errors.rs

//! Crate-wide error types.
//!
//! Every `DagError` variant is a fatal consistency or input error: once one
//! is returned, the event stream or definition input disagrees with the
//! invariants the engine assumes. The operation that raised it is aborted
//! with no rollback, and callers must treat the DAG instance as invalid.

use thiserror::Error;

use crate::dag::job::JobState;
use crate::jslog::JobEvent;

#[derive(Error, Debug)]
pub enum DagError {
    /// An event was delivered to a job already in a terminal state.
    #[error("job '{job}' is terminal ({state}) but received event {event}")]
    TerminalJob {
        job: String,
        state: JobState,
        event: JobEvent,
    },

    /// An event kind outside the recognized set appeared in the log.
    #[error("unknown jobstate event kind '{0}'")]
    UnknownEvent(String),

    /// An event or edge referenced a job not present in the graph.
    #[error("unknown job '{0}'")]
    UnknownJob(String),

    /// A child of a newly successful job was not waiting in UNREADY.
    #[error(
        "child '{child}' of newly successful job '{parent}' should be UNREADY, found {state}"
    )]
    ChildNotUnready {
        parent: String,
        child: String,
        state: JobState,
    },

    /// A workflow-file line started with an unrecognized directive.
    #[error("unrecognized directive in workflow file: '{0}'")]
    UnrecognizedDirective(String),

    /// A recognized directive did not have the expected shape.
    #[error("malformed directive in workflow file: '{0}'")]
    MalformedDirective(String),

    /// A SCRIPT directive named something other than PRE or POST.
    #[error("unrecognized script type '{0}' (expected PRE or POST)")]
    UnrecognizedScriptType(String),

    /// The same job name was declared twice.
    #[error("duplicate JOB declaration for '{0}'")]
    DuplicateJob(String),

    /// A jobstate-log line did not have the expected shape.
    #[error("malformed jobstate record: '{0}'")]
    MalformedRecord(String),

    /// The workflow definition contains a dependency cycle.
    #[error("cycle detected in workflow DAG involving job '{0}'")]
    Cycle(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, DagError>;
