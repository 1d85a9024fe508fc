// src/dag/mod.rs

//! The workflow-state engine.
//!
//! - [`job`] holds the per-job state machine driven by lifecycle events.
//! - [`graph`] owns the full job set behind one coarse mutex and applies
//!   events with the readiness cascade.
//! - [`loader`] builds the initial graph from a workflow definition file.

pub mod graph;
pub mod job;
pub mod loader;

pub use graph::{Dag, DagBuilder};
pub use job::{Job, JobState};
pub use loader::parse_dag;
