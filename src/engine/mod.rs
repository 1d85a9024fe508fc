// src/engine/mod.rs

//! The monitor runtime.
//!
//! [`runtime`] owns the event loop that consumes jobstate records from the
//! log reader, drives the shared [`crate::dag::Dag`], and periodically
//! reports aggregate workflow state.

pub mod runtime;

pub use runtime::{Monitor, MonitorEvent, MonitorOptions};
