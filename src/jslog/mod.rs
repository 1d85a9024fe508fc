// src/jslog/mod.rs

//! The jobstate event feed: record parsing and the log follower.

pub mod reader;
pub mod record;

pub use reader::{ReaderHandle, spawn_reader};
pub use record::{JobEvent, JobStateRecord};
