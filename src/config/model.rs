// src/config/model.rs

use std::path::PathBuf;

use serde::Deserialize;

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [workflow]
/// dag_file = "run0001/montage.dag"
///
/// [monitor]
/// jobstate_log = "run0001/jobstate.log"
/// report_interval_secs = 30
/// stuck_after_secs = 600
/// ```
///
/// All sections are optional; the paths may instead come from CLI flags.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ConfigFile {
    /// Workflow inputs from `[workflow]`.
    #[serde(default)]
    pub workflow: WorkflowSection,

    /// Monitor behaviour from `[monitor]`.
    #[serde(default)]
    pub monitor: MonitorSection,
}

/// `[workflow]` section.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct WorkflowSection {
    /// Path to the workflow definition (.dag) file.
    #[serde(default)]
    pub dag_file: Option<PathBuf>,
}

/// `[monitor]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct MonitorSection {
    /// Path to the jobstate log written by the execution system.
    #[serde(default)]
    pub jobstate_log: Option<PathBuf>,

    /// How often to log aggregate workflow state, in seconds.
    #[serde(default = "default_report_interval_secs")]
    pub report_interval_secs: u64,

    /// How long the log may stay quiet with POSTSCRIPT jobs outstanding
    /// before warning about them, in seconds.
    #[serde(default = "default_stuck_after_secs")]
    pub stuck_after_secs: u64,
}

fn default_report_interval_secs() -> u64 {
    60
}

fn default_stuck_after_secs() -> u64 {
    300
}

impl Default for MonitorSection {
    fn default() -> Self {
        Self {
            jobstate_log: None,
            report_interval_secs: default_report_interval_secs(),
            stuck_after_secs: default_stuck_after_secs(),
        }
    }
}
