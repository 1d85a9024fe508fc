// src/config/validate.rs

use anyhow::{Result, anyhow};

use crate::config::model::ConfigFile;

/// Run basic semantic validation against a loaded configuration.
///
/// This checks interval sanity only; the workflow-definition semantics
/// (edges, cycles, script annotations) are validated by the DAG loader
/// when the file itself is parsed.
pub fn validate_config(cfg: &ConfigFile) -> Result<()> {
    if cfg.monitor.report_interval_secs == 0 {
        return Err(anyhow!("[monitor].report_interval_secs must be >= 1 (got 0)"));
    }
    if cfg.monitor.stuck_after_secs == 0 {
        return Err(anyhow!("[monitor].stuck_after_secs must be >= 1 (got 0)"));
    }
    Ok(())
}
