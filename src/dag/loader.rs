// src/dag/loader.rs

//! Workflow-definition loader.
//!
//! Parses a line-oriented workflow file into a [`Dag`]:
//!
//! ```text
//! JOB create_dir create_dir.sub
//! JOB analyze analyze.sub
//! PARENT create_dir CHILD analyze
//! SCRIPT POST analyze cleanup.sh
//! RETRY analyze 3
//! ```
//!
//! `JOB` names a submit file, resolved relative to the workflow file's
//! directory, whose `+job_runtime = <float>` attribute supplies the
//! runtime estimate (0.0 when absent). `RETRY` and `MAXJOBS` are consumed
//! without effect: retries and throttling belong to the execution system,
//! not to this view of it. Anything else unrecognized is fatal.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use regex::Regex;
use tracing::{debug, info};

use crate::dag::graph::{Dag, DagBuilder};
use crate::errors::DagError;

/// Parse a workflow definition file into an initial [`Dag`].
///
/// Roots are seeded READY, everything else starts UNREADY, and acyclicity
/// is verified once here; the engine never re-checks it at runtime.
pub fn parse_dag(dag_file: impl AsRef<Path>) -> Result<Dag> {
    let dag_file = dag_file.as_ref();
    info!("parsing workflow definition from {:?}", dag_file);

    let contents = fs::read_to_string(dag_file)
        .with_context(|| format!("reading workflow file at {dag_file:?}"))?;

    let base_dir = dag_file
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));

    let runtime_re = Regex::new(r#"^\+job_runtime\s*=\s*"?([^"\s]+)"?"#)
        .context("compiling runtime attribute pattern")?;

    let mut builder = DagBuilder::new();

    for raw in contents.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let fields: Vec<&str> = line.split_whitespace().collect();

        match fields[0] {
            "JOB" => {
                if fields.len() < 3 {
                    return Err(DagError::MalformedDirective(line.to_string()).into());
                }
                let (name, submit_file) = (fields[1], fields[2]);
                let runtime = parse_submit_file(&base_dir.join(submit_file), &runtime_re)?;
                builder.add_job(name, runtime)?;
                debug!(job = %name, runtime, "parsed job");
            }
            "PARENT" => {
                // One parent, one child per declaration; compressed
                // multi-parent/multi-child forms are not supported.
                if fields.len() != 4 || fields[2] != "CHILD" {
                    return Err(DagError::MalformedDirective(line.to_string()).into());
                }
                let (parent, child) = (fields[1], fields[3]);
                builder.add_edge(parent, child)?;
                debug!(parent = %parent, child = %child, "parsed edge");
            }
            "SCRIPT" => {
                if fields.len() < 3 {
                    return Err(DagError::MalformedDirective(line.to_string()).into());
                }
                let (script_type, name) = (fields[1], fields[2]);
                match script_type {
                    "PRE" => builder.set_prescript(name)?,
                    "POST" => builder.set_postscript(name)?,
                    other => {
                        return Err(DagError::UnrecognizedScriptType(other.to_string()).into());
                    }
                }
                debug!(job = %name, script = %script_type, "parsed script annotation");
            }
            "RETRY" | "MAXJOBS" => {
                // Recognized but ignored: the execution system owns these.
                debug!(directive = %fields[0], "ignoring directive");
            }
            _ => {
                return Err(DagError::UnrecognizedDirective(line.to_string()).into());
            }
        }
    }

    let dag = builder.build()?;
    info!(
        jobs = dag.job_count(),
        roots = dag.ready_jobs().len(),
        "parsed workflow"
    );

    Ok(dag)
}

/// Scan a submit file for its runtime-estimate attribute.
///
/// A missing file is fatal; a present file without the attribute defaults
/// to 0.0.
fn parse_submit_file(path: &Path, runtime_re: &Regex) -> Result<f64> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("reading submit file at {path:?}"))?;

    for line in contents.lines() {
        if let Some(caps) = runtime_re.captures(line.trim()) {
            let value: f64 = caps[1]
                .parse()
                .with_context(|| format!("parsing +job_runtime value in {path:?}"))?;
            if value < 0.0 {
                bail!("negative +job_runtime {value} in {path:?}");
            }
            return Ok(value);
        }
    }

    Ok(0.0)
}
