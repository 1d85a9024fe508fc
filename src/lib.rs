// src/lib.rs

pub mod cli;
pub mod config;
pub mod dag;
pub mod engine;
pub mod errors;
pub mod jslog;
pub mod logging;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Result, anyhow};
use tokio::sync::mpsc;
use tracing::info;

use crate::cli::CliArgs;
use crate::config::load_or_default;
use crate::dag::{Dag, parse_dag};
use crate::engine::{Monitor, MonitorEvent, MonitorOptions};
use crate::jslog::spawn_reader;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading
/// - workflow-definition parsing
/// - jobstate-log reader
/// - monitor event loop
/// - Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    let config_path = PathBuf::from(&args.config);
    let cfg = load_or_default(&config_path)?;

    let dag_file = args
        .dag
        .clone()
        .map(PathBuf::from)
        .or_else(|| cfg.workflow.dag_file.clone())
        .ok_or_else(|| anyhow!("no workflow file given (use --dag or [workflow].dag_file)"))?;

    let dag = parse_dag(&dag_file)?;

    if args.dry_run {
        print_dry_run(&dag);
        return Ok(());
    }

    let jobstate_log = args
        .jobstate
        .clone()
        .map(PathBuf::from)
        .or_else(|| cfg.monitor.jobstate_log.clone())
        .ok_or_else(|| anyhow!("no jobstate log given (use --jobstate or [monitor].jobstate_log)"))?;

    let dag = Arc::new(dag);

    info!(
        jobs = dag.job_count(),
        ready = dag.ready_jobs().len(),
        remaining_runtime = dag.remaining_runtime(),
        "workflow loaded"
    );

    // Monitor event channel.
    let (monitor_tx, monitor_rx) = mpsc::channel::<MonitorEvent>(64);

    // Jobstate-log reader (follows appends unless --once).
    let _reader_handle = spawn_reader(&jobstate_log, !args.once, monitor_tx.clone())?;

    // Ctrl-C → graceful shutdown.
    {
        let tx = monitor_tx.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("failed to listen for Ctrl+C: {e}");
                return;
            }
            let _ = tx.send(MonitorEvent::ShutdownRequested).await;
        });
    }

    let options = MonitorOptions {
        report_interval: Duration::from_secs(cfg.monitor.report_interval_secs),
        stuck_after: Duration::from_secs(cfg.monitor.stuck_after_secs),
    };

    let monitor = Monitor::new(Arc::clone(&dag), options, monitor_rx);
    monitor.run().await
}

/// Simple dry-run output: print jobs, edges and initial states.
fn print_dry_run(dag: &Dag) {
    println!("shadowdag dry-run");
    println!();

    println!("jobs ({}):", dag.job_count());
    for job in dag.jobs() {
        println!("  - {} [{}]", job.name, job.state);
        if job.runtime > 0.0 {
            println!("      runtime: {}", job.runtime);
        }
        if !job.parents.is_empty() {
            println!("      parents: {:?}", job.parents);
        }
        if !job.children.is_empty() {
            println!("      children: {:?}", job.children);
        }
        if job.has_prescript {
            println!("      prescript: true");
        }
        if job.has_postscript {
            println!("      postscript: true");
        }
    }
}
