// src/jslog/reader.rs

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::engine::MonitorEvent;
use crate::jslog::record::JobStateRecord;

/// Handle for the jobstate-log follower.
///
/// Keeps the underlying `RecommendedWatcher` alive for as long as needed;
/// dropping it stops follow mode.
pub struct ReaderHandle {
    _inner: Option<RecommendedWatcher>,
}

impl std::fmt::Debug for ReaderHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReaderHandle").finish()
    }
}

/// Spawn a reader for the jobstate log at `path`.
///
/// Existing contents are replayed first, in order. With `follow = true`
/// the log's directory is then watched and newly appended lines are
/// streamed as they arrive; otherwise `MonitorEvent::LogClosed` is sent
/// after the replay and the reader stops.
pub fn spawn_reader(
    path: impl Into<PathBuf>,
    follow: bool,
    monitor_tx: mpsc::Sender<MonitorEvent>,
) -> Result<ReaderHandle> {
    let path = path.into();

    let mut cursor =
        LogCursor::open(&path).with_context(|| format!("opening jobstate log at {path:?}"))?;

    if !follow {
        tokio::spawn(async move {
            if let Err(err) = cursor.drain(&monitor_tx).await {
                error!(error = %err, "jobstate replay failed");
            }
            let _ = monitor_tx.send(MonitorEvent::LogClosed).await;
        });
        return Ok(ReaderHandle { _inner: None });
    }

    // Channel from the blocking notify callback into the async world.
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<Event>();

    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<Event>| match res {
            Ok(event) => {
                if let Err(err) = event_tx.send(event) {
                    // We can't log via tracing here easily, so fallback to stderr.
                    eprintln!("shadowdag: failed to forward notify event: {err}");
                }
            }
            Err(err) => {
                eprintln!("shadowdag: jobstate log watch error: {err}");
            }
        },
        Config::default(),
    )?;

    // Watch the parent directory rather than the file: the log is
    // recreated on rotation, and some platforms miss events on the file
    // itself.
    let watch_dir = path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    watcher.watch(&watch_dir, RecursiveMode::NonRecursive)?;

    info!("following jobstate log at {:?}", path);

    let log_path = path.clone();
    tokio::spawn(async move {
        if let Err(err) = cursor.drain(&monitor_tx).await {
            error!(error = %err, "jobstate replay failed");
            return;
        }

        let wanted = log_path.file_name().map(|s| s.to_os_string());

        while let Some(event) = event_rx.recv().await {
            let relevant = event
                .paths
                .iter()
                .any(|p| p.file_name().map(|s| s.to_os_string()) == wanted);
            if !relevant {
                continue;
            }

            debug!(?event, "jobstate log changed");

            if matches!(event.kind, EventKind::Create(_)) {
                // Rotation: the log was recreated; start over from the top.
                match LogCursor::open(&log_path) {
                    Ok(c) => {
                        info!("jobstate log recreated; reopened from the start");
                        cursor = c;
                    }
                    Err(err) => {
                        error!(error = %err, "reopening recreated jobstate log failed");
                        return;
                    }
                }
            }

            if let Err(err) = cursor.drain(&monitor_tx).await {
                error!(error = %err, "reading appended jobstate records failed");
                return;
            }
        }

        debug!("jobstate log follower ended");
    });

    Ok(ReaderHandle {
        _inner: Some(watcher),
    })
}

/// Read position within the jobstate log.
struct LogCursor {
    reader: BufReader<File>,
    line: String,
}

impl LogCursor {
    fn open(path: &Path) -> std::io::Result<Self> {
        Ok(Self {
            reader: BufReader::new(File::open(path)?),
            line: String::new(),
        })
    }

    /// Read records up to the current EOF and forward them to the monitor.
    async fn drain(&mut self, tx: &mpsc::Sender<MonitorEvent>) -> Result<()> {
        loop {
            self.line.clear();
            let n = self.reader.read_line(&mut self.line)?;
            if n == 0 {
                return Ok(());
            }
            if !self.line.ends_with('\n') {
                // Partial line still being written; rewind and pick it up on
                // the next change event.
                self.reader.seek_relative(-(n as i64))?;
                return Ok(());
            }

            if let Some(record) = JobStateRecord::parse(&self.line)? {
                tx.send(MonitorEvent::Record(record))
                    .await
                    .context("monitor channel closed")?;
            }
        }
    }
}
