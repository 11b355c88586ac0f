//! The sync daemon: two filesystem watches feeding a single work queue.
//!
//! One watch per file name, both scoped non-recursively to the working
//! directory. Watch callbacks classify events and push them onto an unbounded
//! channel; the run loop drains that channel one event at a time, so the two
//! directions never run concurrently against the same directory. Each event
//! is Idle → triggered → Idle: the handler reads fresh state from disk, does
//! its one-shot conversion, and keeps nothing in memory afterwards.
//!
//! There is no retry, debouncing, or conflict resolution. A handler error
//! aborts the run loop and propagates to the caller.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use thiserror::Error;
use tokio::sync::{mpsc, watch};

use crate::models::Project;
use crate::project_file::{self, JsonProjection, PROJECT_FILE_NAME, PROJECT_JSON_FILE_NAME};

/// A change notification from one of the two watches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncEvent {
    /// The structured project file changed.
    ProjectChanged,
    /// The JSON sidecar changed.
    SidecarChanged,
}

/// Failures owned by the daemon itself, as opposed to handler I/O errors.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("failed to watch {path} for {file_name}: {source}")]
    Watch {
        path: PathBuf,
        file_name: &'static str,
        source: notify::Error,
    },
    #[error("watch event channel closed")]
    ChannelClosed,
}

/// Watches one directory and keeps its two project files synchronized.
pub struct SyncDaemon {
    dir: PathBuf,
    project_path: PathBuf,
    json_path: PathBuf,
    projection: JsonProjection,
    persist_merge: bool,
    watchers: Vec<RecommendedWatcher>,
}

impl SyncDaemon {
    /// Resolves the two fixed file names relative to `dir`.
    ///
    /// No watches are registered until [`run`](Self::run) is called.
    pub fn new(dir: PathBuf, projection: JsonProjection, persist_merge: bool) -> Self {
        let project_path = dir.join(PROJECT_FILE_NAME);
        let json_path = dir.join(PROJECT_JSON_FILE_NAME);
        Self {
            dir,
            project_path,
            json_path,
            projection,
            persist_merge,
            watchers: Vec::new(),
        }
    }

    /// Registers both watches and drains the event queue until `shutdown`
    /// flips or a handler fails.
    ///
    /// Watch registration failure is fatal and propagates immediately. The
    /// watches are released on every exit path.
    pub async fn run(&mut self, mut shutdown: watch::Receiver<bool>) -> Result<()> {
        let (tx, mut rx) = mpsc::unbounded_channel();
        self.watchers.push(register_watch(
            &self.dir,
            PROJECT_FILE_NAME,
            SyncEvent::ProjectChanged,
            tx.clone(),
        )?);
        self.watchers.push(register_watch(
            &self.dir,
            PROJECT_JSON_FILE_NAME,
            SyncEvent::SidecarChanged,
            tx,
        )?);
        tracing::info!(
            "Watching {} and {} in {}",
            PROJECT_FILE_NAME,
            PROJECT_JSON_FILE_NAME,
            self.dir.display()
        );

        let result = loop {
            tokio::select! {
                event = rx.recv() => {
                    match event {
                        Some(event) => {
                            if let Err(e) = self.process_event(event) {
                                break Err(e);
                            }
                        }
                        None => break Err(SyncError::ChannelClosed.into()),
                    }
                }
                _ = shutdown.changed() => break Ok(()),
            }
        };

        self.shutdown();
        result
    }

    /// Runs the handler for one change event.
    pub fn process_event(&self, event: SyncEvent) -> Result<()> {
        tracing::debug!(?event, "Handling change event");
        match event {
            SyncEvent::ProjectChanged => self.on_project_changed(),
            SyncEvent::SidecarChanged => self.on_sidecar_changed(),
        }
    }

    /// Structured file changed: regenerate the sidecar from it.
    ///
    /// The sidecar is overwritten wholesale and never needs to preexist. The
    /// write re-triggers the sidecar watch; the resulting sidecar-changed
    /// handling is a read-merge-discard no-op, so no feedback loop forms.
    fn on_project_changed(&self) -> Result<()> {
        let project = project_file::read_project(&self.project_path)?;
        let json = self.projection.render(&project)?;
        std::fs::write(&self.json_path, json)
            .with_context(|| format!("Failed to write {}", self.json_path.display()))?;
        tracing::info!("Regenerated {}", self.json_path.display());
        Ok(())
    }

    /// Sidecar changed: merge its fields onto a freshly read structured
    /// record.
    ///
    /// By default the merged record is computed and dropped, matching the
    /// legacy flow. With `persist_merge` it is written back to the structured
    /// file instead.
    fn on_sidecar_changed(&self) -> Result<()> {
        let mut project = project_file::read_project(&self.project_path)?;
        let text = std::fs::read_to_string(&self.json_path)
            .with_context(|| format!("Failed to read {}", self.json_path.display()))?;
        let incoming: Project = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse {}", self.json_path.display()))?;
        project.merge_from(incoming);

        if self.persist_merge {
            project_file::write_project(&self.project_path, &project)?;
            tracing::info!("Merged sidecar back into {}", self.project_path.display());
        } else {
            tracing::debug!("Merged sidecar into in-memory record (not persisted)");
        }
        Ok(())
    }

    /// Deactivates and releases both watches. Idempotent.
    pub fn shutdown(&mut self) {
        if self.watchers.is_empty() {
            return;
        }
        tracing::debug!("Releasing filesystem watches");
        self.watchers.clear();
    }
}

/// Registers one non-recursive watch on `dir`, forwarding create/modify
/// events for `file_name` to the work queue as `event`.
fn register_watch(
    dir: &Path,
    file_name: &'static str,
    event: SyncEvent,
    tx: mpsc::UnboundedSender<SyncEvent>,
) -> Result<RecommendedWatcher> {
    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<Event>| match res {
            Ok(ev) if is_relevant(&ev, file_name) => {
                // Receiver gone means the run loop already exited.
                let _ = tx.send(event);
            }
            Ok(_) => {}
            Err(e) => tracing::warn!("Watch error for {}: {}", file_name, e),
        },
        notify::Config::default(),
    )
    .map_err(|source| SyncError::Watch {
        path: dir.to_path_buf(),
        file_name,
        source,
    })?;

    watcher
        .watch(dir, RecursiveMode::NonRecursive)
        .map_err(|source| SyncError::Watch {
            path: dir.to_path_buf(),
            file_name,
            source,
        })?;

    Ok(watcher)
}

fn is_relevant(event: &Event, file_name: &str) -> bool {
    matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_))
        && event
            .paths
            .iter()
            .any(|p| p.file_name().map(|n| n == file_name).unwrap_or(false))
}
