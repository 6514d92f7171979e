//! Watch mode: re-synchronize declared paths when their files change

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::Duration;

use notify::{Event, EventKind, RecursiveMode, Watcher};
use tracing::{debug, info, warn};

use crate::config::{Plan, Target};
use crate::discover::MARKER;
use crate::engine::{PathResult, run_plan, run_targets};
use crate::error::Result;
use crate::options::Options;

/// Default quiet period before a batch of changes is processed.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(100);

/// Whether a change to `path` can affect an index generated with `options`.
///
/// Directories (no extension), module files and markers count. The index
/// file itself and other hidden files do not, which also covers the
/// temporary files indexes are written through.
pub fn is_relevant(path: &Path, options: &Options) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    if name == MARKER {
        return true;
    }
    if name == options.index_file_name() || name.starts_with('.') {
        return false;
    }
    match Path::new(name).extension().and_then(|e| e.to_str()) {
        None => true,
        Some(ext) => ext == options.module_extension(),
    }
}

/// Targets affected by any of `changed`, each once, in declared order.
pub fn affected_targets<'a>(plan: &'a Plan, changed: &[PathBuf]) -> Vec<&'a Target> {
    let mut keys: HashSet<&Path> = HashSet::new();
    for path in changed {
        keys.extend(
            plan.affected_by(path)
                .into_iter()
                .filter(|target| is_relevant(path, &target.options))
                .map(|target| target.key.as_path()),
        );
    }
    plan.targets
        .iter()
        .filter(|target| keys.contains(target.key.as_path()))
        .collect()
}

/// Block for the next change, then gather everything arriving within `debounce`.
///
/// Returns `None` once the event source is gone.
pub fn next_batch(rx: &Receiver<notify::Result<Event>>, debounce: Duration) -> Option<Vec<PathBuf>> {
    let mut batch = Vec::new();
    take_event(rx.recv().ok()?, &mut batch);
    loop {
        match rx.recv_timeout(debounce) {
            Ok(event) => take_event(event, &mut batch),
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => break,
        }
    }
    batch.sort();
    batch.dedup();
    Some(batch)
}

fn take_event(event: notify::Result<Event>, batch: &mut Vec<PathBuf>) {
    match event {
        Ok(event) if matches!(event.kind, EventKind::Access(_)) => {}
        Ok(event) => batch.extend(event.paths),
        Err(e) => warn!("watch error: {e}"),
    }
}

/// Run a full pass, then keep re-running affected targets on changes.
///
/// `report` receives the results of every pass. Returns when the watcher
/// shuts down.
pub fn watch<F>(plan: &Plan, dry_run: bool, debounce: Duration, mut report: F) -> Result<()>
where
    F: FnMut(Vec<PathResult>),
{
    report(run_plan(plan, dry_run));

    let (tx, rx) = mpsc::channel();
    let mut watcher = notify::recommended_watcher(tx)?;
    for target in &plan.targets {
        match watcher.watch(&target.path, RecursiveMode::Recursive) {
            Ok(()) => debug!("watching {}", target.path.display()),
            Err(e) => warn!("cannot watch {}: {e}", target.path.display()),
        }
    }
    info!("watching {} path(s) for changes", plan.targets.len());

    while let Some(changed) = next_batch(&rx, debounce) {
        let targets = affected_targets(plan, &changed);
        if targets.is_empty() {
            continue;
        }
        info!("{} change(s), re-synchronizing {} path(s)", changed.len(), targets.len());
        report(run_targets(plan, &targets, dry_run));
    }
    Ok(())
}
