//! Entry point running one synchronization pass per declared path

use std::path::PathBuf;

use rayon::prelude::*;
use tracing::{debug, warn};

use crate::config::{Config, Plan, Target};
use crate::error::Result;
use crate::sync::{SyncReport, sync_target};

/// Result of one declared path. Failures stay local to their path.
#[derive(Debug)]
pub struct PathResult {
    pub path: PathBuf,
    pub outcome: Result<SyncReport>,
}

impl PathResult {
    pub fn is_ok(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Validate `config` and synchronize every declared path.
///
/// Configuration errors reject the whole call before anything is read.
/// Otherwise one result per path is returned in declared order.
pub fn run(config: &Config) -> Result<Vec<PathResult>> {
    let plan = config.plan()?;
    Ok(run_plan(&plan, config.test))
}

/// Synchronize every target of an accepted plan concurrently.
pub fn run_plan(plan: &Plan, dry_run: bool) -> Vec<PathResult> {
    let targets: Vec<&Target> = plan.targets.iter().collect();
    run_targets(plan, &targets, dry_run)
}

/// Synchronize a subset of the plan's targets, e.g. the ones affected by a change.
pub fn run_targets(plan: &Plan, targets: &[&Target], dry_run: bool) -> Vec<PathResult> {
    debug!("synchronizing {} path(s)", targets.len());
    targets
        .par_iter()
        .map(|target| {
            let outcome = sync_target(target, plan, dry_run);
            if let Err(e) = &outcome {
                warn!("{}: {e}", target.path.display());
            }
            PathResult {
                path: target.path.clone(),
                outcome,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::sync::Action;
    use crate::test_utils::TestTree;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_duplicate_paths_reject_without_writes() {
        let tree = TestTree::new();
        tree.add_file("a/x.js", "");
        let a = tree.path().join("a").display().to_string();

        let err = run(&Config::with_paths([a.clone(), a.clone()])).unwrap_err();
        assert!(err.to_string().contains(&a));
        assert!(!tree.exists("a/index.js"));
    }

    #[test]
    fn test_results_follow_declared_order() {
        let tree = TestTree::new();
        tree.add_file("b/x.js", "");
        tree.add_file("a/y.js", "");
        let paths = ["b", "a"].map(|p| tree.path().join(p).display().to_string());

        let results = run(&Config::with_paths(paths.clone())).unwrap();
        let got: Vec<String> = results.iter().map(|r| r.path.display().to_string()).collect();
        assert_eq!(got, paths.to_vec());
    }

    #[test]
    fn test_failure_stays_local_to_its_path() {
        let tree = TestTree::new();
        tree.add_file("ok/x.js", "");
        let ok = tree.path().join("ok").display().to_string();
        let missing = tree.path().join("missing").display().to_string();

        let results = run(&Config::with_paths([missing, ok])).unwrap();
        assert!(matches!(results[0].outcome, Err(Error::ReadDir { .. })));
        let report = results[1].outcome.as_ref().unwrap();
        assert_eq!(report.action, Action::Add);
        assert!(tree.exists("ok/index.js"));
    }

    #[test]
    fn test_index_failure_stays_local_to_its_path() {
        let tree = TestTree::new();
        tree.add_dir("stuck/index.js");
        tree.add_file("ok/x.js", "");
        let paths = ["stuck", "ok"].map(|p| tree.path().join(p).display().to_string());

        let results = run(&Config::with_paths(paths)).unwrap();
        assert!(matches!(results[0].outcome, Err(Error::RemoveIndex { .. })));
        assert_eq!(results[1].outcome.as_ref().unwrap().action, Action::Add);
        assert!(tree.exists("ok/index.js"));
    }

    #[test]
    fn test_recursive_tree_writes_every_level() {
        let tree = TestTree::new();
        tree.add_file("src/b.js", "");
        tree.add_file("src/a.js", "");
        tree.add_file("src/z/inner.js", "");
        tree.add_dir("src/empty");
        let src = tree.path().join("src");
        let paths = ["src", "src/z", "src/empty"].map(|p| tree.path().join(p).display().to_string());

        let results = run(&Config::with_paths(paths)).unwrap();
        assert!(results.iter().all(PathResult::is_ok));
        assert_eq!(
            std::fs::read_to_string(src.join("index.js")).unwrap(),
            "import * as z from './z';\r\n\
             export { default as a } from './a';\r\n\
             export { default as b } from './b';\r\n\
             export { z };\r\n"
        );
        assert!(tree.exists("src/z/index.js"));
        assert!(!tree.exists("src/empty/index.js"));
    }

    #[test]
    fn test_test_mode_leaves_tree_untouched() {
        let tree = TestTree::new();
        tree.add_file("a.js", "");
        let mut config = Config::with_paths([tree.path().display().to_string()]);
        config.test = true;

        let results = run(&config).unwrap();
        let report = results[0].outcome.as_ref().unwrap();
        assert_eq!(report.action, Action::Add);
        assert!(!tree.exists("index.js"));
    }
}
