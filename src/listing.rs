//! Directory listing: resolves every entry of a directory into an ordered module list
//!
//! Entries are resolved in parallel and joined before sorting, so the order of
//! the result never depends on which resolution finished first.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fs::{self, DirEntry};
use std::io;
use std::path::Path;

use rayon::prelude::*;
use tracing::debug;

use crate::config::Plan;
use crate::error::{Error, Result};
use crate::filter::IgnoreFilter;
use crate::module::{Module, Resolver};
use crate::options::Options;

/// List the modules of a directory reached during nested traversal.
///
/// A directory that cannot be read contributes nothing.
pub fn list_modules(dir: &Path, options: &Options, plan: &Plan) -> Result<Vec<Module>> {
    let entries = match read_entries(dir) {
        Ok(entries) => entries,
        Err(e) => {
            debug!("treating unreadable {} as empty: {e}", dir.display());
            return Ok(Vec::new());
        }
    };
    resolve_all(dir, &entries, options, plan)
}

/// List the modules of a declared target directory.
///
/// Unlike [`list_modules`], a read failure is reported.
pub fn list_declared(dir: &Path, options: &Options, plan: &Plan) -> Result<Vec<Module>> {
    let entries = read_entries(dir).map_err(|source| Error::ReadDir {
        path: dir.to_path_buf(),
        source,
    })?;
    resolve_all(dir, &entries, options, plan)
}

/// All entries of `dir`. An error on any single entry fails the whole read.
fn read_entries(dir: &Path) -> io::Result<Vec<DirEntry>> {
    fs::read_dir(dir)?.collect()
}

fn resolve_all(
    dir: &Path,
    entries: &[DirEntry],
    options: &Options,
    plan: &Plan,
) -> Result<Vec<Module>> {
    let filter = IgnoreFilter::new(options)?;
    let resolver = Resolver {
        options,
        filter: &filter,
        plan,
    };

    // Wait for every entry; the first failure fails the listing
    let resolved: Vec<Option<Module>> = entries
        .par_iter()
        .map(|entry| resolver.resolve(entry))
        .collect::<Result<_>>()?;

    let mut modules: Vec<Module> = resolved.into_iter().flatten().collect();
    sort_modules(&mut modules);
    check_collisions(dir, &modules)?;

    debug!("{}: {} module(s)", dir.display(), modules.len());
    Ok(modules)
}

/// Canonical order: nested modules first, then by name. Path breaks remaining ties.
pub fn sort_modules(modules: &mut [Module]) {
    modules.sort_by(compare_modules);
}

fn compare_modules(a: &Module, b: &Module) -> Ordering {
    b.has_recursion
        .cmp(&a.has_recursion)
        .then_with(|| a.name.cmp(&b.name))
        .then_with(|| a.path.cmp(&b.path))
}

/// Reject listings where two entries would be exported under one name.
pub fn check_collisions(dir: &Path, modules: &[Module]) -> Result<()> {
    let mut seen: HashMap<&str, &Module> = HashMap::with_capacity(modules.len());
    for module in modules {
        if let Some(first) = seen.insert(module.name.as_str(), module) {
            return Err(Error::NameCollision {
                directory: dir.to_path_buf(),
                name: module.name.clone(),
                first: first.path.clone(),
                second: module.path.clone(),
            });
        }
    }
    Ok(())
}
