//! The startup sequence: folders, mod discovery, dependency check, mod pass.

use tracing::{error, info};

use crate::config::GamePaths;
use crate::error::StartupError;
use crate::mods::{
    ContentRegistry, DiscoveredMod, ModCatalog, ModRunReport, ensure_folders,
    find_duplicate_names, find_missing_dependencies, run_mods, scan_mods,
};

/// Everything the mod pass produced.
#[derive(Debug)]
pub struct Startup {
    pub mods: Vec<DiscoveredMod>,
    pub registry: ContentRegistry,
    pub reports: Vec<ModRunReport>,
}

/// Prepare the data folders and load mods.
///
/// Fails before running any mod if a declared name is claimed twice or a
/// dependency is missing. Individual mod failures do not fail startup; they
/// show up in [`Startup::reports`].
pub fn prepare(paths: &GamePaths, catalog: &ModCatalog) -> Result<Startup, StartupError> {
    ensure_folders(paths)?;

    let mods = scan_mods(&paths.mods).map_err(|source| StartupError::Scan {
        path: paths.mods.clone(),
        source,
    })?;
    info!(count = mods.len(), "mods discovered");

    let duplicates = find_duplicate_names(&mods);
    if !duplicates.is_empty() {
        error!(?duplicates, "mod names are not unique");
        return Err(StartupError::DuplicateModNames(duplicates));
    }

    let violations = find_missing_dependencies(&mods);
    if !violations.is_empty() {
        for v in &violations {
            error!("{}", v.message());
        }
        return Err(StartupError::MissingDependencies(violations));
    }

    let mut registry = ContentRegistry::new();
    let reports = run_mods(&mods, catalog, &mut registry);
    info!(records = registry.len(), "mod pass finished");

    Ok(Startup {
        mods,
        registry,
        reports,
    })
}
