mod dependencies;
mod entry;
mod manifest;
mod registry;
mod scanner;

pub use dependencies::{DependencyViolation, find_duplicate_names, find_missing_dependencies, report};
pub use entry::{
    CONTENT_FILE, ContentFileEntry, FnEntry, ModCatalog, ModEntry, ModOutcome, ModRunReport,
    run_mods,
};
pub use manifest::{MANIFEST_FILE, ManifestIssue, ModDescriptor, parse_manifest};
pub use registry::{ContentRegistry, ModApi};
pub use scanner::{DiscoveredMod, ensure_folders, scan_mods};
