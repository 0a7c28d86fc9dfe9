use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use super::manifest::{MANIFEST_FILE, ManifestIssue, ModDescriptor, parse_manifest};
use crate::config::GamePaths;
use crate::error::StartupError;

/// One folder found under the mods root.
#[derive(Debug, Clone)]
pub struct DiscoveredMod {
    /// Folder name, not the declared name.
    pub name: String,
    pub path: PathBuf,
    pub descriptor: ModDescriptor,
}

/// Create the root, saves and mods folders if they do not exist yet.
pub fn ensure_folders(paths: &GamePaths) -> Result<(), StartupError> {
    for dir in [&paths.root, &paths.saves, &paths.mods] {
        fs::create_dir_all(dir).map_err(|source| StartupError::CreateFolder {
            path: dir.clone(),
            source,
        })?;
    }
    Ok(())
}

/// List the immediate subdirectories of `mods_root` and read each manifest.
///
/// Order is whatever the filesystem lists. A missing root yields no mods.
pub fn scan_mods(mods_root: &Path) -> io::Result<Vec<DiscoveredMod>> {
    if !mods_root.exists() {
        return Ok(Vec::new());
    }

    let mut mods = Vec::new();

    for entry in fs::read_dir(mods_root)? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }

        let folder = entry.file_name().to_string_lossy().into_owned();
        let descriptor = read_descriptor(&path, &folder);

        match descriptor.error {
            Some(issue) => warn!(mod_folder = %folder, "manifest problem: {issue}"),
            None => info!(
                mod_folder = %folder,
                name = %descriptor.name,
                dependencies = ?descriptor.dependencies,
                "found mod"
            ),
        }

        mods.push(DiscoveredMod {
            name: folder,
            path,
            descriptor,
        });
    }

    Ok(mods)
}

fn read_descriptor(mod_dir: &Path, folder: &str) -> ModDescriptor {
    let conf_path = mod_dir.join(MANIFEST_FILE);

    if !conf_path.exists() {
        return ModDescriptor::degraded(folder, ManifestIssue::Missing);
    }

    match fs::read_to_string(&conf_path) {
        Ok(text) => parse_manifest(&text, folder),
        Err(_) => ModDescriptor::degraded(folder, ManifestIssue::Unreadable),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_mod(root: &Path, folder: &str, manifest: Option<&str>) {
        let dir = root.join(folder);
        fs::create_dir_all(&dir).unwrap();
        if let Some(text) = manifest {
            fs::write(dir.join(MANIFEST_FILE), text).unwrap();
        }
    }

    #[test]
    fn missing_root_is_empty() {
        let tmp = TempDir::new().unwrap();
        let mods = scan_mods(&tmp.path().join("nope")).unwrap();
        assert!(mods.is_empty());
    }

    #[test]
    fn only_directories_are_mods() {
        let tmp = TempDir::new().unwrap();
        write_mod(tmp.path(), "alpha", Some(r#"{"name": "Alpha"}"#));
        fs::write(tmp.path().join("readme.txt"), "not a mod").unwrap();

        let mods = scan_mods(tmp.path()).unwrap();
        assert_eq!(mods.len(), 1);
        assert_eq!(mods[0].name, "alpha");
        assert_eq!(mods[0].descriptor.name, "Alpha");
        assert_eq!(mods[0].path, tmp.path().join("alpha"));
    }

    #[test]
    fn missing_and_malformed_manifests_are_tagged() {
        let tmp = TempDir::new().unwrap();
        write_mod(tmp.path(), "bare", None);
        write_mod(tmp.path(), "garbled", Some("name = not json"));

        let mut mods = scan_mods(tmp.path()).unwrap();
        mods.sort_by(|a, b| a.name.cmp(&b.name));

        assert_eq!(mods[0].descriptor.name, "bare");
        assert_eq!(mods[0].descriptor.error, Some(ManifestIssue::Missing));
        assert_eq!(mods[1].descriptor.name, "garbled");
        assert_eq!(mods[1].descriptor.error, Some(ManifestIssue::InvalidFormat));
    }

    #[test]
    fn unreadable_manifest_is_tagged() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("odd");
        // A directory where the manifest file should be cannot be read as text.
        fs::create_dir_all(dir.join(MANIFEST_FILE)).unwrap();

        let mods = scan_mods(tmp.path()).unwrap();
        assert_eq!(mods[0].descriptor.name, "odd");
        assert_eq!(mods[0].descriptor.error, Some(ManifestIssue::Unreadable));
    }

    #[test]
    fn ensure_folders_is_idempotent() {
        let tmp = TempDir::new().unwrap();
        let paths = GamePaths::new(tmp.path().join("P2RPG"));
        ensure_folders(&paths).unwrap();
        ensure_folders(&paths).unwrap();
        assert!(paths.saves.is_dir());
        assert!(paths.mods.is_dir());
    }
}
