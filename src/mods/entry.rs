//! Mod entry points and the one-shot execution pass.
//!
//! A mod contributes content either through native code linked into the
//! binary (a [`ModEntry`] listed in a [`ModCatalog`]) or through a
//! `src/content.toml` file in its folder. Both receive the same [`ModApi`].

use std::collections::HashMap;
use std::fs;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{error, info};

use super::registry::{ContentRegistry, ModApi};
use super::scanner::DiscoveredMod;
use crate::error::ModError;
use crate::game::{ItemRecord, Quest};
use crate::world::Location;

/// Path of the content entry point, relative to the mod folder.
pub const CONTENT_FILE: &str = "src/content.toml";

/// Trusted mod code. Called exactly once at startup.
pub trait ModEntry: Send + Sync {
    fn register(&self, api: &mut ModApi<'_>) -> Result<(), ModError>;
}

/// Adapts a plain function or closure into a [`ModEntry`].
pub struct FnEntry<F>(pub F);

impl<F> ModEntry for FnEntry<F>
where
    F: Fn(&mut ModApi<'_>) -> Result<(), ModError> + Send + Sync,
{
    fn register(&self, api: &mut ModApi<'_>) -> Result<(), ModError> {
        (self.0)(api)
    }
}

/// Native entry points keyed by declared mod name.
#[derive(Default)]
pub struct ModCatalog {
    entries: HashMap<String, Box<dyn ModEntry>>,
}

impl ModCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, entry: impl ModEntry + 'static) -> Self {
        self.insert(name, entry);
        self
    }

    pub fn with_fn<F>(self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&mut ModApi<'_>) -> Result<(), ModError> + Send + Sync + 'static,
    {
        self.with(name, FnEntry(f))
    }

    pub fn insert(&mut self, name: impl Into<String>, entry: impl ModEntry + 'static) {
        self.entries.insert(name.into(), Box::new(entry));
    }

    pub fn get(&self, name: &str) -> Option<&dyn ModEntry> {
        self.entries.get(name).map(|e| &**e)
    }
}

////////////////////
/// TOML STRUCTS ///
////////////////////

#[derive(Deserialize)]
struct ContentFile {
    #[serde(default)]
    item: Vec<ItemRecord>, // [[item]] blocks
    #[serde(default)]
    location: Vec<Location>, // [[location]] blocks
    #[serde(default)]
    quest: Vec<Quest>, // [[quest]] blocks
}

/// Entry point backed by a mod's `src/content.toml`.
pub struct ContentFileEntry {
    path: PathBuf,
}

impl ContentFileEntry {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The content file of `mod_dir`, if it has one.
    pub fn locate(mod_dir: &Path) -> Option<Self> {
        let path = mod_dir.join(CONTENT_FILE);
        path.is_file().then(|| Self::new(path))
    }
}

impl ModEntry for ContentFileEntry {
    fn register(&self, api: &mut ModApi<'_>) -> Result<(), ModError> {
        let text = fs::read_to_string(&self.path).map_err(|source| ModError::Read {
            path: self.path.clone(),
            source,
        })?;
        let content: ContentFile = toml::from_str(&text).map_err(|e| ModError::Content {
            path: self.path.clone(),
            message: e.to_string(),
        })?;

        for item in content.item {
            api.register_item(item)?;
        }
        for location in content.location {
            api.register_location(location)?;
        }
        for quest in content.quest {
            api.register_quest(quest)?;
        }
        Ok(())
    }
}

/// What happened to one mod during the execution pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModOutcome {
    Executed,
    /// No native entry and no content file.
    Skipped,
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct ModRunReport {
    pub mod_name: String,
    pub outcome: ModOutcome,
}

/// Run every mod's entry point once, in discovery order.
///
/// Only call this after the dependency check passed. A failing or panicking
/// entry point is logged and does not stop the others. Records a mod
/// registered before failing stay registered.
pub fn run_mods(
    mods: &[DiscoveredMod],
    catalog: &ModCatalog,
    registry: &mut ContentRegistry,
) -> Vec<ModRunReport> {
    let mut reports = Vec::with_capacity(mods.len());

    for m in mods {
        let name = m.descriptor.name.as_str();
        let content_entry;

        let entry: &dyn ModEntry = if let Some(native) = catalog.get(name) {
            native
        } else if let Some(file) = ContentFileEntry::locate(&m.path) {
            content_entry = file;
            &content_entry
        } else {
            info!(mod_name = %name, "mod has no entry point, skipping execution");
            reports.push(ModRunReport {
                mod_name: name.to_string(),
                outcome: ModOutcome::Skipped,
            });
            continue;
        };

        let outcome = execute(entry, registry, name);
        match &outcome {
            ModOutcome::Executed => info!(mod_name = %name, "executed mod"),
            ModOutcome::Failed(reason) => error!(mod_name = %name, "error loading mod: {reason}"),
            ModOutcome::Skipped => {}
        }

        reports.push(ModRunReport {
            mod_name: name.to_string(),
            outcome,
        });
    }

    reports
}

fn execute(entry: &dyn ModEntry, registry: &mut ContentRegistry, name: &str) -> ModOutcome {
    let mut api = registry.api(name);
    let result = panic::catch_unwind(AssertUnwindSafe(|| entry.register(&mut api)));

    match result {
        Ok(Ok(())) => ModOutcome::Executed,
        Ok(Err(e)) => ModOutcome::Failed(e.to_string()),
        Err(payload) => {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            ModOutcome::Failed(ModError::Panicked(message).to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::ItemKind;
    use crate::mods::manifest::ModDescriptor;
    use tempfile::TempDir;

    fn discovered(dir: &Path, name: &str) -> DiscoveredMod {
        DiscoveredMod {
            name: name.to_string(),
            path: dir.join(name),
            descriptor: ModDescriptor {
                name: name.to_string(),
                description: String::new(),
                dependencies: Vec::new(),
                raw: None,
                error: None,
            },
        }
    }

    fn lantern() -> ItemRecord {
        ItemRecord {
            name: "Lantern".to_string(),
            kind: ItemKind::Misc,
            icon: "🏮".to_string(),
            effect: None,
            damage: None,
        }
    }

    #[test]
    fn content_file_registers_everything() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("lakes").join("src");
        fs::create_dir_all(&src).unwrap();
        fs::write(
            src.join("content.toml"),
            r#"
[[item]]
name = "Fishing Rod"
type = "weapon"
icon = "🎣"
damage = 1

[[item]]
name = "Smoked Fish"
type = "food"
icon = "🐟"
effect = { kind = "restore", stat = "hunger", amount = 25 }

[[location]]
name = "Silver Lake"
symbol = "🌊"
x = 6
y = 4
description = "Still water mirrors the sky."

[[quest]]
id = "catch_fish"
title = "Gone Fishing"
description = "Catch three fish"
maxProgress = 3
progress = 2
completed = true
"#,
        )
        .unwrap();

        let mods = vec![discovered(tmp.path(), "lakes")];
        let mut registry = ContentRegistry::new();
        let reports = run_mods(&mods, &ModCatalog::new(), &mut registry);

        assert_eq!(reports[0].outcome, ModOutcome::Executed);
        assert_eq!(registry.items().len(), 2);
        assert_eq!(registry.locations()[0].x, 6);
        // Stored verbatim; normalisation happens when merging into a game.
        assert_eq!(registry.quests()[0].progress, 2);
    }

    #[test]
    fn native_entry_wins_over_content_file() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("native").join("src");
        fs::create_dir_all(&src).unwrap();
        fs::write(src.join("content.toml"), "this is not toml [").unwrap();

        let catalog = ModCatalog::new().with_fn("native", |api| {
            api.register_item(lantern())?;
            Ok(())
        });

        let mut registry = ContentRegistry::new();
        let reports = run_mods(&[discovered(tmp.path(), "native")], &catalog, &mut registry);
        assert_eq!(reports[0].outcome, ModOutcome::Executed);
        assert_eq!(registry.items()[0].name, "Lantern");
    }

    #[test]
    fn failures_are_isolated_per_mod() {
        let tmp = TempDir::new().unwrap();
        for name in ["bad", "good"] {
            fs::create_dir_all(tmp.path().join(name)).unwrap();
        }

        let catalog = ModCatalog::new()
            .with_fn("bad", |_| panic!("mod blew up"))
            .with_fn("good", |api| {
                api.register_item(lantern())?;
                Ok(())
            });

        let mods = vec![discovered(tmp.path(), "bad"), discovered(tmp.path(), "good")];
        let mut registry = ContentRegistry::new();
        let reports = run_mods(&mods, &catalog, &mut registry);

        assert!(matches!(&reports[0].outcome, ModOutcome::Failed(msg) if msg.contains("mod blew up")));
        assert_eq!(reports[1].outcome, ModOutcome::Executed);
        assert_eq!(registry.items().len(), 1);
    }

    #[test]
    fn mod_without_entry_point_is_skipped() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("empty")).unwrap();

        let mut registry = ContentRegistry::new();
        let reports = run_mods(&[discovered(tmp.path(), "empty")], &ModCatalog::new(), &mut registry);
        assert_eq!(reports[0].outcome, ModOutcome::Skipped);
        assert!(registry.is_empty());
    }

    #[test]
    fn bad_content_file_fails_that_mod() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("broken").join("src");
        fs::create_dir_all(&src).unwrap();
        fs::write(
            src.join("content.toml"),
            "[[location]]\nname = \"Nowhere\"\nsymbol = \"?\"\n",
        )
        .unwrap();

        let mut registry = ContentRegistry::new();
        let reports = run_mods(&[discovered(tmp.path(), "broken")], &ModCatalog::new(), &mut registry);
        assert!(matches!(reports[0].outcome, ModOutcome::Failed(_)));
        assert!(registry.locations().is_empty());
    }
}
