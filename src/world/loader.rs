use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::Path;

use super::model::{Location, MAP_HEIGHT, MAP_WIDTH};
use crate::game::{CompanionProfile, INVENTORY_SLOTS, ItemRecord, Quest};

/// Content shipped with the game, embedded at build time.
pub const BASE_WORLD: &str = include_str!("../../data/base_world.toml");

/// The built-in world before any mod content is merged in.
#[derive(Debug, Clone)]
pub struct BaseContent {
    pub start_location: String,
    pub discovered: Vec<String>,
    pub locations: Vec<Location>,
    pub items: Vec<ItemRecord>,
    pub quests: Vec<Quest>,
    pub companion: CompanionProfile,
}

impl BaseContent {
    /// The embedded base world.
    pub fn builtin() -> io::Result<Self> {
        load_base_content_from_str(BASE_WORLD)
    }

    pub fn start(&self) -> Option<&Location> {
        self.locations.iter().find(|l| l.name == self.start_location)
    }
}

////////////////////
/// TOML STRUCTS ///
////////////////////

#[derive(Deserialize)]
struct WorldFile {
    world: WorldHeader,
    #[serde(default)]
    location: Vec<Location>, // [[location]] blocks
    #[serde(default)]
    item: Vec<ItemRecord>, // [[item]] blocks, in starting slot order
    #[serde(default)]
    quest: Vec<Quest>, // [[quest]] blocks
    #[serde(default)]
    companion: CompanionProfile,
}

#[derive(Deserialize)]
struct WorldHeader {
    start_location: String,
    #[serde(default)]
    discovered: Vec<String>,
}

/////////////////////////////
/// TOML PARSER FUNCTIONS ///
/////////////////////////////

/// Public API: load base content from a .toml file on disk.
pub fn load_base_content_from_file(path: &Path) -> io::Result<BaseContent> {
    let contents = fs::read_to_string(path)?;
    load_base_content_from_str(&contents)
}

pub fn load_base_content_from_str(contents: &str) -> io::Result<BaseContent> {
    let file: WorldFile =
        toml::from_str(contents).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e.to_string()))?;

    if file.world.start_location.trim().is_empty() {
        return Err(invalid("world.start_location may not be empty"));
    }

    let mut names: HashSet<&str> = HashSet::new();
    for loc in &file.location {
        if loc.name.trim().is_empty() {
            return Err(invalid("location name may not be empty"));
        }
        if !names.insert(loc.name.as_str()) {
            return Err(invalid(format!("Duplicate location name: {}", loc.name)));
        }
        if loc.x >= MAP_WIDTH || loc.y >= MAP_HEIGHT {
            return Err(invalid(format!(
                "location '{}' at ({}, {}) is outside the {}x{} map",
                loc.name, loc.x, loc.y, MAP_WIDTH, MAP_HEIGHT
            )));
        }
    }

    if !names.contains(file.world.start_location.as_str()) {
        return Err(invalid(format!(
            "start_location '{}' not found among locations",
            file.world.start_location
        )));
    }

    for name in &file.world.discovered {
        if !names.contains(name.as_str()) {
            return Err(invalid(format!(
                "discovered location '{}' not found among locations",
                name
            )));
        }
    }

    if file.item.len() > INVENTORY_SLOTS {
        return Err(invalid(format!(
            "{} starting items do not fit in {} inventory slots",
            file.item.len(),
            INVENTORY_SLOTS
        )));
    }

    let mut quest_ids: HashSet<&str> = HashSet::new();
    for quest in &file.quest {
        if !quest_ids.insert(quest.id.as_str()) {
            return Err(invalid(format!("Duplicate quest id: {}", quest.id)));
        }
        if quest.max_progress == 0 {
            return Err(invalid(format!("quest '{}' has a zero maxProgress", quest.id)));
        }
    }

    let locations = file
        .location
        .into_iter()
        .map(|loc| Location {
            description: normalize_multiline_desc(&loc.description),
            ..loc
        })
        .collect();

    let quests = file
        .quest
        .into_iter()
        .map(|q| Quest {
            description: normalize_multiline_desc(&q.description),
            ..q
        })
        .collect();

    let mut discovered = file.world.discovered;
    if !discovered.contains(&file.world.start_location) {
        discovered.push(file.world.start_location.clone());
    }

    Ok(BaseContent {
        start_location: file.world.start_location,
        discovered,
        locations,
        items: file.item,
        quests,
        companion: file.companion,
    })
}

/// Collapse TOML line wrapping: a single newline becomes a space, one blank
/// line a newline, two or more a paragraph break.
pub(crate) fn normalize_multiline_desc(raw: &str) -> String {
    let mut result = String::new();
    let mut pending_blank_lines = 0usize;

    for line in raw.lines() {
        let trimmed = line.trim();

        if trimmed.is_empty() {
            pending_blank_lines += 1;
            continue;
        }

        if !result.is_empty() {
            match pending_blank_lines {
                0 => result.push(' '),
                1 => result.push('\n'),
                _ => result.push_str("\n\n"),
            }
        }
        result.push_str(trimmed);
        pending_blank_lines = 0;
    }

    result
}

fn invalid(msg: impl Into<String>) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, msg.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{ItemEffect, Stat};

    #[test]
    fn builtin_world_loads() {
        let base = BaseContent::builtin().unwrap();
        assert_eq!(base.start_location, "Village of Eldoria");
        assert_eq!(base.locations.len(), 6);
        assert_eq!(base.items.len(), 3);
        assert_eq!(base.quests.len(), 2);
        assert_eq!(base.companion.name, "Aria");
        assert_eq!(base.discovered, vec!["Village of Eldoria"]);

        let forest = base.locations.iter().find(|l| l.name == "Forest Path").unwrap();
        assert_eq!((forest.x, forest.y), (2, 3));

        assert_eq!(
            base.items[0].effect,
            Some(ItemEffect::Restore {
                stat: Stat::Hunger,
                amount: 15
            })
        );
    }

    #[test]
    fn start_location_must_exist() {
        let err = load_base_content_from_str(
            "[world]\nstart_location = \"Nowhere\"\n\n[[location]]\nname = \"Somewhere\"\nx = 0\ny = 0\n",
        )
        .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
        assert!(err.to_string().contains("Nowhere"));
    }

    #[test]
    fn duplicate_location_names_are_rejected() {
        let err = load_base_content_from_str(
            r#"
[world]
start_location = "Camp"

[[location]]
name = "Camp"
x = 0
y = 0

[[location]]
name = "Camp"
x = 1
y = 0
"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("Duplicate location name"));
    }

    #[test]
    fn out_of_bounds_location_is_rejected() {
        let err = load_base_content_from_str(
            "[world]\nstart_location = \"Edge\"\n\n[[location]]\nname = \"Edge\"\nx = 8\ny = 0\n",
        )
        .unwrap_err();
        assert!(err.to_string().contains("outside"));
    }

    #[test]
    fn descriptions_are_unwrapped() {
        assert_eq!(normalize_multiline_desc("  one\n  two\n\n  three"), "one two\nthree");
        assert_eq!(normalize_multiline_desc("a\n\n\n\nb"), "a\n\nb");

        let base = BaseContent::builtin().unwrap();
        assert!(base.locations.iter().all(|l| !l.description.contains('\n')));
    }

    #[test]
    fn start_location_is_always_discovered() {
        let base = load_base_content_from_str(
            "[world]\nstart_location = \"Camp\"\n\n[[location]]\nname = \"Camp\"\nx = 0\ny = 0\n",
        )
        .unwrap();
        assert_eq!(base.discovered, vec!["Camp"]);
    }
}
