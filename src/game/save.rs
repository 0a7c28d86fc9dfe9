//! Save files: a small JSON envelope around the game state.
//!
//! Loading is tolerant. `character` and `location` must be present and well
//! formed; every other field falls back to a fresh default when it is missing
//! or does not look right.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use super::character::Character;
use super::inventory::{Equipment, Inventory};
use super::quest::Quest;
use super::state::{CompanionProfile, GameState, MAX_EVENTS};
use crate::error::SaveError;
use crate::world::{LocationDetails, WorldState};

pub const SAVE_VERSION: &str = "1.0.0";
pub const GAME_ID: &str = "AI RPG Adventure";
pub const DEVELOPER: &str = "OptimiDev Studios";
pub const SAVE_EXTENSION: &str = "rp2game";

#[derive(Serialize)]
struct SaveFileOut<'a> {
    version: &'static str,
    game: &'static str,
    developer: &'static str,
    timestamp: DateTime<Utc>,
    data: &'a GameState,
}

#[derive(Deserialize)]
struct SaveFileIn {
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    game: Option<String>,
    #[serde(default)]
    timestamp: Option<String>,
    #[serde(default)]
    data: Option<Value>,
}

/// Summary shown when listing saves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveInfo {
    pub game: String,
    pub version: String,
    pub timestamp: String,
    pub character: Character,
    pub location: LocationDetails,
}

impl SaveInfo {
    /// Summary of a game that has not been written yet.
    pub fn of_state(state: &GameState) -> Self {
        SaveInfo {
            game: GAME_ID.to_string(),
            version: SAVE_VERSION.to_string(),
            timestamp: Utc::now().to_rfc3339(),
            character: state.character.clone(),
            location: state.location.clone(),
        }
    }

    pub fn lines(&self) -> Vec<String> {
        vec![
            format!(
                "Character: {} (Level {} {})",
                self.character.name, self.character.level, self.character.class
            ),
            format!("Location: {}", self.location.name),
            format!("Saved: {}", self.timestamp),
            format!("{} v{}", self.game, self.version),
        ]
    }
}

/// `path` with the save extension appended unless it already has it.
pub fn with_save_extension(path: &Path) -> PathBuf {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext == SAVE_EXTENSION => path.to_path_buf(),
        _ => {
            let mut name = path.as_os_str().to_owned();
            name.push(".");
            name.push(SAVE_EXTENSION);
            PathBuf::from(name)
        }
    }
}

/// Write `state` pretty-printed. Returns the path actually written.
pub fn write_save(path: &Path, state: &GameState) -> Result<PathBuf, SaveError> {
    let path = with_save_extension(path);

    let mut snapshot = state.clone();
    snapshot.events.truncate(MAX_EVENTS);

    let file = SaveFileOut {
        version: SAVE_VERSION,
        game: GAME_ID,
        developer: DEVELOPER,
        timestamp: Utc::now(),
        data: &snapshot,
    };
    let json = serde_json::to_string_pretty(&file)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let temp_path = path.with_extension(format!("{SAVE_EXTENSION}.tmp"));
    fs::write(&temp_path, json)?;
    fs::rename(&temp_path, &path)?;

    debug!("Saved game: {}", path.display());
    Ok(path)
}

fn read_envelope(path: &Path) -> Result<SaveFileIn, SaveError> {
    let text = fs::read_to_string(path)?;
    let file: SaveFileIn = serde_json::from_str(&text)?;

    match file.game.as_deref() {
        Some(GAME_ID) => Ok(file),
        other => Err(SaveError::WrongGame(other.unwrap_or_default().to_string())),
    }
}

/// Read a save file and rebuild a game state from it. `fresh` supplies the
/// defaults for anything the save lacks.
pub fn read_save(path: &Path, fresh: GameState) -> Result<GameState, SaveError> {
    let file = read_envelope(path)?;
    let data = file.data.ok_or(SaveError::MissingData)?;
    let state = reconcile(data, fresh)?;
    info!(
        "Loaded save {} ({} level {})",
        path.display(),
        state.character.name,
        state.character.level
    );
    Ok(state)
}

pub fn read_save_info(path: &Path) -> Result<SaveInfo, SaveError> {
    let file = read_envelope(path)?;
    let data = match file.data {
        Some(Value::Object(map)) => map,
        _ => return Err(SaveError::MissingData),
    };
    let (character, location) = required_fields(&data)?;

    Ok(SaveInfo {
        game: GAME_ID.to_string(),
        version: file.version.unwrap_or_default(),
        timestamp: file.timestamp.unwrap_or_default(),
        character,
        location,
    })
}

/// Merge a deserialized `data` object over `fresh`, field by field.
pub fn reconcile(data: Value, fresh: GameState) -> Result<GameState, SaveError> {
    let data = match data {
        Value::Object(map) => map,
        _ => return Err(SaveError::MissingData),
    };

    let (character, location) = required_fields(&data)?;

    let companion = optional_field(&data, "companion", |_: &CompanionProfile| true)
        .unwrap_or(fresh.companion);
    let inventory =
        optional_field(&data, "inventory", Inventory::is_valid).unwrap_or(fresh.inventory);
    let equipment =
        optional_field(&data, "equipment", |_: &Equipment| true).unwrap_or(fresh.equipment);
    let quests = optional_field(&data, "quests", |qs: &Vec<Quest>| qs.iter().all(Quest::is_valid))
        .unwrap_or(fresh.quests);
    let world = optional_field(&data, "world", world_is_plausible).unwrap_or(fresh.world);
    let mut events = optional_field(&data, "events", |_: &Vec<String>| true).unwrap_or_default();
    events.truncate(MAX_EVENTS);

    Ok(GameState {
        character,
        companion,
        location,
        inventory,
        equipment,
        quests,
        world,
        events,
    })
}

fn required_fields(data: &Map<String, Value>) -> Result<(Character, LocationDetails), SaveError> {
    let (Some(character), Some(location)) = (present(data, "character"), present(data, "location"))
    else {
        return Err(SaveError::MissingCharacterOrLocation);
    };

    let character: Character = parse_field("character", character)?;
    if !character.is_valid() {
        return Err(SaveError::MalformedField {
            field: "character",
            message: "a stat exceeds its maximum".to_string(),
        });
    }

    let location: LocationDetails = parse_field("location", location)?;
    if location.name.trim().is_empty() {
        return Err(SaveError::MalformedField {
            field: "location",
            message: "name is empty".to_string(),
        });
    }

    Ok((character, location))
}

fn present<'a>(data: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    data.get(key).filter(|v| !v.is_null())
}

fn parse_field<T: DeserializeOwned>(field: &'static str, value: &Value) -> Result<T, SaveError> {
    T::deserialize(value).map_err(|e| SaveError::MalformedField {
        field,
        message: e.to_string(),
    })
}

fn optional_field<T, F>(data: &Map<String, Value>, key: &str, plausible: F) -> Option<T>
where
    T: DeserializeOwned,
    F: Fn(&T) -> bool,
{
    let value = present(data, key)?;
    match T::deserialize(value) {
        Ok(parsed) if plausible(&parsed) => Some(parsed),
        Ok(_) => {
            warn!(field = key, "save field failed sanity checks, using default");
            None
        }
        Err(e) => {
            warn!(field = key, "save field is malformed, using default: {e}");
            None
        }
    }
}

fn world_is_plausible(world: &WorldState) -> bool {
    world.current_position.in_bounds()
        && world
            .current_cell()
            .map(|c| c.is_location())
            .unwrap_or(false)
}
