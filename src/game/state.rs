use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::character::Character;
use super::inventory::{Equipment, Inventory};
use super::quest::Quest;
use crate::world::{BaseContent, GridPos, Location, LocationDetails, WorldState};

/// Events kept in the log, newest first.
pub const MAX_EVENTS: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanionProfile {
    pub name: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub avatar: String,
    #[serde(default)]
    pub personality: String,
    #[serde(default)]
    pub knowledge: Vec<String>,
}

impl Default for CompanionProfile {
    fn default() -> Self {
        Self {
            name: "Companion".to_string(),
            role: String::new(),
            status: "Ready to assist".to_string(),
            avatar: "🤖".to_string(),
            personality: String::new(),
            knowledge: Vec::new(),
        }
    }
}

/// Everything a save file stores.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    pub character: Character,
    pub companion: CompanionProfile,
    pub location: LocationDetails,
    pub inventory: Inventory,
    pub equipment: Equipment,
    pub quests: Vec<Quest>,
    pub world: WorldState,
    pub events: Vec<String>,
}

impl GameState {
    /// A new game built from base content only. `atlas` is every location the
    /// map should know about, base first.
    pub fn fresh(base: &BaseContent, atlas: &[Location]) -> Self {
        let start = base.start();
        let location = start.map(Location::details).unwrap_or_else(|| LocationDetails {
            name: base.start_location.clone(),
            ..LocationDetails::default()
        });
        let position = start.map(Location::position).unwrap_or_default();
        let discovered: BTreeSet<String> = base.discovered.iter().cloned().collect();

        GameState {
            character: Character::default(),
            companion: base.companion.clone(),
            location,
            inventory: Inventory::with_items(&base.items),
            equipment: Equipment::default(),
            quests: base.quests.iter().map(Quest::fresh).collect(),
            world: WorldState::new(atlas, discovered, position),
            events: Vec::new(),
        }
    }

    pub fn push_event(&mut self, message: impl Into<String>) {
        self.events.insert(0, message.into());
        self.events.truncate(MAX_EVENTS);
    }

    pub fn active_quests(&self) -> impl Iterator<Item = &Quest> {
        self.quests.iter().filter(|q| !q.completed)
    }

    pub fn quest_mut(&mut self, id: &str) -> Option<&mut Quest> {
        self.quests.iter_mut().find(|q| q.id == id)
    }

    pub fn position(&self) -> GridPos {
        self.world.current_position
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_state_starts_in_the_village() {
        let base = BaseContent::builtin().unwrap();
        let state = GameState::fresh(&base, &base.locations);

        assert_eq!(state.location.name, "Village of Eldoria");
        assert_eq!(state.position(), GridPos::new(3, 2));
        assert_eq!(state.inventory.filled(), 3);
        assert_eq!(state.quests.len(), 2);
        assert!(state.world.discovered.contains("Village of Eldoria"));
        assert!(state.world.map[2][3].discovered);
    }

    #[test]
    fn event_log_is_capped_newest_first() {
        let base = BaseContent::builtin().unwrap();
        let mut state = GameState::fresh(&base, &base.locations);
        for i in 0..15 {
            state.push_event(format!("event {i}"));
        }
        assert_eq!(state.events.len(), MAX_EVENTS);
        assert_eq!(state.events[0], "event 14");
        assert_eq!(state.events[9], "event 5");
    }
}
