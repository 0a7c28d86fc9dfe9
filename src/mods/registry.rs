use tracing::info;

use crate::error::RecordError;
use crate::game::{ItemRecord, Quest};
use crate::world::{Location, MAP_HEIGHT, MAP_WIDTH};

/// Items, locations and quests contributed by mods.
///
/// Built by the startup sequence, written during the mod pass and only read
/// afterwards. Sequences are append-only and keep registration order.
#[derive(Debug, Default, Clone)]
pub struct ContentRegistry {
    items: Vec<ItemRecord>,
    locations: Vec<Location>,
    quests: Vec<Quest>,
}

impl ContentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registration handle for one mod.
    pub fn api<'a>(&'a mut self, mod_name: &'a str) -> ModApi<'a> {
        ModApi {
            registry: self,
            mod_name,
        }
    }

    pub fn items(&self) -> &[ItemRecord] {
        &self.items
    }

    pub fn locations(&self) -> &[Location] {
        &self.locations
    }

    pub fn quests(&self) -> &[Quest] {
        &self.quests
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty() && self.locations.is_empty() && self.quests.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len() + self.locations.len() + self.quests.len()
    }
}

/// The registration API a mod's entry point receives.
pub struct ModApi<'a> {
    registry: &'a mut ContentRegistry,
    mod_name: &'a str,
}

impl ModApi<'_> {
    pub fn mod_name(&self) -> &str {
        self.mod_name
    }

    pub fn register_item(&mut self, item: ItemRecord) -> Result<(), RecordError> {
        if item.name.trim().is_empty() {
            return Err(RecordError::EmptyField {
                kind: "item",
                field: "name",
            });
        }
        info!(mod_name = %self.mod_name, item = %item.name, "mod registered item");
        self.registry.items.push(item);
        Ok(())
    }

    /// Locations must carry coordinates inside the map.
    pub fn register_location(&mut self, location: Location) -> Result<(), RecordError> {
        if location.name.trim().is_empty() {
            return Err(RecordError::EmptyField {
                kind: "location",
                field: "name",
            });
        }
        if location.x >= MAP_WIDTH || location.y >= MAP_HEIGHT {
            return Err(RecordError::OutOfBounds {
                name: location.name,
                x: location.x,
                y: location.y,
                width: MAP_WIDTH,
                height: MAP_HEIGHT,
            });
        }
        info!(
            mod_name = %self.mod_name,
            location = %location.name,
            x = location.x,
            y = location.y,
            "mod registered location"
        );
        self.registry.locations.push(location);
        Ok(())
    }

    pub fn register_quest(&mut self, quest: Quest) -> Result<(), RecordError> {
        if quest.id.trim().is_empty() {
            return Err(RecordError::EmptyField {
                kind: "quest",
                field: "id",
            });
        }
        if quest.max_progress == 0 {
            return Err(RecordError::ZeroMaxProgress { id: quest.id });
        }
        info!(mod_name = %self.mod_name, quest = %quest.id, "mod registered quest");
        self.registry.quests.push(quest);
        Ok(())
    }
}
