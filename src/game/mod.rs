mod character;
mod inventory;
mod output;
mod quest;
mod render;
mod save;
mod state;

use std::path::{Path, PathBuf};

use rand::Rng;
use rand::seq::SliceRandom;
use serde_json::Value;
use tracing::{debug, info, warn};

pub use character::{Attributes, Character, Meter, Stat};
pub use inventory::{
    Equipment, INVENTORY_SLOTS, InventorySlot, Inventory, ItemEffect, ItemKind, ItemRecord,
    MOD_ITEM_SLOT_OFFSET,
};
pub use output::{Output, OutputBlock};
pub use quest::{Quest, QuestRewards};
pub use render::{
    PLAYER_SYMBOL, UNKNOWN_SYMBOL, map_rows, render_character, render_inventory, render_location,
    render_map, render_quests,
};
pub use save::{
    DEVELOPER, GAME_ID, SAVE_EXTENSION, SAVE_VERSION, SaveInfo, read_save, read_save_info,
    reconcile, with_save_extension, write_save,
};
pub use state::{CompanionProfile, GameState, MAX_EVENTS};

use crate::error::SaveError;
use crate::mods::ContentRegistry;
use crate::world::{BaseContent, Location, position_of};

/// Quest advanced by exploring.
pub const EXPLORE_QUEST_ID: &str = "explore_village";

const REST_HEALTH: u32 = 20;
const REST_STAMINA: u32 = 30;

const EXPLORE_EVENTS: [&str; 5] = [
    "You discover a hidden path leading deeper into the area.",
    "A mysterious object catches your eye in the distance.",
    "You find some useful herbs growing nearby.",
    "The area seems peaceful and undisturbed.",
    "You notice some interesting footprints on the ground.",
];

/// What merging mod content into a game did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeReport {
    pub items_placed: usize,
    pub items_dropped: usize,
    pub locations_added: usize,
    pub quests_added: usize,
}

/// Splice registry items into the inventory from slot 3 and append registry
/// quests with their progress cleared. Registry locations reach the map
/// through the atlas the state was built from.
pub fn merge_mod_content(state: &mut GameState, registry: &ContentRegistry) -> MergeReport {
    let items = registry.items();
    let dropped = state.inventory.splice_from(MOD_ITEM_SLOT_OFFSET, items);
    if dropped > 0 {
        warn!(
            dropped,
            "mod items did not fit in the inventory and were dropped"
        );
    }

    state
        .quests
        .extend(registry.quests().iter().map(Quest::fresh));

    MergeReport {
        items_placed: items.len() - dropped,
        items_dropped: dropped,
        locations_added: registry.locations().len(),
        quests_added: registry.quests().len(),
    }
}

/// A running game: its state plus the content it was built from.
pub struct Game {
    state: GameState,
    base: BaseContent,
    mods: ContentRegistry,
    atlas: Vec<Location>,
    last_merge: MergeReport,
}

impl Game {
    pub fn new(base: BaseContent, mods: ContentRegistry) -> Self {
        let atlas: Vec<Location> = base
            .locations
            .iter()
            .chain(mods.locations().iter())
            .cloned()
            .collect();

        let mut game = Game {
            state: GameState::fresh(&base, &atlas),
            base,
            mods,
            atlas,
            last_merge: MergeReport::default(),
        };
        game.last_merge = merge_mod_content(&mut game.state, &game.mods);
        info!(report = ?game.last_merge, "mod content merged");
        game
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Every location the map knows, base content first.
    pub fn atlas(&self) -> &[Location] {
        &self.atlas
    }

    pub fn last_merge(&self) -> MergeReport {
        self.last_merge
    }

    fn fresh_state(&self) -> (GameState, MergeReport) {
        let mut state = GameState::fresh(&self.base, &self.atlas);
        let report = merge_mod_content(&mut state, &self.mods);
        (state, report)
    }

    fn log(&mut self, out: &mut Output, message: impl Into<String>) {
        let message = message.into();
        out.event(message.clone());
        self.state.push_event(message);
    }

    pub fn start_new_game(&mut self, name: &str) -> Output {
        let (mut state, report) = self.fresh_state();
        let name = name.trim();
        if !name.is_empty() {
            state.character.name = name.to_string();
        }
        self.state = state;
        self.last_merge = report;
        info!(character = %self.state.character.name, "new game started");

        let mut out = Output::new();
        self.log(
            &mut out,
            format!("{} begins their adventure.", self.state.character.name),
        );
        render_location(&mut out, &self.state.location);
        out
    }

    pub fn look(&self) -> Output {
        let mut out = Output::new();
        render_location(&mut out, &self.state.location);
        out
    }

    pub fn show_map(&self) -> Output {
        let mut out = Output::new();
        render_map(&mut out, &self.state.world);
        out
    }

    pub fn show_character(&self) -> Output {
        let mut out = Output::new();
        render_character(&mut out, &self.state.character);
        out
    }

    pub fn show_inventory(&self) -> Output {
        let mut out = Output::new();
        render_inventory(&mut out, &self.state.inventory);
        out
    }

    pub fn show_quests(&self) -> Output {
        let mut out = Output::new();
        render_quests(&mut out, &self.state.quests);
        out
    }

    pub fn show_events(&self) -> Output {
        let mut out = Output::new();
        out.title("Recent events");
        for e in &self.state.events {
            out.say(e.clone());
        }
        out
    }

    fn gain_experience(&mut self, out: &mut Output, amount: u32) {
        for level in self.state.character.gain_experience(amount) {
            self.log(out, format!("🎉 Level Up! You are now level {}!", level));
            out.companion(format!(
                "Congratulations on reaching level {}! You're growing stronger with each adventure.",
                level
            ));
        }
    }

    pub fn explore<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Output {
        let mut out = Output::new();
        let event = EXPLORE_EVENTS
            .choose(rng)
            .copied()
            .unwrap_or(EXPLORE_EVENTS[0]);
        self.log(&mut out, event);

        let mut completed = None;
        if let Some(q) = self.state.quest_mut(EXPLORE_QUEST_ID) {
            if q.advance(1) {
                completed = Some((q.title.clone(), q.rewards.experience));
            }
        }
        if let Some((title, experience)) = completed {
            self.log(&mut out, format!("Quest completed: {}!", title));
            self.gain_experience(&mut out, experience);
        }

        out.companion(format!("I sense something interesting in this area. {}", event));
        out
    }

    pub fn rest(&mut self) -> Output {
        let mut out = Output::new();
        self.state.character.health.restore(REST_HEALTH);
        self.state.character.stamina.restore(REST_STAMINA);
        self.log(
            &mut out,
            format!(
                "You rest and recover {} health and {} stamina.",
                REST_HEALTH, REST_STAMINA
            ),
        );
        out.companion("Rest is important for any adventurer. You should feel refreshed now!");
        out
    }

    pub fn craft(&mut self) -> Output {
        let mut out = Output::new();
        self.log(
            &mut out,
            "You attempt to craft something, but you need more materials and knowledge.",
        );
        out.companion(
            "Crafting requires specific materials and recipes. Perhaps we should explore more to find what you need?",
        );
        out
    }

    pub fn shop(&mut self) -> Output {
        let mut out = Output::new();
        self.log(
            &mut out,
            "You look around for merchants, but none are currently available in this area.",
        );
        out.companion("Merchants can be found in villages and towns. Let's travel to find one!");
        out
    }

    pub fn quest_summary(&mut self) -> Output {
        let mut out = Output::new();
        let active = self.state.active_quests().count();
        if active > 0 {
            self.log(
                &mut out,
                format!("You check your quest log. You have {} active quest(s).", active),
            );
            out.companion(format!(
                "I can help you with your quests! You currently have {} active quest(s).",
                active
            ));
        } else {
            self.log(&mut out, "You have no active quests at the moment.");
            out.companion(
                "You've completed all available quests! Let's explore to find new adventures.",
            );
        }
        out
    }

    pub fn travel_hint(&mut self) -> Output {
        let mut out = Output::new();
        self.log(
            &mut out,
            "You consider your travel options. Where would you like to go?",
        );
        out.companion(
            "I can help you navigate to different locations. Use the map to see where you can travel!",
        );
        out
    }

    pub fn discover_nearby<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Output {
        let mut out = Output::new();
        match self.state.world.discover_nearby(rng) {
            Some(name) => {
                info!(location = %name, "location discovered");
                self.log(&mut out, format!("You discovered a new place: {}!", name));
            }
            None => self.log(&mut out, "No undiscovered locations nearby!"),
        }
        out
    }

    pub fn travel_to(&mut self, name: &str) -> Output {
        let mut out = Output::new();
        if let Err(e) = self.state.world.travel(name, &self.atlas) {
            out.say(format!("You can't go there: {}.", e));
            return out;
        }

        let details = self
            .atlas
            .iter()
            .find(|l| l.name == name)
            .map(Location::details)
            .unwrap_or_default();
        self.state.location = details;

        self.log(&mut out, format!("You travel to {}.", name));
        render_location(&mut out, &self.state.location);
        out.companion(format!(
            "Welcome to {}! {}",
            name, self.state.location.description
        ));
        out
    }

    pub fn use_item(&mut self, slot: usize) -> Output {
        let mut out = Output::new();
        let Some(item) = self.state.inventory.get(slot).cloned() else {
            out.say(format!("There is nothing in slot {}.", slot));
            return out;
        };

        match item.effect {
            Some(effect @ ItemEffect::Restore { stat, amount }) => {
                self.state.character.meter_mut(stat).restore(amount);
                if item.kind.is_consumable() {
                    self.state.inventory.take(slot);
                }
                self.log(&mut out, format!("You used the {} and {}.", item.name, effect));
            }
            None => {
                self.log(&mut out, format!("You examine {}.", item.name));
                out.companion(format!("That's a {}. It might be useful later!", item.name));
            }
        }
        out
    }

    /// One decay tick: the stat loses a point, never going below zero.
    pub fn apply_decay(&mut self, stat: Stat) -> Output {
        let meter = self.state.character.meter_mut(stat);
        meter.drain(1);
        debug!(%stat, current = meter.current, "stat decayed");
        Output::new()
    }

    pub fn save_info_lines(&self) -> Output {
        let mut out = Output::new();
        out.title("Save game");
        for line in SaveInfo::of_state(&self.state).lines() {
            out.say(line);
        }
        out
    }

    /// Write the current state under `dir` (or to `name` if it is a path).
    pub fn save_to(&self, dir: &Path, name: &str) -> Result<PathBuf, SaveError> {
        write_save(&dir.join(name), &self.state)
    }

    /// Replace the state with a loaded one. On error nothing changes.
    pub fn load_from(&mut self, data: Value) -> Result<(), SaveError> {
        let (fresh, _) = self.fresh_state();
        let state = reconcile(data, fresh)?;
        self.install(state);
        Ok(())
    }

    pub fn load_file(&mut self, path: &Path) -> Result<(), SaveError> {
        let (fresh, _) = self.fresh_state();
        let state = read_save(path, fresh)?;
        self.install(state);
        Ok(())
    }

    fn install(&mut self, mut state: GameState) {
        // Content may have changed since the save was written.
        state.world.regenerate(&self.atlas);
        let on_location = state
            .world
            .current_cell()
            .map(|c| c.is_location())
            .unwrap_or(false);
        if !on_location {
            let fallback = match position_of(&self.atlas, &state.location.name) {
                Some(pos) => pos,
                None => {
                    let start = self.base.start();
                    if let Some(start) = start {
                        state.location = start.details();
                    }
                    start.map(Location::position).unwrap_or_default()
                }
            };
            warn!(%fallback, "saved position is no longer a location, moving player");
            state.world.current_position = fallback;
        }
        self.state = state;
    }

    /// Dispatch one typed command. `None` if the command is not a game action.
    pub fn step<R: Rng + ?Sized>(&mut self, input: &str, rng: &mut R) -> Option<Output> {
        let input = input.trim();
        let mut parts = input.splitn(2, char::is_whitespace);
        let verb = parts.next().unwrap_or("").to_lowercase();
        let rest = parts.next().unwrap_or("").trim();

        let out = match verb.as_str() {
            "look" | "l" => self.look(),
            "map" | "m" => self.show_map(),
            "stats" | "character" | "c" => self.show_character(),
            "inventory" | "inv" | "i" => self.show_inventory(),
            "quests" | "q" => self.show_quests(),
            "log" | "events" => self.show_events(),
            "explore" => self.explore(rng),
            "rest" => self.rest(),
            "craft" => self.craft(),
            "shop" => self.shop(),
            "quest" => self.quest_summary(),
            "discover" => self.discover_nearby(rng),
            "travel" | "go" => {
                if rest.is_empty() {
                    self.travel_hint()
                } else {
                    match self.resolve_location(rest) {
                        Some(name) => self.travel_to(&name),
                        None => self.travel_to(rest),
                    }
                }
            }
            "use" => match rest.parse::<usize>() {
                Ok(slot) => self.use_item(slot),
                Err(_) => {
                    let mut out = Output::new();
                    out.say("Use which slot? (e.g. 'use 0')");
                    out
                }
            },
            _ => return None,
        };
        Some(out)
    }

    /// Case-insensitive lookup of a location name.
    fn resolve_location(&self, name: &str) -> Option<String> {
        self.atlas
            .iter()
            .find(|l| l.name.eq_ignore_ascii_case(name))
            .map(|l| l.name.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::GridPos;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn base() -> BaseContent {
        BaseContent::builtin().unwrap()
    }

    fn item(name: &str) -> ItemRecord {
        ItemRecord {
            name: name.to_string(),
            kind: ItemKind::Misc,
            icon: String::new(),
            effect: None,
            damage: None,
        }
    }

    fn registry_with(items: usize, locations: Vec<Location>, quests: Vec<Quest>) -> ContentRegistry {
        let mut registry = ContentRegistry::new();
        let mut api = registry.api("test-mod");
        for i in 0..items {
            api.register_item(item(&format!("Relic {i}"))).unwrap();
        }
        for l in locations {
            api.register_location(l).unwrap();
        }
        for q in quests {
            api.register_quest(q).unwrap();
        }
        registry
    }

    #[test]
    fn twenty_five_mod_items_overflow_by_four() {
        let game = Game::new(base(), registry_with(25, vec![], vec![]));
        let report = game.last_merge();
        assert_eq!(report.items_placed, 21);
        assert_eq!(report.items_dropped, 4);

        let inv = &game.state().inventory;
        assert_eq!(inv.filled(), INVENTORY_SLOTS);
        assert_eq!(inv.get(2).map(|i| i.name.as_str()), Some("Simple Dagger"));
        assert_eq!(inv.get(3).map(|i| i.name.as_str()), Some("Relic 0"));
        assert_eq!(inv.get(23).map(|i| i.name.as_str()), Some("Relic 20"));
    }

    #[test]
    fn mod_quests_start_fresh_and_locations_join_the_map() {
        let quest = Quest {
            id: "dragon".to_string(),
            title: "Slay the dragon".to_string(),
            description: String::new(),
            progress: 7,
            max_progress: 10,
            rewards: QuestRewards::default(),
            completed: true,
        };
        let tower = Location {
            name: "Wizard Tower".to_string(),
            x: 3,
            y: 1,
            ..Location::default()
        };
        let mut game = Game::new(base(), registry_with(0, vec![tower], vec![quest]));

        let q = game.state().quests.last().unwrap();
        assert_eq!(q.id, "dragon");
        assert_eq!(q.progress, 0);
        assert!(!q.completed);
        assert_eq!(game.last_merge().locations_added, 1);
        assert_eq!(game.state().world.map[1][3].name, "Wizard Tower");

        // (3,1) is straight above the village.
        let mut rng = StdRng::seed_from_u64(3);
        let out = game.discover_nearby(&mut rng);
        assert_eq!(
            out.events().collect::<Vec<_>>(),
            vec!["You discovered a new place: Wizard Tower!"]
        );
        let out = game.travel_to("Wizard Tower");
        assert!(out.events().any(|e| e == "You travel to Wizard Tower."));
        assert_eq!(game.state().position(), GridPos::new(3, 1));
        assert_eq!(game.state().location.name, "Wizard Tower");
    }

    #[test]
    fn new_game_reapplies_merge() {
        let mut game = Game::new(base(), registry_with(2, vec![], vec![]));
        game.use_item(0);
        game.start_new_game("Mira");
        assert_eq!(game.state().character.name, "Mira");
        assert_eq!(game.state().inventory.filled(), 5);
        assert_eq!(game.state().events.len(), 1);
    }

    #[test]
    fn exploring_completes_the_village_quest() {
        let mut game = Game::new(base(), ContentRegistry::new());
        let mut rng = StdRng::seed_from_u64(11);

        game.explore(&mut rng);
        game.explore(&mut rng);
        let out = game.explore(&mut rng);

        assert!(out.events().any(|e| e == "Quest completed: Explore the Village!"));
        let character = &game.state().character;
        assert_eq!(character.level, 2);
        assert_eq!(character.experience, Meter { current: 0, max: 150 });

        // Completed quests stay put.
        game.explore(&mut rng);
        let q = game.state().quests.iter().find(|q| q.id == EXPLORE_QUEST_ID).unwrap();
        assert_eq!(q.progress, 3);
        assert_eq!(game.state().character.level, 2);
    }

    #[test]
    fn rest_saturates() {
        let mut game = Game::new(base(), ContentRegistry::new());
        game.state.character.health.current = 90;
        game.state.character.stamina.current = 50;
        let out = game.rest();
        assert_eq!(game.state().character.health.current, 100);
        assert_eq!(game.state().character.stamina.current, 80);
        assert_eq!(
            out.events().collect::<Vec<_>>(),
            vec!["You rest and recover 20 health and 30 stamina."]
        );
    }

    #[test]
    fn consumables_are_used_up() {
        let mut game = Game::new(base(), ContentRegistry::new());
        game.state.character.hunger.current = 50;

        let out = game.use_item(0);
        assert_eq!(
            out.events().collect::<Vec<_>>(),
            vec!["You used the Bread and restore 15 hunger."]
        );
        assert_eq!(game.state().character.hunger.current, 65);
        assert!(game.state().inventory.get(0).is_none());

        let out = game.use_item(2);
        assert_eq!(out.events().collect::<Vec<_>>(), vec!["You examine Simple Dagger."]);
        assert!(game.state().inventory.get(2).is_some());
    }

    #[test]
    fn travel_is_refused_for_hidden_places() {
        let mut game = Game::new(base(), ContentRegistry::new());
        let before = game.state().clone();
        let out = game.travel_to("Dark Cave");
        assert!(out.events().next().is_none());
        assert_eq!(game.state(), &before);
    }

    #[test]
    fn decay_floors_at_zero() {
        let mut game = Game::new(base(), ContentRegistry::new());
        game.state.character.hunger.current = 1;
        game.apply_decay(Stat::Hunger);
        game.apply_decay(Stat::Hunger);
        assert_eq!(game.state().character.hunger.current, 0);
    }

    #[test]
    fn failed_load_keeps_the_current_game() {
        let mut game = Game::new(base(), ContentRegistry::new());
        game.start_new_game("Keeper");
        let before = game.state().clone();

        let result = game.load_from(serde_json::json!({ "location": { "name": "Forest Path" } }));
        assert!(matches!(result, Err(SaveError::MissingCharacterOrLocation)));
        assert_eq!(game.state(), &before);
    }

    #[test]
    fn loading_without_the_mod_moves_player_back_to_start() {
        let tower = Location {
            name: "Wizard Tower".to_string(),
            x: 3,
            y: 1,
            ..Location::default()
        };
        let mut modded = Game::new(base(), registry_with(0, vec![tower], vec![]));
        modded.start_new_game("Vell");
        let mut rng = StdRng::seed_from_u64(3);
        modded.discover_nearby(&mut rng);
        modded.travel_to("Wizard Tower");
        assert_eq!(modded.state().position(), GridPos::new(3, 1));
        let saved = serde_json::to_value(modded.state()).unwrap();

        let mut plain = Game::new(base(), ContentRegistry::new());
        plain.load_from(saved).unwrap();

        let state = plain.state();
        assert_eq!(state.character.name, "Vell");
        assert_eq!(state.position(), GridPos::new(3, 2));
        assert_eq!(state.location.name, "Village of Eldoria");
        assert!(!state.world.map[1][3].is_location());
        assert!(state.world.current_cell().is_some_and(|c| c.is_location()));
    }

    #[test]
    fn step_dispatches_known_verbs() {
        let mut game = Game::new(base(), ContentRegistry::new());
        let mut rng = StdRng::seed_from_u64(5);
        assert!(game.step("rest", &mut rng).is_some());
        assert!(game.step("travel village of eldoria", &mut rng).is_some());
        assert!(game.step("dance", &mut rng).is_none());
    }
}
