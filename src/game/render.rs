use super::character::Character;
use super::inventory::Inventory;
use super::output::Output;
use super::quest::Quest;
use crate::world::{EMPTY_SYMBOL, GridPos, LocationDetails, WorldState};

/// Glyph for a location cell the player has not found yet.
pub const UNKNOWN_SYMBOL: &str = "?";
/// Glyph for the player's own cell.
pub const PLAYER_SYMBOL: &str = "@";

pub fn render_location(out: &mut Output, location: &LocationDetails) {
    out.title(location.name.clone());

    let mut desc = String::new();
    desc.push_str(location.description.trim());
    if let Some(danger) = location.danger.as_deref().filter(|d| !d.trim().is_empty()) {
        if !desc.is_empty() {
            desc.push(' ');
        }
        desc.push_str(&format!("(Danger: {})", danger.trim()));
    }
    out.say(desc);

    if !location.npcs.is_empty() {
        out.say(format!("People here: {}", location.npcs.join(", ")));
    }
    if !location.activities.is_empty() {
        out.say(format!("You can: {}", location.activities.join(", ")));
    }
    if location.connections.is_empty() {
        out.say("Paths: (none)");
    } else {
        out.say(format!("Paths: {}", location.connections.join(", ")));
    }
}

/// One text line per map row.
pub fn map_rows(world: &WorldState) -> Vec<String> {
    world
        .map
        .iter()
        .enumerate()
        .map(|(y, row)| {
            row.iter()
                .enumerate()
                .map(|(x, cell)| {
                    if world.current_position == GridPos::new(x, y) {
                        PLAYER_SYMBOL
                    } else if !cell.is_location() {
                        EMPTY_SYMBOL
                    } else if cell.discovered {
                        cell.symbol.as_str()
                    } else {
                        UNKNOWN_SYMBOL
                    }
                })
                .collect::<Vec<&str>>()
                .join(" ")
        })
        .collect()
}

pub fn render_map(out: &mut Output, world: &WorldState) {
    out.title("World Map");
    for row in map_rows(world) {
        out.say(row);
    }

    let list = world
        .discovered
        .iter()
        .map(|s| s.as_str())
        .collect::<Vec<&str>>()
        .join(", ");
    out.say(format!("Discovered: {}", list));
}

pub fn render_character(out: &mut Output, character: &Character) {
    out.title(format!(
        "{} {}, level {} {}",
        character.avatar, character.name, character.level, character.class
    ));
    out.say(format!(
        "Health {}  Stamina {}  Hunger {}  Experience {}",
        character.health, character.stamina, character.hunger, character.experience
    ));
    let a = &character.attributes;
    out.say(format!(
        "STR {}  DEX {}  INT {}  WIS {}  CHA {}  CON {}",
        a.strength, a.dexterity, a.intelligence, a.wisdom, a.charisma, a.constitution
    ));
}

pub fn render_inventory(out: &mut Output, inventory: &Inventory) {
    out.title("Inventory");

    let mut any = false;
    for slot in inventory.slots() {
        let Some(item) = &slot.item else { continue };
        any = true;

        let mut line = format!("[{}] {} {}", slot.id, item.icon, item.name);
        if let Some(effect) = &item.effect {
            line.push_str(&format!(" ({})", effect));
        }
        if let Some(damage) = item.damage {
            line.push_str(&format!(" (damage {})", damage));
        }
        out.say(line);
    }

    if !any {
        out.say("You are carrying nothing.");
    }
}

pub fn render_quests(out: &mut Output, quests: &[Quest]) {
    out.title("Quests");
    if quests.is_empty() {
        out.say("No quests.");
        return;
    }

    for q in quests {
        let mark = if q.completed { "x" } else { " " };
        out.say(format!(
            "[{}] {} - {}/{} ({}%)",
            mark,
            q.title,
            q.progress,
            q.max_progress,
            q.percent()
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::GameState;
    use crate::world::BaseContent;

    #[test]
    fn map_hides_undiscovered_locations() {
        let base = BaseContent::builtin().unwrap();
        let state = GameState::fresh(&base, &base.locations);
        let rows = map_rows(&state.world);

        assert_eq!(rows.len(), 6);
        let row2: Vec<&str> = rows[2].split(' ').collect();
        assert_eq!(row2.len(), 8);
        assert_eq!(row2[3], PLAYER_SYMBOL);
        assert_eq!(row2[0], UNKNOWN_SYMBOL);
        assert_eq!(row2[1], EMPTY_SYMBOL);
    }

    #[test]
    fn empty_inventory_says_so() {
        let mut out = Output::new();
        render_inventory(&mut out, &Inventory::default());
        assert!(out.blocks.iter().any(|b| b.text() == "You are carrying nothing."));
    }
}
