use std::collections::BTreeSet;

use rand::Rng;
use rand::seq::SliceRandom;

use super::model::{CellKind, Grid, GridCell, GridPos, Location, MAP_HEIGHT, MAP_WIDTH, WorldState};
use crate::error::TravelError;

/// Lay out every coordinate of the map.
///
/// Each cell takes the first location declaring its coordinate, so earlier
/// entries win over later ones. A location cell starts discovered only if its
/// name is in `discovered`.
pub fn generate_grid(locations: &[Location], discovered: &BTreeSet<String>) -> Grid {
    std::array::from_fn(|y| {
        std::array::from_fn(|x| match locations.iter().find(|l| l.x == x && l.y == y) {
            Some(loc) => GridCell {
                kind: CellKind::Location,
                name: loc.name.clone(),
                symbol: loc.symbol.clone(),
                discovered: discovered.contains(&loc.name),
            },
            None => GridCell::empty(),
        })
    })
}

/// Position of `name` in the name → coordinate table (first match).
pub fn position_of(locations: &[Location], name: &str) -> Option<GridPos> {
    locations
        .iter()
        .find(|l| l.name == name)
        .map(Location::position)
}

impl WorldState {
    pub fn new(locations: &[Location], discovered: BTreeSet<String>, start: GridPos) -> Self {
        WorldState {
            map: generate_grid(locations, &discovered),
            discovered,
            current_position: start,
        }
    }

    pub fn cell(&self, pos: GridPos) -> Option<&GridCell> {
        self.map.get(pos.y).and_then(|row| row.get(pos.x))
    }

    pub fn current_cell(&self) -> Option<&GridCell> {
        self.cell(self.current_position)
    }

    /// Undiscovered location cells orthogonally adjacent to the player.
    pub fn undiscovered_neighbours(&self) -> Vec<GridPos> {
        self.current_position
            .neighbours()
            .into_iter()
            .filter(|p| {
                self.cell(*p)
                    .map(|c| c.is_location() && !c.discovered)
                    .unwrap_or(false)
            })
            .collect()
    }

    /// Reveal one random undiscovered neighbour. `None` means there was
    /// nothing to discover.
    pub fn discover_nearby<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<String> {
        let candidates = self.undiscovered_neighbours();
        let pick = *candidates.choose(rng)?;
        Some(self.reveal(pick))
    }

    /// Mark the cell at `pos` discovered. Never hides a cell.
    fn reveal(&mut self, pos: GridPos) -> String {
        let cell = &mut self.map[pos.y][pos.x];
        cell.discovered = true;
        let name = cell.name.clone();
        self.discovered.insert(name.clone());
        name
    }

    /// Move to a discovered location by name.
    pub fn travel(&mut self, name: &str, locations: &[Location]) -> Result<GridPos, TravelError> {
        let pos = position_of(locations, name).ok_or_else(|| TravelError::Unknown(name.to_string()))?;

        match self.cell(pos) {
            Some(cell) if cell.is_location() && cell.name == name => {
                if !cell.discovered {
                    return Err(TravelError::Undiscovered(name.to_string()));
                }
            }
            // Another location claimed this coordinate first; it is not on the map.
            _ => return Err(TravelError::Unknown(name.to_string())),
        }

        self.current_position = pos;
        Ok(pos)
    }

    /// Rebuild the grid for a new location list, keeping what was discovered.
    pub fn regenerate(&mut self, locations: &[Location]) {
        for row in self.map.iter() {
            for cell in row.iter().filter(|c| c.is_location() && c.discovered) {
                self.discovered.insert(cell.name.clone());
            }
        }
        self.map = generate_grid(locations, &self.discovered);
    }

    pub fn discovered_count(&self) -> usize {
        self.map
            .iter()
            .flat_map(|row| row.iter())
            .filter(|c| c.discovered)
            .count()
    }
}

/// All coordinates, row by row.
pub fn coordinates() -> impl Iterator<Item = GridPos> {
    (0..MAP_HEIGHT).flat_map(|y| (0..MAP_WIDTH).map(move |x| GridPos::new(x, y)))
}
