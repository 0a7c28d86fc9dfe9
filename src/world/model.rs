use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Map columns.
pub const MAP_WIDTH: usize = 8;
/// Map rows.
pub const MAP_HEIGHT: usize = 6;
/// Glyph shown for cells without a location.
pub const EMPTY_SYMBOL: &str = "·";

//////////////////////////////
/// WORLD STRUCTS AND ENUMS ///
//////////////////////////////

/// A named place with a fixed grid coordinate. Base content and mods both
/// contribute these.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    #[serde(default = "default_symbol")]
    pub symbol: String,
    pub x: usize,
    pub y: usize,
    #[serde(default)]
    pub description: String,
    #[serde(default, rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub connections: Vec<String>,
    #[serde(default)]
    pub activities: Vec<String>,
    #[serde(default)]
    pub npcs: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub danger: Option<String>,
}

fn default_symbol() -> String {
    "📍".to_string()
}

impl Location {
    pub fn position(&self) -> GridPos {
        GridPos::new(self.x, self.y)
    }

    /// The descriptive record that becomes the active location.
    pub fn details(&self) -> LocationDetails {
        LocationDetails {
            name: self.name.clone(),
            description: self.description.clone(),
            kind: self.kind.clone(),
            connections: self.connections.clone(),
            activities: self.activities.clone(),
            npcs: self.npcs.clone(),
            danger: self.danger.clone(),
        }
    }
}

/// The player's current location as stored in the game state and save files.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationDetails {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub connections: Vec<String>,
    #[serde(default)]
    pub activities: Vec<String>,
    #[serde(default)]
    pub npcs: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub danger: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridPos {
    pub x: usize,
    pub y: usize,
}

impl GridPos {
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    pub fn in_bounds(self) -> bool {
        self.x < MAP_WIDTH && self.y < MAP_HEIGHT
    }

    /// The in-bounds orthogonal neighbours: up, down, left, right.
    pub fn neighbours(self) -> Vec<GridPos> {
        let mut out = Vec::with_capacity(4);
        if let Some(y) = self.y.checked_sub(1) {
            out.push(GridPos::new(self.x, y));
        }
        out.push(GridPos::new(self.x, self.y + 1));
        if let Some(x) = self.x.checked_sub(1) {
            out.push(GridPos::new(x, self.y));
        }
        out.push(GridPos::new(self.x + 1, self.y));
        out.retain(|p| p.in_bounds());
        out
    }
}

impl fmt::Display for GridPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CellKind {
    Location,
    #[default]
    Empty,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridCell {
    #[serde(rename = "type")]
    pub kind: CellKind,
    pub name: String,
    pub symbol: String,
    pub discovered: bool,
}

impl GridCell {
    pub fn empty() -> Self {
        GridCell {
            kind: CellKind::Empty,
            name: String::new(),
            symbol: EMPTY_SYMBOL.to_string(),
            discovered: false,
        }
    }

    pub fn is_location(&self) -> bool {
        self.kind == CellKind::Location
    }
}

/// Rows of cells, indexed `[y][x]`.
pub type Grid = [[GridCell; MAP_WIDTH]; MAP_HEIGHT];

/// The revealed map and where the player stands on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorldState {
    pub map: Grid,
    pub discovered: BTreeSet<String>,
    pub current_position: GridPos,
}
