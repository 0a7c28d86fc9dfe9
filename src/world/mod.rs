mod loader;
mod map;
mod model;

pub use loader::{BASE_WORLD, BaseContent, load_base_content_from_file, load_base_content_from_str};
pub use map::{coordinates, generate_grid, position_of};
pub use model::{
    CellKind, EMPTY_SYMBOL, Grid, GridCell, GridPos, Location, LocationDetails, MAP_HEIGHT,
    MAP_WIDTH, WorldState,
};
