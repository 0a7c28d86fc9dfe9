pub mod bootstrap;
pub mod companion;
pub mod config;
pub mod decay;
pub mod error;
pub mod game;
pub mod mods;
pub mod world;

pub use bootstrap::{Startup, prepare};
pub use config::{GameConfig, GamePaths};
pub use game::{Game, GameState, Output, OutputBlock};
pub use world::{BaseContent, load_base_content_from_file, load_base_content_from_str};
