//! Game configuration and on-disk layout.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Folder created under the user's documents directory.
pub const ROOT_FOLDER: &str = "P2RPG";
pub const SAVES_FOLDER: &str = "Saves";
pub const MODS_FOLDER: &str = "Mods";
pub const CONFIG_FILE: &str = "config.toml";

/// Default data root: `<Documents>/P2RPG`.
///
/// Falls back to the home directory when the platform has no documents
/// folder, and to the working directory when there is no home either.
pub fn default_root() -> PathBuf {
    let base = directories::UserDirs::new()
        .map(|dirs| {
            dirs.document_dir()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| dirs.home_dir().to_path_buf())
        })
        .unwrap_or_else(|| PathBuf::from("."));

    base.join(ROOT_FOLDER)
}

/// The root folder and the two folders under it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GamePaths {
    pub root: PathBuf,
    pub saves: PathBuf,
    pub mods: PathBuf,
}

impl GamePaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            saves: root.join(SAVES_FOLDER),
            mods: root.join(MODS_FOLDER),
            root,
        }
    }

    pub fn config_file(&self) -> PathBuf {
        self.root.join(CONFIG_FILE)
    }
}

/// Bounds of a uniformly random delay, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntervalRange {
    pub min_ms: u64,
    pub max_ms: u64,
}

impl IntervalRange {
    pub const fn new(min_ms: u64, max_ms: u64) -> Self {
        Self { min_ms, max_ms }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecayConfig {
    pub stamina: IntervalRange,
    pub hunger: IntervalRange,
}

impl Default for DecayConfig {
    fn default() -> Self {
        Self {
            stamina: IntervalRange::new(5_000, 15_000),
            hunger: IntervalRange::new(10_000, 25_000),
        }
    }
}

impl DecayConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (stat, range) in [("stamina", self.stamina), ("hunger", self.hunger)] {
            if range.max_ms == 0 {
                return Err(ConfigError::ZeroDecayInterval { stat });
            }
            if range.min_ms > range.max_ms {
                return Err(ConfigError::DecayRange {
                    stat,
                    min_ms: range.min_ms,
                    max_ms: range.max_ms,
                });
            }
        }
        Ok(())
    }
}

/// Contents of `config.toml`. Every field is optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Overrides the default data root.
    pub root: Option<PathBuf>,
    pub tts_enabled: bool,
    pub decay: DecayConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            root: None,
            tts_enabled: true,
            decay: DecayConfig::default(),
        }
    }
}

impl GameConfig {
    /// Read `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        Self::from_toml(&text, path)
    }

    fn from_toml(text: &str, path: &Path) -> Result<Self, ConfigError> {
        let config: GameConfig = toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.decay.validate()?;
        Ok(config)
    }
}
