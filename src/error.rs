//! Error types shared across the crate.
//!
//! Manifest problems are not errors: they travel on the descriptor as a
//! [`ManifestIssue`](crate::mods::ManifestIssue) so the mod still takes part in
//! dependency checks.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::mods::DependencyViolation;

/// Fatal conditions raised before any game state exists.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to create folder {path}: {source}")]
    CreateFolder {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to scan mods folder {path}: {source}")]
    Scan {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{} mod(s) are missing required dependencies", .0.len())]
    MissingDependencies(Vec<DependencyViolation>),

    #[error("mod names claimed by more than one folder: {}", .0.join(", "))]
    DuplicateModNames(Vec<String>),
}

/// A record handed to the registration API failed its schema check.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    #[error("{kind} record has an empty {field}")]
    EmptyField {
        kind: &'static str,
        field: &'static str,
    },

    #[error("location '{name}' at ({x}, {y}) lies outside the {width}x{height} map")]
    OutOfBounds {
        name: String,
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    },

    #[error("quest '{id}' must have a max_progress greater than zero")]
    ZeroMaxProgress { id: String },
}

/// Failure of a single mod's entry point. Isolated to that mod.
#[derive(Debug, Error)]
pub enum ModError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid content file {path}: {message}")]
    Content { path: PathBuf, message: String },

    #[error("rejected record: {0}")]
    Rejected(#[from] RecordError),

    #[error("entry point panicked: {0}")]
    Panicked(String),
}

#[derive(Debug, Error)]
pub enum SaveError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid save file format")]
    WrongGame(String),

    #[error("Invalid save file format")]
    MissingData,

    #[error("Invalid save file format: character and location are required")]
    MissingCharacterOrLocation,

    #[error("Invalid save file format: field '{field}' is malformed: {message}")]
    MalformedField {
        field: &'static str,
        message: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TravelError {
    #[error("there is no place called '{0}'")]
    Unknown(String),

    #[error("'{0}' has not been discovered yet")]
    Undiscovered(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompanionError {
    #[error("companion service unavailable: {0}")]
    Unavailable(String),

    #[error("companion request failed: {0}")]
    Request(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("decay interval for {stat} must allow a delay above 0ms")]
    ZeroDecayInterval { stat: &'static str },

    #[error("decay interval for {stat} has min {min_ms}ms greater than max {max_ms}ms")]
    DecayRange {
        stat: &'static str,
        min_ms: u64,
        max_ms: u64,
    },
}
