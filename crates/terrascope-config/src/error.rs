//! Error type for the `terrascope.ron` settings file.

use std::path::PathBuf;

/// Failures while loading or persisting the settings file. Each variant
/// names the file involved so a bad path in a CLI override is obvious
/// from the message alone.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The settings file exists but could not be read.
    #[error("could not read settings file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The settings file or its directory could not be written.
    #[error("could not write settings file {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The settings file is not valid RON for the current schema.
    /// Unknown sections are tolerated; this fires on syntax errors and
    /// type mismatches.
    #[error("settings file {path} is not valid RON: {source}")]
    Malformed {
        path: PathBuf,
        source: ron::error::SpannedError,
    },

    /// The in-memory settings could not be serialized to RON. Indicates
    /// a schema bug, not a user error.
    #[error("settings could not be serialized: {0}")]
    Serialize(#[from] ron::Error),
}
