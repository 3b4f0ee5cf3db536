//! Error types for the world loader.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WorldLoadError {
    #[error("world data file not found: {path}")]
    FileNotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed world data file '{name}': {reason}")]
    MalformedFile { name: String, reason: String },

    #[error("object not found in loaded world data: {uid}")]
    ObjectNotFound { uid: String },

    #[error("object creation failed for '{key}': {reason}")]
    CreationFailed { key: String, reason: String },

    #[error("configuration error: {0}")]
    Config(String),
}
