//! Error types for world-data validation.

use crate::path::ObjectPath;
use thiserror::Error;

/// Structural failures detected while validating a parsed world-data file.
#[derive(Error, Debug)]
pub enum FormatError {
    #[error("object '{uid}' appears in the object tree but has no ObjectIds entry")]
    UnindexedObject { uid: String },

    #[error("ObjectIds entry '{uid}' does not end in its own uid ({path})")]
    PathMismatch { uid: String, path: ObjectPath },

    #[error("ObjectIds entry '{uid}' does not resolve to an object ({path})")]
    DanglingPath { uid: String, path: ObjectPath },

    #[error("file defines no top-level objects")]
    EmptyFile,
}
