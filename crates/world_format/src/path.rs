//! UID locator paths into a file's object tree.

use crate::types::{FileData, ObjectDescription};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Locator reaching one object description anywhere in a file's object
/// tree: the UID segments from a top-level root down to the target,
/// serialized as a plain JSON array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectPath(Vec<String>);

impl ObjectPath {
    pub fn new(segments: Vec<String>) -> Self {
        Self(segments)
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// The UID this path points at.
    pub fn target(&self) -> Option<&str> {
        self.0.last().map(String::as_str)
    }

    /// True when the path points at a top-level object.
    pub fn is_top_level(&self) -> bool {
        self.0.len() == 1
    }

    /// Follows the path through nested `Objects` maps.
    pub fn resolve<'a>(&self, file: &'a FileData) -> Option<&'a ObjectDescription> {
        let (first, rest) = self.0.split_first()?;
        let mut current = file.objects.get(first)?;
        for segment in rest {
            current = current.objects.get(segment)?;
        }
        Some(current)
    }
}

impl From<Vec<String>> for ObjectPath {
    fn from(segments: Vec<String>) -> Self {
        Self(segments)
    }
}

impl fmt::Display for ObjectPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}", self.0.join("/"))
    }
}
