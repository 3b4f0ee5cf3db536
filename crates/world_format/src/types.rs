//! Object description and file data schemas.
//!
//! World-data files were historically loose nested dictionaries; here the
//! known keys are an explicit schema and everything else rides along in a
//! flattened `extra` map, so creation backends still see engine data
//! (positions, colors, ...) the loader itself never interprets.

use crate::error::FormatError;
use crate::path::ObjectPath;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Type tags with structural meaning to the loader.
pub mod object_types {
    /// Top-level world container owning hub areas.
    pub const REGION: &str = "Region";

    /// Leaf-most ancestor boundary for location-scoped queries.
    pub const LOCATION: &str = "Location";

    /// The one type tag allowed to carry a `File` reference alongside
    /// directly usable children of its own.
    pub const LOCATION_AREA: &str = "Location Area";
}

/// Suffix applied to `Visual.Model` names when computing asset sets.
pub const MODEL_FILE_SUFFIX: &str = ".bam";

/// Visual attributes of an object description. Only `Model` matters to
/// the loader (asset-set computation); the rest is engine data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualDescription {
    #[serde(rename = "Model", default, skip_serializing_if = "Option::is_none")]
    pub model: Option<ModelRef>,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// A model reference: files declare either one asset name or a list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ModelRef {
    Single(String),
    Many(Vec<String>),
}

impl ModelRef {
    /// Model names in declaration order, single and list form alike.
    pub fn names(&self) -> &[String] {
        match self {
            ModelRef::Single(name) => std::slice::from_ref(name),
            ModelRef::Many(names) => names.as_slice(),
        }
    }
}

/// One declared world object, immutable once loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectDescription {
    /// Type tag selecting behavior at creation time.
    #[serde(rename = "Type")]
    pub object_type: String,

    /// Cross-file reference: this node's children live in another source.
    #[serde(rename = "File", default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,

    /// Externally assigned identifier for dynamically spawned objects.
    #[serde(rename = "ExtUid", default, skip_serializing_if = "Option::is_none")]
    pub ext_uid: Option<String>,

    #[serde(rename = "Instanced", default)]
    pub instanced: bool,

    #[serde(rename = "Visual", default, skip_serializing_if = "Option::is_none")]
    pub visual: Option<VisualDescription>,

    /// The object's own children, keyed by UID.
    #[serde(rename = "Objects", default, skip_serializing_if = "BTreeMap::is_empty")]
    pub objects: BTreeMap<String, ObjectDescription>,

    /// Auxiliary file names whose object trees merge under this node.
    #[serde(rename = "AdditionalData", default, skip_serializing_if = "Vec::is_empty")]
    pub additional_data: Vec<String>,

    /// Engine-specific attributes the loader passes through untouched.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ObjectDescription {
    /// The `File` cross-reference, treating an empty string as absent.
    pub fn file_ref(&self) -> Option<&str> {
        self.file.as_deref().filter(|file| !file.is_empty())
    }

    /// A forwarding stub's real children live in its referenced file; it
    /// has no directly usable children of its own.
    pub fn is_forwarding_stub(&self) -> bool {
        self.file_ref().is_some() && self.object_type != object_types::LOCATION_AREA
    }

    /// This description's own `Visual.Model` names (no recursion).
    pub fn model_names(&self) -> &[String] {
        self.visual
            .as_ref()
            .and_then(|visual| visual.model.as_ref())
            .map(ModelRef::names)
            .unwrap_or(&[])
    }
}

/// One parsed world-data source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileData {
    /// Top-level object tree; well-formed files have exactly one root.
    #[serde(rename = "Objects")]
    pub objects: BTreeMap<String, ObjectDescription>,

    /// UID locator table covering every object at any depth.
    #[serde(rename = "ObjectIds")]
    pub object_ids: BTreeMap<String, ObjectPath>,

    /// Region/hub metadata, consumed only by the client-side hub loader.
    #[serde(rename = "HubAreas", default, skip_serializing_if = "Option::is_none")]
    pub hub_areas: Option<serde_json::Value>,
}

impl FileData {
    /// The file's top-level root entry.
    pub fn root(&self) -> Option<(&str, &ObjectDescription)> {
        self.objects
            .iter()
            .next()
            .map(|(uid, desc)| (uid.as_str(), desc))
    }

    /// Resolves a UID through the locator table.
    pub fn find(&self, uid: &str) -> Option<&ObjectDescription> {
        self.object_ids.get(uid)?.resolve(self)
    }

    /// Checks the cross-table invariants: every UID in the object tree is
    /// indexed, and every index entry ends in its own UID and resolves.
    pub fn validate(&self) -> Result<(), FormatError> {
        let mut stack: Vec<(&String, &ObjectDescription)> = self.objects.iter().collect();
        while let Some((uid, desc)) = stack.pop() {
            if !self.object_ids.contains_key(uid) {
                return Err(FormatError::UnindexedObject { uid: uid.clone() });
            }
            stack.extend(desc.objects.iter());
        }
        for (uid, path) in &self.object_ids {
            if path.target() != Some(uid.as_str()) {
                return Err(FormatError::PathMismatch {
                    uid: uid.clone(),
                    path: path.clone(),
                });
            }
            if path.resolve(self).is_none() {
                return Err(FormatError::DanglingPath {
                    uid: uid.clone(),
                    path: path.clone(),
                });
            }
        }
        Ok(())
    }
}
