//! Boundary traits between the loader and the surrounding application.
//!
//! The loader never renders, replicates, or simulates anything; it walks
//! object dictionaries and hands each description to a pluggable
//! [`CreationStrategy`]. Runtime objects stay opaque behind
//! [`WorldObject`]; the loader only ever consults the capabilities
//! declared there.

use crate::error::WorldLoadError;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;
use world_format::ObjectDescription;

/// Per-call traversal parameters threaded through the walk.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoadParams {
    /// Runtime-spawned load: descriptions carrying an `ExtUid` already
    /// exist and must not be re-created.
    pub dynamic: bool,

    pub zone_level: i32,

    /// Batch start moment, for strategies that stagger heavy creation.
    pub start_time: Option<Instant>,

    /// The immediate parent is a world object rather than the
    /// application root.
    pub parent_is_object: bool,
}

/// One-off clone parameters consulted during an instanced load.
#[derive(Debug, Clone, Default)]
pub struct InstanceParams {
    pub params: Vec<serde_json::Value>,
}

/// Opaque handle to an application-owned runtime object.
#[async_trait]
pub trait WorldObject: Send + Sync {
    /// The object's UID, for objects that know theirs.
    fn unique_id(&self) -> Option<String> {
        None
    }

    /// True when the object streams its own zone contents instead of
    /// accepting an injected child dictionary.
    fn handles_zone_loading(&self) -> bool {
        false
    }

    /// Invoked in place of a child walk for zone-loading objects.
    async fn load_zone_objects(&self, zone_level: i32) {
        let _ = zone_level;
    }

    /// Server-side hook: materialize one described child under this
    /// object. The default creates nothing.
    async fn create_child(
        &self,
        request: &CreateRequest<'_>,
    ) -> Result<Option<Arc<dyn WorldObject>>, WorldLoadError> {
        let _ = request;
        Ok(None)
    }
}

/// Everything a strategy needs to materialize one description.
pub struct CreateRequest<'a> {
    pub desc: &'a ObjectDescription,
    pub object_type: &'a str,
    pub parent: &'a Arc<dyn WorldObject>,
    pub parent_uid: Option<&'a str>,
    pub key: &'a str,
    pub params: LoadParams,
    /// Logical name of the file being walked, when known.
    pub file_name: Option<&'a str>,
    /// Nearest materialized ancestor, threaded down the walk.
    pub actual_parent: Option<&'a Arc<dyn WorldObject>>,
    /// Set while an instanced load is in flight.
    pub instance: Option<InstanceParams>,
}

/// Outcome of one creation attempt.
pub enum Creation {
    /// An object was materialized; its children walk under it.
    Created {
        object: Arc<dyn WorldObject>,
        actual_parent: Option<Arc<dyn WorldObject>>,
    },

    /// Handled without a new object; children walk under the incoming
    /// parent, re-keyed by its UID.
    Handled {
        actual_parent: Option<Arc<dyn WorldObject>>,
    },

    /// The object cannot exist until its UID is bound by the runtime;
    /// children are parked in the deferred registry.
    Deferred,

    /// A forwarding stub: the referenced file supplies the real objects.
    Forwarded,
}

impl Creation {
    pub fn handled() -> Self {
        Creation::Handled { actual_parent: None }
    }
}

/// Pluggable creation backend. The traversal is written once against
/// this interface; client and server variants layer their behavior on
/// the same type tags.
#[async_trait]
pub trait CreationStrategy: Send + Sync {
    async fn create_object(
        &self,
        request: CreateRequest<'_>,
    ) -> Result<Creation, WorldLoadError>;
}

/// Region/location lifecycle owner consumed by the strategies.
#[async_trait]
pub trait HubManager: Send + Sync {
    /// Records the region description owning subsequent locations.
    async fn set_location_object(&self, desc: &ObjectDescription) -> Result<(), WorldLoadError>;

    /// Materializes the location for a UID and returns it.
    async fn generate_location(
        &self,
        key: &str,
    ) -> Result<Arc<dyn WorldObject>, WorldLoadError>;

    /// Notification hook fired for every description considered.
    async fn handle_object(&self, request: &CreateRequest<'_>) -> Result<(), WorldLoadError> {
        let _ = request;
        Ok(())
    }
}
