//! Server-side creation strategy.

use crate::error::WorldLoadError;
use crate::strategy::{CreateRequest, Creation, CreationStrategy, HubManager};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;
use world_format::object_types;

/// Creation strategy for the authoritative server.
///
/// Regions and locations route through the hub manager; every other
/// type is delegated to the nearest materialized ancestor's
/// `create_child` hook, so a generated location builds the objects
/// described beneath it.
pub struct ServerStrategy {
    hub: Arc<dyn HubManager>,
}

impl ServerStrategy {
    pub fn new(hub: Arc<dyn HubManager>) -> Self {
        Self { hub }
    }
}

#[async_trait]
impl CreationStrategy for ServerStrategy {
    async fn create_object(
        &self,
        request: CreateRequest<'_>,
    ) -> Result<Creation, WorldLoadError> {
        match request.object_type {
            object_types::REGION => {
                self.hub.set_location_object(request.desc).await?;
                Ok(Creation::handled())
            }
            object_types::LOCATION => {
                let location = self.hub.generate_location(request.key).await?;
                Ok(Creation::Handled {
                    actual_parent: Some(location),
                })
            }
            _ => {
                let Some(actual_parent) = request.actual_parent else {
                    debug!(
                        "no materialized ancestor for '{}' ({}); nothing to create",
                        request.key, request.object_type
                    );
                    return Ok(Creation::handled());
                };
                match actual_parent.create_child(&request).await? {
                    Some(object) => Ok(Creation::Created {
                        object,
                        actual_parent: None,
                    }),
                    None => Ok(Creation::handled()),
                }
            }
        }
    }
}
