//! Client-side creation strategy.

use crate::error::WorldLoadError;
use crate::strategy::{CreateRequest, Creation, CreationStrategy, HubManager};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

/// Creation strategy for world clients.
///
/// The client never materializes objects during the walk: the
/// replication layer streams them in once their UIDs are bound, so every
/// described object is answered with [`Creation::Deferred`] and its
/// children wait in the deferred registry. The hub manager is still
/// notified per description so it can track hub and location data.
pub struct ClientStrategy {
    hub: Arc<dyn HubManager>,
}

impl ClientStrategy {
    pub fn new(hub: Arc<dyn HubManager>) -> Self {
        Self { hub }
    }
}

#[async_trait]
impl CreationStrategy for ClientStrategy {
    async fn create_object(
        &self,
        request: CreateRequest<'_>,
    ) -> Result<Creation, WorldLoadError> {
        debug!(
            "client strategy observed '{}' ({})",
            request.key, request.object_type
        );
        self.hub.handle_object(&request).await?;
        Ok(Creation::Deferred)
    }
}
