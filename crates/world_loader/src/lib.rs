//! # World Loader
//!
//! Hierarchical world-definition loader for a networked virtual-world
//! client/server pair. It reads declarative object-description files,
//! resolves parent/child relationships by UID, materializes runtime
//! objects in the correct order through a pluggable creation strategy,
//! and tracks which source file produced which object so it can answer
//! "what file holds object X" and "what is X's containing location".
//!
//! ## Core Components
//!
//! * **[`FileStore`]** - Opens and parses named world-data sources,
//!   caching each by name exactly once
//! * **[`ObjectIndex`]** - UID-indexed lookups: cross-file search, asset
//!   sets for streaming, location ancestry
//! * **[`WorldLoader`]** - The recursive object-graph walk: creation,
//!   child recursion, cross-file stitching, cache-aware remounting
//! * **[`DeferredLoadRegistry`]** - Continuations for objects whose UIDs
//!   the runtime binds later, plus the post-load callback queue
//! * **[`CreationStrategy`]** - The pluggable creation backend, with
//!   [`ClientStrategy`] and [`ServerStrategy`] variants
//!
//! ## Control Flow
//!
//! An application calls [`WorldLoader::load_region`] with its root
//! object. The loader opens the world file through the store, walks the
//! object dictionary, asks the strategy to materialize each entry,
//! recurses into nested children with the new object as parent, and
//! recursively loads files referenced by forwarding stubs into the same
//! parent context. Objects that cannot exist yet (client-side objects
//! waiting on network UIDs) park their children in the deferred
//! registry; the network layer pushes [`UidAssignment`] events through
//! the sender from [`WorldLoader::uid_event_sender`], and
//! [`WorldLoader::process_uid_events`] replays the parked loads.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use world_loader::{
//!     ClientStrategy, HubManager, LoaderSettings, WorldLoader, WorldObject,
//! };
//! # struct MyHub;
//! # #[async_trait::async_trait]
//! # impl HubManager for MyHub {
//! #     async fn set_location_object(
//! #         &self,
//! #         _desc: &world_loader::ObjectDescription,
//! #     ) -> Result<(), world_loader::WorldLoadError> { Ok(()) }
//! #     async fn generate_location(
//! #         &self,
//! #         _key: &str,
//! #     ) -> Result<Arc<dyn WorldObject>, world_loader::WorldLoadError> { unimplemented!() }
//! # }
//! # struct Repository;
//! # impl WorldObject for Repository {}
//! # #[tokio::main]
//! # async fn main() -> Result<(), world_loader::WorldLoadError> {
//! let hub = Arc::new(MyHub);
//! let strategy = Arc::new(ClientStrategy::new(hub));
//! let mut loader = WorldLoader::new(LoaderSettings::default(), strategy);
//!
//! let root: Arc<dyn WorldObject> = Arc::new(Repository);
//! loader.load_region("port_royal", &root).await?;
//! # Ok(())
//! # }
//! ```

mod client;
mod config;
mod deferred;
mod error;
mod index;
mod loader;
mod server;
mod store;
mod strategy;


pub use client::ClientStrategy;
pub use config::LoaderSettings;
pub use deferred::{
    DeferredLoadRegistry, PendingChildren, PostLoadCallback, UidAssignment, UidSender,
};
pub use error::WorldLoadError;
pub use index::{FoundObject, LocationInfo, ObjectIndex};
pub use loader::WorldLoader;
pub use server::ServerStrategy;
pub use store::FileStore;
pub use strategy::{
    CreateRequest, Creation, CreationStrategy, HubManager, InstanceParams, LoadParams, WorldObject,
};

/// Re-export commonly used data-model types for strategy implementors
pub use world_format::{
    object_types, FileData, ModelRef, ObjectDescription, ObjectPath, VisualDescription,
};
