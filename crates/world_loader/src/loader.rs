//! The object-graph loader.
//!
//! Recursive world-file traversal: open a file through the cache, walk
//! its object dictionary, create each entry through the pluggable
//! strategy, recurse into children, stitch in externally referenced
//! sub-files, and park children whose parents cannot exist yet. One
//! loader instance owns all per-region state (the cache, the UID index,
//! the deferred registry) and is driven from a single logical task.

use crate::config::LoaderSettings;
use crate::deferred::{DeferredLoadRegistry, PostLoadCallback, UidSender};
use crate::error::WorldLoadError;
use crate::index::ObjectIndex;
use crate::store::FileStore;
use crate::strategy::{
    CreateRequest, Creation, CreationStrategy, InstanceParams, LoadParams, WorldObject,
};
use futures::future::BoxFuture;
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};
use world_format::{FileData, FormatError, ObjectDescription};

/// Recursive world-definition loader.
///
/// Construct one per logical region lifetime; [`WorldLoader::load_region`]
/// resets the per-region state before loading. The file cache and the
/// walk ledger together guarantee that a source is parsed at most once
/// and that a (file, mount) pair is walked at most once, which is what
/// keeps forwarding cycles between files finite.
pub struct WorldLoader {
    store: FileStore,
    index: ObjectIndex,
    deferred: DeferredLoadRegistry,
    strategy: Arc<dyn CreationStrategy>,
    /// (file, mount uid) pairs already walked this region; recorded
    /// before recursing so forwarding cycles terminate.
    walked: HashSet<(String, Option<String>)>,
    /// Hub metadata captured from root-loaded files, keyed by file name.
    hub_areas: BTreeMap<String, Value>,
    /// Object-type category registry: category name to the types it owns.
    categories: BTreeMap<String, BTreeMap<String, Value>>,
    /// Set while an instanced load is in flight.
    instance: Option<InstanceParams>,
}

impl WorldLoader {
    pub fn new(settings: LoaderSettings, strategy: Arc<dyn CreationStrategy>) -> Self {
        Self {
            store: FileStore::new(settings),
            index: ObjectIndex::new(),
            deferred: DeferredLoadRegistry::new(),
            strategy,
            walked: HashSet::new(),
            hub_areas: BTreeMap::new(),
            categories: BTreeMap::new(),
            instance: None,
        }
    }

    pub fn store(&self) -> &FileStore {
        &self.store
    }

    pub fn index(&self) -> &ObjectIndex {
        &self.index
    }

    pub fn deferred(&self) -> &DeferredLoadRegistry {
        &self.deferred
    }

    /// Handle the network layer reports UID bindings through.
    pub fn uid_event_sender(&self) -> UidSender {
        self.deferred.sender()
    }

    /// Hub metadata captured when `file_name` was loaded as a root file.
    pub fn hub_data(&self, file_name: &str) -> Option<&Value> {
        self.hub_areas.get(&self.store.normalize(file_name))
    }

    /// Registers the object types belonging to a category.
    pub fn register_category(
        &mut self,
        category: impl Into<String>,
        types: BTreeMap<String, Value>,
    ) {
        self.categories.insert(category.into(), types);
    }

    /// The category an object type was registered under, if any.
    pub fn category_for_type(&self, object_type: &str) -> Option<&str> {
        self.categories
            .iter()
            .find(|(_, types)| types.contains_key(object_type))
            .map(|(category, _)| category.as_str())
    }

    pub fn register_post_load(&mut self, callback: PostLoadCallback) {
        self.deferred.register_post_load(callback);
    }

    pub fn run_post_load_callbacks(&mut self) {
        self.deferred.run_post_load_callbacks();
    }

    /// Entry point: resets per-region state, then loads the world file
    /// with the application root as parent.
    pub async fn load_region(
        &mut self,
        world_file: &str,
        root: &Arc<dyn WorldObject>,
    ) -> Result<Arc<FileData>, WorldLoadError> {
        info!("🌍 Loading region from '{}'", world_file);
        self.reset();
        let data = self
            .load_from_file(world_file, root, None, LoadParams::default(), false)
            .await?;
        info!(
            "✅ Region load complete: {} file(s) cached, {} deferred",
            self.store.len(),
            self.deferred.pending_count()
        );
        Ok(data)
    }

    fn reset(&mut self) {
        self.store.clear();
        self.index.clear();
        self.walked.clear();
        self.hub_areas.clear();
        self.deferred.clear();
    }

    /// Loads a world-data file.
    ///
    /// A (file, `parent_uid`) pair that was already walked returns the
    /// cached parse untouched. A cached file under a new `parent_uid`
    /// re-walks its object dictionary without re-parsing, which mounts
    /// one physical file under multiple logical parents. Without a
    /// `parent_uid` the whole dictionary is walked under `parent` (the
    /// root-region path), capturing any hub metadata the file carries.
    /// With `merge` the mount point is the file's own top-level UID.
    pub fn load_from_file<'a>(
        &'a mut self,
        file_name: &'a str,
        parent: &'a Arc<dyn WorldObject>,
        parent_uid: Option<&'a str>,
        params: LoadParams,
        merge: bool,
    ) -> BoxFuture<'a, Result<Arc<FileData>, WorldLoadError>> {
        Box::pin(async move {
            let name = self.store.normalize(file_name);
            let mount = (name.clone(), parent_uid.map(str::to_owned));
            if let Some(data) = self.store.cached(&name) {
                if self.walked.contains(&mount) {
                    return Ok(data);
                }
                self.walked.insert(mount);
                self.walk_mounted(&name, Arc::clone(&data), parent, parent_uid, params, merge)
                    .await?;
                return Ok(data);
            }

            let data = self.store.open(&name)?;
            self.index.insert(name.clone(), Arc::clone(&data));
            if parent_uid.is_none() {
                if let Some(hub_areas) = &data.hub_areas {
                    self.hub_areas.insert(name.clone(), hub_areas.clone());
                }
            }
            // ledger entry goes in before the walk: a forwarding cycle
            // re-entering this file must short-circuit above
            self.walked.insert(mount);
            self.walk_mounted(&name, Arc::clone(&data), parent, parent_uid, params, merge)
                .await?;
            Ok(data)
        })
    }

    async fn walk_mounted(
        &mut self,
        name: &str,
        data: Arc<FileData>,
        parent: &Arc<dyn WorldObject>,
        parent_uid: Option<&str>,
        params: LoadParams,
        merge: bool,
    ) -> Result<(), WorldLoadError> {
        match parent_uid {
            Some(uid) => {
                let mount_uid = if merge {
                    let (root_uid, _) =
                        data.root().ok_or_else(|| WorldLoadError::MalformedFile {
                            name: name.to_string(),
                            reason: FormatError::EmptyFile.to_string(),
                        })?;
                    root_uid.to_string()
                } else {
                    uid.to_string()
                };
                let scope = ObjectIndex::single(name.to_string(), data);
                self.load_objects_by_uid(parent, &mount_uid, params, Some(&scope))
                    .await
            }
            None => {
                let root_uid = parent.unique_id();
                self.load_object_dict(
                    &data.objects,
                    parent,
                    root_uid.as_deref(),
                    params,
                    Some(name),
                    None,
                )
                .await;
                Ok(())
            }
        }
    }

    /// Walks the children of `parent_uid`'s description.
    ///
    /// The UID is resolved against `scope` when given, otherwise against
    /// every loaded file. Already-cached `AdditionalData` files are
    /// flattened into the same parent context, a `File` cross-reference
    /// is followed, and not-yet-cached auxiliary files are loaded in
    /// merge mode. An absent UID is an unloaded prerequisite: fatal for
    /// this subtree, reported to the caller.
    pub async fn load_objects_by_uid(
        &mut self,
        parent: &Arc<dyn WorldObject>,
        parent_uid: &str,
        params: LoadParams,
        scope: Option<&ObjectIndex>,
    ) -> Result<(), WorldLoadError> {
        let found = scope.unwrap_or(&self.index).find_by_uid(parent_uid);
        let Some(found) = found else {
            error!(
                "Data file not found for area being loaded: {}; load the area's file first",
                parent_uid
            );
            return Err(WorldLoadError::ObjectNotFound {
                uid: parent_uid.to_string(),
            });
        };

        let desc = found.desc;
        if !desc.objects.is_empty() {
            self.load_object_dict(&desc.objects, parent, Some(parent_uid), params, None, None)
                .await;
            for extra in &desc.additional_data {
                let Some(extra_data) = self.store.cached(extra) else {
                    continue;
                };
                let Some((_, extra_root)) = extra_data.root() else {
                    continue;
                };
                if extra_root.objects.is_empty() {
                    continue;
                }
                let merged = extra_root.objects.clone();
                self.load_object_dict(&merged, parent, Some(parent_uid), params, None, None)
                    .await;
                // let the host scheduler breathe between large merges;
                // cache and index are consistent at this boundary
                tokio::task::yield_now().await;
            }
        }

        if let Some(file_ref) = desc.file_ref() {
            self.load_from_file(file_ref, parent, Some(parent_uid), params, false)
                .await?;
        }

        for extra in &desc.additional_data {
            if self.store.contains(extra) {
                // flattened above, or merged by an earlier pass
                continue;
            }
            self.load_from_file(extra, parent, Some(parent_uid), params, true)
                .await?;
        }

        Ok(())
    }

    /// Creates every entry of an object dictionary. A failing entry is
    /// logged and does not abort its siblings; the objects that were
    /// created are returned.
    pub fn load_object_dict<'a>(
        &'a mut self,
        objects: &'a BTreeMap<String, ObjectDescription>,
        parent: &'a Arc<dyn WorldObject>,
        parent_uid: Option<&'a str>,
        params: LoadParams,
        file_name: Option<&'a str>,
        actual_parent: Option<&'a Arc<dyn WorldObject>>,
    ) -> BoxFuture<'a, Vec<Arc<dyn WorldObject>>> {
        Box::pin(async move {
            let mut created = Vec::new();
            for (key, desc) in objects {
                match self
                    .load_object(desc, parent, parent_uid, key, params, file_name, actual_parent)
                    .await
                {
                    Ok(Some(object)) => created.push(object),
                    Ok(None) => {}
                    Err(err) => {
                        error!("Failed to load object '{}': {}", key, err);
                    }
                }
            }
            created
        })
    }

    /// Creates one described object and recurses into its children
    /// according to the creation outcome.
    #[allow(clippy::too_many_arguments)]
    pub async fn load_object(
        &mut self,
        desc: &ObjectDescription,
        parent: &Arc<dyn WorldObject>,
        parent_uid: Option<&str>,
        key: &str,
        params: LoadParams,
        file_name: Option<&str>,
        actual_parent: Option<&Arc<dyn WorldObject>>,
    ) -> Result<Option<Arc<dyn WorldObject>>, WorldLoadError> {
        let creation = self
            .create_object(desc, parent, parent_uid, key, params, file_name, actual_parent)
            .await?;
        match creation {
            Creation::Forwarded => Ok(None),
            Creation::Deferred => {
                if !desc.objects.is_empty() {
                    debug!(
                        "parking {} children of '{}' until its uid is bound",
                        desc.objects.len(),
                        key
                    );
                    self.deferred.add_pending_child(
                        key,
                        desc.objects.clone(),
                        params.dynamic,
                        params.zone_level,
                    );
                }
                Ok(None)
            }
            Creation::Handled {
                actual_parent: next_actual,
            } => {
                if !desc.objects.is_empty() {
                    // nothing materialized here: children mount under the
                    // incoming parent, re-keyed by its uid when it has one
                    let parent_key = parent.unique_id();
                    let next_uid = parent_key.as_deref().unwrap_or(key);
                    self.load_object_dict(
                        &desc.objects,
                        parent,
                        Some(next_uid),
                        params,
                        file_name,
                        next_actual.as_ref(),
                    )
                    .await;
                }
                Ok(None)
            }
            Creation::Created {
                object,
                actual_parent: next_actual,
            } => {
                if !desc.objects.is_empty() {
                    if object.handles_zone_loading() {
                        // zone-streaming objects own their own lazy loading
                        object.load_zone_objects(params.zone_level).await;
                    } else {
                        let next_actual = next_actual.or_else(|| Some(Arc::clone(&object)));
                        self.load_object_dict(
                            &desc.objects,
                            &object,
                            Some(key),
                            params,
                            file_name,
                            next_actual.as_ref(),
                        )
                        .await;
                    }
                }
                Ok(Some(object))
            }
        }
    }

    /// Base creation contract.
    ///
    /// Dynamic descriptions with an external UID skip the stub check:
    /// the object already exists, created elsewhere. A forwarding stub
    /// loads its referenced file under the same parent and creates
    /// nothing here. Everything else is the strategy's call.
    #[allow(clippy::too_many_arguments)]
    async fn create_object(
        &mut self,
        desc: &ObjectDescription,
        parent: &Arc<dyn WorldObject>,
        parent_uid: Option<&str>,
        key: &str,
        params: LoadParams,
        file_name: Option<&str>,
        actual_parent: Option<&Arc<dyn WorldObject>>,
    ) -> Result<Creation, WorldLoadError> {
        debug!("create_object: type = {}", desc.object_type);
        let preexisting = params.dynamic && desc.ext_uid.is_some();
        if !preexisting && desc.is_forwarding_stub() {
            let file_ref = desc.file_ref().map(str::to_owned).unwrap_or_default();
            self.load_from_file(&file_ref, parent, None, params, false)
                .await?;
            return Ok(Creation::Forwarded);
        }

        let strategy = Arc::clone(&self.strategy);
        let request = CreateRequest {
            desc,
            object_type: &desc.object_type,
            parent,
            parent_uid,
            key,
            params,
            file_name,
            actual_parent,
            instance: self.instance.clone(),
        };
        strategy.create_object(request).await
    }

    /// Loads a one-off parameterized clone of a described object.
    ///
    /// The instance flag is cleared on every exit path, including
    /// creation failure.
    pub async fn load_instanced_object(
        &mut self,
        desc: &ObjectDescription,
        parent: &Arc<dyn WorldObject>,
        parent_uid: Option<&str>,
        key: &str,
        instance: InstanceParams,
    ) -> Result<Option<Arc<dyn WorldObject>>, WorldLoadError> {
        self.instance = Some(instance);
        let result = self
            .load_object(desc, parent, parent_uid, key, LoadParams::default(), None, None)
            .await;
        self.instance = None;
        result
    }

    /// Replays one parked child dictionary against its now-resolved
    /// parent. Returns false when nothing was pending for the key.
    pub async fn fire_deferred(&mut self, key: &str, parent: &Arc<dyn WorldObject>) -> bool {
        let Some(pending) = self.deferred.take_pending(key) else {
            warn!("uid '{}' bound but no children were pending for it", key);
            return false;
        };
        if parent.handles_zone_loading() {
            parent.load_zone_objects(pending.zone_level).await;
        } else {
            let params = LoadParams {
                dynamic: pending.dynamic,
                zone_level: pending.zone_level,
                start_time: Some(Instant::now()),
                parent_is_object: false,
            };
            self.load_object_dict(&pending.objects, parent, Some(key), params, None, None)
                .await;
        }
        true
    }

    /// Drains queued UID-assignment events, firing each matching
    /// deferred load. Returns how many fired.
    pub async fn process_uid_events(&mut self) -> usize {
        let mut fired = 0;
        while let Some(assignment) = self.deferred.poll_assignment() {
            if self.fire_deferred(&assignment.key, &assignment.parent).await {
                fired += 1;
            }
        }
        fired
    }
}
