//! File-dictionary cache over on-disk world-data sources.
//!
//! A file is parsed at most once per region: re-requesting a cached name
//! returns the same `Arc<FileData>` by identity. This is a correctness
//! requirement, not an optimization: re-parsing would duplicate object
//! creation downstream, and the cache short-circuit is what terminates
//! forwarding cycles between files.

use crate::config::LoaderSettings;
use crate::error::WorldLoadError;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::debug;
use world_format::FileData;

pub struct FileStore {
    settings: LoaderSettings,
    cache: DashMap<String, Arc<FileData>>,
    opens: AtomicUsize,
}

impl FileStore {
    pub fn new(settings: LoaderSettings) -> Self {
        Self {
            settings,
            cache: DashMap::new(),
            opens: AtomicUsize::new(0),
        }
    }

    /// Logical name for a source: a trailing `.<extension>` is stripped,
    /// anything else passes through untouched.
    pub fn normalize(&self, name: &str) -> String {
        let suffix = format!(".{}", self.settings.extension);
        name.strip_suffix(suffix.as_str()).unwrap_or(name).to_string()
    }

    /// Opens a world-data source, parsing and validating at most once per
    /// name. The read is blocking by design; the vacant-entry shard lock
    /// serializes concurrent opens of the same name, so a second caller
    /// is served the completed cache entry rather than a second parse.
    pub fn open(&self, name: &str) -> Result<Arc<FileData>, WorldLoadError> {
        let name = self.normalize(name);
        if let Some(cached) = self.cache.get(&name) {
            return Ok(Arc::clone(cached.value()));
        }
        match self.cache.entry(name.clone()) {
            Entry::Occupied(entry) => Ok(Arc::clone(entry.get())),
            Entry::Vacant(slot) => {
                let data = Arc::new(self.parse(&name)?);
                self.opens.fetch_add(1, Ordering::Relaxed);
                debug!("opened world data file '{}'", name);
                Ok(Arc::clone(slot.insert(data).value()))
            }
        }
    }

    fn parse(&self, name: &str) -> Result<FileData, WorldLoadError> {
        let path = self.settings.resolve(name);
        let content = std::fs::read_to_string(&path).map_err(|source| {
            WorldLoadError::FileNotFound {
                path: path.clone(),
                source,
            }
        })?;
        let data: FileData =
            serde_json::from_str(&content).map_err(|e| WorldLoadError::MalformedFile {
                name: name.to_string(),
                reason: e.to_string(),
            })?;
        data.validate().map_err(|e| WorldLoadError::MalformedFile {
            name: name.to_string(),
            reason: e.to_string(),
        })?;
        Ok(data)
    }

    /// The cached parse for a name, if present.
    pub fn cached(&self, name: &str) -> Option<Arc<FileData>> {
        self.cache
            .get(&self.normalize(name))
            .map(|entry| Arc::clone(entry.value()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.cache.contains_key(&self.normalize(name))
    }

    /// Parses performed since construction; cache hits don't count.
    pub fn open_count(&self) -> usize {
        self.opens.load(Ordering::Relaxed)
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    /// Drops every cached file. Only valid between regions; cached data
    /// may still be referenced by in-flight loads.
    pub fn clear(&self) {
        self.cache.clear();
    }

    pub fn settings(&self) -> &LoaderSettings {
        &self.settings
    }
}
