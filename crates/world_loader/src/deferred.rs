//! Deferred-load bookkeeping.
//!
//! Some described objects cannot exist at walk time: their UIDs are
//! assigned later by the network/runtime layer. Their child dictionaries
//! are parked here, keyed by UID, and replayed when an assignment event
//! arrives over the registry's channel. The registry also owns the
//! post-load callback queue drained after a batch of loading completes.

use crate::strategy::WorldObject;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::debug;
use world_format::ObjectDescription;

/// Zero-argument callback run once after a batch of loading completes.
pub type PostLoadCallback = Arc<dyn Fn() + Send + Sync>;

/// A UID bound to a live object by the network/runtime layer.
pub struct UidAssignment {
    pub key: String,
    pub parent: Arc<dyn WorldObject>,
}

/// Cloneable handle the UID-assignment boundary pushes events through.
pub type UidSender = mpsc::UnboundedSender<UidAssignment>;

/// Children parked until their parent object exists.
pub struct PendingChildren {
    pub objects: BTreeMap<String, ObjectDescription>,
    pub dynamic: bool,
    pub zone_level: i32,
}

pub struct DeferredLoadRegistry {
    pending: HashMap<String, PendingChildren>,
    post_load: Vec<PostLoadCallback>,
    tx: UidSender,
    rx: mpsc::UnboundedReceiver<UidAssignment>,
}

impl DeferredLoadRegistry {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            pending: HashMap::new(),
            post_load: Vec::new(),
            tx,
            rx,
        }
    }

    /// Handle for the external UID-assignment event source.
    pub fn sender(&self) -> UidSender {
        self.tx.clone()
    }

    /// Next queued assignment, if any.
    pub(crate) fn poll_assignment(&mut self) -> Option<UidAssignment> {
        self.rx.try_recv().ok()
    }

    pub fn add_pending_child(
        &mut self,
        key: impl Into<String>,
        objects: BTreeMap<String, ObjectDescription>,
        dynamic: bool,
        zone_level: i32,
    ) {
        let key = key.into();
        let pending = PendingChildren {
            objects,
            dynamic,
            zone_level,
        };
        if self.pending.insert(key.clone(), pending).is_some() {
            debug!("replaced pending children for '{}'", key);
        }
    }

    pub fn take_pending(&mut self, key: &str) -> Option<PendingChildren> {
        self.pending.remove(key)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn register_post_load(&mut self, callback: PostLoadCallback) {
        self.post_load.push(callback);
    }

    /// Drains the queue, invoking each distinct callback exactly once
    /// even when it was registered multiple times. Duplicates are
    /// identified by allocation, not by comparing behavior.
    pub fn run_post_load_callbacks(&mut self) {
        let queued = std::mem::take(&mut self.post_load);
        let mut invoked: Vec<&PostLoadCallback> = Vec::new();
        for callback in &queued {
            if invoked.iter().any(|done| Arc::ptr_eq(done, callback)) {
                continue;
            }
            invoked.push(callback);
            callback();
        }
    }

    pub fn clear(&mut self) {
        self.pending.clear();
        self.post_load.clear();
    }
}

impl Default for DeferredLoadRegistry {
    fn default() -> Self {
        Self::new()
    }
}
