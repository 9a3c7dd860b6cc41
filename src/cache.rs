//! Reconcilers for many independent lists.
//!
//! Each list is addressed by a [`ListKey`] and owns its own [`Reconciler`]
//! behind a mutex, so cycles on the same list are serialized while different
//! lists reconcile concurrently.

use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use rustc_hash::FxHashMap;

use crate::algo::DiffConfig;
use crate::apply::{BatchTarget, Outcome};
use crate::layout::Layout;
use crate::reconcile::{Reconciler, ReloadMode};
use crate::snapshot::Snapshot;

// =============================================================================
// List Key
// =============================================================================

/// Name of one list view.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ListKey(Arc<str>);

impl ListKey {
    pub fn new(name: &str) -> Self {
        Self(Arc::from(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ListKey {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl std::fmt::Display for ListKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// Reconciler Cache
// =============================================================================

/// Handle to one list's reconciler.
pub type SharedReconciler = Arc<Mutex<Reconciler>>;

/// Non-thread-safe map of list reconcilers.
pub type ReconcilerCache = FxHashMap<ListKey, SharedReconciler>;

/// Thread-safe registry of list reconcilers.
///
/// Clones share the same registry. New lists start from an empty snapshot
/// with the registry's [`DiffConfig`].
#[derive(Debug, Clone)]
pub struct SharedReconcilerCache {
    inner: Arc<RwLock<ReconcilerCache>>,
    config: DiffConfig,
}

impl Default for SharedReconcilerCache {
    fn default() -> Self {
        Self::new()
    }
}

impl SharedReconcilerCache {
    pub fn new() -> Self {
        Self::with_config(DiffConfig::default())
    }

    pub fn with_config(config: DiffConfig) -> Self {
        Self {
            inner: Arc::new(RwLock::new(FxHashMap::default())),
            config,
        }
    }

    pub fn with_read<R>(&self, f: impl FnOnce(&ReconcilerCache) -> R) -> R {
        let guard = self.inner.read();
        f(&guard)
    }

    pub fn with_write<R>(&self, f: impl FnOnce(&mut ReconcilerCache) -> R) -> R {
        let mut guard = self.inner.write();
        f(&mut guard)
    }

    /// The reconciler for `key`, created on first use.
    pub fn reconciler(&self, key: &ListKey) -> SharedReconciler {
        if let Some(found) = self.with_read(|c| c.get(key).cloned()) {
            return found;
        }
        self.with_write(|c| {
            Arc::clone(
                c.entry(key.clone())
                    .or_insert_with(|| Arc::new(Mutex::new(Reconciler::with_config(self.config)))),
            )
        })
    }

    /// Run one cycle for `key`. The registry lock is released before diffing.
    pub fn reconcile<L, B>(&self, key: &ListKey, structure: &L, target: &mut B, mode: ReloadMode) -> Outcome
    where
        L: Layout + ?Sized,
        B: BatchTarget + ?Sized,
    {
        let reconciler = self.reconciler(key);
        let mut guard = reconciler.lock();
        guard.reconcile(structure, target, mode)
    }

    /// Clone of the snapshot currently shown by `key`.
    ///
    /// Waits for a cycle in progress on `key`, without holding the registry.
    pub fn snapshot(&self, key: &ListKey) -> Option<Snapshot> {
        let reconciler = self.with_read(|c| c.get(key).cloned())?;
        let snapshot = reconciler.lock().previous().clone();
        Some(snapshot)
    }

    pub fn remove(&self, key: &ListKey) -> Option<SharedReconciler> {
        self.with_write(|c| c.remove(key))
    }

    pub fn contains(&self, key: &ListKey) -> bool {
        self.with_read(|c| c.contains_key(key))
    }

    pub fn len(&self) -> usize {
        self.with_read(|c| c.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.with_write(|c| c.clear());
    }
}

// =============================================================================
// Tests
// =============================================================================
