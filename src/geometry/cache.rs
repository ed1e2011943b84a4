//! Per-run shape cache keyed by element GUID.
//!
//! The map lock is held only long enough to fetch or insert a slot. Each slot
//! is a `OnceLock`, so concurrent first requests for one GUID build it once
//! while requests for other GUIDs proceed in parallel. Entries are never
//! evicted during a run.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, OnceLock};

use rustc_hash::FxHashMap;

use super::Shape;
use crate::error::Issue;

/// Cached outcome of building one shape. Failures are cached too.
pub type CachedShape = std::result::Result<Arc<Shape>, Issue>;

type Slot = Arc<OnceLock<CachedShape>>;

#[derive(Debug, Default)]
pub struct ShapeCache {
    slots: Mutex<FxHashMap<String, Slot>>,
    builds: AtomicUsize,
}

impl ShapeCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached outcome for `guid`, building it with `build` on
    /// first request.
    pub fn get_or_build<F>(&self, guid: &str, build: F) -> CachedShape
    where
        F: FnOnce() -> CachedShape,
    {
        let slot = {
            let mut slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
            Arc::clone(slots.entry(guid.to_string()).or_default())
        };
        slot.get_or_init(|| {
            self.builds.fetch_add(1, Ordering::Relaxed);
            build()
        })
        .clone()
    }

    /// Number of entries (successful or failed).
    pub fn len(&self) -> usize {
        self.slots.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// How many times a build closure actually ran.
    pub fn build_count(&self) -> usize {
        self.builds.load(Ordering::Relaxed)
    }
}
