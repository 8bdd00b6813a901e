//! In-process single-flight set of running threads.
//!
//! A thread key is held from the moment a trigger or resume is accepted until
//! its background task finishes. A second request for the same key is
//! skipped instead of racing on the checkpoint store.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

use bioverify_core::ThreadKey;

type Entry = (&'static str, String);

#[derive(Debug, Clone, Default)]
pub struct InFlight {
    keys: Arc<Mutex<HashSet<Entry>>>,
}

impl InFlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `(workflow, key)`, or `None` if it is already running.
    pub fn try_acquire(&self, workflow: &'static str, key: &ThreadKey) -> Option<InFlightGuard> {
        let entry = (workflow, key.to_string());
        if !lock(&self.keys).insert(entry.clone()) {
            return None;
        }
        Some(InFlightGuard {
            keys: self.keys.clone(),
            entry,
        })
    }

    pub fn contains(&self, workflow: &'static str, key: &ThreadKey) -> bool {
        lock(&self.keys).contains(&(workflow, key.to_string()))
    }

    pub fn len(&self) -> usize {
        lock(&self.keys).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// A panic while holding the set cannot leave it half-updated.
fn lock(keys: &Mutex<HashSet<Entry>>) -> MutexGuard<'_, HashSet<Entry>> {
    keys.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Releases its key on drop.
#[derive(Debug)]
pub struct InFlightGuard {
    keys: Arc<Mutex<HashSet<Entry>>>,
    entry: Entry,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        lock(&self.keys).remove(&self.entry);
    }
}
