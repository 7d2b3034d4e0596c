//! Process-wide favourites with synchronous reads and fire-and-forget writes.
//!
//! The in-memory set is authoritative for the running session. Every toggle
//! schedules a write of the whole set; writes may complete out of order, in
//! which case the last one to finish is what the next session loads.

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::store::KeyValueStore;

pub const FAVOURITES_KEY: &str = "pokedex_favourites";

/// Serialized as a JSON array of display names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FavouriteSet(BTreeSet<String>);

impl FavouriteSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains(name)
    }

    /// Adds `name` if absent, removes it otherwise. Returns the new membership.
    pub fn toggle(&mut self, name: &str) -> bool {
        if self.0.remove(name) {
            false
        } else {
            self.0.insert(name.to_string());
            true
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Decodes a persisted blob. Empty and malformed payloads yield `None`.
    pub fn decode(blob: &str) -> Option<Self> {
        if blob.trim().is_empty() {
            return None;
        }
        match serde_json::from_str::<Vec<String>>(blob) {
            Ok(names) => Some(names.into_iter().collect()),
            Err(err) => {
                tracing::warn!(error = %err, "ignoring malformed favourites payload");
                None
            }
        }
    }
}

impl FromIterator<String> for FavouriteSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> FromIterator<&'a str> for FavouriteSet {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        Self(iter.into_iter().map(str::to_string).collect())
    }
}

pub struct FavouritesStore<S: KeyValueStore + 'static> {
    kv: Arc<S>,
    set: Mutex<FavouriteSet>,
    pending: Mutex<Vec<JoinHandle<()>>>,
}

impl<S: KeyValueStore + 'static> FavouritesStore<S> {
    /// Reads the persisted set. Any storage or decode failure yields an empty set.
    pub async fn load(kv: Arc<S>) -> Self {
        let set = match kv.get(FAVOURITES_KEY).await {
            Ok(Some(blob)) => FavouriteSet::decode(&blob).unwrap_or_default(),
            Ok(None) => FavouriteSet::new(),
            Err(err) => {
                tracing::warn!(error = %err, "failed to load favourites");
                FavouriteSet::new()
            }
        };
        tracing::debug!(count = set.len(), "favourites loaded");
        Self::with_set(kv, set)
    }

    pub fn with_set(kv: Arc<S>, set: FavouriteSet) -> Self {
        Self {
            kv,
            set: Mutex::new(set),
            pending: Mutex::new(Vec::new()),
        }
    }

    pub fn is_favourite(&self, name: &str) -> bool {
        self.lock_set().contains(name)
    }

    pub fn snapshot(&self) -> FavouriteSet {
        self.lock_set().clone()
    }

    /// Flips membership of `name` against the latest in-memory set and
    /// schedules a durable write of the result. Must be called from within a
    /// Tokio runtime for the write to happen.
    pub fn toggle(&self, name: &str) -> FavouriteSet {
        let snapshot = {
            let mut set = self.lock_set();
            let member = set.toggle(name);
            tracing::debug!(name, member, "favourite toggled");
            set.clone()
        };
        match serde_json::to_string(&snapshot) {
            Ok(payload) => self.schedule_write(payload),
            Err(err) => tracing::warn!(error = %err, "failed to encode favourites"),
        }
        snapshot
    }

    /// Waits for every scheduled write to finish.
    pub async fn flush(&self) {
        let handles: Vec<JoinHandle<()>> = {
            let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
            pending.drain(..).collect()
        };
        for handle in handles {
            if let Err(err) = handle.await {
                tracing::warn!(error = %err, "favourites write task failed");
            }
        }
    }

    fn schedule_write(&self, payload: String) {
        let Ok(runtime) = Handle::try_current() else {
            tracing::warn!("no async runtime; favourites not persisted");
            return;
        };
        let kv = Arc::clone(&self.kv);
        let handle = runtime.spawn(async move {
            if let Err(err) = kv.set(FAVOURITES_KEY, &payload).await {
                tracing::warn!(error = %err, "failed to persist favourites");
            }
        });
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        pending.retain(|handle| !handle.is_finished());
        pending.push(handle);
    }

    fn lock_set(&self) -> MutexGuard<'_, FavouriteSet> {
        self.set.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
