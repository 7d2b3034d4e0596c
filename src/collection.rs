use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::enrich::EnrichedCollection;

/// Identifies one load attempt. Only the most recently issued ticket may
/// publish its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    generation: u64,
}

impl LoadTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[derive(Debug, Default)]
struct Inner {
    generation: u64,
    loading: bool,
    current: Option<Arc<EnrichedCollection>>,
}

/// Holder of the current enriched collection. Readers get an `Arc` to a fully
/// built collection; a new collection replaces the old one in a single swap.
#[derive(Debug, Default)]
pub struct CollectionState {
    inner: Mutex<Inner>,
}

impl CollectionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a load, superseding any load still in flight.
    pub fn begin_load(&self) -> LoadTicket {
        let mut inner = self.lock();
        inner.generation += 1;
        inner.loading = true;
        LoadTicket {
            generation: inner.generation,
        }
    }

    /// Publishes `collection` if `ticket` is still current. Returns false when
    /// a newer load has started since.
    pub fn commit(&self, ticket: LoadTicket, collection: EnrichedCollection) -> bool {
        let mut inner = self.lock();
        if ticket.generation != inner.generation {
            tracing::debug!(
                stale = ticket.generation,
                current = inner.generation,
                "discarding superseded load"
            );
            return false;
        }
        inner.current = Some(Arc::new(collection));
        inner.loading = false;
        true
    }

    /// Ends a failed load. The previous collection stays in place.
    pub fn fail(&self, ticket: LoadTicket) {
        let mut inner = self.lock();
        if ticket.generation == inner.generation {
            inner.loading = false;
        }
    }

    pub fn is_loading(&self) -> bool {
        self.lock().loading
    }

    /// `None` until the first load has been committed.
    pub fn current(&self) -> Option<Arc<EnrichedCollection>> {
        self.lock().current.clone()
    }

    pub fn is_current(&self, ticket: LoadTicket) -> bool {
        self.lock().generation == ticket.generation
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::EnrichedRecord;

    fn collection(names: &[&str]) -> EnrichedCollection {
        let mut collection = EnrichedCollection::empty();
        collection.records = names
            .iter()
            .enumerate()
            .map(|(i, name)| EnrichedRecord {
                id: i as u32 + 1,
                display_name: name.to_string(),
                image_ref: String::new(),
                types: vec!["normal".to_string()],
                stat_total: 100,
            })
            .collect();
        collection
    }

    #[test]
    fn not_loaded_until_first_commit() {
        let state = CollectionState::new();
        assert!(state.current().is_none());
        assert!(!state.is_loading());

        let ticket = state.begin_load();
        assert!(state.is_loading());
        assert!(state.commit(ticket, EnrichedCollection::empty()));
        assert!(!state.is_loading());
        let current = state.current().unwrap();
        assert!(current.records.is_empty());
    }

    #[test]
    fn stale_commit_is_discarded() {
        let state = CollectionState::new();
        let first = state.begin_load();
        let second = state.begin_load();
        assert!(!state.is_current(first));

        assert!(state.commit(second, collection(&["Newer"])));
        assert!(!state.commit(first, collection(&["Older"])));
        assert_eq!(state.current().unwrap().records[0].display_name, "Newer");
    }

    #[test]
    fn stale_commit_does_not_clear_loading_flag() {
        let state = CollectionState::new();
        let first = state.begin_load();
        let _second = state.begin_load();
        assert!(!state.commit(first, collection(&["Older"])));
        assert!(state.is_loading());
        assert!(state.current().is_none());
    }

    #[test]
    fn failed_load_keeps_previous_collection() {
        let state = CollectionState::new();
        let ticket = state.begin_load();
        state.commit(ticket, collection(&["Bulbasaur"]));

        let retry = state.begin_load();
        state.fail(retry);
        assert!(!state.is_loading());
        assert_eq!(state.current().unwrap().records.len(), 1);
    }
}
