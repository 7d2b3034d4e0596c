use std::sync::Arc;

use serde::Serialize;

use crate::catalog::CatalogClient;
use crate::collection::CollectionState;
use crate::domain::{EnrichedRecord, ViewCriteria};
use crate::enrich::{EnrichedCollection, load_collection};
use crate::error::DexError;
use crate::evolution::fetch_lineage;
use crate::favourites::{FavouriteSet, FavouritesStore};
use crate::profile::{CreatureProfile, DetailView};
use crate::store::KeyValueStore;
use crate::view::{compute_favourites_view, compute_view};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadOutcome {
    pub generation: u64,
    pub enriched: usize,
    pub dropped: usize,
    /// False when a newer load started before this one finished.
    pub applied: bool,
}

/// Entry point for presentation code: one catalog, one collection, one
/// favourites store shared by every screen.
pub struct Pokedex<C: CatalogClient, S: KeyValueStore + 'static> {
    catalog: C,
    collection: CollectionState,
    favourites: FavouritesStore<S>,
}

impl<C: CatalogClient, S: KeyValueStore + 'static> Pokedex<C, S> {
    pub async fn open(catalog: C, kv: Arc<S>) -> Self {
        let favourites = FavouritesStore::load(kv).await;
        Self::with_favourites(catalog, favourites)
    }

    pub fn with_favourites(catalog: C, favourites: FavouritesStore<S>) -> Self {
        Self {
            catalog,
            collection: CollectionState::new(),
            favourites,
        }
    }

    /// Loads one index page and replaces the collection, unless a newer
    /// reload has started in the meantime. On failure the previous
    /// collection is kept.
    pub async fn reload(&self, offset: u32, limit: u32) -> Result<LoadOutcome, DexError> {
        let ticket = self.collection.begin_load();
        match load_collection(&self.catalog, offset, limit).await {
            Ok(collection) => {
                let enriched = collection.records.len();
                let dropped = collection.dropped_count;
                let applied = self.collection.commit(ticket, collection);
                Ok(LoadOutcome {
                    generation: ticket.generation(),
                    enriched,
                    dropped,
                    applied,
                })
            }
            Err(err) => {
                tracing::warn!(error = %err, "collection load failed");
                self.collection.fail(ticket);
                Err(err)
            }
        }
    }

    pub fn is_loading(&self) -> bool {
        self.collection.is_loading()
    }

    pub fn collection(&self) -> Option<Arc<EnrichedCollection>> {
        self.collection.current()
    }

    /// `None` until a collection has been loaded.
    pub fn view(&self, criteria: &ViewCriteria) -> Option<Vec<EnrichedRecord>> {
        let collection = self.collection.current()?;
        Some(
            compute_view(&collection.records, criteria)
                .into_iter()
                .cloned()
                .collect(),
        )
    }

    pub fn favourites_view(&self, criteria: &ViewCriteria) -> Option<Vec<EnrichedRecord>> {
        let collection = self.collection.current()?;
        let favourites = self.favourites.snapshot();
        Some(
            compute_favourites_view(&collection.records, criteria, &favourites)
                .into_iter()
                .cloned()
                .collect(),
        )
    }

    /// Fetches the profile for `key` and its lineage. Lineage failures leave
    /// the lineage empty.
    pub async fn open_detail(&self, key: &str) -> Result<DetailView, DexError> {
        let detail_ref = self.catalog.detail_ref(key);
        let detail = self
            .catalog
            .fetch_detail(&detail_ref)
            .await
            .map_err(|err| match err {
                DexError::CatalogStatus { status: 404, .. } => DexError::NotFound(key.to_string()),
                other => other,
            })?;
        let lineage = fetch_lineage(&self.catalog, &detail.species.url).await;
        let profile = CreatureProfile::from_detail(&detail);
        let favourite = self.favourites.is_favourite(&profile.display_name);
        Ok(DetailView {
            profile,
            lineage,
            favourite,
        })
    }

    pub fn favourites(&self) -> &FavouritesStore<S> {
        &self.favourites
    }

    pub fn toggle_favourite(&self, name: &str) -> FavouriteSet {
        self.favourites.toggle(name)
    }

    pub fn is_favourite(&self, name: &str) -> bool {
        self.favourites.is_favourite(name)
    }
}
