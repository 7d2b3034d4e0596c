#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use pokedex_engine::catalog::{
    CatalogClient, ChainReference, DetailRecord, EvolutionNode, NamedResource, SpeciesRecord,
    StatSlot, TypeSlot,
};
use pokedex_engine::domain::{IndexEntry, IndexPage};
use pokedex_engine::error::DexError;
use pokedex_engine::store::KeyValueStore;

pub fn detail(name: &str, stats: &[u32], types: &[&str]) -> DetailRecord {
    let raw = include_str!("../fixtures/pokemon_bulbasaur.json");
    let mut detail: DetailRecord = serde_json::from_str(raw).unwrap();
    detail.name = name.to_string();
    detail.species.name = name.to_string();
    detail.stats = stats
        .iter()
        .map(|value| StatSlot {
            base_stat: *value,
            stat: NamedResource {
                name: "hp".to_string(),
                url: "https://pokeapi.co/api/v2/stat/1/".to_string(),
            },
        })
        .collect();
    detail.types = types
        .iter()
        .enumerate()
        .map(|(i, t)| TypeSlot {
            slot: i as u8 + 1,
            kind: NamedResource {
                name: t.to_string(),
                url: format!("https://pokeapi.co/api/v2/type/{t}/"),
            },
        })
        .collect();
    detail
}

pub fn entry(key: &str) -> IndexEntry {
    IndexEntry {
        key: key.to_string(),
        detail_ref: format!("mock://pokemon/{key}"),
    }
}

struct DetailResponse {
    delay: Duration,
    detail: Option<DetailRecord>,
}

#[derive(Default)]
pub struct MockCatalog {
    index: Option<Vec<IndexEntry>>,
    index_delays: Mutex<VecDeque<Duration>>,
    index_failing_after: Option<usize>,
    index_calls: AtomicUsize,
    details: HashMap<String, DetailResponse>,
    species: HashMap<String, String>,
    chains: HashMap<String, EvolutionNode>,
    detail_calls: Mutex<Vec<String>>,
    details_in_flight: AtomicUsize,
    peak_details_in_flight: AtomicUsize,
}

impl MockCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_index(mut self, entries: Vec<IndexEntry>) -> Self {
        self.index = Some(entries);
        self
    }

    /// Index fetches after the first `calls` fail.
    pub fn with_index_failing_after(mut self, calls: usize) -> Self {
        self.index_failing_after = Some(calls);
        self
    }

    /// Delays applied to successive index fetches.
    pub fn with_index_delays(self, delays: &[u64]) -> Self {
        *self.index_delays.lock().unwrap() =
            delays.iter().map(|ms| Duration::from_millis(*ms)).collect();
        self
    }

    pub fn with_detail(mut self, key: &str, detail: DetailRecord, delay_ms: u64) -> Self {
        self.details.insert(
            format!("mock://pokemon/{key}"),
            DetailResponse {
                delay: Duration::from_millis(delay_ms),
                detail: Some(detail),
            },
        );
        self
    }

    pub fn failing_detail(mut self, key: &str, delay_ms: u64) -> Self {
        self.details.insert(
            format!("mock://pokemon/{key}"),
            DetailResponse {
                delay: Duration::from_millis(delay_ms),
                detail: None,
            },
        );
        self
    }

    pub fn with_species(mut self, species_ref: &str, chain_ref: &str) -> Self {
        self.species
            .insert(species_ref.to_string(), chain_ref.to_string());
        self
    }

    pub fn with_chain(mut self, chain_ref: &str, root: EvolutionNode) -> Self {
        self.chains.insert(chain_ref.to_string(), root);
        self
    }

    pub fn detail_calls(&self) -> Vec<String> {
        self.detail_calls.lock().unwrap().clone()
    }

    /// Most detail fetches observed waiting at the same time.
    pub fn peak_details_in_flight(&self) -> usize {
        self.peak_details_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CatalogClient for MockCatalog {
    async fn fetch_index(&self, offset: u32, limit: u32) -> Result<IndexPage, DexError> {
        let delay = self.index_delays.lock().unwrap().pop_front();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let call = self.index_calls.fetch_add(1, Ordering::SeqCst);
        if self.index_failing_after.is_some_and(|limit| call >= limit) {
            return Err(DexError::CatalogStatus {
                status: 502,
                message: "Bad Gateway".to_string(),
            });
        }
        let entries = self
            .index
            .clone()
            .ok_or_else(|| DexError::CatalogHttp("connection refused".to_string()))?;
        Ok(IndexPage {
            offset,
            entries: entries.into_iter().take(limit as usize).collect(),
        })
    }

    async fn fetch_detail(&self, detail_ref: &str) -> Result<DetailRecord, DexError> {
        self.detail_calls
            .lock()
            .unwrap()
            .push(detail_ref.to_string());
        let Some(response) = self.details.get(detail_ref) else {
            return Err(DexError::CatalogStatus {
                status: 404,
                message: "Not Found".to_string(),
            });
        };
        let in_flight = self.details_in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_details_in_flight.fetch_max(in_flight, Ordering::SeqCst);
        tokio::time::sleep(response.delay).await;
        self.details_in_flight.fetch_sub(1, Ordering::SeqCst);
        response.detail.clone().ok_or(DexError::CatalogStatus {
            status: 500,
            message: "Internal Server Error".to_string(),
        })
    }

    async fn fetch_species(&self, species_ref: &str) -> Result<SpeciesRecord, DexError> {
        self.species
            .get(species_ref)
            .map(|chain_ref| SpeciesRecord {
                evolution_chain: ChainReference {
                    url: chain_ref.clone(),
                },
            })
            .ok_or_else(|| DexError::CatalogHttp(format!("no species {species_ref}")))
    }

    async fn fetch_evolution_chain(&self, chain_ref: &str) -> Result<EvolutionNode, DexError> {
        self.chains
            .get(chain_ref)
            .cloned()
            .ok_or_else(|| DexError::CatalogDecode(format!("no chain {chain_ref}")))
    }

    fn detail_ref(&self, key: &str) -> String {
        format!("mock://pokemon/{key}")
    }
}

#[derive(Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
    writes: Mutex<Vec<String>>,
    fail_reads: bool,
    fail_writes: bool,
}

impl MemoryStore {
    pub fn with_value(key: &str, value: &str) -> Self {
        let store = Self::default();
        store
            .values
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        store
    }

    pub fn failing_reads() -> Self {
        Self {
            fail_reads: true,
            ..Self::default()
        }
    }

    pub fn failing_writes() -> Self {
        Self {
            fail_writes: true,
            ..Self::default()
        }
    }

    pub fn value(&self, key: &str) -> Option<String> {
        self.values.lock().unwrap().get(key).cloned()
    }

    pub fn writes(&self) -> Vec<String> {
        self.writes.lock().unwrap().clone()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, DexError> {
        if self.fail_reads {
            return Err(DexError::StorageRead("disk unavailable".to_string()));
        }
        Ok(self.values.lock().unwrap().get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), DexError> {
        if self.fail_writes {
            return Err(DexError::StorageWrite("disk full".to_string()));
        }
        self.writes.lock().unwrap().push(value.to_string());
        self.values
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}
