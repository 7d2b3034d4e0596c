use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::Serialize;

use crate::catalog::{CatalogClient, DetailRecord};
use crate::domain::{EnrichedRecord, IndexEntry, IndexPage, display_name};
use crate::error::DexError;

/// Number of stats a complete detail payload carries.
pub const CANONICAL_STAT_COUNT: usize = 6;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichedCollection {
    pub records: Vec<EnrichedRecord>,
    pub dropped_count: usize,
    pub loaded_at: DateTime<Utc>,
}

impl EnrichedCollection {
    pub fn empty() -> Self {
        Self {
            records: Vec::new(),
            dropped_count: 0,
            loaded_at: Utc::now(),
        }
    }
}

/// Merges one index entry with its detail payload. Payloads without stats or
/// types are rejected whole.
pub fn enrich_record(
    id: u32,
    entry: &IndexEntry,
    detail: &DetailRecord,
) -> Result<EnrichedRecord, DexError> {
    if detail.stats.is_empty() {
        return Err(DexError::ShapeMismatch(format!("{}: no stats", entry.key)));
    }
    if detail.types.is_empty() {
        return Err(DexError::ShapeMismatch(format!("{}: no types", entry.key)));
    }
    if detail.stats.len() != CANONICAL_STAT_COUNT {
        tracing::debug!(
            key = %entry.key,
            stats = detail.stats.len(),
            "detail has non-canonical stat count"
        );
    }

    let stat_total = detail
        .stats
        .iter()
        .fold(0u32, |total, slot| total.saturating_add(slot.base_stat));
    let types = detail
        .types
        .iter()
        .map(|slot| slot.kind.name.clone())
        .collect();

    Ok(EnrichedRecord {
        id,
        display_name: display_name(&entry.key),
        image_ref: detail.sprites.preferred().unwrap_or_default().to_string(),
        types,
        stat_total,
    })
}

/// Fetches every entry's detail concurrently on the calling task. Failed
/// entries are dropped; survivors keep their index order.
pub async fn enrich<C>(catalog: &C, page: &IndexPage) -> EnrichedCollection
where
    C: CatalogClient + ?Sized,
{
    let fetches = page
        .entries
        .iter()
        .enumerate()
        .map(|(position, entry)| async move {
            let id = page.offset.saturating_add(position as u32 + 1);
            let detail = catalog.fetch_detail(&entry.detail_ref).await;
            match detail.and_then(|detail| enrich_record(id, entry, &detail)) {
                Ok(record) => Some(record),
                Err(err) => {
                    tracing::warn!(key = %entry.key, error = %err, "dropping index entry");
                    None
                }
            }
        });

    let outcomes = join_all(fetches).await;
    let total = outcomes.len();
    let records: Vec<EnrichedRecord> = outcomes.into_iter().flatten().collect();
    let dropped_count = total - records.len();

    tracing::info!(
        offset = page.offset,
        enriched = records.len(),
        dropped = dropped_count,
        "enrichment complete"
    );

    EnrichedCollection {
        records,
        dropped_count,
        loaded_at: Utc::now(),
    }
}

/// Fetches one index page and enriches it. Only the index fetch can fail the
/// whole load.
pub async fn load_collection<C>(
    catalog: &C,
    offset: u32,
    limit: u32,
) -> Result<EnrichedCollection, DexError>
where
    C: CatalogClient + ?Sized,
{
    let page = catalog
        .fetch_index(offset, limit)
        .await
        .map_err(|err| DexError::IndexUnavailable(err.to_string()))?;
    Ok(enrich(catalog, &page).await)
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::catalog::{NamedResource, Sprites, StatSlot, TypeSlot};

    fn resource(name: &str) -> NamedResource {
        NamedResource {
            name: name.to_string(),
            url: format!("https://example.test/{name}/"),
        }
    }

    fn detail(stats: &[u32], types: &[&str]) -> DetailRecord {
        DetailRecord {
            id: 1,
            name: "bulbasaur".to_string(),
            height: 7,
            weight: 69,
            base_experience: Some(64),
            stats: stats
                .iter()
                .map(|value| StatSlot {
                    base_stat: *value,
                    stat: resource("hp"),
                })
                .collect(),
            types: types
                .iter()
                .enumerate()
                .map(|(i, name)| TypeSlot {
                    slot: i as u8 + 1,
                    kind: resource(name),
                })
                .collect(),
            abilities: Vec::new(),
            species: resource("bulbasaur"),
            sprites: Sprites {
                front_default: Some("front.png".to_string()),
                other: None,
            },
        }
    }

    fn entry() -> IndexEntry {
        IndexEntry {
            key: "bulbasaur".to_string(),
            detail_ref: "r1".to_string(),
        }
    }

    #[test]
    fn enrich_record_sums_stats() {
        let record =
            enrich_record(1, &entry(), &detail(&[45, 49, 49, 65, 65, 45], &["grass", "poison"]))
                .unwrap();
        assert_eq!(record.display_name, "Bulbasaur");
        assert_eq!(record.stat_total, 318);
        assert_eq!(record.types, vec!["grass", "poison"]);
        assert_eq!(record.image_ref, "front.png");
    }

    #[test]
    fn enrich_record_rejects_missing_stats() {
        let err = enrich_record(1, &entry(), &detail(&[], &["grass"])).unwrap_err();
        assert_matches!(err, DexError::ShapeMismatch(_));
    }

    #[test]
    fn enrich_record_rejects_missing_types() {
        let err = enrich_record(1, &entry(), &detail(&[10], &[])).unwrap_err();
        assert_matches!(err, DexError::ShapeMismatch(_));
    }
}
