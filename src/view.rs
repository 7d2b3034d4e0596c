use std::cmp::Ordering;

use crate::domain::{EnrichedRecord, SortKey, ViewCriteria};
use crate::favourites::FavouriteSet;

/// Filters and sorts `records` for display. Sorting is stable, so records that
/// compare equal keep their collection order.
pub fn compute_view<'a>(
    records: &'a [EnrichedRecord],
    criteria: &ViewCriteria,
) -> Vec<&'a EnrichedRecord> {
    let needle = criteria.search_text.to_lowercase();
    let mut view: Vec<&EnrichedRecord> = records
        .iter()
        .filter(|record| needle.is_empty() || record.display_name.to_lowercase().contains(&needle))
        .filter(|record| criteria.type_filter.matches(record))
        .collect();

    match criteria.sort_key {
        SortKey::ById => view.sort_by_key(|record| record.id),
        SortKey::ByName => view.sort_by(|a, b| collate(&a.display_name, &b.display_name)),
        SortKey::ByStatTotal => view.sort_by(|a, b| b.stat_total.cmp(&a.stat_total)),
    }
    view
}

/// The favourites screen: only members of `favourites`, then `compute_view`.
pub fn compute_favourites_view<'a>(
    records: &'a [EnrichedRecord],
    criteria: &ViewCriteria,
    favourites: &FavouriteSet,
) -> Vec<&'a EnrichedRecord> {
    compute_view(records, criteria)
        .into_iter()
        .filter(|record| favourites.contains(&record.display_name))
        .collect()
}

/// Distinct type names in first-seen order.
pub fn available_types(records: &[EnrichedRecord]) -> Vec<String> {
    let mut types: Vec<String> = Vec::new();
    for name in records.iter().flat_map(|record| record.types.iter()) {
        if !types.contains(name) {
            types.push(name.clone());
        }
    }
    types
}

/// Case-folded ordering, ties broken by code point so the order is total.
pub fn collate(a: &str, b: &str) -> Ordering {
    a.chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase))
        .then_with(|| a.cmp(b))
}
