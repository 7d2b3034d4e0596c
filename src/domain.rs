use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::DexError;

/// Species id used when a species reference has no trailing numeric segment.
pub const UNKNOWN_SPECIES_ID: u32 = 0;

/// One row of the remote index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexEntry {
    pub key: String,
    pub detail_ref: String,
}

/// A fetched index page; `offset` is the catalog position of the first entry.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct IndexPage {
    pub offset: u32,
    pub entries: Vec<IndexEntry>,
}

impl IndexPage {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichedRecord {
    pub id: u32,
    pub display_name: String,
    pub image_ref: String,
    pub types: Vec<String>,
    pub stat_total: u32,
}

impl EnrichedRecord {
    pub fn has_type(&self, type_name: &str) -> bool {
        self.types.iter().any(|t| t == type_name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvolutionLink {
    pub species_name: String,
    pub species_id: u32,
}

impl EvolutionLink {
    pub fn display_name(&self) -> String {
        display_name(&self.species_name)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum SortKey {
    #[default]
    #[value(name = "id")]
    ById,
    #[value(name = "name")]
    ByName,
    #[value(name = "stat-total")]
    ByStatTotal,
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortKey::ById => write!(f, "id"),
            SortKey::ByName => write!(f, "name"),
            SortKey::ByStatTotal => write!(f, "stat-total"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TypeFilter {
    #[default]
    All,
    Only(String),
}

impl TypeFilter {
    pub fn matches(&self, record: &EnrichedRecord) -> bool {
        match self {
            TypeFilter::All => true,
            TypeFilter::Only(name) => record.has_type(name),
        }
    }
}

impl fmt::Display for TypeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeFilter::All => write!(f, "all"),
            TypeFilter::Only(name) => write!(f, "{name}"),
        }
    }
}

impl FromStr for TypeFilter {
    type Err = DexError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_lowercase();
        if normalized.is_empty() {
            return Err(DexError::InvalidTypeFilter(value.to_string()));
        }
        if normalized == "all" {
            return Ok(TypeFilter::All);
        }
        let is_valid = normalized
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '-');
        if !is_valid {
            return Err(DexError::InvalidTypeFilter(value.to_string()));
        }
        Ok(TypeFilter::Only(normalized))
    }
}

/// UI criteria for one derived view.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewCriteria {
    pub search_text: String,
    pub type_filter: TypeFilter,
    pub sort_key: SortKey,
}

impl ViewCriteria {
    pub fn new(search_text: impl Into<String>, type_filter: TypeFilter, sort_key: SortKey) -> Self {
        Self {
            search_text: search_text.into(),
            type_filter,
            sort_key,
        }
    }
}

/// Upper-cases the first character of a catalog key.
pub fn display_name(key: &str) -> String {
    let mut chars = key.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Extracts the trailing numeric path segment of a resource reference,
/// e.g. `.../pokemon-species/133/` yields 133.
pub fn species_id_from_ref(reference: &str) -> u32 {
    reference
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .and_then(|segment| segment.parse::<u32>().ok())
        .unwrap_or(UNKNOWN_SPECIES_ID)
}
