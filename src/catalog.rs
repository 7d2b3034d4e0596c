use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::domain::{IndexEntry, IndexPage};
use crate::error::DexError;

pub const DEFAULT_BASE_URL: &str = "https://pokeapi.co/api/v2";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedResource {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IndexResponse {
    pub results: Vec<NamedResource>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailRecord {
    #[serde(default)]
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub height: u32,
    #[serde(default)]
    pub weight: u32,
    #[serde(default)]
    pub base_experience: Option<u32>,
    pub stats: Vec<StatSlot>,
    pub types: Vec<TypeSlot>,
    #[serde(default)]
    pub abilities: Vec<AbilitySlot>,
    pub species: NamedResource,
    pub sprites: Sprites,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatSlot {
    pub base_stat: u32,
    pub stat: NamedResource,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeSlot {
    #[serde(default)]
    pub slot: u8,
    #[serde(rename = "type")]
    pub kind: NamedResource,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbilitySlot {
    pub ability: NamedResource,
    #[serde(default)]
    pub is_hidden: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Sprites {
    #[serde(default)]
    pub front_default: Option<String>,
    #[serde(default)]
    pub other: Option<OtherSprites>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OtherSprites {
    #[serde(rename = "official-artwork", default)]
    pub official_artwork: Option<Artwork>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Artwork {
    #[serde(default)]
    pub front_default: Option<String>,
}

impl Sprites {
    /// Official artwork when present, otherwise the default front sprite.
    pub fn preferred(&self) -> Option<&str> {
        self.other
            .as_ref()
            .and_then(|other| other.official_artwork.as_ref())
            .and_then(|artwork| artwork.front_default.as_deref())
            .or(self.front_default.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SpeciesRecord {
    pub evolution_chain: ChainReference,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChainReference {
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvolutionNode {
    pub species: NamedResource,
    #[serde(default)]
    pub evolves_to: Vec<EvolutionNode>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EvolutionChainRecord {
    pub chain: EvolutionNode,
}

#[async_trait]
pub trait CatalogClient: Send + Sync {
    async fn fetch_index(&self, offset: u32, limit: u32) -> Result<IndexPage, DexError>;
    async fn fetch_detail(&self, detail_ref: &str) -> Result<DetailRecord, DexError>;
    async fn fetch_species(&self, species_ref: &str) -> Result<SpeciesRecord, DexError>;
    async fn fetch_evolution_chain(&self, chain_ref: &str) -> Result<EvolutionNode, DexError>;

    /// Detail reference for a canonical key, for lookups that bypass the index.
    fn detail_ref(&self, key: &str) -> String;
}

#[derive(Clone)]
pub struct CatalogHttpClient {
    client: Client,
    base_url: String,
}

impl CatalogHttpClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, DexError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&format!("pokedex-engine/{}", env!("CARGO_PKG_VERSION")))
                .map_err(|err| DexError::CatalogHttp(err.to_string()))?,
        );
        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|err| DexError::CatalogHttp(err.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn index_url(&self, offset: u32, limit: u32) -> String {
        format!("{}/pokemon?offset={offset}&limit={limit}", self.base_url)
    }

    async fn handle_status(response: Response) -> Result<Response, DexError> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status().as_u16();
        let message = response
            .text()
            .await
            .unwrap_or_else(|_| "catalog request failed".to_string());
        Err(DexError::CatalogStatus { status, message })
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, DexError> {
        tracing::debug!(url, "catalog.request");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|err| DexError::CatalogHttp(err.to_string()))?;
        let response = Self::handle_status(response).await?;
        response
            .json::<T>()
            .await
            .map_err(|err| DexError::CatalogDecode(format!("{url}: {err}")))
    }
}

#[async_trait]
impl CatalogClient for CatalogHttpClient {
    async fn fetch_index(&self, offset: u32, limit: u32) -> Result<IndexPage, DexError> {
        let url = self.index_url(offset, limit);
        let index: IndexResponse = self.get_json(&url).await?;
        let entries = index
            .results
            .into_iter()
            .map(|item| IndexEntry {
                key: item.name,
                detail_ref: item.url,
            })
            .collect();
        Ok(IndexPage { offset, entries })
    }

    async fn fetch_detail(&self, detail_ref: &str) -> Result<DetailRecord, DexError> {
        self.get_json(detail_ref).await
    }

    async fn fetch_species(&self, species_ref: &str) -> Result<SpeciesRecord, DexError> {
        self.get_json(species_ref).await
    }

    async fn fetch_evolution_chain(&self, chain_ref: &str) -> Result<EvolutionNode, DexError> {
        let record: EvolutionChainRecord = self.get_json(chain_ref).await?;
        Ok(record.chain)
    }

    fn detail_ref(&self, key: &str) -> String {
        format!("{}/pokemon/{}", self.base_url, key.trim().to_lowercase())
    }
}
