//! Client for the game metadata backend.

pub mod models;

pub use models::{Addon, Character, NewsItem, Perk, Rarity, Role, Shrine, ShrinePerk};

use crate::config::Config;
use models::flatten_keyed;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{url} answered with {status}")]
    Status { url: String, status: StatusCode },
    #[error("request to backend failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("unexpected payload from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    asset_base_url: String,
    api_key: Option<String>,
}

impl ApiClient {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_secs))
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url: config.api_base_url.clone(),
            asset_base_url: config.asset_base_url.clone(),
            api_key: config.api_key.clone(),
        })
    }

    /// Absolute URL of an asset path as the backend reports it.
    pub fn asset_url(&self, path: &str) -> String {
        format!("{}/{}", self.asset_base_url, path.trim_start_matches('/'))
    }

    pub async fn characters(&self) -> Result<Vec<Character>, ApiError> {
        let map: HashMap<String, Character> = self.get_json("characters").await?;
        Ok(flatten_keyed(map, |character, key| character.index = key))
    }

    /// Find a character by id, index or (short) name, ignoring case.
    pub async fn character(&self, query: &str) -> Result<Option<Character>, ApiError> {
        let characters = self.characters().await?;
        Ok(find_character(characters, query))
    }

    pub async fn perks(&self) -> Result<Vec<Perk>, ApiError> {
        let map: HashMap<String, Perk> = self.get_json("perks").await?;
        Ok(flatten_keyed(map, |perk, key| perk.id = key))
    }

    pub async fn addons(&self) -> Result<Vec<Addon>, ApiError> {
        let map: HashMap<String, Addon> = self.get_json("addons").await?;
        Ok(flatten_keyed(map, |addon, key| addon.id = key))
    }

    pub async fn shrine(&self) -> Result<Shrine, ApiError> {
        self.get_json("shrine").await
    }

    /// Latest news, newest first.
    pub async fn news(&self) -> Result<Vec<NewsItem>, ApiError> {
        let mut items: Vec<NewsItem> = self.get_json("news").await?;
        items.sort_by(|a, b| b.published.cmp(&a.published));
        Ok(items)
    }

    /// Raw bytes of an icon or portrait.
    pub async fn fetch_asset(&self, path: &str) -> Result<Vec<u8>, ApiError> {
        let url = self.asset_url(path);
        let response = self.http.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(ApiError::Status {
                url,
                status: response.status(),
            });
        }
        Ok(response.bytes().await?.to_vec())
    }

    async fn get_json<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, ApiError> {
        let url = format!("{}/{}", self.base_url, endpoint);
        debug!("GET {}", url);

        let mut request = self.http.get(&url);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            warn!("Backend request to {} failed with {}", url, status);
            return Err(ApiError::Status { url, status });
        }

        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|source| ApiError::Decode { url, source })
    }
}

/// Exact matches win; otherwise the first character whose name contains the query.
pub fn find_character(characters: Vec<Character>, query: &str) -> Option<Character> {
    let query = query.trim();
    if query.is_empty() {
        return None;
    }

    let needle = query.to_lowercase();
    let mut partial = None;
    for character in characters {
        if character.matches(query) {
            return Some(character);
        }
        if partial.is_none() && character.name.to_lowercase().contains(&needle) {
            partial = Some(character);
        }
    }
    partial
}
