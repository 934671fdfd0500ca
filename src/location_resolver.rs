//! Location Resolution Module
//!
//! Turns free-text location input into a canonical name and then into
//! coordinates. Two strategies exist, picked by configuration: a local table
//! loaded from a JSON dataset, or the provider's geocoding endpoint.

use crate::http::HttpFetcher;
use crate::models::LocationRecord;
use crate::{Result, WeatherCheckError};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Canonical lookup key for a location name.
///
/// Underscores count as spaces, whitespace runs collapse to one space and
/// every word is title-cased: `"new_york"` and `"  NEW   york"` both become
/// `"New York"`. Only whitespace separates words, so `"saint-louis"` becomes
/// `"Saint-louis"`.
#[must_use]
pub fn canonicalize_location_name(input: &str) -> String {
    input
        .replace('_', " ")
        .split_whitespace()
        .map(capitalize_word)
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize_word(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// Resolves a raw location string to a named location with coordinates
#[async_trait]
pub trait LocationResolver: Send + Sync {
    /// Resolve `raw_input`, failing with `LocationNotFound` when it is unknown
    async fn resolve(&self, raw_input: &str) -> Result<LocationRecord>;
}

/// Row of the location dataset file
#[derive(Debug, Deserialize)]
struct DatasetRow {
    name: String,
    lat: f64,
    lon: f64,
}

/// In-memory table of known locations keyed by canonical name
#[derive(Debug, Clone, Default)]
pub struct LocationStore {
    entries: HashMap<String, LocationRecord>,
}

impl LocationStore {
    /// Build a store, canonicalizing every record name.
    /// On duplicate canonical names the later record wins.
    #[must_use]
    pub fn from_records(records: impl IntoIterator<Item = LocationRecord>) -> Self {
        let mut entries = HashMap::new();
        for mut record in records {
            let key = canonicalize_location_name(&record.name);
            if key.is_empty() {
                warn!("Skipping location record with empty name");
                continue;
            }
            record.name = key.clone();
            if entries.insert(key.clone(), record).is_some() {
                warn!("Duplicate location '{}' in dataset, keeping the last entry", key);
            }
        }
        Self { entries }
    }

    /// Parse a JSON dataset: `[{"name": "London", "lat": 51.5, "lon": -0.12}, ...]`
    pub fn from_json(json: &str) -> Result<Self> {
        let rows: Vec<DatasetRow> = serde_json::from_str(json)?;
        Ok(Self::from_records(
            rows.into_iter()
                .map(|row| LocationRecord::new(row.name, row.lat, row.lon)),
        ))
    }

    /// Load the dataset file at startup
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let store = Self::from_json(&json)?;
        info!(
            "Loaded {} locations from {}",
            store.len(),
            path.display()
        );
        Ok(store)
    }

    /// Look up an already canonical name
    #[must_use]
    pub fn get(&self, canonical_name: &str) -> Option<&LocationRecord> {
        self.entries.get(canonical_name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Resolves names against a [`LocationStore`]
#[derive(Debug, Clone)]
pub struct TableLocationResolver {
    store: Arc<LocationStore>,
}

impl TableLocationResolver {
    #[must_use]
    pub fn new(store: Arc<LocationStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl LocationResolver for TableLocationResolver {
    async fn resolve(&self, raw_input: &str) -> Result<LocationRecord> {
        let canonical = canonicalize_location_name(raw_input);
        debug!("Resolving '{}' as '{}' from location table", raw_input, canonical);

        self.store
            .get(&canonical)
            .cloned()
            .ok_or_else(|| WeatherCheckError::location_not_found(canonical))
    }
}

/// Geocoding response element
#[derive(Debug, Deserialize)]
struct GeocodingResult {
    name: String,
    lat: f64,
    lon: f64,
}

/// Resolves names through the provider's direct geocoding endpoint
pub struct GeocodingLocationResolver {
    fetcher: Arc<dyn HttpFetcher>,
    base_url: String,
    api_key: String,
}

impl GeocodingLocationResolver {
    pub fn new(
        fetcher: Arc<dyn HttpFetcher>,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            fetcher,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    fn geocoding_url(&self, canonical: &str) -> String {
        format!(
            "{}/geo/1.0/direct?q={}&limit=1&appid={}",
            self.base_url,
            urlencoding::encode(canonical),
            self.api_key
        )
    }
}

#[async_trait]
impl LocationResolver for GeocodingLocationResolver {
    #[instrument(skip(self))]
    async fn resolve(&self, raw_input: &str) -> Result<LocationRecord> {
        let canonical = canonicalize_location_name(raw_input);
        if canonical.is_empty() {
            return Err(WeatherCheckError::location_not_found(canonical));
        }

        debug!("Geocoding location name: {}", canonical);
        let body = self.fetcher.get_text(&self.geocoding_url(&canonical)).await?;
        let results: Vec<GeocodingResult> = serde_json::from_str(&body)?;

        let Some(first) = results.into_iter().next() else {
            return Err(WeatherCheckError::location_not_found(canonical));
        };

        debug!(
            "Found location: {} ({:.4}, {:.4})",
            first.name, first.lat, first.lon
        );
        Ok(LocationRecord::new(first.name, first.lat, first.lon))
    }
}
