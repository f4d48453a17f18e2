//! Reverse geocoding client with a bounded address cache.
//!
//! Address resolution is best-effort: the caller always gets a string.
//! Network, status and parse failures all degrade to the formatted raw
//! coordinates so tracking never stalls on a lookup.

use std::future::Future;

use log::{debug, warn};
use reqwest::Client;
use serde::Deserialize;

use crate::cache::AddressCache;
use crate::config::EngineConfig;
use crate::error::{NavigationError, Result};
use crate::http::{build_client, latlng_param, AddressResolver};
use crate::types::LatLng;

#[derive(Debug, Deserialize)]
struct GeocodingResponse {
    status: String,
    #[serde(default)]
    results: Vec<GeocodingResult>,
}

#[derive(Debug, Deserialize)]
struct GeocodingResult {
    formatted_address: String,
}

/// Client for the external reverse-geocoding endpoint.
pub struct GeocodingClient {
    client: Client,
    base_url: String,
    api_key: String,
    language: String,
    cache: AddressCache,
}

impl GeocodingClient {
    pub fn new(config: &EngineConfig) -> Result<Self> {
        Ok(Self {
            client: build_client(config.http_timeout)?,
            base_url: config.geocoding_url.clone(),
            api_key: config.api_key.clone(),
            language: config.language.clone(),
            cache: AddressCache::new(config.address_cache_capacity),
        })
    }

    /// Resolve a coordinate to a display address.
    ///
    /// Cache hits return without a network call. Concurrent misses for
    /// the same coordinate are not coalesced; both fetch and the later
    /// write wins.
    pub async fn resolve_address(&self, position: LatLng) -> String {
        if let Some(address) = self.cache.get(&position) {
            debug!("[GeocodingClient] Cache hit for {}", latlng_param(&position));
            return address;
        }

        match self.fetch_address(&position).await {
            Ok(address) => {
                self.cache.put(&position, address.clone());
                address
            }
            Err(e) => {
                warn!(
                    "[GeocodingClient] Falling back to coordinates for {}: {e}",
                    latlng_param(&position)
                );
                fallback_address(&position)
            }
        }
    }

    async fn fetch_address(&self, position: &LatLng) -> Result<String> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("latlng", latlng_param(position)),
                ("key", self.api_key.clone()),
                ("language", self.language.clone()),
            ])
            .send()
            .await
            .map_err(|e| NavigationError::Network {
                status: e.status().map(|s| s.as_u16()),
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(NavigationError::Network {
                status: Some(status.as_u16()),
                message: "geocoding request failed".to_string(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| NavigationError::Network {
                status: None,
                message: e.to_string(),
            })?;

        parse_geocoding(&body)
    }
}

impl AddressResolver for GeocodingClient {
    fn resolve_address(&self, position: LatLng) -> impl Future<Output = String> + Send {
        GeocodingClient::resolve_address(self, position)
    }
}

/// Formatted-coordinate fallback used when resolution fails.
pub fn fallback_address(position: &LatLng) -> String {
    format!("{:.5}, {:.5}", position.latitude, position.longitude)
}

/// Parse a geocoding response body into the first formatted address.
fn parse_geocoding(body: &str) -> Result<String> {
    let response: GeocodingResponse =
        serde_json::from_str(body).map_err(|e| NavigationError::Parse(e.to_string()))?;

    if response.status != "OK" {
        return Err(NavigationError::ApiStatus(response.status));
    }

    response
        .results
        .into_iter()
        .next()
        .map(|r| r.formatted_address)
        .ok_or_else(|| NavigationError::Parse("geocoding returned no results".to_string()))
}
