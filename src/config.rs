//! Engine configuration.

use std::time::Duration;

use crate::cache::DEFAULT_CACHE_CAPACITY;
use crate::filter::MIN_RECORD_DISTANCE_M;

/// Distance in meters at which the current fix counts as arrived.
pub const ARRIVAL_THRESHOLD_M: f64 = 10.0;

/// Configuration for the navigation engine.
///
/// Defaults mirror the production endpoints and thresholds; only the API
/// credential has to be supplied.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Credential passed as the `key` query parameter.
    pub api_key: String,
    /// Response language for directions and geocoding.
    pub language: String,
    /// Directions endpoint base URL.
    pub directions_url: String,
    /// Reverse geocoding endpoint base URL.
    pub geocoding_url: String,
    /// Address cache capacity.
    pub address_cache_capacity: usize,
    /// Minimum distance between recorded path points, meters.
    pub min_record_distance_m: f64,
    /// Arrival proximity threshold, meters.
    pub arrival_threshold_m: f64,
    /// Per-request HTTP timeout.
    pub http_timeout: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            language: "tr".to_string(),
            directions_url: "https://maps.googleapis.com/maps/api/directions/json".to_string(),
            geocoding_url: "https://maps.googleapis.com/maps/api/geocode/json".to_string(),
            address_cache_capacity: DEFAULT_CACHE_CAPACITY,
            min_record_distance_m: MIN_RECORD_DISTANCE_M,
            arrival_threshold_m: ARRIVAL_THRESHOLD_M,
            http_timeout: Duration::from_secs(30),
        }
    }
}

impl EngineConfig {
    /// Default configuration with the given API credential.
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Self::default()
        }
    }
}
