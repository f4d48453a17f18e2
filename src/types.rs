//! Core value types shared across the engine.
//!
//! `LatLng` serializes with `lat`/`lng` field names, matching both the
//! directions provider wire format and the persisted snapshot contract.

use serde::{Deserialize, Serialize};

/// A WGS84 coordinate.
///
/// Equality is exact floating-point equality; that is what the address
/// cache keys on. Proximity comparisons go through
/// [`haversine_distance`](crate::geo::haversine_distance) instead.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    #[serde(rename = "lat")]
    pub latitude: f64,
    #[serde(rename = "lng")]
    pub longitude: f64,
}

impl LatLng {
    /// Create a new coordinate.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Check that the coordinate is finite and inside WGS84 bounds.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && self.latitude >= -90.0
            && self.latitude <= 90.0
            && self.longitude >= -180.0
            && self.longitude <= 180.0
    }
}

/// Travel mode requested from the directions provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TravelMode {
    Driving,
    Walking,
}

impl TravelMode {
    /// Wire value used in the directions request and the snapshot.
    pub fn as_str(&self) -> &'static str {
        match self {
            TravelMode::Driving => "driving",
            TravelMode::Walking => "walking",
        }
    }

    /// Lenient parse for snapshot restore; unknown values fall back to
    /// driving rather than failing the whole reload.
    pub fn parse(s: &str) -> Self {
        match s {
            "walking" => TravelMode::Walking,
            _ => TravelMode::Driving,
        }
    }
}

/// A fetched route: ordered points from origin to destination plus the
/// leg summary texts from the provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub points: Vec<LatLng>,
    pub distance_text: String,
    pub duration_text: String,
    pub mode: TravelMode,
}

impl Route {
    /// Total length of the route geometry in meters.
    pub fn length_meters(&self) -> f64 {
        crate::geo::path_length(&self.points)
    }
}

/// A recorded point of the visited path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutePoint {
    pub position: LatLng,
    /// Resolved address, or a formatted-coordinate fallback. `None` only
    /// in snapshots written before resolution completed.
    pub address: Option<String>,
    /// Unix timestamp (seconds since epoch).
    pub recorded_at: i64,
}

impl RoutePoint {
    pub fn new(position: LatLng, address: Option<String>, recorded_at: i64) -> Self {
        Self {
            position,
            address,
            recorded_at,
        }
    }
}

/// Session states. `Completed` is not a state: arrival folds straight
/// back to `Idle` after emitting the arrival event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Picking,
    Previewing,
    Active,
}

/// The persisted session snapshot.
///
/// Field names are the storage contract; the whole struct is written as
/// one JSON blob in a single statement, so a reload either sees the full
/// previous state or none of it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub navigation_active: bool,
    pub tracking_active: bool,
    pub route_points: Vec<RoutePoint>,
    pub destination: Option<LatLng>,
    pub navigation_mode: String,
    pub route_distance: String,
    pub route_duration: String,
    /// Route geometry, codec-encoded. Empty when no route is live.
    #[serde(default)]
    pub route_polyline: String,
}

impl Default for SessionSnapshot {
    fn default() -> Self {
        Self {
            navigation_active: false,
            tracking_active: false,
            route_points: Vec::new(),
            destination: None,
            navigation_mode: TravelMode::Driving.as_str().to_string(),
            route_distance: String::new(),
            route_duration: String::new(),
            route_polyline: String::new(),
        }
    }
}

impl SessionSnapshot {
    /// A snapshot persisted as active must carry a destination; anything
    /// else is a partial write from a previous life and loads as idle.
    pub fn is_consistent(&self) -> bool {
        !self.navigation_active || self.destination.is_some()
    }
}
