//! HTTP clients for the external directions and geocoding providers.
//!
//! Both clients are blocking-free async callers over a pooled `reqwest`
//! client with a bounded timeout. The session talks to them through the
//! [`DirectionsProvider`] and [`AddressResolver`] traits so tests can
//! drive the state machine without a network.

pub mod directions;
pub mod geocoding;

pub use directions::DirectionsClient;
pub use geocoding::GeocodingClient;

use std::future::Future;
use std::time::Duration;

use reqwest::Client;

use crate::error::{NavigationError, Result};
use crate::types::{LatLng, Route, TravelMode};

/// Fetches a route between two coordinates for a travel mode.
pub trait DirectionsProvider: Send + Sync + 'static {
    fn fetch_route(
        &self,
        origin: LatLng,
        destination: LatLng,
        mode: TravelMode,
    ) -> impl Future<Output = Result<Route>> + Send;
}

/// Resolves a coordinate to a display address. Infallible: failures
/// degrade to a formatted-coordinate string.
pub trait AddressResolver: Send + Sync + 'static {
    fn resolve_address(&self, position: LatLng) -> impl Future<Output = String> + Send;
}

/// Build the shared HTTP client with the configured timeout.
pub(crate) fn build_client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| NavigationError::Network {
            status: None,
            message: format!("failed to create HTTP client: {e}"),
        })
}

/// `lat,lng` query parameter formatting shared by both providers.
pub(crate) fn latlng_param(position: &LatLng) -> String {
    format!("{},{}", position.latitude, position.longitude)
}
