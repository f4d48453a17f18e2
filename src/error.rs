//! Unified error handling for the navigation engine.
//!
//! Every fallible operation returns [`NavigationError`]. The one deliberate
//! exception is address resolution: `GeocodingClient::resolve_address`
//! swallows its failures and degrades to a formatted-coordinate string,
//! because address display is best-effort and must never block tracking.

use thiserror::Error;

/// Unified error type for navigation engine operations.
#[derive(Debug, Error)]
pub enum NavigationError {
    /// Transport failure or non-success HTTP status from a provider.
    #[error("network error{}: {message}", .status.map(|s| format!(" (HTTP {s})")).unwrap_or_default())]
    Network {
        status: Option<u16>,
        message: String,
    },

    /// The directions provider answered with a non-OK status field.
    #[error("directions API returned status '{0}'")]
    ApiStatus(String),

    /// The provider found no route between origin and destination.
    #[error("no route found between origin and destination")]
    NoRouteFound,

    /// An encoded polyline ended in the middle of a varint group.
    #[error("malformed polyline: input truncated at byte {position}")]
    MalformedPolyline { position: usize },

    /// The provider response body did not match the expected shape.
    #[error("failed to parse provider response: {0}")]
    Parse(String),

    /// Reading or writing the persisted session snapshot failed.
    #[error("persistence error: {0}")]
    Persistence(String),

    /// A destination was picked before any location fix was delivered.
    #[error("current position unknown, cannot fetch a route")]
    PositionUnknown,
}

impl From<rusqlite::Error> for NavigationError {
    fn from(e: rusqlite::Error) -> Self {
        NavigationError::Persistence(e.to_string())
    }
}

impl From<serde_json::Error> for NavigationError {
    fn from(e: serde_json::Error) -> Self {
        NavigationError::Persistence(e.to_string())
    }
}

/// Result type alias for navigation engine operations.
pub type Result<T> = std::result::Result<T, NavigationError>;
