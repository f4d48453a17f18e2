//! # Waytrack
//!
//! Turn-by-turn navigation and route tracking engine.
//!
//! Given a picked destination, the engine fetches a route from an
//! external directions provider, then tracks progress along it from
//! incoming location fixes until arrival, persisting enough state to
//! resume after a process restart.
//!
//! The engine has no opinion about maps, markers or permissions: the
//! environment feeds it coordinate fixes and user commands, and reads
//! back route data, resolved addresses and session events.
//!
//! ## Components
//!
//! - [`polyline`] — codec for the provider's compact coordinate encoding
//! - [`filter`] — distance filter deciding which fixes become path points
//! - [`cache`] — bounded LRU cache of resolved addresses
//! - [`http`] — directions and reverse-geocoding clients
//! - [`store`] — SQLite single-slot session snapshot
//! - [`session`] — the navigation state machine composing all of the above
//!
//! ## Quick Start
//!
//! ```no_run
//! use waytrack::{EngineConfig, LatLng, NavigationEngine, TravelMode};
//!
//! # async fn run() -> waytrack::Result<()> {
//! let config = EngineConfig::with_api_key("…");
//! let (engine, mut events) = NavigationEngine::build(config, "session.db")?;
//!
//! engine.on_location_fix_now(LatLng::new(41.0082, 28.9784)).await;
//! engine.pick_destination(LatLng::new(41.0256, 28.9744), TravelMode::Walking).await?;
//! engine.confirm_start().await;
//!
//! while let Some(event) = events.recv().await {
//!     println!("{event:?}");
//! }
//! # Ok(())
//! # }
//! ```

// Unified error handling
pub mod error;
pub use error::{NavigationError, Result};

// Core value types
pub mod types;
pub use types::{LatLng, Route, RoutePoint, SessionSnapshot, SessionState, TravelMode};

// Engine configuration
pub mod config;
pub use config::{EngineConfig, ARRIVAL_THRESHOLD_M};

// Geographic utilities (great-circle distance, path length)
pub mod geo;
pub use geo::{haversine_distance, path_length};

// Encoded polyline codec
pub mod polyline;

// Distance-based location filter
pub mod filter;
pub use filter::{should_record, MIN_RECORD_DISTANCE_M};

// Bounded address cache
pub mod cache;
pub use cache::AddressCache;

// Directions and geocoding clients + provider traits
pub mod http;
pub use http::{AddressResolver, DirectionsClient, DirectionsProvider, GeocodingClient};

// Session snapshot persistence
pub mod store;
pub use store::RouteStore;

// Outbound events
pub mod events;
pub use events::{event_channel, NavEvent};

// The navigation session state machine and composition root
pub mod session;
pub use session::{NavigationEngine, RouteSession};
