//! # Route Session
//!
//! The navigation session state machine. Owns the active destination,
//! fetched route and visited path, reacts to location fixes and user
//! commands, and drives persistence.
//!
//! ## Concurrency
//!
//! Exactly one session exists per process. All mutations go through one
//! `tokio::sync::Mutex` around the session state (single-writer
//! discipline). Network calls — the directions fetch and address
//! resolution — run with the lock released; before applying their result
//! the session re-acquires the lock and validates a generation counter.
//! The counter advances on every pick dispatch and on stop, arrival and
//! cancellation, so only the most recently dispatched fetch can apply
//! and a late response never resurrects a dead session.
//!
//! ## States
//!
//! `Idle -> Picking -> Previewing -> Active -> Idle`, with arrival and
//! explicit stop folding any state back to `Idle`. Both are idempotent.

use std::path::Path;
use std::sync::Arc;

use chrono::Utc;
use log::{debug, info, warn};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tokio::sync::Mutex;

use crate::config::EngineConfig;
use crate::error::{NavigationError, Result};
use crate::events::{event_channel, NavEvent};
use crate::filter::should_record;
use crate::geo::haversine_distance;
use crate::http::{AddressResolver, DirectionsClient, DirectionsProvider, GeocodingClient};
use crate::polyline;
use crate::store::RouteStore;
use crate::types::{LatLng, Route, RoutePoint, SessionSnapshot, SessionState, TravelMode};

/// Mutable session state, guarded by the session mutex.
#[derive(Debug)]
struct SessionInner {
    state: SessionState,
    destination: Option<LatLng>,
    route: Option<Route>,
    path: Vec<RoutePoint>,
    tracking_active: bool,
    /// Last delivered fix, tracked in every state; used as the origin
    /// when a destination is picked.
    current_position: Option<LatLng>,
    /// Bumped on stop, arrival, cancellation and every pick dispatch;
    /// in-flight async results carry the generation they were dispatched
    /// under and are dropped on mismatch, so only the most recently
    /// dispatched fetch can ever apply.
    generation: u64,
}

impl SessionInner {
    fn idle() -> Self {
        Self {
            state: SessionState::Idle,
            destination: None,
            route: None,
            path: Vec::new(),
            tracking_active: false,
            current_position: None,
            generation: 0,
        }
    }

    /// Rebuild session state from a persisted snapshot. Anything that
    /// does not add up to a coherent active session comes back idle.
    fn from_snapshot(snapshot: SessionSnapshot) -> Self {
        if !snapshot.navigation_active {
            return Self::idle();
        }
        let Some(destination) = snapshot.destination else {
            return Self::idle();
        };
        let points = match polyline::decode(&snapshot.route_polyline) {
            Ok(points) => points,
            Err(e) => {
                warn!("[RouteSession] Persisted route geometry unreadable, starting idle: {e}");
                return Self::idle();
            }
        };
        if points.is_empty() {
            warn!("[RouteSession] Persisted active session has no route geometry, starting idle");
            return Self::idle();
        }

        info!(
            "[RouteSession] Restored active session: {} path points, destination {:.5},{:.5}",
            snapshot.route_points.len(),
            destination.latitude,
            destination.longitude
        );

        Self {
            state: SessionState::Active,
            destination: Some(destination),
            route: Some(Route {
                points,
                distance_text: snapshot.route_distance,
                duration_text: snapshot.route_duration,
                mode: TravelMode::parse(&snapshot.navigation_mode),
            }),
            path: snapshot.route_points,
            tracking_active: snapshot.tracking_active,
            current_position: None,
            generation: 0,
        }
    }

    fn to_snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            navigation_active: self.state == SessionState::Active,
            tracking_active: self.tracking_active,
            route_points: self.path.clone(),
            destination: self.destination,
            navigation_mode: self
                .route
                .as_ref()
                .map(|r| r.mode.as_str().to_string())
                .unwrap_or_else(|| TravelMode::Driving.as_str().to_string()),
            route_distance: self
                .route
                .as_ref()
                .map(|r| r.distance_text.clone())
                .unwrap_or_default(),
            route_duration: self
                .route
                .as_ref()
                .map(|r| r.duration_text.clone())
                .unwrap_or_default(),
            route_polyline: self
                .route
                .as_ref()
                .map(|r| polyline::encode(&r.points))
                .unwrap_or_default(),
        }
    }
}

/// The navigation session, generic over its providers so the state
/// machine is testable without a network.
pub struct RouteSession<D, G> {
    directions: Arc<D>,
    geocoder: Arc<G>,
    store: Arc<RouteStore>,
    config: EngineConfig,
    events: UnboundedSender<NavEvent>,
    inner: Mutex<SessionInner>,
}

/// The fully wired session used in production.
pub type NavigationEngine = RouteSession<DirectionsClient, GeocodingClient>;

impl NavigationEngine {
    /// Composition root: build the store and real HTTP clients and wire
    /// them into a session, restoring any persisted active session.
    pub fn build(
        config: EngineConfig,
        store_path: impl AsRef<Path>,
    ) -> Result<(Arc<Self>, UnboundedReceiver<NavEvent>)> {
        let store = Arc::new(RouteStore::open(store_path)?);
        let directions = Arc::new(DirectionsClient::new(&config)?);
        let geocoder = Arc::new(GeocodingClient::new(&config)?);
        let (session, events) = RouteSession::new(directions, geocoder, store, config);
        Ok((Arc::new(session), events))
    }
}

impl<D: DirectionsProvider, G: AddressResolver> RouteSession<D, G> {
    /// Create a session over the given collaborators, restoring the
    /// persisted snapshot. A failing load is logged and starts idle; the
    /// in-memory session stays authoritative from there on.
    pub fn new(
        directions: Arc<D>,
        geocoder: Arc<G>,
        store: Arc<RouteStore>,
        config: EngineConfig,
    ) -> (Self, UnboundedReceiver<NavEvent>) {
        let snapshot = store.load().unwrap_or_else(|e| {
            warn!("[RouteSession] Failed to load persisted session: {e}");
            SessionSnapshot::default()
        });

        let (events, receiver) = event_channel();
        let session = Self {
            directions,
            geocoder,
            store,
            config,
            events,
            inner: Mutex::new(SessionInner::from_snapshot(snapshot)),
        };
        (session, receiver)
    }

    // ========================================================================
    // Observers
    // ========================================================================

    pub async fn state(&self) -> SessionState {
        self.inner.lock().await.state
    }

    pub async fn destination(&self) -> Option<LatLng> {
        self.inner.lock().await.destination
    }

    pub async fn route(&self) -> Option<Route> {
        self.inner.lock().await.route.clone()
    }

    pub async fn path(&self) -> Vec<RoutePoint> {
        self.inner.lock().await.path.clone()
    }

    pub async fn is_tracking(&self) -> bool {
        self.inner.lock().await.tracking_active
    }

    // ========================================================================
    // User commands
    // ========================================================================

    /// Idle -> Picking. Clears any stale path left from a previous run.
    pub async fn enter_picking(&self) {
        let mut inner = self.inner.lock().await;
        if inner.state != SessionState::Idle {
            return;
        }
        inner.state = SessionState::Picking;
        if !inner.path.is_empty() {
            inner.path.clear();
            self.persist(&inner);
        }
        debug!("[RouteSession] Entered picking mode");
    }

    /// Picking -> Idle without selecting anything. Invalidates any
    /// directions fetch still in flight for the cancelled pick.
    pub async fn cancel_picking(&self) {
        let mut inner = self.inner.lock().await;
        if inner.state == SessionState::Picking {
            inner.state = SessionState::Idle;
            inner.generation += 1;
        }
    }

    /// Select a destination and fetch a route to it from the current
    /// position.
    ///
    /// An active session is stopped first, so at most one destination is
    /// ever live. On success the session moves to `Previewing` and a
    /// `RouteUpdated` event is emitted; on failure it returns to `Idle`
    /// with the typed error surfaced both to the caller and as an
    /// `Error` event. No partial route is ever committed.
    pub async fn pick_destination(&self, destination: LatLng, mode: TravelMode) -> Result<()> {
        let (origin, generation) = {
            let mut inner = self.inner.lock().await;
            if inner.state == SessionState::Active {
                info!("[RouteSession] New destination picked while active, stopping first");
                self.reset_locked(&mut inner);
            }
            let Some(origin) = inner.current_position else {
                return Err(NavigationError::PositionUnknown);
            };
            inner.state = SessionState::Picking;
            // Each dispatch gets a fresh generation so a slower earlier
            // fetch can never clobber the result of a newer pick.
            inner.generation += 1;
            (origin, inner.generation)
        };

        let result = self.directions.fetch_route(origin, destination, mode).await;

        let mut inner = self.inner.lock().await;
        if inner.generation != generation {
            debug!("[RouteSession] Discarding directions response for a stopped session");
            return Ok(());
        }

        match result {
            Ok(route) => {
                inner.state = SessionState::Previewing;
                inner.destination = Some(destination);
                inner.route = Some(route.clone());
                self.emit(NavEvent::RouteUpdated { route });
                Ok(())
            }
            Err(e) => {
                inner.state = SessionState::Idle;
                inner.destination = None;
                inner.route = None;
                warn!("[RouteSession] Route fetch failed: {e}");
                self.emit(NavEvent::Error {
                    message: e.to_string(),
                });
                Err(e)
            }
        }
    }

    /// Previewing -> Active: start navigating the previewed route and
    /// persist the full session. A no-op in any other state.
    pub async fn confirm_start(&self) {
        let mut inner = self.inner.lock().await;
        if inner.state != SessionState::Previewing {
            return;
        }
        inner.state = SessionState::Active;
        inner.tracking_active = true;
        inner.path.clear();
        self.persist(&inner);
        info!("[RouteSession] Navigation started");
    }

    /// Previewing -> Idle: discard the fetched route and invalidate any
    /// fetch still in flight.
    pub async fn cancel_preview(&self) {
        let mut inner = self.inner.lock().await;
        if inner.state != SessionState::Previewing {
            return;
        }
        inner.state = SessionState::Idle;
        inner.destination = None;
        inner.route = None;
        inner.generation += 1;
    }

    /// Stop navigation and clear destination, route and path. Idempotent:
    /// stopping an already idle session is a no-op.
    pub async fn stop(&self) {
        let mut inner = self.inner.lock().await;
        if inner.state == SessionState::Idle && inner.destination.is_none() {
            return;
        }
        self.reset_locked(&mut inner);
        info!("[RouteSession] Navigation stopped");
    }

    // ========================================================================
    // Location fixes
    // ========================================================================

    /// Deliver a location fix with its unix-seconds timestamp.
    ///
    /// The current position is tracked in every state. While active, the
    /// fix first goes through the arrival check, then the distance
    /// filter; a recorded fix resolves its address (lock released) and
    /// is appended to the path and persisted.
    pub async fn on_location_fix(&self, position: LatLng, recorded_at: i64) {
        let generation = {
            let mut inner = self.inner.lock().await;
            inner.current_position = Some(position);
            if inner.state != SessionState::Active {
                return;
            }

            if let Some(destination) = inner.destination {
                if haversine_distance(&position, &destination) <= self.config.arrival_threshold_m {
                    info!("[RouteSession] Destination reached");
                    self.reset_locked(&mut inner);
                    self.emit(NavEvent::ArrivalReached { destination });
                    return;
                }
            }

            let last = inner.path.last().map(|p| p.position);
            if !should_record(last.as_ref(), &position, self.config.min_record_distance_m) {
                return;
            }
            inner.generation
        };

        // Address resolution is best-effort network I/O; never hold the
        // session lock across it.
        let address = self.geocoder.resolve_address(position).await;

        let mut inner = self.inner.lock().await;
        if inner.state != SessionState::Active || inner.generation != generation {
            debug!("[RouteSession] Discarding path point for a stopped session");
            return;
        }
        // The session may have recorded other fixes while resolving.
        let last = inner.path.last().map(|p| p.position);
        if !should_record(last.as_ref(), &position, self.config.min_record_distance_m) {
            return;
        }

        let point = RoutePoint::new(position, Some(address), recorded_at);
        inner.path.push(point.clone());
        self.persist(&inner);
        self.emit(NavEvent::PathPointAdded { point });
    }

    /// Deliver a fix stamped with the current wall-clock time.
    pub async fn on_location_fix_now(&self, position: LatLng) {
        self.on_location_fix(position, Utc::now().timestamp()).await;
    }

    // ========================================================================
    // Internals
    // ========================================================================

    /// The explicit-stop transition: fold to idle, clear everything,
    /// invalidate in-flight async results and persist the idle snapshot.
    fn reset_locked(&self, inner: &mut SessionInner) {
        inner.state = SessionState::Idle;
        inner.destination = None;
        inner.route = None;
        inner.path.clear();
        inner.tracking_active = false;
        inner.generation += 1;
        self.persist(inner);
    }

    /// Best-effort snapshot write. A failed save is logged and reported;
    /// the in-memory session stays authoritative until the next write.
    fn persist(&self, inner: &SessionInner) {
        if let Err(e) = self.store.save(&inner.to_snapshot()) {
            warn!("[RouteSession] Failed to persist snapshot: {e}");
            self.emit(NavEvent::Error {
                message: e.to_string(),
            });
        }
    }

    fn emit(&self, event: NavEvent) {
        if self.events.send(event).is_err() {
            debug!("[RouteSession] Event receiver dropped");
        }
    }
}
