//! Outbound events for the environment (UI layer) to render.

use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

use crate::types::{LatLng, Route, RoutePoint};

/// Event emitted by the session for the environment to react to.
#[derive(Debug, Clone, PartialEq)]
pub enum NavEvent {
    /// A route was fetched and is ready to preview.
    RouteUpdated { route: Route },
    /// A new point was recorded on the visited path.
    PathPointAdded { point: RoutePoint },
    /// The destination was reached; the session folded back to idle.
    ArrivalReached { destination: LatLng },
    /// A surfaced error (directions failure, persistence write failure).
    Error { message: String },
}

/// Channel pair for session events. The session keeps the sender, the
/// environment the receiver.
pub fn event_channel() -> (UnboundedSender<NavEvent>, UnboundedReceiver<NavEvent>) {
    unbounded_channel()
}
