//! Distance-based location filter.
//!
//! Decides whether a new position fix moved far enough from the last
//! recorded path point to be worth recording.

use crate::geo::haversine_distance;
use crate::types::LatLng;

/// Default minimum distance between recorded path points, in meters.
pub const MIN_RECORD_DISTANCE_M: f64 = 10.0;

/// Whether `candidate` should be recorded as a new path point.
///
/// The first fix (no previous point) is always recorded; after that a
/// fix is recorded iff it is at least `threshold_m` meters from the last
/// recorded point.
pub fn should_record(last: Option<&LatLng>, candidate: &LatLng, threshold_m: f64) -> bool {
    match last {
        None => true,
        Some(prev) => haversine_distance(prev, candidate) >= threshold_m,
    }
}
