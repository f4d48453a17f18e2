//! Google encoded polyline codec.
//!
//! Coordinates are scaled by 1e5, delta-encoded against the previous
//! point, zigzag-encoded for the sign, and written as little-endian 5-bit
//! groups with bit 6 as the continuation flag, each byte offset by 63.
//!
//! A string that ends in the middle of a group (final byte still has the
//! continuation bit set) is reported as `MalformedPolyline` rather than
//! silently truncated.

use crate::error::{NavigationError, Result};
use crate::types::LatLng;

const SCALE: f64 = 1e5;

/// Decode an encoded polyline into a coordinate sequence.
///
/// Empty input decodes to an empty sequence.
pub fn decode(encoded: &str) -> Result<Vec<LatLng>> {
    let bytes = encoded.as_bytes();
    let mut points = Vec::new();
    let mut index = 0;
    let mut lat: i64 = 0;
    let mut lng: i64 = 0;

    while index < bytes.len() {
        lat += next_delta(bytes, &mut index)?;
        lng += next_delta(bytes, &mut index)?;

        points.push(LatLng::new(lat as f64 / SCALE, lng as f64 / SCALE));
    }

    Ok(points)
}

/// Encode a coordinate sequence; the inverse of [`decode`] to 1e-5.
pub fn encode(points: &[LatLng]) -> String {
    let mut out = String::new();
    let mut prev_lat: i64 = 0;
    let mut prev_lng: i64 = 0;

    for point in points {
        let lat = (point.latitude * SCALE).round() as i64;
        let lng = (point.longitude * SCALE).round() as i64;

        write_delta(lat - prev_lat, &mut out);
        write_delta(lng - prev_lng, &mut out);

        prev_lat = lat;
        prev_lng = lng;
    }

    out
}

/// Read one zigzag-encoded delta starting at `*index`.
fn next_delta(bytes: &[u8], index: &mut usize) -> Result<i64> {
    let mut result: i64 = 0;
    let mut shift = 0;

    loop {
        if *index >= bytes.len() {
            // Ran out of input with the continuation bit still set.
            return Err(NavigationError::MalformedPolyline { position: *index });
        }

        let chunk = (bytes[*index] as i64).wrapping_sub(63);
        *index += 1;

        result |= (chunk & 0x1f) << shift;
        shift += 5;

        if chunk < 0x20 {
            break;
        }
    }

    // Zigzag sign decode.
    if result & 1 != 0 {
        Ok(!(result >> 1))
    } else {
        Ok(result >> 1)
    }
}

/// Write one delta as zigzag varint groups.
fn write_delta(delta: i64, out: &mut String) {
    let mut value = if delta < 0 { !(delta << 1) } else { delta << 1 };

    while value >= 0x20 {
        out.push(((0x20 | (value & 0x1f)) + 63) as u8 as char);
        value >>= 5;
    }
    out.push((value + 63) as u8 as char);
}
