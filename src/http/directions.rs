//! Directions provider client.
//!
//! Fetches a turn-by-turn route between two coordinates and assembles the
//! full route geometry from the per-step encoded polylines. Steps are
//! stitched with their start/end coordinates because consecutive decoded
//! polylines do not always touch; adjacent duplicate points arising from
//! the stitching are dropped.

use std::future::Future;

use log::{debug, info};
use reqwest::Client;
use serde::Deserialize;

use crate::config::EngineConfig;
use crate::error::{NavigationError, Result};
use crate::http::{build_client, latlng_param, DirectionsProvider};
use crate::polyline;
use crate::types::{LatLng, Route, TravelMode};

/// Wire shape of the directions response (the fields we consume).
#[derive(Debug, Deserialize)]
struct DirectionsResponse {
    status: String,
    #[serde(default)]
    routes: Vec<ApiRoute>,
}

#[derive(Debug, Deserialize)]
struct ApiRoute {
    legs: Vec<ApiLeg>,
}

#[derive(Debug, Deserialize)]
struct ApiLeg {
    distance: ApiText,
    duration: ApiText,
    steps: Vec<ApiStep>,
}

#[derive(Debug, Deserialize)]
struct ApiText {
    text: String,
}

#[derive(Debug, Deserialize)]
struct ApiStep {
    start_location: LatLng,
    end_location: LatLng,
    polyline: ApiPolyline,
}

#[derive(Debug, Deserialize)]
struct ApiPolyline {
    points: String,
}

/// Client for the external directions endpoint.
pub struct DirectionsClient {
    client: Client,
    base_url: String,
    api_key: String,
    language: String,
}

impl DirectionsClient {
    pub fn new(config: &EngineConfig) -> Result<Self> {
        Ok(Self {
            client: build_client(config.http_timeout)?,
            base_url: config.directions_url.clone(),
            api_key: config.api_key.clone(),
            language: config.language.clone(),
        })
    }

    /// Fetch a route between `origin` and `destination`.
    pub async fn fetch_route(
        &self,
        origin: LatLng,
        destination: LatLng,
        mode: TravelMode,
    ) -> Result<Route> {
        debug!(
            "[DirectionsClient] Fetching {} route {} -> {}",
            mode.as_str(),
            latlng_param(&origin),
            latlng_param(&destination)
        );

        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("origin", latlng_param(&origin)),
                ("destination", latlng_param(&destination)),
                ("mode", mode.as_str().to_string()),
                ("language", self.language.clone()),
                ("key", self.api_key.clone()),
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
                message: "directions request failed".to_string(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| NavigationError::Network {
                status: None,
                message: e.to_string(),
            })?;

        let route = parse_directions(&body, mode)?;
        info!(
            "[DirectionsClient] Route fetched: {} points, {:.1} km ({}, {})",
            route.points.len(),
            route.length_meters() / 1000.0,
            route.distance_text,
            route.duration_text
        );
        Ok(route)
    }
}

impl DirectionsProvider for DirectionsClient {
    fn fetch_route(
        &self,
        origin: LatLng,
        destination: LatLng,
        mode: TravelMode,
    ) -> impl Future<Output = Result<Route>> + Send {
        DirectionsClient::fetch_route(self, origin, destination, mode)
    }
}

/// Parse a directions response body into a [`Route`].
fn parse_directions(body: &str, mode: TravelMode) -> Result<Route> {
    let response: DirectionsResponse =
        serde_json::from_str(body).map_err(|e| NavigationError::Parse(e.to_string()))?;

    match response.status.as_str() {
        "OK" => {}
        "ZERO_RESULTS" => return Err(NavigationError::NoRouteFound),
        other => return Err(NavigationError::ApiStatus(other.to_string())),
    }

    let route = response
        .routes
        .into_iter()
        .next()
        .ok_or(NavigationError::NoRouteFound)?;
    let leg = route
        .legs
        .into_iter()
        .next()
        .ok_or_else(|| NavigationError::Parse("route has no legs".to_string()))?;
    if leg.steps.is_empty() {
        return Err(NavigationError::Parse("leg has no steps".to_string()));
    }

    let mut points: Vec<LatLng> = Vec::new();
    for (i, step) in leg.steps.into_iter().enumerate() {
        if i == 0 {
            push_point(&mut points, step.start_location);
        }
        for decoded in polyline::decode(&step.polyline.points)? {
            push_point(&mut points, decoded);
        }
        push_point(&mut points, step.end_location);
    }

    Ok(Route {
        points,
        distance_text: leg.distance.text,
        duration_text: leg.duration.text,
        mode,
    })
}

/// Append a point, skipping adjacent exact duplicates.
fn push_point(points: &mut Vec<LatLng>, point: LatLng) {
    if points.last() != Some(&point) {
        points.push(point);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step_json(start: LatLng, end: LatLng, points: &[LatLng]) -> String {
        format!(
            r#"{{"start_location":{{"lat":{},"lng":{}}},"end_location":{{"lat":{},"lng":{}}},"polyline":{{"points":"{}"}}}}"#,
            start.latitude,
            start.longitude,
            end.latitude,
            end.longitude,
            polyline::encode(points)
        )
    }

    fn ok_response(steps: &[String]) -> String {
        format!(
            r#"{{"status":"OK","routes":[{{"legs":[{{"distance":{{"text":"4.8 km"}},"duration":{{"text":"12 mins"}},"steps":[{}]}}]}}]}}"#,
            steps.join(",")
        )
    }

    #[test]
    fn test_zero_results_is_no_route_found() {
        let body = r#"{"status":"ZERO_RESULTS","routes":[]}"#;
        assert!(matches!(
            parse_directions(body, TravelMode::Driving),
            Err(NavigationError::NoRouteFound)
        ));
    }

    #[test]
    fn test_non_ok_status_is_api_status_error() {
        let body = r#"{"status":"REQUEST_DENIED","routes":[]}"#;
        match parse_directions(body, TravelMode::Driving) {
            Err(NavigationError::ApiStatus(s)) => assert_eq!(s, "REQUEST_DENIED"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_ok_with_empty_routes_is_no_route_found() {
        let body = r#"{"status":"OK","routes":[]}"#;
        assert!(matches!(
            parse_directions(body, TravelMode::Walking),
            Err(NavigationError::NoRouteFound)
        ));
    }

    #[test]
    fn test_missing_fields_are_parse_errors() {
        // Leg without a duration.
        let body = r#"{"status":"OK","routes":[{"legs":[{"distance":{"text":"1 km"},"steps":[]}]}]}"#;
        assert!(matches!(
            parse_directions(body, TravelMode::Driving),
            Err(NavigationError::Parse(_))
        ));

        // Route without legs.
        let body = r#"{"status":"OK","routes":[{"legs":[]}]}"#;
        assert!(matches!(
            parse_directions(body, TravelMode::Driving),
            Err(NavigationError::Parse(_))
        ));

        // Not JSON at all.
        assert!(matches!(
            parse_directions("<html>", TravelMode::Driving),
            Err(NavigationError::Parse(_))
        ));
    }

    #[test]
    fn test_two_steps_stitch_without_duplicate_seam() {
        let a = LatLng::new(38.5, -120.2);
        let b = LatLng::new(38.6, -120.3);
        let c = LatLng::new(38.7, -120.4);

        // Step polylines decode to [A,B] and [B,C]; concatenation with the
        // step endpoints would give [A,B,B,C], which must collapse to
        // [A,B,C].
        let body = ok_response(&[
            step_json(a, b, &[a, b]),
            step_json(b, c, &[b, c]),
        ]);

        let route = parse_directions(&body, TravelMode::Driving).unwrap();
        assert_eq!(route.points, vec![a, b, c]);
        assert_eq!(route.distance_text, "4.8 km");
        assert_eq!(route.duration_text, "12 mins");
        assert_eq!(route.mode, TravelMode::Driving);
    }

    #[test]
    fn test_first_step_gets_its_start_coordinate() {
        let start = LatLng::new(38.49, -120.19);
        let a = LatLng::new(38.5, -120.2);
        let b = LatLng::new(38.6, -120.3);

        // Decoded polyline starts at A, but the step start is slightly
        // earlier; it must lead the route.
        let body = ok_response(&[step_json(start, b, &[a, b])]);

        let route = parse_directions(&body, TravelMode::Walking).unwrap();
        assert_eq!(route.points, vec![start, a, b]);
    }

    #[test]
    fn test_malformed_step_polyline_surfaces() {
        let a = LatLng::new(38.5, -120.2);
        let b = LatLng::new(38.6, -120.3);
        let body = ok_response(&[format!(
            r#"{{"start_location":{{"lat":{},"lng":{}}},"end_location":{{"lat":{},"lng":{}}},"polyline":{{"points":"_"}}}}"#,
            a.latitude, a.longitude, b.latitude, b.longitude
        )]);

        assert!(matches!(
            parse_directions(&body, TravelMode::Driving),
            Err(NavigationError::MalformedPolyline { .. })
        ));
    }
}
