//! Wire and request types for the routing API.

use serde::Deserialize;

use crate::domain::GeoPoint;

/// A point a route must pass through.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Waypoint {
    pub point: GeoPoint,
    /// Minutes the driver plans to stay here before moving on. Zero for the
    /// departure point and the final destination.
    pub dwell_mins: i64,
}

impl Waypoint {
    pub fn new(point: GeoPoint, dwell_mins: i64) -> Self {
        Waypoint { point, dwell_mins }
    }
}

/// One drivable section of a planned route, connecting two consecutive
/// waypoints.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteSection {
    pub length_meters: f64,
    pub duration_seconds: f64,
    /// Transport mode as reported by the router, e.g. `"car"`. Absent when
    /// the router did not classify the section.
    pub transport_mode: Option<String>,
    /// Encoded geometry for map display.
    pub polyline: Option<String>,
}

/// Top-level routing API response.
#[derive(Debug, Clone, Deserialize)]
pub struct RoutesResponse {
    #[serde(default)]
    pub routes: Vec<Route>,
}

/// A single route alternative.
#[derive(Debug, Clone, Deserialize)]
pub struct Route {
    #[serde(default)]
    pub sections: Vec<Section>,
}

/// A section of a route between two consecutive waypoints.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub summary: Option<Summary>,
    pub polyline: Option<String>,
    pub transport: Option<Transport>,
}

/// Distance and duration for a section.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    /// Length in meters.
    pub length: Option<f64>,
    /// Duration in seconds.
    pub duration: Option<f64>,
}

/// Transport details for a section.
#[derive(Debug, Clone, Deserialize)]
pub struct Transport {
    pub mode: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_typical_response() {
        let json = r#"{
            "routes": [{
                "id": "route-0",
                "sections": [{
                    "id": "section-0",
                    "type": "vehicle",
                    "summary": {"length": 52480, "duration": 2862, "baseDuration": 2700},
                    "polyline": "BFoz5xJ67i1B1B7PzIhaxL7Y",
                    "transport": {"mode": "car"}
                }]
            }]
        }"#;

        let parsed: RoutesResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.routes.len(), 1);
        let section = &parsed.routes[0].sections[0];
        assert_eq!(section.summary.as_ref().unwrap().length, Some(52480.0));
        assert_eq!(section.summary.as_ref().unwrap().duration, Some(2862.0));
        assert_eq!(
            section.transport.as_ref().unwrap().mode.as_deref(),
            Some("car")
        );
    }

    #[test]
    fn missing_routes_defaults_to_empty() {
        let parsed: RoutesResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.routes.is_empty());
    }
}
