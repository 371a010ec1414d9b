//! Legs: the drivable connections between consecutive itinerary points.

use std::fmt;

use super::{LegId, LocationId, StintId, StopId};

/// Where a leg departs from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegStart {
    /// The stint's departure location. Only the first leg starts here.
    Location(LocationId),
    /// A prior stop in the same stint.
    Stop(StopId),
}

/// Dominant road character of a leg, classified from its average speed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteKind {
    Highway,
    Backroad,
    City,
    /// No classification was possible, or the route blends characters.
    Mixed,
}

impl RouteKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RouteKind::Highway => "highway",
            RouteKind::Backroad => "backroad",
            RouteKind::City => "city",
            RouteKind::Mixed => "mixed",
        }
    }
}

impl fmt::Display for RouteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a leg's numbers came from the router or a local fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteSource {
    /// Computed by the routing service.
    Routed,
    /// Placeholder values, used when routing was unavailable.
    Estimated,
}

impl RouteSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            RouteSource::Routed => "routed",
            RouteSource::Estimated => "estimated",
        }
    }
}

/// A drivable connection ending at a stop.
///
/// Legs are ordered within their stint by `sequence`, 0-based: leg `k` ends
/// at the stop with sequence `k + 1`, and leg 0 starts at the stint's
/// departure location. Legs are never edited in place; the engine rebuilds
/// the whole set whenever the stop list changes.
#[derive(Debug, Clone, PartialEq)]
pub struct Leg {
    pub id: LegId,
    pub stint_id: StintId,
    /// Position within the stint, 0-based.
    pub sequence: u32,
    pub start: LegStart,
    pub end_stop: StopId,
    /// Road distance in miles, rounded to one decimal place.
    pub distance_mi: f64,
    /// Driving time in whole minutes.
    pub travel_mins: i64,
    pub kind: RouteKind,
    /// Encoded route geometry, when the router supplied one.
    pub polyline: Option<String>,
    pub source: RouteSource,
}

impl Leg {
    /// Create a leg with placeholder metrics. The leg builder fills in real
    /// values when routing succeeds.
    pub fn new(stint_id: StintId, sequence: u32, start: LegStart, end_stop: StopId) -> Self {
        Leg {
            id: LegId::generate(),
            stint_id,
            sequence,
            start,
            end_stop,
            distance_mi: 0.0,
            travel_mins: 0,
            kind: RouteKind::Mixed,
            polyline: None,
            source: RouteSource::Estimated,
        }
    }

    pub fn is_estimated(&self) -> bool {
        self.source == RouteSource::Estimated
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_leg_starts_as_estimated() {
        let leg = Leg::new(
            StintId::generate(),
            0,
            LegStart::Location(LocationId::generate()),
            StopId::generate(),
        );
        assert!(leg.is_estimated());
        assert_eq!(leg.kind, RouteKind::Mixed);
        assert_eq!(leg.distance_mi, 0.0);
        assert_eq!(leg.travel_mins, 0);
    }

    #[test]
    fn route_kind_strings() {
        assert_eq!(RouteKind::Highway.as_str(), "highway");
        assert_eq!(RouteKind::Backroad.as_str(), "backroad");
        assert_eq!(RouteKind::City.as_str(), "city");
        assert_eq!(RouteKind::Mixed.as_str(), "mixed");
    }
}
