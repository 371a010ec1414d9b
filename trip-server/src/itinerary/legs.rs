//! Leg construction: turning a stint's stop list into routed connections.
//!
//! Legs are always rebuilt as a full set, one per stop. When the router
//! answers, each leg carries its real distance, travel time and road
//! character; when it does not, every leg gets placeholder metrics so the
//! itinerary stays structurally complete. Routing trouble never fails the
//! mutation that triggered the rebuild.

use chrono::{DateTime, Utc};

use crate::domain::{Leg, LegId, LegStart, Location, RouteKind, RouteSource, StintId, Stop};
use crate::routing::{RouteProvider, RouteSection, Waypoint};

use super::config::EngineConfig;

pub(crate) const METERS_PER_MILE: f64 = 1609.344;

/// Round a raw mileage to one decimal place, the precision every stored
/// distance uses.
pub(crate) fn round_miles(raw: f64) -> f64 {
    (raw * 10.0).round() / 10.0
}

/// Classify a section by its average speed.
///
/// Sections with no reported transport mode or no elapsed time cannot be
/// classified and come back as [`RouteKind::Mixed`].
fn classify(section: &RouteSection, config: &EngineConfig) -> RouteKind {
    if section.transport_mode.is_none() || section.duration_seconds <= 0.0 {
        return RouteKind::Mixed;
    }

    let miles = section.length_meters / METERS_PER_MILE;
    let hours = section.duration_seconds / 3600.0;
    let mph = miles / hours;

    if mph > config.highway_mph {
        RouteKind::Highway
    } else if mph > config.backroad_mph {
        RouteKind::Backroad
    } else {
        RouteKind::City
    }
}

fn leg_start(start: &Location, stops: &[(Stop, Location)], index: usize) -> LegStart {
    if index == 0 {
        LegStart::Location(start.id)
    } else {
        LegStart::Stop(stops[index - 1].0.id)
    }
}

fn routed_legs(
    config: &EngineConfig,
    stint_id: StintId,
    start: &Location,
    stops: &[(Stop, Location)],
    sections: &[RouteSection],
) -> Vec<Leg> {
    stops
        .iter()
        .zip(sections)
        .enumerate()
        .map(|(index, ((stop, _), section))| Leg {
            id: LegId::generate(),
            stint_id,
            sequence: index as u32,
            start: leg_start(start, stops, index),
            end_stop: stop.id,
            distance_mi: round_miles(section.length_meters / METERS_PER_MILE),
            travel_mins: (section.duration_seconds / 60.0).round() as i64,
            kind: classify(section, config),
            polyline: section.polyline.clone(),
            source: RouteSource::Routed,
        })
        .collect()
}

fn estimated_legs(
    config: &EngineConfig,
    stint_id: StintId,
    start: &Location,
    stops: &[(Stop, Location)],
) -> Vec<Leg> {
    stops
        .iter()
        .enumerate()
        .map(|(index, (stop, _))| Leg {
            id: LegId::generate(),
            stint_id,
            sequence: index as u32,
            start: leg_start(start, stops, index),
            end_stop: stop.id,
            distance_mi: config.fallback_leg_miles,
            travel_mins: config.fallback_leg_mins,
            kind: RouteKind::Mixed,
            polyline: None,
            source: RouteSource::Estimated,
        })
        .collect()
}

/// Build the full leg set for a stint.
///
/// `stops` must be the stint's stops in sequence order, each paired with
/// its location. Leg `k` (0-based) ends at stop `k + 1`; leg 0 starts at
/// the stint's departure location.
///
/// Any routing failure, and any response that does not line up one section
/// per stop, degrades to placeholder legs rather than returning an error.
pub async fn build_legs<R: RouteProvider + ?Sized>(
    router: &R,
    config: &EngineConfig,
    stint_id: StintId,
    start: &Location,
    stops: &[(Stop, Location)],
    departure: DateTime<Utc>,
) -> Vec<Leg> {
    if stops.is_empty() {
        return Vec::new();
    }

    let mut waypoints = Vec::with_capacity(stops.len() + 1);
    waypoints.push(Waypoint::new(start.point, 0));
    for (stop, location) in stops {
        waypoints.push(Waypoint::new(location.point, stop.duration_mins.max(0)));
    }

    match router.plan_route(&waypoints, departure).await {
        Ok(sections) if sections.len() == stops.len() => {
            routed_legs(config, stint_id, start, stops, &sections)
        }
        Ok(sections) => {
            tracing::warn!(
                stint = %stint_id,
                expected = stops.len(),
                got = sections.len(),
                "router returned a mismatched section count; writing estimated legs"
            );
            estimated_legs(config, stint_id, start, stops)
        }
        Err(err) => {
            tracing::warn!(
                stint = %stint_id,
                error = %err,
                "route planning failed; writing estimated legs"
            );
            estimated_legs(config, stint_id, start, stops)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::GeoPoint;
    use crate::routing::MockRouter;

    fn section(length_meters: f64, duration_seconds: f64) -> RouteSection {
        RouteSection {
            length_meters,
            duration_seconds,
            transport_mode: Some("car".to_string()),
            polyline: None,
        }
    }

    fn location(lat: f64, lng: f64) -> Location {
        Location::new(None, GeoPoint::new(lat, lng).unwrap())
    }

    fn stint_fixture(count: usize) -> (StintId, Location, Vec<(Stop, Location)>) {
        let stint_id = StintId::generate();
        let start = location(40.0, -105.0);
        let stops = (0..count)
            .map(|i| {
                let loc = location(40.5 + i as f64 * 0.5, -105.0);
                (Stop::new(stint_id, i as u32 + 1, loc.id), loc)
            })
            .collect();
        (stint_id, start, stops)
    }

    #[test]
    fn meters_convert_to_rounded_miles() {
        assert_eq!(round_miles(1609.344 / METERS_PER_MILE), 1.0);
        assert_eq!(round_miles(52480.0 / METERS_PER_MILE), 32.6);
        assert_eq!(round_miles(0.04), 0.0);
        assert_eq!(round_miles(0.06), 0.1);
    }

    #[test]
    fn classification_follows_average_speed() {
        let config = EngineConfig::default();

        // 60 mph: 60 miles in one hour
        let fast = section(60.0 * METERS_PER_MILE, 3600.0);
        assert_eq!(classify(&fast, &config), RouteKind::Highway);

        // 30 mph
        let medium = section(30.0 * METERS_PER_MILE, 3600.0);
        assert_eq!(classify(&medium, &config), RouteKind::Backroad);

        // 10 mph
        let slow = section(10.0 * METERS_PER_MILE, 3600.0);
        assert_eq!(classify(&slow, &config), RouteKind::City);
    }

    #[test]
    fn classification_thresholds_are_exclusive() {
        // Power-of-two thresholds keep the boundary arithmetic exact in f64.
        let config = EngineConfig::new(5.0, 15, 32.0, 16.0);

        let at_highway = section(32.0 * METERS_PER_MILE, 3600.0);
        assert_eq!(classify(&at_highway, &config), RouteKind::Backroad);

        let at_backroad = section(16.0 * METERS_PER_MILE, 3600.0);
        assert_eq!(classify(&at_backroad, &config), RouteKind::City);
    }

    #[test]
    fn unclassifiable_sections_are_mixed() {
        let config = EngineConfig::default();

        let mut no_mode = section(10000.0, 600.0);
        no_mode.transport_mode = None;
        assert_eq!(classify(&no_mode, &config), RouteKind::Mixed);

        let no_time = section(10000.0, 0.0);
        assert_eq!(classify(&no_time, &config), RouteKind::Mixed);
    }

    #[tokio::test]
    async fn routed_legs_carry_section_metrics() {
        let router = MockRouter::new();
        router
            .set_sections(vec![
                section(1609.344, 1800.0),
                section(3218.688, 3600.0),
            ])
            .await;

        let config = EngineConfig::default();
        let (stint_id, start, stops) = stint_fixture(2);

        let legs = build_legs(&router, &config, stint_id, &start, &stops, Utc::now()).await;

        assert_eq!(legs.len(), 2);
        assert_eq!(legs[0].sequence, 0);
        assert_eq!(legs[0].start, LegStart::Location(start.id));
        assert_eq!(legs[0].end_stop, stops[0].0.id);
        assert_eq!(legs[0].distance_mi, 1.0);
        assert_eq!(legs[0].travel_mins, 30);
        assert_eq!(legs[0].source, RouteSource::Routed);

        assert_eq!(legs[1].sequence, 1);
        assert_eq!(legs[1].start, LegStart::Stop(stops[0].0.id));
        assert_eq!(legs[1].end_stop, stops[1].0.id);
        assert_eq!(legs[1].distance_mi, 2.0);
        assert_eq!(legs[1].travel_mins, 60);
    }

    #[tokio::test]
    async fn routing_failure_degrades_to_estimates() {
        let router = MockRouter::new();
        router.set_failing(true).await;

        let config = EngineConfig::default();
        let (stint_id, start, stops) = stint_fixture(3);

        let legs = build_legs(&router, &config, stint_id, &start, &stops, Utc::now()).await;

        assert_eq!(legs.len(), 3);
        for (index, leg) in legs.iter().enumerate() {
            assert_eq!(leg.sequence, index as u32);
            assert_eq!(leg.distance_mi, config.fallback_leg_miles);
            assert_eq!(leg.travel_mins, config.fallback_leg_mins);
            assert_eq!(leg.kind, RouteKind::Mixed);
            assert_eq!(leg.source, RouteSource::Estimated);
            assert!(leg.polyline.is_none());
        }
        // The chain structure survives the fallback
        assert_eq!(legs[0].start, LegStart::Location(start.id));
        assert_eq!(legs[1].start, LegStart::Stop(stops[0].0.id));
        assert_eq!(legs[2].start, LegStart::Stop(stops[1].0.id));
    }

    #[tokio::test]
    async fn mismatched_section_count_degrades_to_estimates() {
        let router = MockRouter::new();
        router.set_sections(vec![section(1000.0, 60.0)]).await;

        let config = EngineConfig::default();
        let (stint_id, start, stops) = stint_fixture(2);

        let legs = build_legs(&router, &config, stint_id, &start, &stops, Utc::now()).await;

        assert_eq!(legs.len(), 2);
        assert!(legs.iter().all(Leg::is_estimated));
    }

    #[tokio::test]
    async fn no_stops_means_no_legs_and_no_routing() {
        let router = MockRouter::new();
        let config = EngineConfig::default();
        let start = location(40.0, -105.0);

        let legs = build_legs(
            &router,
            &config,
            StintId::generate(),
            &start,
            &[],
            Utc::now(),
        )
        .await;

        assert!(legs.is_empty());
        assert_eq!(router.call_count().await, 0);
    }

    #[tokio::test]
    async fn geometry_mock_produces_routed_chain() {
        let router = MockRouter::with_speed(50.0);
        let config = EngineConfig::default();
        let (stint_id, start, stops) = stint_fixture(2);

        let legs = build_legs(&router, &config, stint_id, &start, &stops, Utc::now()).await;

        assert_eq!(legs.len(), 2);
        assert!(legs.iter().all(|l| l.source == RouteSource::Routed));
        assert!(legs.iter().all(|l| l.distance_mi > 0.0));
        assert!(legs.iter().all(|l| l.travel_mins > 0));
    }
}
