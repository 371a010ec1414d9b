//! Conversion from routing API responses to route sections.
//!
//! Validates the response shape against the request: a route over `n`
//! waypoints must come back as exactly `n - 1` sections, each carrying a
//! summary. Anything else is reported as an error so the caller can fall
//! back to estimated legs.

use super::error::RoutingError;
use super::types::{RouteSection, RoutesResponse};

/// Convert a parsed routing response into one section per waypoint pair.
///
/// Only the first route alternative is considered.
///
/// # Errors
///
/// - [`RoutingError::EmptyRoute`] when the response has no routes or no
///   sections
/// - [`RoutingError::Malformed`] when the section count does not match the
///   waypoints, or a section is missing its summary
pub fn convert_routes(
    response: &RoutesResponse,
    waypoint_count: usize,
) -> Result<Vec<RouteSection>, RoutingError> {
    let route = response.routes.first().ok_or(RoutingError::EmptyRoute)?;

    if route.sections.is_empty() {
        return Err(RoutingError::EmptyRoute);
    }

    let expected = waypoint_count.saturating_sub(1);
    if route.sections.len() != expected {
        return Err(RoutingError::Malformed(format!(
            "expected {expected} sections, got {}",
            route.sections.len()
        )));
    }

    let mut sections = Vec::with_capacity(route.sections.len());

    for section in &route.sections {
        let summary = section
            .summary
            .as_ref()
            .ok_or_else(|| RoutingError::Malformed("section missing summary".to_string()))?;
        let length = summary
            .length
            .ok_or_else(|| RoutingError::Malformed("summary missing length".to_string()))?;
        let duration = summary
            .duration
            .ok_or_else(|| RoutingError::Malformed("summary missing duration".to_string()))?;

        sections.push(RouteSection {
            length_meters: length,
            duration_seconds: duration,
            transport_mode: section.transport.as_ref().and_then(|t| t.mode.clone()),
            polyline: section.polyline.clone(),
        });
    }

    Ok(sections)
}
