//! Mock route provider for testing without API access.
//!
//! Derives distances from great-circle geometry at a fixed average speed,
//! or serves scripted sections verbatim. Can be switched into a failing
//! mode to exercise the estimated-leg fallback.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use super::RouteProvider;
use super::error::RoutingError;
use super::types::{RouteSection, Waypoint};

/// Meters per mile, matching the conversion used by the leg builder.
const METERS_PER_MILE: f64 = 1609.344;

#[derive(Debug, Clone)]
enum Behaviour {
    /// Compute sections from waypoint geometry at this average speed (mph).
    Geometry(f64),
    /// Return these sections for every request.
    Scripted(Vec<RouteSection>),
    /// Fail every request.
    Failing,
}

/// Mock [`RouteProvider`] that needs no network.
///
/// This is useful for development and tests without real routing
/// credentials. The default behaviour computes plausible car routes from
/// the waypoints themselves.
#[derive(Clone)]
pub struct MockRouter {
    behaviour: Arc<RwLock<Behaviour>>,
    calls: Arc<RwLock<usize>>,
}

impl MockRouter {
    /// Create a mock that derives routes from geometry at 50 mph.
    pub fn new() -> Self {
        Self::with_speed(50.0)
    }

    /// Create a mock that derives routes from geometry at the given
    /// average speed in mph.
    pub fn with_speed(mph: f64) -> Self {
        Self {
            behaviour: Arc::new(RwLock::new(Behaviour::Geometry(mph))),
            calls: Arc::new(RwLock::new(0)),
        }
    }

    /// Serve exactly these sections for every subsequent request.
    pub async fn set_sections(&self, sections: Vec<RouteSection>) {
        *self.behaviour.write().await = Behaviour::Scripted(sections);
    }

    /// Fail every subsequent request, or restore geometry-derived routes.
    pub async fn set_failing(&self, failing: bool) {
        let mut behaviour = self.behaviour.write().await;
        *behaviour = if failing {
            Behaviour::Failing
        } else {
            Behaviour::Geometry(50.0)
        };
    }

    /// Number of `plan_route` calls made so far.
    pub async fn call_count(&self) -> usize {
        *self.calls.read().await
    }
}

impl Default for MockRouter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RouteProvider for MockRouter {
    async fn plan_route(
        &self,
        waypoints: &[Waypoint],
        _departure: DateTime<Utc>,
    ) -> Result<Vec<RouteSection>, RoutingError> {
        {
            let mut calls = self.calls.write().await;
            *calls += 1;
        }

        let behaviour = self.behaviour.read().await.clone();

        match behaviour {
            Behaviour::Failing => Err(RoutingError::Api {
                status: 503,
                message: "mock routing failure".to_string(),
            }),
            Behaviour::Scripted(sections) => Ok(sections),
            Behaviour::Geometry(mph) => {
                let sections = waypoints
                    .windows(2)
                    .map(|pair| {
                        let miles = pair[0].point.distance_miles(&pair[1].point);
                        RouteSection {
                            length_meters: miles * METERS_PER_MILE,
                            duration_seconds: miles / mph * 3600.0,
                            transport_mode: Some("car".to_string()),
                            polyline: None,
                        }
                    })
                    .collect();
                Ok(sections)
            }
        }
    }
}
