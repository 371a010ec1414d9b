//! Road routing client.
//!
//! This module talks to an external routing service to turn an ordered
//! list of waypoints into drivable route sections with distances and
//! durations.
//!
//! The itinerary engine never depends on the HTTP client directly; it goes
//! through [`RouteProvider`], so production code can use the cached HTTP
//! client while tests drive the engine with [`MockRouter`]. Routing is
//! always treated as degradable: any error here makes the engine fall back
//! to placeholder legs rather than failing the mutation.

mod client;
mod convert;
mod error;
mod mock;
mod types;

pub use client::{RoutingClient, RoutingConfig};
pub use convert::convert_routes;
pub use error::RoutingError;
pub use mock::MockRouter;
pub use types::{Route, RouteSection, RoutesResponse, Section, Summary, Transport, Waypoint};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Source of drivable routes between waypoints.
///
/// A successful result carries exactly one section per consecutive
/// waypoint pair, in visiting order. Implementations must deliver that
/// shape or an error; callers build placeholder legs on any failure.
#[async_trait]
pub trait RouteProvider: Send + Sync {
    /// Plan a car route visiting `waypoints` in order, departing at
    /// `departure`.
    async fn plan_route(
        &self,
        waypoints: &[Waypoint],
        departure: DateTime<Utc>,
    ) -> Result<Vec<RouteSection>, RoutingError>;
}
