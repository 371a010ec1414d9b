//! Domain types for the road-trip planner.
//!
//! This module contains the core itinerary model: trips, their ordered
//! stints, the stops each stint visits, and the legs connecting them.
//! Validated types (ids, coordinates) enforce their invariants at
//! construction time, so code that receives them can trust their validity.

mod geo;
mod ids;
mod leg;
mod location;
mod stint;
mod stop;
mod trip;

pub use geo::{GeoPoint, InvalidCoordinate};
pub use ids::{LegId, LocationId, StintId, StopId, TripId, UserId};
pub use leg::{Leg, LegStart, RouteKind, RouteSource};
pub use location::Location;
pub use stint::Stint;
pub use stop::{InvalidStopKind, Stop, StopKind};
pub use trip::Trip;
