//! Named places.

use super::{GeoPoint, LocationId};

/// A place a trip touches: a stop's position, a stint's departure point,
/// or wherever a stint ends up.
#[derive(Debug, Clone, PartialEq)]
pub struct Location {
    pub id: LocationId,
    /// Human-readable label, when the client supplied one.
    pub name: Option<String>,
    pub point: GeoPoint,
}

impl Location {
    pub fn new(name: Option<String>, point: GeoPoint) -> Self {
        Location {
            id: LocationId::generate(),
            name,
            point,
        }
    }
}
