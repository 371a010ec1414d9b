//! Stints: the drivable chapters of a trip.

use chrono::{DateTime, Utc};

use super::{LocationId, StintId, TripId};

/// One contiguous driving chapter of a trip.
///
/// Stints are ordered within their trip by `sequence`, which the engine keeps
/// 1-based and contiguous. Distance, duration and the end time/location are
/// derived from the stint's stops and legs.
#[derive(Debug, Clone, PartialEq)]
pub struct Stint {
    pub id: StintId,
    pub trip_id: TripId,
    /// Position within the trip, 1-based.
    pub sequence: u32,
    pub name: Option<String>,
    /// Where the drive starts. Absent until the client supplies a departure
    /// point or the stint inherits one from its predecessor.
    pub start_location: Option<LocationId>,
    /// Tracks the last stop's location; maintained by the engine.
    pub end_location: Option<LocationId>,
    pub start_time: Option<DateTime<Utc>>,
    /// Departure time from the final stop; maintained by the engine.
    pub end_time: Option<DateTime<Utc>>,
    /// Sum of leg distances, in miles.
    pub distance_mi: f64,
    /// Driving plus dwell time, in minutes.
    pub duration_mins: i64,
    /// True when this stint starts where the previous stint ended.
    pub continues_from_previous: bool,
}

impl Stint {
    /// Create a stint with empty derived fields.
    pub fn new(trip_id: TripId, sequence: u32, name: Option<String>) -> Self {
        Stint {
            id: StintId::generate(),
            trip_id,
            sequence,
            name,
            start_location: None,
            end_location: None,
            start_time: None,
            end_time: None,
            distance_mi: 0.0,
            duration_mins: 0,
            continues_from_previous: false,
        }
    }
}
