//! Stops: the places a stint visits, in order.

use std::fmt;

use chrono::{DateTime, Utc};

use super::{LocationId, StintId, StopId};

/// Error returned when a stop kind string is not recognised.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("unknown stop kind: {0}")]
pub struct InvalidStopKind(pub String);

/// Why a stop is on the itinerary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopKind {
    /// The departure point of a stint.
    Departure,
    /// A short break: fuel, food, stretching.
    Pitstop,
    /// Somewhere worth visiting in its own right.
    Attraction,
    /// An overnight stay.
    Overnight,
}

impl StopKind {
    /// Parse the wire representation, e.g. `"pitstop"`.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidStopKind`] for anything other than the four known
    /// kinds.
    pub fn parse(s: &str) -> Result<Self, InvalidStopKind> {
        match s {
            "departure" => Ok(StopKind::Departure),
            "pitstop" => Ok(StopKind::Pitstop),
            "attraction" => Ok(StopKind::Attraction),
            "overnight" => Ok(StopKind::Overnight),
            other => Err(InvalidStopKind(other.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StopKind::Departure => "departure",
            StopKind::Pitstop => "pitstop",
            StopKind::Attraction => "attraction",
            StopKind::Overnight => "overnight",
        }
    }
}

impl fmt::Display for StopKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A place a stint visits.
///
/// Stops are ordered within their stint by `sequence`, 1-based and
/// contiguous. Arrival and departure timestamps are derived by the timeline
/// walk and cleared when the stint has no start time.
#[derive(Debug, Clone, PartialEq)]
pub struct Stop {
    pub id: StopId,
    pub stint_id: StintId,
    /// Position within the stint, 1-based.
    pub sequence: u32,
    pub name: Option<String>,
    /// The place itself.
    pub location: LocationId,
    pub kind: StopKind,
    /// Planned dwell time at the stop, in minutes.
    pub duration_mins: i64,
    pub arrival: Option<DateTime<Utc>>,
    pub departure: Option<DateTime<Utc>>,
}

impl Stop {
    /// Create a stop with no timestamps and a zero dwell.
    pub fn new(stint_id: StintId, sequence: u32, location: LocationId) -> Self {
        Stop {
            id: StopId::generate(),
            stint_id,
            sequence,
            name: None,
            location,
            kind: StopKind::Pitstop,
            duration_mins: 0,
            arrival: None,
            departure: None,
        }
    }
}
