//! Schedule derivation: arrival and departure times along a stint.
//!
//! Timestamps are never edited directly. They are a pure function of the
//! stint's start time, the travel minutes on each leg and the dwell
//! minutes at each stop, recomputed after every structural change.

use chrono::{DateTime, Duration, Utc};

use crate::domain::{Leg, Stop};

/// The result of a timeline walk: the stint's stops with their schedule
/// filled in, plus when the stint wraps up.
#[derive(Debug, Clone, PartialEq)]
pub struct Timeline {
    /// Stops in sequence order with arrival and departure set (or cleared).
    pub stops: Vec<Stop>,
    /// Departure from the final stop. `None` when the stint has no start
    /// time or no stops.
    pub end_time: Option<DateTime<Utc>>,
}

/// Walk the stint from its start time, accumulating travel and dwell.
///
/// The stop at position `k` (0-based, after sorting by sequence) is reached
/// via the leg with sequence `k`; a missing leg contributes zero travel so
/// a half-built stint still gets a coherent schedule. Without a start time
/// there is nothing to anchor the walk, and every timestamp is cleared.
pub fn recalculate(
    start_time: Option<DateTime<Utc>>,
    mut stops: Vec<Stop>,
    legs: &[Leg],
) -> Timeline {
    stops.sort_by_key(|s| s.sequence);

    let Some(start) = start_time else {
        for stop in &mut stops {
            stop.arrival = None;
            stop.departure = None;
        }
        return Timeline {
            stops,
            end_time: None,
        };
    };

    let mut cursor = start;
    let mut end_time = None;

    for (index, stop) in stops.iter_mut().enumerate() {
        let travel_mins = legs
            .iter()
            .find(|l| l.sequence == index as u32)
            .map_or(0, |l| l.travel_mins);

        let arrival = cursor + Duration::minutes(travel_mins);
        let departure = arrival + Duration::minutes(stop.duration_mins.max(0));

        stop.arrival = Some(arrival);
        stop.departure = Some(departure);
        cursor = departure;
        end_time = Some(departure);
    }

    Timeline { stops, end_time }
}
