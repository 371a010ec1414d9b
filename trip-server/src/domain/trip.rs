//! The trip aggregate root.

use chrono::{DateTime, Utc};

use super::{TripId, UserId};

/// A road trip owned by a single user.
///
/// The date span and total distance are derived from the trip's stints and
/// refreshed by the itinerary engine whenever the itinerary changes. They are
/// never edited directly.
#[derive(Debug, Clone, PartialEq)]
pub struct Trip {
    pub id: TripId,
    /// The user who created the trip. Only the creator may mutate its
    /// itinerary.
    pub creator: UserId,
    pub title: String,
    /// Earliest stint start, truncated to the first second of its day.
    pub start_date: Option<DateTime<Utc>>,
    /// Latest stint end, extended to the last second of its day.
    pub end_date: Option<DateTime<Utc>>,
    /// Sum of stint distances, in miles.
    pub total_distance_mi: f64,
}

impl Trip {
    /// Create a trip with empty derived fields.
    pub fn new(creator: UserId, title: impl Into<String>) -> Self {
        Trip {
            id: TripId::generate(),
            creator,
            title: title.into(),
            start_date: None,
            end_date: None,
            total_distance_mi: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_trip_has_no_derived_state() {
        let trip = Trip::new(UserId::generate(), "Pacific Coast");
        assert_eq!(trip.title, "Pacific Coast");
        assert!(trip.start_date.is_none());
        assert!(trip.end_date.is_none());
        assert_eq!(trip.total_distance_mi, 0.0);
    }
}
