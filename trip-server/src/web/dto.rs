//! Data transfer objects for web requests and responses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{
    Leg, LegId, LegStart, Location, LocationId, Stint, StintId, Stop, StopId, Trip, TripId, UserId,
};
use crate::itinerary::{StintTimeline, TimelineEventKind, TripTimeline};

/// Request to create a trip.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTripRequest {
    /// Display title, e.g. "Utah in May"
    pub title: String,
}

/// A geographic place supplied by the client.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceBody {
    /// Human-readable label
    pub name: Option<String>,

    /// Latitude in degrees
    pub lat: f64,

    /// Longitude in degrees
    pub lng: f64,
}

/// Request to create a stint within a trip.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateStintRequest {
    /// Display name
    pub name: Option<String>,

    /// 1-based position within the trip; appended when omitted
    pub sequence: Option<u32>,

    /// Planned departure time
    pub start_time: Option<DateTime<Utc>>,

    /// Departure point; ignored when the stint continues from the
    /// previous stint's end
    pub origin: Option<PlaceBody>,
}

/// Request to add a stop to a stint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddStopRequest {
    /// The trip the stint must belong to
    pub trip_id: TripId,

    /// Display name
    pub name: Option<String>,

    /// Latitude in degrees
    pub lat: f64,

    /// Longitude in degrees
    pub lng: f64,

    /// Stop kind, e.g. "pitstop" (the default) or "overnight"
    pub kind: Option<String>,

    /// Planned dwell time in minutes
    pub duration_mins: Option<i64>,

    /// 1-based position within the stint; appended when omitted
    pub sequence: Option<u32>,
}

/// Request to reorder the stops of a stint.
///
/// Stops may be listed partially; unlisted stops keep their relative
/// order after the listed ones are placed.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderStopsRequest {
    /// Requested placements
    pub stops: Vec<StopOrder>,
}

/// One requested stop placement.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StopOrder {
    /// The stop to move
    pub id: StopId,

    /// Requested 1-based position
    pub sequence: u32,
}

/// A trip in responses.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TripResult {
    pub id: TripId,

    /// Display title
    pub title: String,

    /// The user who created the trip
    pub creator: UserId,

    /// Start of the first planned day
    pub start_date: Option<DateTime<Utc>>,

    /// End of the last planned day
    pub end_date: Option<DateTime<Utc>>,

    /// Total driving distance across all stints, in miles
    pub total_distance_mi: f64,
}

/// A stint in responses.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StintResult {
    pub id: StintId,

    pub trip_id: TripId,

    /// 1-based position within the trip
    pub sequence: u32,

    /// Display name
    pub name: Option<String>,

    /// Where the drive starts
    pub start_location: Option<LocationId>,

    /// Where the drive ends, tracking the last stop
    pub end_location: Option<LocationId>,

    /// Planned departure time
    pub start_time: Option<DateTime<Utc>>,

    /// Departure time from the final stop
    pub end_time: Option<DateTime<Utc>>,

    /// Sum of leg distances, in miles
    pub distance_mi: f64,

    /// Driving plus dwell time, in minutes
    pub duration_mins: i64,

    /// True when this stint starts where the previous one ended
    pub continues_from_previous: bool,
}

/// A stop in responses.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StopResult {
    pub id: StopId,

    pub stint_id: StintId,

    /// 1-based position within the stint
    pub sequence: u32,

    /// Display name
    pub name: Option<String>,

    /// The stop's place record
    pub location: LocationId,

    /// Stop kind, e.g. "attraction"
    pub kind: String,

    /// Planned dwell time in minutes
    pub duration_mins: i64,

    /// Computed arrival time
    pub arrival: Option<DateTime<Utc>>,

    /// Computed departure time
    pub departure: Option<DateTime<Utc>>,
}

/// Where a leg starts.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum LegStartResult {
    /// The stint's departure location
    Location { id: LocationId },

    /// A preceding stop
    Stop { id: StopId },
}

/// A leg in responses.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LegResult {
    pub id: LegId,

    pub stint_id: StintId,

    /// 0-based position within the stint
    pub sequence: u32,

    /// Where the drive starts
    pub start: LegStartResult,

    /// The stop the drive ends at
    pub end_stop: StopId,

    /// Road distance in miles, one decimal place
    pub distance_mi: f64,

    /// Driving time in whole minutes
    pub travel_mins: i64,

    /// Road classification, e.g. "highway"
    pub kind: String,

    /// Encoded route geometry, when the router supplied one
    pub polyline: Option<String>,

    /// "routed" or "estimated"
    pub source: String,
}

/// Response listing a stint's stops in order.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StopListResponse {
    pub stops: Vec<StopResult>,
}

/// Response listing a stint's legs in order.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LegListResponse {
    pub legs: Vec<LegResult>,
}

/// A place record in responses.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationResult {
    pub id: LocationId,

    /// Human-readable label
    pub name: Option<String>,

    /// Latitude in degrees
    pub lat: f64,

    /// Longitude in degrees
    pub lng: f64,
}

/// One entry in the chronological trip view.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineEventResult {
    /// Ordering key: departure at 0, stops at their sequence, each drive
    /// halfway between the points it connects
    pub position: f64,

    #[serde(flatten)]
    pub event: TimelineEventBody,
}

/// What happens at a timeline position.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum TimelineEventBody {
    /// Setting out from the stint's start location
    Departure {
        location: LocationResult,
        time: Option<DateTime<Utc>>,
    },

    /// Driving a leg
    Drive { leg: LegResult },

    /// Visiting a stop
    Visit {
        stop: StopResult,
        location: Option<LocationResult>,
    },
}

/// One stint's slice of the trip timeline.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StintTimelineResult {
    pub stint: StintResult,

    /// Events ordered by position
    pub events: Vec<TimelineEventResult>,
}

/// Response for the chronological trip view.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TripTimelineResponse {
    pub trip: TripResult,

    /// Stints in trip order
    pub stints: Vec<StintTimelineResult>,
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}

// Conversion implementations

impl TripResult {
    /// Create from a domain Trip.
    pub fn from_trip(trip: &Trip) -> Self {
        Self {
            id: trip.id,
            title: trip.title.clone(),
            creator: trip.creator,
            start_date: trip.start_date,
            end_date: trip.end_date,
            total_distance_mi: trip.total_distance_mi,
        }
    }
}

impl StintResult {
    /// Create from a domain Stint.
    pub fn from_stint(stint: &Stint) -> Self {
        Self {
            id: stint.id,
            trip_id: stint.trip_id,
            sequence: stint.sequence,
            name: stint.name.clone(),
            start_location: stint.start_location,
            end_location: stint.end_location,
            start_time: stint.start_time,
            end_time: stint.end_time,
            distance_mi: stint.distance_mi,
            duration_mins: stint.duration_mins,
            continues_from_previous: stint.continues_from_previous,
        }
    }
}

impl StopResult {
    /// Create from a domain Stop.
    pub fn from_stop(stop: &Stop) -> Self {
        Self {
            id: stop.id,
            stint_id: stop.stint_id,
            sequence: stop.sequence,
            name: stop.name.clone(),
            location: stop.location,
            kind: stop.kind.as_str().to_string(),
            duration_mins: stop.duration_mins,
            arrival: stop.arrival,
            departure: stop.departure,
        }
    }
}

impl LegResult {
    /// Create from a domain Leg.
    pub fn from_leg(leg: &Leg) -> Self {
        let start = match leg.start {
            LegStart::Location(id) => LegStartResult::Location { id },
            LegStart::Stop(id) => LegStartResult::Stop { id },
        };

        Self {
            id: leg.id,
            stint_id: leg.stint_id,
            sequence: leg.sequence,
            start,
            end_stop: leg.end_stop,
            distance_mi: leg.distance_mi,
            travel_mins: leg.travel_mins,
            kind: leg.kind.as_str().to_string(),
            polyline: leg.polyline.clone(),
            source: leg.source.as_str().to_string(),
        }
    }
}

impl LocationResult {
    /// Create from a domain Location.
    pub fn from_location(location: &Location) -> Self {
        Self {
            id: location.id,
            name: location.name.clone(),
            lat: location.point.lat(),
            lng: location.point.lng(),
        }
    }
}

impl StintTimelineResult {
    /// Create from one stint's timeline slice.
    pub fn from_timeline(timeline: &StintTimeline) -> Self {
        let events = timeline
            .events
            .iter()
            .map(|e| {
                let event = match &e.kind {
                    TimelineEventKind::Departure { location, time } => {
                        TimelineEventBody::Departure {
                            location: LocationResult::from_location(location),
                            time: *time,
                        }
                    }
                    TimelineEventKind::Drive { leg } => TimelineEventBody::Drive {
                        leg: LegResult::from_leg(leg),
                    },
                    TimelineEventKind::Visit { stop, location } => TimelineEventBody::Visit {
                        stop: StopResult::from_stop(stop),
                        location: location.as_ref().map(LocationResult::from_location),
                    },
                };

                TimelineEventResult {
                    position: e.position,
                    event,
                }
            })
            .collect();

        Self {
            stint: StintResult::from_stint(&timeline.stint),
            events,
        }
    }
}

impl TripTimelineResponse {
    /// Create from a domain trip timeline.
    pub fn from_timeline(timeline: &TripTimeline) -> Self {
        Self {
            trip: TripResult::from_trip(&timeline.trip),
            stints: timeline
                .stints
                .iter()
                .map(StintTimelineResult::from_timeline)
                .collect(),
        }
    }
}
