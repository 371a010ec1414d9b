//! The mutation coordinator: the engine's public operations.
//!
//! Every itinerary mutation runs the same way: validate ownership and
//! linkage, compute the prospective stop order in memory, consult the
//! router with no store lock held, then apply sequence changes, leg
//! replacement, timeline and aggregates in one short transaction. After a
//! successful commit a best-effort aggregate refresh is spawned; its
//! failure is logged, never surfaced.
//!
//! Mutations against the same trip are serialized by a per-trip async
//! mutex, so two concurrent stop mutations cannot interleave their
//! read/route/write phases.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::domain::{
    GeoPoint, Leg, Location, LocationId, Stint, StintId, Stop, StopId, StopKind, Trip, TripId,
    UserId,
};
use crate::routing::RouteProvider;
use crate::store::{Database, Txn};

use super::aggregates;
use super::config::EngineConfig;
use super::error::{EngineError, EntityKind};
use super::legs::build_legs;
use super::sequence::{
    plan_reorder, resolve_insert_position, shift_stint_sequences, shift_stop_sequences,
};
use super::timeline::{self, Timeline};

/// Request to create a trip.
#[derive(Debug, Clone)]
pub struct NewTrip {
    pub title: String,
}

/// A geographic place supplied by the client.
#[derive(Debug, Clone)]
pub struct NewPlace {
    pub name: Option<String>,
    pub point: GeoPoint,
}

/// Request to create a stint.
#[derive(Debug, Clone)]
pub struct NewStint {
    pub name: Option<String>,
    /// Position within the trip; appended when absent.
    pub sequence: Option<u32>,
    pub start_time: Option<DateTime<Utc>>,
    /// Departure point. Ignored when the stint continues from a
    /// predecessor, which supplies its own.
    pub origin: Option<NewPlace>,
}

/// Request to add a stop to a stint.
#[derive(Debug, Clone)]
pub struct NewStop {
    pub name: Option<String>,
    pub point: GeoPoint,
    pub kind: StopKind,
    /// Planned dwell time at the stop, in minutes.
    pub duration_mins: i64,
    /// Position within the stint; appended when absent.
    pub sequence: Option<u32>,
}

/// One entry in a trip's chronological read model.
#[derive(Debug, Clone)]
pub struct TimelineEvent {
    /// Fractional ordering key: the stint departure at 0, each stop at its
    /// sequence, each leg halfway between the points it connects.
    pub position: f64,
    pub kind: TimelineEventKind,
}

/// What happens at a timeline position.
#[derive(Debug, Clone)]
pub enum TimelineEventKind {
    /// Setting out from the stint's start location.
    Departure {
        location: Location,
        time: Option<DateTime<Utc>>,
    },
    /// Driving a leg.
    Drive { leg: Leg },
    /// Visiting a stop.
    Visit {
        stop: Stop,
        /// The stop's location record, when it still exists.
        location: Option<Location>,
    },
}

/// One stint's slice of the trip timeline.
#[derive(Debug, Clone)]
pub struct StintTimeline {
    pub stint: Stint,
    /// Events ordered by their fractional position.
    pub events: Vec<TimelineEvent>,
}

/// Chronological read model of a whole trip.
#[derive(Debug, Clone)]
pub struct TripTimeline {
    pub trip: Trip,
    pub stints: Vec<StintTimeline>,
}

/// A planned leg-and-timeline replacement, computed before the write
/// transaction opens.
struct Rebuild {
    legs: Vec<Leg>,
    timeline: Timeline,
}

/// Per-trip mutation locks.
///
/// Entries are created on first use and kept for the service's lifetime;
/// one instance only ever sees a bounded set of trips.
struct TripLocks {
    inner: Mutex<HashMap<TripId, Arc<Mutex<()>>>>,
}

impl TripLocks {
    fn new() -> Self {
        Self {
            inner: Mutex::new(HashMap::new()),
        }
    }

    async fn acquire(&self, trip: TripId) -> OwnedMutexGuard<()> {
        let lock = {
            let mut map = self.inner.lock().await;
            Arc::clone(map.entry(trip).or_default())
        };
        lock.lock_owned().await
    }
}

/// The itinerary engine's externally visible surface.
///
/// Composes the sequence manager, leg builder, timeline calculator and
/// aggregate updater behind atomic operations with ownership checks.
pub struct ItineraryService<R> {
    db: Arc<Database>,
    router: R,
    config: EngineConfig,
    locks: TripLocks,
}

impl<R: RouteProvider> ItineraryService<R> {
    /// Create a service over the given store and route provider.
    pub fn new(db: Arc<Database>, router: R, config: EngineConfig) -> Self {
        Self {
            db,
            router,
            config,
            locks: TripLocks::new(),
        }
    }

    /// Create a trip owned by the requester.
    pub async fn create_trip(&self, new: NewTrip, requester: UserId) -> Result<Trip, EngineError> {
        let trip = Trip::new(requester, new.title);
        self.db
            .transaction(|tx| {
                tx.trips().save(trip.clone());
                Ok(trip)
            })
            .await
    }

    /// Fetch a trip.
    pub async fn trip(&self, id: TripId) -> Result<Trip, EngineError> {
        self.db
            .trip(id)
            .await
            .ok_or_else(|| EngineError::not_found(EntityKind::Trip, id))
    }

    /// A stint's stops, ordered by sequence.
    pub async fn stops_by_stint(&self, stint_id: StintId) -> Result<Vec<Stop>, EngineError> {
        self.require_stint(stint_id).await?;
        Ok(self.db.stops_by_stint(stint_id).await)
    }

    /// A stint's legs, ordered by sequence.
    pub async fn legs_by_stint(&self, stint_id: StintId) -> Result<Vec<Leg>, EngineError> {
        self.require_stint(stint_id).await?;
        Ok(self.db.legs_by_stint(stint_id).await)
    }

    /// Create a stint within a trip.
    ///
    /// When the stint lands directly after one whose end location is known,
    /// it continues from there: start location and start time are inherited
    /// and any supplied origin is ignored. Otherwise a supplied origin
    /// becomes a new location record and the stint's departure point.
    pub async fn create_stint(
        &self,
        trip_id: TripId,
        new: NewStint,
        requester: UserId,
    ) -> Result<Stint, EngineError> {
        let _guard = self.locks.acquire(trip_id).await;

        let trip = self.trip(trip_id).await?;
        ensure_creator(&trip, requester)?;

        let current = self.db.stints_by_trip(trip_id).await;
        let sequence = resolve_insert_position(current.len(), new.sequence);

        let mut stint = Stint::new(trip_id, sequence, new.name);
        stint.start_time = new.start_time;

        let predecessor = current.iter().find(|s| s.sequence + 1 == sequence);
        let mut origin_location = None;
        match predecessor {
            Some(prev) if prev.end_location.is_some() => {
                stint.start_location = prev.end_location;
                stint.start_time = prev.end_time.or(new.start_time);
                stint.continues_from_previous = true;
            }
            _ => {
                if let Some(place) = new.origin {
                    let location = Location::new(place.name, place.point);
                    stint.start_location = Some(location.id);
                    origin_location = Some(location);
                }
            }
        }

        self.db
            .transaction(|tx| {
                shift_stint_sequences(tx, trip_id, sequence, 1);
                if let Some(location) = origin_location {
                    tx.locations().save(location);
                }
                tx.stints().save(stint.clone());
                aggregates::recalculate_trip(tx, trip_id)?;
                Ok(stint)
            })
            .await
    }

    /// Add a stop to a stint, rebuilding its legs and timeline.
    ///
    /// `trip_id` must be the trip the stint belongs to; a mismatch is
    /// Forbidden. The stop is inserted at the requested position (appended
    /// when none is given), siblings shift to stay contiguous, and the
    /// stint's legs are fully rebuilt around the new stop list.
    pub async fn add_stop(
        &self,
        trip_id: TripId,
        stint_id: StintId,
        new: NewStop,
        requester: UserId,
    ) -> Result<Stop, EngineError> {
        let _guard = self.locks.acquire(trip_id).await;

        let trip = self.trip(trip_id).await?;
        ensure_creator(&trip, requester)?;
        let stint = self.require_stint(stint_id).await?;
        if stint.trip_id != trip_id {
            return Err(EngineError::Forbidden(format!(
                "stint {stint_id} does not belong to trip {trip_id}"
            )));
        }

        let current = self.db.stops_by_stint(stint_id).await;
        let sequence = resolve_insert_position(current.len(), new.sequence);

        let location = Location::new(new.name.clone(), new.point);
        let mut stop = Stop::new(stint_id, sequence, location.id);
        stop.name = new.name;
        stop.kind = new.kind;
        stop.duration_mins = new.duration_mins;

        let mut prospective = current;
        for sibling in &mut prospective {
            if sibling.sequence >= sequence {
                sibling.sequence += 1;
            }
        }
        prospective.push(stop.clone());
        prospective.sort_by_key(|s| s.sequence);

        let rebuild = self
            .plan_rebuild(&stint, &prospective, Some(&location))
            .await;

        let stop_id = stop.id;
        let persisted = self
            .db
            .transaction(|tx| {
                shift_stop_sequences(tx, stint_id, sequence, 1);
                tx.locations().save(location);
                tx.stops().save(stop);

                if let Some(plan) = rebuild {
                    apply_rebuild(tx, stint_id, plan)?;
                }
                update_end_location(tx, stint_id)?;
                aggregates::recalculate_stint(tx, stint_id)?;
                aggregates::recalculate_trip(tx, trip_id)?;

                tx.stops()
                    .find(stop_id)
                    .ok_or_else(|| EngineError::not_found(EntityKind::Stop, stop_id))
            })
            .await?;

        self.spawn_refresh(stint_id, trip_id);
        Ok(persisted)
    }

    /// Remove a stop, closing the sequence gap and rebuilding legs around
    /// the remaining stops.
    ///
    /// The last stop of a stint cannot be removed; delete the stint
    /// instead. That refusal happens before anything is written.
    pub async fn remove_stop(&self, stop_id: StopId, requester: UserId) -> Result<(), EngineError> {
        // The owning trip is only discoverable through the stop, so probe
        // first and re-read once the trip lock is held.
        let probe = self.require_stop(stop_id).await?;
        let probe_stint = self.require_stint(probe.stint_id).await?;
        let _guard = self.locks.acquire(probe_stint.trip_id).await;

        let stop = self.require_stop(stop_id).await?;
        let stint = self.require_stint(stop.stint_id).await?;
        let trip = self.trip(stint.trip_id).await?;
        ensure_creator(&trip, requester)?;

        let current = self.db.stops_by_stint(stint.id).await;
        if current.len() <= 1 {
            return Err(EngineError::Forbidden(
                "a stint must keep at least one stop; delete the stint instead".to_string(),
            ));
        }

        let mut remaining: Vec<Stop> = current.into_iter().filter(|s| s.id != stop_id).collect();
        for sibling in &mut remaining {
            if sibling.sequence > stop.sequence {
                sibling.sequence -= 1;
            }
        }

        let rebuild = self.plan_rebuild(&stint, &remaining, None).await;

        let stint_id = stint.id;
        let trip_id = stint.trip_id;
        let removed_sequence = stop.sequence;
        self.db
            .transaction(|tx| {
                tx.stops()
                    .remove(stop_id)
                    .ok_or_else(|| EngineError::not_found(EntityKind::Stop, stop_id))?;
                shift_stop_sequences(tx, stint_id, removed_sequence + 1, -1);

                match rebuild {
                    Some(plan) => apply_rebuild(tx, stint_id, plan)?,
                    // No rebuild possible without a start location; at
                    // least drop the legs that referenced the stop.
                    None => {
                        tx.legs().remove_touching_stop(stop_id);
                    }
                }

                update_end_location(tx, stint_id)?;
                aggregates::recalculate_stint(tx, stint_id)?;
                aggregates::recalculate_trip(tx, trip_id)?;
                Ok(())
            })
            .await?;

        self.spawn_refresh(stint_id, trip_id);
        Ok(())
    }

    /// Apply a client ordering to a stint's stops.
    ///
    /// The order list may cover only some stops; named stops take their
    /// requested positions and the rest keep their relative order, then the
    /// whole run is renormalized to 1..=N. Legs and timeline are rebuilt
    /// even when the order is unchanged, so a repeated request converges on
    /// the same state. Returns the stint's stops in their final order.
    pub async fn reorder_stops(
        &self,
        stint_id: StintId,
        order: &[(StopId, u32)],
        requester: UserId,
    ) -> Result<Vec<Stop>, EngineError> {
        let probe = self.require_stint(stint_id).await?;
        let _guard = self.locks.acquire(probe.trip_id).await;

        let stint = self.require_stint(stint_id).await?;
        let trip = self.trip(stint.trip_id).await?;
        ensure_creator(&trip, requester)?;

        let current = self.db.stops_by_stint(stint_id).await;
        let changes = plan_reorder(&current, order)?;

        let mut prospective = current;
        for stop in &mut prospective {
            if let Some(change) = changes.iter().find(|c| c.stop == stop.id) {
                stop.sequence = change.sequence;
            }
        }
        prospective.sort_by_key(|s| s.sequence);

        let rebuild = self.plan_rebuild(&stint, &prospective, None).await;

        let trip_id = stint.trip_id;
        let stops = self
            .db
            .transaction(|tx| {
                for change in &changes {
                    let mut stop = tx
                        .stops()
                        .find(change.stop)
                        .ok_or_else(|| EngineError::not_found(EntityKind::Stop, change.stop))?;
                    stop.sequence = change.sequence;
                    tx.stops().save(stop);
                }

                if let Some(plan) = rebuild {
                    apply_rebuild(tx, stint_id, plan)?;
                }
                update_end_location(tx, stint_id)?;
                aggregates::recalculate_stint(tx, stint_id)?;
                aggregates::recalculate_trip(tx, trip_id)?;

                Ok(tx.stops().by_stint(stint_id))
            })
            .await?;

        self.spawn_refresh(stint_id, trip_id);
        Ok(stops)
    }

    /// Recompute a stint's distance from its legs, in its own short
    /// transaction.
    pub async fn update_stint_distance(&self, stint_id: StintId) -> Result<(), EngineError> {
        self.db
            .transaction(|tx| aggregates::recalculate_stint_distance(tx, stint_id))
            .await
    }

    /// Recompute a stint's duration from its legs and stops.
    pub async fn update_stint_duration(&self, stint_id: StintId) -> Result<(), EngineError> {
        self.db
            .transaction(|tx| aggregates::recalculate_stint_duration(tx, stint_id))
            .await
    }

    /// Assemble the chronological read model for a trip.
    ///
    /// Each stint contributes a departure event (when it has a start
    /// location), one event per leg and one per stop, ordered by the
    /// fractional position key.
    pub async fn trip_timeline(&self, trip_id: TripId) -> Result<TripTimeline, EngineError> {
        let trip = self.trip(trip_id).await?;

        let mut stints = Vec::new();
        for stint in self.db.stints_by_trip(trip_id).await {
            let mut events = Vec::new();

            if let Some(start_id) = stint.start_location {
                if let Some(location) = self.db.location(start_id).await {
                    events.push(TimelineEvent {
                        position: 0.0,
                        kind: TimelineEventKind::Departure {
                            location,
                            time: stint.start_time,
                        },
                    });
                }
            }

            for leg in self.db.legs_by_stint(stint.id).await {
                events.push(TimelineEvent {
                    position: f64::from(leg.sequence) + 0.5,
                    kind: TimelineEventKind::Drive { leg },
                });
            }

            for stop in self.db.stops_by_stint(stint.id).await {
                let location = self.db.location(stop.location).await;
                events.push(TimelineEvent {
                    position: f64::from(stop.sequence),
                    kind: TimelineEventKind::Visit { stop, location },
                });
            }

            events.sort_by(|a, b| a.position.total_cmp(&b.position));
            stints.push(StintTimeline { stint, events });
        }

        Ok(TripTimeline { trip, stints })
    }

    async fn require_stint(&self, id: StintId) -> Result<Stint, EngineError> {
        self.db
            .stint(id)
            .await
            .ok_or_else(|| EngineError::not_found(EntityKind::Stint, id))
    }

    async fn require_stop(&self, id: StopId) -> Result<Stop, EngineError> {
        self.db
            .stop(id)
            .await
            .ok_or_else(|| EngineError::not_found(EntityKind::Stop, id))
    }

    /// Route the prospective stop list and walk its timeline, without
    /// touching the store.
    ///
    /// Returns `None` when the stint has no start location (no legs can be
    /// derived) or a referenced location record is missing. `staged` covers
    /// a location that is part of this mutation and not yet persisted.
    async fn plan_rebuild(
        &self,
        stint: &Stint,
        stops: &[Stop],
        staged: Option<&Location>,
    ) -> Option<Rebuild> {
        let start_id = stint.start_location?;
        let start = self.resolve_location(start_id, staged).await?;

        let mut pairs = Vec::with_capacity(stops.len());
        for stop in stops {
            let location = self.resolve_location(stop.location, staged).await?;
            pairs.push((stop.clone(), location));
        }

        let departure = stint.start_time.unwrap_or_else(Utc::now);
        let legs = build_legs(
            &self.router,
            &self.config,
            stint.id,
            &start,
            &pairs,
            departure,
        )
        .await;
        let timeline = timeline::recalculate(stint.start_time, stops.to_vec(), &legs);

        Some(Rebuild { legs, timeline })
    }

    async fn resolve_location(&self, id: LocationId, staged: Option<&Location>) -> Option<Location> {
        if let Some(staged) = staged {
            if staged.id == id {
                return Some(staged.clone());
            }
        }
        self.db.location(id).await
    }

    /// Queue the post-commit aggregate pass. Runs detached; failures are
    /// logged inside [`aggregates::refresh_aggregates`].
    fn spawn_refresh(&self, stint_id: StintId, trip_id: TripId) {
        let db = Arc::clone(&self.db);
        tokio::spawn(async move {
            aggregates::refresh_aggregates(&db, stint_id, trip_id).await;
        });
    }
}

fn ensure_creator(trip: &Trip, requester: UserId) -> Result<(), EngineError> {
    if trip.creator == requester {
        Ok(())
    } else {
        Err(EngineError::Forbidden(
            "only the trip creator may modify its itinerary".to_string(),
        ))
    }
}

/// Replace a stint's legs, apply the recomputed stop timestamps and stamp
/// the stint's end time.
fn apply_rebuild(tx: &mut Txn<'_>, stint_id: StintId, rebuild: Rebuild) -> Result<(), EngineError> {
    tx.legs().remove_by_stint(stint_id);
    for leg in rebuild.legs {
        tx.legs().save(leg);
    }

    for timed in &rebuild.timeline.stops {
        if let Some(mut stored) = tx.stops().find(timed.id) {
            stored.arrival = timed.arrival;
            stored.departure = timed.departure;
            tx.stops().save(stored);
        }
    }

    let mut stint = tx
        .stints()
        .find(stint_id)
        .ok_or_else(|| EngineError::not_found(EntityKind::Stint, stint_id))?;
    stint.end_time = rebuild.timeline.end_time;
    tx.stints().save(stint);
    Ok(())
}

/// Point the stint's end-location reference at its last stop, falling back
/// to the start location when no stops remain.
fn update_end_location(tx: &mut Txn<'_>, stint_id: StintId) -> Result<(), EngineError> {
    let mut stint = tx
        .stints()
        .find(stint_id)
        .ok_or_else(|| EngineError::not_found(EntityKind::Stint, stint_id))?;

    stint.end_location = tx
        .stops()
        .by_stint(stint_id)
        .last()
        .map(|s| s.location)
        .or(stint.start_location);

    tx.stints().save(stint);
    Ok(())
}
